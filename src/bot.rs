use bytes::Bytes;
use log::info;

use crate::config::BotConfig;
use crate::error::{Error, Result};
use crate::inline::InlineQueryResult;
use crate::input_file::InputFile;
use crate::options::*;
use crate::params::Params;
use crate::sender::Sender;
use crate::types::{ChatAction, ChatId, File, Message, Update, User, UserProfilePhotos, WebhookInfo};

/// Handle to one bot account. Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct Bot {
    sender: Sender,
}

impl Bot {
    /// Bot talking to the public API server with default settings.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_config(BotConfig::new(token))
    }

    pub fn with_config(config: BotConfig) -> Result<Self> {
        let sender = Sender::new(config)?;
        info!("bot {} ready on {}", sender.config().masked_token(), sender.config().api_base);
        Ok(Self { sender })
    }

    pub fn config(&self) -> &BotConfig {
        self.sender.config()
    }

    /// Identity of the bot; a cheap way to check the token.
    pub async fn get_me(&self) -> Result<User> {
        self.sender.call("getMe", Params::new(), None).await
    }

    pub async fn get_updates(&self, options: Option<&GetUpdatesOptions>) -> Result<Vec<Update>> {
        let mut params = Params::new();
        params.extend_from(options)?;
        self.sender.call("getUpdates", params, None).await
    }

    pub async fn send_message(
        &self,
        chat_id: impl Into<ChatId>,
        text: &str,
        options: Option<&SendMessageOptions>,
    ) -> Result<Message> {
        let mut params = Params::new()
            .with("chat_id", Into::<ChatId>::into(chat_id))
            .with("text", text);
        params.extend_from(options)?;
        self.sender.call("sendMessage", params, None).await
    }

    pub async fn forward_message(
        &self,
        chat_id: impl Into<ChatId>,
        from_chat_id: impl Into<ChatId>,
        message_id: i64,
        disable_notification: Option<bool>,
    ) -> Result<Message> {
        let mut params = Params::new()
            .with("chat_id", Into::<ChatId>::into(chat_id))
            .with("from_chat_id", Into::<ChatId>::into(from_chat_id))
            .with("message_id", message_id);
        params.set_opt("disable_notification", disable_notification);
        self.sender.call("forwardMessage", params, None).await
    }

    /// Shared body of the media methods: `field` names both the parameter
    /// and the multipart part of the upload.
    async fn send_media(
        &self,
        method: &str,
        field: &str,
        chat_id: ChatId,
        file: InputFile,
        mut params: Params,
    ) -> Result<Message> {
        params.set("chat_id", chat_id);
        let upload = file.prepare(field, &mut params).await?;
        self.sender.call(method, params, upload).await
    }

    pub async fn send_photo(
        &self,
        chat_id: impl Into<ChatId>,
        photo: InputFile,
        options: Option<&SendPhotoOptions>,
    ) -> Result<Message> {
        let mut params = Params::new();
        params.extend_from(options)?;
        self.send_media("sendPhoto", "photo", chat_id.into(), photo, params)
            .await
    }

    pub async fn send_audio(
        &self,
        chat_id: impl Into<ChatId>,
        audio: InputFile,
        options: Option<&SendAudioOptions>,
    ) -> Result<Message> {
        let mut params = Params::new();
        params.extend_from(options)?;
        self.send_media("sendAudio", "audio", chat_id.into(), audio, params)
            .await
    }

    pub async fn send_document(
        &self,
        chat_id: impl Into<ChatId>,
        document: InputFile,
        options: Option<&SendDocumentOptions>,
    ) -> Result<Message> {
        let mut params = Params::new();
        params.extend_from(options)?;
        self.send_media("sendDocument", "document", chat_id.into(), document, params)
            .await
    }

    pub async fn send_sticker(
        &self,
        chat_id: impl Into<ChatId>,
        sticker: InputFile,
        options: Option<&SendStickerOptions>,
    ) -> Result<Message> {
        let mut params = Params::new();
        params.extend_from(options)?;
        self.send_media("sendSticker", "sticker", chat_id.into(), sticker, params)
            .await
    }

    pub async fn send_video(
        &self,
        chat_id: impl Into<ChatId>,
        video: InputFile,
        options: Option<&SendVideoOptions>,
    ) -> Result<Message> {
        let mut params = Params::new();
        params.extend_from(options)?;
        self.send_media("sendVideo", "video", chat_id.into(), video, params)
            .await
    }

    pub async fn send_voice(
        &self,
        chat_id: impl Into<ChatId>,
        voice: InputFile,
        options: Option<&SendVoiceOptions>,
    ) -> Result<Message> {
        let mut params = Params::new();
        params.extend_from(options)?;
        self.send_media("sendVoice", "voice", chat_id.into(), voice, params)
            .await
    }

    pub async fn send_location(
        &self,
        chat_id: impl Into<ChatId>,
        latitude: f64,
        longitude: f64,
        options: Option<&SendLocationOptions>,
    ) -> Result<Message> {
        let mut params = Params::new()
            .with("chat_id", Into::<ChatId>::into(chat_id))
            .with("latitude", latitude)
            .with("longitude", longitude);
        params.extend_from(options)?;
        self.sender.call("sendLocation", params, None).await
    }

    pub async fn send_chat_action(&self, chat_id: impl Into<ChatId>, action: ChatAction) -> Result<bool> {
        let params = Params::new()
            .with("chat_id", Into::<ChatId>::into(chat_id))
            .with("action", action);
        self.sender.call("sendChatAction", params, None).await
    }

    pub async fn get_user_profile_photos(
        &self,
        user_id: i64,
        options: Option<&GetUserProfilePhotosOptions>,
    ) -> Result<UserProfilePhotos> {
        let mut params = Params::new().with("user_id", user_id);
        params.extend_from(options)?;
        self.sender.call("getUserProfilePhotos", params, None).await
    }

    /// Resolves a `file_id` to a downloadable [`File`].
    pub async fn get_file(&self, file_id: &str) -> Result<File> {
        let params = Params::new().with("file_id", file_id);
        self.sender.call("getFile", params, None).await
    }

    pub fn file_url(&self, file: &File) -> Option<String> {
        file.file_path
            .as_deref()
            .map(|path| self.config().file_url(path))
    }

    pub async fn download_file(&self, file: &File) -> Result<Bytes> {
        let path = file
            .file_path
            .as_deref()
            .ok_or_else(|| Error::MissingFilePath(file.file_id.clone()))?;
        self.sender.download(path).await
    }

    pub async fn answer_inline_query(
        &self,
        inline_query_id: &str,
        results: &[InlineQueryResult],
        options: Option<&AnswerInlineQueryOptions>,
    ) -> Result<bool> {
        let mut params = Params::new().with("inline_query_id", inline_query_id);
        params.set_json("results", results)?;
        params.extend_from(options)?;
        self.sender.call("answerInlineQuery", params, None).await
    }

    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
        show_alert: Option<bool>,
    ) -> Result<bool> {
        let mut params = Params::new().with("callback_query_id", callback_query_id);
        params
            .set_opt("text", text)
            .set_opt("show_alert", show_alert);
        self.sender.call("answerCallbackQuery", params, None).await
    }

    /// Points update delivery at `url`. A self-signed `certificate` is
    /// uploaded along with it.
    pub async fn set_webhook(
        &self,
        url: &str,
        certificate: Option<InputFile>,
        secret_token: Option<&str>,
    ) -> Result<bool> {
        let mut params = Params::new().with("url", url);
        params.set_opt("secret_token", secret_token);
        let upload = match certificate {
            Some(certificate) => certificate.prepare("certificate", &mut params).await?,
            None => None,
        };
        self.sender.call("setWebhook", params, upload).await
    }

    pub async fn delete_webhook(&self, drop_pending_updates: bool) -> Result<bool> {
        let params = Params::new().with("drop_pending_updates", drop_pending_updates);
        self.sender.call("deleteWebhook", params, None).await
    }

    pub async fn get_webhook_info(&self) -> Result<WebhookInfo> {
        self.sender.call("getWebhookInfo", Params::new(), None).await
    }
}
