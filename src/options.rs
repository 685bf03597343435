//! Optional parameters of the Bot API methods.
//!
//! Every field is optional and only the fields that are set end up in the
//! request.

use crate::error::Result;
use crate::markup::ReplyMarkup;
use crate::params::{AppendParams, Params};
use crate::types::ParseMode;

fn append_reply(
    params: &mut Params,
    reply_to_message_id: Option<i64>,
    reply_markup: Option<&ReplyMarkup>,
) -> Result<()> {
    params.set_opt("reply_to_message_id", reply_to_message_id);
    if let Some(markup) = reply_markup {
        params.set("reply_markup", markup.to_json()?);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendMessageOptions {
    pub parse_mode: Option<ParseMode>,
    pub disable_web_page_preview: Option<bool>,
    pub disable_notification: Option<bool>,
    pub reply_to_message_id: Option<i64>,
    pub reply_markup: Option<ReplyMarkup>,
}

impl AppendParams for SendMessageOptions {
    fn append_params(&self, params: &mut Params) -> Result<()> {
        params
            .set_opt("parse_mode", self.parse_mode)
            .set_opt("disable_web_page_preview", self.disable_web_page_preview)
            .set_opt("disable_notification", self.disable_notification);
        append_reply(params, self.reply_to_message_id, self.reply_markup.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendPhotoOptions {
    pub caption: Option<String>,
    pub reply_to_message_id: Option<i64>,
    pub reply_markup: Option<ReplyMarkup>,
}

impl AppendParams for SendPhotoOptions {
    fn append_params(&self, params: &mut Params) -> Result<()> {
        params.set_opt("caption", self.caption.as_deref());
        append_reply(params, self.reply_to_message_id, self.reply_markup.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendAudioOptions {
    /// Duration in seconds.
    pub duration: Option<i64>,
    pub performer: Option<String>,
    pub title: Option<String>,
    pub reply_to_message_id: Option<i64>,
    pub reply_markup: Option<ReplyMarkup>,
}

impl AppendParams for SendAudioOptions {
    fn append_params(&self, params: &mut Params) -> Result<()> {
        params
            .set_opt("duration", self.duration)
            .set_opt("performer", self.performer.as_deref())
            .set_opt("title", self.title.as_deref());
        append_reply(params, self.reply_to_message_id, self.reply_markup.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendDocumentOptions {
    pub reply_to_message_id: Option<i64>,
    pub reply_markup: Option<ReplyMarkup>,
}

impl AppendParams for SendDocumentOptions {
    fn append_params(&self, params: &mut Params) -> Result<()> {
        append_reply(params, self.reply_to_message_id, self.reply_markup.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendStickerOptions {
    pub reply_to_message_id: Option<i64>,
    pub reply_markup: Option<ReplyMarkup>,
}

impl AppendParams for SendStickerOptions {
    fn append_params(&self, params: &mut Params) -> Result<()> {
        append_reply(params, self.reply_to_message_id, self.reply_markup.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendVideoOptions {
    pub duration: Option<i64>,
    pub caption: Option<String>,
    pub reply_to_message_id: Option<i64>,
    pub reply_markup: Option<ReplyMarkup>,
}

impl AppendParams for SendVideoOptions {
    fn append_params(&self, params: &mut Params) -> Result<()> {
        params
            .set_opt("duration", self.duration)
            .set_opt("caption", self.caption.as_deref());
        append_reply(params, self.reply_to_message_id, self.reply_markup.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendVoiceOptions {
    pub duration: Option<i64>,
    pub reply_to_message_id: Option<i64>,
    pub reply_markup: Option<ReplyMarkup>,
}

impl AppendParams for SendVoiceOptions {
    fn append_params(&self, params: &mut Params) -> Result<()> {
        params.set_opt("duration", self.duration);
        append_reply(params, self.reply_to_message_id, self.reply_markup.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendLocationOptions {
    pub reply_to_message_id: Option<i64>,
    pub reply_markup: Option<ReplyMarkup>,
}

impl AppendParams for SendLocationOptions {
    fn append_params(&self, params: &mut Params) -> Result<()> {
        append_reply(params, self.reply_to_message_id, self.reply_markup.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetUserProfilePhotosOptions {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl AppendParams for GetUserProfilePhotosOptions {
    fn append_params(&self, params: &mut Params) -> Result<()> {
        params.set_opt("offset", self.offset).set_opt("limit", self.limit);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerInlineQueryOptions {
    /// Seconds the server may cache the answer for.
    pub cache_time: Option<i64>,
    pub is_personal: Option<bool>,
    pub next_offset: Option<String>,
}

impl AppendParams for AnswerInlineQueryOptions {
    fn append_params(&self, params: &mut Params) -> Result<()> {
        params.set_opt("cache_time", self.cache_time);
        // sent capitalised
        if let Some(personal) = self.is_personal {
            params.set("is_personal", if personal { "True" } else { "False" });
        }
        params.set_opt("next_offset", self.next_offset.as_deref());
        Ok(())
    }
}

/// Long polling parameters of `getUpdates`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetUpdatesOptions {
    /// First update id to return; earlier updates are confirmed and dropped.
    pub offset: Option<i64>,
    /// 1-100, server default is 100.
    pub limit: Option<i64>,
    /// Long polling timeout in seconds.
    pub timeout: Option<i64>,
    pub allowed_updates: Option<Vec<String>>,
}

impl AppendParams for GetUpdatesOptions {
    fn append_params(&self, params: &mut Params) -> Result<()> {
        params
            .set_opt("offset", self.offset)
            .set_opt("limit", self.limit)
            .set_opt("timeout", self.timeout);
        if let Some(allowed) = &self.allowed_updates {
            params.set_json("allowed_updates", allowed)?;
        }
        Ok(())
    }
}
