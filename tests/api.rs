//! Bot methods against a local stand-in for the Bot API server.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{json, Value};
use telebot::inline::{InlineQueryResult, InlineQueryResultArticle};
use telebot::markup::{InlineKeyboardButton, InlineKeyboardMarkup};
use telebot::options::{
    AnswerInlineQueryOptions, GetUserProfilePhotosOptions, SendAudioOptions, SendLocationOptions,
    SendMessageOptions, SendPhotoOptions, SendStickerOptions, SendVideoOptions, SendVoiceOptions,
};
use telebot::{Bot, BotConfig, ChatAction, Error, InputFile, ParseMode, Poller};
use tokio::net::TcpListener;

const TOKEN: &str = "123:secret";

#[derive(Debug, Clone, Default)]
struct Recorded {
    method: String,
    multipart: bool,
    fields: Vec<(String, String)>,
    file: Option<(String, String, Vec<u8>)>,
}

impl Recorded {
    fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Recorded>>>);

impl Recorder {
    fn last(&self) -> Recorded {
        self.0.lock().unwrap().last().cloned().expect("no request recorded")
    }

    fn all(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }
}

fn message(chat_id: i64, text: Option<&str>) -> Value {
    json!({
        "message_id": 1,
        "date": 1_700_000_000,
        "chat": {"id": chat_id, "type": "private"},
        "text": text,
    })
}

fn ok(result: Value) -> Response {
    Json(json!({"ok": true, "result": result})).into_response()
}

async fn api(
    State(recorder): State<Recorder>,
    Path((bot, method)): Path<(String, String)>,
    request: Request,
) -> Response {
    if bot != format!("bot{TOKEN}") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"ok": false, "error_code": 401, "description": "Unauthorized"})),
        )
            .into_response();
    }

    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    let mut recorded = Recorded {
        method: method.clone(),
        multipart: is_multipart,
        ..Default::default()
    };
    if is_multipart {
        let mut multipart = Multipart::from_request(request, &()).await.unwrap();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let data = field.bytes().await.unwrap().to_vec();
                    recorded.file = Some((name, file_name, data));
                }
                None => {
                    let value = field.text().await.unwrap();
                    recorded.fields.push((name, value));
                }
            }
        }
    } else {
        let Form(fields) = Form::<Vec<(String, String)>>::from_request(request, &())
            .await
            .unwrap();
        recorded.fields = fields;
    }
    recorder.0.lock().unwrap().push(recorded.clone());

    let chat_id: i64 = recorded
        .field("chat_id")
        .and_then(|id| id.parse().ok())
        .unwrap_or(1);

    match method.as_str() {
        "getMe" => ok(json!({"id": 123, "is_bot": true, "first_name": "Echo", "username": "echo_bot"})),
        "sendMessage" if chat_id == 0 => (
            StatusCode::BAD_REQUEST,
            Json(json!({"ok": false, "error_code": 400, "description": "Bad Request: chat not found"})),
        )
            .into_response(),
        "sendMessage" => ok(message(chat_id, recorded.field("text"))),
        "sendPhoto" | "sendAudio" | "sendDocument" | "sendSticker" | "sendVideo" | "sendVoice"
        | "forwardMessage" | "sendLocation" => ok(message(chat_id, None)),
        "sendChatAction" | "answerInlineQuery" | "answerCallbackQuery" | "setWebhook"
        | "deleteWebhook" => ok(json!(true)),
        "getUserProfilePhotos" => ok(json!({
            "total_count": 1,
            "photos": [[{"file_id": "p1", "width": 160, "height": 160}]],
        })),
        "getFile" => ok(json!({"file_id": "doc1", "file_size": 5, "file_path": "documents/file_1.txt"})),
        "getUpdates" => {
            let offset: i64 = recorded
                .field("offset")
                .and_then(|offset| offset.parse().ok())
                .unwrap_or(0);
            let updates: Vec<Value> = [10, 11]
                .into_iter()
                .filter(|id| *id >= offset)
                .map(|id| json!({"update_id": id, "message": message(7, Some("hi"))}))
                .collect();
            ok(json!(updates))
        }
        "getWebhookInfo" => ok(json!("not an object")),
        "broken" => (StatusCode::BAD_GATEWAY, "<html>502</html>").into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"ok": false, "error_code": 404, "description": "Not Found"})),
        )
            .into_response(),
    }
}

async fn file(Path((_bot, path)): Path<(String, String)>) -> Response {
    if path == "documents/file_1.txt" {
        "hello".into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn fake_api() -> (Bot, Recorder) {
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/{bot}/{method}", post(api))
        .route("/file/{bot}/{*path}", get(file))
        .with_state(recorder.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let bot = Bot::with_config(BotConfig {
        api_base: format!("http://{addr}"),
        ..BotConfig::new(TOKEN)
    })
    .unwrap();
    (bot, recorder)
}

#[tokio::test]
async fn get_me_decodes_user() {
    let (bot, recorder) = fake_api().await;
    let me = bot.get_me().await.unwrap();
    assert_eq!(me.id, 123);
    assert_eq!(me.username.as_deref(), Some("echo_bot"));

    let request = recorder.last();
    assert_eq!(request.method, "getMe");
    assert!(!request.multipart);
    assert!(request.fields.is_empty());
}

#[tokio::test]
async fn send_message_is_form_encoded() {
    let (bot, recorder) = fake_api().await;
    let options = SendMessageOptions {
        parse_mode: Some(ParseMode::Html),
        reply_to_message_id: Some(5),
        reply_markup: Some(
            InlineKeyboardMarkup {
                inline_keyboard: vec![vec![InlineKeyboardButton::callback("Yes", "y")]],
            }
            .into(),
        ),
        ..Default::default()
    };
    let sent = bot
        .send_message(42, "<b>hi</b> & bye", Some(&options))
        .await
        .unwrap();
    assert_eq!(sent.chat.id, 42);
    assert_eq!(sent.text.as_deref(), Some("<b>hi</b> & bye"));

    let request = recorder.last();
    assert!(!request.multipart);
    assert_eq!(request.field("chat_id"), Some("42"));
    assert_eq!(request.field("text"), Some("<b>hi</b> & bye"));
    assert_eq!(request.field("parse_mode"), Some("HTML"));
    assert_eq!(request.field("reply_to_message_id"), Some("5"));
    assert_eq!(
        serde_json::from_str::<Value>(request.field("reply_markup").unwrap()).unwrap(),
        json!({"inline_keyboard": [[{"text": "Yes", "callback_data": "y"}]]})
    );
    assert_eq!(request.field("disable_notification"), None);
}

#[tokio::test]
async fn api_error_surfaces_description() {
    let (bot, _) = fake_api().await;
    let err = bot.send_message(0, "hello", None).await.unwrap_err();
    match err {
        Error::Api {
            error_code,
            description,
            ..
        } => {
            assert_eq!(error_code, 400);
            assert_eq!(description, "Bad Request: chat not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn wrong_token_is_unauthorized() {
    let (bot, _) = fake_api().await;
    let bot = Bot::with_config(BotConfig {
        token: "999:wrong".into(),
        ..bot.config().clone()
    })
    .unwrap();
    assert_eq!(bot.get_me().await.unwrap_err().error_code(), Some(401));
}

#[tokio::test]
async fn photo_by_id_is_not_uploaded() {
    let (bot, recorder) = fake_api().await;
    bot.send_photo(9, InputFile::remote("AgACAgIAAx"), None)
        .await
        .unwrap();

    let request = recorder.last();
    assert_eq!(request.method, "sendPhoto");
    assert!(!request.multipart);
    assert_eq!(request.field("photo"), Some("AgACAgIAAx"));
    assert_eq!(request.field("chat_id"), Some("9"));
}

#[tokio::test]
async fn photo_from_memory_is_multipart() {
    let (bot, recorder) = fake_api().await;
    let options = SendPhotoOptions {
        caption: Some("sunset".into()),
        ..Default::default()
    };
    bot.send_photo(
        "@channel",
        InputFile::memory("sunset.jpg", vec![0xff, 0xd8, 0xff]),
        Some(&options),
    )
    .await
    .unwrap();

    let request = recorder.last();
    assert!(request.multipart);
    assert_eq!(
        request.file,
        Some(("photo".to_string(), "sunset.jpg".to_string(), vec![0xff, 0xd8, 0xff]))
    );
    assert_eq!(request.field("chat_id"), Some("@channel"));
    assert_eq!(request.field("caption"), Some("sunset"));
    assert_eq!(request.field("photo"), None);
}

#[tokio::test]
async fn document_from_path_uses_base_name() {
    let (bot, recorder) = fake_api().await;
    let dir = std::env::temp_dir().join(format!("telebot-api-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join("report.csv");
    tokio::fs::write(&path, "a,b\n1,2\n").await.unwrap();

    bot.send_document(3, InputFile::path(&path), None).await.unwrap();
    tokio::fs::remove_dir_all(&dir).await.unwrap();

    let (field, file_name, data) = recorder.last().file.unwrap();
    assert_eq!(field, "document");
    assert_eq!(file_name, "report.csv");
    assert_eq!(data, b"a,b\n1,2\n");
}

#[tokio::test]
async fn media_methods_use_their_own_field() {
    let (bot, recorder) = fake_api().await;

    let audio = SendAudioOptions {
        duration: Some(215),
        performer: Some("Band".into()),
        title: Some("Song".into()),
        ..Default::default()
    };
    bot.send_audio(5, InputFile::memory("song.mp3", vec![1, 2]), Some(&audio))
        .await
        .unwrap();
    let request = recorder.last();
    assert_eq!(request.method, "sendAudio");
    assert_eq!(request.file.as_ref().map(|(field, ..)| field.as_str()), Some("audio"));
    assert_eq!(request.field("duration"), Some("215"));
    assert_eq!(request.field("performer"), Some("Band"));
    assert_eq!(request.field("title"), Some("Song"));

    let video = SendVideoOptions {
        duration: Some(12),
        caption: Some("clip".into()),
        ..Default::default()
    };
    bot.send_video(5, InputFile::memory("clip.mp4", vec![3]), Some(&video))
        .await
        .unwrap();
    let request = recorder.last();
    assert_eq!(request.method, "sendVideo");
    assert_eq!(request.file.as_ref().map(|(field, ..)| field.as_str()), Some("video"));
    assert_eq!(request.field("duration"), Some("12"));
    assert_eq!(request.field("caption"), Some("clip"));

    let voice = SendVoiceOptions {
        duration: Some(3),
        ..Default::default()
    };
    bot.send_voice(5, InputFile::remote("AwACAgIAAx"), Some(&voice))
        .await
        .unwrap();
    let request = recorder.last();
    assert_eq!(request.method, "sendVoice");
    assert!(!request.multipart);
    assert_eq!(request.field("voice"), Some("AwACAgIAAx"));
    assert_eq!(request.field("duration"), Some("3"));

    let sticker = SendStickerOptions {
        reply_to_message_id: Some(8),
        ..Default::default()
    };
    bot.send_sticker(5, InputFile::memory("sticker.webp", vec![4]), Some(&sticker))
        .await
        .unwrap();
    let request = recorder.last();
    assert_eq!(request.method, "sendSticker");
    assert_eq!(
        request.file,
        Some(("sticker".to_string(), "sticker.webp".to_string(), vec![4]))
    );
    assert_eq!(request.field("reply_to_message_id"), Some("8"));
    assert_eq!(request.field("chat_id"), Some("5"));
}

#[tokio::test]
async fn forward_and_location() {
    let (bot, recorder) = fake_api().await;
    let forwarded = bot.forward_message(4, "@source", 77, Some(true)).await.unwrap();
    assert_eq!(forwarded.chat.id, 4);

    let request = recorder.last();
    assert_eq!(request.method, "forwardMessage");
    assert_eq!(request.field("chat_id"), Some("4"));
    assert_eq!(request.field("from_chat_id"), Some("@source"));
    assert_eq!(request.field("message_id"), Some("77"));
    assert_eq!(request.field("disable_notification"), Some("true"));

    bot.forward_message(4, 6, 78, None).await.unwrap();
    assert_eq!(recorder.last().field("disable_notification"), None);

    let options = SendLocationOptions {
        reply_to_message_id: Some(9),
        ..Default::default()
    };
    bot.send_location(4, 55.75, 37.62, Some(&options)).await.unwrap();
    let request = recorder.last();
    assert_eq!(request.method, "sendLocation");
    assert_eq!(request.field("latitude"), Some("55.75"));
    assert_eq!(request.field("longitude"), Some("37.62"));
    assert_eq!(request.field("reply_to_message_id"), Some("9"));
}

#[tokio::test]
async fn profile_photos_and_callback_answer() {
    let (bot, recorder) = fake_api().await;
    let options = GetUserProfilePhotosOptions {
        offset: Some(1),
        limit: Some(10),
    };
    let photos = bot.get_user_profile_photos(321, Some(&options)).await.unwrap();
    assert_eq!(photos.total_count, 1);
    assert_eq!(photos.photos[0][0].file_id, "p1");

    let request = recorder.last();
    assert_eq!(request.method, "getUserProfilePhotos");
    assert_eq!(request.field("user_id"), Some("321"));
    assert_eq!(request.field("offset"), Some("1"));
    assert_eq!(request.field("limit"), Some("10"));

    assert!(bot
        .answer_callback_query("cb-1", Some("Saved"), Some(true))
        .await
        .unwrap());
    let request = recorder.last();
    assert_eq!(request.method, "answerCallbackQuery");
    assert_eq!(request.field("callback_query_id"), Some("cb-1"));
    assert_eq!(request.field("text"), Some("Saved"));
    assert_eq!(request.field("show_alert"), Some("true"));

    bot.answer_callback_query("cb-2", None, None).await.unwrap();
    let request = recorder.last();
    assert_eq!(request.field("text"), None);
    assert_eq!(request.field("show_alert"), None);
}

#[tokio::test]
async fn set_webhook_uploads_certificate() {
    let (bot, recorder) = fake_api().await;
    let pem = b"-----BEGIN CERTIFICATE-----".to_vec();
    assert!(bot
        .set_webhook(
            "https://example.org/hook",
            Some(InputFile::memory("cert.pem", pem.clone())),
            Some("s3cret"),
        )
        .await
        .unwrap());

    let request = recorder.last();
    assert_eq!(request.method, "setWebhook");
    assert!(request.multipart);
    assert_eq!(request.file, Some(("certificate".to_string(), "cert.pem".to_string(), pem)));
    assert_eq!(request.field("url"), Some("https://example.org/hook"));
    assert_eq!(request.field("secret_token"), Some("s3cret"));

    bot.set_webhook("https://example.org/hook", None, None)
        .await
        .unwrap();
    let request = recorder.last();
    assert!(!request.multipart);
    assert_eq!(request.field("certificate"), None);
    assert_eq!(request.field("secret_token"), None);
}

#[tokio::test]
async fn delete_webhook_can_drop_pending() {
    let (bot, recorder) = fake_api().await;
    assert!(bot.delete_webhook(true).await.unwrap());
    let request = recorder.last();
    assert_eq!(request.method, "deleteWebhook");
    assert_eq!(request.field("drop_pending_updates"), Some("true"));
}

#[tokio::test]
async fn transport_errors_do_not_show_the_token() {
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = closed.local_addr().unwrap();
    drop(closed);

    let bot = Bot::with_config(BotConfig {
        api_base: format!("http://{addr}"),
        ..BotConfig::new("123456:SUPERSECRET")
    })
    .unwrap();
    assert!(!format!("{bot:?}").contains("SUPERSECRET"));

    let err = bot.get_me().await.unwrap_err();
    assert!(matches!(err, Error::Http(_)), "unexpected error: {err:?}");
    assert!(!err.to_string().contains("SUPERSECRET"));
    assert!(!format!("{err:?}").contains("SUPERSECRET"));
}

#[tokio::test]
async fn chat_action_and_inline_answer() {
    let (bot, recorder) = fake_api().await;
    assert!(bot.send_chat_action(1, ChatAction::UploadPhoto).await.unwrap());
    assert_eq!(recorder.last().field("action"), Some("upload_photo"));

    let results = [InlineQueryResult::Article(InlineQueryResultArticle::new(
        "1", "Hello", "Hello!",
    ))];
    let options = AnswerInlineQueryOptions {
        is_personal: Some(true),
        ..Default::default()
    };
    assert!(bot
        .answer_inline_query("q-1", &results, Some(&options))
        .await
        .unwrap());

    let request = recorder.last();
    assert_eq!(request.field("inline_query_id"), Some("q-1"));
    assert_eq!(request.field("is_personal"), Some("True"));
    let sent: Value = serde_json::from_str(request.field("results").unwrap()).unwrap();
    assert_eq!(sent[0]["type"], "article");
    assert_eq!(sent[0]["message_text"], "Hello!");
}

#[tokio::test]
async fn get_file_and_download() {
    let (bot, _) = fake_api().await;
    let file = bot.get_file("doc1").await.unwrap();
    assert_eq!(
        bot.file_url(&file).unwrap(),
        format!("{}/file/bot{TOKEN}/documents/file_1.txt", bot.config().api_base)
    );
    let content = bot.download_file(&file).await.unwrap();
    assert_eq!(&content[..], b"hello");
}

#[tokio::test]
async fn download_without_path_fails() {
    let (bot, _) = fake_api().await;
    let file = telebot::types::File {
        file_id: "x".into(),
        file_size: None,
        file_path: None,
    };
    assert!(matches!(
        bot.download_file(&file).await,
        Err(Error::MissingFilePath(id)) if id == "x"
    ));
}

#[tokio::test]
async fn unexpected_result_shape_is_decode_error() {
    let (bot, _) = fake_api().await;
    assert!(matches!(bot.get_webhook_info().await, Err(Error::Decode(_))));
}

#[tokio::test]
async fn poller_advances_offset() {
    let (bot, recorder) = fake_api().await;
    let mut poller = Poller::new(bot).timeout(0);

    let first = poller.next_batch().await.unwrap();
    assert_eq!(first.iter().map(|u| u.update_id).collect::<Vec<_>>(), vec![10, 11]);
    assert_eq!(poller.offset(), Some(12));

    let second = poller.next_batch().await.unwrap();
    assert!(second.is_empty());
    assert_eq!(poller.offset(), Some(12));

    let requests = recorder.all();
    assert_eq!(requests[0].field("offset"), None);
    assert_eq!(requests[0].field("timeout"), Some("0"));
    assert_eq!(requests[1].field("offset"), Some("12"));
}

#[tokio::test]
async fn spawned_poller_forwards_updates() {
    let (bot, _) = fake_api().await;
    let (mut updates, handle) = Poller::new(bot).timeout(0).spawn();

    assert_eq!(updates.recv().await.unwrap().update_id, 10);
    assert_eq!(updates.recv().await.unwrap().chat_id(), Some(7));

    drop(updates);
    handle.abort();
}

#[tokio::test]
async fn non_json_error_page_is_status_error() {
    let (bot, _) = fake_api().await;
    let sender = telebot::sender::Sender::new(bot.config().clone()).unwrap();
    let err = sender
        .request("broken", telebot::Params::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Status { status, .. } if status == StatusCode::BAD_GATEWAY));
}
