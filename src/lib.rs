//! Typed client for the Telegram Bot API.
//!
//! [`Bot`] turns method calls into form-encoded or multipart requests against
//! `https://api.telegram.org/bot<token>/<method>` and decodes the JSON
//! envelope into typed results or an [`Error`]. Updates arrive either through
//! [`Poller`] (long polling) or through a [`Webhook`] endpoint.
//!
//! ```no_run
//! # async fn run() -> telebot::Result<()> {
//! let bot = telebot::Bot::new("123456:token")?;
//! let me = bot.get_me().await?;
//! bot.send_message(42, &format!("hi from {}", me.first_name), None).await?;
//! # Ok(())
//! # }
//! ```

mod bot;
mod config;
mod error;
pub mod inline;
mod input_file;
pub mod markup;
pub mod options;
mod params;
mod poller;
pub mod sender;
pub mod types;
pub mod webhook;

pub use crate::bot::Bot;
pub use crate::config::{BotConfig, DEFAULT_API_BASE};
pub use crate::error::{Error, Result};
pub use crate::input_file::{InputFile, Upload};
pub use crate::params::{AppendParams, Params};
pub use crate::poller::{next_offset, Poller};
pub use crate::types::{ChatAction, ChatId, Message, ParseMode, Update, User};
pub use crate::webhook::Webhook;
