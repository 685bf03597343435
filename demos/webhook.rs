use std::net::SocketAddr;

use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use telebot::{Bot, BotConfig, InputFile, Webhook};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let public_url = std::env::var("WEBHOOK_URL")?;
    let secret = std::env::var("WEBHOOK_SECRET")?;
    let cert = std::env::var("WEBHOOK_CERT").unwrap_or_else(|_| "cert.pem".into());
    let key = std::env::var("WEBHOOK_KEY").unwrap_or_else(|_| "key.pem".into());

    let bot = Bot::with_config(BotConfig::from_env()?)?;
    bot.set_webhook(&public_url, Some(InputFile::path(&cert)), Some(&secret))
        .await?;
    info!("webhook info: {:?}", bot.get_webhook_info().await?);

    let (tx, mut rx) = mpsc::channel(64);
    let addr = SocketAddr::from(([0, 0, 0, 0], 8443));
    tokio::spawn(async move {
        if let Err(err) = Webhook::new("/telegram")
            .secret_token(secret)
            .serve_tls(addr, cert, key, tx)
            .await
        {
            error!("webhook server stopped: {err}");
        }
    });

    while let Some(update) = rx.recv().await {
        if let Some(message) = update.message {
            let text = format!("got it -- {}", message.text.unwrap_or_default());
            bot.send_message(message.chat.id, &text, None).await?;
        }
    }

    Ok(())
}
