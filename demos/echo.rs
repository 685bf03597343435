use log::{error, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use telebot::options::SendMessageOptions;
use telebot::{Bot, BotConfig, ChatAction, Poller};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let bot = Bot::with_config(BotConfig::from_env()?)?;
    let me = bot.get_me().await?;
    println!("running as @{}", me.username.unwrap_or(me.first_name));

    let (mut updates, _poller) = Poller::new(bot.clone())
        .allowed_updates(["message"])
        .spawn();

    while let Some(update) = updates.recv().await {
        let Some(message) = update.message else {
            continue;
        };
        let chat_id = message.chat.id;

        let text = match message.command() {
            Some(command) if command.name == "ping" => "pong".to_string(),
            Some(command) => format!("unknown command /{}", command.name),
            None => match message.text.clone() {
                Some(text) => text,
                None => continue,
            },
        };

        let options = SendMessageOptions {
            reply_to_message_id: Some(message.message_id),
            ..Default::default()
        };
        if let Err(err) = bot.send_chat_action(chat_id, ChatAction::Typing).await {
            error!("sendChatAction: {err}");
        }
        if let Err(err) = bot.send_message(chat_id, &text, Some(&options)).await {
            error!("sendMessage: {err}");
        }
    }

    Ok(())
}
