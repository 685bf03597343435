use std::time::Duration;

use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::bot::Bot;
use crate::error::Result;
use crate::options::GetUpdatesOptions;
use crate::types::Update;

const DEFAULT_TIMEOUT_SECS: i64 = 30;
const DEFAULT_ERROR_PAUSE: Duration = Duration::from_secs(3);
const CHANNEL_CAPACITY: usize = 64;

/// Long polling over `getUpdates` that confirms every update it hands out.
#[derive(Debug)]
pub struct Poller {
    bot: Bot,
    offset: Option<i64>,
    limit: Option<i64>,
    timeout: i64,
    allowed_updates: Option<Vec<String>>,
    error_pause: Duration,
}

impl Poller {
    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            offset: None,
            limit: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            allowed_updates: None,
            error_pause: DEFAULT_ERROR_PAUSE,
        }
    }

    /// Server side wait per round, in seconds. 0 turns long polling off.
    /// Capped below the client's request timeout, see [`Poller::poll_timeout`].
    pub fn timeout(mut self, secs: i64) -> Self {
        self.timeout = secs;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn allowed_updates<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_updates = Some(kinds.into_iter().map(Into::into).collect());
        self
    }

    /// Fixed delay before the next round after a failed one.
    pub fn error_pause(mut self, pause: Duration) -> Self {
        self.error_pause = pause;
        self
    }

    /// Wait sent to the server: the configured timeout, kept at least one
    /// second under `BotConfig::timeout` so a round ends before the
    /// request itself times out.
    pub fn poll_timeout(&self) -> i64 {
        let ceiling = self.bot.config().timeout.as_secs().saturating_sub(1);
        let ceiling = i64::try_from(ceiling).unwrap_or(i64::MAX);
        self.timeout.clamp(0, ceiling)
    }

    /// Next update id that will be requested.
    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// One `getUpdates` round. Advances the offset past the returned batch.
    pub async fn next_batch(&mut self) -> Result<Vec<Update>> {
        let options = GetUpdatesOptions {
            offset: self.offset,
            limit: self.limit,
            timeout: Some(self.poll_timeout()),
            allowed_updates: self.allowed_updates.clone(),
        };
        let updates = self.bot.get_updates(Some(&options)).await?;
        if let Some(next) = next_offset(&updates) {
            self.offset = Some(next);
        }
        debug!("poller: {} updates, next offset {:?}", updates.len(), self.offset);
        Ok(updates)
    }

    /// Runs the polling loop on a background task. The loop stops once the
    /// receiver is dropped.
    pub fn spawn(mut self) -> (mpsc::Receiver<Update>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let handle = tokio::spawn(async move {
            loop {
                if tx.is_closed() {
                    break;
                }
                match self.next_batch().await {
                    Ok(updates) => {
                        for update in updates {
                            if tx.send(update).await.is_err() {
                                debug!("poller: receiver dropped, stopping");
                                return;
                            }
                        }
                    }
                    Err(err) => {
                        warn!("poller: getUpdates failed: {err}");
                        tokio::time::sleep(self.error_pause).await;
                    }
                }
            }
        });
        (rx, handle)
    }
}

/// Offset that confirms every update in `updates`.
pub fn next_offset(updates: &[Update]) -> Option<i64> {
    updates.iter().map(|update| update.update_id).max().map(|id| id + 1)
}
