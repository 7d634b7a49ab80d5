use super::{Channel, ChannelError, InboundEvent, Markup};
use crate::config::RuntimeConfig;
use crate::shared::{ChatTarget, UserId};
use api::{TelegramApiClient, Update};
use std::sync::Mutex;
use std::time::Duration;

pub mod api;

/// Bot API adapter: long-polls `getUpdates`, posts with `sendMessage` and
/// acknowledges button presses with `answerCallbackQuery`.
#[derive(Debug)]
pub struct TelegramChannel {
    api: TelegramApiClient,
    next_offset: Mutex<Option<i64>>,
}

impl TelegramChannel {
    pub fn new(
        api_base: &str,
        bot_token: &str,
        poll_timeout: Duration,
        send_timeout: Duration,
    ) -> Self {
        Self {
            api: TelegramApiClient::new(api_base, bot_token, poll_timeout, send_timeout),
            next_offset: Mutex::new(None),
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(
            &config.api_base,
            &config.bot_token,
            config.poll_timeout,
            config.send_timeout,
        )
    }
}

impl Channel for TelegramChannel {
    fn poll(&self) -> Result<Vec<InboundEvent>, ChannelError> {
        let offset = *self
            .next_offset
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let updates = self.api.get_updates(offset)?;
        let (events, next) = events_from_updates(&updates);
        if let Some(next) = next {
            let mut guard = self
                .next_offset
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *guard = Some(next);
        }
        for query_id in callback_query_ids(&updates) {
            // A lost acknowledgement only leaves the button spinner running.
            let _ = self.api.answer_callback_query(query_id);
        }
        Ok(events)
    }

    fn send_text(
        &self,
        to: &ChatTarget,
        text: &str,
        markup: Option<&Markup>,
    ) -> Result<(), ChannelError> {
        self.api.send_message(to, text, markup)
    }
}

/// Converts raw updates into inbound events and returns the offset that
/// acknowledges all of them.
pub(crate) fn events_from_updates(updates: &[Update]) -> (Vec<InboundEvent>, Option<i64>) {
    let mut events = Vec::new();
    let mut next_offset = None;
    for update in updates {
        next_offset = Some(next_offset.unwrap_or(i64::MIN).max(update.update_id + 1));

        if let Some(message) = &update.message {
            if let Some(text) = &message.text {
                events.push(InboundEvent::Text {
                    user: UserId::new(message.chat.id),
                    text: text.clone(),
                });
            }
            continue;
        }

        if let Some(query) = &update.callback_query {
            let Some(token) = query.data.as_ref() else {
                continue;
            };
            let chat = query
                .message
                .as_ref()
                .map(|message| message.chat.id)
                .unwrap_or(query.from.id);
            events.push(InboundEvent::Decision {
                user: UserId::new(chat),
                token: token.clone(),
            });
        }
    }
    (events, next_offset)
}

/// Ids of every button press in the batch, including presses that carry
/// no token, so each one can be acknowledged.
pub(crate) fn callback_query_ids(updates: &[Update]) -> Vec<&str> {
    updates
        .iter()
        .filter(|update| update.message.is_none())
        .filter_map(|update| update.callback_query.as_ref())
        .map(|query| query.id.as_str())
        .collect()
}
