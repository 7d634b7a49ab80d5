use crate::channels::{ChannelError, DecisionButton, Markup};
use crate::shared::ChatTarget;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

const KEYBOARD_ROW_WIDTH: usize = 3;
const POLL_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub(crate) struct TelegramApiClient {
    api_base: String,
    bot_token: String,
    poll_timeout: Duration,
    poll_agent: ureq::Agent,
    send_agent: ureq::Agent,
}

impl std::fmt::Debug for TelegramApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramApiClient")
            .field("api_base", &self.api_base)
            .field("poll_timeout", &self.poll_timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct TelegramEnvelope<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<u16>,
    result: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Update {
    pub(crate) update_id: i64,
    #[serde(default)]
    pub(crate) message: Option<TelegramMessage>,
    #[serde(default)]
    pub(crate) callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TelegramMessage {
    pub(crate) chat: Chat,
    #[serde(default)]
    pub(crate) text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Chat {
    pub(crate) id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TelegramUser {
    pub(crate) id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CallbackQuery {
    pub(crate) id: String,
    pub(crate) from: TelegramUser,
    #[serde(default)]
    pub(crate) message: Option<TelegramMessage>,
    #[serde(default)]
    pub(crate) data: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct InlineButton<'a> {
    text: &'a str,
    callback_data: &'a str,
}

pub(crate) fn reply_markup_json(markup: &Markup) -> Value {
    match markup {
        Markup::Menu(labels) => {
            let rows: Vec<Vec<Value>> = labels
                .chunks(KEYBOARD_ROW_WIDTH)
                .map(|row| row.iter().map(|label| json!({ "text": label })).collect())
                .collect();
            json!({ "keyboard": rows, "resize_keyboard": true })
        }
        Markup::Decision(buttons) => {
            let rows: Vec<Vec<InlineButton<'_>>> = buttons
                .chunks(KEYBOARD_ROW_WIDTH)
                .map(|row| {
                    row.iter()
                        .map(|DecisionButton { label, token }| InlineButton {
                            text: label,
                            callback_data: token,
                        })
                        .collect()
                })
                .collect();
            json!({ "inline_keyboard": rows })
        }
    }
}

fn chat_id_json(to: &ChatTarget) -> Value {
    match to.as_str().parse::<i64>() {
        Ok(id) => json!(id),
        Err(_) => json!(to.as_str()),
    }
}

impl TelegramApiClient {
    pub(crate) fn new(
        api_base: &str,
        bot_token: &str,
        poll_timeout: Duration,
        send_timeout: Duration,
    ) -> Self {
        let poll_agent = ureq::AgentBuilder::new()
            .timeout(poll_timeout + POLL_TIMEOUT_MARGIN)
            .build();
        let send_agent = ureq::AgentBuilder::new().timeout(send_timeout).build();
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            poll_timeout,
            poll_agent,
            send_agent,
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    /// ureq error text embeds the request url, which carries the token.
    fn redact(&self, raw: String) -> String {
        if self.bot_token.is_empty() {
            return raw;
        }
        raw.replace(&self.bot_token, "<redacted>")
    }

    fn map_error(&self, err: ureq::Error) -> ChannelError {
        match err {
            ureq::Error::Status(status, response) => {
                let description = response
                    .into_json::<TelegramEnvelope<Value>>()
                    .ok()
                    .and_then(|envelope| envelope.description)
                    .unwrap_or_else(|| format!("http status {status}"));
                ChannelError::Api {
                    status,
                    description: self.redact(description),
                }
            }
            ureq::Error::Transport(transport) => {
                ChannelError::Request(self.redact(transport.to_string()))
            }
        }
    }

    fn unwrap_envelope<T>(
        &self,
        method: &str,
        envelope: TelegramEnvelope<T>,
    ) -> Result<T, ChannelError> {
        if !envelope.ok {
            return Err(ChannelError::Api {
                status: envelope.error_code.unwrap_or(200),
                description: envelope
                    .description
                    .unwrap_or_else(|| format!("{method} failed")),
            });
        }
        envelope
            .result
            .ok_or_else(|| ChannelError::Decode(format!("{method} returned no result")))
    }

    pub(crate) fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, ChannelError> {
        let mut query = vec![
            ("timeout", self.poll_timeout.as_secs().to_string()),
            (
                "allowed_updates",
                r#"["message","callback_query"]"#.to_string(),
            ),
        ];
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }
        let encoded = query
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}?{encoded}", self.endpoint("getUpdates"));

        let response = self
            .poll_agent
            .get(&url)
            .call()
            .map_err(|e| self.map_error(e))?;
        let envelope: TelegramEnvelope<Vec<Update>> = response
            .into_json()
            .map_err(|e| ChannelError::Decode(e.to_string()))?;
        self.unwrap_envelope("getUpdates", envelope)
    }

    pub(crate) fn send_message(
        &self,
        to: &ChatTarget,
        text: &str,
        markup: Option<&Markup>,
    ) -> Result<(), ChannelError> {
        let mut body = json!({
            "chat_id": chat_id_json(to),
            "text": text,
        });
        if let Some(markup) = markup {
            body["reply_markup"] = reply_markup_json(markup);
        }

        let response = self
            .send_agent
            .post(&self.endpoint("sendMessage"))
            .send_json(body)
            .map_err(|e| self.map_error(e))?;
        let envelope: TelegramEnvelope<Value> = response
            .into_json()
            .map_err(|e| ChannelError::Decode(e.to_string()))?;
        self.unwrap_envelope("sendMessage", envelope).map(|_| ())
    }

    /// Stops the client-side spinner on a pressed inline button.
    pub(crate) fn answer_callback_query(&self, query_id: &str) -> Result<(), ChannelError> {
        let response = self
            .send_agent
            .post(&self.endpoint("answerCallbackQuery"))
            .send_json(answer_callback_body(query_id))
            .map_err(|e| self.map_error(e))?;
        let envelope: TelegramEnvelope<Value> = response
            .into_json()
            .map_err(|e| ChannelError::Decode(e.to_string()))?;
        self.unwrap_envelope("answerCallbackQuery", envelope)
            .map(|_| ())
    }
}

fn answer_callback_body(query_id: &str) -> Value {
    json!({ "callback_query_id": query_id })
}
