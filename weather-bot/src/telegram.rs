//! Telegram transport: long polling in, `sendMessage` out.
//!
//! Updates are converted into the core's inbound types and handed to
//! [`WeatherBot`]. Handler errors are logged here and never stop the
//! dispatcher.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use teloxide::{
    Bot, RequestError,
    dispatching::{Dispatcher, UpdateFilterExt, UpdateHandler},
    dptree,
    payloads::SendMessageSetters,
    prelude::{Requester, ResponseResult},
    types::{
        BotCommand, ButtonRequest, CallbackQuery, ChatId, InlineKeyboardButton,
        InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, Message, ReplyMarkup, Update,
    },
};
use tracing::{debug, error, info, warn};
use weather_core::{
    BotOptions, Config, Coordinates, InboundMessage, Keyboard, MessageContent, Messenger,
    WeatherBot, WeatherFetcher, WeatherProvider, provider::provider_from_config,
};

/// [`Messenger`] backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramMessenger {
    api: Bot,
}

impl TelegramMessenger {
    pub fn new(api: Bot) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> anyhow::Result<()> {
        let mut request = self.api.send_message(ChatId(chat_id), text);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(reply_markup(keyboard));
        }

        request
            .await
            .with_context(|| format!("Failed to send message to chat {chat_id}"))?;

        Ok(())
    }
}

pub fn reply_markup(keyboard: Keyboard) -> ReplyMarkup {
    match keyboard {
        Keyboard::RequestLocation { label } => {
            let button = KeyboardButton::new(label).request(ButtonRequest::Location);
            ReplyMarkup::Keyboard(
                KeyboardMarkup::new(vec![vec![button]])
                    .resize_keyboard()
                    .one_time_keyboard(),
            )
        }
        Keyboard::Inline(buttons) => ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(
            buttons
                .into_iter()
                .map(|b| vec![InlineKeyboardButton::callback(b.label, b.data)]),
        )),
    }
}

/// Text and location messages; `None` for every other message kind.
pub fn to_inbound_message(msg: &Message) -> Option<InboundMessage> {
    let content = if let Some(text) = msg.text() {
        MessageContent::Text(text.to_string())
    } else if let Some(location) = msg.location() {
        MessageContent::Location(Some(Coordinates::new(
            location.latitude,
            location.longitude,
        )))
    } else {
        return None;
    };

    Some(InboundMessage {
        sender_id: msg.from.as_ref().map(|u| u.id.0).unwrap_or_default(),
        chat_id: msg.chat.id.0,
        received_at: msg.date,
        content,
    })
}

/// Replies go to the chat holding the keyboard, or to the presser when
/// Telegram no longer has that message.
pub fn to_callback_query(query: &CallbackQuery) -> weather_core::CallbackQuery {
    let chat_id = query
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or_else(|| ChatId::from(query.from.id));

    weather_core::CallbackQuery {
        sender_id: query.from.id.0,
        chat_id: chat_id.0,
        data: query.data.clone(),
    }
}

pub fn build_handler() -> UpdateHandler<RequestError> {
    dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback))
}

async fn on_message(msg: Message, handlers: Arc<WeatherBot>) -> ResponseResult<()> {
    let Some(inbound) = to_inbound_message(&msg) else {
        debug!(msg_id = msg.id.0, "ignoring unsupported message type");
        return Ok(());
    };

    if let Err(err) = handlers.handle_message(&inbound).await {
        error!(chat_id = inbound.chat_id, "failed to handle message: {err:#}");
    }

    Ok(())
}

async fn on_callback(
    api: Bot,
    query: CallbackQuery,
    handlers: Arc<WeatherBot>,
) -> ResponseResult<()> {
    let outcome = handlers.handle_callback(&to_callback_query(&query)).await;
    debug!(?outcome, "callback handled");

    // Stops the client-side spinner on the pressed button.
    if let Err(err) = api.answer_callback_query(query.id.clone()).await {
        warn!(error = %err, "failed to answer callback query");
    }

    Ok(())
}

async fn register_commands(api: &Bot) {
    let commands = vec![BotCommand::new(
        "weather",
        "weather for a city (/weather <city>) or for your location",
    )];

    if let Err(err) = api.set_my_commands(commands).await {
        warn!(error = %err, "failed to register bot commands");
    }
}

/// Username used to tell our commands from other bots' in group chats.
async fn own_username(api: &Bot) -> Option<String> {
    match api.get_me().await {
        Ok(me) => me.user.username,
        Err(err) => {
            warn!(error = %err, "failed to fetch bot username, accepting any mention");
            None
        }
    }
}

/// Builds the handlers from `config` and polls Telegram until Ctrl-C.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let token = config.require_bot_token()?;
    let provider: Arc<dyn WeatherProvider> = Arc::from(provider_from_config(&config)?);

    let api = Bot::new(token);
    let username = own_username(&api).await;
    let handlers = Arc::new(WeatherBot::new(
        WeatherFetcher::new(provider),
        Arc::new(TelegramMessenger::new(api.clone())),
        BotOptions {
            location_requests: config.telegram.location_requests,
            username,
        },
    ));

    register_commands(&api).await;
    info!("Weather telegram bot started");

    Dispatcher::builder(api, build_handler())
        .dependencies(dptree::deps![handlers])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Weather telegram bot stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::keyboard;

    fn private_chat() -> serde_json::Value {
        serde_json::json!({
            "id": 555i64,
            "type": "private",
            "first_name": "Test",
        })
    }

    fn sender() -> serde_json::Value {
        serde_json::json!({
            "id": 12345u64,
            "is_bot": false,
            "first_name": "Test",
        })
    }

    fn make_message(extra: serde_json::Value) -> Message {
        let mut json = serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": private_chat(),
            "from": sender(),
        });
        if let (Some(obj), Some(extra)) = (json.as_object_mut(), extra.as_object()) {
            obj.extend(extra.clone());
        }

        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    #[test]
    fn text_message_maps_fields() {
        let msg = make_message(serde_json::json!({"text": "/weather Paris"}));
        let inbound = to_inbound_message(&msg).unwrap();

        assert_eq!(inbound.sender_id, 12345);
        assert_eq!(inbound.chat_id, 555);
        assert_eq!(inbound.received_at.timestamp(), 1_700_000_000);
        assert_eq!(inbound.content, MessageContent::Text("/weather Paris".into()));
    }

    #[test]
    fn location_message_maps_coordinates() {
        let msg = make_message(serde_json::json!({
            "location": {"latitude": 59.93, "longitude": 30.33}
        }));
        let inbound = to_inbound_message(&msg).unwrap();

        assert_eq!(
            inbound.content,
            MessageContent::Location(Some(Coordinates::new(59.93, 30.33)))
        );
    }

    #[test]
    fn other_message_kinds_are_skipped() {
        let msg = make_message(serde_json::json!({
            "contact": {"phone_number": "+100", "first_name": "Ann"}
        }));
        assert!(to_inbound_message(&msg).is_none());
    }

    #[test]
    fn callback_replies_to_keyboard_chat() {
        let query: CallbackQuery = serde_json::from_value(serde_json::json!({
            "id": "42",
            "from": sender(),
            "chat_instance": "ci",
            "data": "today|Berlin",
            "message": {
                "message_id": 9,
                "date": 1700000000i64,
                "chat": private_chat(),
                "text": "Please, select period",
            },
        }))
        .unwrap();

        let press = to_callback_query(&query);
        assert_eq!(press.sender_id, 12345);
        assert_eq!(press.chat_id, 555);
        assert_eq!(press.data.as_deref(), Some("today|Berlin"));
    }

    #[test]
    fn callback_without_message_replies_to_sender() {
        let query: CallbackQuery = serde_json::from_value(serde_json::json!({
            "id": "42",
            "from": sender(),
            "chat_instance": "ci",
            "data": "current|Berlin",
        }))
        .unwrap();

        assert_eq!(to_callback_query(&query).chat_id, 12345);
    }

    #[test]
    fn location_keyboard_is_one_time() {
        let json = serde_json::to_value(reply_markup(keyboard::location_request())).unwrap();

        assert_eq!(json["one_time_keyboard"], true);
        assert_eq!(json["resize_keyboard"], true);
        assert_eq!(json["keyboard"][0][0]["text"], "send location");
        assert_eq!(json["keyboard"][0][0]["request_location"], true);
        assert_eq!(json["keyboard"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn period_keyboard_has_one_button_per_row() {
        let json = serde_json::to_value(reply_markup(keyboard::period_choice("Oslo"))).unwrap();
        let rows = json["inline_keyboard"].as_array().unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0]["text"], "current");
        assert_eq!(rows[0][0]["callback_data"], "current|Oslo");
        assert_eq!(rows[2][0]["text"], "tomorrow");
        assert_eq!(rows[2][0]["callback_data"], "tomorrow|Oslo");
    }
}
