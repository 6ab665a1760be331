//! Classification of inbound Slack webhook calls.
//!
//! Every request is parsed once into an [`InboundEvent`] carrying only the
//! fields its dispatch branch needs. Parsing never touches the network.

use serde::Deserialize;
use serde_json::Value;

use crate::base::error::ValidationError;

/// One inbound webhook call.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// `/grammarbot <text>`.
    SlashCommand(SlashCommand),
    /// An Events API delivery.
    EventCallback(EventCallback),
    /// A block action on one of our messages.
    InteractionCallback(InteractionCallback),
}

/// Form body of a slash command.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SlashCommand {
    /// Everything after the command name.
    #[serde(default)]
    pub text: String,
    /// The command name, e.g. `/grammarbot`.
    #[serde(default)]
    pub command: Option<String>,
    /// The invoking user.
    #[serde(default)]
    pub user_id: Option<String>,
    /// The channel the command was typed in.
    #[serde(default)]
    pub channel_id: Option<String>,
}

/// Events API callback.
#[derive(Debug, Clone, PartialEq)]
pub enum EventCallback {
    /// Slack's endpoint check; the challenge is echoed back.
    UrlVerification {
        /// Token to echo.
        challenge: String,
    },
    /// A `message` event.
    Message(ChatEvent),
    /// An `app_mention` event.
    AppMention(ChatEvent),
    /// Any other envelope or inner event type.
    Unsupported {
        /// The inner event type, or `envelope` for unknown envelopes.
        event_type: String,
    },
}

/// The inner `event` of a `message` or `app_mention` callback.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatEvent {
    /// `message` or `app_mention`.
    #[serde(rename = "type", default)]
    pub event_type: String,
    /// Message text, including any mention tokens.
    pub text: Option<String>,
    /// Channel ID.
    pub channel: Option<String>,
    /// Timestamp of the triggering message.
    pub ts: Option<String>,
    /// Author user ID.
    pub user: Option<String>,
    /// Set when a bot posted the message.
    pub bot_id: Option<String>,
    /// Message subtype, e.g. `bot_message`.
    pub subtype: Option<String>,
}

impl ChatEvent {
    /// Whether Slack flags this event as coming from a bot (including us).
    pub fn is_from_bot(&self) -> bool {
        self.bot_id.is_some() || self.subtype.as_deref() == Some("bot_message")
    }
}

/// Block-actions interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionCallback {
    /// A button press.
    ButtonClick {
        /// Which button.
        action_id: String,
        /// The button's value.
        value: Option<String>,
        /// Short-lived id needed to open a modal.
        trigger_id: Option<String>,
    },
    /// A new option picked in a select menu.
    SelectChange {
        /// Which select.
        action_id: String,
        /// Value of the selected option.
        selected: String,
        /// Channel of the message holding the select.
        channel_id: Option<String>,
        /// Timestamp of that message.
        message_ts: Option<String>,
        /// That message's blocks, as Slack echoes them back.
        blocks: Vec<Value>,
    },
    /// A `block_actions` payload with no actions.
    NoAction,
    /// Any payload type other than `block_actions` (e.g. `view_closed`).
    Unsupported {
        /// The payload `type`.
        kind: String,
    },
}

// Wire shapes.

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum EventEnvelope {
    UrlVerification { challenge: String },
    EventCallback { event: Value },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct InteractionPayload {
    #[serde(rename = "type")]
    kind: String,
    trigger_id: Option<String>,
    #[serde(default)]
    actions: Vec<ActionPayload>,
    channel: Option<IdRef>,
    container: Option<ContainerRef>,
    message: Option<MessageRef>,
}

#[derive(Deserialize)]
struct ActionPayload {
    action_id: String,
    value: Option<String>,
    selected_option: Option<SelectedOption>,
}

#[derive(Deserialize)]
struct SelectedOption {
    value: String,
}

#[derive(Deserialize)]
struct IdRef {
    id: String,
}

#[derive(Deserialize)]
struct ContainerRef {
    channel_id: Option<String>,
    message_ts: Option<String>,
}

#[derive(Deserialize)]
struct MessageRef {
    ts: Option<String>,
    #[serde(default)]
    blocks: Vec<Value>,
}

// Parsing.

impl InboundEvent {
    /// Classify a slash command form body.
    pub fn slash_command(command: SlashCommand) -> Self {
        InboundEvent::SlashCommand(command)
    }

    /// Classify an Events API JSON body.
    pub fn from_events_body(body: &[u8]) -> Result<Self, ValidationError> {
        let envelope: EventEnvelope = serde_json::from_slice(body).map_err(|e| ValidationError::Payload(e.to_string()))?;

        let callback = match envelope {
            EventEnvelope::UrlVerification { challenge } => EventCallback::UrlVerification { challenge },
            EventEnvelope::EventCallback { event } => {
                // Other event types may carry objects in `channel` or `user`, so only
                // the two chat shapes are deserialized.
                let event_type = event.get("type").and_then(Value::as_str).unwrap_or_default().to_string();

                match event_type.as_str() {
                    "message" => EventCallback::Message(parse_chat_event(event)?),
                    "app_mention" => EventCallback::AppMention(parse_chat_event(event)?),
                    _ => EventCallback::Unsupported { event_type },
                }
            }
            EventEnvelope::Other => EventCallback::Unsupported { event_type: "envelope".to_string() },
        };

        Ok(InboundEvent::EventCallback(callback))
    }

    /// Classify the `payload` form field of an interaction callback.
    ///
    /// Slack wraps the JSON action description inside a form-encoded field,
    /// so this decodes the nested JSON before looking at anything.
    pub fn from_interaction_payload(payload: Option<&str>) -> Result<Self, ValidationError> {
        let payload = payload.ok_or(ValidationError::MissingField("payload"))?;
        let payload: InteractionPayload = serde_json::from_str(payload).map_err(|e| ValidationError::Payload(e.to_string()))?;

        if payload.kind != "block_actions" {
            return Ok(InboundEvent::InteractionCallback(InteractionCallback::Unsupported { kind: payload.kind }));
        }

        let Some(action) = payload.actions.into_iter().next() else {
            return Ok(InboundEvent::InteractionCallback(InteractionCallback::NoAction));
        };

        let callback = match action.selected_option {
            Some(selected) => {
                let channel_id = payload.channel.map(|c| c.id).or_else(|| payload.container.as_ref().and_then(|c| c.channel_id.clone()));
                let (message_ts, blocks) = match payload.message {
                    Some(message) => (message.ts, message.blocks),
                    None => (None, Vec::new()),
                };
                let message_ts = message_ts.or_else(|| payload.container.and_then(|c| c.message_ts));

                InteractionCallback::SelectChange {
                    action_id: action.action_id,
                    selected: selected.value,
                    channel_id,
                    message_ts,
                    blocks,
                }
            }
            None => InteractionCallback::ButtonClick {
                action_id: action.action_id,
                value: action.value,
                trigger_id: payload.trigger_id,
            },
        };

        Ok(InboundEvent::InteractionCallback(callback))
    }
}

fn parse_chat_event(event: Value) -> Result<ChatEvent, ValidationError> {
    serde_json::from_value(event).map_err(|e| ValidationError::Payload(e.to_string()))
}

/// The mention token for a bot user ID, tolerating an already-wrapped `<@...>`.
pub fn mention_token(bot_user_id: &str) -> String {
    let id = bot_user_id.trim();

    if id.starts_with("<@") && id.ends_with('>') { id.to_string() } else { format!("<@{id}>") }
}

/// Remove exactly one occurrence of the mention token and trim.
pub fn strip_mention(text: &str, token: &str) -> String {
    if token.is_empty() {
        return text.trim().to_string();
    }

    text.replacen(token, "", 1).trim().to_string()
}

// Tests.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn events(value: Value) -> InboundEvent {
        InboundEvent::from_events_body(value.to_string().as_bytes()).unwrap()
    }

    fn interaction(value: Value) -> InboundEvent {
        InboundEvent::from_interaction_payload(Some(&value.to_string())).unwrap()
    }

    #[test]
    fn test_url_verification_is_classified() {
        let event = events(json!({ "type": "url_verification", "challenge": "abc123", "token": "x" }));
        assert_eq!(event, InboundEvent::EventCallback(EventCallback::UrlVerification { challenge: "abc123".to_string() }));
    }

    #[test]
    fn test_message_and_app_mention_are_classified() {
        let event = events(json!({
            "type": "event_callback",
            "event": { "type": "app_mention", "text": "<@U123> hi", "channel": "C1", "ts": "1.2", "user": "U9" }
        }));

        let InboundEvent::EventCallback(EventCallback::AppMention(mention)) = event else {
            panic!("expected app mention");
        };
        assert_eq!(mention.channel.as_deref(), Some("C1"));
        assert!(!mention.is_from_bot());

        let event = events(json!({
            "type": "event_callback",
            "event": { "type": "message", "text": "hi", "bot_id": "B1" }
        }));

        let InboundEvent::EventCallback(EventCallback::Message(message)) = event else {
            panic!("expected message");
        };
        assert!(message.is_from_bot());
    }

    #[test]
    fn test_bot_message_subtype_is_from_bot() {
        let event = ChatEvent {
            subtype: Some("bot_message".to_string()),
            ..Default::default()
        };
        assert!(event.is_from_bot());
    }

    #[test]
    fn test_other_event_types_are_unsupported() {
        let event = events(json!({ "type": "event_callback", "event": { "type": "reaction_added" } }));
        assert_eq!(event, InboundEvent::EventCallback(EventCallback::Unsupported { event_type: "reaction_added".to_string() }));

        let event = events(json!({
            "type": "event_callback",
            "event": { "type": "channel_created", "channel": { "id": "C1", "name": "general", "creator": "U1" } }
        }));
        assert_eq!(event, InboundEvent::EventCallback(EventCallback::Unsupported { event_type: "channel_created".to_string() }));

        let event = events(json!({ "type": "event_callback", "event": { "type": "user_change", "user": { "id": "U1" } } }));
        assert_eq!(event, InboundEvent::EventCallback(EventCallback::Unsupported { event_type: "user_change".to_string() }));

        let event = events(json!({ "type": "app_rate_limited" }));
        assert!(matches!(event, InboundEvent::EventCallback(EventCallback::Unsupported { .. })));
    }

    #[test]
    fn test_garbage_events_body_is_rejected() {
        assert!(InboundEvent::from_events_body(b"not json").is_err());
        assert!(InboundEvent::from_events_body(br#"{"type":"url_verification"}"#).is_err());
    }

    #[test]
    fn test_select_change_is_classified() {
        let event = interaction(json!({
            "type": "block_actions",
            "trigger_id": "T1",
            "channel": { "id": "C1" },
            "message": { "ts": "111.222", "blocks": [{ "type": "section", "text": { "type": "mrkdwn", "text": "x" } }] },
            "actions": [{ "action_id": "change_tone", "selected_option": { "value": "casual" } }]
        }));

        let InboundEvent::InteractionCallback(InteractionCallback::SelectChange { action_id, selected, channel_id, message_ts, blocks }) = event else {
            panic!("expected select change");
        };
        assert_eq!(action_id, "change_tone");
        assert_eq!(selected, "casual");
        assert_eq!(channel_id.as_deref(), Some("C1"));
        assert_eq!(message_ts.as_deref(), Some("111.222"));
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_select_change_falls_back_to_container() {
        let event = interaction(json!({
            "type": "block_actions",
            "container": { "channel_id": "C2", "message_ts": "9.9" },
            "actions": [{ "action_id": "change_tone", "selected_option": { "value": "professional" } }]
        }));

        let InboundEvent::InteractionCallback(InteractionCallback::SelectChange { channel_id, message_ts, .. }) = event else {
            panic!("expected select change");
        };
        assert_eq!(channel_id.as_deref(), Some("C2"));
        assert_eq!(message_ts.as_deref(), Some("9.9"));
    }

    #[test]
    fn test_button_click_is_classified() {
        let event = interaction(json!({
            "type": "block_actions",
            "trigger_id": "T1",
            "actions": [{ "action_id": "open_detail", "value": "Fixed text." }]
        }));

        assert_eq!(
            event,
            InboundEvent::InteractionCallback(InteractionCallback::ButtonClick {
                action_id: "open_detail".to_string(),
                value: Some("Fixed text.".to_string()),
                trigger_id: Some("T1".to_string()),
            })
        );
    }

    #[test]
    fn test_interaction_edge_cases() {
        assert_eq!(interaction(json!({ "type": "block_actions", "actions": [] })), InboundEvent::InteractionCallback(InteractionCallback::NoAction));
        assert_eq!(
            interaction(json!({ "type": "view_closed" })),
            InboundEvent::InteractionCallback(InteractionCallback::Unsupported { kind: "view_closed".to_string() })
        );

        assert!(matches!(InboundEvent::from_interaction_payload(None), Err(ValidationError::MissingField("payload"))));
        assert!(matches!(InboundEvent::from_interaction_payload(Some("{not json")), Err(ValidationError::Payload(_))));
    }

    #[test]
    fn test_strip_mention_removes_one_occurrence() {
        let token = mention_token("U123");
        assert_eq!(token, "<@U123>");
        assert_eq!(mention_token("<@U123>"), "<@U123>");

        assert_eq!(strip_mention("<@U123> pls fix this sentance", &token), "pls fix this sentance");
        assert_eq!(strip_mention("<@U123> ask <@U123>", &token), "ask <@U123>");
        assert_eq!(strip_mention("  <@U123>  ", &token), "");
        assert_eq!(strip_mention(" no mention ", &token), "no mention");
    }
}
