//! The webhook dispatcher.
//!
//! Each [`InboundEvent`] runs exactly one branch. The slash-command branch
//! answers through its own HTTP response. The event branch acks first and
//! does its work in a spawned task whose failures only reach the log. The
//! interaction branch works inline and reports through the status code.

use serde_json::{Value, json};
use tracing::{Instrument, error, info, instrument, warn};

use crate::{
    base::{
        error::ValidationError,
        prompts,
        types::{Tone, Void},
    },
    interaction::{
        inbound::{ChatEvent, EventCallback, InboundEvent, InteractionCallback, SlashCommand, mention_token, strip_mention},
        render::{self, CHANGE_TONE_ACTION, OPEN_DETAIL_ACTION, SlashReply},
    },
    runtime::Runtime,
};

/// Tone for messages that have no previous state.
const FRESH_TONE: Tone = Tone::Professional;

/// What the webhook surface should answer.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// `200` with a JSON body.
    Json(Value),
    /// `200` with an empty body.
    Ack,
    /// `400`.
    BadRequest,
    /// `404`.
    NotFound,
}

/// Which kind of chat event is being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatEventKind {
    /// A plain channel message.
    Message,
    /// A message that @-mentions the bot.
    AppMention,
}

/// Route one inbound event to its branch.
#[instrument(skip_all)]
pub async fn dispatch(runtime: &Runtime, event: InboundEvent) -> Reply {
    match event {
        InboundEvent::SlashCommand(command) => Reply::Json(json_of(&handle_slash_command(runtime, command).await)),
        InboundEvent::EventCallback(callback) => handle_event_callback(runtime, callback),
        InboundEvent::InteractionCallback(callback) => handle_interaction(runtime, callback).await,
    }
}

// Slash commands.

/// Answer a slash command synchronously.
#[instrument(skip_all, fields(command = ?command.command, channel = ?command.channel_id))]
pub async fn handle_slash_command(runtime: &Runtime, command: SlashCommand) -> SlashReply {
    let text = command.text.trim();

    if text.is_empty() {
        info!("Empty slash command; replying with usage hint.");
        return SlashReply::ephemeral(prompts::USAGE_HINT);
    }

    let instruction = prompts::correction_instruction(&runtime.config.correction_directive, FRESH_TONE);

    match runtime.llm.transform(&instruction, text).await {
        Ok(corrected) => SlashReply::in_channel(render::render(&corrected, FRESH_TONE, runtime.config.interactive)),
        Err(err) => {
            error!("Slash command correction failed: {}", err);
            SlashReply::ephemeral(prompts::TRANSFORM_FAILED)
        }
    }
}

// Event callbacks.

/// Ack an event callback, spawning any follow-up work.
pub fn handle_event_callback(runtime: &Runtime, callback: EventCallback) -> Reply {
    match callback {
        EventCallback::UrlVerification { challenge } => {
            info!("Answering URL verification.");
            Reply::Json(json!({ "challenge": challenge }))
        }
        EventCallback::Message(event) => {
            spawn_chat_event(runtime, ChatEventKind::Message, event);
            Reply::Ack
        }
        EventCallback::AppMention(event) => {
            spawn_chat_event(runtime, ChatEventKind::AppMention, event);
            Reply::Ack
        }
        EventCallback::Unsupported { event_type } => {
            info!("Ignoring unsupported event `{}`.", event_type);
            Reply::Ack
        }
    }
}

#[instrument(skip_all)]
fn spawn_chat_event(runtime: &Runtime, kind: ChatEventKind, event: ChatEvent) {
    let runtime = runtime.clone();

    tokio::spawn(
        async move {
            // Process the event.
            let result = handle_chat_event(&runtime, kind, event).await;

            // Log any errors.
            if let Err(err) = &result {
                error!("Error while handling: {}", err);
            }
        }
        .in_current_span(),
    );
}

/// Correct the text of a chat event and post the result into its channel.
///
/// Filtered or empty events return `Ok(())` without any outbound call.
#[instrument(skip_all, fields(kind = ?kind, channel = ?event.channel))]
pub async fn handle_chat_event(runtime: &Runtime, kind: ChatEventKind, event: ChatEvent) -> Void {
    if event.is_from_bot() {
        info!("Skipping bot-originated event.");
        return Ok(());
    }

    let token = mention_token(runtime.chat.bot_user_id());
    let raw_text = event.text.as_deref().unwrap_or_default();

    let text = match kind {
        ChatEventKind::Message => {
            // Slack delivers mentions twice; the app mention handler takes this one.
            if raw_text.contains(&token) {
                info!("Skipping message event because it mentions the bot.");
                return Ok(());
            }

            raw_text.trim().to_string()
        }
        ChatEventKind::AppMention => strip_mention(raw_text, &token),
    };

    if text.is_empty() {
        info!("Skipping event with no text.");
        return Ok(());
    }

    let Some(channel_id) = event.channel.as_deref() else {
        warn!("Skipping event without a channel.");
        return Ok(());
    };

    if runtime.config.typing_indicator
        && let Some(ts) = event.ts.as_deref()
        && let Err(err) = runtime.chat.indicate_typing(channel_id, ts).await
    {
        warn!("Typing indicator failed (ignored): {}", err);
    }

    let instruction = prompts::correction_instruction(&runtime.config.correction_directive, FRESH_TONE);
    let corrected = runtime.llm.transform(&instruction, &text).await?;

    let message = render::render(&corrected, FRESH_TONE, runtime.config.interactive);
    runtime.chat.post_message(channel_id, &message).await?;

    info!("Posted correction.");

    Ok(())
}

// Interactions.

/// Handle a block action inline.
#[instrument(skip_all)]
pub async fn handle_interaction(runtime: &Runtime, callback: InteractionCallback) -> Reply {
    match callback {
        InteractionCallback::ButtonClick { action_id, value, trigger_id } if action_id == OPEN_DETAIL_ACTION => open_detail_view(runtime, value, trigger_id).await,
        InteractionCallback::SelectChange {
            action_id,
            selected,
            channel_id,
            message_ts,
            blocks,
        } if action_id == CHANGE_TONE_ACTION => change_tone(runtime, &selected, channel_id, message_ts, &blocks).await,
        InteractionCallback::ButtonClick { action_id, .. } | InteractionCallback::SelectChange { action_id, .. } => {
            warn!("Unknown interaction action `{}`.", action_id);
            Reply::NotFound
        }
        InteractionCallback::NoAction => {
            warn!("Interaction carried no action.");
            Reply::NotFound
        }
        InteractionCallback::Unsupported { kind } => {
            info!("Ignoring `{}` interaction.", kind);
            Reply::Ack
        }
    }
}

async fn open_detail_view(runtime: &Runtime, value: Option<String>, trigger_id: Option<String>) -> Reply {
    let (Some(value), Some(trigger_id)) = (value.filter(|v| !v.is_empty()), trigger_id) else {
        warn!("Detail view request without value or trigger id.");
        return Reply::BadRequest;
    };

    let view = render::render_detail_modal(&value);

    if let Err(err) = runtime.chat.open_modal(&trigger_id, &view).await {
        error!("Failed to open detail view: {}", err);
    }

    Reply::Ack
}

async fn change_tone(runtime: &Runtime, selected: &str, channel_id: Option<String>, message_ts: Option<String>, blocks: &[Value]) -> Reply {
    let request = match ToneChange::validate(selected, channel_id, message_ts, blocks) {
        Ok(request) => request,
        Err(err) => {
            warn!("Rejecting tone change: {}", err);
            return Reply::BadRequest;
        }
    };

    info!("Changing tone to {}.", request.tone);

    let instruction = prompts::correction_instruction(&runtime.config.correction_directive, request.tone);

    let corrected = match runtime.llm.transform(&instruction, &request.body).await {
        Ok(corrected) => corrected,
        Err(err) => {
            error!("Tone change correction failed: {}", err);
            return Reply::NotFound;
        }
    };

    let message = render::render(&corrected, request.tone, true);

    match runtime.chat.update_message(&request.channel_id, &request.message_ts, &message).await {
        Ok(()) => Reply::Ack,
        Err(err) => {
            error!("Failed to update message: {}", err);
            Reply::NotFound
        }
    }
}

/// A validated tone-change request.
struct ToneChange {
    tone: Tone,
    channel_id: String,
    message_ts: String,
    body: String,
}

impl ToneChange {
    fn validate(selected: &str, channel_id: Option<String>, message_ts: Option<String>, blocks: &[Value]) -> Result<Self, ValidationError> {
        let tone = selected.parse::<Tone>()?;
        let channel_id = channel_id.ok_or(ValidationError::MissingField("channel"))?;
        let message_ts = message_ts.ok_or(ValidationError::MissingField("message.ts"))?;
        let body = render::recover(blocks).ok_or(ValidationError::MissingField("message.blocks[0].text.text"))?.body;

        Ok(Self { tone, channel_id, message_ts, body })
    }
}

fn json_of(reply: &SlashReply) -> Value {
    // `SlashReply` only holds strings and JSON values.
    serde_json::to_value(reply).unwrap_or_else(|_| json!({ "response_type": "ephemeral", "text": prompts::TRANSFORM_FAILED }))
}
