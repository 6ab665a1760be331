//! Block Kit rendering for corrected text.
//!
//! Interactive messages carry their own state: the first block holds the
//! current tone in its header line and the corrected body in a code fence.
//! [`encode_body`] and [`decode_body`] are the only places that know this
//! layout, and they are inverses for any body that does not itself contain
//! the fence delimiter.

use serde::Serialize;
use serde_json::{Value, json};

use crate::base::types::Tone;

/// Action id of the tone selector.
pub const CHANGE_TONE_ACTION: &str = "change_tone";
/// Action id of the "view plain text" button.
pub const OPEN_DETAIL_ACTION: &str = "open_detail";

/// Slack caps interactive element values at this many characters.
const MAX_VALUE_CHARS: usize = 2000;

const HEADER_PREFIX: &str = "📝 *Corrected* (";
const HEADER_SUFFIX: &str = " tone):";
const PLAIN_HEADER: &str = "📝 *Corrected:*";
const FENCE: &str = "```";

/// An outbound chat message: fallback text plus Block Kit blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedMessage {
    /// Notification and fallback text.
    pub text: String,
    /// Block Kit blocks.
    pub blocks: Vec<Value>,
}

/// A Block Kit modal view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ModalView(pub Value);

/// Tone and body recovered from a previously rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    /// Tone announced in the header line.
    pub tone: Tone,
    /// Unescaped corrected body.
    pub body: String,
}

/// Who sees a slash-command reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Everyone in the channel.
    InChannel,
    /// Only the invoking user.
    Ephemeral,
}

/// The synchronous HTTP body answering a slash command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlashReply {
    /// Who sees the reply.
    pub response_type: ResponseType,
    /// Reply text.
    pub text: String,
    /// Blocks, omitted when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Value>,
}

impl SlashReply {
    /// A reply only the invoking user sees.
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Ephemeral,
            text: text.into(),
            blocks: Vec::new(),
        }
    }

    /// A rendered message posted into the channel.
    pub fn in_channel(message: RenderedMessage) -> Self {
        Self {
            response_type: ResponseType::InChannel,
            text: message.text,
            blocks: message.blocks,
        }
    }
}

/// Render corrected text, either plain or with tone controls.
pub fn render(corrected: &str, tone: Tone, interactive: bool) -> RenderedMessage {
    let text = format!("{PLAIN_HEADER}\n{corrected}");

    if !interactive {
        return RenderedMessage {
            blocks: vec![mrkdwn_section("corrected", &text)],
            text,
        };
    }

    let options = Tone::ALL
        .iter()
        .map(|t| {
            json!({
                "text": { "type": "plain_text", "text": t.to_string() },
                "value": t.as_value(),
            })
        })
        .collect::<Vec<_>>();

    let controls = json!({
        "type": "actions",
        "block_id": "controls",
        "elements": [
            {
                "type": "static_select",
                "action_id": CHANGE_TONE_ACTION,
                "placeholder": { "type": "plain_text", "text": tone.to_string() },
                "options": options,
            },
            {
                "type": "button",
                "action_id": OPEN_DETAIL_ACTION,
                "text": { "type": "plain_text", "text": "View plain text" },
                "value": cap_chars(corrected, MAX_VALUE_CHARS),
            }
        ]
    });

    RenderedMessage {
        text,
        blocks: vec![mrkdwn_section("corrected", &encode_body(corrected, tone)), controls],
    }
}

/// Render the modal that shows a control's literal value.
pub fn render_detail_modal(value: &str) -> ModalView {
    ModalView(json!({
        "type": "modal",
        "title": { "type": "plain_text", "text": "Corrected text" },
        "close": { "type": "plain_text", "text": "Close" },
        "blocks": [
            {
                "type": "section",
                "text": { "type": "plain_text", "text": cap_chars(value, MAX_VALUE_CHARS) },
            }
        ]
    }))
}

/// Encode tone and body as the first block's mrkdwn text.
pub fn encode_body(body: &str, tone: Tone) -> String {
    format!("{HEADER_PREFIX}{tone}{HEADER_SUFFIX}\n{FENCE}\n{}\n{FENCE}", escape(body))
}

/// Decode text produced by [`encode_body`].
///
/// Returns `None` for anything that does not carry the header and fence.
pub fn decode_body(text: &str) -> Option<Recovered> {
    let rest = text.strip_prefix(HEADER_PREFIX)?;
    let (tone, rest) = rest.split_once(HEADER_SUFFIX)?;
    let tone = tone.parse::<Tone>().ok()?;

    let rest = rest.strip_prefix('\n')?.strip_prefix(FENCE)?;
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    let rest = rest.strip_suffix(FENCE)?;
    let body = rest.strip_suffix('\n').unwrap_or(rest);

    Some(Recovered { tone, body: unescape(body) })
}

/// Recover tone and body from a message's blocks (`blocks[0].text.text`).
pub fn recover(blocks: &[Value]) -> Option<Recovered> {
    let text = blocks.first()?.get("text")?.get("text")?.as_str()?;
    decode_body(text)
}

// Helpers.

fn mrkdwn_section(block_id: &str, text: &str) -> Value {
    json!({
        "type": "section",
        "block_id": block_id,
        "text": { "type": "mrkdwn", "text": text },
    })
}

fn cap_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Slack's control-character escaping; `&` goes first so it is not doubled.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Inverse of [`escape`]; `&amp;` goes last so `&amp;lt;` stays `&lt;`.
fn unescape(text: &str) -> String {
    text.replace("&lt;", "<").replace("&gt;", ">").replace("&amp;", "&")
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recover_inverts_render_for_every_tone() {
        let bodies = [
            "Please fix this sentence.",
            "Line one.\nLine two.\n\nLine four.",
            "Use <b> & </b> tags, not &lt;i&gt;.",
            "  leading and trailing spaces  ",
            "",
        ];

        for tone in Tone::ALL {
            for body in bodies {
                let message = render(body, tone, true);
                let recovered = recover(&message.blocks).unwrap();

                assert_eq!(recovered.body, body);
                assert_eq!(recovered.tone, tone);
            }
        }
    }

    #[test]
    fn test_rerender_with_new_tone_keeps_body() {
        let body = "We was late to the meeting.";

        let casual = render(body, Tone::Casual, true);
        let recovered = recover(&casual.blocks).unwrap();
        let professional = render(&recovered.body, Tone::Professional, true);

        assert_eq!(recover(&professional.blocks).unwrap().body, body);
        assert_eq!(recover(&professional.blocks).unwrap().tone, Tone::Professional);
    }

    #[test]
    fn test_interactive_layout() {
        let message = render("Fixed.", Tone::Casual, true);
        assert_eq!(message.blocks.len(), 2);

        let first = &message.blocks[0];
        assert_eq!(first["type"], "section");
        assert_eq!(first["text"]["type"], "mrkdwn");
        let text = first["text"]["text"].as_str().unwrap();
        assert!(text.contains("Casual tone"));
        assert!(text.contains("```\nFixed.\n```"));

        let select = &message.blocks[1]["elements"][0];
        assert_eq!(select["type"], "static_select");
        assert_eq!(select["action_id"], CHANGE_TONE_ACTION);
        assert_eq!(select["placeholder"]["text"], "Casual");

        let values = select["options"].as_array().unwrap().iter().map(|o| o["value"].as_str().unwrap()).collect::<Vec<_>>();
        assert_eq!(values, vec!["casual", "professional"]);

        let button = &message.blocks[1]["elements"][1];
        assert_eq!(button["action_id"], OPEN_DETAIL_ACTION);
        assert_eq!(button["value"], "Fixed.");
    }

    #[test]
    fn test_plain_layout_has_no_controls() {
        let message = render("Fixed.", Tone::Professional, false);

        assert_eq!(message.blocks.len(), 1);
        assert_eq!(message.blocks[0]["type"], "section");
        assert_eq!(message.text, "📝 *Corrected:*\nFixed.");
        assert!(recover(&message.blocks).is_none());
    }

    #[test]
    fn test_button_value_is_capped() {
        let body = "a".repeat(MAX_VALUE_CHARS + 50);
        let message = render(&body, Tone::Professional, true);

        let value = message.blocks[1]["elements"][1]["value"].as_str().unwrap();
        assert_eq!(value.chars().count(), MAX_VALUE_CHARS);
        assert_eq!(recover(&message.blocks).unwrap().body, body);
    }

    #[test]
    fn test_decode_rejects_foreign_text() {
        assert!(decode_body("just some message").is_none());
        assert!(decode_body("📝 *Corrected* (Formal tone):\n```\nbody\n```").is_none());
        assert!(decode_body("📝 *Corrected* (Casual tone):\nbody without fence").is_none());
        assert!(recover(&[]).is_none());
    }

    #[test]
    fn test_decode_tolerates_collapsed_fence_newlines() {
        let recovered = decode_body("📝 *Corrected* (Professional tone):\n```body```").unwrap();
        assert_eq!(recovered.body, "body");
    }

    #[test]
    fn test_slash_reply_serialization() {
        let reply = serde_json::to_value(SlashReply::ephemeral("nope")).unwrap();
        assert_eq!(reply, json!({ "response_type": "ephemeral", "text": "nope" }));

        let reply = serde_json::to_value(SlashReply::in_channel(render("Fixed.", Tone::Professional, false))).unwrap();
        assert_eq!(reply["response_type"], "in_channel");
        assert_eq!(reply["blocks"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_detail_modal_shows_literal_value() {
        let ModalView(view) = render_detail_modal("Some *literal* text");

        assert_eq!(view["type"], "modal");
        assert_eq!(view["blocks"][0]["text"]["type"], "plain_text");
        assert_eq!(view["blocks"][0]["text"]["text"], "Some *literal* text");
    }
}
