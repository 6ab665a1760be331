//! Prompt templates and fixed user-facing strings.

use crate::base::types::Tone;

/// Default grammar-correction directive.
pub const CORRECTION_DIRECTIVE: &str = "Correct the grammar, spelling, and clarity of this text";

/// Ephemeral reply for an empty slash command.
pub const USAGE_HINT: &str = "Usage: `/grammarbot <text to correct>`\nI'll reply with a corrected version of your text.";

/// Ephemeral reply when the provider fails on the slash-command path.
pub const TRANSFORM_FAILED: &str = ":warning: Sorry, I couldn't correct that text right now. Please try again in a moment.";

/// Build the tone-specific instruction from a base directive.
pub fn correction_instruction(directive: &str, tone: Tone) -> String {
    let directive = directive.trim().trim_end_matches(':');

    match tone {
        Tone::Professional => format!("{directive}, keeping a professional tone"),
        Tone::Casual => format!("{directive}, rewriting it in a casual, friendly tone"),
    }
}

/// Build the full prompt sent to the provider.
pub fn build_prompt(instruction: &str, body: &str) -> String {
    format!("{instruction}:\n\n{body}")
}

// Tests.
