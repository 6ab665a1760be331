//! Shared result aliases and the tone type.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Plumbing error type.
pub type Err = anyhow::Error;
/// Plumbing result type.
pub type Res<T> = Result<T, Err>;
/// A plumbing result with no value.
pub type Void = Res<()>;

/// The style the completion provider is asked to write in.
///
/// Serialized lowercase (`casual`, `professional`), which is also the value
/// carried by the tone selector options. `Display` is the capitalized form
/// shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Friendly and relaxed.
    Casual,
    /// Polished; the tone of every fresh correction.
    #[default]
    Professional,
}

impl Tone {
    /// Every tone, in selector order.
    pub const ALL: [Tone; 2] = [Tone::Casual, Tone::Professional];

    /// The lowercase wire value.
    pub fn as_value(&self) -> &'static str {
        match self {
            Tone::Casual => "casual",
            Tone::Professional => "professional",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tone::Casual => write!(f, "Casual"),
            Tone::Professional => write!(f, "Professional"),
        }
    }
}

impl FromStr for Tone {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "casual" => Ok(Tone::Casual),
            "professional" => Ok(Tone::Professional),
            _ => Err(ValidationError::UnknownTone(s.to_string())),
        }
    }
}

// Tests.
