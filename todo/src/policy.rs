//! What to do with the text of a new todo.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Text handling applied by the create command
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextPolicy {
    /// Store the text exactly as entered, empty included
    #[default]
    Accept,
    /// Reject text that is empty once whitespace is ignored; store the rest verbatim
    RejectBlank,
    /// Trim surrounding whitespace, then reject if nothing is left
    Trim,
}

/// Reason the policy refused a text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextRejected {
    /// Nothing but whitespace
    #[error("Todo text cannot be empty")]
    Blank,
}

/// A policy name that is not recognised
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown text policy {0:?} (expected accept, reject-blank or trim)")]
pub struct UnknownTextPolicy(pub String);

impl TextPolicy {
    /// Apply the policy, returning the text to store
    ///
    /// # Errors
    ///
    /// Returns [`TextRejected::Blank`] when the policy refuses blank text.
    pub fn apply(self, text: String) -> Result<String, TextRejected> {
        match self {
            Self::Accept => Ok(text),
            Self::RejectBlank if text.trim().is_empty() => Err(TextRejected::Blank),
            Self::RejectBlank => Ok(text),
            Self::Trim => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Err(TextRejected::Blank)
                } else if trimmed.len() == text.len() {
                    Ok(text)
                } else {
                    Ok(trimmed.to_string())
                }
            },
        }
    }
}

impl std::fmt::Display for TextPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Accept => "accept",
            Self::RejectBlank => "reject-blank",
            Self::Trim => "trim",
        })
    }
}

impl std::str::FromStr for TextPolicy {
    type Err = UnknownTextPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(Self::Accept),
            "reject-blank" | "reject_blank" => Ok(Self::RejectBlank),
            "trim" => Ok(Self::Trim),
            _ => Err(UnknownTextPolicy(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_keeps_everything() {
        assert_eq!(TextPolicy::Accept.apply(String::new()), Ok(String::new()));
        assert_eq!(TextPolicy::Accept.apply("  x ".into()), Ok("  x ".into()));
    }

    #[test]
    fn reject_blank_keeps_spacing() {
        assert_eq!(TextPolicy::RejectBlank.apply("   ".into()), Err(TextRejected::Blank));
        assert_eq!(TextPolicy::RejectBlank.apply(" x ".into()), Ok(" x ".into()));
    }

    #[test]
    fn trim_trims() {
        assert_eq!(TextPolicy::Trim.apply("\t".into()), Err(TextRejected::Blank));
        assert_eq!(TextPolicy::Trim.apply("  buy milk ".into()), Ok("buy milk".into()));
        assert_eq!(TextPolicy::Trim.apply("buy milk".into()), Ok("buy milk".into()));
    }

    #[test]
    fn parse_and_display() {
        for policy in [TextPolicy::Accept, TextPolicy::RejectBlank, TextPolicy::Trim] {
            assert_eq!(policy.to_string().parse(), Ok(policy));
        }
        assert_eq!("REJECT_BLANK".parse(), Ok(TextPolicy::RejectBlank));
        assert!("strict".parse::<TextPolicy>().is_err());
    }
}
