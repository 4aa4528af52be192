//! Error taxonomy for command pipelines.
//!
//! Every failure that can reach a command boundary is a [`BotError`]. Empty
//! reports are not errors; they are modelled as [`crate::commands::Report::Empty`].

use thiserror::Error;

/// Errors surfaced by the fetch / resolve / aggregate pipeline.
#[derive(Error, Debug)]
pub enum BotError {
    /// A required resource could not be fetched, or its payload failed validation.
    #[error("{resource} unavailable: {reason}")]
    SourceUnavailable { resource: String, reason: String },

    /// A named lookup (team or owner substring) matched no roster.
    #[error("not found: {0}")]
    NotFound(String),

    /// A command parameter was outside its accepted range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Handing a rendered message to the delivery sink failed.
    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl BotError {
    pub fn source_unavailable(resource: impl Into<String>, reason: impl ToString) -> Self {
        BotError::SourceUnavailable {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }

    /// Message shown to the person who invoked the command.
    pub fn user_message(&self) -> String {
        match self {
            BotError::SourceUnavailable { .. } => {
                "Something went wrong! Please try again.".to_string()
            }
            BotError::NotFound(what) => format!(
                "{} Try using part of the team owner's name.",
                capitalize(what)
            ),
            BotError::InvalidArgument(msg) => capitalize(msg),
            BotError::Delivery(_) | BotError::Config(_) => {
                "The bot is misconfigured. Please contact the league admin.".to_string()
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_unavailable_message_is_generic() {
        let err = BotError::source_unavailable("rosters", "HTTP 503");
        assert_eq!(err.to_string(), "rosters unavailable: HTTP 503");
        assert_eq!(err.user_message(), "Something went wrong! Please try again.");
    }

    #[test]
    fn test_not_found_message() {
        let err = BotError::NotFound("team 'zed' not found.".to_string());
        assert!(err.user_message().starts_with("Team 'zed' not found."));
    }
}
