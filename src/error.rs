use crate::client::ClientError;
use crate::highlight::InvalidSpanError;
use thiserror::Error;

pub const MIN_IDEA_CHARS: usize = 10;

/// The user-facing action a network failure interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Search,
    Compare,
}

impl Action {
    fn user_message(&self) -> &'static str {
        match self {
            Action::Search => "Error searching for similar papers. Please try again.",
            Action::Compare => "Error loading comparison data",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{action:?} request failed: {source}")]
    Network {
        action: Action,
        #[source]
        source: ClientError,
    },
    #[error("paper {paper_id:?} is not in the current result list")]
    NotFound { paper_id: String },
    #[error("invalid highlight span: {0}")]
    InvalidSpan(#[from] InvalidSpanError),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn idea_too_short() -> Self {
        AppError::Validation(format!(
            "Please enter a more detailed research idea (at least {MIN_IDEA_CHARS} characters)"
        ))
    }

    pub fn network(action: Action, source: ClientError) -> Self {
        AppError::Network { action, source }
    }

    pub fn not_found(paper_id: impl Into<String>) -> Self {
        AppError::NotFound {
            paper_id: paper_id.into(),
        }
    }

    /// Message shown to the user at the view boundary.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(message) => message.clone(),
            AppError::Network { action, .. } => action.user_message().to_string(),
            AppError::NotFound { .. } => "Paper not found".to_string(),
            AppError::InvalidSpan(err) => format!("Could not highlight text: {err}"),
        }
    }
}

/// Rejects ideas shorter than [`MIN_IDEA_CHARS`] after trimming.
pub fn validate_idea(idea: &str) -> Result<()> {
    if idea.trim().chars().count() < MIN_IDEA_CHARS {
        return Err(AppError::idea_too_short());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_ideas_are_rejected() {
        let err = validate_idea("   too short ").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(
            err.user_message(),
            "Please enter a more detailed research idea (at least 10 characters)"
        );
    }

    #[test]
    fn ten_chars_is_enough() {
        assert!(validate_idea("  0123456789 ").is_ok());
    }

    #[test]
    fn idea_length_counts_chars_not_utf16_units() {
        assert!(validate_idea("🔬🧪🧬🔭📚").is_err());
        assert!(validate_idea("🔬🧪🧬🔭📚🔬🧪🧬🔭📚").is_ok());
    }

    #[test]
    fn not_found_message() {
        let err = AppError::not_found("p9");
        assert_eq!(err.user_message(), "Paper not found");
        assert!(err.to_string().contains("p9"));
    }

    #[test]
    fn span_errors_convert() {
        let err: AppError = InvalidSpanError::Reversed {
            index: 0,
            start: 2,
            end: 1,
        }
        .into();
        assert!(err.user_message().contains("span #0"));
    }
}
