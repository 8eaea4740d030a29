//! Error types for the agent crate.
//!
//! The `Display` text of each variant is shown to the user as-is.

use thiserror::Error;

/// Errors that can occur while converting a requirements document.
#[derive(Error, Debug)]
pub enum AgentError {
    /// No API key in settings or the environment.
    #[error("No API key configured. Add one in settings or set ANTHROPIC_API_KEY.")]
    MissingApiKey,

    /// The requirements document is empty.
    #[error("Enter a requirements document to convert.")]
    EmptyInput,

    /// The HTTP request could not be completed.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{0}")]
    Api(String),

    /// The response carried no text.
    #[error("No response from the model")]
    NoContent,

    /// The response text was not a PRD.
    #[error("Failed to parse stories from response. Please try again.")]
    InvalidResponse,
}

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            AgentError::InvalidResponse.to_string(),
            "Failed to parse stories from response. Please try again."
        );
        assert_eq!(
            AgentError::Api("API error: 529".into()).to_string(),
            "API error: 529"
        );
        assert_eq!(AgentError::NoContent.to_string(), "No response from the model");
    }
}
