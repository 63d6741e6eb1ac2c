use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("{provider} request failed: {message}")]
    Http { provider: String, message: String },
    #[error("{provider} returned status {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },
    #[error("{0} returned no completion content")]
    EmptyCompletion(String),
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("internal error: {0}")]
    Internal(String),
}

impl RagError {
    pub fn config(message: impl Into<String>) -> Self {
        RagError::Config(message.into())
    }

    pub fn http<E: std::fmt::Display>(provider: &str, err: E) -> Self {
        RagError::Http {
            provider: provider.to_string(),
            message: err.to_string(),
        }
    }

    /// Reads the body of a non-success response into a `Status` error.
    pub async fn from_response(provider: &str, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        RagError::Status {
            provider: provider.to_string(),
            status,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mentions_provider_and_code() {
        let err = RagError::Status {
            provider: "groq".to_string(),
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "groq returned status 429: rate limited");
    }

    #[test]
    fn dimension_mismatch_message() {
        let err = RagError::DimensionMismatch {
            expected: 1536,
            actual: 3,
        };
        assert!(err.to_string().contains("expected 1536, got 3"));
    }
}
