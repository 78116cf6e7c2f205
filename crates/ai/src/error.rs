/// Failures talking to the text-generation endpoint.
///
/// Never leaves the crate as an `Err`: [`AiEngine`](crate::AiEngine) folds
/// it into the structured error payload.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint returned a non-2xx status code.
    #[error("AI API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The reply carried no text content.
    #[error("AI API returned an empty completion")]
    EmptyCompletion,
}

impl AiError {
    /// Short machine-readable name, reported as `error_type`.
    pub fn kind(&self) -> &'static str {
        match self {
            AiError::Request(_) => "RequestError",
            AiError::Api { .. } => "ApiError",
            AiError::EmptyCompletion => "EmptyCompletion",
        }
    }
}
