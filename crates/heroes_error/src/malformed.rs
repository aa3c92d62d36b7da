//! Malformed generation response errors.

/// A generation response that could not be parsed or failed schema validation.
///
/// # Examples
///
/// ```
/// use heroes_error::MalformedResponseError;
///
/// let err = MalformedResponseError::new("missing field `scene`");
/// assert!(format!("{}", err).contains("scene"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Malformed Response: {} at line {} in {}", message, line, file)]
pub struct MalformedResponseError {
    /// What was wrong with the response
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl MalformedResponseError {
    /// Create a new MalformedResponseError at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
