//! Portrait generation errors.

/// A character portrait request failed.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Persona Generation Error: {} at line {} in {}", message, line, file)]
pub struct PersonaGenerationError {
    /// Why the portrait could not be produced
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl PersonaGenerationError {
    /// Create a new PersonaGenerationError at the current location.
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
