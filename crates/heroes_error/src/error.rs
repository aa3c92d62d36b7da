//! Top-level error wrapper types.

use crate::{
    ConfigError, JsonError, MalformedResponseError, PersonaGenerationError, StorageError,
    TransportError, ValidationError,
};

/// The foundation error enum aggregating every error in the workspace.
///
/// # Examples
///
/// ```
/// use heroes_error::{HeroesError, MalformedResponseError};
///
/// let err: HeroesError = MalformedResponseError::new("not JSON").into();
/// assert!(format!("{}", err).contains("Malformed Response"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum HeroesErrorKind {
    /// Invalid user input
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Generation call failed in transport
    #[from(TransportError)]
    Transport(TransportError),
    /// Generation response failed to parse
    #[from(MalformedResponseError)]
    MalformedResponse(MalformedResponseError),
    /// Portrait request failed
    #[from(PersonaGenerationError)]
    PersonaGeneration(PersonaGenerationError),
    /// Persistence failure
    #[from(StorageError)]
    Storage(StorageError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
}

/// Infinite Heroes error with kind discrimination.
///
/// # Examples
///
/// ```
/// use heroes_error::{HeroesResult, TransportError, TransportErrorKind};
///
/// fn call() -> HeroesResult<()> {
///     Err(TransportError::classify("HTTP 403: PERMISSION_DENIED"))?
/// }
///
/// let err = call().unwrap_err();
/// assert_eq!(err.transport_kind(), Some(TransportErrorKind::PermissionDenied));
/// assert!(err.requires_reauth());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Infinite Heroes Error: {}", _0)]
pub struct HeroesError(Box<HeroesErrorKind>);

impl HeroesError {
    /// Create a new error from a kind.
    pub fn new(kind: HeroesErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &HeroesErrorKind {
        &self.0
    }

    /// Transport classification, if this is a transport failure.
    pub fn transport_kind(&self) -> Option<crate::TransportErrorKind> {
        match self.kind() {
            HeroesErrorKind::Transport(e) => Some(e.kind),
            _ => None,
        }
    }

    /// Whether this error should surface a re-authentication prompt.
    pub fn requires_reauth(&self) -> bool {
        self.transport_kind()
            .is_some_and(|kind| kind.requires_reauth())
    }

    /// Whether this error is a malformed generation response.
    pub fn is_malformed_response(&self) -> bool {
        matches!(self.kind(), HeroesErrorKind::MalformedResponse(_))
    }
}

// Generic From implementation for any type that converts to HeroesErrorKind
impl<T> From<T> for HeroesError
where
    T: Into<HeroesErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Infinite Heroes operations.
pub type HeroesResult<T> = std::result::Result<T, HeroesError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TransportErrorKind, ValidationErrorKind};

    #[test]
    fn test_validation_is_not_reauth() {
        let err: HeroesError = ValidationError::new(ValidationErrorKind::MissingHero).into();
        assert!(!err.requires_reauth());
        assert_eq!(err.transport_kind(), None);
    }

    #[test]
    fn test_other_transport_is_not_reauth() {
        let err: HeroesError = TransportError::new(TransportErrorKind::Other, "timeout").into();
        assert_eq!(err.transport_kind(), Some(TransportErrorKind::Other));
        assert!(!err.requires_reauth());
    }

    #[test]
    fn test_malformed_detection() {
        let err: HeroesError = MalformedResponseError::new("bad").into();
        assert!(err.is_malformed_response());
    }
}
