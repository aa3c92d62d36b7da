//! Input validation errors, reported before any generation starts.

/// Kinds of validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ValidationErrorKind {
    /// No hero persona was supplied
    #[display("A hero persona is required to start a story")]
    MissingHero,
    /// Custom genre was chosen without a premise
    #[display("A premise is required for the custom genre")]
    MissingPremise,
    /// No page with this number exists in the history
    #[display("Page {} does not exist", _0)]
    UnknownPage(u32),
    /// The page does not offer a decision
    #[display("Page {} is not a decision page", _0)]
    NotDecisionPage(u32),
    /// A choice was already committed on this page
    #[display("Page {} already has a resolved choice", _0)]
    ChoiceAlreadyResolved(u32),
    /// The choice text is not one of the page's options
    #[display("Choice {:?} is not offered on page {}", choice, page)]
    ChoiceNotOffered {
        /// Page number
        page: u32,
        /// Rejected choice text
        choice: String,
    },
    /// No story has been launched
    #[display("No story is in progress")]
    NotStarted,
}

/// Validation error with location tracking.
///
/// # Examples
///
/// ```
/// use heroes_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(ValidationErrorKind::MissingPremise);
/// assert_eq!(err.kind, ValidationErrorKind::MissingPremise);
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    /// The kind of error that occurred
    pub kind: ValidationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new validation error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
