//! Transport errors from the generation capability.

/// Classification of a failed generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum TransportErrorKind {
    /// The API key is missing, malformed or rejected
    #[display("invalid credentials")]
    AuthInvalid,
    /// The key is valid but lacks access to the model or project
    #[display("permission denied")]
    PermissionDenied,
    /// The model or project could not be found
    #[display("not found")]
    NotFound,
    /// Any other transport failure
    #[display("transport failure")]
    Other,
}

impl TransportErrorKind {
    /// Classify a failure by pattern-matching its error text.
    ///
    /// # Examples
    ///
    /// ```
    /// use heroes_error::TransportErrorKind;
    ///
    /// assert_eq!(
    ///     TransportErrorKind::classify("HTTP 400: API_KEY_INVALID"),
    ///     TransportErrorKind::AuthInvalid
    /// );
    /// assert_eq!(
    ///     TransportErrorKind::classify("HTTP 403: Permission denied on resource"),
    ///     TransportErrorKind::PermissionDenied
    /// );
    /// assert_eq!(
    ///     TransportErrorKind::classify("connection reset by peer"),
    ///     TransportErrorKind::Other
    /// );
    /// ```
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("api_key_invalid")
            || lower.contains("api key not valid")
            || lower.contains("unauthenticated")
        {
            Self::AuthInvalid
        } else if lower.contains("permission denied")
            || lower.contains("permission_denied")
            || mentions_status(&lower, 403)
        {
            Self::PermissionDenied
        } else if lower.contains("requested entity was not found")
            || mentions_status(&lower, 404)
        {
            Self::NotFound
        } else {
            Self::Other
        }
    }

    /// Classify an HTTP failure from its status code and response body.
    ///
    /// Credential phrases in the body win; otherwise 401, 403 and 404 map to
    /// their kinds and every other status is `Other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use heroes_error::TransportErrorKind;
    ///
    /// assert_eq!(
    ///     TransportErrorKind::from_status(400, "API key not valid. Please pass a valid API key."),
    ///     TransportErrorKind::AuthInvalid
    /// );
    /// assert_eq!(
    ///     TransportErrorKind::from_status(500, "internal error, request id 4041-9a"),
    ///     TransportErrorKind::Other
    /// );
    /// ```
    pub fn from_status(status: u16, body: &str) -> Self {
        match Self::classify(body) {
            Self::Other => match status {
                401 => Self::AuthInvalid,
                403 => Self::PermissionDenied,
                404 => Self::NotFound,
                _ => Self::Other,
            },
            kind => kind,
        }
    }

    /// Whether this failure should prompt the user to re-enter credentials.
    pub fn requires_reauth(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Status codes count only where they read as a status, never inside ids.
fn mentions_status(lower: &str, code: u16) -> bool {
    lower.contains(&format!("http {}", code)) || lower.contains(&format!("\"code\": {}", code))
}

/// Transport error with classification and location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Transport Error ({}): {} at line {} in {}", kind, message, line, file)]
pub struct TransportError {
    /// Classification of the failure
    pub kind: TransportErrorKind,
    /// The raw error text
    pub message: String,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl TransportError {
    /// Create a new transport error with an explicit classification.
    #[track_caller]
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Create a transport error, classifying it from its text.
    #[track_caller]
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = TransportErrorKind::classify(&message);
        let location = std::panic::Location::caller();
        Self {
            kind,
            message,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether this failure should prompt the user to re-enter credentials.
    pub fn requires_reauth(&self) -> bool {
        self.kind.requires_reauth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_found() {
        assert_eq!(
            TransportErrorKind::classify("Requested entity was not found."),
            TransportErrorKind::NotFound
        );
        assert_eq!(
            TransportErrorKind::classify("HTTP 404: models/unknown"),
            TransportErrorKind::NotFound
        );
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(
            TransportErrorKind::classify("PERMISSION DENIED"),
            TransportErrorKind::PermissionDenied
        );
        assert_eq!(
            TransportErrorKind::classify(
                "Request had invalid authentication credentials. UNAUTHENTICATED"
            ),
            TransportErrorKind::AuthInvalid
        );
    }

    #[test]
    fn test_reauth_only_for_credential_failures() {
        assert!(TransportErrorKind::AuthInvalid.requires_reauth());
        assert!(TransportErrorKind::PermissionDenied.requires_reauth());
        assert!(TransportErrorKind::NotFound.requires_reauth());
        assert!(!TransportErrorKind::Other.requires_reauth());
    }

    #[test]
    fn test_status_digits_inside_ids_are_ignored() {
        assert_eq!(
            TransportErrorKind::classify("HTTP 500: internal error, request id 84041-4031"),
            TransportErrorKind::Other
        );
        assert_eq!(
            TransportErrorKind::classify("{\"error\": {\"code\": 403, \"status\": \"FORBIDDEN\"}}"),
            TransportErrorKind::PermissionDenied
        );
        assert_eq!(
            TransportErrorKind::from_status(500, "trace 404040"),
            TransportErrorKind::Other
        );
        assert_eq!(
            TransportErrorKind::from_status(404, "no such model"),
            TransportErrorKind::NotFound
        );
    }

    #[test]
    fn test_classify_keeps_message() {
        let err = TransportError::classify("HTTP 503: overloaded");
        assert_eq!(err.kind, TransportErrorKind::Other);
        assert_eq!(err.message, "HTTP 503: overloaded");
        assert!(!err.requires_reauth());
    }
}
