//! Error types for the contact book.
//!
//! All errors are strongly typed using thiserror. Store operations only ever
//! fail with one of two kinds, [`ErrorKind::BadRequest`] or
//! [`ErrorKind::NotFound`]; collaborators map those kinds onto their own
//! surface (HTTP status codes, CLI messages).

use std::fmt;

use thiserror::Error;

/// Validation errors that occur during input validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The contact name has no word with at least two letters.
    #[error("no alphabetic word of at least 2 letters in name \"{name}\"")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// An email does not look like `local@domain.suffix`.
    #[error("bad email \"{email}\"")]
    InvalidEmail {
        /// The rejected email.
        email: String,
    },

    /// The input carries a field the store assigns itself.
    #[error("request cannot have a {field} property")]
    ForbiddenField {
        /// Name of the forbidden field.
        field: String,
    },

    /// A contact id argument was empty or whitespace.
    #[error("contact id must be a non-empty string")]
    BlankContactId,

    /// A user id argument was empty or whitespace.
    #[error("user id must be a non-empty string")]
    BlankUserId,

    /// A search prefix is not a single word with at least two letters.
    #[error("invalid name word prefix \"{prefix}\": expect a single word with at least 2 letters")]
    InvalidNamePrefix {
        /// The rejected prefix.
        prefix: String,
    },
}

/// The two failure categories exposed by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input.
    BadRequest,
    /// The targeted contact does not exist.
    NotFound,
}

impl ErrorKind {
    /// Short machine-readable code for this kind.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQ",
            Self::NotFound => "NOT_FOUND",
        }
    }

    /// HTTP status a web collaborator should answer with.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Top-level error type for contact store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactsError {
    /// Input failed validation.
    #[error("{0}")]
    BadRequest(#[from] ValidationError),

    /// No contact exists for the given id.
    #[error("no contact for contact id \"{id}\"")]
    NotFound {
        /// The id that was looked up.
        id: String,
    },
}

impl ContactsError {
    /// Creates a not-found error for `id`.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::NotFound { .. } => ErrorKind::NotFound,
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest(_))
    }

    /// Returns true if the targeted contact does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for contact store operations.
pub type ContactsResult<T> = Result<T, ContactsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::InvalidEmail {
            email: "johnatgmail.com".to_string(),
        };
        assert!(err.to_string().contains("johnatgmail.com"));

        let err = ValidationError::ForbiddenField {
            field: "id".to_string(),
        };
        assert_eq!(err.to_string(), "request cannot have a id property");
    }

    #[test]
    fn test_contacts_error_from_validation() {
        let err: ContactsError = ValidationError::BlankContactId.into();
        assert!(err.is_bad_request());
        assert!(!err.is_not_found());
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert!(err.to_string().contains("contact id"));
    }

    #[test]
    fn test_contacts_error_not_found() {
        let err = ContactsError::not_found("abc123");
        assert!(err.is_not_found());
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("abc123"));
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(ErrorKind::BadRequest.code(), "BAD_REQ");
        assert_eq!(ErrorKind::NotFound.code(), "NOT_FOUND");
        assert_eq!(ErrorKind::BadRequest.http_status(), 400);
        assert_eq!(ErrorKind::NotFound.http_status(), 404);
        assert_eq!(ErrorKind::NotFound.to_string(), "NOT_FOUND");
    }
}
