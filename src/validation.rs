//! Input validation and index-key derivation.
//!
//! The rules here decide both what the store accepts and which keys a
//! contact is indexed under, so the two can never drift apart: a name is
//! valid exactly when it yields at least one name-prefix key.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::contact::Contact;
use crate::error::ValidationError;

/// Shortest prefix (in letters) that is indexed or accepted as a search key.
pub const MIN_PREFIX_LEN: usize = 2;

/// Field names callers may not supply; the store owns contact identity.
pub const FORBIDDEN_FIELDS: [&str; 2] = ["id", "_id"];

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+?@.+?\..+$").expect("email pattern is valid"));

/// Lower-cased letters of `word`, everything else dropped.
fn word_letters(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Returns every name-prefix key for `name`.
///
/// Each whitespace-separated word is reduced to its lower-cased letters and
/// contributes all of its prefixes of at least [`MIN_PREFIX_LEN`] letters.
///
/// ```
/// use contactbook::validation::name_word_prefixes;
///
/// let keys = name_word_prefixes("Zoe O'Brien");
/// assert!(keys.contains("zo"));
/// assert!(keys.contains("obrien"));
/// assert!(!keys.contains("o"));
/// ```
#[must_use]
pub fn name_word_prefixes(name: &str) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    for word in name.split_whitespace() {
        let letters = word_letters(word);
        let mut prefix = String::with_capacity(letters.len());
        for (n, c) in letters.chars().enumerate() {
            prefix.push(c);
            if n + 1 >= MIN_PREFIX_LEN {
                keys.insert(prefix.clone());
            }
        }
    }
    keys
}

/// Normalized index key for an email.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Returns the set of email keys for `contact`.
#[must_use]
pub fn email_keys(contact: &Contact) -> BTreeSet<String> {
    contact
        .email_list()
        .iter()
        .map(|e| normalize_email(e))
        .collect()
}

/// Checks that `name` has a word with at least two letters.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name_word_prefixes(name).is_empty() {
        return Err(ValidationError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Checks that `email` looks like `local@domain.suffix`.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email.trim()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail {
            email: email.to_string(),
        })
    }
}

/// Checks every email in `emails`, reporting the first bad one.
pub fn validate_emails(emails: &[String]) -> Result<(), ValidationError> {
    emails.iter().try_for_each(|e| validate_email(e))
}

/// Rejects any of [`FORBIDDEN_FIELDS`] among the extra fields.
pub fn check_forbidden_fields(
    extra: &serde_json::Map<String, serde_json::Value>,
) -> Result<(), ValidationError> {
    match FORBIDDEN_FIELDS.iter().find(|f| extra.contains_key(**f)) {
        Some(field) => Err(ValidationError::ForbiddenField {
            field: (*field).to_string(),
        }),
        None => Ok(()),
    }
}

/// Full validation of a contact about to be stored.
pub fn validate_contact(contact: &Contact) -> Result<(), ValidationError> {
    check_forbidden_fields(&contact.extra)?;
    validate_name(&contact.name)?;
    validate_emails(contact.email_list())
}

/// Rejects blank contact ids and returns the trimmed id.
pub fn check_contact_id(id: &str) -> Result<&str, ValidationError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::BlankContactId);
    }
    Ok(id)
}

/// Turns a search prefix into its index key.
///
/// The prefix must be a single word; its letters (at least two) are
/// lower-cased and everything else is dropped.
pub fn name_prefix_key(prefix: &str) -> Result<String, ValidationError> {
    let invalid = || ValidationError::InvalidNamePrefix {
        prefix: prefix.to_string(),
    };
    let mut words = prefix.split_whitespace();
    let (Some(word), None) = (words.next(), words.next()) else {
        return Err(invalid());
    };
    let key = word_letters(word);
    if key.chars().count() < MIN_PREFIX_LEN {
        return Err(invalid());
    }
    Ok(key)
}
