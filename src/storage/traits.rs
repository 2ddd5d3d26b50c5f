//! Abstract storage trait for the contact book.
//!
//! [`ContactStore`] is the contract a per-user store fulfils. The in-memory
//! backend implements it directly; a database-backed variant would implement
//! the same trait so front ends never depend on a concrete backend.

use serde::{Deserialize, Serialize};

use crate::contact::{Contact, ContactId, ContactUpdate, StoredContact};
use crate::error::ContactsResult;

/// Number of search results returned when the caller does not say.
pub const DEFAULT_COUNT: usize = 5;

/// Search criteria. Every criterion given must match; none means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Exact contact id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Prefix of some word of the contact's name, case-insensitive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_word_prefix: Option<String>,
    /// One of the contact's emails, case-insensitive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl SearchParams {
    /// Criteria matching every contact.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts the search to one contact id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Restricts the search to names with a word starting with `prefix`.
    #[must_use]
    pub fn name_word_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_word_prefix = Some(prefix.into());
        self
    }

    /// Restricts the search to contacts having `email`.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Storage trait for one user's contacts.
///
/// # Consistency
/// - Mutations are serialized per store; readers never observe an index and
///   the record map disagreeing.
/// - Returned contacts are independent copies of stored state.
pub trait ContactStore: Send + Sync {
    /// The user owning these contacts.
    fn user_id(&self) -> &str;

    /// Validates and stores `contact` under a fresh id.
    ///
    /// # Errors
    /// - `BadRequest`: invalid name or email, or an `id`/`_id` field present
    fn create(&self, contact: Contact) -> ContactsResult<ContactId>;

    /// Returns the contact stored under `id`.
    ///
    /// # Errors
    /// - `BadRequest`: `id` is blank
    /// - `NotFound`: no contact for `id`
    fn read(&self, id: &str) -> ContactsResult<StoredContact>;

    /// Applies `update` to the contact under `id` and returns the result.
    ///
    /// Present fields replace stored ones wholesale. On error the store is
    /// left unchanged.
    ///
    /// # Errors
    /// - `BadRequest`: blank id, forbidden field, or invalid new name/emails
    /// - `NotFound`: no contact for `id`
    fn update(&self, id: &str, update: ContactUpdate) -> ContactsResult<StoredContact>;

    /// Removes the contact under `id`.
    ///
    /// # Errors
    /// - `BadRequest`: `id` is blank
    /// - `NotFound`: no contact for `id`
    fn delete(&self, id: &str) -> ContactsResult<()>;

    /// Returns matching contacts sorted by name, sliced to
    /// `start_index..start_index + count`.
    ///
    /// An unknown `id` criterion yields no results rather than an error.
    ///
    /// # Errors
    /// - `BadRequest`: malformed name prefix, email, or blank id criterion
    fn search(
        &self,
        params: &SearchParams,
        start_index: usize,
        count: usize,
    ) -> ContactsResult<Vec<StoredContact>>;

    /// Removes every contact, returning how many were removed.
    fn clear(&self) -> usize;

    /// Number of stored contacts.
    fn count(&self) -> usize;
}
