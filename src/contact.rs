//! Contact records and identity.
//!
//! A [`Contact`] is what callers hand to the store; a [`StoredContact`] is
//! what they get back, the same record paired with the [`ContactId`] the
//! store assigned. Values are always owned: anything returned by a store is
//! an independent copy of the stored record.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Opaque, store-assigned contact identifier.
///
/// Ids are random and never reused. Callers must treat the textual form as
/// opaque and never parse it.
///
/// # Examples
///
/// ```
/// use contactbook::ContactId;
///
/// let a = ContactId::new();
/// let b = ContactId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(String);

impl ContactId {
    /// Creates a new random contact ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Returns the textual form of this id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ContactId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContactId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ContactId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<ContactId> for String {
    fn from(id: ContactId) -> Self {
        id.0
    }
}

/// A postal address. Only the first line is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// First address line.
    pub addr_line1: String,
    /// Optional second address line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr_line2: Option<String>,
    /// City.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State or region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Postal code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

impl Address {
    /// Creates an address with just its first line.
    #[must_use]
    pub fn new(addr_line1: impl Into<String>) -> Self {
        Self {
            addr_line1: addr_line1.into(),
            addr_line2: None,
            city: None,
            state: None,
            zip: None,
        }
    }
}

/// A phone entry: its type (`"home"`, `"cell"`, ...) and its number.
///
/// Serialized as a two-element array, e.g. `["home", "(554) 504-5249"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone(pub String, pub String);

impl Phone {
    /// Creates a phone entry.
    #[must_use]
    pub fn new(kind: impl Into<String>, number: impl Into<String>) -> Self {
        Self(kind.into(), number.into())
    }

    /// The phone type.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.0
    }

    /// The phone number.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.1
    }
}

/// A user-supplied contact record.
///
/// Fields not known to this type are kept verbatim in [`Contact::extra`].
/// An `id` or `_id` entry there is rejected by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Full name. Must contain at least one word with two or more letters.
    pub name: String,
    /// Email addresses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<String>>,
    /// Postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr: Option<Address>,
    /// Phone numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phones: Option<Vec<Phone>>,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Structured string-to-string details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<BTreeMap<String, String>>,
    /// Any additional fields, stored as given.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Contact {
    /// Creates a contact with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emails: None,
            addr: None,
            phones: None,
            notes: None,
            info: None,
            extra: Map::new(),
        }
    }

    /// Appends an email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.emails.get_or_insert_with(Vec::new).push(email.into());
        self
    }

    /// Sets the address.
    #[must_use]
    pub fn with_addr(mut self, addr: Address) -> Self {
        self.addr = Some(addr);
        self
    }

    /// Appends a phone entry.
    #[must_use]
    pub fn with_phone(mut self, kind: impl Into<String>, number: impl Into<String>) -> Self {
        self.phones
            .get_or_insert_with(Vec::new)
            .push(Phone::new(kind, number));
        self
    }

    /// Sets the notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Adds an `info` entry.
    #[must_use]
    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.info
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Adds an arbitrary extra field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Emails of this contact, empty if none were given.
    #[must_use]
    pub fn email_list(&self) -> &[String] {
        self.emails.as_deref().unwrap_or_default()
    }
}

/// A contact together with the id it is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredContact {
    /// Store-assigned id.
    pub id: ContactId,
    /// The contact data.
    #[serde(flatten)]
    pub contact: Contact,
}

impl StoredContact {
    /// Drops the id, returning the bare contact.
    #[must_use]
    pub fn into_contact(self) -> Contact {
        self.contact
    }
}

/// A partial update to a stored contact.
///
/// Every field that is present replaces the stored field as a whole; nested
/// values such as `addr` are not merged recursively. Extra fields replace
/// same-named extra fields and leave the others alone.
///
/// An explicit `null` deserializes the same as an absent field and leaves the
/// stored value unchanged, so an update cannot remove an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactUpdate {
    /// Replacement name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replacement email list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<String>>,
    /// Replacement address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr: Option<Address>,
    /// Replacement phone list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phones: Option<Vec<Phone>>,
    /// Replacement notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Replacement info map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<BTreeMap<String, String>>,
    /// Extra fields to set.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContactUpdate {
    /// Sets the replacement name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the replacement email list.
    #[must_use]
    pub fn with_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emails = Some(emails.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the replacement address.
    #[must_use]
    pub fn with_addr(mut self, addr: Address) -> Self {
        self.addr = Some(addr);
        self
    }

    /// Sets the replacement notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets an extra field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Returns true if this update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.emails.is_none()
            && self.addr.is_none()
            && self.phones.is_none()
            && self.notes.is_none()
            && self.info.is_none()
            && self.extra.is_empty()
    }

    /// Returns `base` with this update applied, leaving `base` untouched.
    #[must_use]
    pub fn apply_to(&self, base: &Contact) -> Contact {
        let mut merged = base.clone();
        if let Some(name) = &self.name {
            merged.name.clone_from(name);
        }
        if let Some(emails) = &self.emails {
            merged.emails = Some(emails.clone());
        }
        if let Some(addr) = &self.addr {
            merged.addr = Some(addr.clone());
        }
        if let Some(phones) = &self.phones {
            merged.phones = Some(phones.clone());
        }
        if let Some(notes) = &self.notes {
            merged.notes = Some(notes.clone());
        }
        if let Some(info) = &self.info {
            merged.info = Some(info.clone());
        }
        for (key, value) in &self.extra {
            merged.extra.insert(key.clone(), value.clone());
        }
        merged
    }
}
