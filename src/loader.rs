//! Loading contacts from JSON files.
//!
//! A contacts file holds either a single contact object or an array of
//! them. File and JSON problems are reported separately from store errors
//! since the store itself never does I/O.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::contact::{Contact, ContactId, ContactUpdate};
use crate::error::ContactsError;
use crate::storage::ContactStore;

/// Errors raised while loading contacts from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid contact JSON.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// File being parsed.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// The store rejected a loaded contact.
    #[error(transparent)]
    Contacts(#[from] ContactsError),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Contact>),
    One(Box<Contact>),
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the contacts in `path`.
pub fn load_contacts(path: impl AsRef<Path>) -> Result<Vec<Contact>, LoadError> {
    Ok(match read_json(path.as_ref())? {
        OneOrMany::Many(contacts) => contacts,
        OneOrMany::One(contact) => vec![*contact],
    })
}

/// Reads a partial update from `path`.
pub fn load_update(path: impl AsRef<Path>) -> Result<ContactUpdate, LoadError> {
    read_json(path.as_ref())
}

/// Creates `contacts` in order, stopping at the first rejected one.
///
/// Contacts created before the failure stay in the store.
pub fn create_all<S, I>(store: &S, contacts: I) -> Result<Vec<ContactId>, ContactsError>
where
    S: ContactStore + ?Sized,
    I: IntoIterator<Item = Contact>,
{
    contacts.into_iter().map(|c| store.create(c)).collect()
}

/// Loads every file in `paths` into `store`, returning the new ids in order.
pub fn load_into<S, P>(store: &S, paths: &[P]) -> Result<Vec<ContactId>, LoadError>
where
    S: ContactStore + ?Sized,
    P: AsRef<Path>,
{
    let mut ids = Vec::new();
    for path in paths {
        let contacts = load_contacts(path)?;
        ids.extend(create_all(store, contacts)?);
    }
    Ok(ids)
}
