//! # Contactbook - per-user indexed contact store
//!
//! Contactbook keeps structured contact records for many users. Each user
//! gets an independent store that supports create, read, update, delete and
//! search, where search by name-word prefix or by email is answered from
//! secondary indexes instead of a scan.
//!
//! ## Core Concepts
//!
//! - **Contact**: a name plus optional emails, address, phones, notes and
//!   arbitrary extra fields
//! - **ContactId**: opaque id assigned by the store on creation
//! - **PrefixIndex**: lower-cased key to contact-id buckets
//! - **ContactStore**: one user's contacts and their indexes
//! - **ContactsRegistry**: one store per user id, created lazily
//!
//! ## Usage
//!
//! ```rust
//! use contactbook::{Contact, ContactStore, ContactsRegistry, SearchParams};
//!
//! let registry = ContactsRegistry::new();
//! let store = registry.get_or_create("alice")?;
//!
//! let id = store.create(Contact::new("Zoe Johnson").with_email("zojohn@hotmail.com"))?;
//!
//! let found = store.search(&SearchParams::all().name_word_prefix("JOHN"), 0, 5)?;
//! assert_eq!(found[0].id, id);
//! # Ok::<(), contactbook::ContactsError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod contact;
pub mod error;
pub mod index;
pub mod loader;
pub mod registry;
pub mod storage;
pub mod validation;

// Re-export primary types at crate root for convenience
pub use contact::{Address, Contact, ContactId, ContactUpdate, Phone, StoredContact};
pub use error::{ContactsError, ContactsResult, ErrorKind, ValidationError};
pub use index::PrefixIndex;
pub use loader::LoadError;
pub use registry::ContactsRegistry;
pub use storage::{ContactStore, InMemoryContactStore, SearchParams, DEFAULT_COUNT};
