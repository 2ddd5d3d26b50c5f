//! In-memory storage backend.
//!
//! [`InMemoryContactStore`] keeps one user's contacts in a record map plus
//! two [`PrefixIndex`]es (name-word prefixes and emails). All three live
//! behind a single `RwLock`, so a writer updates them together and readers
//! only ever see them in agreement.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::contact::{Contact, ContactId, ContactUpdate, StoredContact};
use crate::error::{ContactsError, ContactsResult};
use crate::index::PrefixIndex;
use crate::storage::traits::{ContactStore, SearchParams};
use crate::validation::{
    check_contact_id, email_keys, name_prefix_key, name_word_prefixes, normalize_email,
    validate_contact, validate_email,
};

#[derive(Debug, Default)]
struct ContactState {
    by_id: HashMap<ContactId, Contact>,
    by_name: PrefixIndex,
    by_email: PrefixIndex,
}

impl ContactState {
    fn fresh_id(&self) -> ContactId {
        loop {
            let id = ContactId::new();
            if !self.by_id.contains_key(&id) {
                return id;
            }
        }
    }

    fn index(&mut self, id: &ContactId, contact: &Contact) {
        self.by_name.add(name_word_prefixes(&contact.name), id);
        self.by_email.add(email_keys(contact), id);
    }

    fn unindex(&mut self, id: &ContactId, contact: &Contact) {
        self.by_name.remove(name_word_prefixes(&contact.name), id);
        self.by_email.remove(email_keys(contact), id);
    }

    fn insert(&mut self, id: ContactId, contact: Contact) {
        self.index(&id, &contact);
        self.by_id.insert(id, contact);
    }

    fn remove(&mut self, id: &str) -> Option<(ContactId, Contact)> {
        let (id, contact) = self.by_id.remove_entry(id)?;
        self.unindex(&id, &contact);
        Some((id, contact))
    }
}

/// Narrows `candidates` to the ids also in `found`.
fn narrow(candidates: Option<HashSet<ContactId>>, found: HashSet<ContactId>) -> HashSet<ContactId> {
    match candidates {
        None => found,
        Some(mut prev) => {
            prev.retain(|id| found.contains(id));
            prev
        }
    }
}

/// Thread-safe in-memory contact store for a single user.
#[derive(Debug)]
pub struct InMemoryContactStore {
    user_id: String,
    state: RwLock<ContactState>,
}

impl InMemoryContactStore {
    /// Creates an empty store owned by `user_id`.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            state: RwLock::new(ContactState::default()),
        }
    }

    // Writers validate before touching the state and never panic while
    // holding the guard, so a poisoned lock still guards consistent data.
    fn read_state(&self) -> RwLockReadGuard<'_, ContactState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ContactState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Panics if the indexes and the record map disagree.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let state = self.read_state();
        let mut name_entries = 0;
        let mut mail_entries = 0;
        for (id, contact) in &state.by_id {
            for key in name_word_prefixes(&contact.name) {
                assert!(state.by_name.contains(&key, id), "name key {key} missing for {id}");
                name_entries += 1;
            }
            for key in email_keys(contact) {
                assert!(state.by_email.contains(&key, id), "email key {key} missing for {id}");
                mail_entries += 1;
            }
        }
        // No stale entries beyond those derived from stored contacts.
        assert_eq!(name_entries, state.by_name.entry_count());
        assert_eq!(mail_entries, state.by_email.entry_count());
    }
}

impl ContactStore for InMemoryContactStore {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn create(&self, contact: Contact) -> ContactsResult<ContactId> {
        validate_contact(&contact)?;

        let mut state = self.write_state();
        let id = state.fresh_id();
        state.insert(id.clone(), contact);
        Ok(id)
    }

    fn read(&self, id: &str) -> ContactsResult<StoredContact> {
        let id = check_contact_id(id)?;
        let state = self.read_state();
        let (id, contact) = state
            .by_id
            .get_key_value(id)
            .ok_or_else(|| ContactsError::not_found(id))?;
        Ok(StoredContact {
            id: id.clone(),
            contact: contact.clone(),
        })
    }

    fn update(&self, id: &str, update: ContactUpdate) -> ContactsResult<StoredContact> {
        let id = check_contact_id(id)?;
        let mut state = self.write_state();

        let (id, merged) = {
            let (id, current) = state
                .by_id
                .get_key_value(id)
                .ok_or_else(|| ContactsError::not_found(id))?;
            if update.is_empty() {
                return Ok(StoredContact {
                    id: id.clone(),
                    contact: current.clone(),
                });
            }
            (id.clone(), update.apply_to(current))
        };
        validate_contact(&merged)?;

        let Some((id, _previous)) = state.remove(id.as_str()) else {
            return Err(ContactsError::not_found(id.as_str()));
        };
        state.insert(id.clone(), merged.clone());
        Ok(StoredContact {
            id,
            contact: merged,
        })
    }

    fn delete(&self, id: &str) -> ContactsResult<()> {
        let id = check_contact_id(id)?;
        let mut state = self.write_state();
        state
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ContactsError::not_found(id))
    }

    fn search(
        &self,
        params: &SearchParams,
        start_index: usize,
        count: usize,
    ) -> ContactsResult<Vec<StoredContact>> {
        let id = params.id.as_deref().map(check_contact_id).transpose()?;
        let prefix = params
            .name_word_prefix
            .as_deref()
            .map(name_prefix_key)
            .transpose()?;
        let email = match params.email.as_deref() {
            Some(email) => {
                validate_email(email)?;
                Some(normalize_email(email))
            }
            None => None,
        };

        let state = self.read_state();

        let mut candidates: Option<HashSet<ContactId>> = None;
        if let Some(id) = id {
            let found = state
                .by_id
                .get_key_value(id)
                .map(|(id, _)| id.clone())
                .into_iter()
                .collect();
            candidates = Some(narrow(candidates, found));
        }
        if let Some(prefix) = &prefix {
            candidates = Some(narrow(candidates, state.by_name.lookup(prefix)));
        }
        if let Some(email) = &email {
            candidates = Some(narrow(candidates, state.by_email.lookup(email)));
        }

        let mut matches: Vec<(&ContactId, &Contact)> = match &candidates {
            None => state.by_id.iter().collect(),
            Some(ids) => ids
                .iter()
                .filter_map(|id| state.by_id.get_key_value(id))
                .collect(),
        };
        matches.sort_by_cached_key(|&(id, contact)| (contact.name.to_lowercase(), id));

        Ok(matches
            .into_iter()
            .skip(start_index)
            .take(count)
            .map(|(id, contact)| StoredContact {
                id: id.clone(),
                contact: contact.clone(),
            })
            .collect())
    }

    fn clear(&self) -> usize {
        let mut state = self.write_state();
        let removed = state.by_id.len();
        state.by_id.clear();
        state.by_name.clear();
        state.by_email.clear();
        removed
    }

    fn count(&self) -> usize {
        self.read_state().by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::contact::Address;
    use crate::error::{ErrorKind, ValidationError};

    fn names(results: &[StoredContact]) -> Vec<&str> {
        results.iter().map(|c| c.contact.name.as_str()).collect()
    }

    fn seeded() -> (InMemoryContactStore, Vec<ContactId>) {
        let store = InMemoryContactStore::new("cs444-544");
        let ids = [
            Contact::new("Ethan Johns")
                .with_email("ejohns77@binghamton.edu")
                .with_email("ejohns@hotmail.com"),
            Contact::new("Queenie Gordon").with_email("qgordon37@gmail.com"),
            Contact::new("Zoe Johnson").with_email("zojohn23@yahoo.com"),
            Contact::new("Nancy Evans"),
            Contact::new("Ethan Martin").with_email("emartin@maildrop.com"),
        ]
        .into_iter()
        .map(|c| store.create(c).unwrap())
        .collect();
        (store, ids)
    }

    #[test]
    fn create_read_update_delete_and_indexes() {
        let store = InMemoryContactStore::new("u1");
        let contact = Contact::new("Acme Person")
            .with_email("acme@example.com")
            .with_addr(Address::new("1 Main St"));
        let id = store.create(contact.clone()).unwrap();

        let got = store.read(id.as_str()).unwrap();
        assert_eq!(got.id, id);
        assert_eq!(got.contact, contact);
        store.assert_consistent();

        // Update reindexes by name and email.
        let updated = store
            .update(
                id.as_str(),
                ContactUpdate::default()
                    .with_name("Bravo Person")
                    .with_emails(["bravo@example.com"]),
            )
            .unwrap();
        assert_eq!(updated.contact.name, "Bravo Person");
        assert_eq!(updated.contact.addr, contact.addr);
        store.assert_consistent();

        let by_old = store
            .search(&SearchParams::all().name_word_prefix("ac"), 0, 5)
            .unwrap();
        assert!(by_old.is_empty());
        let by_new = store
            .search(&SearchParams::all().name_word_prefix("bra"), 0, 5)
            .unwrap();
        assert_eq!(by_new.len(), 1);
        let by_old_mail = store
            .search(&SearchParams::all().email("acme@example.com"), 0, 5)
            .unwrap();
        assert!(by_old_mail.is_empty());

        // Delete removes from indexes.
        store.delete(id.as_str()).unwrap();
        store.assert_consistent();
        assert!(store.read(id.as_str()).unwrap_err().is_not_found());
        assert!(store.delete(id.as_str()).unwrap_err().is_not_found());
        assert!(store
            .search(&SearchParams::all().name_word_prefix("bra"), 0, 5)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn create_rejects_bad_input() {
        let store = InMemoryContactStore::new("u1");

        let err = store
            .create(Contact::new("Ethan Johns").with_field("id", json!("xxx")))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);

        let err = store.create(Contact::new("@$ %@")).unwrap_err();
        assert!(matches!(
            err,
            ContactsError::BadRequest(ValidationError::InvalidName { .. })
        ));

        let err = store
            .create(Contact::new("John Smith").with_email("johnatgmail.com"))
            .unwrap_err();
        assert!(matches!(
            err,
            ContactsError::BadRequest(ValidationError::InvalidEmail { .. })
        ));

        assert_eq!(store.count(), 0);
        store.assert_consistent();
    }

    #[test]
    fn read_blank_id_is_bad_request() {
        let (store, ids) = seeded();
        assert!(store.read("").unwrap_err().is_bad_request());
        assert!(store.read("   ").unwrap_err().is_bad_request());
        let unknown = format!("{}x", ids[0]);
        assert!(store.read(&unknown).unwrap_err().is_not_found());
    }

    #[test]
    fn read_returns_detached_copy() {
        let (store, ids) = seeded();
        let mut first = store.read(ids[0].as_str()).unwrap();
        first.contact.name = "Mutated".to_string();
        first.contact.emails.as_mut().unwrap()[0] = "x@y.z".to_string();

        let again = store.read(ids[0].as_str()).unwrap();
        assert_eq!(again.contact.name, "Ethan Johns");
        assert_eq!(again.contact.email_list()[0], "ejohns77@binghamton.edu");
    }

    #[test]
    fn search_all_sorted_by_name() {
        let (store, _) = seeded();
        let all = store.search(&SearchParams::all(), 0, 10).unwrap();
        assert_eq!(
            names(&all),
            vec![
                "Ethan Johns",
                "Ethan Martin",
                "Nancy Evans",
                "Queenie Gordon",
                "Zoe Johnson"
            ]
        );

        let page = store.search(&SearchParams::all(), 2, 2).unwrap();
        assert_eq!(names(&page), vec!["Nancy Evans", "Queenie Gordon"]);

        let tail = store.search(&SearchParams::all(), 3, 5).unwrap();
        assert_eq!(names(&tail), vec!["Queenie Gordon", "Zoe Johnson"]);

        assert!(store.search(&SearchParams::all(), 10, 5).unwrap().is_empty());
        assert!(store.search(&SearchParams::all(), 0, 0).unwrap().is_empty());
    }

    #[test]
    fn search_by_prefix_email_and_id() {
        let (store, ids) = seeded();

        let john = store
            .search(&SearchParams::all().name_word_prefix("JOHN"), 0, 5)
            .unwrap();
        assert_eq!(names(&john), vec!["Ethan Johns", "Zoe Johnson"]);

        let go = store
            .search(&SearchParams::all().name_word_prefix("go"), 0, 5)
            .unwrap();
        assert_eq!(names(&go), vec!["Queenie Gordon"]);

        let quen = store
            .search(&SearchParams::all().name_word_prefix("QUEN"), 0, 5)
            .unwrap();
        assert!(quen.is_empty());

        let upper = store
            .search(&SearchParams::all().email("QGORDON37@GMAIL.COM"), 0, 5)
            .unwrap();
        let lower = store
            .search(&SearchParams::all().email("qgordon37@gmail.com"), 0, 5)
            .unwrap();
        assert_eq!(upper, lower);
        assert_eq!(names(&upper), vec!["Queenie Gordon"]);

        let by_id = store
            .search(&SearchParams::all().id(ids[3].as_str()), 0, 5)
            .unwrap();
        assert_eq!(names(&by_id), vec!["Nancy Evans"]);
    }

    #[test]
    fn search_intersects_criteria() {
        let (store, ids) = seeded();

        let both = store
            .search(
                &SearchParams::all()
                    .name_word_prefix("QUE")
                    .email("QGORDON37@GMAIL.COM"),
                0,
                5,
            )
            .unwrap();
        assert_eq!(names(&both), vec!["Queenie Gordon"]);

        let disjoint = store
            .search(
                &SearchParams::all()
                    .name_word_prefix("ethan")
                    .email("qgordon37@gmail.com"),
                0,
                5,
            )
            .unwrap();
        assert!(disjoint.is_empty());

        let id_and_prefix = store
            .search(
                &SearchParams::all().id(ids[0].as_str()).name_word_prefix("eth"),
                0,
                5,
            )
            .unwrap();
        assert_eq!(names(&id_and_prefix), vec!["Ethan Johns"]);
    }

    #[test]
    fn search_rejects_bad_params() {
        let (store, _) = seeded();
        for params in [
            SearchParams::all().name_word_prefix("j"),
            SearchParams::all().name_word_prefix("jo hn"),
            SearchParams::all().email("qgordon37gmail.com"),
            SearchParams::all().id(" "),
        ] {
            let err = store.search(&params, 0, 5).unwrap_err();
            assert!(err.is_bad_request(), "{params:?} should be rejected");
        }
    }

    #[test]
    fn search_unknown_id_is_empty() {
        let (store, ids) = seeded();
        store.delete(ids[1].as_str()).unwrap();
        let found = store
            .search(&SearchParams::all().id(ids[1].as_str()), 0, 5)
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn search_ties_broken_by_id() {
        let store = InMemoryContactStore::new("u1");
        let a = store.create(Contact::new("Sam Lee")).unwrap();
        let b = store.create(Contact::new("sam lee")).unwrap();
        let results = store.search(&SearchParams::all(), 0, 5).unwrap();
        let mut expected = vec![a, b];
        expected.sort();
        let got: Vec<ContactId> = results.into_iter().map(|c| c.id).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn update_failure_leaves_store_unchanged() {
        let (store, ids) = seeded();
        let id = ids[0].as_str();
        let before = store.read(id).unwrap();

        let err = store
            .update(
                id,
                ContactUpdate::default()
                    .with_name("Valid Name")
                    .with_emails(["not-an-email"]),
            )
            .unwrap_err();
        assert!(err.is_bad_request());

        let err = store
            .update(id, ContactUpdate::default().with_field("id", json!("other")))
            .unwrap_err();
        assert!(err.is_bad_request());

        assert_eq!(store.read(id).unwrap(), before);
        let still = store
            .search(&SearchParams::all().name_word_prefix("johns"), 0, 5)
            .unwrap();
        assert_eq!(names(&still), vec!["Ethan Johns"]);
        assert!(store
            .search(&SearchParams::all().name_word_prefix("valid"), 0, 5)
            .unwrap()
            .is_empty());
        store.assert_consistent();
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let (store, _) = seeded();
        let err = store
            .update("missing", ContactUpdate::default().with_notes("x"))
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(store
            .update("", ContactUpdate::default())
            .unwrap_err()
            .is_bad_request());
    }

    #[test]
    fn empty_update_returns_current_contact() {
        let (store, ids) = seeded();
        let id = ids[2].as_str();
        let before = store.read(id).unwrap();

        let update: ContactUpdate = serde_json::from_value(json!({ "emails": null })).unwrap();
        assert_eq!(store.update(id, update).unwrap(), before);
        assert_eq!(store.update(id, ContactUpdate::default()).unwrap(), before);
        assert_eq!(store.read(id).unwrap(), before);

        let mail = store
            .search(&SearchParams::all().email("zojohn23@yahoo.com"), 0, 5)
            .unwrap();
        assert_eq!(names(&mail), vec!["Zoe Johnson"]);
        assert!(store
            .update("missing", ContactUpdate::default())
            .unwrap_err()
            .is_not_found());
        store.assert_consistent();
    }

    #[test]
    fn poisoned_lock_still_serves_requests() {
        let (store, ids) = seeded();
        std::thread::scope(|s| {
            let poisoner = s.spawn(|| {
                let _guard = store.state.write().unwrap();
                panic!("writer panicked while holding the lock");
            });
            assert!(poisoner.join().is_err());
        });
        assert!(store.state.is_poisoned());

        assert_eq!(store.read(ids[1].as_str()).unwrap().contact.name, "Queenie Gordon");
        let id = store.create(Contact::new("Ida Poole")).unwrap();
        let found = store
            .search(&SearchParams::all().name_word_prefix("poo"), 0, 5)
            .unwrap();
        assert_eq!(found[0].id, id);
        assert_eq!(store.count(), 6);
        store.assert_consistent();
    }

    #[test]
    fn clear_and_count() {
        let (store, ids) = seeded();
        assert_eq!(store.count(), 5);
        assert_eq!(store.clear(), 5);
        assert_eq!(store.count(), 0);
        assert!(store.read(ids[0].as_str()).unwrap_err().is_not_found());
        assert!(store
            .search(&SearchParams::all().name_word_prefix("john"), 0, 5)
            .unwrap()
            .is_empty());
        store.assert_consistent();
    }

    #[test]
    fn user_id_is_kept() {
        let store = InMemoryContactStore::new("alice");
        assert_eq!(store.user_id(), "alice");
    }
}
