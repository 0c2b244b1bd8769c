//! In-memory store.
//!
//! Users live in one ordered list behind a single mutex. Every handler takes
//! the lock once, resolves the id and mutates under that same guard, so a
//! [`Resolved`] position can never refer to a different record than the one
//! that was found. Products are fixed at startup and need no lock.

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// A user record: a numeric id plus an open set of JSON fields.
///
/// Serialises as `{"id": …, <fields in insertion order>}`. `fields` never
/// holds an `id` key; the store strips it on every write.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct User {
    pub id: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl User {
    pub fn new(id: u64, username: &str, display_name: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("username".to_owned(), Value::from(username));
        fields.insert("displayName".to_owned(), Value::from(display_name));
        Self { id, fields }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub price: f64,
}

/// Position of a user inside [`Users`], as found by [`Users::find`].
///
/// Only valid while the guard it was obtained under is held.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Resolved(usize);

impl Resolved {
    pub fn index(self) -> usize { self.0 }
}

/// The ordered user list and its id counter.
#[derive(Debug)]
pub struct Users {
    records: Vec<User>,
    next_id: u64,
}

impl Users {
    pub fn new(records: Vec<User>) -> Self {
        let next_id = records.iter().map(|u| u.id).max().map_or(1, |max| max + 1);
        Self { records, next_id }
    }

    pub fn all(&self) -> &[User] { &self.records }
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Linear scan for the user with `id`.
    pub fn find(&self, id: u64) -> Option<Resolved> {
        self.records.iter().position(|u| u.id == id).map(Resolved)
    }

    pub fn get(&self, at: Resolved) -> &User {
        &self.records[at.0]
    }

    /// Users whose string field `field` equals `value`, ignoring case.
    ///
    /// Absent and non-string fields never match.
    pub fn matching(&self, field: &str, value: &str) -> Vec<User> {
        let wanted = value.to_lowercase();
        self.records.iter()
            .filter(|u| {
                u.field(field)
                    .and_then(Value::as_str)
                    .is_some_and(|s| s.to_lowercase() == wanted)
            })
            .cloned()
            .collect()
    }

    /// Appends a user under a fresh id.
    ///
    /// Ids come from a counter that only moves forward, so an id freed by
    /// [`remove`](Users::remove) is never handed out again.
    pub fn insert(&mut self, fields: Map<String, Value>) -> &User {
        let id = self.next_id;
        self.next_id += 1;
        self.records.push(User { id, fields: without_id(fields) });
        &self.records[self.records.len() - 1]
    }

    /// Replaces every field of the user at `at`; the id stays.
    pub fn replace(&mut self, at: Resolved, fields: Map<String, Value>) -> &User {
        let user = &mut self.records[at.0];
        user.fields = without_id(fields);
        user
    }

    /// Shallow-merges `fields` over the user at `at`. Existing keys keep
    /// their position; new keys are appended.
    pub fn merge(&mut self, at: Resolved, fields: Map<String, Value>) -> &User {
        let user = &mut self.records[at.0];
        user.fields.extend(without_id(fields));
        user
    }

    pub fn remove(&mut self, at: Resolved) -> User {
        self.records.remove(at.0)
    }
}

fn without_id(fields: Map<String, Value>) -> Map<String, Value> {
    fields.into_iter().filter(|(k, _)| k != "id").collect()
}

/// Everything the handlers share.
#[derive(Debug)]
pub struct Store {
    users: Mutex<Users>,
    products: Vec<Product>,
}

impl Store {
    pub fn new(users: Users, products: Vec<Product>) -> Self {
        Self { users: Mutex::new(users), products }
    }

    /// The demo data set the server starts with.
    pub fn seeded() -> Self {
        let users = [
            (1, "anson", "Anson"),
            (2, "jack", "Jack"),
            (3, "adam", "Adam"),
            (4, "tina", "Tina"),
            (5, "jason", "Jason"),
            (6, "henry", "Henry"),
            (7, "marilyn", "Marilyn"),
        ]
        .into_iter()
        .map(|(id, username, display_name)| User::new(id, username, display_name))
        .collect();

        let products = vec![Product { id: 123, name: "Chicken Breast".to_owned(), price: 12.99 }];

        Self::new(Users::new(users), products)
    }

    /// Locks the user list. A poisoned lock is an internal error.
    pub fn users(&self) -> Result<MutexGuard<'_, Users>, ApiError> {
        self.users.lock().map_err(|_| ApiError::internal("user store lock poisoned"))
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }
}
