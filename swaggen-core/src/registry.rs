use std::any::TypeId;
use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::DocError;

/// Identity under which a definition is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefinitionKey {
    /// A Rust type.
    Type(TypeId),
    /// A named sub-schema reported by a self-describing type.
    Named(String),
}

/// A registered definition: display name and schema body.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: String,
    pub body: Value,
}

/// Registry of named schema definitions, the single source of truth for
/// `$ref` targets.
///
/// Registration is first-writer-wins per identity: registering a key that is
/// already present is a no-op, even if the new body differs. The registry is
/// only emptied by [`clear`](Self::clear), before a rebuild.
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    entries: Vec<Definition>,
    index: HashMap<DefinitionKey, usize>,
    names: HashMap<String, DefinitionKey>,
    /// Names reserved for models whose bodies are still being computed.
    pending: HashMap<DefinitionKey, String>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `body` under `name` for `key`.
    ///
    /// Returns `Ok(true)` if a new entry was created and `Ok(false)` if the
    /// key was already taken. A key whose name is held by a sub-schema with
    /// the same body is aliased to that entry and also returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// `MissingIdentity` for an empty name, `NameCollision` when two distinct
    /// types claim the same name, or when a type and a sub-schema claim it
    /// with different bodies.
    pub fn register(&mut self, key: DefinitionKey, name: &str, body: Value) -> Result<bool, DocError> {
        if self.index.contains_key(&key) {
            return Ok(false);
        }
        if name.is_empty() {
            return Err(DocError::MissingIdentity {
                type_name: format!("{key:?}"),
            });
        }
        if let Some(owner) = self.names.get(name) {
            let collision = DocError::NameCollision {
                name: name.to_string(),
            };
            if let (DefinitionKey::Type(_), DefinitionKey::Type(_)) = (owner, &key) {
                return Err(collision);
            }
            let position = self.index[owner];
            if !same_body(&self.entries[position].body, &body) {
                return Err(collision);
            }
            self.pending.remove(&key);
            self.index.insert(key, position);
            return Ok(false);
        }

        debug!(definition = name, "registered definition");
        self.pending.remove(&key);
        self.index.insert(key.clone(), self.entries.len());
        self.names.insert(name.to_string(), key);
        self.entries.push(Definition {
            name: name.to_string(),
            body,
        });
        Ok(true)
    }

    /// Reserve `name` for `key` while its body is computed, so pointers
    /// reached from inside the body already use it.
    ///
    /// The reservation ends with [`register`](Self::register) or
    /// [`release`](Self::release).
    pub fn reserve(&mut self, key: DefinitionKey, name: &str) {
        if !self.index.contains_key(&key) {
            self.pending.insert(key, name.to_string());
        }
    }

    pub fn release(&mut self, key: &DefinitionKey) {
        self.pending.remove(key);
    }

    pub fn contains(&self, key: &DefinitionKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn get(&self, key: &DefinitionKey) -> Option<&Definition> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    /// Display name registered or reserved for `key`, if any.
    pub fn name_of(&self, key: &DefinitionKey) -> Option<&str> {
        match self.get(key) {
            Some(definition) => Some(definition.name.as_str()),
            None => self.pending.get(key).map(String::as_str),
        }
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every definition. Only used before a fresh document build.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.names.clear();
        self.pending.clear();
    }

    /// The definitions table, keyed by display name.
    pub fn to_definitions(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|d| (d.name.clone(), d.body.clone()))
            .collect()
    }
}

/// Bodies match when they differ at most in their top-level `title`.
fn same_body(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => {
            let untitled = |map: &Map<String, Value>| {
                map.iter()
                    .filter(|(k, _)| k.as_str() != "title")
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<Map<String, Value>>()
            };
            untitled(a) == untitled(b)
        }
        _ => a == b,
    }
}
