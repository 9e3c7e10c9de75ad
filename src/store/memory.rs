use super::{Collection, DocumentStore, Error, ErrorKind};
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Namespace = (String, String);

#[derive(Debug, Clone, PartialEq)]
struct IndexSpec {
    field: String,
    descending: bool,
    unique: bool,
}

impl IndexSpec {
    // Same naming scheme MongoDB uses for its default index names.
    fn name(&self) -> String {
        format!("{}_{}", self.field, if self.descending { -1 } else { 1 })
    }
}

#[derive(Debug, Default)]
struct MemoryCollection {
    documents: Vec<Value>,
    indexes: Vec<IndexSpec>,
}

#[derive(Debug, Default)]
struct State {
    collections: HashMap<Namespace, MemoryCollection>,
    open_connections: usize,
    connections_opened: usize,
}

/// An in-process document store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, Error> {
        Ok(self.state.lock()?)
    }

    pub fn documents(&self, database: &str, collection: &str) -> Result<Vec<Value>, Error> {
        let state = self.lock()?;
        Ok(state
            .collections
            .get(&namespace(database, collection))
            .map(|c| c.documents.clone())
            .unwrap_or_default())
    }

    /// Index names in creation order, e.g. `dt_-1`.
    pub fn indexes(&self, database: &str, collection: &str) -> Result<Vec<String>, Error> {
        let state = self.lock()?;
        Ok(state
            .collections
            .get(&namespace(database, collection))
            .map(|c| c.indexes.iter().map(IndexSpec::name).collect())
            .unwrap_or_default())
    }

    pub fn open_connections(&self) -> Result<usize, Error> {
        Ok(self.lock()?.open_connections)
    }

    pub fn connections_opened(&self) -> Result<usize, Error> {
        Ok(self.lock()?.connections_opened)
    }
}

fn namespace(database: &str, collection: &str) -> Namespace {
    (database.to_owned(), collection.to_owned())
}

impl DocumentStore for MemoryStore {
    type Connection = MemoryConnection;

    fn connect(&self, database: &str, collection: &str) -> Result<MemoryConnection, Error> {
        let mut state = self.lock()?;
        state.open_connections += 1;
        state.connections_opened += 1;
        debug!("opened in-memory connection to {}.{}", database, collection);

        Ok(MemoryConnection {
            store: self.clone(),
            namespace: namespace(database, collection),
        })
    }
}

pub struct MemoryConnection {
    store: MemoryStore,
    namespace: Namespace,
}

impl MemoryConnection {
    fn with_collection<T>(
        &self,
        f: impl FnOnce(&mut MemoryCollection) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut state = self.store.lock()?;
        let collection = state
            .collections
            .entry(self.namespace.clone())
            .or_default();
        f(collection)
    }
}

impl Collection for MemoryConnection {
    fn ensure_unique_descending_index(&mut self, field: &str) -> Result<(), Error> {
        let spec = IndexSpec {
            field: field.to_owned(),
            descending: true,
            unique: true,
        };

        self.with_collection(|collection| {
            if collection.indexes.contains(&spec) {
                return Ok(());
            }

            // Building a unique index over data that already violates it fails.
            for (i, doc) in collection.documents.iter().enumerate() {
                let key = key_of(doc, field);
                if collection.documents[..i]
                    .iter()
                    .any(|other| same_key(key, key_of(other, field)))
                {
                    return Err(duplicate_key(field, key));
                }
            }

            debug!("created index {}", spec.name());
            collection.indexes.push(spec);
            Ok(())
        })
    }

    fn insert_one(&mut self, document: &Value) -> Result<(), Error> {
        if !document.is_object() {
            return Err(Error::new(ErrorKind::NotADocument));
        }

        self.with_collection(|collection| {
            for index in collection.indexes.iter().filter(|index| index.unique) {
                let key = key_of(document, &index.field);
                if collection
                    .documents
                    .iter()
                    .any(|existing| same_key(key, key_of(existing, &index.field)))
                {
                    return Err(duplicate_key(&index.field, key));
                }
            }

            collection.documents.push(document.clone());
            Ok(())
        })
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        let mut state = self
            .store
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        state.open_connections = state.open_connections.saturating_sub(1);
        debug!("closed in-memory connection to {}.{}", self.namespace.0, self.namespace.1);
    }
}

// A missing field is indexed as null, so two documents without it collide.
fn key_of<'a>(document: &'a Value, field: &str) -> &'a Value {
    document.get(field).unwrap_or(&Value::Null)
}

// Numbers compare by value: 1000 and 1000.0 are the same key.
fn same_key(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn duplicate_key(field: &str, key: &Value) -> Error {
    Error::new(ErrorKind::DuplicateKey {
        field: field.to_owned(),
        value: key.to_string(),
    })
}
