mod error;
mod memory;
mod mongo;

pub use error::{Error, ErrorKind};
pub use memory::{MemoryConnection, MemoryStore};
pub use mongo::{MongoConnection, MongoStore};

use log::debug;
use serde_json::Value;

const MEMORY_SCHEME: &str = "mem://";
const MONGO_SCHEMES: [&str; 2] = ["mongodb://", "mongodb+srv://"];

pub trait DocumentStore {
    type Connection: Collection;

    /// Open a connection scoped to one collection. Dropping the connection
    /// releases it.
    fn connect(&self, database: &str, collection: &str) -> Result<Self::Connection, Error>;
}

pub trait Collection {
    /// Idempotent: asking for an index that already exists is not an error.
    fn ensure_unique_descending_index(&mut self, field: &str) -> Result<(), Error>;

    fn insert_one(&mut self, document: &Value) -> Result<(), Error>;
}

// To enable heterogenous abstractions over store backends
pub enum StoreType {
    Mongo(MongoStore),
    Memory(MemoryStore),
}

impl StoreType {
    pub fn from_uri(uri: &str) -> Result<StoreType, Error> {
        if uri.starts_with(MEMORY_SCHEME) {
            debug!("using in-memory document store");
            Ok(StoreType::Memory(MemoryStore::new()))
        } else if MONGO_SCHEMES.iter().any(|scheme| uri.starts_with(scheme)) {
            debug!("using MongoDB document store");
            Ok(StoreType::Mongo(MongoStore::new(uri)))
        } else {
            Err(Error::new(ErrorKind::UnsupportedUri(scheme_of(uri))))
        }
    }
}

// Connection strings carry credentials; only the scheme is safe to echo.
fn scheme_of(uri: &str) -> String {
    match uri.find("://") {
        Some(i) => uri[..i + 3].to_owned(),
        None => "<none>".to_owned(),
    }
}

impl DocumentStore for StoreType {
    type Connection = ConnectionType;

    fn connect(&self, database: &str, collection: &str) -> Result<ConnectionType, Error> {
        match self {
            Self::Mongo(store) => Ok(ConnectionType::Mongo(store.connect(database, collection)?)),
            Self::Memory(store) => Ok(ConnectionType::Memory(
                store.connect(database, collection)?,
            )),
        }
    }
}

pub enum ConnectionType {
    Mongo(MongoConnection),
    Memory(MemoryConnection),
}

impl Collection for ConnectionType {
    fn ensure_unique_descending_index(&mut self, field: &str) -> Result<(), Error> {
        match &mut *self {
            Self::Mongo(conn) => conn.ensure_unique_descending_index(field),
            Self::Memory(conn) => conn.ensure_unique_descending_index(field),
        }
    }

    fn insert_one(&mut self, document: &Value) -> Result<(), Error> {
        match &mut *self {
            Self::Mongo(conn) => conn.insert_one(document),
            Self::Memory(conn) => conn.insert_one(document),
        }
    }
}
