use super::{Collection, DocumentStore, Error, ErrorKind};
use log::debug;
use mongodb::bson::{self, Document};
use mongodb::options::IndexOptions;
use mongodb::sync::{Client, Collection as MongoCollection};
use mongodb::IndexModel;
use serde_json::Value;

pub struct MongoStore {
    uri: String,
}

impl MongoStore {
    pub fn new(uri: &str) -> MongoStore {
        MongoStore {
            uri: uri.to_owned(),
        }
    }
}

impl DocumentStore for MongoStore {
    type Connection = MongoConnection;

    fn connect(&self, database: &str, collection: &str) -> Result<MongoConnection, Error> {
        // Parses the connection string; the server is only contacted by the
        // first operation.
        let client = Client::with_uri_str(&self.uri)?;
        let collection = client.database(database).collection::<Document>(collection);
        debug!("connected to MongoDB namespace {}", collection.namespace());

        Ok(MongoConnection {
            client: Some(client),
            collection,
        })
    }
}

pub struct MongoConnection {
    // Taken on drop to shut the client down.
    client: Option<Client>,
    collection: MongoCollection<Document>,
}

impl Collection for MongoConnection {
    fn ensure_unique_descending_index(&mut self, field: &str) -> Result<(), Error> {
        let mut keys = Document::new();
        keys.insert(field, -1);

        let model = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(true).build())
            .build();

        let created = self.collection.create_index(model).run()?;
        debug!("ensured index {}", created.index_name);

        Ok(())
    }

    fn insert_one(&mut self, document: &Value) -> Result<(), Error> {
        if !document.is_object() {
            return Err(Error::new(ErrorKind::NotADocument));
        }

        let document = bson::to_document(document)?;
        let result = self.collection.insert_one(document).run()?;
        debug!("inserted document {}", result.inserted_id);

        Ok(())
    }
}

impl Drop for MongoConnection {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            debug!("closing MongoDB connection to {}", self.collection.namespace());
            client.shutdown().run();
        }
    }
}
