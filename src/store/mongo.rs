//! MongoDB book collection.
//!
//! # Responsibilities
//! - Connect and ping the server within a bounded timeout
//! - Ensure a unique index on `id` so duplicate inserts fail atomically
//! - Translate between [`BookRecord`] and the stored document layout
//!
//! # Document layout
//! `_id` (ObjectId, the internal handle), `id`, `bookname`, `bookauthor`,
//! `bookedition`, `bookpages`, `bookyear`.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};

use crate::books::{BookRecord, InternalHandle};
use crate::config::StoreConfig;
use crate::store::{BookCollection, StoreError, StoreResult};

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BookDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    mongo_id: Option<ObjectId>,
    id: String,
    #[serde(default)]
    bookname: String,
    #[serde(default)]
    bookauthor: String,
    #[serde(default)]
    bookedition: String,
    #[serde(default)]
    bookpages: String,
    #[serde(default)]
    bookyear: String,
}

impl BookDocument {
    fn from_record(record: &BookRecord) -> Self {
        Self {
            mongo_id: record
                .handle
                .as_ref()
                .and_then(|h| ObjectId::parse_str(h.as_str()).ok()),
            id: record.id.clone(),
            bookname: record.title.clone(),
            bookauthor: record.author.clone(),
            bookedition: record.edition.clone(),
            bookpages: record.pages.clone(),
            bookyear: record.year.clone(),
        }
    }

    fn into_record(self) -> BookRecord {
        BookRecord {
            handle: self.mongo_id.map(|oid| InternalHandle::new(oid.to_hex())),
            id: self.id,
            title: self.bookname,
            author: self.bookauthor,
            pages: self.bookpages,
            edition: self.bookedition,
            year: self.bookyear,
        }
    }
}

#[derive(Clone)]
pub struct MongoCollection {
    database: Database,
    books: Collection<BookDocument>,
}

impl MongoCollection {
    /// Connect, ping and prepare the collection. Any failure here is meant to
    /// abort startup.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let uri = config
            .uri
            .as_deref()
            .ok_or_else(|| StoreError::Connection("no database uri configured".to_string()))?;
        let connect_timeout = Duration::from_secs(config.connect_timeout_secs);

        let mut options = tokio::time::timeout(connect_timeout, ClientOptions::parse(uri))
            .await
            .map_err(|_| StoreError::Timeout {
                operation: "parse_uri",
                after: connect_timeout,
            })??;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.connect_timeout = Some(connect_timeout);
        options.server_selection_timeout = Some(connect_timeout);

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);
        let books = database.collection::<BookDocument>(&config.collection);
        let store = Self { database, books };

        store.ping().await?;
        store.ensure_unique_index().await?;

        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "Connected to MongoDB"
        );
        Ok(store)
    }

    async fn ensure_unique_index(&self) -> StoreResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();
        self.books.create_index(index).await?;
        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        _ => false,
    }
}

#[async_trait]
impl BookCollection for MongoCollection {
    async fn count(&self, id: &str) -> StoreResult<u64> {
        Ok(self.books.count_documents(doc! { "id": id }).await?)
    }

    async fn insert_one(&self, record: &BookRecord) -> StoreResult<InternalHandle> {
        let document = BookDocument {
            mongo_id: None,
            ..BookDocument::from_record(record)
        };
        let result = self.books.insert_one(&document).await.map_err(|err| {
            if is_duplicate_key(&err) {
                StoreError::duplicate(&record.id)
            } else {
                StoreError::from(err)
            }
        })?;

        result
            .inserted_id
            .as_object_id()
            .map(|oid| InternalHandle::new(oid.to_hex()))
            .ok_or_else(|| StoreError::Backend("inserted id is not an ObjectId".to_string()))
    }

    async fn find_all(&self) -> StoreResult<Vec<BookRecord>> {
        let cursor = self.books.find(doc! {}).await?;
        let documents: Vec<BookDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(BookDocument::into_record).collect())
    }

    async fn find_one(&self, id: &str) -> StoreResult<Option<BookRecord>> {
        let found = self.books.find_one(doc! { "id": id }).await?;
        Ok(found.map(BookDocument::into_record))
    }

    async fn replace_one(&self, id: &str, record: &BookRecord) -> StoreResult<u64> {
        let replacement = BookDocument {
            id: id.to_string(),
            ..BookDocument::from_record(record)
        };
        let result = self
            .books
            .replace_one(doc! { "id": id }, &replacement)
            .await?;
        Ok(result.matched_count)
    }

    async fn delete_one(&self, id: &str) -> StoreResult<u64> {
        let result = self.books.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_round_trip_preserves_attributes() {
        let oid = ObjectId::new();
        let record = BookRecord {
            handle: Some(InternalHandle::new(oid.to_hex())),
            id: "example2".into(),
            title: "Frankenstein".into(),
            author: "Mary Shelley".into(),
            pages: "280".into(),
            edition: "978-3-649-64609-9".into(),
            year: "1818".into(),
        };

        let document = BookDocument::from_record(&record);
        assert_eq!(document.mongo_id, Some(oid));
        assert_eq!(document.bookname, "Frankenstein");
        assert_eq!(document.into_record(), record);
    }

    #[test]
    fn document_without_handle_omits_object_id() {
        let record = BookRecord {
            handle: None,
            id: "b1".into(),
            title: "T".into(),
            author: "A".into(),
            pages: String::new(),
            edition: String::new(),
            year: String::new(),
        };
        let bson = mongodb::bson::to_document(&BookDocument::from_record(&record)).unwrap();
        assert!(!bson.contains_key("_id"));
        assert_eq!(bson.get_str("id").unwrap(), "b1");
        assert_eq!(bson.get_str("bookauthor").unwrap(), "A");
    }
}
