//! MongoDB client and collection wrapper

use bson::{doc, Document};
use std::fmt::Display;
use futures_util::{Stream, TryStreamExt};
use mongodb::{
    options::{IndexOptions, ReturnDocument},
    Client, Collection, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info};

use crate::types::ThoughtsError;

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and verify the connection with a ping
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, ThoughtsError> {
        info!("Connecting to MongoDB at {}", uri);

        // Fail fast instead of hanging on an unreachable server
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| ThoughtsError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| ThoughtsError::Database(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Get a typed collection, creating its indexes
    pub async fn collection<T>(&self, name: &str) -> Result<MongoCollection<T>, ThoughtsError>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes,
    {
        MongoCollection::new(&self.client, &self.db_name, name).await
    }
}

/// Typed MongoDB collection with automatic indexing
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    inner: Collection<T>,
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes,
{
    pub async fn new(
        client: &Client,
        db_name: &str,
        collection_name: &str,
    ) -> Result<Self, ThoughtsError> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection { inner: collection };

        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    async fn apply_indexes(&self) -> Result<(), ThoughtsError> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner
            .create_indexes(indices)
            .await
            .map_err(|e| ThoughtsError::Database(format!("Failed to create indexes: {}", e)))?;

        Ok(())
    }

    /// Insert a document; schemas assign their own `_id` before insertion
    pub async fn insert_one(&self, item: &T) -> Result<(), ThoughtsError> {
        self.inner
            .insert_one(item)
            .await
            .map_err(|e| ThoughtsError::Database(format!("Insert failed: {}", e)))?;

        Ok(())
    }

    pub async fn find_one(&self, filter: Document) -> Result<Option<T>, ThoughtsError> {
        self.inner
            .find_one(filter)
            .await
            .map_err(|e| ThoughtsError::Database(format!("Find failed: {}", e)))
    }

    /// Find many documents; any unreadable document fails the whole read
    pub async fn find_many(
        &self,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Vec<T>, ThoughtsError> {
        let mut action = self.inner.find(filter);
        if let Some(sort) = sort {
            action = action.sort(sort);
        }

        let cursor = action
            .await
            .map_err(|e| ThoughtsError::Database(format!("Find failed: {}", e)))?;

        collect_documents(cursor).await
    }

    /// Apply an update and return the document as it is afterwards
    pub async fn find_one_and_update(
        &self,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<Option<T>, ThoughtsError> {
        self.inner
            .find_one_and_update(filter, update)
            .upsert(upsert)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| ThoughtsError::Database(format!("Update failed: {}", e)))
    }

    /// Hard delete; returns whether a document was removed
    pub async fn delete_one(&self, filter: Document) -> Result<bool, ThoughtsError> {
        let result = self
            .inner
            .delete_one(filter)
            .await
            .map_err(|e| ThoughtsError::Database(format!("Delete failed: {}", e)))?;

        Ok(result.deleted_count > 0)
    }
}

/// Drain a cursor, turning the first bad element into a database fault
async fn collect_documents<T, E, S>(cursor: S) -> Result<Vec<T>, ThoughtsError>
where
    S: Stream<Item = Result<T, E>>,
    E: Display,
{
    cursor.try_collect().await.map_err(|e| {
        error!("Error reading document: {}", e);
        ThoughtsError::Database(format!("Failed to read document: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::ThoughtDoc;
    use bson::oid::ObjectId;
    use futures_util::stream;

    fn raw_thought(status: &str) -> Document {
        doc! {
            "_id": ObjectId::new(),
            "user": ObjectId::new(),
            "body": "hello",
            "status": status,
            "createdAt": bson::DateTime::now(),
        }
    }

    #[tokio::test]
    async fn test_collect_documents_reads_all() {
        let docs = vec![raw_thought("public"), raw_thought("private")];
        let cursor = stream::iter(docs.into_iter().map(bson::from_document::<ThoughtDoc>));

        let thoughts = collect_documents(cursor).await.unwrap();
        assert_eq!(thoughts.len(), 2);
    }

    #[tokio::test]
    async fn test_unreadable_document_is_a_fault() {
        let docs = vec![raw_thought("public"), raw_thought("draft"), raw_thought("public")];
        let cursor = stream::iter(docs.into_iter().map(bson::from_document::<ThoughtDoc>));

        let err = collect_documents(cursor).await.unwrap_err();
        assert!(matches!(err, ThoughtsError::Database(_)));
        assert!(err.is_fault());
    }
}
