use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    with_id, Collection, Document, DocumentId, DocumentStore, Filter, FindOptions, Projection,
    StoreError,
};

/// In-process document store. Insertion order is the natural order.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<(DocumentId, Document)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, Vec::len)
    }
}

/// Same uniqueness the Postgres backend enforces with indexes.
fn unique_fields(collection: Collection) -> &'static [&'static str] {
    match collection {
        Collection::Users => &["email", "username"],
        _ => &[],
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        projection: &Projection,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let Some(rows) = collections.get(&collection) else {
            return Ok(vec![]);
        };

        let limit = options.limit.map_or(usize::MAX, |l| l as usize);
        let docs = rows
            .iter()
            .filter(|(id, doc)| filter.matches(id, doc))
            .skip(options.skip as usize)
            .take(limit)
            .map(|(id, doc)| {
                let mut doc = doc.clone();
                projection.apply(&mut doc);
                with_id(*id, doc)
            })
            .collect();
        Ok(docs)
    }

    async fn insert_one(
        &self,
        collection: Collection,
        id: DocumentId,
        doc: Document,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let rows = collections.entry(collection).or_default();
        if rows.iter().any(|(existing, _)| *existing == id) {
            return Err(StoreError::DuplicateKey {
                collection,
                detail: id.to_string(),
            });
        }
        for field in unique_fields(collection) {
            let Some(value) = doc.get(*field) else { continue };
            if rows.iter().any(|(_, existing)| existing.get(*field) == Some(value)) {
                return Err(StoreError::DuplicateKey {
                    collection,
                    detail: format!("{} {}", field, value),
                });
            }
        }
        rows.push((id, doc));
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
