use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::{ResolveError, ResolveResult};
use crate::logic::creation_guard::CreationGuard;
use crate::model::{
    Document, Folder, Query, Template, Update, FOLDERS_COLLECTION, TEMPLATES_COLLECTION,
};
use crate::store::traits::DocumentStore;

pub(crate) fn to_document<T: Serialize>(value: &T) -> ResolveResult<Document> {
    match serde_json::to_value(value).map_err(|e| ResolveError::Store(e.into()))? {
        Value::Object(document) => Ok(document),
        _ => Err(ResolveError::Validation("record must be an object".to_string())),
    }
}

pub(crate) fn from_document<T: DeserializeOwned>(document: Document) -> ResolveResult<T> {
    serde_json::from_value(Value::Object(document))
        .map_err(|e| ResolveError::Store(anyhow::anyhow!("Malformed stored record: {}", e)))
}

/// Caller input must have the record's shape before it is written
fn check_shape<T: DeserializeOwned>(document: &Document) -> ResolveResult<()> {
    serde_json::from_value::<T>(Value::Object(document.clone()))
        .map(|_| ())
        .map_err(|e| ResolveError::Validation(format!("invalid record: {}", e)))
}

/// Apply the update to a copy of every matching record and check the result
async fn check_update<T: DeserializeOwned, S: DocumentStore>(
    store: &S,
    collection: &str,
    query: &Query,
    update: &Update,
) -> ResolveResult<()> {
    for mut document in store.find(collection, query).await? {
        update.apply(&mut document);
        check_shape::<T>(&document)?;
    }
    Ok(())
}

/// Typed access to the templates collection with the creation hooks applied
pub struct TemplateCollection<'a, S> {
    store: &'a S,
    guard: &'a CreationGuard,
}

impl<'a, S: DocumentStore> TemplateCollection<'a, S> {
    pub fn new(store: &'a S, guard: &'a CreationGuard) -> Self {
        Self { store, guard }
    }

    pub async fn insert(&self, template: &Template) -> ResolveResult<Template> {
        self.insert_document(to_document(template)?).await
    }

    pub async fn insert_document(&self, mut document: Document) -> ResolveResult<Template> {
        self.guard.before_template_insert(&mut document)?;
        check_shape::<Template>(&document)?;
        let stored = self.store.insert(TEMPLATES_COLLECTION, document).await?;
        from_document(stored)
    }

    pub async fn find(&self, query: &Query) -> ResolveResult<Vec<Template>> {
        self.store
            .find(TEMPLATES_COLLECTION, query)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    pub async fn find_by_shortid(&self, shortid: &str) -> ResolveResult<Option<Template>> {
        self.store
            .find_one(TEMPLATES_COLLECTION, &Query::new().eq("shortid", shortid))
            .await?
            .map(from_document)
            .transpose()
    }

    pub async fn update(&self, query: &Query, fields: Document) -> ResolveResult<u64> {
        let mut update = Update::set(fields);
        self.guard.before_template_update(&mut update)?;
        check_update::<Template, S>(self.store, TEMPLATES_COLLECTION, query, &update).await?;
        Ok(self.store.update(TEMPLATES_COLLECTION, query, &update).await?)
    }

    pub async fn remove(&self, query: &Query) -> ResolveResult<u64> {
        Ok(self.store.remove(TEMPLATES_COLLECTION, query).await?)
    }
}

/// Typed access to the folders collection
pub struct FolderCollection<'a, S> {
    store: &'a S,
    guard: &'a CreationGuard,
}

impl<'a, S: DocumentStore> FolderCollection<'a, S> {
    pub fn new(store: &'a S, guard: &'a CreationGuard) -> Self {
        Self { store, guard }
    }

    pub async fn insert(&self, folder: &Folder) -> ResolveResult<Folder> {
        self.insert_document(to_document(folder)?).await
    }

    pub async fn insert_document(&self, mut document: Document) -> ResolveResult<Folder> {
        self.guard.before_folder_insert(&mut document)?;
        check_shape::<Folder>(&document)?;
        let stored = self.store.insert(FOLDERS_COLLECTION, document).await?;
        from_document(stored)
    }

    pub async fn update(&self, query: &Query, fields: Document) -> ResolveResult<u64> {
        let mut update = Update::set(fields);
        self.guard.before_folder_update(&mut update)?;
        check_update::<Folder, S>(self.store, FOLDERS_COLLECTION, query, &update).await?;
        Ok(self.store.update(FOLDERS_COLLECTION, query, &update).await?)
    }
}
