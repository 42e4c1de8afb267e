use std::collections::HashSet;

use crate::error::{ResolveError, ResolveResult};
use crate::model::{Folder, FolderRef, Query, FOLDERS_COLLECTION};
use crate::store::traits::DocumentStore;

pub const DEFAULT_MAX_FOLDER_DEPTH: usize = 64;

/// Where a path's ancestor segments lead
#[derive(Debug, Clone, PartialEq)]
pub enum FolderTarget {
    /// No ancestors: the entity lives at the root
    Root,
    /// Deepest folder named by the ancestors
    Folder(Folder),
    /// Some ancestor does not exist, nothing can match
    Missing,
}

/// Walks folder back-references, one store round-trip per level
#[derive(Debug, Clone)]
pub struct FolderWalker {
    max_depth: usize,
}

impl Default for FolderWalker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FOLDER_DEPTH)
    }
}

impl FolderWalker {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Descend from the root following folder names
    pub async fn resolve_folder<S: DocumentStore>(
        &self,
        store: &S,
        ancestors: &[String],
    ) -> ResolveResult<FolderTarget> {
        if ancestors.len() > self.max_depth {
            return Err(ResolveError::invalid_path(
                &format!("/{}", ancestors.join("/")),
                "exceeds maximum folder depth",
            ));
        }

        let mut current: Option<Folder> = None;
        for (depth, segment) in ancestors.iter().enumerate() {
            let query = match &current {
                Some(parent) => Query::new()
                    .eq("name", segment.as_str())
                    .eq("folder.shortid", parent.shortid.as_str()),
                None => Query::new().eq("name", segment.as_str()).missing("folder"),
            };

            let mut documents = store.find(FOLDERS_COLLECTION, &query).await?;
            if documents.len() > 1 {
                let path = format!("/{}", ancestors[..=depth].join("/"));
                log::warn!("{} folders match {} at {}", documents.len(), query, path);
                return Err(ResolveError::AmbiguousResolution {
                    field: "folder".to_string(),
                    value: path,
                });
            }
            let Some(document) = documents.pop() else {
                log::debug!("Folder '{}' not found for query {}", segment, query);
                return Ok(FolderTarget::Missing);
            };

            let folder: Folder = serde_json::from_value(document.into())
                .map_err(|e| anyhow::anyhow!("Malformed folder record '{}': {}", segment, e))?;
            current = Some(folder);
        }

        Ok(match current {
            Some(folder) => FolderTarget::Folder(folder),
            None => FolderTarget::Root,
        })
    }

    /// Rebuild the `/a/b` path of the folder an entity points to.
    ///
    /// Missing, malformed or cyclic links end the walk early and the path
    /// collected so far is returned.
    pub async fn resolve_current_path<S: DocumentStore>(
        &self,
        store: &S,
        folder: Option<&FolderRef>,
    ) -> String {
        let mut names = Vec::new();
        let mut visited = HashSet::new();
        let mut next = folder.map(|f| f.shortid.clone());

        while let Some(shortid) = next.take() {
            if !visited.insert(shortid.clone()) {
                log::warn!("Folder cycle detected at shortid '{}'", shortid);
                break;
            }
            if names.len() >= self.max_depth {
                log::warn!(
                    "Folder chain exceeds maximum depth {}, truncating",
                    self.max_depth
                );
                break;
            }

            let query = Query::new().eq("shortid", shortid.as_str());
            let document = match store.find_one(FOLDERS_COLLECTION, &query).await {
                Ok(Some(document)) => document,
                Ok(None) => {
                    log::warn!("Folder '{}' referenced but not found", shortid);
                    break;
                }
                Err(e) => {
                    log::warn!("Failed to load folder '{}': {}", shortid, e);
                    break;
                }
            };

            match serde_json::from_value::<Folder>(document.into()) {
                Ok(parent) => {
                    names.push(parent.name);
                    next = parent.folder.map(|f| f.shortid);
                }
                Err(e) => {
                    log::warn!("Malformed folder '{}': {}", shortid, e);
                    break;
                }
            }
        }

        names.reverse();
        format!("/{}", names.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Document;
    use crate::store::memory::InMemoryStore;

    async fn add_folder(store: &InMemoryStore, folder: Folder) {
        let document = match serde_json::to_value(folder).unwrap() {
            serde_json::Value::Object(document) => document,
            _ => unreachable!(),
        };
        store.insert(FOLDERS_COLLECTION, document).await.unwrap();
    }

    async fn tree() -> InMemoryStore {
        let store = InMemoryStore::new();
        add_folder(&store, Folder::new("a").with_shortid("fa")).await;
        add_folder(&store, Folder::new("b").with_shortid("fb").in_folder("fa")).await;
        // same name, different parent
        add_folder(&store, Folder::new("b").with_shortid("fb2")).await;
        store
    }

    fn segments(path: &[&str]) -> Vec<String> {
        path.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_resolve_folder_descends_by_parent() {
        let store = tree().await;
        let walker = FolderWalker::default();

        match walker.resolve_folder(&store, &segments(&["a", "b"])).await.unwrap() {
            FolderTarget::Folder(folder) => assert_eq!(folder.shortid, "fb"),
            other => panic!("expected folder, got {:?}", other),
        }
        match walker.resolve_folder(&store, &segments(&["b"])).await.unwrap() {
            FolderTarget::Folder(folder) => assert_eq!(folder.shortid, "fb2"),
            other => panic!("expected folder, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_folder_root_and_missing() {
        let store = tree().await;
        let walker = FolderWalker::default();

        assert_eq!(
            walker.resolve_folder(&store, &[]).await.unwrap(),
            FolderTarget::Root
        );
        assert_eq!(
            walker
                .resolve_folder(&store, &segments(&["a", "missing"]))
                .await
                .unwrap(),
            FolderTarget::Missing
        );
        // "a" exists but not under "b"
        assert_eq!(
            walker
                .resolve_folder(&store, &segments(&["b", "a"]))
                .await
                .unwrap(),
            FolderTarget::Missing
        );
    }

    #[tokio::test]
    async fn test_resolve_folder_rejects_duplicate_siblings() {
        let store = tree().await;
        add_folder(&store, Folder::new("b").with_shortid("fb3").in_folder("fa")).await;
        let walker = FolderWalker::default();

        match walker.resolve_folder(&store, &segments(&["a", "b"])).await {
            Err(ResolveError::AmbiguousResolution { field, value }) => {
                assert_eq!(field, "folder");
                assert_eq!(value, "/a/b");
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
        // the root-level "b" is still unique
        assert!(matches!(
            walker.resolve_folder(&store, &segments(&["b"])).await,
            Ok(FolderTarget::Folder(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_folder_depth_guard() {
        let store = InMemoryStore::new();
        let walker = FolderWalker::new(2);

        let result = walker
            .resolve_folder(&store, &segments(&["a", "b", "c"]))
            .await;
        assert!(matches!(result, Err(ResolveError::InvalidPath { .. })));
    }

    #[tokio::test]
    async fn test_resolve_current_path() {
        let store = tree().await;
        let walker = FolderWalker::default();

        assert_eq!(walker.resolve_current_path(&store, None).await, "/");
        assert_eq!(
            walker
                .resolve_current_path(&store, Some(&FolderRef::new("fb")))
                .await,
            "/a/b"
        );
        assert_eq!(
            walker
                .resolve_current_path(&store, Some(&FolderRef::new("fa")))
                .await,
            "/a"
        );
    }

    #[tokio::test]
    async fn test_resolve_current_path_stops_at_missing_parent() {
        let store = InMemoryStore::new();
        add_folder(&store, Folder::new("orphan").with_shortid("fo").in_folder("gone")).await;

        let path = FolderWalker::default()
            .resolve_current_path(&store, Some(&FolderRef::new("fo")))
            .await;
        assert_eq!(path, "/orphan");

        let path = FolderWalker::default()
            .resolve_current_path(&store, Some(&FolderRef::new("gone")))
            .await;
        assert_eq!(path, "/");
    }

    #[tokio::test]
    async fn test_resolve_current_path_survives_cycle() {
        let store = InMemoryStore::new();
        add_folder(&store, Folder::new("x").with_shortid("fx").in_folder("fy")).await;
        add_folder(&store, Folder::new("y").with_shortid("fy").in_folder("fx")).await;

        let path = FolderWalker::default()
            .resolve_current_path(&store, Some(&FolderRef::new("fx")))
            .await;
        assert_eq!(path, "/y/x");
    }

    #[tokio::test]
    async fn test_resolve_current_path_skips_malformed_records() {
        let store = InMemoryStore::new();
        let mut broken = Document::new();
        broken.insert("shortid".to_string(), serde_json::json!("fz"));
        store.insert(FOLDERS_COLLECTION, broken).await.unwrap();

        let path = FolderWalker::default()
            .resolve_current_path(&store, Some(&FolderRef::new("fz")))
            .await;
        assert_eq!(path, "/");
    }
}
