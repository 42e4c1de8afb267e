use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::Id;

/// Weak reference to a folder: relation and lookup only, never ownership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRef {
    pub shortid: String,
}

impl FolderRef {
    pub fn new(shortid: &str) -> Self {
        Self {
            shortid: shortid.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,

    pub name: String,

    #[serde(default)]
    pub shortid: String,

    /// Parent folder, absent for folders at the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<FolderRef>,

    #[serde(
        rename = "modificationDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub modification_date: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Folder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_shortid(mut self, shortid: &str) -> Self {
        self.shortid = shortid.to_string();
        self
    }

    pub fn in_folder(mut self, parent_shortid: &str) -> Self {
        self.folder = Some(FolderRef::new(parent_shortid));
        self
    }
}
