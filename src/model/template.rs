use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::common::non_empty;
use crate::model::{FolderRef, Id};

/// Persisted template record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortid: Option<String>,

    /// Unique only within the containing folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helpers: Option<String>,

    #[serde(
        rename = "modificationDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub modification_date: Option<DateTime<Utc>>,

    /// Weak reference to the containing folder, absent for root-level templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<FolderRef>,

    /// Fields owned by other extensions, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Template {
    pub fn new(name: &str, engine: &str, recipe: &str, content: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            engine: Some(engine.to_string()),
            recipe: Some(recipe.to_string()),
            content: Some(content.to_string()),
            ..Default::default()
        }
    }

    pub fn in_folder(mut self, folder_shortid: &str) -> Self {
        self.folder = Some(FolderRef::new(folder_shortid));
        self
    }
}

/// Caller supplied partial descriptor of the template to render.
///
/// Identification uses the first non-empty of `_id`, `shortid` and `name`;
/// every other field is an override applied on top of the stored record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateRef {
    #[serde(
        rename = "_id",
        alias = "id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Id>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortid: Option<String>,

    /// Bare name or absolute `/` separated path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub overrides: Map<String, Value>,
}

impl TemplateRef {
    pub fn by_id(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }

    pub fn by_shortid(shortid: &str) -> Self {
        Self {
            shortid: Some(shortid.to_string()),
            ..Default::default()
        }
    }

    pub fn by_name(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn inline(content: &str) -> Self {
        Self::default().with("content", Value::String(content.to_string()))
    }

    /// Add an override field
    pub fn with(mut self, field: &str, value: Value) -> Self {
        self.overrides.insert(field.to_string(), value);
        self
    }

    pub fn id(&self) -> Option<&str> {
        non_empty(&self.id)
    }

    pub fn shortid(&self) -> Option<&str> {
        non_empty(&self.shortid)
    }

    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    /// Inline content usable when no stored template is found
    pub fn inline_content(&self) -> Option<&str> {
        self.overrides
            .get("content")
            .and_then(Value::as_str)
            .filter(|content| !content.is_empty())
    }

    fn override_str(&self, field: &str) -> Option<&str> {
        self.overrides.get(field).and_then(Value::as_str)
    }

    pub fn engine(&self) -> Option<&str> {
        self.override_str("engine")
    }

    pub fn recipe(&self) -> Option<&str> {
        self.override_str("recipe")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_template_keeps_unknown_fields() {
        let raw = json!({
            "_id": "t1",
            "shortid": "abc",
            "name": "invoice",
            "engine": "handlebars",
            "recipe": "html",
            "folder": {"shortid": "f1"},
            "scripts": [{"shortid": "s1"}]
        });

        let template: Template = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(template.folder, Some(FolderRef::new("f1")));
        assert_eq!(template.extra.get("scripts"), raw.get("scripts"));
        assert_eq!(serde_json::to_value(&template).unwrap(), raw);
    }

    #[test]
    fn test_template_ref_accepts_id_alias() {
        let template_ref: TemplateRef =
            serde_json::from_value(json!({"id": "t1", "content": "hi"})).unwrap();
        assert_eq!(template_ref.id(), Some("t1"));
        assert_eq!(template_ref.inline_content(), Some("hi"));
    }

    #[test]
    fn test_blank_identifiers_are_absent() {
        let template_ref: TemplateRef =
            serde_json::from_value(json!({"_id": "", "shortid": "", "name": "x"})).unwrap();
        assert_eq!(template_ref.id(), None);
        assert_eq!(template_ref.shortid(), None);
        assert_eq!(template_ref.name(), Some("x"));
        assert_eq!(TemplateRef::inline("").inline_content(), None);
    }
}
