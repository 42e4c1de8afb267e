use chrono::Utc;
use serde_json::Value;

use crate::error::{ResolveError, ResolveResult};
use crate::model::{generate_shortid, Document, Update};

/// Insert and update hooks for the templates and folders collections
#[derive(Debug, Clone, Default)]
pub struct CreationGuard {
    /// Used when a new template has no engine, otherwise the insert fails
    pub default_engine: Option<String>,
    /// Used when a new template has no recipe, otherwise the insert fails
    pub default_recipe: Option<String>,
}

impl CreationGuard {
    pub fn new(default_engine: Option<String>, default_recipe: Option<String>) -> Self {
        Self {
            default_engine,
            default_recipe,
        }
    }

    /// Check required fields and fill generated ones on a new template
    pub fn before_template_insert(&self, document: &mut Document) -> ResolveResult<()> {
        require(document, "engine", self.default_engine.as_deref())?;
        require(document, "recipe", self.default_recipe.as_deref())?;
        assign_shortid(document);
        stamp(document);
        Ok(())
    }

    /// Folders only need a name
    pub fn before_folder_insert(&self, document: &mut Document) -> ResolveResult<()> {
        require(document, "name", None)?;
        assign_shortid(document);
        stamp(document);
        Ok(())
    }

    /// Identifiers stay fixed, engine and recipe cannot be cleared
    pub fn before_template_update(&self, update: &mut Update) -> ResolveResult<()> {
        prepare_update(update, &["engine", "recipe"])
    }

    pub fn before_folder_update(&self, update: &mut Update) -> ResolveResult<()> {
        prepare_update(update, &["name"])
    }
}

/// Every update refreshes the modification date
fn prepare_update(update: &mut Update, required: &[&str]) -> ResolveResult<()> {
    for field in required {
        if update.set.contains_key(*field) && !is_present(&update.set, field) {
            return Err(ResolveError::Validation(format!("{} required", field)));
        }
    }
    update.set.remove("_id");
    update.set.remove("shortid");
    stamp(&mut update.set);
    Ok(())
}

fn is_present(document: &Document, field: &str) -> bool {
    match document.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn require(document: &mut Document, field: &str, default: Option<&str>) -> ResolveResult<()> {
    if is_present(document, field) {
        return Ok(());
    }
    match default {
        Some(default) => {
            document.insert(field.to_string(), Value::String(default.to_string()));
            Ok(())
        }
        None => Err(ResolveError::Validation(format!("{} required", field))),
    }
}

fn assign_shortid(document: &mut Document) {
    if !is_present(document, "shortid") {
        document.insert("shortid".to_string(), Value::String(generate_shortid()));
    }
}

fn stamp(document: &mut Document) {
    document.insert(
        "modificationDate".to_string(),
        Value::String(Utc::now().to_rfc3339()),
    );
}
