use serde::Serialize;

use crate::error::{ResolveError, ResolveResult};
use crate::logic::folder_chain::{FolderTarget, FolderWalker};
use crate::logic::path::{parse_name, ParsedName};
use crate::model::{Id, Query, TemplateRef};
use crate::store::traits::DocumentStore;

/// How a render request identifies its template, decided once up front
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    ById(Id),
    ByShortId(String),
    /// Absolute path; `raw` keeps the caller's spelling for messages
    ByPath { raw: String, parsed: ParsedName },
    /// Bare name, matched across every folder
    ByName(String),
    /// No identifier, the request carries its own content
    Inline,
}

impl Reference {
    /// Classify a template reference with `_id` > `shortid` > `name` precedence
    pub fn from_template_ref(template_ref: &TemplateRef) -> ResolveResult<Self> {
        if let Some(id) = template_ref.id() {
            return Ok(Reference::ById(id.to_string()));
        }
        if let Some(shortid) = template_ref.shortid() {
            return Ok(Reference::ByShortId(shortid.to_string()));
        }
        if let Some(name) = template_ref.name() {
            let parsed = parse_name(name)?;
            return Ok(if parsed.is_path {
                Reference::ByPath {
                    raw: name.to_string(),
                    parsed,
                }
            } else {
                Reference::ByName(parsed.leaf)
            });
        }
        if template_ref.inline_content().is_some() {
            return Ok(Reference::Inline);
        }
        Err(ResolveError::MissingIdentifyingInfo)
    }

    /// Field and value used in error messages
    pub fn meta(&self) -> Option<QueryMeta> {
        match self {
            Reference::ById(id) => Some(QueryMeta::new("_id", id)),
            Reference::ByShortId(shortid) => Some(QueryMeta::new("shortid", shortid)),
            Reference::ByPath { raw, .. } => Some(QueryMeta::new("name", raw)),
            Reference::ByName(name) => Some(QueryMeta::new("name", name)),
            Reference::Inline => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryMeta {
    pub field: String,
    pub value: String,
}

impl QueryMeta {
    fn new(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Lookup derived from a reference
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateQuery {
    /// `None` when the reference names a folder chain that does not exist
    pub predicate: Option<Query>,
    pub meta: QueryMeta,
}

/// Derive the templates-collection predicate for a reference.
///
/// Returns `None` for inline references, which never touch the store.
pub async fn build_query<S: DocumentStore>(
    store: &S,
    walker: &FolderWalker,
    reference: &Reference,
) -> ResolveResult<Option<TemplateQuery>> {
    let Some(meta) = reference.meta() else {
        return Ok(None);
    };

    let predicate = match reference {
        Reference::ById(id) => Some(Query::new().eq("_id", id.as_str())),
        Reference::ByShortId(shortid) => Some(Query::new().eq("shortid", shortid.as_str())),
        Reference::ByName(name) => Some(Query::new().eq("name", name.as_str())),
        Reference::ByPath { parsed, .. } => {
            let by_leaf = Query::new().eq("name", parsed.leaf.as_str());
            match walker.resolve_folder(store, parsed.ancestors()).await? {
                FolderTarget::Root => Some(by_leaf.missing("folder")),
                FolderTarget::Folder(folder) => {
                    Some(by_leaf.eq("folder.shortid", folder.shortid.as_str()))
                }
                FolderTarget::Missing => None,
            }
        }
        Reference::Inline => return Ok(None),
    };

    Ok(Some(TemplateQuery { predicate, meta }))
}
