use crate::error::{ResolveError, ResolveResult};
use crate::logic::collections::from_document;
use crate::logic::folder_chain::FolderWalker;
use crate::logic::merge::merge_template;
use crate::logic::reference::{build_query, QueryMeta, Reference};
use crate::model::{RenderOutcome, RenderRequest, Template, TemplateRef, TEMPLATES_COLLECTION};
use crate::store::traits::DocumentStore;

/// What a reference resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// No identifier: render the request's own content
    Inline,
    Found(Template),
    /// Lookup ran and matched nothing
    Missing(QueryMeta),
}

/// Locates the template a render request refers to
#[derive(Debug, Clone, Default)]
pub struct TemplateResolver {
    walker: FolderWalker,
}

impl TemplateResolver {
    pub fn new(walker: FolderWalker) -> Self {
        Self { walker }
    }

    pub fn walker(&self) -> &FolderWalker {
        &self.walker
    }

    /// Find at most one stored template for the reference.
    ///
    /// More than one match is an error for every identifying field.
    pub async fn resolve<S: DocumentStore>(
        &self,
        store: &S,
        reference: &Reference,
    ) -> ResolveResult<Resolution> {
        let Some(query) = build_query(store, &self.walker, reference).await? else {
            return Ok(Resolution::Inline);
        };

        let Some(predicate) = query.predicate else {
            return Ok(Resolution::Missing(query.meta));
        };

        let mut documents = store.find(TEMPLATES_COLLECTION, &predicate).await?;
        match documents.len() {
            0 => Ok(Resolution::Missing(query.meta)),
            1 => Ok(Resolution::Found(from_document(documents.remove(0))?)),
            count => {
                log::warn!(
                    "{} templates match {} for {}: {}",
                    count,
                    predicate,
                    query.meta.field,
                    query.meta.value
                );
                Err(ResolveError::AmbiguousResolution {
                    field: query.meta.field,
                    value: query.meta.value,
                })
            }
        }
    }

    /// Pre-render step: resolve, merge overrides, compute the folder path
    pub async fn before_render<S: DocumentStore>(
        &self,
        store: &S,
        request: &RenderRequest,
    ) -> ResolveResult<RenderOutcome> {
        let template_ref = &request.template;
        let reference = Reference::from_template_ref(template_ref)?;

        let template = match self.resolve(store, &reference).await? {
            Resolution::Inline => {
                log::info!(
                    "Rendering anonymous template {{recipe: {}, engine: {}}}",
                    template_ref.recipe().unwrap_or("-"),
                    template_ref.engine().unwrap_or("-")
                );
                merge_template(None, template_ref)?
            }
            Resolution::Found(found) => {
                merge_template(Some(found), &overrides_for(&reference, template_ref))?
            }
            Resolution::Missing(meta) => {
                if template_ref.inline_content().is_none() {
                    return Err(ResolveError::TemplateNotFound { value: meta.value });
                }
                merge_template(None, &overrides_for(&reference, template_ref))?
            }
        };

        log::info!(
            "Rendering template {{shortid: {}, recipe: {}, engine: {}, preview: {}}}",
            template.shortid.as_deref().unwrap_or("-"),
            template.recipe.as_deref().unwrap_or("-"),
            template.engine.as_deref().unwrap_or("-"),
            request.options.preview
        );

        let current_folder_path = self
            .walker
            .resolve_current_path(store, template.folder.as_ref())
            .await;
        let report_name = request
            .report_name
            .clone()
            .or_else(|| template.name.clone());

        Ok(RenderOutcome {
            template,
            report_name,
            current_folder_path,
        })
    }
}

/// A path names the template but only its leaf is the template name
fn overrides_for(reference: &Reference, template_ref: &TemplateRef) -> TemplateRef {
    match reference {
        Reference::ByPath { parsed, .. } => TemplateRef {
            name: Some(parsed.leaf.clone()),
            ..template_ref.clone()
        },
        _ => template_ref.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::collections::{FolderCollection, TemplateCollection};
    use crate::logic::creation_guard::CreationGuard;
    use crate::model::Folder;
    use crate::store::memory::InMemoryStore;
    use serde_json::json;

    async fn store_with_tree() -> InMemoryStore {
        let store = InMemoryStore::new();
        let guard = CreationGuard::default();
        let folders = FolderCollection::new(&store, &guard);
        let templates = TemplateCollection::new(&store, &guard);

        folders
            .insert(&Folder::new("a").with_shortid("fa"))
            .await
            .unwrap();
        folders
            .insert(&Folder::new("b").with_shortid("fb").in_folder("fa"))
            .await
            .unwrap();
        templates
            .insert(&Template::new("leaf", "none", "html", "in b").in_folder("fb"))
            .await
            .unwrap();
        templates
            .insert(&Template::new("leaf", "none", "html", "in a").in_folder("fa"))
            .await
            .unwrap();
        templates
            .insert(&Template::new("top", "none", "html", "root"))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_resolve_by_path_strips_path_from_name() {
        let store = store_with_tree().await;
        let resolver = TemplateResolver::default();

        let outcome = resolver
            .before_render(&store, &RenderRequest::new(TemplateRef::by_name("/a/b/leaf")))
            .await
            .unwrap();
        assert_eq!(outcome.template.content.as_deref(), Some("in b"));
        assert_eq!(outcome.template.name.as_deref(), Some("leaf"));
        assert_eq!(outcome.report_name.as_deref(), Some("leaf"));
        assert_eq!(outcome.current_folder_path, "/a/b");
    }

    #[tokio::test]
    async fn test_ambiguous_name() {
        let store = store_with_tree().await;
        let resolver = TemplateResolver::default();

        let result = resolver
            .before_render(&store, &RenderRequest::new(TemplateRef::by_name("leaf")))
            .await;
        match result {
            Err(ResolveError::AmbiguousResolution { field, value }) => {
                assert_eq!(field, "name");
                assert_eq!(value, "leaf");
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_root_path_only_matches_root_templates() {
        let store = store_with_tree().await;
        let resolver = TemplateResolver::default();

        let top = resolver
            .before_render(&store, &RenderRequest::new(TemplateRef::by_name("/top")))
            .await
            .unwrap();
        assert_eq!(top.current_folder_path, "/");

        let result = resolver
            .before_render(&store, &RenderRequest::new(TemplateRef::by_name("/leaf")))
            .await;
        assert!(matches!(result, Err(ResolveError::TemplateNotFound { .. })));
    }

    #[tokio::test]
    async fn test_missing_folder_falls_back_to_inline_content() {
        let store = store_with_tree().await;
        let resolver = TemplateResolver::default();

        let template_ref = TemplateRef::by_name("/nope/leaf").with("content", json!("inline"));
        let outcome = resolver
            .before_render(&store, &RenderRequest::new(template_ref))
            .await
            .unwrap();
        assert_eq!(outcome.template.content.as_deref(), Some("inline"));
        assert!(outcome.template.id.is_none());
        assert_eq!(outcome.template.name.as_deref(), Some("leaf"));
        assert_eq!(outcome.report_name.as_deref(), Some("leaf"));
        assert_eq!(outcome.current_folder_path, "/");
    }

    #[tokio::test]
    async fn test_caller_report_name_wins() {
        let store = store_with_tree().await;
        let resolver = TemplateResolver::default();

        let request = RenderRequest {
            template: TemplateRef::by_name("top"),
            report_name: Some("monthly".to_string()),
            ..Default::default()
        };
        let outcome = resolver.before_render(&store, &request).await.unwrap();
        assert_eq!(outcome.report_name.as_deref(), Some("monthly"));
    }
}
