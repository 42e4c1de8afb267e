use crate::logic::{CreationGuard, FolderCollection, TemplateCollection};
use crate::model::{Folder, Template};
use crate::store::traits::DocumentStore;
use anyhow::Result;

/// Helper function to create a template with the demo engine and recipe
fn create_demo_template(name: &str, content: &str) -> Template {
    Template::new(name, "handlebars", "html", content)
}

/// Load a small folder tree with a few templates:
///
/// ```text
/// /welcome
/// /invoices/invoice
/// /invoices/archive/invoice
/// ```
pub async fn load_seed_data<S: DocumentStore>(store: &S, guard: &CreationGuard) -> Result<()> {
    let folders = FolderCollection::new(store, guard);
    let templates = TemplateCollection::new(store, guard);

    let invoices = folders.insert(&Folder::new("invoices")).await?;
    let archive = folders
        .insert(&Folder::new("archive").in_folder(&invoices.shortid))
        .await?;

    templates
        .insert(&create_demo_template("welcome", "<h1>Hello {{name}}</h1>"))
        .await?;
    templates
        .insert(
            &create_demo_template("invoice", "<h1>Invoice {{number}}</h1>")
                .in_folder(&invoices.shortid),
        )
        .await?;
    // Same name in another folder, only reachable by path
    templates
        .insert(
            &create_demo_template("invoice", "<h1>Archived invoice {{number}}</h1>")
                .in_folder(&archive.shortid),
        )
        .await?;

    log::info!("Seed data loaded: 2 folders, 3 templates");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::TemplateResolver;
    use crate::model::{RenderRequest, TemplateRef, TEMPLATES_COLLECTION};
    use crate::store::memory::InMemoryStore;

    #[tokio::test]
    async fn test_seed_templates_resolve_by_path() {
        let store = InMemoryStore::new();
        load_seed_data(&store, &CreationGuard::default()).await.unwrap();
        assert_eq!(store.count(TEMPLATES_COLLECTION), 3);

        let outcome = TemplateResolver::default()
            .before_render(
                &store,
                &RenderRequest::new(TemplateRef::by_name("/invoices/archive/invoice")),
            )
            .await
            .unwrap();
        assert_eq!(outcome.current_folder_path, "/invoices/archive");
    }
}
