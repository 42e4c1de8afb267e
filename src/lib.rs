pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use error::{ResolveError, ResolveResult};

// Export logic types
pub use logic::{
    build_query, deep_merge, merge_template, parse_name, CreationGuard, FolderCollection,
    FolderTarget, FolderWalker, ParsedName, QueryMeta, Reference, Resolution,
    TemplateCollection, TemplateQuery, TemplateResolver,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{DocumentStore, InMemoryStore, PostgresStore};

use crate::api::handlers::ApiContext;
use crate::config::AppConfig;
use std::sync::Arc;

/// Build the HTTP application over any document store
pub fn build_app<S: DocumentStore + 'static>(store: S, config: &AppConfig) -> axum::Router {
    let context = ApiContext::new(
        store,
        config.templates.resolver(),
        config.templates.creation_guard(),
    );
    crate::api::routes::create_router().with_state(Arc::new(context))
}

/// Serve the application on an already bound listener
pub async fn run_server<S: DocumentStore + 'static>(
    store: S,
    config: &AppConfig,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    axum::serve(listener, build_app(store, config)).await?;
    Ok(())
}
