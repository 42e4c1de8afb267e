use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::ResolveError;
use crate::logic::{CreationGuard, FolderCollection, TemplateCollection, TemplateResolver};
use crate::model::{Document, Folder, Query, RenderOutcome, RenderRequest, Template, TemplateRef};
use crate::store::traits::DocumentStore;

/// Shared state behind every handler
pub struct ApiContext<S> {
    pub store: S,
    pub resolver: TemplateResolver,
    pub guard: CreationGuard,
}

impl<S: DocumentStore> ApiContext<S> {
    pub fn new(store: S, resolver: TemplateResolver, guard: CreationGuard) -> Self {
        Self {
            store,
            resolver,
            guard,
        }
    }

    fn templates(&self) -> TemplateCollection<'_, S> {
        TemplateCollection::new(&self.store, &self.guard)
    }
}

pub type AppState<S> = Arc<ApiContext<S>>;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Weak errors are reported verbatim, anything else stays in the logs
fn error_response(err: ResolveError) -> (StatusCode, Json<ErrorResponse>) {
    let status = err.status_code();
    if err.is_weak() {
        (status, Json(ErrorResponse::new(&err.to_string())))
    } else {
        log::error!("Template request failed: {:#}", err);
        (status, Json(ErrorResponse::new("Internal server error")))
    }
}

fn not_found(shortid: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(&format!(
            "Template '{}' not found",
            shortid
        ))),
    )
}

/// Resolve a stored template by shortid and hand it to the render step
pub async fn render_by_shortid<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(shortid): Path<String>,
) -> ApiResult<RenderOutcome> {
    let request = RenderRequest::new(TemplateRef::by_shortid(&shortid));
    state
        .resolver
        .before_render(&state.store, &request)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn render<S: DocumentStore>(
    State(state): State<AppState<S>>,
    RequestJson(request): RequestJson<RenderRequest>,
) -> ApiResult<RenderOutcome> {
    state
        .resolver
        .before_render(&state.store, &request)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn create_template<S: DocumentStore>(
    State(state): State<AppState<S>>,
    RequestJson(document): RequestJson<Document>,
) -> ApiResult<Template> {
    state
        .templates()
        .insert_document(document)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn update_template<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(shortid): Path<String>,
    RequestJson(fields): RequestJson<Document>,
) -> ApiResult<Template> {
    let templates = state.templates();
    let query = Query::new().eq("shortid", shortid.as_str());

    let matched = templates.update(&query, fields).await.map_err(error_response)?;
    if matched == 0 {
        return Err(not_found(&shortid));
    }

    match templates.find_by_shortid(&shortid).await {
        Ok(Some(template)) => Ok(Json(template)),
        Ok(None) => Err(not_found(&shortid)),
        Err(e) => Err(error_response(e)),
    }
}

pub async fn delete_template<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(shortid): Path<String>,
) -> ApiResult<CountResponse> {
    let query = Query::new().eq("shortid", shortid.as_str());
    match state.templates().remove(&query).await {
        Ok(0) => Err(not_found(&shortid)),
        Ok(count) => Ok(Json(CountResponse { count })),
        Err(e) => Err(error_response(e)),
    }
}

pub async fn create_folder<S: DocumentStore>(
    State(state): State<AppState<S>>,
    RequestJson(document): RequestJson<Document>,
) -> ApiResult<Folder> {
    FolderCollection::new(&state.store, &state.guard)
        .insert_document(document)
        .await
        .map(Json)
        .map_err(error_response)
}
