use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::layout::SceneGraph;
use crate::model::{ScreenDetail, Site, SiteDetail, TransitionGraph};
use crate::{DesignService, DesignVault, ViewerConfig, ViewerError, ViewerResult};

type SharedService = Arc<DesignService>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ViewerError {
    fn into_response(self) -> Response {
        let status = match &self {
            e if e.is_not_found() => StatusCode::NOT_FOUND,
            ViewerError::UnknownViewport { .. } => StatusCode::BAD_REQUEST,
            ViewerError::Internal(e) => {
                tracing::error!(error = ?e, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ViewportQuery {
    viewport: Option<String>,
}

pub fn router(service: SharedService, cors: CorsLayer) -> Router {
    Router::new()
        .route("/api/sites", get(list_sites))
        .route("/api/sites/{site_id}", get(site_detail))
        .route("/api/sites/{site_id}/transitions", get(transitions))
        .route("/api/sites/{site_id}/screens/{screen_id}", get(screen_detail))
        .route(
            "/api/sites/{site_id}/screens/{screen_id}/layout",
            get(screen_layout),
        )
        .layer(cors)
        .with_state(service)
}

pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin {o:?}")))
        .collect::<Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_credentials(true))
}

/// Binds the configured address and serves until the process is stopped.
pub async fn serve(config: &ViewerConfig) -> Result<()> {
    let service = Arc::new(DesignService::new(DesignVault::new(&config.design_path)));
    let app = router(service, cors_layer(&config.cors_origins)?);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    tracing::info!(
        %address,
        design_path = %config.design_path.display(),
        "design viewer API listening"
    );
    axum::serve(listener, app).await.context("server error")
}

/// Resolution reads the file system, so it runs off the async workers.
async fn blocking<T, F>(service: SharedService, f: F) -> ViewerResult<Json<T>>
where
    T: Send + 'static,
    F: FnOnce(&DesignService) -> ViewerResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .context("resolution task failed")?
        .map(Json)
}

async fn list_sites(State(service): State<SharedService>) -> ViewerResult<Json<Vec<Site>>> {
    blocking(service, |s| s.list_sites()).await
}

async fn site_detail(
    State(service): State<SharedService>,
    Path(site_id): Path<String>,
) -> ViewerResult<Json<SiteDetail>> {
    blocking(service, move |s| s.site_detail(&site_id)).await
}

async fn transitions(
    State(service): State<SharedService>,
    Path(site_id): Path<String>,
    Query(query): Query<ViewportQuery>,
) -> ViewerResult<Json<TransitionGraph>> {
    blocking(service, move |s| {
        s.transitions(&site_id, query.viewport.as_deref())
    })
    .await
}

async fn screen_detail(
    State(service): State<SharedService>,
    Path((site_id, screen_id)): Path<(String, String)>,
) -> ViewerResult<Json<ScreenDetail>> {
    blocking(service, move |s| s.screen_detail(&site_id, &screen_id)).await
}

async fn screen_layout(
    State(service): State<SharedService>,
    Path((site_id, screen_id)): Path<(String, String)>,
    Query(query): Query<ViewportQuery>,
) -> ViewerResult<Json<SceneGraph>> {
    blocking(service, move |s| {
        s.screen_layout(&site_id, &screen_id, query.viewport.as_deref())
    })
    .await
}
