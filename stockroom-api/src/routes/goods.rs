//! Goods REST API Routes
//!
//! Axum route handlers for goods operations. Handlers validate input, call
//! the interactor, and log the soft publish-failure flag on mutations; they
//! never translate it into a wire error since the write already committed.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use stockroom_core::{Good, GoodId, ProjectId};

use crate::error::{ApiError, ApiResult};
use crate::interactor::MutationOutcome;
use crate::state::AppState;

// ============================================================================
// REQUEST / RESPONSE TYPES
// ============================================================================

/// Body for create and update requests.
#[derive(Debug, Deserialize)]
pub struct GoodBody {
    #[serde(default)]
    pub name: String,
    /// Empty or absent means "leave the stored description unchanged".
    #[serde(default)]
    pub description: String,
}

/// Query parameters for the list endpoint. Both default to 0; a limit of 0
/// is served as the store's default page size.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// Reduced wire shape returned by the remove endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedGood {
    pub id: GoodId,
    pub project_id: ProjectId,
    pub removed: bool,
}

impl From<&Good> for RemovedGood {
    fn from(good: &Good) -> Self {
        Self {
            id: good.id,
            project_id: good.project_id,
            removed: good.removed,
        }
    }
}

fn log_soft_failure(outcome: &MutationOutcome) {
    if let Some(reason) = &outcome.publish_failed {
        tracing::warn!(good_id = outcome.good.id, %reason, "mutation committed, notification lost");
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/good/create/:project_id - Create a new good
pub async fn create_good(
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
    Json(body): Json<GoodBody>,
) -> ApiResult<impl IntoResponse> {
    if body.name.trim().is_empty() {
        return Err(ApiError::missing_field("name"));
    }

    let outcome = state.interactor.create_good(project_id, &body.name).await?;
    log_soft_failure(&outcome);

    Ok((StatusCode::CREATED, Json(outcome.good)))
}

/// PATCH /api/v1/good/update/:id/:project_id - Update name/description
pub async fn update_good(
    State(state): State<AppState>,
    Path((id, project_id)): Path<(GoodId, ProjectId)>,
    Json(body): Json<GoodBody>,
) -> ApiResult<impl IntoResponse> {
    if body.name.trim().is_empty() {
        return Err(ApiError::missing_field("name"));
    }

    let outcome = state
        .interactor
        .update_good(id, project_id, &body.name, &body.description)
        .await?;
    log_soft_failure(&outcome);

    Ok((StatusCode::OK, Json(outcome.good)))
}

/// DELETE /api/v1/good/remove/:id/:project_id - Soft-delete a good
pub async fn remove_good(
    State(state): State<AppState>,
    Path((id, project_id)): Path<(GoodId, ProjectId)>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.interactor.remove_good(id, project_id).await?;
    log_soft_failure(&outcome);

    Ok((StatusCode::OK, Json(RemovedGood::from(&outcome.good))))
}

/// GET /api/v1/goods/list?limit=&offset= - Read one page
pub async fn list_goods(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<impl IntoResponse> {
    if params.limit < 0 || params.offset < 0 {
        return Err(ApiError::invalid_input("limit and offset must be non-negative"));
    }

    let page = state.interactor.get_list(params.limit, params.offset).await?;
    Ok((StatusCode::OK, Json(page)))
}
