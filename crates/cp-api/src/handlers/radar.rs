//! The rotating radar feature slot.

use actix_web::{web, HttpRequest, HttpResponse};
use cp_core::projection::project_detail;
use serde_json::json;
use uuid::Uuid;

use super::{require_api_key, AppState};
use crate::error::ApiResult;

/// GET /stories/radar — the featured story. When the slot is empty this read
/// promotes a fallback (recommended first) before answering.
pub async fn get_radar_story(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    match state.service.radar_story().await? {
        Some(record) => Ok(HttpResponse::Ok().json(project_detail(record, false))),
        None => Ok(HttpResponse::NotFound().json(json!({
            "error": "no story available for radar",
            "code": "NOT_FOUND",
        }))),
    }
}

/// PATCH /stories/radar/{id} — hand the slot to a published story.
pub async fn set_radar_story(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    require_api_key(&req, &state)?;
    state.stories.promote_radar(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
