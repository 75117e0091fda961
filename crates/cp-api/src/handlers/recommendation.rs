//! The small curated "recommended" set.

use actix_web::{web, HttpRequest, HttpResponse};
use cp_core::projection::project_summary;
use uuid::Uuid;

use super::{require_api_key, AppState};
use crate::error::ApiResult;

/// The site surfaces at most this many recommendations.
const RECOMMENDED_LIMIT: i64 = 4;

/// GET /stories/recommended
pub async fn get_recommendations(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let records = state.stories.list_recommended(RECOMMENDED_LIMIT).await?;
    Ok(HttpResponse::Ok().json(records.iter().map(project_summary).collect::<Vec<_>>()))
}

/// PATCH /stories/{id}/recommend
pub async fn add_recommendation(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    require_api_key(&req, &state)?;
    state.stories.set_recommended(path.into_inner(), true).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /stories/{id}/recommend
pub async fn remove_recommendation(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    require_api_key(&req, &state)?;
    state.stories.set_recommended(path.into_inner(), false).await?;
    Ok(HttpResponse::NoContent().finish())
}
