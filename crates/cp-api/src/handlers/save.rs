//! Reader bookmarks ("saves").

use actix_web::{web, HttpResponse};
use cp_core::error::AppError;
use cp_core::projection::project_summary;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::AppState;
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveBody {
    pub story_id: Uuid,
    pub user_id: String,
}

/// POST /stories/save
pub async fn create_save(
    state: web::Data<AppState>,
    body: web::Json<SaveBody>,
) -> ApiResult<HttpResponse> {
    if body.user_id.trim().is_empty() {
        return Err(AppError::Validation("storyId and userId are required".into()).into());
    }
    state.stories.save_story(body.story_id, &body.user_id).await?;
    Ok(HttpResponse::Created().finish())
}

/// DELETE /stories/save — removing an absent save succeeds quietly.
pub async fn delete_save(
    state: web::Data<AppState>,
    body: web::Json<SaveBody>,
) -> ApiResult<HttpResponse> {
    if body.user_id.trim().is_empty() {
        return Err(AppError::Validation("storyId and userId are required".into()).into());
    }
    state.stories.unsave_story(body.story_id, &body.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// GET /stories/saved/{user_id}
pub async fn get_saved_stories(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = path.into_inner();
    if user_id.trim().is_empty() {
        return Err(AppError::Validation("userId is required".into()).into());
    }
    let records = state.stories.list_saved(&user_id).await?;
    Ok(HttpResponse::Ok().json(records.iter().map(project_summary).collect::<Vec<_>>()))
}
