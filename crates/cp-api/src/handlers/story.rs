//! Story listing, detail, create/edit, publish transitions, and delete.

use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use cp_core::error::AppError;
use cp_core::models::StoryFilter;
use cp_core::projection::{project_detail, project_summary};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{require_api_key, AppState};
use crate::error::ApiResult;
use crate::extract::read_story_form;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    /// Comma-separated borough names.
    pub boroughs: Option<String>,
    /// Comma-separated category ids.
    pub categories: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// GET /stories — published stories, filterable, newest first.
pub async fn get_stories(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> ApiResult<HttpResponse> {
    let filter = StoryFilter {
        search: query.search.clone().filter(|s| !s.is_empty()),
        boroughs: split_csv(query.boroughs.as_deref()),
        categories: parse_ids(query.categories.as_deref())?,
    };
    let records = state.stories.list_stories(&filter).await?;
    Ok(HttpResponse::Ok().json(records.iter().map(project_summary).collect::<Vec<_>>()))
}

/// GET /stories/hidden — unpublished stories for the editorial view.
pub async fn get_hidden_stories(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    require_api_key(&req, &state)?;
    let records = state.stories.list_hidden().await?;
    Ok(HttpResponse::Ok().json(records.iter().map(project_summary).collect::<Vec<_>>()))
}

/// GET /stories/s/{id} — published detail, optionally save-annotated.
pub async fn get_story(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<DetailQuery>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let viewer = query.user_id.as_deref().filter(|v| !v.is_empty());

    let record = state
        .stories
        .get_story(id, viewer)
        .await?
        .filter(|record| record.story.state.is_published())
        .ok_or_else(|| AppError::NotFound("story".into(), id.to_string()))?;

    Ok(HttpResponse::Ok().json(project_detail(record, viewer.is_some())))
}

/// POST /stories — multipart create; thumbnail required.
pub async fn create_story(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    require_api_key(&req, &state)?;
    let form = read_story_form(payload).await?;
    let record = state.service.create(form).await?;
    Ok(HttpResponse::Created().json(project_detail(record, false)))
}

/// PATCH /stories/{id} — multipart edit; absent thumbnail keeps the stored one.
pub async fn edit_story(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    require_api_key(&req, &state)?;
    let form = read_story_form(payload).await?;
    state.service.edit(path.into_inner(), form).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// PATCH /stories/unpublish/{id}
pub async fn unpublish_story(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    require_api_key(&req, &state)?;
    state.stories.unpublish(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PATCH /stories/republish/{id}
pub async fn republish_story(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    require_api_key(&req, &state)?;
    state.stories.republish(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /stories/{id} — guarded hard delete.
pub async fn delete_story(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    require_api_key(&req, &state)?;
    state.stories.delete_story(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "story deleted" })))
}

fn split_csv(raw: Option<&str>) -> Vec<String> {
    raw.filter(|s| !s.is_empty())
        .map(|s| s.split(',').map(str::to_string).collect())
        .unwrap_or_default()
}

fn parse_ids(raw: Option<&str>) -> Result<Vec<Uuid>, AppError> {
    split_csv(raw)
        .iter()
        .map(|s| {
            Uuid::parse_str(s.trim())
                .map_err(|_| AppError::Validation("malformed category id".into()))
        })
        .collect()
}
