//! Category CRUD.

use actix_web::{web, HttpRequest, HttpResponse};
use cp_core::error::AppError;
use serde::Deserialize;
use uuid::Uuid;

use super::{require_api_key, AppState};
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct CategoryBody {
    pub name: String,
    pub description: String,
}

impl CategoryBody {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() || self.description.trim().is_empty() {
            return Err(AppError::Validation("name and description are required".into()));
        }
        Ok(())
    }
}

/// GET /categories
pub async fn get_categories(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.categories.list_categories().await?))
}

/// GET /categories/active — only categories with at least one story.
pub async fn get_active_categories(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.categories.list_active_categories().await?))
}

/// POST /categories
pub async fn create_category(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CategoryBody>,
) -> ApiResult<HttpResponse> {
    require_api_key(&req, &state)?;
    body.validate()?;
    let category = state
        .categories
        .create_category(body.name.trim(), body.description.trim())
        .await?;
    Ok(HttpResponse::Created().json(category))
}

/// PATCH /categories/{id}
pub async fn edit_category(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<CategoryBody>,
) -> ApiResult<HttpResponse> {
    require_api_key(&req, &state)?;
    body.validate()?;
    state
        .categories
        .update_category(path.into_inner(), body.name.trim(), body.description.trim())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /categories/{id}
pub async fn delete_category(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    require_api_key(&req, &state)?;
    state.categories.delete_category(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
