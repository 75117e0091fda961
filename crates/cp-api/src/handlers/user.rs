//! User profiles and newsletter subscriptions.

use actix_web::{web, HttpRequest, HttpResponse};
use cp_core::error::AppError;
use cp_core::models::SubscribeOutcome;
use serde::Deserialize;
use serde_json::json;

use super::{require_api_key, AppState};
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
    pub id: String,
    pub email: String,
}

/// POST /user — registers an identity-provider account locally.
pub async fn create_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateUserBody>,
) -> ApiResult<HttpResponse> {
    require_api_key(&req, &state)?;
    if body.id.trim().is_empty() || body.email.trim().is_empty() {
        return Err(AppError::Validation("id and email are required".into()).into());
    }
    state.users.create_user(body.id.trim(), body.email.trim()).await?;
    Ok(HttpResponse::Created().finish())
}

/// GET /user/{id}
pub async fn get_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    require_api_key(&req, &state)?;
    let id = path.into_inner();
    let user = state
        .users
        .get_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".into(), id))?;
    Ok(HttpResponse::Ok().json(user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserBody {
    pub first_name: String,
    pub last_name: String,
}

/// PATCH /user/{id}
pub async fn update_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateUserBody>,
) -> ApiResult<HttpResponse> {
    require_api_key(&req, &state)?;
    if body.first_name.trim().is_empty() || body.last_name.trim().is_empty() {
        return Err(AppError::Validation("first and last name are required".into()).into());
    }
    state
        .users
        .update_user(&path.into_inner(), body.first_name.trim(), body.last_name.trim())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[derive(Debug, Deserialize)]
pub struct SubscribeBody {
    pub email: String,
    pub phone: Option<String>,
}

/// POST /user/subscribe — public; double subscribes are acknowledged, not
/// rejected.
pub async fn create_subscriber(
    state: web::Data<AppState>,
    body: web::Json<SubscribeBody>,
) -> ApiResult<HttpResponse> {
    if body.email.trim().is_empty() {
        return Err(AppError::Validation("email is required".into()).into());
    }
    let outcome = state
        .users
        .create_subscriber(body.email.trim(), body.phone.as_deref())
        .await?;
    match outcome {
        SubscribeOutcome::Created => {
            Ok(HttpResponse::Created().json(json!({ "message": "thanks for subscribing" })))
        }
        SubscribeOutcome::AlreadySubscribed => Ok(HttpResponse::Ok().json(json!({
            "message": "email already subscribed",
            "alreadySubscribed": true,
        }))),
    }
}
