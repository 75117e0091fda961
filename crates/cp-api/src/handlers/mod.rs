//! # cp-api Handlers
//!
//! These modules coordinate the flow between HTTP requests and core traits,
//! one module per resource, mirroring the route layout.

pub mod category;
pub mod contact;
pub mod radar;
pub mod recommendation;
pub mod save;
pub mod story;
pub mod user;

use std::sync::Arc;

use actix_web::HttpRequest;
use cp_core::error::AppError;
use cp_core::service::StoryService;
use cp_core::traits::{AuthProvider, CaptchaVerifier, CategoryRepo, Mailer, StoryRepo, UserRepo};

use crate::error::ApiError;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub stories: Arc<dyn StoryRepo>,
    pub categories: Arc<dyn CategoryRepo>,
    pub users: Arc<dyn UserRepo>,
    pub service: StoryService,
    pub auth: Arc<dyn AuthProvider>,
    pub captcha: Arc<dyn CaptchaVerifier>,
    pub mailer: Arc<dyn Mailer>,
    /// Inbox list for relayed contact-form messages.
    pub contact_recipients: Vec<String>,
}

const API_KEY_HEADER: &str = "x-api-key";

/// Editorial endpoints check the key before touching the request body.
pub fn require_api_key(req: &HttpRequest, state: &AppState) -> Result<(), ApiError> {
    let presented = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    if state.auth.verify_api_key(presented) {
        Ok(())
    } else {
        Err(AppError::Unauthorized("missing or invalid api key".into()).into())
    }
}
