//! The public contact form: CAPTCHA check, relay to the team inbox, and an
//! acknowledgement back to the sender when they left an address.

use actix_web::{web, HttpResponse};
use cp_core::error::AppError;
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct ContactBody {
    pub message: String,
    /// "collab" or a plain message.
    #[serde(rename = "type")]
    pub kind: String,
    pub email: Option<String>,
    pub token: Option<String>,
}

/// POST /contact
pub async fn handle_contact(
    state: web::Data<AppState>,
    body: web::Json<ContactBody>,
) -> ApiResult<HttpResponse> {
    if body.message.trim().is_empty() || body.kind.trim().is_empty() {
        return Err(AppError::Validation("message and type are required".into()).into());
    }

    let token = body.token.as_deref().unwrap_or("");
    if !state.captcha.verify(token).await? {
        return Err(AppError::Validation("captcha verification failed".into()).into());
    }

    let is_collab = body.kind == "collab";
    let reply_to = body
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());

    let subject = if is_collab {
        "New collaboration request"
    } else {
        "New reader message"
    };
    let relayed = format!(
        "{} received through the contact form:\n\n{}\n\n---\nEmail: {}",
        subject,
        body.message.trim(),
        reply_to.unwrap_or("not provided"),
    );
    state
        .mailer
        .send(&state.contact_recipients, subject, &relayed)
        .await?;

    if let Some(email) = reply_to {
        let (subject, text) = if is_collab {
            (
                "Thanks for reaching out to collaborate",
                "Thanks for reaching out to collaborate! We'll read your message and get back to you soon.",
            )
        } else {
            (
                "Thanks for your message",
                "Hey! We got your message. If needed, we'll get back to you soon.",
            )
        };
        state.mailer.send(&[email.to_string()], subject, text).await?;
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
