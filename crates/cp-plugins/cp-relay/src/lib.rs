//! # cp-relay
//!
//! External collaborators for the public contact form: a transactional-email
//! HTTP API (`Mailer`) and reCAPTCHA token verification (`CaptchaVerifier`).
//! Both are thin typed wrappers over their HTTP contracts; retry and rate
//! limiting stay with the providers.

use async_trait::async_trait;
use cp_core::error::{AppError, Result};
use cp_core::traits::{CaptchaVerifier, Mailer};
use serde::{Deserialize, Serialize};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
const RECAPTCHA_ENDPOINT: &str = "https://www.google.com/recaptcha/api/siteverify";

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    text: &'a str,
}

pub struct ResendMailer {
    http: reqwest::Client,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, to: &[String], subject: &str, body: &str) -> Result<()> {
        let response = self
            .http
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&SendRequest {
                from: &self.from,
                to,
                subject,
                text: body,
            })
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("mail relay unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            log::error!("mail relay rejected message: {status}");
            return Err(AppError::Internal(format!("mail relay returned {status}")));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default)]
    score: f64,
}

pub struct RecaptchaVerifier {
    http: reqwest::Client,
    secret: String,
    min_score: f64,
}

impl RecaptchaVerifier {
    pub fn new(secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret,
            min_score: 0.5,
        }
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    /// A token passes when the provider accepts it and scores it at or above
    /// the threshold. Provider outages are internal errors, not rejections.
    async fn verify(&self, token: &str) -> Result<bool> {
        let response = self
            .http
            .post(RECAPTCHA_ENDPOINT)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("captcha verify unreachable: {e}")))?;

        let verdict: VerifyResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("captcha verify malformed: {e}")))?;

        Ok(verdict.success && verdict.score >= self.min_score)
    }
}
