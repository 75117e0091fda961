//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.
//! Repo methods that touch more than one row are transactional units: the
//! implementation must commit the whole change or none of it.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Category, NewStory, Story, StoryFilter, StoryPatch, StoryRecord, SubscribeOutcome, User,
};

/// Persistence contract for stories, their category associations, and saves.
#[async_trait]
pub trait StoryRepo: Send + Sync {
    async fn create_story(&self, story: &NewStory) -> Result<Story>;
    async fn get_story(&self, id: Uuid, viewer: Option<&str>) -> Result<Option<StoryRecord>>;

    /// Published stories only, newest first.
    async fn list_stories(&self, filter: &StoryFilter) -> Result<Vec<StoryRecord>>;
    /// Unpublished stories, for the authenticated editorial view.
    async fn list_hidden(&self) -> Result<Vec<StoryRecord>>;
    async fn list_recommended(&self, limit: i64) -> Result<Vec<StoryRecord>>;
    async fn list_saved(&self, user_id: &str) -> Result<Vec<StoryRecord>>;

    async fn update_story(&self, id: Uuid, patch: &StoryPatch) -> Result<()>;

    async fn unpublish(&self, id: Uuid) -> Result<()>;
    async fn republish(&self, id: Uuid) -> Result<()>;

    /// Clears the radar flag everywhere and sets it on `id`, in one
    /// transaction. The target must be published.
    async fn promote_radar(&self, id: Uuid) -> Result<()>;

    /// Returns the radar story; when the slot is empty, selects a fallback
    /// (published+recommended first, then any published), promotes it inside
    /// the same transaction, and returns it. `None` when nothing is
    /// published at all.
    async fn ensure_radar(&self) -> Result<Option<StoryRecord>>;

    async fn set_recommended(&self, id: Uuid, recommended: bool) -> Result<()>;

    /// Guarded hard delete: fails with `DeleteGuardViolation` unless the
    /// story is a non-recommended draft. Association and save rows go first,
    /// then the story row, one transaction.
    async fn delete_story(&self, id: Uuid) -> Result<()>;

    /// Full-replace of the story's category set. Duplicates collapse
    /// silently; an unknown category id rolls the whole replace back.
    async fn replace_categories(&self, story_id: Uuid, category_ids: &[Uuid]) -> Result<()>;

    async fn save_story(&self, story_id: Uuid, user_id: &str) -> Result<()>;
    async fn unsave_story(&self, story_id: Uuid, user_id: &str) -> Result<()>;
}

/// Persistence contract for categories.
#[async_trait]
pub trait CategoryRepo: Send + Sync {
    /// All categories, name ascending.
    async fn list_categories(&self) -> Result<Vec<Category>>;
    /// Categories with at least one story attached, name ascending.
    async fn list_active_categories(&self) -> Result<Vec<Category>>;
    async fn create_category(&self, name: &str, description: &str) -> Result<Category>;
    async fn update_category(&self, id: Uuid, name: &str, description: &str) -> Result<()>;
    async fn delete_category(&self, id: Uuid) -> Result<()>;
}

/// Persistence contract for users and newsletter subscribers.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create_user(&self, id: &str, email: &str) -> Result<()>;
    async fn get_user(&self, id: &str) -> Result<Option<User>>;
    async fn update_user(&self, id: &str, first_name: &str, last_name: &str) -> Result<()>;
    async fn create_subscriber(&self, email: &str, phone: Option<&str>)
        -> Result<SubscribeOutcome>;
}

/// A normalized, re-encoded image ready for upload.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub extension: &'static str,
}

/// Pure image transformation: decode, orient, bound dimensions, re-encode.
#[async_trait]
pub trait ImageNormalizer: Send + Sync {
    async fn normalize(&self, raw: &[u8]) -> Result<EncodedImage>;
}

/// Durable object storage. `put` persists the object under `key` and returns
/// its publicly resolvable URL; overwriting an existing key is safe.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;
}

/// Request authentication. The shipped plugin compares a static API key; an
/// OIDC verifier would implement the same contract.
pub trait AuthProvider: Send + Sync {
    fn verify_api_key(&self, presented: &str) -> bool;
}

/// CAPTCHA token verification for the public contact form.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<bool>;
}

/// Outbound email for the contact relay.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &[String], subject: &str, body: &str) -> Result<()>;
}
