//! # Domain Models
//!
//! These structs represent the core entities of Citypress.
//! Stories and categories use UUID v4; user ids come from the external
//! identity provider and stay opaque strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lifecycle::PublishState;

/// An illustrated editorial story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub id: Uuid,
    pub title: String,
    /// Rich-text content with embedded image URLs.
    pub content: String,
    pub summary: String,
    /// Enum-like label, kept as a free string (the set of boroughs is data,
    /// not schema).
    pub borough: String,
    /// Public URL of the cover image.
    pub thumbnail: String,
    pub state: PublishState,
    pub is_recommended: bool,
    /// Internal soft-delete marker, never projected.
    pub is_trashed: bool,
    pub author_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Story {
    pub fn can_delete(&self) -> bool {
        crate::lifecycle::can_hard_delete(self.state, self.is_recommended)
    }
}

/// An editorial category (e.g., "Street Life").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

/// An editor/author account, identity-provider backed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// A newsletter subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: Uuid,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Author fields exposed on public projections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRef {
    pub first_name: String,
    pub last_name: String,
}

/// Fields required to insert a new story row. Stories are published
/// immediately on creation.
#[derive(Debug, Clone)]
pub struct NewStory {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub borough: String,
    pub thumbnail: String,
    pub author_id: String,
}

/// An edit to an existing story. `thumbnail: None` keeps the stored one.
#[derive(Debug, Clone)]
pub struct StoryPatch {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub borough: String,
    pub thumbnail: Option<String>,
}

/// Filters for the public story listing. All filters are conjunctive.
#[derive(Debug, Clone, Default)]
pub struct StoryFilter {
    /// Case-insensitive title substring.
    pub search: Option<String>,
    pub boroughs: Vec<String>,
    pub categories: Vec<Uuid>,
}

/// A stored story joined with everything the projection layer needs.
#[derive(Debug, Clone)]
pub struct StoryRecord {
    pub story: Story,
    /// Flattened association rows, ordered by category name.
    pub categories: Vec<Category>,
    pub author: Option<AuthorRef>,
    /// Whether the requesting viewer has bookmarked this story. Only
    /// meaningful when a viewer id was supplied to the query.
    pub saved_by_viewer: bool,
}

/// Outcome of a subscribe attempt; duplicates are reported, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Created,
    AlreadySubscribed,
}
