//! # Public story projections
//!
//! Builds the externally visible story representations from stored rows:
//! association rows flatten into plain category lists, internal fields drop
//! out, and the detail view optionally carries the viewer's save bit.
//! Field names serialize camelCase for the site frontend.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{AuthorRef, Category, StoryRecord};

/// List-view shape: no content, no lifecycle flags.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySummary {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub borough: String,
    pub thumbnail: String,
    pub author: Option<AuthorRef>,
    pub categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
}

/// Detail-view shape: full content plus the publish flags the editorial
/// frontend needs. The trash marker never leaves the store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDetail {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub borough: String,
    pub thumbnail: String,
    pub is_published: bool,
    pub is_radar: bool,
    pub is_recommended: bool,
    pub author: Option<AuthorRef>,
    pub categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Present only when the request carried a viewer id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_saved: Option<bool>,
}

pub fn project_summary(record: &StoryRecord) -> StorySummary {
    StorySummary {
        id: record.story.id,
        title: record.story.title.clone(),
        summary: record.story.summary.clone(),
        borough: record.story.borough.clone(),
        thumbnail: record.story.thumbnail.clone(),
        author: record.author.clone(),
        categories: record.categories.clone(),
        created_at: record.story.created_at,
    }
}

/// `annotate_saved` controls whether the save bit appears at all; the raw
/// save rows themselves are never serialized.
pub fn project_detail(record: StoryRecord, annotate_saved: bool) -> StoryDetail {
    StoryDetail {
        id: record.story.id,
        title: record.story.title,
        content: record.story.content,
        summary: record.story.summary,
        borough: record.story.borough,
        thumbnail: record.story.thumbnail,
        is_published: record.story.state.is_published(),
        is_radar: record.story.state.is_radar(),
        is_recommended: record.story.is_recommended,
        author: record.author,
        categories: record.categories,
        created_at: record.story.created_at,
        updated_at: record.story.updated_at,
        is_saved: annotate_saved.then_some(record.saved_by_viewer),
    }
}
