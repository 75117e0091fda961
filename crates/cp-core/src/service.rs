//! # StoryService
//!
//! Orchestrates the create/edit flows (asset pipeline -> story row ->
//! category replace) and the radar read-with-side-effect. All dependencies
//! arrive through constructor injection so tests can substitute fakes.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{NewStory, StoryPatch, StoryRecord};
use crate::pipeline::AssetPipeline;
use crate::traits::StoryRepo;

/// The radar auto-selection read races against concurrent promotions; the
/// transaction is retried this many times before the conflict surfaces.
const RADAR_RETRY_ATTEMPTS: u32 = 3;

/// A decoded multipart story submission, shared by create and edit.
#[derive(Debug, Default)]
pub struct StorySubmission {
    pub title: String,
    pub content: String,
    pub borough: String,
    pub summary: String,
    pub author_id: Option<String>,
    /// `None` leaves associations untouched; `Some(vec![])` clears them.
    pub category_ids: Option<Vec<Uuid>>,
    pub thumbnail: Option<Vec<u8>>,
    pub editor_images: Vec<Vec<u8>>,
}

impl StorySubmission {
    /// Field presence is checked before any I/O happens.
    fn validate(&self) -> Result<()> {
        for (value, name) in [
            (&self.title, "title"),
            (&self.content, "content"),
            (&self.borough, "borough"),
            (&self.summary, "summary"),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{name} is required")));
            }
        }
        Ok(())
    }
}

pub struct StoryService {
    repo: Arc<dyn StoryRepo>,
    pipeline: AssetPipeline,
}

impl StoryService {
    pub fn new(repo: Arc<dyn StoryRepo>, pipeline: AssetPipeline) -> Self {
        Self { repo, pipeline }
    }

    /// Creates a story in the published state. The thumbnail is mandatory and
    /// is rejected before any upload starts, so a bad submission leaves no
    /// orphaned objects behind.
    pub async fn create(&self, submission: StorySubmission) -> Result<StoryRecord> {
        submission.validate()?;
        let author_id = submission
            .author_id
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| AppError::Validation("authorId is required".into()))?
            .to_string();
        match submission.thumbnail.as_deref() {
            Some(bytes) if !bytes.is_empty() => {}
            _ => return Err(AppError::Validation("thumbnail is required".into())),
        }

        let assets = self
            .pipeline
            .ingest(
                &submission.title,
                &submission.content,
                submission.thumbnail.as_deref(),
                &submission.editor_images,
            )
            .await?;
        let thumbnail = assets
            .thumbnail_url
            .ok_or_else(|| AppError::Validation("thumbnail is required".into()))?;

        let story = self
            .repo
            .create_story(&NewStory {
                title: submission.title,
                content: assets.content,
                summary: submission.summary,
                borough: submission.borough,
                thumbnail,
                author_id,
            })
            .await?;

        if let Some(ids) = &submission.category_ids {
            if !ids.is_empty() {
                self.repo.replace_categories(story.id, ids).await?;
            }
        }

        self.repo
            .get_story(story.id, None)
            .await?
            .ok_or_else(|| AppError::Internal("created story not readable".into()))
    }

    /// Edits a story. An absent thumbnail keeps the stored one; supplying
    /// category ids replaces the whole association set.
    pub async fn edit(&self, id: Uuid, submission: StorySubmission) -> Result<()> {
        submission.validate()?;

        let assets = self
            .pipeline
            .ingest(
                &submission.title,
                &submission.content,
                submission.thumbnail.as_deref(),
                &submission.editor_images,
            )
            .await?;

        self.repo
            .update_story(
                id,
                &StoryPatch {
                    title: submission.title,
                    content: assets.content,
                    summary: submission.summary,
                    borough: submission.borough,
                    thumbnail: assets.thumbnail_url,
                },
            )
            .await?;

        if let Some(ids) = &submission.category_ids {
            self.repo.replace_categories(id, ids).await?;
        }
        Ok(())
    }

    /// The radar story, auto-selecting one when the slot is empty. Conflicting
    /// concurrent selections retry a bounded number of times; each attempt
    /// re-reads the singleton, so the losing caller returns the winner's pick.
    pub async fn radar_story(&self) -> Result<Option<StoryRecord>> {
        let mut attempt = 0;
        loop {
            match self.repo.ensure_radar().await {
                Err(AppError::StoreTransaction(reason)) if attempt + 1 < RADAR_RETRY_ATTEMPTS => {
                    attempt += 1;
                    log::warn!(
                        "radar selection conflicted (attempt {attempt}): {reason}; retrying"
                    );
                }
                other => return other,
            }
        }
    }
}
