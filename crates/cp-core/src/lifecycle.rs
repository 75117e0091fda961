//! # Story lifecycle
//!
//! A story's publish/radar flags collapse into one tagged state, validated by
//! a single transition function instead of per-field checks in handlers.
//! Invariant: the radar slot exists only inside the published state, so a
//! draft radar story is unrepresentable.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// The publish dimension of a story. The `recommended` bit is orthogonal and
/// lives on the story itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublishState {
    Draft,
    Published,
    PublishedRadar,
}

/// Requested lifecycle changes, applied through [`PublishState::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unpublish,
    Republish,
    PromoteRadar,
}

impl PublishState {
    /// Reconstructs the state from the two stored flags.
    /// A radar flag on an unpublished row violates the invariant and is
    /// treated as plain draft.
    pub fn from_flags(is_published: bool, is_radar: bool) -> Self {
        match (is_published, is_radar) {
            (true, true) => PublishState::PublishedRadar,
            (true, false) => PublishState::Published,
            (false, _) => PublishState::Draft,
        }
    }

    pub fn is_published(self) -> bool {
        !matches!(self, PublishState::Draft)
    }

    pub fn is_radar(self) -> bool {
        matches!(self, PublishState::PublishedRadar)
    }

    /// Validates and applies a transition, returning the next state.
    ///
    /// Guard failures surface as domain errors so callers can map them to
    /// 4xx responses rather than transport failures.
    pub fn apply(self, transition: Transition) -> Result<Self> {
        match (self, transition) {
            // The radar story must be demoted before it can leave publication.
            (PublishState::PublishedRadar, Transition::Unpublish) => {
                Err(AppError::RadarUnpublishConflict)
            }
            (_, Transition::Unpublish) => Ok(PublishState::Draft),

            // Republishing the radar story keeps its radar slot.
            (PublishState::PublishedRadar, Transition::Republish) => {
                Ok(PublishState::PublishedRadar)
            }
            (_, Transition::Republish) => Ok(PublishState::Published),

            (PublishState::Draft, Transition::PromoteRadar) => {
                Err(AppError::RadarRequiresPublished)
            }
            (_, Transition::PromoteRadar) => Ok(PublishState::PublishedRadar),
        }
    }
}

/// The hard-delete guard: only unpublished, non-radar, non-recommended
/// stories may be removed.
pub fn can_hard_delete(state: PublishState, recommended: bool) -> bool {
    state == PublishState::Draft && !recommended
}
