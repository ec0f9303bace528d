//! Rating commit gate.
//!
//! The value-commit contract of the star-rating widget: hovering
//! previews a value without committing it, clicking commits. The gate
//! holds the staged value for the currently open detail view and locks
//! itself when the movie is already in the watched collection (the
//! stored rating is shown read-only; re-rating requires delete and
//! re-add).

use serde::Serialize;
use thiserror::Error;

/// Errors for rating operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RatingError {
    #[error("Rating {value} is outside 1..={max}")]
    OutOfRange { value: u32, max: u32 },

    #[error("This movie is already rated; delete it to re-rate")]
    Locked,
}

/// Staged rating state for one detail view.
///
/// Reset whenever the selection changes.
#[derive(Debug, Clone)]
pub struct RatingGate {
    max_rating: u32,
    committed: Option<u32>,
    preview: Option<u32>,
    locked: bool,
}

impl RatingGate {
    /// Fresh gate for a movie not yet in the collection.
    pub fn new(max_rating: u32) -> Self {
        Self {
            max_rating,
            committed: None,
            preview: None,
            locked: false,
        }
    }

    /// Read-only gate exposing the rating stored in the collection.
    pub fn locked_with(stored_rating: u32, max_rating: u32) -> Self {
        Self {
            max_rating,
            committed: Some(stored_rating),
            preview: None,
            locked: true,
        }
    }

    /// Preview a value on hover. Never commits; out-of-range and locked
    /// hovers are ignored.
    pub fn hover(&mut self, value: u32) {
        if !self.locked && (1..=self.max_rating).contains(&value) {
            self.preview = Some(value);
        }
    }

    /// Clear the hover preview, falling back to the committed value.
    pub fn clear_hover(&mut self) {
        self.preview = None;
    }

    /// Commit a clicked value.
    pub fn set(&mut self, value: u32) -> Result<(), RatingError> {
        if self.locked {
            return Err(RatingError::Locked);
        }
        if !(1..=self.max_rating).contains(&value) {
            return Err(RatingError::OutOfRange {
                value,
                max: self.max_rating,
            });
        }

        self.committed = Some(value);
        self.preview = None;
        Ok(())
    }

    /// The committed value, if any. This is what a commit operation
    /// consumes; the preview never leaks into it.
    pub fn committed(&self) -> Option<u32> {
        self.committed
    }

    /// What the widget should display: the hover preview when present,
    /// otherwise the committed value.
    pub fn display_value(&self) -> Option<u32> {
        self.preview.or(self.committed)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn max_rating(&self) -> u32 {
        self.max_rating
    }

    /// Serializable snapshot for the API surface.
    pub fn view(&self) -> RatingView {
        RatingView {
            max_rating: self.max_rating,
            committed: self.committed,
            display: self.display_value(),
            locked: self.locked,
        }
    }
}

/// Read-only view of the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingView {
    pub max_rating: u32,
    pub committed: Option<u32>,
    pub display: Option<u32>,
    pub locked: bool,
}
