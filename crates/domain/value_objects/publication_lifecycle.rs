//! Status transitions that depend on how many media a publication owns.
//!
//! Explicit admin status changes are free-form; these functions cover the transitions the
//! system performs on its own: reverting to DRAFT when media disappears and publishing on
//! upload. Scheduler promotion is a single guarded UPDATE in the scheduler repository.

use crate::domain::value_objects::enums::publication_statuses::PublicationStatus;

impl PublicationStatus {
    /// SCHEDULED and PUBLISHED publications cannot outlive their last media item.
    pub fn reverts_without_media(self) -> bool {
        matches!(
            self,
            PublicationStatus::Scheduled | PublicationStatus::Published
        )
    }

    pub fn after_media_removed(self, remaining_media: i64) -> Self {
        if remaining_media == 0 && self.reverts_without_media() {
            PublicationStatus::Draft
        } else {
            self
        }
    }

    /// `publish_now` on upload only promotes drafts; scheduled publications wait for the
    /// scheduler and published ones stay as they are.
    pub fn on_publish_now(self, media_count: i64) -> Option<Self> {
        match self {
            PublicationStatus::Draft if media_count > 0 => Some(PublicationStatus::Published),
            _ => None,
        }
    }
}

/// Status to write together with a content type change.
///
/// An explicitly requested status always wins. Otherwise, if the compatibility sweep removed
/// media and left none, the publication falls back the same way a manual detach would.
pub fn status_after_content_change(
    current: PublicationStatus,
    requested: Option<PublicationStatus>,
    swept_media: usize,
    remaining_media: i64,
) -> Option<PublicationStatus> {
    if requested.is_some() {
        return requested;
    }

    if swept_media == 0 {
        return None;
    }

    let next = current.after_media_removed(remaining_media);
    (next != current).then_some(next)
}
