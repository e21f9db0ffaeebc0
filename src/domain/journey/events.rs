//! Domain events recorded by the Journey aggregate.

use crate::domain::foundation::{JourneyId, Timestamp, UserId};
use crate::domain::journey::JourneyStage;
use crate::domain::safety::RejectionCategory;

/// Events the aggregate buffers while mutating; handlers drain them with
/// `Journey::take_events` and decide what to publish.
#[derive(Debug, Clone, PartialEq)]
pub enum JourneyEvent {
    /// A diary entry opened a new journey at the Moment stage.
    Started {
        journey_id: JourneyId,
        user_id: UserId,
        at: Timestamp,
    },
    /// Prompt and image approved; the journey reached Reflection.
    ReflectionReached {
        journey_id: JourneyId,
        at: Timestamp,
    },
    /// The guestbook entry was accepted; the journey reached Defusion.
    GuestbookSigned {
        journey_id: JourneyId,
        at: Timestamp,
    },
    /// The curator message was delivered; the journey is sealed.
    Completed {
        journey_id: JourneyId,
        user_id: UserId,
        at: Timestamp,
    },
    /// Crisis content froze the journey pending human review.
    Escalated {
        journey_id: JourneyId,
        stage: JourneyStage,
        category: RejectionCategory,
        at: Timestamp,
    },
}
