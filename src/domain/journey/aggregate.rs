//! Journey aggregate - the root entity for one diary entry's lifecycle.
//!
//! A Journey owns the per-stage payloads (diary, generated reflection,
//! guestbook, curator message) and enforces the stage machine: strictly
//! forward through Moment → Reflection → Defusion → Closure, artifacts
//! attached only once approved, immutable once sealed at Closure.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CopingStyle, DomainError, ErrorCode, JourneyId, StateMachine, Timestamp, UserId, VadScore,
    ValidationError,
};
use crate::domain::safety::RejectionCategory;

use super::{JourneyEvent, JourneyStage, SafetyStatus};

/// Opaque reference to an externally stored generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Creates an ImageRef, returning error if empty.
    pub fn new(reference: impl Into<String>) -> Result<Self, ValidationError> {
        let reference = reference.into();
        if reference.is_empty() {
            return Err(ValidationError::empty_field("image_ref"));
        }
        Ok(Self(reference))
    }

    /// Returns the inner reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The approved reflection artifacts (generated prompt + image).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    pub prompt: String,
    pub image_ref: ImageRef,
    pub safety: SafetyStatus,
}

/// The user-authored guestbook entry captured at Defusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestbookEntry {
    pub title: String,
    pub tags: Vec<String>,
    pub text: String,
    /// Optional prompt shown to the user while titling the artwork.
    pub guided_question: Option<String>,
    pub safety: SafetyStatus,
}

impl GuestbookEntry {
    const MAX_TAGS: usize = 10;

    /// Creates a validated, not-yet-gated guestbook entry.
    pub fn new(
        title: impl Into<String>,
        tags: Vec<String>,
        text: impl Into<String>,
        guided_question: Option<String>,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        let text = text.into();
        if title.trim().is_empty() {
            return Err(ValidationError::empty_field("guestbook_title"));
        }
        if text.trim().is_empty() {
            return Err(ValidationError::empty_field("guestbook_text"));
        }
        if tags.len() > Self::MAX_TAGS {
            return Err(ValidationError::invalid_format(
                "guestbook_tags",
                format!("at most {} tags allowed", Self::MAX_TAGS),
            ));
        }
        if tags.iter().any(|t| t.trim().is_empty()) {
            return Err(ValidationError::empty_field("guestbook_tags"));
        }
        Ok(Self {
            title,
            tags,
            text,
            guided_question,
            safety: SafetyStatus::Pending,
        })
    }

    /// Combined text the safety gate inspects.
    pub fn combined_text(&self) -> String {
        let mut combined = format!("{}\n{}", self.title, self.text);
        if !self.tags.is_empty() {
            combined.push('\n');
            combined.push_str(&self.tags.join(" "));
        }
        combined
    }
}

/// The approved curator message delivered at Closure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratorMessage {
    pub text: String,
    pub safety: SafetyStatus,
}

/// Record of a crisis escalation that froze the journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationNote {
    /// The stage the rejected artifact was destined for.
    pub destined_stage: JourneyStage,
    pub category: RejectionCategory,
    pub at: Timestamp,
}

/// What the caller should do next with this journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    Reflection,
    Guestbook,
    CuratorMessage,
    Completed,
    AwaitingReview,
}

/// The Journey aggregate root.
#[derive(Debug, Clone)]
pub struct Journey {
    id: JourneyId,
    user_id: UserId,
    stage: JourneyStage,
    diary_text: String,
    emotion_keywords: Vec<String>,
    vad: VadScore,
    coping_style: Option<CopingStyle>,
    reflection: Option<Reflection>,
    guestbook: Option<GuestbookEntry>,
    curator_message: Option<CuratorMessage>,
    escalation: Option<EscalationNote>,
    regeneration_attempts: u32,
    stage_entered: HashMap<JourneyStage, Timestamp>,
    created_at: Timestamp,
    updated_at: Timestamp,
    domain_events: Vec<JourneyEvent>,
}

impl Journey {
    /// Opens a new journey at the Moment stage.
    ///
    /// The diary text must be non-empty; the VAD score is already validated
    /// by construction of `VadScore`.
    pub fn new(
        user_id: UserId,
        diary_text: impl Into<String>,
        emotion_keywords: Vec<String>,
        vad: VadScore,
    ) -> Result<Self, DomainError> {
        let diary_text = diary_text.into();
        if diary_text.trim().is_empty() {
            return Err(ValidationError::empty_field("diary_text").into());
        }

        let id = JourneyId::new();
        let now = Timestamp::now();
        let mut stage_entered = HashMap::new();
        stage_entered.insert(JourneyStage::Moment, now);

        let mut journey = Self {
            id,
            user_id: user_id.clone(),
            stage: JourneyStage::Moment,
            diary_text,
            emotion_keywords,
            vad,
            coping_style: None,
            reflection: None,
            guestbook: None,
            curator_message: None,
            escalation: None,
            regeneration_attempts: 0,
            stage_entered,
            created_at: now,
            updated_at: now,
            domain_events: Vec::new(),
        };

        journey.record_event(JourneyEvent::Started {
            journey_id: id,
            user_id,
            at: now,
        });

        Ok(journey)
    }

    /// Reconstitutes a journey from persisted data.
    ///
    /// Used by repository implementations; bypasses domain event recording.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: JourneyId,
        user_id: UserId,
        stage: JourneyStage,
        diary_text: String,
        emotion_keywords: Vec<String>,
        vad: VadScore,
        coping_style: Option<CopingStyle>,
        reflection: Option<Reflection>,
        guestbook: Option<GuestbookEntry>,
        curator_message: Option<CuratorMessage>,
        escalation: Option<EscalationNote>,
        regeneration_attempts: u32,
        stage_entered: HashMap<JourneyStage, Timestamp>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            stage,
            diary_text,
            emotion_keywords,
            vad,
            coping_style,
            reflection,
            guestbook,
            curator_message,
            escalation,
            regeneration_attempts,
            stage_entered,
            created_at,
            updated_at,
            domain_events: Vec::new(),
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> JourneyId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn stage(&self) -> JourneyStage {
        self.stage
    }

    pub fn diary_text(&self) -> &str {
        &self.diary_text
    }

    pub fn emotion_keywords(&self) -> &[String] {
        &self.emotion_keywords
    }

    pub fn vad(&self) -> VadScore {
        self.vad
    }

    pub fn coping_style(&self) -> Option<CopingStyle> {
        self.coping_style
    }

    pub fn reflection(&self) -> Option<&Reflection> {
        self.reflection.as_ref()
    }

    pub fn guestbook(&self) -> Option<&GuestbookEntry> {
        self.guestbook.as_ref()
    }

    pub fn curator_message(&self) -> Option<&CuratorMessage> {
        self.curator_message.as_ref()
    }

    pub fn escalation(&self) -> Option<&EscalationNote> {
        self.escalation.as_ref()
    }

    pub fn regeneration_attempts(&self) -> u32 {
        self.regeneration_attempts
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// When the journey entered the given stage, if it has.
    pub fn stage_entered_at(&self, stage: JourneyStage) -> Option<Timestamp> {
        self.stage_entered.get(&stage).copied()
    }

    /// True once a crisis verdict froze the journey.
    pub fn is_escalated(&self) -> bool {
        self.escalation.is_some()
    }

    /// True once the journey reached Closure.
    pub fn is_sealed(&self) -> bool {
        self.stage == JourneyStage::Closure
    }

    /// What the caller should do next with this journey.
    pub fn next_step(&self) -> NextStep {
        if self.is_escalated() {
            return NextStep::AwaitingReview;
        }
        match self.stage {
            JourneyStage::Moment => NextStep::Reflection,
            JourneyStage::Reflection => NextStep::Guestbook,
            JourneyStage::Defusion => NextStep::CuratorMessage,
            JourneyStage::Closure => NextStep::Completed,
        }
    }

    /// Takes accumulated domain events, clearing the internal buffer.
    pub fn take_events(&mut self) -> Vec<JourneyEvent> {
        std::mem::take(&mut self.domain_events)
    }

    // ───────────────────────────────────────────────────────────────
    // Stage Transitions
    // ───────────────────────────────────────────────────────────────

    /// Fails unless the journey is still open for mutation.
    pub fn ensure_mutable(&self) -> Result<(), DomainError> {
        if self.is_sealed() {
            return Err(DomainError::new(
                ErrorCode::JourneyImmutable,
                "Journey is sealed at Closure and can no longer change",
            )
            .with_detail("journey_id", self.id.to_string()));
        }
        if let Some(note) = &self.escalation {
            return Err(DomainError::new(
                ErrorCode::JourneyEscalated,
                "Journey is frozen pending human review",
            )
            .with_detail("journey_id", self.id.to_string())
            .with_detail("category", note.category.to_string()));
        }
        Ok(())
    }

    fn expect_stage(&self, expected: JourneyStage) -> Result<(), DomainError> {
        if self.stage != expected {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Operation requires stage {:?}, journey is at {:?}",
                    expected, self.stage
                ),
            )
            .with_detail("journey_id", self.id.to_string()));
        }
        Ok(())
    }

    fn enter(&mut self, target: JourneyStage) -> Result<(), DomainError> {
        self.stage = self
            .stage
            .transition_to(target)
            .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))?;
        let now = Timestamp::now();
        self.stage_entered.insert(target, now);
        self.updated_at = now;
        Ok(())
    }

    /// Counts one automatic regeneration attempt against this journey.
    pub fn note_regeneration_attempt(&mut self) {
        self.regeneration_attempts += 1;
        self.updated_at = Timestamp::now();
    }

    /// Freezes the journey after a crisis verdict.
    ///
    /// The note is recorded before any response reaches the caller; once
    /// set, every mutation fails with `JourneyEscalated` until an
    /// administrative override (out of scope here) clears it.
    pub fn record_escalation(
        &mut self,
        destined_stage: JourneyStage,
        category: RejectionCategory,
    ) -> Result<(), DomainError> {
        self.ensure_mutable()?;
        let now = Timestamp::now();
        self.escalation = Some(EscalationNote {
            destined_stage,
            category,
            at: now,
        });
        self.updated_at = now;
        self.record_event(JourneyEvent::Escalated {
            journey_id: self.id,
            stage: destined_stage,
            category,
            at: now,
        });
        Ok(())
    }

    /// Attaches the approved prompt + image and advances to Reflection.
    pub fn attach_reflection(
        &mut self,
        coping_style: CopingStyle,
        prompt: impl Into<String>,
        image_ref: ImageRef,
    ) -> Result<(), DomainError> {
        self.ensure_mutable()?;
        self.expect_stage(JourneyStage::Moment)?;

        self.coping_style = Some(coping_style);
        self.reflection = Some(Reflection {
            prompt: prompt.into(),
            image_ref,
            safety: SafetyStatus::Approved,
        });
        self.enter(JourneyStage::Reflection)?;

        self.record_event(JourneyEvent::ReflectionReached {
            journey_id: self.id,
            at: self.updated_at,
        });
        Ok(())
    }

    /// Attaches the approved guestbook entry and advances to Defusion.
    pub fn attach_guestbook(&mut self, mut entry: GuestbookEntry) -> Result<(), DomainError> {
        self.ensure_mutable()?;
        self.expect_stage(JourneyStage::Reflection)?;

        entry.safety = SafetyStatus::Approved;
        self.guestbook = Some(entry);
        self.enter(JourneyStage::Defusion)?;

        self.record_event(JourneyEvent::GuestbookSigned {
            journey_id: self.id,
            at: self.updated_at,
        });
        Ok(())
    }

    /// Attaches the approved curator message and seals the journey.
    pub fn attach_curator_message(&mut self, text: impl Into<String>) -> Result<(), DomainError> {
        self.ensure_mutable()?;
        self.expect_stage(JourneyStage::Defusion)?;

        self.curator_message = Some(CuratorMessage {
            text: text.into(),
            safety: SafetyStatus::Approved,
        });
        self.enter(JourneyStage::Closure)?;

        self.record_event(JourneyEvent::Completed {
            journey_id: self.id,
            user_id: self.user_id.clone(),
            at: self.updated_at,
        });
        Ok(())
    }

    fn record_event(&mut self, event: JourneyEvent) {
        self.domain_events.push(event);
    }
}
