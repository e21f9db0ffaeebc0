//! SafetyGate - validates generated and user-authored content before it is
//! attached to a journey stage.
//!
//! The gate never mutates a journey; callers decide how to react to the
//! verdict. Crisis matches take precedence over everything else and fire a
//! fire-and-forget notification to the human-review collaborator.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::domain::foundation::{JourneyId, Timestamp, UserId};
use crate::domain::journey::JourneyStage;
use crate::ports::{EscalationRecord, ReviewNotifier};

use super::{RejectionCategory, RuleSet, RuleSeverity};

/// What kind of artifact is being inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    ReflectionPrompt,
    GeneratedImage,
    Guestbook,
    CuratorMessage,
}

impl ContentKind {
    /// Returns the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            ContentKind::ReflectionPrompt => "reflection prompt",
            ContentKind::GeneratedImage => "generated image",
            ContentKind::Guestbook => "guestbook entry",
            ContentKind::CuratorMessage => "curator message",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The gate's decision about one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// No rule matched; the artifact may be attached.
    Approved,
    /// An unsafe rule matched; regenerate or resubmit.
    Rejected(RejectionCategory),
    /// A crisis rule matched; frozen pending human review.
    Escalated(RejectionCategory),
}

impl Verdict {
    /// True when the artifact may be attached.
    pub fn is_approved(&self) -> bool {
        matches!(self, Verdict::Approved)
    }
}

/// The journey context a validation runs in, used for the escalation record.
#[derive(Debug, Clone)]
pub struct GateSubject {
    pub journey_id: JourneyId,
    pub user_id: UserId,
    /// The stage the artifact was destined for.
    pub destined_stage: JourneyStage,
}

/// Validates content against the configured rule set.
pub struct SafetyGate {
    rules: RuleSet,
    notifier: Arc<dyn ReviewNotifier>,
}

impl SafetyGate {
    /// Creates a gate over a validated rule set.
    pub fn new(rules: RuleSet, notifier: Arc<dyn ReviewNotifier>) -> Self {
        Self { rules, notifier }
    }

    /// Computes the verdict for one artifact without side effects.
    ///
    /// Crisis severity wins over unsafe severity regardless of rule order.
    pub fn assess(&self, content: &str) -> Verdict {
        let mut rejection: Option<RejectionCategory> = None;

        for rule in self.rules.matching(content) {
            match rule.severity {
                RuleSeverity::Crisis => return Verdict::Escalated(rule.category),
                RuleSeverity::Unsafe => {
                    rejection.get_or_insert(rule.category);
                }
            }
        }

        match rejection {
            Some(category) => Verdict::Rejected(category),
            None => Verdict::Approved,
        }
    }

    /// Validates an artifact for a journey, firing the human-review
    /// notification when the verdict is an escalation.
    ///
    /// The notification is fire-and-forget: it is spawned onto the runtime,
    /// never delays the verdict, and delivery failures are only logged.
    pub fn validate(&self, content: &str, kind: ContentKind, subject: &GateSubject) -> Verdict {
        let verdict = self.assess(content);

        match verdict {
            Verdict::Approved => {}
            Verdict::Rejected(category) => {
                info!(
                    journey_id = %subject.journey_id,
                    kind = %kind,
                    category = %category,
                    "safety gate rejected artifact"
                );
            }
            Verdict::Escalated(category) => {
                warn!(
                    journey_id = %subject.journey_id,
                    user_id = %subject.user_id,
                    kind = %kind,
                    category = %category,
                    "crisis content escalated to human review"
                );
                self.spawn_notification(EscalationRecord {
                    journey_id: subject.journey_id,
                    user_id: subject.user_id.clone(),
                    destined_stage: subject.destined_stage,
                    kind,
                    category,
                    excerpt: excerpt_of(content),
                    occurred_at: Timestamp::now(),
                });
            }
        }

        verdict
    }

    fn spawn_notification(&self, record: EscalationRecord) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.notify_human_review(record).await {
                // The verdict has already been recorded; delivery problems
                // must not surface to the caller.
                error!(error = %e, "human-review notification failed");
            }
        });
    }
}

/// Short excerpt included in the escalation record for reviewer context.
fn excerpt_of(content: &str) -> String {
    const MAX_EXCERPT: usize = 200;
    if content.len() <= MAX_EXCERPT {
        content.to_string()
    } else {
        let mut cut = MAX_EXCERPT;
        while !content.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}…", &content[..cut])
    }
}
