//! State machines for companies domain entities
//!
//! - Verification: `Unverified -> Verified`, one-way, re-verifying is a no-op
//! - Invitation: `Pending -> Consumed` (derived from `consumed_at`)

use partyhub_common::StateError;
use serde::{Deserialize, Serialize};

// ============================================================================
// Verification State Machine
// ============================================================================

/// Trust state of a company.
///
/// Variants are ordered: a status can only move forward.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
    Default,
)]
#[sqlx(type_name = "verification_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Unverified,
    Verified,
}

impl VerificationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unverified => write!(f, "unverified"),
            Self::Verified => write!(f, "verified"),
        }
    }
}

/// Events that change a company's verification status
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerificationEvent {
    /// Platform manager vouches for the company
    Verify,
}

impl std::fmt::Display for VerificationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Verify => write!(f, "verify"),
        }
    }
}

/// Verification state machine
pub struct VerificationStateMachine;

impl VerificationStateMachine {
    /// Next status for `event`, or `None` when the company is already there.
    ///
    /// Re-applying `Verify` to a verified company is a no-op, so concurrent
    /// admin calls for the same company both succeed.
    pub fn transition(
        current: VerificationStatus,
        event: VerificationEvent,
    ) -> Option<VerificationStatus> {
        match (current, event) {
            (VerificationStatus::Unverified, VerificationEvent::Verify) => {
                Some(VerificationStatus::Verified)
            }
            (VerificationStatus::Verified, VerificationEvent::Verify) => None,
        }
    }
}

// ============================================================================
// Invitation State Machine
// ============================================================================

/// Invitation states; derived from `consumed_at`, not stored directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationState {
    Pending,
    Consumed,
}

impl InvitationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Consumed)
    }
}

impl std::fmt::Display for InvitationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Consumed => write!(f, "consumed"),
        }
    }
}

/// Events that trigger invitation state transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvitationEvent {
    /// Invited user completed registration
    Consume,
}

impl std::fmt::Display for InvitationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Consume => write!(f, "consume"),
        }
    }
}

/// Invitation state machine
pub struct InvitationStateMachine;

impl InvitationStateMachine {
    pub fn transition(
        current: InvitationState,
        event: InvitationEvent,
    ) -> Result<InvitationState, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        match (current, event) {
            (InvitationState::Pending, InvitationEvent::Consume) => Ok(InvitationState::Consumed),
            (from, event) => Err(StateError::InvalidTransition {
                from: from.to_string(),
                event: event.to_string(),
            }),
        }
    }
}
