//! Retry-limited validation shared by cédula and OTP entry.

use super::state::ConversationState;

/// Failed attempts allowed before a sub-dialogue restarts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Result of checking one attempt against the policy.
///
/// `T` is what a valid attempt produced, `E` why an invalid one failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T, E> {
    /// Input was valid; the counter is back to zero.
    Proceed(T),
    /// Input was invalid; stay in the current state.
    Retry { reason: E, remaining: u32 },
    /// Budget spent; the counter is back to zero and the dialogue falls back.
    Exhausted {
        reason: E,
        anchor: ConversationState,
    },
}

/// Counter-and-threshold policy with a fallback state.
///
/// The policy owns no counter; each caller passes its own so cédula and OTP
/// entry keep independent budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    threshold: u32,
    anchor: ConversationState,
}

impl RetryPolicy {
    pub fn new(threshold: u32, anchor: ConversationState) -> Self {
        Self {
            threshold: threshold.max(1),
            anchor,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn anchor(&self) -> ConversationState {
        self.anchor
    }

    /// Count one attempt. `Ok` is a valid attempt and clears the counter;
    /// `Err` spends one unit of the budget.
    pub fn check<T, E>(&self, attempt: Result<T, E>, counter: &mut u32) -> RetryOutcome<T, E> {
        match attempt {
            Ok(value) => {
                *counter = 0;
                RetryOutcome::Proceed(value)
            }
            Err(reason) => {
                *counter += 1;
                if *counter >= self.threshold {
                    *counter = 0;
                    RetryOutcome::Exhausted {
                        reason,
                        anchor: self.anchor,
                    }
                } else {
                    RetryOutcome::Retry {
                        reason,
                        remaining: self.threshold - *counter,
                    }
                }
            }
        }
    }
}
