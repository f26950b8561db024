//! Dialogue: identity verification and credential reset conversation.
//!
//! Every user input enters [`DialogueMachine::handle`], which dispatches on
//! the session's [`ConversationState`], calls the backend gateway when the
//! state needs it, and returns the next session with the messages to render.
//! Cédula and OTP entry are retry-limited; OTP validity is recomputed from
//! its issue time on every answer.

pub mod machine;
pub mod model;
pub mod names;
pub mod otp;
pub mod prompts;
pub mod retry;
pub mod router;
pub mod state;

pub use machine::{DialogueMachine, Turn};
pub use model::{OutgoingMessage, ResetSession, RetryCounters, Session, UserProfile};
pub use otp::{Clock, ManualClock, OtpLifecycle, SystemClock};
pub use retry::{RetryOutcome, RetryPolicy};
pub use router::QueryTag;
pub use state::ConversationState;
