//! ServeCoach Coaching Enrichment
//!
//! Optional, purely additive narrative feedback on top of the rule-based
//! report:
//! - **Prompt:** Renders a session export and report into a coaching prompt
//! - **Enrichment:** The [`FeedbackEnricher`] seam and an OpenAI
//!   chat-completions implementation
//!
//! Enrichment never alters or blocks the report; any failure degrades to
//! `ai_enabled: false`.

pub mod enrichment;
pub mod prompt;

pub use enrichment::*;
pub use prompt::*;
