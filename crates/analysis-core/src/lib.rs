//! ServeCoach Analysis Core: the serve phase detector.
//!
//! Turns a per-frame stream of arm landmarks into coaching feedback:
//! - **Geometry:** Joint angles with explicit degenerate-input failures
//! - **Extraction:** One typed [`FrameMetrics`] record per usable frame
//! - **Phase Machine:** Online stance → cocking → acceleration → contact →
//!   follow-through detection, anchored on running extrema
//! - **Feedback:** Rule table over the recorded trophy pose and contact point
//!
//! This crate is pure computation with no I/O and no threads.
//! All inputs are data; all outputs are data.
//!
//! [`FrameMetrics`]: servecoach_pose_model::FrameMetrics

pub mod buffer;
pub mod extractor;
pub mod feedback;
pub mod geometry;
pub mod phase_machine;
pub mod session;

pub use extractor::FrameMetricsExtractor;
pub use feedback::FeedbackEngine;
pub use phase_machine::PhaseMachine;
pub use session::ServeSession;
