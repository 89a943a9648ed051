//! ServeCoach Pose Model
//!
//! Defines the core data contracts for serve analysis:
//! - **Landmarks:** Per-frame 3D joint positions from the pose estimator
//! - **Metrics:** Typed per-frame arm metrics and the serve phase enumeration
//! - **Summary:** Write-once records of each phase's defining event
//! - **Report / Export:** The coaching report and the diagnostic session export
//!
//! Landmark coordinates are normalized to `[0.0, 1.0]` in image space, with
//! `y` growing downward (smaller `y` is higher in the frame).

pub mod export;
pub mod landmark;
pub mod metrics;
pub mod report;
pub mod summary;

pub use export::*;
pub use landmark::*;
pub use metrics::*;
pub use report::*;
pub use summary::*;
