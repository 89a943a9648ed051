//! Frame clock for fixed-rate video sessions.
//!
//! Analysis sessions assume a constant frame rate that is fixed when the
//! session starts. This module provides utilities for:
//! - Capturing the wall-clock start of a session
//! - Converting between frame indices and elapsed seconds

/// A session clock anchored to a fixed frame rate.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Frames per second. Never zero.
    frame_rate: u32,

    /// Wall-clock time at session start (RFC 3339 string).
    started_at: String,
}

impl FrameClock {
    /// Create a frame clock anchored to now.
    ///
    /// A frame rate of zero is clamped to one so velocity scaling stays finite.
    pub fn start(frame_rate: u32) -> Self {
        Self::from_start(frame_rate, chrono::Utc::now().to_rfc3339())
    }

    /// Create a clock with a known start time (for replaying saved sessions).
    pub fn from_start(frame_rate: u32, started_at: String) -> Self {
        Self {
            frame_rate: frame_rate.max(1),
            started_at,
        }
    }

    /// Frames per second.
    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Wall-clock time at session start.
    pub fn started_at(&self) -> &str {
        &self.started_at
    }

    /// Duration of one frame in seconds.
    pub fn frame_interval_secs(&self) -> f64 {
        1.0 / self.frame_rate as f64
    }

    /// Seconds from the start of the clip to the given 1-based frame.
    pub fn frame_to_secs(&self, frame_index: u64) -> f64 {
        frame_index.saturating_sub(1) as f64 * self.frame_interval_secs()
    }
}
