//! Coaching prompt construction.

use std::fmt::Display;
use std::path::Path;

use servecoach_common::error::{ServeCoachError, ServeCoachResult};
use servecoach_pose_model::export::SessionExport;
use servecoach_pose_model::report::FeedbackReport;

/// System message for the chat model.
pub const SYSTEM_PROMPT: &str = "You are an expert volleyball coach specializing in \
biomechanical analysis of serve technique. Provide specific, actionable feedback based on \
the data provided.";

const NOT_AVAILABLE: &str = "N/A";

fn or_na<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

fn degrees(value: Option<f64>) -> String {
    or_na(value.map(|v| format!("{v:.1}")))
}

fn decimal(value: Option<f64>) -> String {
    or_na(value.map(|v| format!("{v:.3}")))
}

/// Load a feedback report saved by `servecoach analyze --output`.
///
/// Enriched reports load too; the extra fields are ignored.
pub fn load_report(path: &Path) -> ServeCoachResult<FeedbackReport> {
    if !path.exists() {
        return Err(ServeCoachError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Render the user prompt for one analyzed session.
pub fn build_analysis_prompt(export: &SessionExport, report: &FeedbackReport) -> String {
    let trophy = export.phases.trophy_pose.as_ref();
    let contact = export.phases.ball_contact.as_ref();
    let stats = &export.summary_stats;

    let recommendations = serde_json::to_string_pretty(&report.recommendations)
        .unwrap_or_else(|_| "[]".to_string());

    format!(
        "Analyze this volleyball serve based on biomechanical data collected from video analysis:

**PHASE DETECTION:**

Trophy Pose (Frame {trophy_frame}):
- Elbow flexion: {trophy_elbow}°
- Wrist height: {trophy_wrist}
- Ideal elbow range: 90-110°

Ball Contact (Frame {contact_frame}):
- Shoulder abduction: {contact_shoulder}°
- Elbow extension: {contact_elbow}°
- Max wrist velocity: {contact_velocity}
- Ideal shoulder: 120-150°, Ideal elbow: 170-180°

**KEY METRICS:**
- Serving arm: {arm}
- Minimum elbow angle during motion: {min_elbow}° at frame {min_elbow_frame}
- Maximum wrist velocity: {max_velocity}
- Contact occurred at frame: {stats_contact}
- Total frames analyzed: {total} ({skipped} skipped at {fps} fps)

**AUTOMATED FEEDBACK DETECTED:**
{recommendations}

Based on this biomechanical analysis, provide:

1. **Overall Technique Rating** (1-10 scale with brief explanation)
2. **Top 3 Specific Improvements** (actionable coaching cues)
3. **Kinetic Chain Analysis** (comment on timing and sequencing from legs→hips→torso→arm)
4. **2-3 Recommended Drills** (specific exercises to address the weaknesses)

Format your response clearly with these sections. Be concise but specific. Focus on \
practical improvements the athlete can implement immediately.",
        trophy_frame = or_na(trophy.map(|t| t.frame)),
        trophy_elbow = degrees(trophy.map(|t| t.elbow_flexion)),
        trophy_wrist = decimal(trophy.map(|t| t.wrist_height)),
        contact_frame = or_na(contact.map(|c| c.frame)),
        contact_shoulder = degrees(contact.map(|c| c.shoulder_abduction)),
        contact_elbow = degrees(contact.map(|c| c.elbow_extension)),
        contact_velocity = decimal(contact.map(|c| c.max_velocity)),
        arm = export.serving_arm,
        min_elbow = degrees(stats.min_elbow_angle),
        min_elbow_frame = or_na(stats.min_elbow_frame),
        max_velocity = decimal(stats.max_wrist_velocity),
        stats_contact = or_na(stats.contact_frame),
        total = export.total_frames,
        skipped = export.skipped_frames,
        fps = export.frame_rate,
    )
}
