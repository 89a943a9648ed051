//! Validate a landmark stream.

use std::path::PathBuf;

use servecoach_analysis_core::extractor::{ExtractorConfig, FrameMetricsExtractor};
use servecoach_common::config::AppConfig;
use servecoach_pose_model::landmark::{load_landmark_frames, Side};

pub fn run(config: &AppConfig, landmarks: PathBuf) -> anyhow::Result<()> {
    println!("Validating landmarks at: {}", landmarks.display());

    let frames = load_landmark_frames(&landmarks)
        .map_err(|e| anyhow::anyhow!("Failed to load landmarks: {e}"))?;
    println!("  Frames: {}", frames.len());

    let mut errors = Vec::new();
    let mut last_index = 0;
    for frame in &frames {
        if frame.frame_index <= last_index {
            errors.push(format!(
                "frame {} does not follow frame {last_index}",
                frame.frame_index
            ));
        }
        last_index = last_index.max(frame.frame_index);
    }

    let extractor = FrameMetricsExtractor::new(ExtractorConfig::from_defaults(&config.analysis)?);
    for side in [Side::Right, Side::Left] {
        let usable = frames
            .iter()
            .filter(|frame| extractor.extract_arm(frame, side, None).is_ok())
            .count();
        println!("  Usable {side} arm frames: {usable}/{}", frames.len());
    }

    if errors.is_empty() {
        println!("\nLandmark stream is valid.");
    } else {
        println!("\nValidation issues:");
        for error in &errors {
            println!("  - {error}");
        }
        println!(
            "\n{} issue(s) found. Analysis will reject out-of-order frames.",
            errors.len()
        );
    }

    Ok(())
}
