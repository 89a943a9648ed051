//! Analyze a landmark stream and print coaching feedback.

use std::path::PathBuf;

use servecoach_analysis_core::session::{FrameOutcome, ServeSession, SessionConfig};
use servecoach_coach_ai::enrichment::{enrich_feedback, FeedbackEnricher, OpenAiEnricher};
use servecoach_common::config::AppConfig;
use servecoach_pose_model::landmark::load_landmark_frames;
use servecoach_pose_model::report::FeedbackReport;

/// Optional output files.
pub struct Outputs {
    pub export: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

pub async fn run(
    config: &AppConfig,
    landmarks: PathBuf,
    outputs: Outputs,
    enrich: bool,
) -> anyhow::Result<()> {
    println!("Analyzing landmarks at: {}", landmarks.display());

    let frames = load_landmark_frames(&landmarks)
        .map_err(|e| anyhow::anyhow!("Failed to load landmarks: {e}"))?;
    println!("  Loaded {} frames", frames.len());

    let session_config = SessionConfig::from_defaults(&config.analysis)?;
    let mut session = ServeSession::new(session_config);

    for frame in &frames {
        match session.push_landmarks(frame)? {
            FrameOutcome::Processed {
                transition: Some(t),
                ..
            } => println!("  Frame {:>4}: {} → {}", t.frame, t.from, t.to),
            FrameOutcome::Processed { .. } | FrameOutcome::Skipped { .. } => {}
        }
    }

    let report = session.finalize();
    let export = session.export();
    println!(
        "  Processed {} frames ({} skipped), final phase: {}",
        export.total_frames, export.skipped_frames, export.final_phase
    );

    if let Some(path) = &outputs.export {
        export
            .save(path)
            .map_err(|e| anyhow::anyhow!("Failed to write export: {e}"))?;
        println!("  Export saved to: {}", path.display());
    }

    println!();
    print_report(&report);

    if enrich {
        let enricher = OpenAiEnricher::from_config(&config.enrichment)?;
        let enriched = enrich_feedback(
            enricher.as_ref().map(|e| e as &dyn FeedbackEnricher),
            &export,
            report,
        )
        .await;

        match &enriched.ai_analysis {
            Some(text) => {
                println!("\nCoach's analysis:\n");
                println!("{text}");
            }
            None => println!("\nNarrative feedback unavailable."),
        }

        if let Some(path) = &outputs.report {
            std::fs::write(path, serde_json::to_string_pretty(&enriched)?)?;
            println!("\nReport saved to: {}", path.display());
        }
    } else if let Some(path) = &outputs.report {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!("\nReport saved to: {}", path.display());
    }

    Ok(())
}

fn print_report(report: &FeedbackReport) {
    println!("{}", report.title);

    if report.phases_detected.is_empty() {
        println!("  Phases detected: none");
    } else {
        println!("  Phases detected:");
        for phase in &report.phases_detected {
            println!("    - {phase}");
        }
    }

    if !report.strengths.is_empty() {
        println!("  Strengths:");
        for note in &report.strengths {
            println!("    + {note}");
        }
    }

    println!("  Recommendations:");
    for rec in &report.recommendations {
        println!("    * {}", rec.title);
        println!("      {}", rec.advice);
    }
}
