//! Print the enrichment prompt for a saved session export.

use std::path::PathBuf;

use servecoach_analysis_core::feedback::FeedbackEngine;
use servecoach_coach_ai::prompt::{build_analysis_prompt, load_report};
use servecoach_pose_model::export::SessionExport;
use servecoach_pose_model::report::FeedbackReport;
use servecoach_pose_model::summary::PhaseSummary;

pub fn run(export: PathBuf, report: Option<PathBuf>) -> anyhow::Result<()> {
    let export = SessionExport::load(&export)
        .map_err(|e| anyhow::anyhow!("Failed to load export: {e}"))?;

    let report: FeedbackReport = match report {
        Some(path) => load_report(&path)?,
        None => {
            let mut summary = PhaseSummary::new();
            if let Some(trophy) = export.phases.trophy_pose {
                summary.record_trophy_pose(trophy);
            }
            if let Some(contact) = export.phases.ball_contact {
                summary.record_contact(contact);
            }
            FeedbackEngine::with_defaults().evaluate(&summary)
        }
    };

    println!("{}", build_analysis_prompt(&export, &report));
    Ok(())
}
