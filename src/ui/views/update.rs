use inplace::application::ResolvedSource;
use inplace::domain::entities::{DeploymentOutcome, RunStatus};
use inplace::{Stage, StageStatus};

use crate::ui::blocks::header::CommandHeader;
use crate::ui::blocks::summary::ResultSummary;
use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;

pub fn render_update_header(
    resolved: &ResolvedSource,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut header = CommandHeader::new(Icon::Update, "inplace update");
    header.add("Source", resolved.source.root().display().to_string());
    header.add("Target", resolved.target.root().display().to_string());
    header.add("Mode", resolved.mode.label());
    if let Some(ignored) = &resolved.ignored_source {
        header.add("Ignored", format!("{} (running from the installation)", ignored.display()));
    }
    header.render(supports_color, supports_unicode)
}

/// One progress row: `[ 6/11] [OK] deploy  copied backend, frontend`
pub fn render_stage_line(
    stage: Stage,
    status: StageStatus,
    detail: Option<&str>,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let position = Stage::ALL.iter().position(|s| *s == stage).unwrap_or(0) + 1;
    let counter = format!("[{:>2}/{}]", position, Stage::ALL.len());
    let name = format!("{:<15}", stage.name());

    let mut line = format!(
        "{} {} {}",
        ColoredText::dim(counter).render(supports_color),
        Icon::for_stage(status).colored(supports_color, supports_unicode),
        name
    );
    if let Some(detail) = detail {
        let detail = match status {
            StageStatus::Failed | StageStatus::Aborted => {
                ColoredText::error(detail).render(supports_color)
            }
            StageStatus::Warning => ColoredText::warning(detail).render(supports_color),
            _ => ColoredText::dim(detail).render(supports_color),
        };
        line.push(' ');
        line.push_str(&detail);
    }
    line.trim_end().to_string()
}

pub fn render_update_summary(
    outcome: &DeploymentOutcome,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut summary = match outcome.status {
        RunStatus::Success => ResultSummary::success("Update Complete"),
        RunStatus::Partial => ResultSummary::partial("Update Complete (with warnings)"),
        RunStatus::Failed => ResultSummary::failure("Update Failed"),
        RunStatus::Aborted => ResultSummary::failure("Update Aborted"),
    };

    summary.add_fact("Status", outcome.status.label());
    summary.add_fact("Service", outcome.service_status.label());
    if let Some(stage) = outcome.failed_stage {
        summary.add_fact("Stage", stage.name());
    }
    if let Some(error) = &outcome.error {
        summary.add_fact("Error", error.as_str());
    }
    if let Some(snapshot) = &outcome.retained_snapshot {
        summary.add_fact("Snapshot kept", snapshot.display().to_string());
    }
    summary.add_fact("Exit code", outcome.exit_code().to_string());

    for record in outcome.warnings() {
        let detail = record.detail.as_deref().unwrap_or("warning");
        summary.add_warning(format!("{}: {}", record.stage, detail));
    }

    match outcome.status {
        RunStatus::Success | RunStatus::Partial => {
            summary.with_next_step("Run `inplace check` to verify the installation")
        }
        _ if outcome.retained_snapshot.is_some() => {
            summary.with_next_step("Copy the runtime state back from the kept snapshot")
        }
        _ => {}
    }

    summary.render(supports_color, supports_unicode)
}
