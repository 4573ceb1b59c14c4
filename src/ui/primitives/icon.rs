use crossterm::style::{Color, Stylize};

use inplace::domain::entities::{RunStatus, ServiceStatus};
use inplace::StageStatus;

use crate::ui::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Success,
    Error,
    Warning,
    Progress,
    Pending,
    Skipped,
    Arrow,
    Pointer,
    Update,
    Check,
    Abort,
}

impl Icon {
    pub fn for_stage(status: StageStatus) -> Self {
        match status {
            StageStatus::Completed => Icon::Success,
            StageStatus::Skipped => Icon::Skipped,
            StageStatus::Warning => Icon::Warning,
            StageStatus::Failed => Icon::Error,
            StageStatus::Aborted => Icon::Abort,
        }
    }

    pub fn for_run(status: RunStatus) -> Self {
        match status {
            RunStatus::Success => Icon::Success,
            RunStatus::Partial => Icon::Warning,
            RunStatus::Failed => Icon::Error,
            RunStatus::Aborted => Icon::Abort,
        }
    }

    pub fn for_service(status: ServiceStatus) -> Self {
        match status {
            ServiceStatus::Running => Icon::Success,
            ServiceStatus::Stopped => Icon::Error,
            ServiceStatus::Unknown => Icon::Warning,
            ServiceStatus::NotManaged => Icon::Skipped,
        }
    }

    pub fn render(&self, supports_unicode: bool) -> &'static str {
        if supports_unicode {
            match self {
                Icon::Success => theme::icons::SUCCESS,
                Icon::Error => theme::icons::ERROR,
                Icon::Warning => theme::icons::WARNING,
                Icon::Progress => theme::icons::PROGRESS,
                Icon::Pending => theme::icons::PENDING,
                Icon::Skipped => theme::icons::SKIPPED,
                Icon::Arrow => theme::icons::ARROW,
                Icon::Pointer => theme::icons::POINTER,
                Icon::Update => theme::icons::UPDATE,
                Icon::Check => theme::icons::CHECK,
                Icon::Abort => theme::icons::ABORT,
            }
        } else {
            match self {
                Icon::Success => theme::icons_ascii::SUCCESS,
                Icon::Error => theme::icons_ascii::ERROR,
                Icon::Warning => theme::icons_ascii::WARNING,
                Icon::Progress => theme::icons_ascii::PROGRESS,
                Icon::Pending => theme::icons_ascii::PENDING,
                Icon::Skipped => theme::icons_ascii::SKIPPED,
                Icon::Arrow => theme::icons_ascii::ARROW,
                Icon::Pointer => theme::icons_ascii::POINTER,
                Icon::Update => theme::icons_ascii::UPDATE,
                Icon::Check => theme::icons_ascii::CHECK,
                Icon::Abort => theme::icons_ascii::ABORT,
            }
        }
    }

    fn color(&self) -> Color {
        match self {
            Icon::Success => theme::colors::SUCCESS,
            Icon::Error | Icon::Pointer | Icon::Abort => theme::colors::ERROR,
            Icon::Warning | Icon::Progress => theme::colors::WARNING,
            Icon::Pending | Icon::Skipped | Icon::Arrow => theme::colors::DIM,
            Icon::Update | Icon::Check => theme::colors::INFO,
        }
    }

    pub fn colored(&self, supports_color: bool, supports_unicode: bool) -> String {
        let s = self.render(supports_unicode);
        if !supports_color {
            return s.to_string();
        }
        format!("{}", s.with(self.color()))
    }
}
