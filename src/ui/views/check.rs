use std::path::Path;

use inplace::application::{CheckItem, CheckResult};

use crate::ui::blocks::check_item::render_check_item;
use crate::ui::blocks::header::CommandHeader;
use crate::ui::blocks::summary::ResultSummary;
use crate::ui::primitives::icon::Icon;

pub fn render_check_header(
    target: &Path,
    source: Option<&Path>,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut header = CommandHeader::new(Icon::Check, "inplace check");
    header.add("Target", target.display().to_string());
    if let Some(source) = source {
        header.add("Source", source.display().to_string());
    }
    header.render(supports_color, supports_unicode)
}

pub fn render_check_items(items: &[CheckItem], supports_color: bool, supports_unicode: bool) -> String {
    items
        .iter()
        .map(|item| render_check_item(item, supports_color, supports_unicode))
        .collect()
}

pub fn render_check_summary(
    result: &CheckResult,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut summary = if !result.is_success() {
        ResultSummary::failure("An update would not proceed")
    } else if result.warnings > 0 {
        ResultSummary::partial("Check passed with warnings")
    } else {
        ResultSummary::success("All checks passed")
    };

    summary.add_fact("Passed", result.passed.to_string());
    summary.add_fact("Warnings", result.warnings.to_string());
    summary.add_fact("Errors", result.errors.to_string());
    if result.is_success() {
        summary.with_next_step("Run `inplace update` to apply");
    }

    summary.render(supports_color, supports_unicode)
}
