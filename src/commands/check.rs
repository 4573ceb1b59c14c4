use anyhow::{Context, Result};

use inplace::application::{CheckItem, CheckStatus};
use inplace::presentation::{create_check_use_case, ColorWhen, RunArgs};

pub fn cmd_check(args: &RunArgs, json: bool, verbose: u8, color: Option<ColorWhen>) -> Result<i32> {
    let prepared = super::prepare(args, json, verbose, color)?;
    let (options, ui) = (prepared.options, prepared.ui);
    let use_case = create_check_use_case();

    if json {
        let _ = crate::ui::json::emit(serde_json::json!({
            "event": "start",
            "command": "check",
            "target": options.target.display().to_string(),
            "source": options.source.as_ref().map(|s| s.display().to_string()),
        }));
    } else {
        print!(
            "{}",
            crate::ui::views::check::render_check_header(
                &options.target,
                options.source.as_deref(),
                ui.color,
                ui.unicode
            )
        );
    }

    let result = if json {
        let mut out = std::io::stdout().lock();
        use_case.execute_with_callback(&options, |item| {
            let _ = crate::ui::json::write_event(&mut out, &check_event(item));
        })
    } else {
        use_case.execute_with_callback(&options, |item| {
            print!(
                "{}",
                crate::ui::blocks::check_item::render_check_item(item, ui.color, ui.unicode)
            );
        })
    };

    let code = result.exit_code();
    if json {
        let _ = crate::ui::json::emit(serde_json::json!({
            "event": "complete",
            "command": "check",
            "passed": result.passed,
            "warnings": result.warnings,
            "errors": result.errors,
            "success": result.is_success(),
            "exit_code": code,
        }))
        .context("writing the check summary")?;
    } else {
        println!();
        print!(
            "{}",
            crate::ui::views::check::render_check_summary(&result, ui.color, ui.unicode)
        );
    }

    Ok(code)
}

fn check_event(item: &CheckItem) -> serde_json::Value {
    let status = match item.status {
        CheckStatus::Pass => "pass",
        CheckStatus::Warning => "warning",
        CheckStatus::Error => "error",
    };
    serde_json::json!({
        "event": "check",
        "command": "check",
        "name": item.name,
        "status": status,
        "message": item.message,
        "recommendation": item.recommendation,
        "abort_reason": item.abort,
    })
}
