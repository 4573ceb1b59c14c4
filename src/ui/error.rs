use inplace::InplaceError;

use crate::ui::blocks::error::ErrorBlock;
use crate::ui::ci::{github_actions_annotation, AnnotationLevel};

/// Exit code for an error that escaped the use cases
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<InplaceError>() {
        Some(e) if e.is_validation() => 2,
        Some(InplaceError::DataLossPrevented { .. }) => 3,
        Some(InplaceError::RunInProgress { .. }) => 4,
        Some(InplaceError::Interrupted) => 130,
        _ => 1,
    }
}

fn fix_hint(err: &InplaceError) -> Option<&'static str> {
    match err {
        InplaceError::MissingTarget => {
            Some("Pass --target <DIR>, set INPLACE_TARGET, or add [install] root to the config")
        }
        InplaceError::Config { .. } => Some("Fix the TOML syntax or remove the offending key"),
        InplaceError::InvalidLayout(_) => {
            Some("Check the [layout] section: runtime paths must not sit inside each other")
        }
        InplaceError::InvalidSource { .. } => {
            Some("Point SOURCE at a tree that contains the backend and frontend directories")
        }
        _ => None,
    }
}

fn format_error_with(err: &anyhow::Error, supports_color: bool, supports_unicode: bool) -> String {
    let Some(inplace) = err.downcast_ref::<InplaceError>() else {
        return format!("[ERROR] {:#}\n", err);
    };

    let mut block = ErrorBlock::new(inplace.to_string());
    if let Some(path) = inplace.path() {
        block = block.with_path(path);
    }
    if let Some(fix) = fix_hint(inplace) {
        block = block.with_fix(fix);
    }
    block.render(supports_color, supports_unicode)
}

pub fn format_error(err: &anyhow::Error) -> String {
    let caps = crate::ui::terminal::detect_capabilities();
    format_error_with(err, caps.supports_color, caps.supports_unicode)
}

pub fn print_error(err: &anyhow::Error, json: bool) {
    if json {
        let _ = crate::ui::json::emit(serde_json::json!({
            "event": "error",
            "message": format!("{:#}", err),
            "exit_code": exit_code(err),
        }));
        return;
    }

    let caps = crate::ui::terminal::detect_capabilities();
    if caps.is_ci && std::env::var("GITHUB_ACTIONS").is_ok() {
        let file = err
            .downcast_ref::<InplaceError>()
            .and_then(InplaceError::path)
            .map(|p| p.display().to_string());
        println!(
            "{}",
            github_actions_annotation(
                AnnotationLevel::Error,
                &format!("{:#}", err),
                file.as_deref(),
                Some("inplace"),
            )
        );
    }

    eprint!("{}", format_error(err));
}
