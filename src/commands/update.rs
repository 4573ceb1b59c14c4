use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use dialoguer::Confirm;

use inplace::application::ResolvedSource;
use inplace::domain::ports::UpdateEventSink;
use inplace::infrastructure::JsonEventSink;
use inplace::presentation::{create_update_use_case, ColorWhen, RunArgs};

use crate::ui::console::ConsoleEventSink;
use crate::ui::context::UiContext;
use crate::ui::theme::PromptTheme;

pub fn cmd_update(args: &RunArgs, json: bool, verbose: u8, color: Option<ColorWhen>) -> Result<i32> {
    let prepared = super::prepare(args, json, verbose, color)?;
    let (options, ui) = (prepared.options, prepared.ui);

    let interrupted = Arc::new(AtomicBool::new(false));
    let use_case = create_update_use_case(interrupted.clone());

    // Resolution failures are reported by the run itself.
    if let Ok(resolved) = use_case.resolve(&options) {
        if !json {
            print!(
                "{}",
                crate::ui::views::update::render_update_header(&resolved, ui.color, ui.unicode)
            );
        }
        if !args.yes && ui.can_prompt() && !confirm(&resolved, &ui)? {
            println!("Update cancelled.");
            return Ok(0);
        }
    }

    // From here on Ctrl+C stops the run at the next safe point instead of killing it.
    ctrlc::set_handler(move || {
        interrupted.store(true, Ordering::SeqCst);
    })
    .context("installing the Ctrl+C handler")?;

    let sink: Arc<dyn UpdateEventSink> = if json {
        Arc::new(JsonEventSink::stdout())
    } else {
        Arc::new(ConsoleEventSink::stdout(&ui))
    };

    let outcome = use_case.execute_with_events(&options, sink);

    if json {
        let report = serde_json::to_value(&outcome).context("serializing the run report")?;
        crate::ui::json::emit(crate::ui::json::report_event("update", report))
            .context("writing the run report")?;
    } else {
        println!();
        print!(
            "{}",
            crate::ui::views::update::render_update_summary(&outcome, ui.color, ui.unicode)
        );
    }

    Ok(outcome.exit_code())
}

fn confirm(resolved: &ResolvedSource, ui: &UiContext) -> Result<bool> {
    let prompt = format!(
        "Replace the code in {} ({})?",
        resolved.target.root().display(),
        resolved.mode
    );
    let answer = Confirm::with_theme(&PromptTheme::new(ui.color))
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("reading the confirmation")?;
    Ok(answer)
}
