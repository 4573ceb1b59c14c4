//! Console Event Sink
//!
//! Prints one line per finished stage while an update runs.

use std::io::{self, Write};
use std::sync::Mutex;

use inplace::domain::ports::{UpdateEvent, UpdateEventSink};

use crate::ui::context::UiContext;
use crate::ui::primitives::icon::Icon;
use crate::ui::views::update::render_stage_line;

pub struct ConsoleEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
    color: bool,
    unicode: bool,
    verbose: bool,
}

impl ConsoleEventSink {
    pub fn stdout(ui: &UiContext) -> Self {
        Self::with_writer(io::stdout(), ui)
    }

    pub fn with_writer<W: Write + Send + 'static>(writer: W, ui: &UiContext) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            color: ui.color,
            unicode: ui.unicode,
            verbose: ui.verbose > 0,
        }
    }

    fn write_line(&self, line: &str) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl UpdateEventSink for ConsoleEventSink {
    fn on_event(&self, event: UpdateEvent) {
        match event {
            UpdateEvent::StageFinished {
                stage,
                status,
                detail,
            } => self.write_line(&render_stage_line(
                stage,
                status,
                detail.as_deref(),
                self.color,
                self.unicode,
            )),
            UpdateEvent::PathCaptured { path, present } if self.verbose => {
                let state = if present { "captured" } else { "absent" };
                self.write_line(&format!(
                    "        {} {} {}",
                    Icon::Arrow.colored(self.color, self.unicode),
                    path.display(),
                    state
                ));
            }
            UpdateEvent::PathRestored { path, action } if self.verbose => {
                self.write_line(&format!(
                    "        {} {} {}",
                    Icon::Arrow.colored(self.color, self.unicode),
                    path.display(),
                    action
                ));
            }
            _ => {}
        }
    }

    fn wants_detailed_events(&self) -> bool {
        self.verbose
    }
}
