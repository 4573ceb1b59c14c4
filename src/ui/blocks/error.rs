use std::path::PathBuf;

use crate::ui::widgets::r#box::{Box, BoxStyle};

/// Boxed fatal error with an optional location and fix hint
#[derive(Debug, Clone)]
pub struct ErrorBlock {
    path: Option<PathBuf>,
    message: String,
    fix: Option<String>,
}

impl ErrorBlock {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            path: None,
            message: message.into(),
            fix: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }

    pub fn render(&self, supports_color: bool, supports_unicode: bool) -> String {
        let mut b = Box::with_title("ERROR").style(BoxStyle::Error);

        if let Some(path) = &self.path {
            b.add_line(path.display().to_string());
            b.add_empty();
        }
        b.add_line(self.message.clone());

        if let Some(fix) = &self.fix {
            b.add_empty();
            b.add_line(format!("FIX: {}", fix));
        }

        b.render(supports_color, supports_unicode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_path_message_and_fix() {
        let rendered = ErrorBlock::new("missing backend")
            .with_path("/srv/release")
            .with_fix("Point SOURCE at a release tree")
            .render(false, false);

        insta::assert_snapshot!(rendered, @r"
        +-------------------------------------+
        | ERROR                               |
        | /srv/release                        |
        |                                     |
        | missing backend                     |
        |                                     |
        | FIX: Point SOURCE at a release tree |
        +-------------------------------------+
        ");
    }
}
