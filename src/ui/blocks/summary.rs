use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;
use crate::ui::widgets::r#box::{Box, BoxStyle};

/// Boxed end-of-run summary
#[derive(Debug, Clone)]
pub struct ResultSummary {
    title: String,
    style: BoxStyle,
    icon: Icon,
    facts: Vec<(String, String)>,
    warnings: Vec<String>,
    next_step: Option<String>,
}

impl ResultSummary {
    fn new(title: impl Into<String>, style: BoxStyle, icon: Icon) -> Self {
        Self {
            title: title.into(),
            style,
            icon,
            facts: Vec::new(),
            warnings: Vec::new(),
            next_step: None,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(title, BoxStyle::Success, Icon::Success)
    }

    pub fn partial(title: impl Into<String>) -> Self {
        Self::new(title, BoxStyle::Warning, Icon::Warning)
    }

    pub fn failure(title: impl Into<String>) -> Self {
        Self::new(title, BoxStyle::Error, Icon::Error)
    }

    pub fn add_fact(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.facts.push((label.into(), value.into()));
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn with_next_step(&mut self, hint: impl Into<String>) {
        self.next_step = Some(hint.into());
    }

    pub fn render(&self, supports_color: bool, supports_unicode: bool) -> String {
        let title = match self.style {
            BoxStyle::Success => ColoredText::success(self.title.as_str()),
            BoxStyle::Error => ColoredText::error(self.title.as_str()),
            _ => ColoredText::warning(self.title.as_str()),
        }
        .bold()
        .render(supports_color);

        let header = format!(
            "{} {}",
            self.icon.colored(supports_color, supports_unicode),
            title
        );

        let mut b = Box::with_title(header).style(self.style);
        b.add_empty();

        for (label, value) in &self.facts {
            b.add_line(format!("{}: {}", label, value));
        }

        if !self.warnings.is_empty() {
            b.add_empty();
            for warning in &self.warnings {
                b.add_line(format!(
                    "{} {}",
                    Icon::Warning.colored(supports_color, supports_unicode),
                    warning
                ));
            }
        }

        if let Some(next_step) = &self.next_step {
            b.add_empty();
            b.add_line(format!(
                "{} {} {}",
                Icon::Arrow.colored(supports_color, supports_unicode),
                ColoredText::dim("Next:").render(supports_color),
                next_step
            ));
        }

        b.render(supports_color, supports_unicode)
    }
}
