use inplace::config::ConfigWarning;

use crate::ui::primitives::icon::Icon;
use crate::ui::widgets::r#box::{Box, BoxStyle};

/// Boxed list of unknown configuration keys
pub fn render_config_warnings(
    warnings: &[ConfigWarning],
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    if warnings.is_empty() {
        return String::new();
    }

    let header = format!(
        "{} Configuration",
        Icon::Warning.colored(supports_color, supports_unicode)
    );
    let mut b = Box::with_title(header).style(BoxStyle::Warning);
    for warning in warnings {
        b.add_line(warning.message());
    }
    b.render(supports_color, supports_unicode)
}
