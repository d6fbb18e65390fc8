//! cliclack theme

use cliclack::ThemeState;
use console::Style;

/// Magenta prompt bar; everything else uses cliclack's defaults
#[derive(Debug, Clone, Default)]
pub struct PartsbinTheme;

impl cliclack::Theme for PartsbinTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().magenta(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().magenta().dim(),
        }
    }
}

/// Install the theme for all prompts and spinners
pub fn init_theme() {
    cliclack::set_theme(PartsbinTheme);
}
