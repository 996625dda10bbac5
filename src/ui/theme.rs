//! Custom theme for cliclack prompts

use cliclack::ThemeState;
use console::Style;

/// Magenta-accented theme used by all prompts
#[derive(Debug, Clone, Default)]
pub struct CrashTheme;

impl cliclack::Theme for CrashTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().magenta(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().magenta().dim(),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().magenta(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().green(),
        }
    }
}

/// Initialize the global theme
pub fn init_theme() {
    cliclack::set_theme(CrashTheme);
}
