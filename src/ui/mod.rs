//! Terminal output for partsbin commands
//!
//! Uses `cliclack` for prompts and spinners in a terminal, with plain
//! line output in CI and when piped.

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    intro, key_value, outro_success, outro_warn, remark, step_info, step_ok, step_ok_detail,
    step_warn_hint,
};
pub use progress::TaskSpinner;
pub use prompts::confirm;
pub use theme::{init_theme, PartsbinTheme};
