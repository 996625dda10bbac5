//! Terminal output for the crash-analyzer CLI
//!
//! Uses `cliclack` for prompts and spinners when attached to a terminal and
//! falls back to plain lines in CI or when output is piped.
//!
//! # Example
//!
//! ```rust,ignore
//! use crash_analyzer::ui::{self, UiContext, TaskSpinner};
//!
//! let ctx = UiContext::detect();
//!
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Fetching artifacts for job 123...");
//! // ... do work ...
//! spinner.stop("Artifacts cached");
//!
//! let dump = ui::select_path(&ctx, "Select a dump file", &dumps).await?;
//! ```

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    intro, key_value, outro_success, path_list, remark, section, step_info, step_ok, step_warn,
};
pub use progress::{download_bar, TaskSpinner};
pub use prompts::{select, select_path};
pub use theme::{init_theme, CrashTheme};
