//! # Command-Line Interface
//!
//! The `plugreg` binary inspects plugin manifests and simulates `require`.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `init` | Create `.plugreg/config.toml` and a starter manifest |
//! | `list`, `show` | Browse declared plugins |
//! | `check` | Report undefined dependencies and cycles |
//! | `order` | Depth-first build order for one plugin |
//! | `resolve` | Require a plugin N times from a fresh registry |
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! Use `--verbose` (or `-v`) for progress notes and registry debug logs;
//! `PLUGREG_LOG` sets the log filter directly.

mod app;
mod check;
mod inspect;
mod logging;
mod output;
mod resolve;
mod session;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
