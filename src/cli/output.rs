//! Output formatting for CLI commands

use serde::Serialize;
use tracing::debug;

pub use crate::storage::OutputFormat;

/// Prints command results in the selected format
///
/// Diagnostics never go to stdout: progress notes are `debug` events on
/// stderr, shown with `--verbose` or `PLUGREG_LOG`.
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Prints a success message, wrapped in an object in JSON mode
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "success": true, "message": message }))
            }
        }
    }

    /// Prints structured data; compact in JSON mode, pretty otherwise
    pub fn data<T: Serialize>(&self, data: &T) {
        let rendered = match self.format {
            OutputFormat::Text => serde_json::to_string_pretty(data),
            OutputFormat::Json => serde_json::to_string(data),
        };
        if let Ok(json) = rendered {
            println!("{}", json);
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Records a progress note for one command step
    pub fn verbose_ctx(&self, step: &str, message: &str) {
        debug!(target: "plugreg::cli", step, "{}", message);
    }
}
