//! Diagnostics sink
//!
//! `warn` reports recoverable anomalies. `fatal` reports defects (a malformed
//! table or a broken invariant) and never returns.

use std::fmt;

pub trait Diagnostics {
    fn warn(&self, args: fmt::Arguments<'_>);

    fn fatal(&self, args: fmt::Arguments<'_>) -> !;
}

/// Routes diagnostics through the `log` facade; fatal conditions panic after logging.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn warn(&self, args: fmt::Arguments<'_>) {
        log::warn!("{}", args);
    }

    fn fatal(&self, args: fmt::Arguments<'_>) -> ! {
        log::error!("{}", args);
        panic!("aml: {}", args);
    }
}
