//! Console Renderer
//!
//! [`RendererPort`] adapter that prints each tick's snapshot as a plain
//! table: symbol, company, price, change and percent change. Unresolved
//! quotes print only the symbol and the availability sentinel next to their
//! last-known numbers. Output failures are swallowed; a renderer problem is
//! never the polling loop's concern.

use std::io::Write;

use crate::application::ports::RendererPort;
use crate::domain::quote::Quote;

/// Writes quote snapshots to stdout.
#[derive(Debug, Default)]
pub struct ConsoleRenderer;

impl ConsoleRenderer {
    /// Create a console renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Format one snapshot into `out`.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the sink; `render` swallows them.
    fn write_table<W: Write>(quotes: &[Quote], out: &mut W) -> std::io::Result<()> {
        for quote in quotes {
            if quote.is_resolved() {
                let percent = quote
                    .percent_change()
                    .map_or_else(|| "     --".to_string(), |p| format!("{p:+6.2}%"));
                writeln!(
                    out,
                    "{:<10} {:<30} {:>10.2} {:>+8.2} {percent}",
                    quote.symbol().as_str(),
                    quote.company_name(),
                    quote.price(),
                    quote.change(),
                )?;
            } else {
                writeln!(
                    out,
                    "{:<10} {:<30}",
                    quote.symbol().as_str(),
                    quote.company_name(),
                )?;
            }
        }
        writeln!(out)
    }
}

impl RendererPort for ConsoleRenderer {
    fn render(&self, quotes: &[Quote]) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        if let Err(error) = Self::write_table(quotes, &mut handle) {
            tracing::debug!(error = %error, "Console render failed");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
