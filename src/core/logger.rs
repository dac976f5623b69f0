//! Symbol-scoped logging.
//!
//! Every asset gets its own [`AssetsLogger`]. Events are emitted through
//! `tracing` under an `assets{symbol=...}` span and carry a `[SYMBOL]` prefix,
//! so output stays attributable even before a subscriber installs span
//! formatting.

use std::fmt::Display;
use tracing::Span;

#[derive(Debug, Clone)]
pub struct AssetsLogger {
    symbol: String,
    span: Span,
}

impl AssetsLogger {
    /// Creates a logger scoped to `symbol`.
    pub fn new(symbol: &str) -> Self {
        let span = tracing::info_span!("assets", symbol = %symbol);
        Self { symbol: symbol.to_string(), span }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn debug(&self, message: impl Display) {
        tracing::debug!(parent: &self.span, "[{}] {}", self.symbol, message);
    }

    pub fn info(&self, message: impl Display) {
        tracing::info!(parent: &self.span, "[{}] {}", self.symbol, message);
    }

    pub fn warn(&self, message: impl Display) {
        tracing::warn!(parent: &self.span, "[{}] {}", self.symbol, message);
    }

    pub fn error(&self, message: impl Display) {
        tracing::error!(parent: &self.span, "[{}] {}", self.symbol, message);
    }
}
