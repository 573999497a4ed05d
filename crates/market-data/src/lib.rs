//! # Optilab Market Data
//!
//! Resolves a spot price and an implied-volatility seed for an underlying symbol.
//!
//! Resolution order:
//! 1. an authoritative [`QuoteSource`] supplied by the caller, when it has a usable quote;
//! 2. the fixed reference table of well-known symbols;
//! 3. a deterministic quote derived from the symbol itself.
//!
//! Steps 2 and 3 are synthetic. Every [`ResolvedUnderlying`] carries its [`PriceOrigin`]
//! so responses built from it can say so. Resolution never blocks: fetching live data is
//! the caller's job, done before a `QuoteSource` is handed in.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub mod error;
pub mod reference;
pub mod seed;

pub use error::MarketDataError;
pub use seed::stream_id;

/// Attached to every response built from synthetic underlying data.
pub const SYNTHETIC_CAVEAT: &str = "Synthetic data: underlying prices and volatilities come from a \
reference table or a deterministic generator, and contract liquidity is simulated. Do not use \
these numbers for real trading decisions.";

/// A quote from an authoritative source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnderlyingQuote {
    pub price: Decimal,
    pub implied_volatility: f64,
}

/// The generic interface for an authoritative price source.
///
/// Returning `None` means the source has nothing for the symbol; the resolver then
/// falls back to synthetic data. Implementations must not block.
pub trait QuoteSource: Send + Sync {
    fn quote(&self, symbol: &str) -> Option<UnderlyingQuote>;
}

/// An in-memory `QuoteSource`, typically filled from a snapshot the caller fetched.
#[derive(Debug, Clone, Default)]
pub struct QuoteTable {
    quotes: HashMap<String, UnderlyingQuote>,
}

impl QuoteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: &str, quote: UnderlyingQuote) {
        self.quotes.insert(normalize_symbol(symbol), quote);
    }
}

impl QuoteSource for QuoteTable {
    fn quote(&self, symbol: &str) -> Option<UnderlyingQuote> {
        self.quotes.get(symbol).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceOrigin {
    Live,
    Reference,
    Generated,
}

impl PriceOrigin {
    pub fn is_synthetic(&self) -> bool {
        !matches!(self, PriceOrigin::Live)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedUnderlying {
    pub symbol: String,
    pub price: Decimal,
    pub iv_seed: f64,
    pub origin: PriceOrigin,
}

/// Trims and upper-cases a ticker.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

#[derive(Clone, Default)]
pub struct PriceResolver {
    source: Option<Arc<dyn QuoteSource>>,
}

impl PriceResolver {
    /// A resolver with no authoritative source; every quote is synthetic.
    pub fn synthetic() -> Self {
        Self { source: None }
    }

    pub fn with_source(source: Arc<dyn QuoteSource>) -> Self {
        Self {
            source: Some(source),
        }
    }

    /// Whether an authoritative quote source was supplied. Without one every quote is synthetic.
    pub fn has_live_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn resolve(&self, symbol: &str) -> Result<ResolvedUnderlying, MarketDataError> {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return Err(core_types::CoreError::InvalidInput(
                "symbol".to_string(),
                "symbol must not be blank".to_string(),
            )
            .into());
        }

        if let Some(quote) = self.source.as_ref().and_then(|s| s.quote(&symbol)) {
            match validate_quote(&symbol, &quote) {
                Ok(()) => {
                    return Ok(ResolvedUnderlying {
                        symbol,
                        price: quote.price,
                        iv_seed: quote.implied_volatility,
                        origin: PriceOrigin::Live,
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding live quote, using synthetic fallback.");
                }
            }
        }

        let (price, iv_seed, origin) = match reference::reference_quote(&symbol) {
            Some((price, iv)) => (price, iv, PriceOrigin::Reference),
            None => {
                let (price, iv) = reference::generated_quote(&symbol)?;
                (price, iv, PriceOrigin::Generated)
            }
        };
        tracing::debug!(%symbol, %price, iv_seed, ?origin, "Resolved synthetic underlying.");

        Ok(ResolvedUnderlying {
            symbol,
            price,
            iv_seed,
            origin,
        })
    }

    /// Resolves every distinct symbol once, in first-seen order.
    ///
    /// Symbols that normalize to the same ticker (`"SPY"`, `" spy"`) collapse to one entry.
    pub fn resolve_all(&self, symbols: &[String]) -> Result<Vec<ResolvedUnderlying>, MarketDataError> {
        let mut seen = HashSet::new();
        symbols
            .iter()
            .filter(|s| seen.insert(normalize_symbol(s)))
            .map(|s| self.resolve(s))
            .collect()
    }
}

fn validate_quote(symbol: &str, quote: &UnderlyingQuote) -> Result<(), MarketDataError> {
    let reason = if quote.price <= Decimal::ZERO {
        "price must be positive"
    } else if !(quote.implied_volatility.is_finite() && quote.implied_volatility > 0.0) {
        "implied volatility must be positive and finite"
    } else {
        return Ok(());
    };
    Err(MarketDataError::InvalidQuote {
        symbol: symbol.to_string(),
        reason: reason.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn table_with(symbol: &str, price: Decimal, iv: f64) -> Arc<dyn QuoteSource> {
        let mut table = QuoteTable::new();
        table.insert(symbol, UnderlyingQuote { price, implied_volatility: iv });
        Arc::new(table)
    }

    #[test]
    fn live_source_takes_precedence() {
        let resolver = PriceResolver::with_source(table_with("spy", dec!(512.34), 0.14));
        assert!(resolver.has_live_source());
        assert!(!PriceResolver::synthetic().has_live_source());
        let resolved = resolver.resolve(" SPY ").unwrap();
        assert_eq!(resolved.symbol, "SPY");
        assert_eq!(resolved.price, dec!(512.34));
        assert_eq!(resolved.origin, PriceOrigin::Live);
        assert!(!resolved.origin.is_synthetic());
    }

    #[test]
    fn falls_back_to_reference_then_generated() {
        let resolver = PriceResolver::with_source(table_with("SPY", dec!(512.34), 0.14));

        let qqq = resolver.resolve("qqq").unwrap();
        assert_eq!(qqq.origin, PriceOrigin::Reference);
        assert_eq!(qqq.price, dec!(380.00));

        let odd = resolver.resolve("ZQXJ").unwrap();
        assert_eq!(odd.origin, PriceOrigin::Generated);
        assert!(odd.origin.is_synthetic());
        assert_eq!(odd, resolver.resolve("zqxj").unwrap());
    }

    #[test]
    fn unusable_live_quote_is_replaced() {
        let resolver = PriceResolver::with_source(table_with("AAPL", dec!(0), 0.3));
        let resolved = resolver.resolve("AAPL").unwrap();
        assert_eq!(resolved.origin, PriceOrigin::Reference);
        assert_eq!(resolved.price, dec!(175.00));
    }

    #[test]
    fn resolve_all_collapses_repeated_symbols() {
        let symbols = ["SPY", "qqq", " spy", "QQQ", "AAPL"].map(String::from);
        let resolved = PriceResolver::synthetic().resolve_all(&symbols).unwrap();
        let tickers: Vec<&str> = resolved.iter().map(|u| u.symbol.as_str()).collect();
        assert_eq!(tickers, vec!["SPY", "QQQ", "AAPL"]);
    }

    #[test]
    fn blank_symbol_is_rejected() {
        let err = PriceResolver::synthetic().resolve("   ").unwrap_err();
        assert!(matches!(err, MarketDataError::Validation(_)));
    }
}
