//! Fallback quotes used when no authoritative price source is available.

use crate::seed::stream_id;
use core_types::{CoreError, to_decimal};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Reference spot price and volatility for well-known underlyings.
pub fn reference_quote(symbol: &str) -> Option<(Decimal, f64)> {
    let quote = match symbol {
        "SPY" => (dec!(450.00), 0.18),
        "QQQ" => (dec!(380.00), 0.22),
        "IWM" => (dec!(195.00), 0.24),
        "DIA" => (dec!(345.00), 0.16),
        "AAPL" => (dec!(175.00), 0.25),
        "MSFT" => (dec!(330.00), 0.24),
        "NVDA" => (dec!(450.00), 0.45),
        "TSLA" => (dec!(240.00), 0.45),
        "AMZN" => (dec!(130.00), 0.30),
        "GOOGL" => (dec!(135.00), 0.28),
        "META" => (dec!(300.00), 0.32),
        "AMD" => (dec!(105.00), 0.42),
        "NFLX" => (dec!(400.00), 0.35),
        "JPM" => (dec!(145.00), 0.20),
        "XOM" => (dec!(110.00), 0.22),
        "F" => (dec!(12.50), 0.35),
        "BAC" => (dec!(28.00), 0.26),
        _ => return None,
    };
    Some(quote)
}

/// A deterministic pseudo-random quote keyed on the symbol alone.
///
/// Price falls in [20, 500) rounded to cents, volatility in [0.20, 0.45).
pub fn generated_quote(symbol: &str) -> Result<(Decimal, f64), CoreError> {
    let mut rng = ChaCha8Rng::seed_from_u64(stream_id(&["underlying", symbol]));
    let price = rng.gen_range(20.0..500.0);
    let iv: f64 = rng.gen_range(0.20..0.45);
    Ok((to_decimal(price, "generated price")?.round_dp(2), (iv * 10_000.0).round() / 10_000.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_quotes_are_deterministic_and_bounded() {
        let first = generated_quote("ZZZT").unwrap();
        let second = generated_quote("ZZZT").unwrap();
        assert_eq!(first, second);

        for symbol in ["ABCD", "WXYZ", "QRST", "LMNO"] {
            let (price, iv) = generated_quote(symbol).unwrap();
            assert!(price >= dec!(20) && price <= dec!(500), "{} -> {}", symbol, price);
            assert!((0.20..=0.45).contains(&iv), "{} -> {}", symbol, iv);
        }
    }

    #[test]
    fn well_known_symbols_have_reference_quotes() {
        assert_eq!(reference_quote("SPY"), Some((dec!(450.00), 0.18)));
        assert!(reference_quote("spy").is_none(), "lookup expects normalised symbols");
        assert!(reference_quote("UNKNOWN").is_none());
    }
}
