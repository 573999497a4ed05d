use crate::error::CoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Both option types, calls first. This is the default type filter.
    pub fn all() -> Vec<OptionType> {
        vec![OptionType::Call, OptionType::Put]
    }

    /// Value of exercising one share at `spot`.
    pub fn intrinsic(&self, spot: Decimal, strike: Decimal) -> Decimal {
        match self {
            OptionType::Call => (spot - strike).max(Decimal::ZERO),
            OptionType::Put => (strike - spot).max(Decimal::ZERO),
        }
    }

    /// The single-letter code used in OCC-style contract symbols.
    pub fn code(&self) -> char {
        match self {
            OptionType::Call => 'C',
            OptionType::Put => 'P',
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

impl FromStr for OptionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            other => Err(CoreError::InvalidInput(
                "option type".to_string(),
                format!("'{}' is neither call nor put", other),
            )),
        }
    }
}

/// Whether a strategy leg is bought or sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionAction {
    Buy,
    Sell,
}

impl OptionAction {
    /// +1 for a long position, -1 for a short one.
    pub fn sign(&self) -> Decimal {
        match self {
            OptionAction::Buy => Decimal::ONE,
            OptionAction::Sell => Decimal::NEGATIVE_ONE,
        }
    }
}

impl fmt::Display for OptionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionAction::Buy => write!(f, "Long"),
            OptionAction::Sell => write!(f, "Short"),
        }
    }
}

impl FromStr for OptionAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" | "long" | "b" => Ok(OptionAction::Buy),
            "sell" | "short" | "s" => Ok(OptionAction::Sell),
            other => Err(CoreError::InvalidInput(
                "action".to_string(),
                format!("'{}' is neither buy nor sell", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Moneyness {
    Itm,
    Atm,
    Otm,
}

impl Moneyness {
    /// Classifies a strike against the underlying price.
    ///
    /// A strike within `atm_tolerance_pct` of spot (relative distance, inclusive) is
    /// at the money. Outside the band a call is in the money when its strike is below
    /// spot and a put when its strike is above.
    pub fn classify(
        option_type: OptionType,
        strike: Decimal,
        spot: Decimal,
        atm_tolerance_pct: Decimal,
    ) -> Moneyness {
        if spot > Decimal::ZERO && (strike - spot).abs() / spot <= atm_tolerance_pct {
            return Moneyness::Atm;
        }
        let strike_below_spot = strike < spot;
        match (option_type, strike_below_spot) {
            (OptionType::Call, true) | (OptionType::Put, false) => Moneyness::Itm,
            (OptionType::Call, false) | (OptionType::Put, true) => Moneyness::Otm,
        }
    }
}

impl fmt::Display for Moneyness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Moneyness::Itm => write!(f, "ITM"),
            Moneyness::Atm => write!(f, "ATM"),
            Moneyness::Otm => write!(f, "OTM"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn intrinsic_value_by_type() {
        assert_eq!(OptionType::Call.intrinsic(dec!(110), dec!(100)), dec!(10));
        assert_eq!(OptionType::Call.intrinsic(dec!(90), dec!(100)), dec!(0));
        assert_eq!(OptionType::Put.intrinsic(dec!(90), dec!(100)), dec!(10));
        assert_eq!(OptionType::Put.intrinsic(dec!(110), dec!(100)), dec!(0));
    }

    #[test]
    fn moneyness_is_symmetric_between_calls_and_puts() {
        let spot = dec!(100);
        let tol = dec!(0.005);

        assert_eq!(Moneyness::classify(OptionType::Call, dec!(95), spot, tol), Moneyness::Itm);
        assert_eq!(Moneyness::classify(OptionType::Call, dec!(105), spot, tol), Moneyness::Otm);
        assert_eq!(Moneyness::classify(OptionType::Put, dec!(105), spot, tol), Moneyness::Itm);
        assert_eq!(Moneyness::classify(OptionType::Put, dec!(95), spot, tol), Moneyness::Otm);

        // Inside the tolerance band both types are ATM.
        assert_eq!(Moneyness::classify(OptionType::Call, dec!(100.5), spot, tol), Moneyness::Atm);
        assert_eq!(Moneyness::classify(OptionType::Put, dec!(99.5), spot, tol), Moneyness::Atm);
        assert_eq!(Moneyness::classify(OptionType::Put, dec!(100), spot, tol), Moneyness::Atm);
    }

    #[test]
    fn parses_cli_spellings() {
        assert_eq!("CALL".parse::<OptionType>().unwrap(), OptionType::Call);
        assert_eq!("p".parse::<OptionType>().unwrap(), OptionType::Put);
        assert_eq!("short".parse::<OptionAction>().unwrap(), OptionAction::Sell);
        assert!("straddle".parse::<OptionType>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Moneyness::Itm).unwrap(), "\"itm\"");
        assert_eq!(serde_json::to_string(&OptionType::Put).unwrap(), "\"put\"");
        assert_eq!(
            serde_json::from_str::<OptionAction>("\"sell\"").unwrap(),
            OptionAction::Sell
        );
    }
}
