use core_types::{OptionAction, OptionType, StrategyLeg};
use serde::{Serialize, Serializer};
use std::fmt;

/// Best-effort label for a set of legs. Degenerate combinations may be mislabelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyShape {
    Single(OptionAction, OptionType),
    CallSpread,
    PutSpread,
    Straddle,
    Strangle,
    IronCondor,
    Custom,
}

impl StrategyShape {
    pub fn classify(legs: &[StrategyLeg]) -> Self {
        match legs {
            [leg] => StrategyShape::Single(leg.action, leg.option_type),
            [a, b] if a.option_type == b.option_type && a.action != b.action => match a.option_type {
                OptionType::Call => StrategyShape::CallSpread,
                OptionType::Put => StrategyShape::PutSpread,
            },
            [a, b] if a.option_type != b.option_type => {
                if a.strike_price == b.strike_price {
                    StrategyShape::Straddle
                } else {
                    StrategyShape::Strangle
                }
            }
            [_, _, _, _] => StrategyShape::IronCondor,
            _ => StrategyShape::Custom,
        }
    }
}

impl fmt::Display for StrategyShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StrategyShape::Single(action, option_type) => {
                let kind = match option_type {
                    OptionType::Call => "Call",
                    OptionType::Put => "Put",
                };
                write!(f, "{} {}", action, kind)
            }
            StrategyShape::CallSpread => write!(f, "Call Spread"),
            StrategyShape::PutSpread => write!(f, "Put Spread"),
            StrategyShape::Straddle => write!(f, "Straddle"),
            StrategyShape::Strangle => write!(f, "Strangle"),
            StrategyShape::IronCondor => write!(f, "Iron Condor"),
            StrategyShape::Custom => write!(f, "Custom Strategy"),
        }
    }
}

impl Serialize for StrategyShape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn leg(option_type: OptionType, action: OptionAction, strike: Decimal) -> StrategyLeg {
        StrategyLeg {
            strike_price: strike,
            option_type,
            action,
            quantity: 1,
            premium: dec!(1),
        }
    }

    #[test]
    fn labels_follow_leg_patterns() {
        use OptionAction::*;
        use OptionType::*;

        let cases = [
            (vec![leg(Call, Buy, dec!(100))], "Long Call"),
            (vec![leg(Put, Sell, dec!(100))], "Short Put"),
            (vec![leg(Call, Buy, dec!(100)), leg(Call, Sell, dec!(110))], "Call Spread"),
            (vec![leg(Put, Sell, dec!(95)), leg(Put, Buy, dec!(90))], "Put Spread"),
            (vec![leg(Call, Buy, dec!(100)), leg(Put, Buy, dec!(100))], "Straddle"),
            (vec![leg(Call, Sell, dec!(110)), leg(Put, Sell, dec!(90))], "Strangle"),
            (
                vec![
                    leg(Put, Buy, dec!(85)),
                    leg(Put, Sell, dec!(90)),
                    leg(Call, Sell, dec!(110)),
                    leg(Call, Buy, dec!(115)),
                ],
                "Iron Condor",
            ),
            (vec![leg(Call, Buy, dec!(100)), leg(Call, Buy, dec!(105))], "Custom Strategy"),
            (
                vec![leg(Call, Buy, dec!(100)), leg(Call, Sell, dec!(105)), leg(Call, Sell, dec!(110))],
                "Custom Strategy",
            ),
        ];
        for (legs, expected) in cases {
            assert_eq!(StrategyShape::classify(&legs).to_string(), expected);
        }
    }
}
