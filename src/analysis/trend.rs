use derive_more::Display;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendDirection {
    #[display("BULLISH")]
    Bullish,
    #[display("BEARISH")]
    Bearish,
    #[display("NEUTRAL")]
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum TrendStrength {
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendResult {
    pub direction: TrendDirection,
    pub strength: TrendStrength,
}

/// Number of pairwise comparisons that vote on the trend.
const VOTES: usize = 5;
/// Votes needed for a directional call.
const MAJORITY: usize = 4;

/// Classify the trend from the latest close and the latest 20/50/200 EMAs.
///
/// Each comparison that does not vote bullish (including equality) votes bearish.
pub fn classify(close: f64, ema20: f64, ema50: f64, ema200: f64) -> TrendResult {
    let bullish = [
        close > ema20,
        close > ema50,
        close > ema200,
        ema20 > ema50,
        ema50 > ema200,
    ]
    .into_iter()
    .filter(|&vote| vote)
    .count();
    let bearish = VOTES - bullish;

    let (direction, votes) = if bullish >= MAJORITY {
        (TrendDirection::Bullish, bullish)
    } else if bearish >= MAJORITY {
        (TrendDirection::Bearish, bearish)
    } else {
        return TrendResult {
            direction: TrendDirection::Neutral,
            strength: TrendStrength::Weak,
        };
    };

    let strength = if votes == VOTES {
        TrendStrength::Strong
    } else {
        TrendStrength::Moderate
    };
    TrendResult {
        direction,
        strength,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_stacked_uptrend_is_strong_bullish() {
        let result = classify(110.0, 105.0, 100.0, 90.0);
        assert_eq!(result.direction, TrendDirection::Bullish);
        assert_eq!(result.strength, TrendStrength::Strong);
    }

    #[test]
    fn fully_stacked_downtrend_is_strong_bearish() {
        let result = classify(80.0, 85.0, 90.0, 100.0);
        assert_eq!(result.direction, TrendDirection::Bearish);
        assert_eq!(result.strength, TrendStrength::Strong);
    }

    #[test]
    fn four_votes_is_moderate() {
        // ema50 == ema200 votes bearish
        let result = classify(134.0, 124.5, 117.0, 117.0);
        assert_eq!(result.direction, TrendDirection::Bullish);
        assert_eq!(result.strength, TrendStrength::Moderate);

        // close above ema20 only
        let result = classify(86.0, 85.0, 90.0, 100.0);
        assert_eq!(result.direction, TrendDirection::Bearish);
        assert_eq!(result.strength, TrendStrength::Moderate);
    }

    #[test]
    fn three_two_split_is_neutral_weak() {
        // bullish: close>ema20, close>ema50, close>ema200; bearish: ema20<ema50, ema50<ema200
        let result = classify(120.0, 100.0, 105.0, 110.0);
        assert_eq!(result.direction, TrendDirection::Neutral);
        assert_eq!(result.strength, TrendStrength::Weak);
    }

    #[test]
    fn all_equal_is_strong_bearish() {
        let result = classify(100.0, 100.0, 100.0, 100.0);
        assert_eq!(result.direction, TrendDirection::Bearish);
        assert_eq!(result.strength, TrendStrength::Strong);
    }

    #[test]
    fn trend_serializes_with_wire_labels() {
        let json = serde_json::to_value(classify(110.0, 105.0, 100.0, 90.0)).unwrap();
        assert_eq!(json["direction"], "BULLISH");
        assert_eq!(json["strength"], "Strong");
    }
}
