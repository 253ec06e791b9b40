//! Share-card text for a finished run

use crate::Wave;
use crate::format_thousands;
use crate::meta::daily::star_string;
use crate::sim::tier::TierGate;
use crate::tuning::ShareTuning;

/// 1..=5 stars; each threshold the wave strictly exceeds adds one
pub fn star_rating(tuning: &ShareTuning, wave: u32) -> u32 {
    1 + tuning.star_thresholds.iter().filter(|&&t| wave > t).count() as u32
}

pub fn share_text(tuning: &ShareTuning, tiers: &TierGate, score: u64, wave: Wave, accuracy: u32) -> String {
    format!(
        "SPACE INVADERS \u{1F579}\u{FE0F}\nScore: {} \u{2502} Wave: {} \u{2502} Rank: {} \u{2502} Accuracy: {}%\n{}",
        format_thousands(score),
        wave,
        tiers.tier(wave).rank_name(),
        accuracy,
        star_string(star_rating(tuning, wave.get()))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_thresholds_are_strict() {
        let tuning = ShareTuning::default();
        assert_eq!(star_rating(&tuning, 3), 1);
        assert_eq!(star_rating(&tuning, 4), 2);
        assert_eq!(star_rating(&tuning, 10), 4);
        assert_eq!(star_rating(&tuning, 15), 5);
    }

    #[test]
    fn test_share_text() {
        let text = share_text(
            &ShareTuning::default(),
            &TierGate::default(),
            54_321,
            Wave::new(8).unwrap(),
            81,
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "Score: 54,321 \u{2502} Wave: 8 \u{2502} Rank: Veteran \u{2502} Accuracy: 81%"
        );
        assert_eq!(lines[2], "★★★☆☆");
    }
}
