//! Sleep-deficit classification
//!
//! A night's sleep is compared with the age band's minimum and optimal
//! hours:
//!
//! - at or above optimal: no deficit
//! - at or above the minimum: mild
//! - within 1.5 h below the minimum: moderate
//! - anything less: severe

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cycles::parse_sleep_duration;
use crate::models::{AgeBand, SleepDeficitLevel};

/// How far below the minimum a night can fall and still count as moderate
const MODERATE_MARGIN_HOURS: Decimal = dec!(1.5);

/// Deficit level for a night's sleep plus the message shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeficitAssessment {
    pub level: SleepDeficitLevel,
    pub sleep_minutes: u32,
    pub age_band: AgeBand,

    /// Present whenever `level` is not `None`
    pub warning: Option<String>,
}

impl DeficitAssessment {
    pub fn sleep_hours(&self) -> Decimal {
        minutes_to_hours(self.sleep_minutes)
    }
}

fn minutes_to_hours(minutes: u32) -> Decimal {
    Decimal::from(minutes) / dec!(60)
}

/// Sleep-deficit classification utilities
pub struct DeficitClassifier;

impl DeficitClassifier {
    /// Classify latency-adjusted sleep minutes for an age band
    pub fn classify(sleep_minutes: u32, age_band: AgeBand) -> SleepDeficitLevel {
        let hours = minutes_to_hours(sleep_minutes);
        let need = age_band.sleep_need();

        if hours >= need.optimal_hours {
            SleepDeficitLevel::None
        } else if hours >= need.minimum_hours {
            SleepDeficitLevel::Mild
        } else if hours >= need.minimum_hours - MODERATE_MARGIN_HOURS {
            SleepDeficitLevel::Moderate
        } else {
            SleepDeficitLevel::Severe
        }
    }

    /// Classify a formatted duration such as `"7 hours 30 mins"`
    ///
    /// Returns `None` when the text is not a duration this crate produced.
    pub fn classify_duration_label(label: &str, age_band: AgeBand) -> Option<SleepDeficitLevel> {
        match parse_sleep_duration(label) {
            Some(minutes) => Some(Self::classify(minutes, age_band)),
            None => {
                warn!(label, "Unrecognised sleep duration label");
                None
            }
        }
    }

    /// Full assessment with warning text
    pub fn assess(sleep_minutes: u32, age_band: AgeBand) -> DeficitAssessment {
        let level = Self::classify(sleep_minutes, age_band);
        debug!(sleep_minutes, age_band = %age_band, level = %level, "Classified sleep deficit");

        DeficitAssessment {
            level,
            sleep_minutes,
            age_band,
            warning: Self::warning_message(level).map(str::to_string),
        }
    }

    /// Warning for a deficit level; `None` when there is no deficit
    pub fn warning_message(level: SleepDeficitLevel) -> Option<&'static str> {
        match level {
            SleepDeficitLevel::None => None,
            SleepDeficitLevel::Mild => Some(
                "You'll get slightly less than the ideal amount of sleep. \
                 Consider a short nap to compensate.",
            ),
            SleepDeficitLevel::Moderate => Some(
                "With this schedule, you'll get less than the recommended sleep for your age group. \
                 Additional nap times are recommended to help you stay alert.",
            ),
            SleepDeficitLevel::Severe => Some(
                "This schedule results in significant sleep deprivation. \
                 Multiple strategic naps are strongly recommended, including a 90-minute full-cycle nap if possible.",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: u32 = 60;

    #[test]
    fn test_adult_boundaries() {
        let adult = AgeBand::Adult;
        assert_eq!(DeficitClassifier::classify(8 * HOUR, adult), SleepDeficitLevel::None);
        assert_eq!(DeficitClassifier::classify(7 * HOUR + 30, adult), SleepDeficitLevel::Mild);
        assert_eq!(DeficitClassifier::classify(7 * HOUR, adult), SleepDeficitLevel::Mild);
        assert_eq!(DeficitClassifier::classify(6 * HOUR, adult), SleepDeficitLevel::Moderate);
        assert_eq!(DeficitClassifier::classify(5 * HOUR + 30, adult), SleepDeficitLevel::Moderate);
        assert_eq!(DeficitClassifier::classify(5 * HOUR + 29, adult), SleepDeficitLevel::Severe);
        assert_eq!(DeficitClassifier::classify(5 * HOUR, adult), SleepDeficitLevel::Severe);
    }

    #[test]
    fn test_teen_and_older_adult_boundaries() {
        assert_eq!(DeficitClassifier::classify(9 * HOUR, AgeBand::Teen), SleepDeficitLevel::None);
        assert_eq!(DeficitClassifier::classify(8 * HOUR, AgeBand::Teen), SleepDeficitLevel::Mild);
        assert_eq!(DeficitClassifier::classify(7 * HOUR, AgeBand::Teen), SleepDeficitLevel::Moderate);
        assert_eq!(DeficitClassifier::classify(6 * HOUR, AgeBand::Teen), SleepDeficitLevel::Severe);

        let older = AgeBand::OlderAdult;
        assert_eq!(DeficitClassifier::classify(7 * HOUR + 30, older), SleepDeficitLevel::None);
        assert_eq!(DeficitClassifier::classify(7 * HOUR + 29, older), SleepDeficitLevel::Mild);
    }

    #[test]
    fn test_classify_from_label_matches_minutes() {
        assert_eq!(
            DeficitClassifier::classify_duration_label("7 hours 30 mins", AgeBand::Adult),
            Some(SleepDeficitLevel::Mild)
        );
        assert_eq!(
            DeficitClassifier::classify_duration_label("4 hours 30 mins", AgeBand::Adult),
            Some(SleepDeficitLevel::Severe)
        );
        assert_eq!(
            DeficitClassifier::classify_duration_label("about seven", AgeBand::Adult),
            None
        );
    }

    #[test]
    fn test_assessment_warning_only_with_deficit() {
        let rested = DeficitClassifier::assess(9 * HOUR, AgeBand::Adult);
        assert_eq!(rested.level, SleepDeficitLevel::None);
        assert!(rested.warning.is_none());
        assert_eq!(rested.sleep_hours(), dec!(9));

        let short = DeficitClassifier::assess(6 * HOUR, AgeBand::Adult);
        assert_eq!(short.level, SleepDeficitLevel::Moderate);
        assert_eq!(
            short.warning.unwrap(),
            "With this schedule, you'll get less than the recommended sleep for your age group. \
             Additional nap times are recommended to help you stay alert."
        );

        let none = DeficitClassifier::assess(7 * HOUR + 30, AgeBand::OlderAdult);
        assert_eq!(none.level, SleepDeficitLevel::None);

        let mild = DeficitClassifier::assess(7 * HOUR, AgeBand::OlderAdult);
        assert_eq!(
            mild.warning.unwrap(),
            "You'll get slightly less than the ideal amount of sleep. Consider a short nap to compensate."
        );

        let severe = DeficitClassifier::assess(4 * HOUR + 30, AgeBand::Adult);
        assert_eq!(
            severe.warning.unwrap(),
            "This schedule results in significant sleep deprivation. Multiple strategic naps are \
             strongly recommended, including a 90-minute full-cycle nap if possible."
        );
    }
}
