//! Sleep-cycle arithmetic
//!
//! Candidate bedtimes and wake-up times are found by stepping through whole
//! 90-minute sleep cycles and allowing a fixed 14 minutes to fall asleep:
//!
//! - bedtime  = wake − latency − cycles × 90
//! - wake     = bedtime + latency + cycles × 90
//!
//! Both directions generate the most-sleep option first.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::models::{TimeOfDay, MINUTES_PER_DAY};

/// One complete NREM + REM cycle
pub const SLEEP_CYCLE_MINUTES: u32 = 90;

/// Average time a healthy adult takes to fall asleep
pub const SLEEP_ONSET_MINUTES: u32 = 14;

/// Fewest whole cycles offered as a candidate
pub const MIN_SLEEP_CYCLES: u32 = 3;

/// Most whole cycles offered as a candidate
pub const MAX_SLEEP_CYCLES: u32 = 6;

/// Placeholder sunrise used to pick the best wake-up time (06:30)
pub const REFERENCE_SUNRISE_MINUTES: u16 = 6 * 60 + 30;

/// Percent of total sleep spent in each stage for a healthy adult
const STAGE_N1_PERCENT: u32 = 5;
const STAGE_N2_PERCENT: u32 = 45;
const STAGE_N3_PERCENT: u32 = 25;

/// A generated bedtime or wake-up time with the sleep it provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub time: TimeOfDay,

    /// Latency-adjusted minutes actually asleep
    pub sleep_minutes: u32,

    /// Complete cycles in `sleep_minutes`
    pub cycles: u32,
}

impl Candidate {
    /// Candidate for a bedtime/wake pair; `time` is whichever end was generated
    fn between(time: TimeOfDay, bedtime: TimeOfDay, wake: TimeOfDay) -> Self {
        let sleep_minutes = CycleCalculator::sleep_minutes(bedtime, wake);
        Candidate {
            time,
            sleep_minutes,
            cycles: CycleCalculator::complete_cycles(sleep_minutes),
        }
    }

    /// `"<H> hours"` or `"<H> hours <M> mins"`
    pub fn duration_label(&self) -> String {
        format_sleep_duration(self.sleep_minutes)
    }
}

/// Estimated minutes per sleep stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepStageEstimate {
    pub light_n1_minutes: u32,
    pub light_n2_minutes: u32,
    pub deep_n3_minutes: u32,
    pub rem_minutes: u32,
}

impl SleepStageEstimate {
    /// Split a night using the typical 5/45/25/25 stage distribution
    ///
    /// REM takes the rounding remainder so the parts always sum to the total.
    pub fn for_sleep_minutes(sleep_minutes: u32) -> Self {
        let share = |percent: u32| (sleep_minutes * percent + 50) / 100;
        let light_n1_minutes = share(STAGE_N1_PERCENT);
        let light_n2_minutes = share(STAGE_N2_PERCENT);
        let deep_n3_minutes = share(STAGE_N3_PERCENT);
        let rem_minutes = sleep_minutes
            .saturating_sub(light_n1_minutes + light_n2_minutes + deep_n3_minutes);

        SleepStageEstimate {
            light_n1_minutes,
            light_n2_minutes,
            deep_n3_minutes,
            rem_minutes,
        }
    }

    pub fn total_minutes(&self) -> u32 {
        self.light_n1_minutes + self.light_n2_minutes + self.deep_n3_minutes + self.rem_minutes
    }
}

impl fmt::Display for SleepStageEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "N1 {} min, N2 {} min, deep {} min, REM {} min",
            self.light_n1_minutes, self.light_n2_minutes, self.deep_n3_minutes, self.rem_minutes
        )
    }
}

/// Sleep-cycle calculation utilities
pub struct CycleCalculator;

impl CycleCalculator {
    /// Cycle counts in generation order: most sleep first
    pub fn cycle_range() -> impl Iterator<Item = u32> {
        (MIN_SLEEP_CYCLES..=MAX_SLEEP_CYCLES).rev()
    }

    /// Minutes in bed for `cycles` whole cycles, including the onset latency
    pub fn time_in_bed(cycles: u32) -> i64 {
        (SLEEP_ONSET_MINUTES + cycles * SLEEP_CYCLE_MINUTES) as i64
    }

    /// Bedtime that gives exactly `cycles` cycles before `wake`
    pub fn bedtime_for(wake: TimeOfDay, cycles: u32) -> TimeOfDay {
        wake.add_minutes(-Self::time_in_bed(cycles))
    }

    /// Wake-up time after exactly `cycles` cycles from `bedtime`
    pub fn wake_time_for(bedtime: TimeOfDay, cycles: u32) -> TimeOfDay {
        bedtime.add_minutes(Self::time_in_bed(cycles))
    }

    /// Candidate bedtimes for a desired wake-up time, earliest bedtime first
    pub fn bedtimes(wake: TimeOfDay) -> Vec<Candidate> {
        let candidates: Vec<Candidate> = Self::cycle_range()
            .map(|cycles| {
                let bedtime = Self::bedtime_for(wake, cycles);
                Candidate::between(bedtime, bedtime, wake)
            })
            .collect();

        debug!(wake = %wake, count = candidates.len(), "Generated bedtime candidates");
        candidates
    }

    /// Candidate wake-up times for a bedtime, latest wake-up first
    pub fn wake_times(bedtime: TimeOfDay) -> Vec<Candidate> {
        let candidates: Vec<Candidate> = Self::cycle_range()
            .map(|cycles| {
                let wake = Self::wake_time_for(bedtime, cycles);
                Candidate::between(wake, bedtime, wake)
            })
            .collect();

        debug!(bedtime = %bedtime, count = candidates.len(), "Generated wake-up candidates");
        candidates
    }

    /// Minutes asleep between going to bed and waking, latency removed
    ///
    /// Crossing midnight is handled by the forward distance; a gap shorter
    /// than the latency yields zero.
    pub fn sleep_minutes(bedtime: TimeOfDay, wake: TimeOfDay) -> u32 {
        let in_bed = bedtime.minutes_until(wake) as u32;
        in_bed.saturating_sub(SLEEP_ONSET_MINUTES)
    }

    pub fn complete_cycles(sleep_minutes: u32) -> u32 {
        sleep_minutes / SLEEP_CYCLE_MINUTES
    }

    /// Formatted sleep duration between two times
    pub fn sleep_duration(bedtime: TimeOfDay, wake: TimeOfDay) -> String {
        format_sleep_duration(Self::sleep_minutes(bedtime, wake))
    }

    /// Whole cycles completed between two times
    pub fn sleep_cycles(bedtime: TimeOfDay, wake: TimeOfDay) -> u32 {
        Self::complete_cycles(Self::sleep_minutes(bedtime, wake))
    }

    /// Index of the wake candidate reached soonest at or after sunrise
    ///
    /// Distance is measured forwards only, so a wake-up just before sunrise
    /// counts as almost a full day away. Ties keep the earlier index.
    pub fn best_wake_index(candidates: &[Candidate]) -> Option<usize> {
        let sunrise = TimeOfDay::from_minutes(REFERENCE_SUNRISE_MINUTES as i64);
        let mut best: Option<(usize, u16)> = None;

        for (index, candidate) in candidates.iter().enumerate() {
            let distance = sunrise.minutes_until(candidate.time);
            if best.map_or(true, |(_, closest)| distance < closest) {
                best = Some((index, distance));
            }
        }

        best.map(|(index, _)| index)
    }

    /// Best wake-up time for a bedtime, aligned with the reference sunrise
    pub fn best_wake_time(bedtime: TimeOfDay) -> TimeOfDay {
        let candidates = Self::wake_times(bedtime);
        Self::best_wake_index(&candidates)
            .map(|index| candidates[index].time)
            .unwrap_or_else(|| Self::wake_time_for(bedtime, MAX_SLEEP_CYCLES))
    }
}

/// Format minutes as `"<H> hours"` or `"<H> hours <M> mins"`
pub fn format_sleep_duration(sleep_minutes: u32) -> String {
    let hours = sleep_minutes / 60;
    let minutes = sleep_minutes % 60;
    if minutes == 0 {
        format!("{} hours", hours)
    } else {
        format!("{} hours {} mins", hours, minutes)
    }
}

/// Parse a duration produced by [`format_sleep_duration`] back into minutes
pub fn parse_sleep_duration(text: &str) -> Option<u32> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    let (hours, minutes) = match parts.as_slice() {
        [hours, "hours"] => (hours.parse::<u32>().ok()?, 0),
        [hours, "hours", minutes, "mins"] => {
            (hours.parse::<u32>().ok()?, minutes.parse::<u32>().ok()?)
        }
        _ => return None,
    };

    if minutes >= 60 || hours as i64 * 60 >= MINUTES_PER_DAY {
        return None;
    }
    Some(hours * 60 + minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(text: &str) -> TimeOfDay {
        TimeOfDay::parse_12h(text).unwrap()
    }

    fn times(candidates: &[Candidate]) -> Vec<String> {
        candidates.iter().map(|c| c.time.to_string()).collect()
    }

    #[test]
    fn test_bedtimes_for_seven_am() {
        let candidates = CycleCalculator::bedtimes(t("7:00 AM"));

        assert_eq!(
            times(&candidates),
            vec!["9:46 PM", "11:16 PM", "12:46 AM", "2:16 AM"]
        );
        assert_eq!(
            candidates.iter().map(|c| c.cycles).collect::<Vec<_>>(),
            vec![6, 5, 4, 3]
        );
        assert_eq!(candidates[0].duration_label(), "9 hours");
        assert_eq!(candidates[1].duration_label(), "7 hours 30 mins");
        assert_eq!(candidates[3].duration_label(), "4 hours 30 mins");
    }

    #[test]
    fn test_wake_times_for_eleven_pm() {
        let candidates = CycleCalculator::wake_times(t("11:00 PM"));

        assert_eq!(
            times(&candidates),
            vec!["8:14 AM", "6:44 AM", "5:14 AM", "3:44 AM"]
        );
        assert_eq!(candidates[0].sleep_minutes, 540);
        assert_eq!(candidates[2].cycles, 4);
    }

    #[test]
    fn test_best_wake_time_prefers_first_after_sunrise() {
        assert_eq!(CycleCalculator::best_wake_time(t("11:00 PM")), t("6:44 AM"));

        // 9:00 PM gives 6:14, 4:44, 3:14, 1:44; all are before 6:30, and
        // counting forwards from sunrise 1:44 AM comes around first
        assert_eq!(CycleCalculator::best_wake_time(t("9:00 PM")), t("1:44 AM"));
    }

    #[test]
    fn test_best_wake_index_tie_keeps_first() {
        let sunrise = TimeOfDay::from_minutes(REFERENCE_SUNRISE_MINUTES as i64);
        let candidate = Candidate {
            time: sunrise,
            sleep_minutes: 450,
            cycles: 5,
        };
        assert_eq!(CycleCalculator::best_wake_index(&[candidate, candidate]), Some(0));
        assert_eq!(CycleCalculator::best_wake_index(&[]), None);
    }

    #[test]
    fn test_sleep_duration_across_midnight() {
        assert_eq!(
            CycleCalculator::sleep_duration(t("10:46 PM"), t("7:00 AM")),
            "7 hours 30 mins"
        );
        assert_eq!(CycleCalculator::sleep_cycles(t("10:46 PM"), t("7:00 AM")), 5);
        assert_eq!(CycleCalculator::sleep_minutes(t("7:00 AM"), t("7:10 AM")), 0);
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!(parse_sleep_duration("9 hours"), Some(540));
        assert_eq!(parse_sleep_duration("7 hours 30 mins"), Some(450));
        assert_eq!(parse_sleep_duration("7 hours 75 mins"), None);
        assert_eq!(parse_sleep_duration("seven hours"), None);
        assert_eq!(parse_sleep_duration("7h30"), None);
        assert_eq!(parse_sleep_duration(&format_sleep_duration(283)), Some(283));
    }

    #[test]
    fn test_stage_estimate_sums_to_total() {
        let estimate = SleepStageEstimate::for_sleep_minutes(450);
        assert_eq!(estimate.light_n1_minutes, 23);
        assert_eq!(estimate.light_n2_minutes, 203);
        assert_eq!(estimate.deep_n3_minutes, 113);
        assert_eq!(estimate.total_minutes(), 450);

        assert_eq!(SleepStageEstimate::for_sleep_minutes(0).total_minutes(), 0);
    }

    // Property-based tests using proptest
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_bedtime_wake_inverse(minutes in 0i64..1440i64, cycles in 3u32..=6u32) {
            let wake = TimeOfDay::from_minutes(minutes);
            let bedtime = CycleCalculator::bedtime_for(wake, cycles);
            prop_assert_eq!(CycleCalculator::wake_time_for(bedtime, cycles), wake);
            prop_assert_eq!(CycleCalculator::sleep_cycles(bedtime, wake), cycles);
            prop_assert_eq!(
                CycleCalculator::sleep_minutes(bedtime, wake),
                cycles * SLEEP_CYCLE_MINUTES
            );
        }

        #[test]
        fn test_candidates_ordered_most_sleep_first(minutes in 0i64..1440i64) {
            let anchor = TimeOfDay::from_minutes(minutes);
            for candidates in [CycleCalculator::bedtimes(anchor), CycleCalculator::wake_times(anchor)] {
                prop_assert_eq!(candidates.len(), 4);
                for pair in candidates.windows(2) {
                    prop_assert!(pair[0].sleep_minutes > pair[1].sleep_minutes);
                    prop_assert_eq!(pair[0].cycles, pair[1].cycles + 1);
                }
            }
        }

        #[test]
        fn prop_stage_estimate_sums_to_total(sleep_minutes in 0u32..1440u32) {
            let estimate = SleepStageEstimate::for_sleep_minutes(sleep_minutes);
            prop_assert_eq!(estimate.total_minutes(), sleep_minutes);
        }
    }
}
