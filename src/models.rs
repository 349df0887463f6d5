use chrono::{NaiveTime, Timelike};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::SleepCalcError;

/// Minutes in one day; every time-of-day value lives in `[0, MINUTES_PER_DAY)`
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Wrap any minute count into `[0, 1440)`
///
/// Schedules routinely cross midnight, so every offset added to or subtracted
/// from a time of day goes through here.
pub fn normalize_minutes(minutes: i64) -> u16 {
    (((minutes % MINUTES_PER_DAY) + MINUTES_PER_DAY) % MINUTES_PER_DAY) as u16
}

/// A wall-clock time with no date and no timezone, stored as minutes since midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// Build from any minute count, wrapping around midnight
    pub fn from_minutes(minutes: i64) -> Self {
        TimeOfDay(normalize_minutes(minutes))
    }

    /// Build from a 24-hour clock reading
    pub fn from_hm(hour: u8, minute: u8) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(TimeOfDay(hour as u16 * 60 + minute as u16))
    }

    /// Current local wall-clock time, truncated to the minute
    pub fn now_local() -> Self {
        TimeOfDay::from(chrono::Local::now().time())
    }

    pub fn minutes(&self) -> u16 {
        self.0
    }

    /// Hour on the 24-hour clock
    pub fn hour(&self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(&self) -> u8 {
        (self.0 % 60) as u8
    }

    /// Shift by a signed number of minutes, wrapping around midnight
    pub fn add_minutes(&self, minutes: i64) -> Self {
        TimeOfDay::from_minutes(self.0 as i64 + minutes)
    }

    /// Forward distance from `self` to `later`, in `[0, 1440)`
    pub fn minutes_until(&self, later: TimeOfDay) -> u16 {
        normalize_minutes(later.0 as i64 - self.0 as i64)
    }

    /// Parse the strict `H:MM AM|PM` display form
    ///
    /// Hour is 1-12 with an optional leading zero, minutes are exactly two
    /// digits, whitespace between minutes and the period is optional and the
    /// period is case-insensitive. Anything else is rejected rather than
    /// coerced.
    pub fn parse_12h(input: &str) -> Result<Self, SleepCalcError> {
        let invalid = || SleepCalcError::invalid_time(input);
        let text = input.trim();

        let (hour_part, rest) = text.split_once(':').ok_or_else(invalid)?;
        let hour = parse_hour_12(hour_part).ok_or_else(invalid)?;

        if rest.len() < 2 || !rest.is_char_boundary(2) {
            return Err(invalid());
        }
        let (minute_part, period_part) = rest.split_at(2);
        if !minute_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let minute: u8 = minute_part.parse().map_err(|_| invalid())?;
        if minute > 59 {
            return Err(invalid());
        }

        let is_pm = match period_part.trim_start().to_ascii_lowercase().as_str() {
            "am" => false,
            "pm" => true,
            _ => return Err(invalid()),
        };

        let hour_24 = match (hour, is_pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, false) => h,
            (h, true) => h + 12,
        };

        TimeOfDay::from_hm(hour_24, minute).ok_or_else(invalid)
    }

    /// Render as `H:MM AM|PM`; hour 0 shows as 12
    pub fn format_12h(&self) -> String {
        let hour = self.hour();
        let period = if hour >= 12 { "PM" } else { "AM" };
        let display_hour = match hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{}:{:02} {}", display_hour, self.minute(), period)
    }
}

fn parse_hour_12(text: &str) -> Option<u8> {
    if text.is_empty() || text.len() > 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u8 = text.parse().ok()?;
    // "0?[1-9]" or "1[0-2]": a two-digit hour starting with 0 must be 01-09
    if (1..=12).contains(&hour) {
        Some(hour)
    } else {
        None
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_12h())
    }
}

impl FromStr for TimeOfDay {
    type Err = SleepCalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeOfDay::parse_12h(s)
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        TimeOfDay((time.hour() * 60 + time.minute()) as u16)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_12h())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        TimeOfDay::parse_12h(&text).map_err(serde::de::Error::custom)
    }
}

/// A clock range such as a deep-work block or an energy dip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeWindow {
    /// Window of `length` minutes starting `offset` minutes after `reference`
    pub fn after(reference: TimeOfDay, offset: i64, length: i64) -> Self {
        let start = reference.add_minutes(offset);
        TimeWindow {
            start,
            end: start.add_minutes(length),
        }
    }

    pub fn duration_minutes(&self) -> u16 {
        self.start.minutes_until(self.end)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// Which time the user anchors the calculation on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Anchor is a desired wake-up time; candidates are bedtimes
    WakeToBed,
    /// Anchor is a desired bedtime; candidates are wake-up times
    BedToWake,
}

impl Direction {
    /// What the generated candidates represent
    pub fn candidate_label(&self) -> &'static str {
        match self {
            Direction::WakeToBed => "Bedtime",
            Direction::BedToWake => "Wake-up time",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::WakeToBed => write!(f, "wake-to-bed"),
            Direction::BedToWake => write!(f, "bed-to-wake"),
        }
    }
}

impl FromStr for Direction {
    type Err = SleepCalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wake-to-bed" | "wake" => Ok(Direction::WakeToBed),
            "bed-to-wake" | "bed" => Ok(Direction::BedToWake),
            _ => Err(SleepCalcError::invalid_option(
                "direction",
                s,
                "wake-to-bed, bed-to-wake",
            )),
        }
    }
}

/// Sleep-wake tendency declared by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chronotype {
    /// Morning lark
    Early,
    Intermediate,
    /// Night owl
    Late,
    #[default]
    Unknown,
}

impl fmt::Display for Chronotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chronotype::Early => write!(f, "early"),
            Chronotype::Intermediate => write!(f, "intermediate"),
            Chronotype::Late => write!(f, "late"),
            Chronotype::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for Chronotype {
    type Err = SleepCalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "early" => Ok(Chronotype::Early),
            "intermediate" => Ok(Chronotype::Intermediate),
            "late" => Ok(Chronotype::Late),
            "unknown" => Ok(Chronotype::Unknown),
            _ => Err(SleepCalcError::invalid_option(
                "chronotype",
                s,
                "early, intermediate, late, unknown",
            )),
        }
    }
}

/// Age range used for sleep-need recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgeBand {
    Teen,
    #[default]
    Adult,
    OlderAdult,
}

/// Minimum and optimal nightly sleep in hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepNeed {
    pub minimum_hours: Decimal,
    pub optimal_hours: Decimal,
}

impl AgeBand {
    pub fn sleep_need(&self) -> SleepNeed {
        let (minimum_hours, optimal_hours) = match self {
            AgeBand::Teen => (dec!(8), dec!(9)),
            AgeBand::Adult => (dec!(7), dec!(8)),
            AgeBand::OlderAdult => (dec!(7), dec!(7.5)),
        };
        SleepNeed {
            minimum_hours,
            optimal_hours,
        }
    }

    /// Recommended nightly sleep range shown to the user
    pub fn recommended_duration(&self) -> &'static str {
        match self {
            AgeBand::Teen => "8-10 hours",
            AgeBand::Adult => "7-9 hours",
            AgeBand::OlderAdult => "7-8 hours",
        }
    }

    /// Recommended time spent awake between sleeps
    pub fn recommended_wake_window(&self) -> &'static str {
        match self {
            AgeBand::Teen => "8-10 hours",
            AgeBand::Adult => "15-17 hours",
            AgeBand::OlderAdult => "15-16 hours",
        }
    }

    /// Typical share of the night spent in deep (N3) sleep, in percent
    pub fn deep_sleep_percentage(&self) -> u8 {
        match self {
            AgeBand::Teen => 25,
            AgeBand::Adult => 20,
            AgeBand::OlderAdult => 15,
        }
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeBand::Teen => write!(f, "teen"),
            AgeBand::Adult => write!(f, "adult"),
            AgeBand::OlderAdult => write!(f, "older-adult"),
        }
    }
}

impl FromStr for AgeBand {
    type Err = SleepCalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "teen" => Ok(AgeBand::Teen),
            "adult" => Ok(AgeBand::Adult),
            "older-adult" | "older" => Ok(AgeBand::OlderAdult),
            _ => Err(SleepCalcError::invalid_option(
                "age band",
                s,
                "teen, adult, older-adult",
            )),
        }
    }
}

/// How far a night's sleep falls short of the age-band recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SleepDeficitLevel {
    None,
    Mild,
    Moderate,
    Severe,
}

impl fmt::Display for SleepDeficitLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SleepDeficitLevel::None => write!(f, "none"),
            SleepDeficitLevel::Mild => write!(f, "mild"),
            SleepDeficitLevel::Moderate => write!(f, "moderate"),
            SleepDeficitLevel::Severe => write!(f, "severe"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u8, minute: u8) -> TimeOfDay {
        TimeOfDay::from_hm(hour, minute).unwrap()
    }

    #[test]
    fn test_normalize_minutes() {
        assert_eq!(normalize_minutes(0), 0);
        assert_eq!(normalize_minutes(1440), 0);
        assert_eq!(normalize_minutes(-134), 1306);
        assert_eq!(normalize_minutes(1934), 494);
        assert_eq!(normalize_minutes(-2881), 1439);
    }

    #[test]
    fn test_format_12h() {
        assert_eq!(t(0, 0).format_12h(), "12:00 AM");
        assert_eq!(t(0, 5).format_12h(), "12:05 AM");
        assert_eq!(t(7, 0).format_12h(), "7:00 AM");
        assert_eq!(t(12, 0).format_12h(), "12:00 PM");
        assert_eq!(t(21, 46).format_12h(), "9:46 PM");
        assert_eq!(t(23, 59).to_string(), "11:59 PM");
    }

    #[test]
    fn test_parse_12h_accepts_valid_shapes() {
        assert_eq!(TimeOfDay::parse_12h("7:00 AM").unwrap(), t(7, 0));
        assert_eq!(TimeOfDay::parse_12h("07:00 am").unwrap(), t(7, 0));
        assert_eq!(TimeOfDay::parse_12h("12:00 AM").unwrap(), t(0, 0));
        assert_eq!(TimeOfDay::parse_12h("12:30 pm").unwrap(), t(12, 30));
        assert_eq!(TimeOfDay::parse_12h("11:00PM").unwrap(), t(23, 0));
        assert_eq!(TimeOfDay::parse_12h("  10:15   Pm ").unwrap(), t(22, 15));
    }

    #[test]
    fn test_parse_12h_rejects_everything_else() {
        for input in [
            "", "7", "7:00", "13:00 PM", "0:30 AM", "00:30 AM", "7:5 AM", "7:60 AM",
            "7:000 AM", "19:00", "7:00 A.M.", "7:00 XM", "-7:00 AM", "7:00 AMX", "١:00 AM",
        ] {
            let result = TimeOfDay::parse_12h(input);
            assert!(
                matches!(result, Err(SleepCalcError::InvalidTimeFormat { .. })),
                "expected rejection for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_time_arithmetic_wraps() {
        let wake = t(7, 0);
        assert_eq!(wake.add_minutes(-554), t(21, 46));
        assert_eq!(t(23, 0).add_minutes(120), t(1, 0));
        assert_eq!(t(23, 0).minutes_until(t(1, 0)), 120);
        assert_eq!(t(1, 0).minutes_until(t(1, 0)), 0);
    }

    #[test]
    fn test_chrono_conversion() {
        let naive = NaiveTime::from_hms_opt(22, 45, 30).unwrap();
        let time = TimeOfDay::from(naive);
        assert_eq!(time, t(22, 45));
        assert_eq!(TimeOfDay::from(NaiveTime::MIN), t(0, 0));
    }

    #[test]
    fn test_time_window_display() {
        let window = TimeWindow::after(t(7, 0), 150, 90);
        assert_eq!(window.to_string(), "9:30 AM - 11:00 AM");
        assert_eq!(window.duration_minutes(), 90);

        let overnight = TimeWindow::after(t(22, 0), 60, 120);
        assert_eq!(overnight.to_string(), "11:00 PM - 1:00 AM");
    }

    #[test]
    fn test_tag_parsing() {
        assert_eq!("Early".parse::<Chronotype>().unwrap(), Chronotype::Early);
        assert_eq!("unknown".parse::<Chronotype>().unwrap(), Chronotype::Unknown);
        assert!("owl".parse::<Chronotype>().is_err());

        assert_eq!("older-adult".parse::<AgeBand>().unwrap(), AgeBand::OlderAdult);
        assert!("child".parse::<AgeBand>().is_err());

        assert_eq!("bed-to-wake".parse::<Direction>().unwrap(), Direction::BedToWake);
        assert_eq!("wake".parse::<Direction>().unwrap(), Direction::WakeToBed);
    }

    #[test]
    fn test_serde_uses_display_strings() {
        let json = serde_json::to_string(&t(22, 30)).unwrap();
        assert_eq!(json, "\"10:30 PM\"");
        let back: TimeOfDay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t(22, 30));
        assert!(serde_json::from_str::<TimeOfDay>("\"22:30\"").is_err());

        assert_eq!(serde_json::to_string(&AgeBand::OlderAdult).unwrap(), "\"older-adult\"");
        assert_eq!(serde_json::to_string(&SleepDeficitLevel::Moderate).unwrap(), "\"moderate\"");
    }

    #[test]
    fn test_age_band_guidance() {
        let need = AgeBand::OlderAdult.sleep_need();
        assert_eq!(need.minimum_hours, dec!(7));
        assert_eq!(need.optimal_hours, dec!(7.5));
        assert_eq!(AgeBand::Teen.recommended_duration(), "8-10 hours");
        assert_eq!(AgeBand::Adult.recommended_wake_window(), "15-17 hours");
        assert_eq!(AgeBand::OlderAdult.deep_sleep_percentage(), 15);
    }

    // Property-based tests using proptest
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_normalization_closure(minutes in -100_000i64..100_000i64) {
            let normalized = normalize_minutes(minutes);
            prop_assert!(normalized < 1440);
            prop_assert_eq!(normalize_minutes(normalized as i64), normalized);
            prop_assert_eq!(normalize_minutes(minutes + MINUTES_PER_DAY), normalized);
        }

        #[test]
        fn test_display_round_trip(minutes in 0i64..1440i64) {
            let time = TimeOfDay::from_minutes(minutes);
            let parsed = TimeOfDay::parse_12h(&time.format_12h()).unwrap();
            prop_assert_eq!(parsed, time);
        }

        #[test]
        fn test_minutes_until_inverts_add(start in 0i64..1440i64, offset in 0i64..1440i64) {
            let from = TimeOfDay::from_minutes(start);
            prop_assert_eq!(from.minutes_until(from.add_minutes(offset)) as i64, offset);
        }
    }
}
