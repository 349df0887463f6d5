//! Circadian landmarks derived from a wake-up time
//!
//! Alertness follows a predictable curve after waking. Every landmark here is
//! a fixed offset from the wake time:
//!
//! - **Deep work**: peak alertness 2.5 h after waking, the block before the
//!   post-lunch dip, and the second peak around 10 h.
//! - **Energy dips**: the post-lunch dip (6-8 h), the evening decline
//!   (12-14 h), and for short sleepers a morning dip (3-4 h).
//! - **Naps**: the post-lunch nap at 6.5 h, with extra recovery naps the
//!   larger the sleep deficit.
//! - **Melatonin onset**: about 14 h after waking.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{SleepDeficitLevel, TimeOfDay, TimeWindow};

const HOUR: i64 = 60;

/// Length of one deep-work block (one ultradian cycle)
pub const DEEP_WORK_BLOCK_MINUTES: i64 = 90;

const PEAK_ALERTNESS_MORNING: i64 = 150;
const POST_LUNCH_DIP_START: i64 = 6 * HOUR;
const POST_LUNCH_DIP_END: i64 = 8 * HOUR;
const PEAK_ALERTNESS_EVENING: i64 = 10 * HOUR;
const MORNING_DIP_START: i64 = 3 * HOUR;
const MORNING_DIP_END: i64 = 4 * HOUR;
const EVENING_DIP_START: i64 = 12 * HOUR;
const EVENING_DIP_END: i64 = 14 * HOUR;
const MELATONIN_ONSET: i64 = 14 * HOUR;

const PRIMARY_NAP: i64 = 390;
const MORNING_NAP: i64 = 270;
const LATE_AFTERNOON_NAP: i64 = 510;
const EVENING_NAP: i64 = 11 * HOUR;

/// A suggested nap with how long it should last
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NapSlot {
    pub time: TimeOfDay,
    pub advice: String,
}

/// Everything derived from a single wake-up time and deficit level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedLandmarks {
    pub wake_time: TimeOfDay,
    pub deep_work: Vec<TimeWindow>,
    pub energy_dips: Vec<TimeWindow>,
    pub naps: Vec<NapSlot>,
    pub melatonin_onset: TimeOfDay,
}

impl DerivedLandmarks {
    pub fn deep_work_labels(&self) -> Vec<String> {
        self.deep_work.iter().map(ToString::to_string).collect()
    }

    pub fn energy_dip_labels(&self) -> Vec<String> {
        self.energy_dips.iter().map(ToString::to_string).collect()
    }

    pub fn nap_time_labels(&self) -> Vec<String> {
        self.naps.iter().map(|nap| nap.time.to_string()).collect()
    }

    pub fn nap_advice(&self) -> Vec<String> {
        self.naps.iter().map(|nap| nap.advice.clone()).collect()
    }
}

/// Clock-time buckets used for nap-length advice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NapTimeBucket {
    /// Before 12:00
    Morning,
    /// 12:00 to 14:59
    EarlyAfternoon,
    /// 15:00 to 16:59
    LateAfternoon,
    /// 17:00 onwards
    Evening,
}

impl NapTimeBucket {
    pub fn for_time(time: TimeOfDay) -> Self {
        match time.hour() {
            0..=11 => NapTimeBucket::Morning,
            12..=14 => NapTimeBucket::EarlyAfternoon,
            15..=16 => NapTimeBucket::LateAfternoon,
            _ => NapTimeBucket::Evening,
        }
    }
}

/// Circadian landmark calculations
pub struct CircadianCalculator;

impl CircadianCalculator {
    /// Compute every landmark for a wake-up time
    pub fn landmarks(wake: TimeOfDay, deficit: SleepDeficitLevel) -> DerivedLandmarks {
        let landmarks = DerivedLandmarks {
            wake_time: wake,
            deep_work: Self::deep_work_periods(wake),
            energy_dips: Self::energy_dips(wake, deficit),
            naps: Self::nap_slots(wake, deficit),
            melatonin_onset: wake.add_minutes(MELATONIN_ONSET),
        };

        debug!(
            wake = %wake,
            deficit = %deficit,
            naps = landmarks.naps.len(),
            dips = landmarks.energy_dips.len(),
            "Computed circadian landmarks"
        );
        landmarks
    }

    /// The three daily deep-work blocks, in order
    pub fn deep_work_periods(wake: TimeOfDay) -> Vec<TimeWindow> {
        vec![
            TimeWindow::after(wake, PEAK_ALERTNESS_MORNING, DEEP_WORK_BLOCK_MINUTES),
            TimeWindow::after(
                wake,
                POST_LUNCH_DIP_START - DEEP_WORK_BLOCK_MINUTES,
                DEEP_WORK_BLOCK_MINUTES,
            ),
            TimeWindow::after(wake, PEAK_ALERTNESS_EVENING, DEEP_WORK_BLOCK_MINUTES),
        ]
    }

    /// The post-lunch slump on its own
    pub fn afternoon_slump(wake: TimeOfDay) -> TimeWindow {
        TimeWindow::after(
            wake,
            POST_LUNCH_DIP_START,
            POST_LUNCH_DIP_END - POST_LUNCH_DIP_START,
        )
    }

    /// Energy dips ordered morning, post-lunch, evening
    ///
    /// The morning dip only shows up after a moderate or severe deficit.
    pub fn energy_dips(wake: TimeOfDay, deficit: SleepDeficitLevel) -> Vec<TimeWindow> {
        let mut dips = Vec::with_capacity(3);

        if deficit >= SleepDeficitLevel::Moderate {
            dips.push(TimeWindow::after(
                wake,
                MORNING_DIP_START,
                MORNING_DIP_END - MORNING_DIP_START,
            ));
        }
        dips.push(Self::afternoon_slump(wake));
        dips.push(TimeWindow::after(
            wake,
            EVENING_DIP_START,
            EVENING_DIP_END - EVENING_DIP_START,
        ));

        dips
    }

    /// Nap slots for the deficit level, in the order they occur after waking
    ///
    /// Ordering follows the offset from the wake time, so a nap that falls
    /// after midnight stays after the evening ones.
    pub fn nap_slots(wake: TimeOfDay, deficit: SleepDeficitLevel) -> Vec<NapSlot> {
        let mut offsets = vec![PRIMARY_NAP];
        if deficit >= SleepDeficitLevel::Mild {
            offsets.push(MORNING_NAP);
        }
        if deficit >= SleepDeficitLevel::Moderate {
            offsets.push(LATE_AFTERNOON_NAP);
        }
        if deficit == SleepDeficitLevel::Severe {
            offsets.push(EVENING_NAP);
        }
        offsets.sort_unstable();

        offsets
            .into_iter()
            .map(|offset| {
                let time = wake.add_minutes(offset);
                NapSlot {
                    time,
                    advice: Self::nap_duration_advice(time, deficit).to_string(),
                }
            })
            .collect()
    }

    /// How long a nap starting at `nap_time` should last
    pub fn nap_duration_advice(nap_time: TimeOfDay, deficit: SleepDeficitLevel) -> &'static str {
        use NapTimeBucket::*;
        use SleepDeficitLevel::{Mild, Moderate, Severe};

        match (NapTimeBucket::for_time(nap_time), deficit) {
            (Morning, Severe) => "90 minutes (full sleep cycle) to address significant sleep deficit",
            (Morning, Moderate) => {
                "20-30 minutes (refreshing without grogginess) or 90 minutes (full cycle)"
            }
            (Morning, Mild | SleepDeficitLevel::None) => {
                "10-20 minutes (alertness boost without sleep inertia)"
            }

            (EarlyAfternoon, Moderate | Severe) => {
                "90 minutes (complete sleep cycle with REM) for recovery"
            }
            (EarlyAfternoon, Mild) => "30 minutes (some deep sleep) or 90 minutes (full cycle)",
            (EarlyAfternoon, SleepDeficitLevel::None) => {
                "20 minutes (optimal power nap) or 90 minutes (full cycle)"
            }

            (LateAfternoon, Severe) => "90 minutes (full sleep cycle) but may affect night sleep",
            (LateAfternoon, _) => "10-20 minutes (alertness without affecting night sleep)",

            (Evening, Severe) => "20-30 minutes maximum (avoid disrupting night sleep)",
            (Evening, _) => "10 minutes maximum (brief refresher only)",
        }
    }
}
