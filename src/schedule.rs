//! Full schedule computation and selection handling
//!
//! [`compute_schedule`] turns one anchor time into everything shown to the
//! user. [`compute_from_selection`] re-derives the landmarks, deficit and
//! recommendation when the user picks one of the displayed candidates,
//! leaving the candidate list itself alone. [`ScheduleSession`] holds the one piece of state a
//! front end needs: which result is on screen and which candidate is
//! selected.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::chronotype::{
    adjust_candidates, chronotype_advice, personalized_recommendation, recommended_index,
};
use crate::circadian::{CircadianCalculator, DerivedLandmarks};
use crate::cycles::{Candidate, CycleCalculator, SleepStageEstimate};
use crate::deficit::{DeficitAssessment, DeficitClassifier};
use crate::error::Result;
use crate::models::{AgeBand, Chronotype, Direction, TimeOfDay};

/// Cycles assumed when simulating the wake-up time for a picked bedtime
pub const SELECTION_ASSUMED_CYCLES: u32 = 5;

/// Everything needed to compute a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// `None` means nothing has been entered yet
    pub anchor: Option<TimeOfDay>,
    pub direction: Direction,
    pub chronotype: Chronotype,
    pub age_band: AgeBand,
}

impl ScheduleRequest {
    pub fn new(
        anchor: Option<TimeOfDay>,
        direction: Direction,
        chronotype: Chronotype,
        age_band: AgeBand,
    ) -> Self {
        ScheduleRequest {
            anchor,
            direction,
            chronotype,
            age_band,
        }
    }

    /// Build from raw user input; blank input means "no anchor yet"
    pub fn from_input(
        anchor: Option<&str>,
        direction: Direction,
        chronotype: Chronotype,
        age_band: AgeBand,
    ) -> Result<Self> {
        let anchor = match anchor.map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(TimeOfDay::parse_12h(text)?),
        };
        Ok(ScheduleRequest::new(anchor, direction, chronotype, age_band))
    }

    /// Compute the schedule, or nothing when no anchor has been entered
    pub fn compute(&self) -> Option<ScheduleResult> {
        self.anchor.map(|anchor| {
            compute_schedule(anchor, self.direction, self.chronotype, self.age_band)
        })
    }
}

/// Complete output for one anchor time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub anchor: TimeOfDay,
    pub direction: Direction,
    pub chronotype: Chronotype,
    pub age_band: AgeBand,

    /// Bedtimes or wake-up times after chronotype adjustment
    pub candidates: Vec<Candidate>,

    /// Position in `candidates` picked for the recommendation sentence
    pub recommended_index: Option<usize>,

    /// Sunrise-aligned wake-up time, only when anchored on a bedtime
    pub best_wake_time: Option<TimeOfDay>,

    pub recommendation: String,
    pub chronotype_advice: String,
    pub deficit: DeficitAssessment,
    pub landmarks: DerivedLandmarks,
    pub stage_estimate: SleepStageEstimate,
}

impl ScheduleResult {
    pub fn candidate_labels(&self) -> Vec<String> {
        self.candidates.iter().map(|c| c.time.to_string()).collect()
    }

    pub fn duration_labels(&self) -> Vec<String> {
        self.candidates.iter().map(Candidate::duration_label).collect()
    }

    pub fn cycle_counts(&self) -> Vec<u32> {
        self.candidates.iter().map(|c| c.cycles).collect()
    }
}

/// Landmarks, deficit and recommendation re-derived for a selected candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedResult {
    pub selected: TimeOfDay,

    /// Actual wake-up time, or the simulated one for a selected bedtime
    pub wake_time: TimeOfDay,

    /// Recommendation naming the selected time
    pub recommendation: String,

    pub deficit: DeficitAssessment,
    pub landmarks: DerivedLandmarks,
    pub chronotype_advice: String,
}

/// Compute every output for one anchor time
///
/// With a wake-up anchor the landmarks hang off the anchor itself and the
/// deficit is judged on the first listed bedtime, the one with the most sleep
/// after chronotype adjustment. With a bedtime anchor both use the
/// sunrise-aligned best wake-up time.
pub fn compute_schedule(
    anchor: TimeOfDay,
    direction: Direction,
    chronotype: Chronotype,
    age_band: AgeBand,
) -> ScheduleResult {
    let generated = match direction {
        Direction::WakeToBed => CycleCalculator::bedtimes(anchor),
        Direction::BedToWake => CycleCalculator::wake_times(anchor),
    };
    let candidates = adjust_candidates(generated, chronotype);

    let times: Vec<TimeOfDay> = candidates.iter().map(|c| c.time).collect();
    let recommended = recommended_index(chronotype, age_band, candidates.len());
    let recommendation = personalized_recommendation(chronotype, age_band, &times);

    let (wake_time, basis, best_wake_time) = match direction {
        Direction::WakeToBed => (anchor, (!candidates.is_empty()).then_some(0), None),
        Direction::BedToWake => {
            let best = CycleCalculator::best_wake_index(&candidates);
            let wake = best
                .map(|index| candidates[index].time)
                .unwrap_or_else(|| CycleCalculator::best_wake_time(anchor));
            (wake, best, Some(wake))
        }
    };

    let sleep_minutes = basis
        .map(|index| candidates[index].sleep_minutes)
        .unwrap_or(0);

    let deficit = DeficitClassifier::assess(sleep_minutes, age_band);
    let landmarks = CircadianCalculator::landmarks(wake_time, deficit.level);

    info!(
        anchor = %anchor,
        direction = %direction,
        chronotype = %chronotype,
        age_band = %age_band,
        candidates = candidates.len(),
        deficit = %deficit.level,
        "Computed sleep schedule"
    );

    ScheduleResult {
        anchor,
        direction,
        chronotype,
        age_band,
        candidates,
        recommended_index: recommended,
        best_wake_time,
        recommendation,
        chronotype_advice: chronotype_advice(chronotype).to_string(),
        deficit,
        landmarks,
        stage_estimate: SleepStageEstimate::for_sleep_minutes(sleep_minutes),
    }
}

/// Re-derive landmarks and deficit for a candidate picked from the list
///
/// For a picked bedtime the landmarks hang off a wake-up time simulated with
/// five full cycles; a picked wake-up time is used directly. Either way the
/// deficit is judged on the sleep the candidate itself carries.
pub fn compute_from_selection(
    selected: &Candidate,
    direction: Direction,
    chronotype: Chronotype,
    age_band: AgeBand,
) -> DerivedResult {
    let wake_time = match direction {
        Direction::WakeToBed => {
            CycleCalculator::wake_time_for(selected.time, SELECTION_ASSUMED_CYCLES)
        }
        Direction::BedToWake => selected.time,
    };

    let deficit = DeficitClassifier::assess(selected.sleep_minutes, age_band);
    let landmarks = CircadianCalculator::landmarks(wake_time, deficit.level);

    debug!(
        selected = %selected.time,
        wake = %wake_time,
        deficit = %deficit.level,
        "Recomputed landmarks for selection"
    );

    DerivedResult {
        selected: selected.time,
        wake_time,
        recommendation: personalized_recommendation(chronotype, age_band, &[selected.time]),
        deficit,
        landmarks,
        chronotype_advice: chronotype_advice(chronotype).to_string(),
    }
}

/// What a front end is currently showing
#[derive(Debug, Default)]
pub struct ScheduleSession {
    displayed: Option<ScheduleResult>,
    selection: Option<(usize, DerivedResult)>,
}

impl ScheduleSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a freshly computed schedule, dropping any earlier selection
    pub fn show(&mut self, result: ScheduleResult) {
        self.displayed = Some(result);
        self.selection = None;
    }

    /// Clear everything, e.g. when the anchor input is emptied
    pub fn clear(&mut self) {
        self.displayed = None;
        self.selection = None;
    }

    pub fn displayed(&self) -> Option<&ScheduleResult> {
        self.displayed.as_ref()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selection.as_ref().map(|(index, _)| *index)
    }

    pub fn selection(&self) -> Option<&DerivedResult> {
        self.selection.as_ref().map(|(_, derived)| derived)
    }

    /// Landmarks currently in effect: the selection's if any, else the schedule's
    pub fn landmarks(&self) -> Option<&DerivedLandmarks> {
        self.selection()
            .map(|derived| &derived.landmarks)
            .or_else(|| self.displayed.as_ref().map(|result| &result.landmarks))
    }

    /// Deficit currently in effect
    pub fn deficit(&self) -> Option<&DeficitAssessment> {
        self.selection()
            .map(|derived| &derived.deficit)
            .or_else(|| self.displayed.as_ref().map(|result| &result.deficit))
    }

    /// Handle a "select" event carrying the candidate's label and list index
    ///
    /// The label must be a valid time. If it does not identify a displayed
    /// candidate (stale index, list replaced, nothing shown) the current
    /// state is kept and `Ok(None)` is returned.
    pub fn select(&mut self, label: &str, index: usize) -> Result<Option<&DerivedResult>> {
        let time = TimeOfDay::parse_12h(label)?;

        let Some(result) = self.displayed.as_ref() else {
            warn!(label, index, "Selection with no schedule displayed");
            return Ok(None);
        };

        let position = match result.candidates.get(index) {
            Some(candidate) if candidate.time == time => Some(index),
            _ => result.candidates.iter().position(|c| c.time == time),
        };

        let Some(position) = position else {
            warn!(label, index, "Selected time is not among the displayed candidates");
            return Ok(None);
        };

        let derived = compute_from_selection(
            &result.candidates[position],
            result.direction,
            result.chronotype,
            result.age_band,
        );
        self.selection = Some((position, derived));

        Ok(self.selection())
    }
}
