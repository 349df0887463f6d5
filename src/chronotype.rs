//! Chronotype-aware filtering and recommendations

use tracing::{debug, warn};

use crate::cycles::Candidate;
use crate::models::{AgeBand, Chronotype, TimeOfDay};

/// How many candidates early and late chronotypes are shown
pub const CHRONOTYPE_CANDIDATE_LIMIT: usize = 4;

/// Canned bed/wake windows for a chronotype
pub fn chronotype_advice(chronotype: Chronotype) -> &'static str {
    match chronotype {
        Chronotype::Early => {
            "Go to bed between 9:00 PM - 10:30 PM and wake up between 5:00 AM - 6:30 AM"
        }
        Chronotype::Intermediate => {
            "Go to bed between 10:00 PM - 11:30 PM and wake up between 6:00 AM - 7:30 AM"
        }
        Chronotype::Late => {
            "Go to bed between 11:30 PM - 1:00 AM and wake up between 7:30 AM - 9:00 AM"
        }
        Chronotype::Unknown => {
            "Follow a consistent sleep schedule aligned with your natural tendencies"
        }
    }
}

/// Keep the subset of `items` a chronotype prefers
///
/// Early types get the earliest clock times, late types the latest, both
/// capped at four and returned in ascending clock order. Intermediate and
/// unknown types get the input back untouched.
pub fn adjust_for_chronotype<T, F>(items: Vec<T>, chronotype: Chronotype, clock_time: F) -> Vec<T>
where
    F: Fn(&T) -> TimeOfDay,
{
    match chronotype {
        Chronotype::Intermediate | Chronotype::Unknown => items,
        Chronotype::Early | Chronotype::Late => {
            let mut sorted = items;
            sorted.sort_by_key(|item| clock_time(item));

            if chronotype == Chronotype::Late {
                let skip = sorted.len().saturating_sub(CHRONOTYPE_CANDIDATE_LIMIT);
                sorted.drain(..skip);
            } else {
                sorted.truncate(CHRONOTYPE_CANDIDATE_LIMIT);
            }

            debug!(chronotype = %chronotype, kept = sorted.len(), "Adjusted candidates for chronotype");
            sorted
        }
    }
}

/// Chronotype adjustment for generated candidates
pub fn adjust_candidates(candidates: Vec<Candidate>, chronotype: Chronotype) -> Vec<Candidate> {
    adjust_for_chronotype(candidates, chronotype, |candidate| candidate.time)
}

/// Chronotype adjustment for display strings
///
/// A list containing anything that is not a `H:MM AM|PM` string is returned
/// unchanged.
pub fn adjust_time_labels(labels: &[String], chronotype: Chronotype) -> Vec<String> {
    let parsed: Result<Vec<(TimeOfDay, String)>, _> = labels
        .iter()
        .map(|label| TimeOfDay::parse_12h(label).map(|time| (time, label.clone())))
        .collect();

    match parsed {
        Ok(pairs) => adjust_for_chronotype(pairs, chronotype, |(time, _)| *time)
            .into_iter()
            .map(|(_, label)| label)
            .collect(),
        Err(err) => {
            warn!(error = %err, "Candidate list is malformed, leaving it unchanged");
            labels.to_vec()
        }
    }
}

/// Position in the candidate list to recommend for a chronotype and age band
///
/// Teens get the most sleep, older adults the third option, and adults
/// follow their chronotype. Out-of-range picks fall back to the first item.
pub fn recommended_index(chronotype: Chronotype, age_band: AgeBand, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let third_or_last = 2.min(len - 1);

    let index = match (age_band, chronotype) {
        (AgeBand::Teen, _) => 0,
        (AgeBand::OlderAdult, _) => third_or_last,
        (AgeBand::Adult, Chronotype::Early) => 0,
        (AgeBand::Adult, Chronotype::Late) => third_or_last,
        (AgeBand::Adult, Chronotype::Intermediate | Chronotype::Unknown) => 1,
    };

    Some(if index < len { index } else { 0 })
}

/// Sentence recommending one of `times` for this chronotype and age band
///
/// Without any times the canned chronotype advice is returned instead.
pub fn personalized_recommendation(
    chronotype: Chronotype,
    age_band: AgeBand,
    times: &[TimeOfDay],
) -> String {
    let Some(index) = recommended_index(chronotype, age_band, times.len()) else {
        return chronotype_advice(chronotype).to_string();
    };

    let profile = match chronotype {
        Chronotype::Unknown => "age range".to_string(),
        known => format!("{} chronotype and age range", known),
    };

    format!(
        "Based on your {}, we recommend {}. People in your age range typically need {} of quality sleep.",
        profile,
        times[index],
        age_band.recommended_duration()
    )
}
