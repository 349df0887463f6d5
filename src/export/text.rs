use super::ExportError;
use crate::circadian::DerivedLandmarks;
use crate::deficit::DeficitAssessment;
use crate::schedule::{DerivedResult, ScheduleResult};
use std::io::Write;

/// Write a full schedule as a plain-text report
pub fn write_schedule<W: Write>(result: &ScheduleResult, mut writer: W) -> Result<(), ExportError> {
    writeln!(writer, "SLEEP SCHEDULE")?;
    writeln!(writer, "=")?;
    writeln!(writer, "{}: {}", anchor_label(result), result.anchor)?;
    writeln!(writer, "Chronotype: {}", result.chronotype)?;
    writeln!(writer, "Age range: {}", result.age_band)?;
    writeln!(writer)?;

    writeln!(writer, "{}S", result.direction.candidate_label().to_uppercase())?;
    writeln!(writer, "-")?;
    for (index, candidate) in result.candidates.iter().enumerate() {
        let mut marks = Vec::new();
        if result.recommended_index == Some(index) {
            marks.push("recommended");
        }
        if result.best_wake_time == Some(candidate.time) {
            marks.push("best wake time");
        }

        write!(
            writer,
            "{}. {} ({}, {} cycles)",
            index + 1,
            candidate.time,
            candidate.duration_label(),
            candidate.cycles
        )?;
        if marks.is_empty() {
            writeln!(writer)?;
        } else {
            writeln!(writer, " [{}]", marks.join(", "))?;
        }
    }
    writeln!(writer)?;

    writeln!(writer, "{}", result.recommendation)?;
    writeln!(writer, "{}", result.chronotype_advice)?;
    writeln!(
        writer,
        "Age range guidance: {} of sleep, {} awake, about {}% deep sleep",
        result.age_band.recommended_duration(),
        result.age_band.recommended_wake_window(),
        result.age_band.deep_sleep_percentage()
    )?;
    writeln!(writer)?;

    write_deficit(&mut writer, &result.deficit)?;
    writeln!(writer, "Sleep stages: {}", result.stage_estimate)?;
    writeln!(writer)?;

    write_landmarks(&mut writer, &result.landmarks)?;
    writer.flush()?;
    Ok(())
}

/// Write the landmarks re-derived for a selected candidate
pub fn write_selection<W: Write>(derived: &DerivedResult, mut writer: W) -> Result<(), ExportError> {
    writeln!(writer, "SELECTED: {}", derived.selected)?;
    writeln!(writer, "=")?;
    writeln!(writer, "{}", derived.recommendation)?;
    writeln!(writer, "{}", derived.chronotype_advice)?;
    writeln!(writer)?;

    write_deficit(&mut writer, &derived.deficit)?;
    writeln!(writer)?;

    write_landmarks(&mut writer, &derived.landmarks)?;
    writer.flush()?;
    Ok(())
}

fn anchor_label(result: &ScheduleResult) -> &'static str {
    match result.direction {
        crate::models::Direction::WakeToBed => "Wake-up time",
        crate::models::Direction::BedToWake => "Bedtime",
    }
}

fn write_deficit<W: Write>(writer: &mut W, deficit: &DeficitAssessment) -> Result<(), ExportError> {
    writeln!(writer, "Sleep deficit: {}", deficit.level)?;
    if let Some(warning) = &deficit.warning {
        writeln!(writer, "⚠ {}", warning)?;
    }
    Ok(())
}

fn write_landmarks<W: Write>(writer: &mut W, landmarks: &DerivedLandmarks) -> Result<(), ExportError> {
    writeln!(writer, "DAY PLAN (waking at {})", landmarks.wake_time)?;
    writeln!(writer, "-")?;

    writeln!(writer, "Deep work:")?;
    for window in &landmarks.deep_work {
        writeln!(writer, "• {}", window)?;
    }

    writeln!(writer, "Energy dips:")?;
    for window in &landmarks.energy_dips {
        writeln!(writer, "• {}", window)?;
    }

    writeln!(writer, "Naps:")?;
    for nap in &landmarks.naps {
        writeln!(writer, "• {}: {}", nap.time, nap.advice)?;
    }

    writeln!(writer, "Melatonin onset: {}", landmarks.melatonin_onset)?;
    Ok(())
}
