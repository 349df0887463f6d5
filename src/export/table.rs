//! Terminal tables built with `tabled`

use super::ExportError;
use crate::circadian::DerivedLandmarks;
use crate::schedule::{DerivedResult, ScheduleResult};
use std::io::Write;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct LandmarkRow {
    #[tabled(rename = "Landmark")]
    kind: &'static str,
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

/// Candidate table with the recommended and best-wake rows marked
pub fn candidate_table(result: &ScheduleResult) -> Table {
    let mut builder = Builder::default();
    builder.push_record([
        "#",
        result.direction.candidate_label(),
        "Sleep",
        "Cycles",
        "",
    ]);

    for (index, candidate) in result.candidates.iter().enumerate() {
        let mark = match (
            result.recommended_index == Some(index),
            result.best_wake_time == Some(candidate.time),
        ) {
            (true, true) => "★ recommended, best wake",
            (true, false) => "★ recommended",
            (false, true) => "best wake",
            (false, false) => "",
        };

        builder.push_record([
            (index + 1).to_string(),
            candidate.time.to_string(),
            candidate.duration_label(),
            candidate.cycles.to_string(),
            mark.to_string(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table
}

/// One row per deep-work block, energy dip, nap and the melatonin onset
pub fn landmark_table(landmarks: &DerivedLandmarks) -> Table {
    let mut rows: Vec<LandmarkRow> = Vec::new();

    for window in &landmarks.deep_work {
        rows.push(LandmarkRow {
            kind: "Deep work",
            when: window.to_string(),
            notes: format!("{} min", window.duration_minutes()),
        });
    }
    for window in &landmarks.energy_dips {
        rows.push(LandmarkRow {
            kind: "Energy dip",
            when: window.to_string(),
            notes: format!("{} min", window.duration_minutes()),
        });
    }
    for nap in &landmarks.naps {
        rows.push(LandmarkRow {
            kind: "Nap",
            when: nap.time.to_string(),
            notes: nap.advice.clone(),
        });
    }
    rows.push(LandmarkRow {
        kind: "Melatonin onset",
        when: landmarks.melatonin_onset.to_string(),
        notes: "Dim lights and screens".to_string(),
    });

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table
}

pub fn write_schedule<W: Write>(result: &ScheduleResult, mut writer: W) -> Result<(), ExportError> {
    writeln!(writer, "{}", candidate_table(result))?;
    writeln!(writer, "{}", result.recommendation)?;
    writeln!(writer, "{}", result.chronotype_advice)?;
    writeln!(writer, "Sleep stages: {}", result.stage_estimate)?;
    writeln!(writer, "Sleep deficit: {}", result.deficit.level)?;
    if let Some(warning) = &result.deficit.warning {
        writeln!(writer, "⚠ {}", warning)?;
    }
    writeln!(writer)?;
    writeln!(writer, "{}", landmark_table(&result.landmarks))?;
    writer.flush()?;
    Ok(())
}

pub fn write_selection<W: Write>(derived: &DerivedResult, mut writer: W) -> Result<(), ExportError> {
    writeln!(
        writer,
        "Selected {} (waking at {})",
        derived.selected, derived.wake_time
    )?;
    writeln!(writer, "{}", derived.recommendation)?;
    writeln!(writer, "Sleep deficit: {}", derived.deficit.level)?;
    if let Some(warning) = &derived.deficit.warning {
        writeln!(writer, "⚠ {}", warning)?;
    }
    writeln!(writer)?;
    writeln!(writer, "{}", landmark_table(&derived.landmarks))?;
    writer.flush()?;
    Ok(())
}
