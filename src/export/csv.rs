use super::ExportError;
use crate::schedule::ScheduleResult;
use std::io::Write;

/// Write one row per candidate: position, time, duration, minutes, cycles
///
/// The recommended and sunrise-aligned candidates are flagged so a
/// spreadsheet can highlight them.
pub fn write_candidates<W: Write>(result: &ScheduleResult, writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record([
        "Position",
        result.direction.candidate_label(),
        "Sleep_Duration",
        "Sleep_Minutes",
        "Cycles",
        "Recommended",
        "Best_Wake_Time",
    ])?;

    for (index, candidate) in result.candidates.iter().enumerate() {
        let recommended = result.recommended_index == Some(index);
        let best_wake = result.best_wake_time == Some(candidate.time);

        csv_writer.write_record([
            (index + 1).to_string(),
            candidate.time.to_string(),
            candidate.duration_label(),
            candidate.sleep_minutes.to_string(),
            candidate.cycles.to_string(),
            if recommended { "1" } else { "0" }.to_string(),
            if best_wake { "1" } else { "0" }.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgeBand, Chronotype, Direction, TimeOfDay};
    use crate::schedule::compute_schedule;

    #[test]
    fn test_candidate_rows() {
        let result = compute_schedule(
            TimeOfDay::parse_12h("7:00 AM").unwrap(),
            Direction::WakeToBed,
            Chronotype::Intermediate,
            AgeBand::Adult,
        );

        let mut out = Vec::new();
        write_candidates(&result, &mut out).unwrap();
        let content = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[0],
            "Position,Bedtime,Sleep_Duration,Sleep_Minutes,Cycles,Recommended,Best_Wake_Time"
        );
        assert_eq!(lines[1], "1,9:46 PM,9 hours,540,6,0,0");
        assert_eq!(lines[2], "2,11:16 PM,7 hours 30 mins,450,5,1,0");
    }
}
