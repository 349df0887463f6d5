use super::ExportError;
use std::io::Write;

/// Write any serializable result as pretty JSON followed by a newline
pub fn write_json<T, W>(data: &T, mut writer: W) -> Result<(), ExportError>
where
    T: serde::Serialize,
    W: Write,
{
    let json_data = serde_json::to_string_pretty(data)
        .map_err(|e| ExportError::SerializationError(e.to_string()))?;

    writer.write_all(json_data.as_bytes())?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgeBand, Chronotype, Direction, TimeOfDay};
    use crate::schedule::compute_schedule;

    #[test]
    fn test_schedule_json_is_plain_data() {
        let result = compute_schedule(
            TimeOfDay::parse_12h("11:00 PM").unwrap(),
            Direction::BedToWake,
            Chronotype::Unknown,
            AgeBand::Adult,
        );

        let mut out = Vec::new();
        write_json(&result, &mut out).unwrap();
        let content = String::from_utf8(out).unwrap();

        assert!(content.contains("\"anchor\": \"11:00 PM\""));
        assert!(content.contains("\"direction\": \"bed-to-wake\""));
        assert!(content.contains("\"best_wake_time\": \"6:44 AM\""));
        assert!(content.contains("\"level\": \"mild\""));

        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["candidates"][1]["cycles"], 5);
        assert_eq!(value["landmarks"]["deep_work"][0]["start"], "9:14 AM");
    }
}
