//! Conversions between `HH:MM` text and minutes since midnight.

use crate::error::{TimetableError, TimetableResult};

/// Minutes since midnight.
pub type Minutes = u32;

pub const MINUTES_PER_DAY: Minutes = 24 * 60;

/// Parse `HH:MM` (one or two digit hour, two digit minute) into minutes since
/// midnight. `24:00` and anything later is rejected.
pub fn parse_time(text: &str) -> TimetableResult<Minutes> {
    let parse_err = || TimetableError::Parse {
        input: text.to_string(),
    };
    let trimmed = text.trim();
    let (hours, minutes) = trimmed.split_once(':').ok_or_else(parse_err)?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return Err(parse_err());
    }
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(parse_err());
    }
    let hours: Minutes = hours.parse().map_err(|_| parse_err())?;
    let minutes: Minutes = minutes.parse().map_err(|_| parse_err())?;
    if hours >= 24 || minutes >= 60 {
        return Err(parse_err());
    }
    Ok(hours * 60 + minutes)
}

/// Render minutes as `HH:MM`. Hours wrap modulo 24.
pub fn format_time(minutes: Minutes) -> String {
    let hours = (minutes / 60) % 24;
    format!("{:02}:{:02}", hours, minutes % 60)
}

const END_OF_DAY: &str = "24:00";

/// Serde adapter storing a minute value as `HH:MM` text. A lesson may end
/// exactly at midnight, which is stored as `24:00`.
pub mod clock {
    use super::{END_OF_DAY, MINUTES_PER_DAY, Minutes, format_time, parse_time};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(value: &Minutes, serializer: S) -> Result<S::Ok, S::Error> {
        if *value == MINUTES_PER_DAY {
            return serializer.serialize_str(END_OF_DAY);
        }
        serializer.serialize_str(&format_time(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Minutes, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.trim() == END_OF_DAY {
            return Ok(MINUTES_PER_DAY);
        }
        parse_time(&text).map_err(D::Error::custom)
    }
}

/// Serde adapter storing a list of minute values as `HH:MM` strings.
pub mod clock_list {
    use super::{Minutes, format_time, parse_time};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(values: &[Minutes], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|value| format_time(*value)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Minutes>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|text| parse_time(text).map_err(D::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_padded_and_unpadded_hours() {
        assert_eq!(parse_time("08:00").unwrap(), 480);
        assert_eq!(parse_time("8:05").unwrap(), 485);
        assert_eq!(parse_time(" 23:59 ").unwrap(), 1439);
        assert_eq!(parse_time("00:00").unwrap(), 0);
    }

    #[test]
    fn rejects_malformed_text() {
        for bad in ["", "8", "08:0", "08:000", "ab:cd", "24:00", "12:60", "-1:30", "08-00", "+8:00"] {
            assert_eq!(
                parse_time(bad),
                Err(TimetableError::Parse {
                    input: bad.to_string()
                }),
                "{bad}"
            );
        }
    }

    #[test]
    fn format_wraps_past_midnight() {
        assert_eq!(format_time(480), "08:00");
        assert_eq!(format_time(1439), "23:59");
        assert_eq!(format_time(MINUTES_PER_DAY), "00:00");
        assert_eq!(format_time(MINUTES_PER_DAY + 75), "01:15");
    }
}
