//! Token helpers shared by the record parsers

use crate::app::models::records::RawLine;

/// Strip a byte-order mark, normalise line endings and drop leading blank lines
pub fn normalize_text(text: &str) -> String {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    text.trim_start_matches(['\n', ' ', '\t']).to_string()
}

/// Right-pad a record to a fixed character width
pub fn pad_record(line: &str, width: usize) -> String {
    let length = line.chars().count();
    if length >= width {
        line.to_string()
    } else {
        let mut padded = String::with_capacity(line.len() + width - length);
        padded.push_str(line);
        padded.extend(std::iter::repeat_n(' ', width - length));
        padded
    }
}

/// Split text into fixed-width records
///
/// Newline-delimited text keeps its lines. Text without line breaks that is
/// longer than one record is cut into consecutive chunks. Every record is
/// right-padded to `width`.
pub fn split_fixed_records(text: &str, width: usize) -> Vec<RawLine> {
    if !text.contains('\n') && text.chars().count() > width {
        let chars: Vec<char> = text.chars().collect();
        return chars
            .chunks(width)
            .enumerate()
            .map(|(index, chunk)| {
                let record: String = chunk.iter().collect();
                RawLine::new(index + 1, pad_record(&record, width))
            })
            .filter(|line| !line.text.trim().is_empty())
            .collect();
    }

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| RawLine::new(index + 1, pad_record(line, width)))
        .collect()
}

/// Frequency rate; blank or zero means every week
pub fn parse_frequency_rate(token: Option<&str>) -> u32 {
    token
        .and_then(|t| t.trim().parse::<u32>().ok())
        .filter(|rate| *rate >= 1)
        .unwrap_or(1)
}

/// UTC variation such as `+0100` or `-0530`, in minutes
pub fn parse_utc_variation(token: Option<&str>) -> Option<i32> {
    let token = token?.trim();
    if token.len() != 5 || !token.is_ascii() {
        return None;
    }
    let sign = match &token[..1] {
        "+" => 1,
        "-" => -1,
        _ => return None,
    };
    let hours: i32 = token[1..3].parse().ok()?;
    let minutes: i32 = token[3..5].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    Some(sign * (hours * 60 + minutes))
}

/// Seat count token, kept only when it is a number
pub fn parse_seats(token: Option<&str>) -> Option<String> {
    token
        .map(str::trim)
        .filter(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
}

/// First and last station of a `/`-separated stop list
pub fn split_stations(stations: Option<&str>) -> (Option<String>, Option<String>) {
    let parts: Vec<&str> = stations
        .unwrap_or("")
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    match parts.as_slice() {
        [] => (None, None),
        [only] => (Some(only.to_string()), None),
        [first, .., last] => (Some(first.to_string()), Some(last.to_string())),
    }
}

/// Owned copy of a non-blank value
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("\u{feff}\r\nSCR\r\n/\r\n"), "SCR\n/\n");
        assert_eq!(normalize_text("a\rb"), "a\nb");
    }

    #[test]
    fn test_pad_record() {
        assert_eq!(pad_record("3BA", 5), "3BA  ");
        assert_eq!(pad_record("12345", 3), "12345");
    }

    #[test]
    fn test_split_fixed_records_chunks_undelimited_text() {
        let text = format!("{}{}", "1".repeat(10), "3".repeat(4));
        let records = split_fixed_records(&text, 10);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "1".repeat(10));
        assert_eq!(records[1].text, "3333      ");
        assert_eq!(records[1].number, 2);
    }

    #[test]
    fn test_split_fixed_records_keeps_line_numbers() {
        let records = split_fixed_records("1AB\n\n3CD", 4);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], RawLine::new(3, "3CD "));
    }

    #[test]
    fn test_frequency_rate() {
        assert_eq!(parse_frequency_rate(None), 1);
        assert_eq!(parse_frequency_rate(Some(" ")), 1);
        assert_eq!(parse_frequency_rate(Some("0")), 1);
        assert_eq!(parse_frequency_rate(Some("2")), 2);
    }

    #[test]
    fn test_utc_variation() {
        assert_eq!(parse_utc_variation(Some("+0100")), Some(60));
        assert_eq!(parse_utc_variation(Some("-0530")), Some(-330));
        assert_eq!(parse_utc_variation(Some("0100")), None);
        assert_eq!(parse_utc_variation(Some("+0199")), None);
        assert_eq!(parse_utc_variation(None), None);
    }

    #[test]
    fn test_split_stations() {
        assert_eq!(split_stations(None), (None, None));
        assert_eq!(split_stations(Some("AMS")), (Some("AMS".to_string()), None));
        assert_eq!(
            split_stations(Some("AMS/FRA/JFK")),
            (Some("AMS".to_string()), Some("JFK".to_string()))
        );
    }

    #[test]
    fn test_parse_seats() {
        assert_eq!(parse_seats(Some(" 180 ")), Some("180".to_string()));
        assert_eq!(parse_seats(Some("18O")), None);
        assert_eq!(non_blank(Some("  ")), None);
    }
}
