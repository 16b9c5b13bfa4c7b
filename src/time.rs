use chrono::prelude::{DateTime, Utc};

pub fn iso8601(dt: DateTime<Utc>) -> String {
    dt.format("%+").to_string()
}

pub fn parse_iso8601(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}
