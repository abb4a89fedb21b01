use crate::value::{Timestamp, Value};
use std::fmt;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

const NANOS_PER_MICRO: i128 = 1_000;

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Date(v) => write!(f, "{v}"),
            Self::Timestamp(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Out-of-range instants fall back to the raw microsecond count.
        let nanos = i128::from(self.as_micros()) * NANOS_PER_MICRO;
        let rendered = OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .ok()
            .and_then(|ts| ts.format(&Rfc3339).ok());

        match rendered {
            Some(text) => f.write_str(&text),
            None => write!(f, "{}us", self.as_micros()),
        }
    }
}
