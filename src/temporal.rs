use crate::error::{ReportError, Result};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A point in time as it actually appears in source documents.
///
/// The document store carries no canonical timestamp type: depending on which
/// client wrote the record, a date field may be a `{seconds, nanoseconds}`
/// object, epoch milliseconds, or ISO-8601 text. Deserialization accepts all
/// three; [`DocumentDate::resolve`] normalizes them to UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum DocumentDate {
    #[schemars(description = "Server timestamp object: whole seconds plus nanoseconds since the Unix epoch")]
    Epoch {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },

    #[schemars(description = "Milliseconds since the Unix epoch")]
    Millis(i64),

    #[schemars(description = "ISO-8601 text, with or without a time component")]
    Text(String),

    #[schemars(description = "Any other shape; resolves to no instant")]
    Unreadable(serde_json::Value),
}

impl DocumentDate {
    /// Normalizes to UTC. Returns `None` when the text representation does not
    /// parse; callers fall back to the next candidate field (see
    /// [`resolve_first`]).
    pub fn resolve(&self) -> Option<DateTime<Utc>> {
        match self {
            DocumentDate::Epoch {
                seconds,
                nanoseconds,
            } => Utc.timestamp_opt(*seconds, *nanoseconds).single(),
            DocumentDate::Millis(millis) => Utc.timestamp_millis_opt(*millis).single(),
            DocumentDate::Text(raw) => parse_text_date(raw),
            DocumentDate::Unreadable(_) => None,
        }
    }
}

fn parse_text_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&parsed));
    }

    if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&parsed.and_hms_opt(0, 0, 0).unwrap()));
    }

    None
}

/// A record with a resolvable point in time.
///
/// Each record type walks its own ordered list of candidate date fields
/// through [`resolve_first`]; the order encodes which field the source system
/// considers authoritative for that record.
pub trait Dated {
    fn recorded_at(&self) -> DateTime<Utc>;
}

/// First-defined-wins resolution over candidate date fields.
///
/// Falls back to "now" when no candidate resolves. The fallback is a
/// documented contract, not an error: a record with no usable date still
/// appears in unbounded queries, never satisfies a bounded historical window,
/// and sorts as most-recent.
pub fn resolve_first(candidates: &[Option<&DocumentDate>]) -> DateTime<Utc> {
    candidates
        .iter()
        .find_map(|candidate| candidate.and_then(|date| date.resolve()))
        .unwrap_or_else(Utc::now)
}

/// An inclusive `[from, to]` calendar interval used to scope every report.
///
/// `from` is normalized to 00:00:00.000 and `to` to 23:59:59.999 of the
/// respective calendar day, so a window built from two date pickers covers the
/// whole days the user selected. Absent bounds are unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReportingWindow {
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
}

impl ReportingWindow {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self {
            from: from.map(|day| Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap())),
            to: to.map(|day| Utc.from_utc_datetime(&day.and_hms_milli_opt(23, 59, 59, 999).unwrap())),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn starting(from: NaiveDate) -> Self {
        Self::new(Some(from), None)
    }

    pub fn up_to(to: NaiveDate) -> Self {
        Self::new(None, Some(to))
    }

    /// Window covering a single calendar month.
    pub fn month(year: i32, month: u32) -> Result<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| ReportError::DateError(format!("Invalid month {}-{:02}", year, month)))?;

        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|day| day.checked_sub_days(Days::new(1)))
            .ok_or_else(|| ReportError::DateError(format!("Invalid month {}-{:02}", year, month)))?;

        Ok(Self::new(Some(first), Some(last)))
    }

    /// Builds a window from the `YYYY-MM-DD` strings the query layer sends.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self> {
        let parse_day = |raw: &str| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                ReportError::DateError(format!("Invalid date '{}'. Expected YYYY-MM-DD", raw))
            })
        };

        let from = from.map(parse_day).transpose()?;
        let to = to.map(parse_day).transpose()?;
        Ok(Self::new(from, to))
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| instant >= from) && self.to.map_or(true, |to| instant <= to)
    }

    /// Order-preserving filter over a record collection.
    ///
    /// An unbounded window returns `Cow::Borrowed` of the input slice, so
    /// callers can cheaply detect that no filtering occurred.
    pub fn filter<'a, T>(&self, records: &'a [T]) -> Cow<'a, [T]>
    where
        T: Dated + Clone,
    {
        if self.is_unbounded() {
            return Cow::Borrowed(records);
        }

        Cow::Owned(
            records
                .iter()
                .filter(|record| self.contains(record.recorded_at()))
                .cloned()
                .collect(),
        )
    }

    /// Borrowing variant of [`ReportingWindow::filter`] used inside the
    /// aggregation passes.
    pub fn filtered<'a, T>(&'a self, records: &'a [T]) -> impl Iterator<Item = &'a T>
    where
        T: Dated,
    {
        records
            .iter()
            .filter(move |record| self.contains(record.recorded_at()))
    }
}
