use chrono::{NaiveDate, NaiveDateTime};

/// One entry in the ordered date-format table. Date-only formats parse to
/// midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    DateTime(&'static str),
    DateOnly(&'static str),
}

/// Every format a receipt date substring is tried against, most specific
/// first. CBE app exports lead ("2/12/2026, 3:31:00 PM"), then the
/// day-first formats common on Ethiopian bank slips, then month-first US
/// shapes, month names, and ISO 8601 last.
///
/// The order is load-bearing: "05-01-2026" must read as 5 January, not
/// 1 May, so `%d-%m-%Y` outranks `%m-%d-%Y`.
pub const DATE_FORMATS: &[DateFormat] = &[
    DateFormat::DateTime("%m/%d/%Y, %I:%M:%S %p"),
    DateFormat::DateTime("%m/%d/%Y %I:%M:%S %p"),
    DateFormat::DateTime("%d-%m-%Y %H:%M:%S"),
    DateFormat::DateTime("%d/%m/%Y %H:%M:%S"),
    DateFormat::DateTime("%m/%d/%Y %H:%M:%S"),
    DateFormat::DateOnly("%d-%m-%Y"),
    DateFormat::DateOnly("%d/%m/%Y"),
    DateFormat::DateOnly("%Y-%m-%d"),
    DateFormat::DateOnly("%Y/%m/%d"),
    DateFormat::DateOnly("%m-%d-%Y"),
    DateFormat::DateOnly("%m/%d/%Y"),
    DateFormat::DateOnly("%d %b %Y"),
    DateFormat::DateOnly("%d %B %Y"),
    DateFormat::DateTime("%Y-%m-%dT%H:%M:%S"),
];

/// Try each format in order; the first one that parses wins. No format
/// matching is an ordinary `None`, never an error — the caller decides the
/// fallback.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    DATE_FORMATS.iter().find_map(|format| match format {
        DateFormat::DateTime(fmt) => NaiveDateTime::parse_from_str(s, fmt).ok(),
        DateFormat::DateOnly(fmt) => NaiveDate::parse_from_str(s, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0)),
    })
}
