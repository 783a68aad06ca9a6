//! Date helper functions

use chrono::{DateTime, TimeZone};

use crate::cms::Timestamp;

/// Format a date using a date-fns compatible format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "dd MMM yyyy") // -> "15 Mar 2021"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let chrono_format = date_fns_to_chrono_format(format);
    date.format(&chrono_format).to_string()
}

/// Format an optional publication date, empty when unknown
pub fn format_publication_date(date: Option<&Timestamp>, format: &str) -> String {
    date.map(|d| format_date(d, format)).unwrap_or_default()
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Convert date-fns format tokens to chrono specifiers
///
/// Runs of the same letter form one token (`yyyy`, `MMM`, `d`). Text in
/// single quotes is copied literally; unknown letters are kept as-is.
fn date_fns_to_chrono_format(format: &str) -> String {
    let chars: Vec<char> = format.chars().collect();
    let mut result = String::with_capacity(format.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut result, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            push_literal(&mut result, c);
            i += 1;
            continue;
        }

        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }

        let spec = match (c, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1) => "%-m",
            ('M', 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', 1) => "%-d",
            ('d', _) => "%d",
            ('H', 1) => "%-H",
            ('H', _) => "%H",
            ('h', 1) => "%-I",
            ('h', _) => "%I",
            ('m', 1) => "%-M",
            ('m', _) => "%M",
            ('s', 1) => "%-S",
            ('s', _) => "%S",
            ('E', 4) => "%A",
            ('E', _) => "%a",
            ('a', _) => "%p",
            _ => {
                for _ in 0..run {
                    push_literal(&mut result, c);
                }
                i += run;
                continue;
            }
        };

        result.push_str(spec);
        i += run;
    }

    result
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}
