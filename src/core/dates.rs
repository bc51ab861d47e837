use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// 兩位數年份的分界:小於 50 視為 2000 年代。
const YEAR_PIVOT: i32 = 50;

/// Scheduling chatter that shows up in date cells. These mean "no date",
/// not "bad date".
const PLACEHOLDER_TOKENS: &[&str] = &[
    "tbd",
    "waiting",
    "settled",
    "transferred",
    "non-retainer",
    "non retainer",
    "nonretainer",
];

fn month_abbrev_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})[-/]([A-Za-z]{3})[-/](\d{2})$").unwrap())
}

fn numeric_two_digit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})[-/](\d{1,2})[-/](\d{2})$").unwrap())
}

fn numeric_four_digit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})[-/](\d{1,2})[-/](\d{4})$").unwrap())
}

fn canonical_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap())
}

fn month_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z]{3,9})\.?\s+(\d{1,2})\s*,?\s*(\d{4})$").unwrap())
}

/// Containment check, so "waiting on retainer" counts as a placeholder.
pub fn is_placeholder(raw: &str) -> bool {
    let value = raw.trim().to_lowercase();
    PLACEHOLDER_TOKENS.iter().any(|token| value.contains(token))
}

fn expand_year(two_digit: i32) -> i32 {
    if two_digit < YEAR_PIVOT {
        2000 + two_digit
    } else {
        1900 + two_digit
    }
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let prefix = lower.get(0..3)?;
    let month = match prefix {
        "jan" => 1,
        "feb" => 2,
        "fev" => 2, // legacy exports misspell February
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn checked_date(year: i32, month: u32, day: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(year, month, day).map(|date| date.format("%Y-%m-%d").to_string())
}

/// 把各種歷史日期寫法轉成 `YYYY-MM-DD`;認不得或屬於佔位語的輸入回傳 `None`。
///
/// Numeric day and month are read day-first (`23-12-15` is 23 December
/// 2015), matching the firm's exports. Output is idempotent: feeding a
/// canonical date back in returns it unchanged.
pub fn normalize_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || is_placeholder(trimmed) {
        return None;
    }

    if let Some(caps) = month_abbrev_re().captures(trimmed) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        let year = expand_year(caps[3].parse().ok()?);
        return checked_date(year, month, day);
    }

    if let Some(caps) = numeric_two_digit_re().captures(trimmed) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year = expand_year(caps[3].parse().ok()?);
        return checked_date(year, month, day);
    }

    if let Some(caps) = canonical_re().captures(trimmed) {
        // Already canonical, but impossible dates still come back None.
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return checked_date(year, month, day);
    }

    if let Some(caps) = numeric_four_digit_re().captures(trimmed) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        return checked_date(year, month, day);
    }

    if let Some(caps) = month_name_re().captures(trimmed) {
        let month = month_number(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        return checked_date(year, month, day);
    }

    None
}

/// True when `value` is a real calendar date in canonical form.
pub fn is_canonical(value: &str) -> bool {
    canonical_re().is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_abbrev_with_two_digit_year() {
        assert_eq!(normalize_date("17-Jul-96"), Some("1996-07-17".to_string()));
        assert_eq!(normalize_date("5-jan-03"), Some("2003-01-05".to_string()));
    }

    #[test]
    fn test_numeric_two_digit_year_is_day_first() {
        assert_eq!(normalize_date("23-12-15"), Some("2015-12-23".to_string()));
    }

    #[test]
    fn test_two_digit_year_pivot() {
        assert_eq!(normalize_date("01-01-49"), Some("2049-01-01".to_string()));
        assert_eq!(normalize_date("01-01-50"), Some("1950-01-01".to_string()));
    }

    #[test]
    fn test_month_name_day_year() {
        assert_eq!(normalize_date("Feb 6, 2014"), Some("2014-02-06".to_string()));
        assert_eq!(normalize_date("September 30, 2011"), Some("2011-09-30".to_string()));
        assert_eq!(normalize_date("Mar. 4 2019"), Some("2019-03-04".to_string()));
    }

    #[test]
    fn test_numeric_four_digit_year() {
        assert_eq!(normalize_date("17-12-1971"), Some("1971-12-17".to_string()));
        assert_eq!(normalize_date("17/07/1996"), Some("1996-07-17".to_string()));
    }

    #[test]
    fn test_canonical_input_is_idempotent() {
        assert_eq!(normalize_date("1996-07-17"), Some("1996-07-17".to_string()));

        let once = normalize_date("17-Jul-96").unwrap();
        assert_eq!(normalize_date(&once), Some(once.clone()));
    }

    #[test]
    fn test_placeholders_resolve_to_none() {
        for token in ["TBD", "waiting", "SETTLED", "Transferred", "non-retainer", "non retainer"] {
            assert_eq!(normalize_date(token), None, "token: {}", token);
        }
    }

    #[test]
    fn test_placeholder_inside_longer_text() {
        assert_eq!(normalize_date("waiting on retainer"), None);
        assert_eq!(normalize_date("TBD - chasing insurer"), None);
    }

    #[test]
    fn test_february_typo() {
        assert_eq!(normalize_date("17-Fev-03"), Some("2003-02-17".to_string()));
    }

    #[test]
    fn test_impossible_dates_rejected() {
        assert_eq!(normalize_date("30-02-2015"), None);
        assert_eq!(normalize_date("2015-02-30"), None);
        assert_eq!(normalize_date("32-01-15"), None);
    }

    #[test]
    fn test_garbage_returns_none() {
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("soon"), None);
        assert_eq!(normalize_date("12345678"), None);
        assert_eq!(normalize_date("17-Xyz-96"), None);
    }

    #[test]
    fn test_is_canonical() {
        assert!(is_canonical("2014-02-06"));
        assert!(!is_canonical("2015-02-30"));
        assert!(!is_canonical("6-Feb-14"));
    }
}
