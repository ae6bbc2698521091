//! Display formatting for amounts, timestamps and category glyphs
//!
//! Every function here is total: unknown icons, missing categories and
//! unrepresentable timestamps all map to a fallback string.

use crate::config::Config;
use crate::services::day_filter::local_datetime;
use chrono::{Datelike, Timelike, Weekday};
use chrono_tz::Tz;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Glyph used for unknown or absent icon identifiers
pub const FALLBACK_GLYPH: &str = "📦";

/// Label used when an expense has no category
pub const NO_CATEGORY_LABEL: &str = "No category";

/// Tokens of a Java-style date pattern: quoted literals or runs of a field letter
static PATTERN_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'(?:[^']|'')*'|y+|M+|d+|H+|h+|m+|s+|E+|a+").unwrap());

/// Icon identifier to glyph lookup table
const ICON_GLYPHS: &[(&str, &str)] = &[
    ("restaurant", "🍽️"),
    ("directions_car", "🚗"),
    ("shopping_cart", "🛒"),
    ("local_hospital", "🏥"),
    ("movie", "🎬"),
    ("more_horiz", "📦"),
    ("coffee", "☕"),
    ("home", "🏠"),
    ("work", "💼"),
    ("school", "🏫"),
    ("sports", "⚽"),
    ("beauty", "💄"),
    ("gas_station", "⛽"),
    ("phone", "📱"),
    ("book", "📚"),
];

/// Language used for weekday, month and am/pm names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "en")]
    English,
}

impl Locale {
    fn weekday(&self, day: Weekday, long: bool) -> &'static str {
        const KO: [&str; 7] = ["월", "화", "수", "목", "금", "토", "일"];
        const KO_LONG: [&str; 7] = ["월요일", "화요일", "수요일", "목요일", "금요일", "토요일", "일요일"];
        const EN: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
        const EN_LONG: [&str; 7] = [
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
            "Sunday",
        ];

        let idx = day.num_days_from_monday() as usize;
        match (self, long) {
            (Locale::Korean, false) => KO[idx],
            (Locale::Korean, true) => KO_LONG[idx],
            (Locale::English, false) => EN[idx],
            (Locale::English, true) => EN_LONG[idx],
        }
    }

    fn month_name(&self, month: u32, long: bool) -> String {
        const EN: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        const EN_LONG: [&str; 12] = [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ];

        let idx = (month.clamp(1, 12) - 1) as usize;
        match (self, long) {
            (Locale::Korean, _) => format!("{}월", month),
            (Locale::English, false) => EN[idx].to_string(),
            (Locale::English, true) => EN_LONG[idx].to_string(),
        }
    }

    fn am_pm(&self, pm: bool) -> &'static str {
        match (self, pm) {
            (Locale::Korean, false) => "오전",
            (Locale::Korean, true) => "오후",
            (Locale::English, false) => "AM",
            (Locale::English, true) => "PM",
        }
    }
}

/// Formatter configured with an explicit timezone, locale and currency suffix
#[derive(Debug, Clone)]
pub struct Formatter {
    pub tz: Tz,
    pub locale: Locale,
    pub currency_suffix: String,
}

impl Formatter {
    pub fn new(tz: Tz, locale: Locale, currency_suffix: impl Into<String>) -> Self {
        Self {
            tz,
            locale,
            currency_suffix: currency_suffix.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tz(), config.locale, config.currency_suffix.clone())
    }

    /// Grouped digits followed by the currency suffix, e.g. `12,345원`
    pub fn format_amount(&self, amount: u64) -> String {
        format!("{}{}", group_digits(amount), self.currency_suffix)
    }

    /// Render an epoch-millisecond instant with a Java-style pattern
    pub fn format_timestamp(&self, millis: i64, pattern: &str) -> String {
        let Some(dt) = local_datetime(millis, &self.tz) else {
            return "-".to_string();
        };

        let mut out = String::with_capacity(pattern.len() + 8);
        let mut last = 0;

        for token in PATTERN_TOKEN.find_iter(pattern) {
            out.push_str(&pattern[last..token.start()]);
            last = token.end();

            let text = token.as_str();
            let width = text.chars().count();
            match text.chars().next() {
                Some('\'') => {
                    let inner = &text[1..text.len() - 1];
                    // '' is an escaped single quote, inside or outside a literal
                    if inner.is_empty() {
                        out.push('\'');
                    } else {
                        out.push_str(&inner.replace("''", "'"));
                    }
                }
                Some('y') if width == 2 => out.push_str(&format!("{:02}", dt.year().rem_euclid(100))),
                Some('y') => out.push_str(&format!("{:0width$}", dt.year(), width = width)),
                Some('M') if width >= 3 => out.push_str(&self.locale.month_name(dt.month(), width >= 4)),
                Some('M') => out.push_str(&pad(dt.month(), width)),
                Some('d') => out.push_str(&pad(dt.day(), width)),
                Some('H') => out.push_str(&pad(dt.hour(), width)),
                Some('h') => out.push_str(&pad(dt.hour12().1, width)),
                Some('m') => out.push_str(&pad(dt.minute(), width)),
                Some('s') => out.push_str(&pad(dt.second(), width)),
                Some('E') => out.push_str(self.locale.weekday(dt.weekday(), width >= 4)),
                Some('a') => out.push_str(self.locale.am_pm(dt.hour12().0)),
                _ => out.push_str(text),
            }
        }
        out.push_str(&pattern[last..]);
        out
    }
}

fn pad(value: u32, width: usize) -> String {
    if width >= 2 {
        format!("{:02}", value)
    } else {
        value.to_string()
    }
}

/// Insert a comma every three digits
pub fn group_digits(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Glyph for a category icon identifier
pub fn icon_glyph(icon: Option<&str>) -> &'static str {
    icon.and_then(|name| {
        ICON_GLYPHS
            .iter()
            .find(|(id, _)| *id == name)
            .map(|(_, glyph)| *glyph)
    })
    .unwrap_or(FALLBACK_GLYPH)
}

/// Category name, or the fallback label when absent
pub fn category_label(name: Option<&str>) -> &str {
    name.unwrap_or(NO_CATEGORY_LABEL)
}

/// Truncate to a terminal display width, ending with `…` when cut
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Seoul;

    /// 2024-03-05 (Tuesday) 15:07:09 in Seoul
    const TUE_AFTERNOON: i64 = 1_709_618_829_000;

    fn korean() -> Formatter {
        Formatter::new(Seoul, Locale::Korean, "원")
    }

    #[test]
    fn test_format_amount_groups_digits() {
        let f = korean();
        assert_eq!(f.format_amount(0), "0원");
        assert_eq!(f.format_amount(999), "999원");
        assert_eq!(f.format_amount(1_000), "1,000원");
        assert_eq!(f.format_amount(12_345), "12,345원");
        assert_eq!(f.format_amount(1_234_567_890), "1,234,567,890원");
    }

    #[test]
    fn test_format_timestamp_korean_patterns() {
        let f = korean();
        assert_eq!(
            f.format_timestamp(TUE_AFTERNOON, "yyyy년 MM월 dd일 (E)"),
            "2024년 03월 05일 (화)"
        );
        assert_eq!(
            f.format_timestamp(TUE_AFTERNOON, "yyyy년 MM월 dd일 HH:mm"),
            "2024년 03월 05일 15:07"
        );
        assert_eq!(f.format_timestamp(TUE_AFTERNOON, "HH:mm"), "15:07");
        assert_eq!(f.format_timestamp(TUE_AFTERNOON, "a h:mm:ss"), "오후 3:07:09");
    }

    #[test]
    fn test_format_timestamp_english_and_literals() {
        let f = Formatter::new(Seoul, Locale::English, "");
        assert_eq!(
            f.format_timestamp(TUE_AFTERNOON, "EEEE, MMM d yy"),
            "Tuesday, Mar 5 24"
        );
        assert_eq!(
            f.format_timestamp(TUE_AFTERNOON, "'day' d 'o''clock'"),
            "day 5 o'clock"
        );
        assert_eq!(f.format_timestamp(TUE_AFTERNOON, "HH'h'''"), "15h'");
        assert_eq!(f.format_timestamp(TUE_AFTERNOON, "''"), "'");
    }

    #[test]
    fn test_format_timestamp_out_of_range() {
        assert_eq!(korean().format_timestamp(i64::MAX, "yyyy"), "-");
    }

    #[test]
    fn test_icon_glyph_is_total() {
        assert_eq!(icon_glyph(Some("restaurant")), "🍽️");
        assert_eq!(icon_glyph(Some("book")), "📚");
        assert_eq!(icon_glyph(Some("definitely-unknown")), FALLBACK_GLYPH);
        assert_eq!(icon_glyph(Some("")), FALLBACK_GLYPH);
        assert_eq!(icon_glyph(None), FALLBACK_GLYPH);

        for (id, glyph) in ICON_GLYPHS {
            assert_eq!(icon_glyph(Some(id)), *glyph);
            assert!(!glyph.is_empty());
        }
    }

    #[test]
    fn test_category_label_fallback() {
        assert_eq!(category_label(Some("교통")), "교통");
        assert_eq!(category_label(None), NO_CATEGORY_LABEL);
    }

    #[test]
    fn test_truncate_to_width_handles_wide_chars() {
        assert_eq!(truncate_to_width("coffee", 10), "coffee");
        assert_eq!(truncate_to_width("americano", 5), "amer…");
        // Hangul syllables are two columns wide
        assert_eq!(truncate_to_width("아메리카노", 5), "아메…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }
}
