//! Layout shared by the terminal and SVG renderers: a column of
//! `key: ....... value` rows under dashed headers.

use crate::insights::{Insight, InsightCategory};
use crate::session::Frame;

pub const MIN_ALIGN_WIDTH: usize = 44;

pub enum Line {
    Header(String),
    Blank,
    Stat {
        key: String,
        dots: String,
        value: String,
    },
    /// Free text under a row, not aligned.
    Text(String),
    Message(String),
}

pub fn build_stat_row(key: &str, value: &str, align_width: usize) -> (String, String, String) {
    let key_part = format!("{key}: ");
    let base_len = key_part.chars().count() + value.chars().count();
    let available = align_width.saturating_sub(base_len);

    let dots = match available {
        0 => "".to_string(),
        1 => " ".to_string(),
        2 => ". ".to_string(),
        n => ".".repeat(n),
    };

    (key_part, dots, value.to_string())
}

pub fn build_header_line(label: &str, align_width: usize) -> String {
    let base = format!("{label} ");
    let dash_count = align_width.saturating_sub(base.chars().count()) + 2;
    format!("{base}{}", "-".repeat(dash_count))
}

/// `value` with `decimals` places and comma-grouped thousands.
pub fn format_number(value: f64, decimals: usize) -> String {
    let fixed = format!("{value:.decimals$}");
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

pub fn category_label(category: InsightCategory) -> &'static str {
    match category {
        InsightCategory::Historical => "historical",
        InsightCategory::Celestial => "celestial",
        InsightCategory::Milestone => "milestone",
        InsightCategory::FunFact => "fun-fact",
    }
}

/// Lay out one frame. Returns the lines and the alignment width used.
pub fn frame_lines(frame: &Frame, insights: Option<&[Insight]>) -> (Vec<Line>, usize) {
    let age = &frame.age;
    let age_value = format!(
        "{} years, {} months, {} days",
        age.years, age.months, age.days
    );
    let clock_value = format!("{:02}:{:02}:{:02}", age.hours, age.minutes, age.seconds);
    let progress_value = format!("{:.6}%", frame.progress * 100.0);

    let days_value = format_number(frame.totals.days, 5);
    let hours_value = format_number(frame.totals.hours, 4);
    let minutes_value = format_number(frame.totals.minutes, 2);
    let seconds_value = format_number(frame.totals.seconds as f64, 0);

    let rows: Vec<(&str, &String)> = vec![
        ("Age", &age_value),
        ("Clock", &clock_value),
        ("Year progress", &progress_value),
        ("Total days", &days_value),
        ("Total hours", &hours_value),
        ("Total minutes", &minutes_value),
        ("Total seconds", &seconds_value),
    ];

    let mut align_width = rows
        .iter()
        .map(|(k, v)| k.len() + 2 + v.len())
        .max()
        .unwrap_or(0);
    if let Some(items) = insights {
        for item in items {
            align_width = align_width.max(item.title.chars().count() + 2 + 12);
        }
    }
    align_width = align_width.max(MIN_ALIGN_WIDTH);

    let stat = |key: &str, value: &str| {
        let (key, dots, value) = build_stat_row(key, value, align_width);
        Line::Stat { key, dots, value }
    };

    let mut lines = vec![Line::Header(build_header_line("lifeclock", align_width))];
    for (key, value) in &rows[..3] {
        lines.push(stat(key, value));
    }
    lines.push(Line::Blank);
    lines.push(Line::Header(build_header_line("- Totals", align_width)));
    for (key, value) in &rows[3..] {
        lines.push(stat(key, value));
    }

    if let Some(message) = &frame.message {
        lines.push(Line::Blank);
        lines.push(Line::Message(message.clone()));
    }

    if let Some(items) = insights {
        lines.push(Line::Blank);
        lines.push(Line::Header(build_header_line("- Insights", align_width)));
        for item in items {
            lines.push(stat(&item.title, category_label(item.category)));
            lines.push(Line::Text(item.content.clone()));
        }
    }

    (lines, align_width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::age::{AgeBreakdown, TotalUnits};

    fn frame() -> Frame {
        Frame {
            age: AgeBreakdown {
                years: 32,
                months: 4,
                days: 3,
                hours: 5,
                minutes: 6,
                seconds: 7,
                total_seconds_elapsed: 1_020_000_000,
            },
            progress: 0.25,
            totals: TotalUnits {
                days: 11_805.555_555_5,
                hours: 283_333.333_3,
                minutes: 17_000_000.0,
                seconds: 1_020_000_000,
            },
            celebrate: false,
            message: None,
        }
    }

    fn stat_values(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .filter_map(|l| match l {
                Line::Stat { key, value, .. } => Some(format!("{key}{value}")),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn formats_numbers_with_grouping() {
        assert_eq!(format_number(1234567.0, 0), "1,234,567");
        assert_eq!(format_number(11805.5555555, 5), "11,805.55556");
        assert_eq!(format_number(999.5, 2), "999.50");
        assert_eq!(format_number(0.0, 2), "0.00");
        assert_eq!(format_number(-1234.0, 0), "-1,234");
    }

    #[test]
    fn stat_rows_pad_to_width() {
        let (k, d, v) = build_stat_row("Age", "1", 20);
        assert_eq!(format!("{k}{d}{v}").len(), 20);
        assert_eq!(build_stat_row("Key", "value", 10).1, "");
        assert_eq!(build_header_line("- Totals", 12), "- Totals -----");
    }

    #[test]
    fn frame_rows() {
        let (lines, width) = frame_lines(&frame(), None);
        assert!(width >= MIN_ALIGN_WIDTH);

        let values = stat_values(&lines);
        assert_eq!(
            values,
            vec![
                "Age: 32 years, 4 months, 3 days",
                "Clock: 05:06:07",
                "Year progress: 25.000000%",
                "Total days: 11,805.55556",
                "Total hours: 283,333.3333",
                "Total minutes: 17,000,000.00",
                "Total seconds: 1,020,000,000",
            ]
        );
        assert!(!lines.iter().any(|l| matches!(l, Line::Message(_))));
    }

    #[test]
    fn message_and_insights_are_appended() {
        let mut frame = frame();
        frame.message = Some("Happy birthday!".to_owned());
        let insights = crate::insights::fallback();

        let (lines, _) = frame_lines(&frame, Some(insights.as_slice()));
        assert!(lines.iter().any(|l| matches!(l, Line::Message(m) if m == "Happy birthday!")));
        assert!(stat_values(&lines).contains(&"Journey Through Time: celestial".to_owned()));
        assert!(matches!(lines.last(), Some(Line::Text(t)) if t.contains("67,000")));
    }
}
