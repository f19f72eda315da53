use std::f64::consts::PI;

use crate::panel::{self, Line};
use crate::session::Frame;
use crate::theme::Theme;

const START_Y: i32 = 30;
const LINE_HEIGHT: i32 = 20;
const LEFT_PADDING: f32 = 15.0;
const GAP_BETWEEN_COLUMNS: f32 = 30.0;
const RIGHT_PADDING: f32 = 30.0;
const CHAR_WIDTH: f32 = 9.6;
const RING_RADIUS: f64 = 90.0;
const RING_STROKE: f64 = 14.0;

// Utilities for building SVG content

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Path of the year-progress sweep, clockwise from twelve o'clock.
fn arc_path(cx: f64, cy: f64, r: f64, progress: f64) -> String {
    let progress = progress.clamp(0.0, 1.0);
    if progress >= 0.999_999 {
        // A single arc cannot close on itself; draw two halves.
        return format!(
            "M {cx:.2} {top:.2} A {r} {r} 0 1 1 {cx:.2} {bottom:.2} A {r} {r} 0 1 1 {cx:.2} {top:.2}",
            top = cy - r,
            bottom = cy + r
        );
    }

    let angle = progress * 2.0 * PI;
    let x = cx + r * angle.sin();
    let y = cy - r * angle.cos();
    let large_arc = if angle > PI { 1 } else { 0 };

    format!(
        "M {cx:.2} {top:.2} A {r} {r} 0 {large_arc} 1 {x:.2} {y:.2}",
        top = cy - r
    )
}

// Builds the progress ring and returns (markup, width, height)

fn build_ring(frame: &Frame, theme: Theme) -> (String, f32, f32) {
    let colors = theme.colors();
    let size = (RING_RADIUS + RING_STROKE) * 2.0;
    let cx = LEFT_PADDING as f64 + size / 2.0;
    let cy = START_Y as f64 + size / 2.0 - 10.0;

    let sweep = if frame.progress > 0.0 {
        format!(
            r#"<path d="{d}" fill="none" stroke="{accent}" stroke-width="{RING_STROKE}" stroke-linecap="round"/>"#,
            d = arc_path(cx, cy, RING_RADIUS, frame.progress),
            accent = colors.accent
        )
    } else {
        String::new()
    };

    let markup = format!(
        r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{RING_RADIUS}" fill="none" stroke="{track}" stroke-width="{RING_STROKE}"/>
{sweep}
<text x="{cx:.2}" y="{years_y:.2}" text-anchor="middle" font-size="48px" class="value">{years}</text>
<text x="{cx:.2}" y="{label_y:.2}" text-anchor="middle" class="cc">years · {pct:.4}%</text>
"#,
        track = colors.cc,
        years_y = cy + 12.0,
        label_y = cy + 40.0,
        years = frame.age.years,
        pct = frame.progress * 100.0
    );

    let width = (LEFT_PADDING as f64 + size) as f32;
    let height = (START_Y as f64 + size) as f32;
    (markup, width, height)
}

// Builds the right column content and returns (tspans, width, height)

fn build_right_column(frame: &Frame, ring_width_px: f32, ring_height_px: f32) -> (String, f32, f32) {
    let (lines, align_width) = panel::frame_lines(frame, None);

    let right_height_px = lines.len() as f32 * LINE_HEIGHT as f32 + START_Y as f32;
    let right_x = ring_width_px + GAP_BETWEEN_COLUMNS;

    let mut right_tspans = String::new();
    for (i, line) in lines.iter().enumerate() {
        let y = START_Y + (i as i32) * LINE_HEIGHT;

        match line {
            Line::Blank => {}
            Line::Header(text) => {
                right_tspans.push_str(&format!(
                    r#"<tspan x="{right_x}" y="{y}">{}</tspan>
"#,
                    escape_xml(text)
                ));
            }
            Line::Message(text) | Line::Text(text) => {
                right_tspans.push_str(&format!(
                    r#"<tspan x="{right_x}" y="{y}" class="accent">{}</tspan>
"#,
                    escape_xml(text)
                ));
            }
            Line::Stat { key, dots, value } => {
                right_tspans.push_str(&format!(
                    r#"<tspan x="{right_x}" y="{y}" class="cc">. </tspan>
<tspan class="key">{}</tspan><tspan class="cc">{}</tspan><tspan class="value">{}</tspan>
"#,
                    escape_xml(key),
                    escape_xml(dots),
                    escape_xml(value)
                ));
            }
        }
    }

    let content_width = right_x + (align_width as f32) * CHAR_WIDTH + RIGHT_PADDING;
    let content_height = ring_height_px.max(right_height_px) + 30.0;

    (right_tspans, content_width, content_height)
}

/// Main SVG generation function
pub fn generate_svg(frame: &Frame, theme: Theme) -> String {
    let colors = theme.colors();

    let (ring, ring_width_px, ring_height_px) = build_ring(frame, theme);
    let (right_tspans, w, h) = build_right_column(frame, ring_width_px, ring_height_px);

    format!(
        r#"<?xml version='1.0' encoding='UTF-8'?>
<svg xmlns="http://www.w3.org/2000/svg"
     width="{w}px" height="{h}px"
     font-family="ConsolasFallback,Consolas,monospace"
     font-size="16px">

<style>
.key      {{ fill: {key}; }}
.value    {{ fill: {value}; }}
.cc       {{ fill: {cc}; }}
.accent   {{ fill: {accent}; }}
</style>

<rect width="{w}px" height="{h}px" fill="{bg}" rx="15"/>

<!-- LEFT PROGRESS RING -->
{ring}
<!-- RIGHT COLUMN -->
<text fill="{text}">
{right}
</text>

</svg>
"#,
        w = w,
        h = h,
        bg = colors.bg,
        text = colors.text,
        key = colors.key,
        value = colors.value,
        cc = colors.cc,
        accent = colors.accent,
        ring = ring,
        right = right_tspans
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::age::{AgeBreakdown, TotalUnits};

    fn frame(progress: f64) -> Frame {
        Frame {
            age: AgeBreakdown {
                years: 32,
                ..AgeBreakdown::default()
            },
            progress,
            totals: TotalUnits::default(),
            celebrate: false,
            message: Some("<3 & cake".to_owned()),
        }
    }

    #[test]
    fn arc_uses_large_flag_past_half() {
        assert!(arc_path(100.0, 100.0, 50.0, 0.25).contains(" 0 0 1 150.00 100.00"));
        assert!(arc_path(100.0, 100.0, 50.0, 0.75).contains(" 0 1 1 50.00 100.00"));
        assert_eq!(arc_path(100.0, 100.0, 50.0, 1.0).matches(" A ").count(), 2);
    }

    #[test]
    fn themes_pick_their_palette() {
        let dark = generate_svg(&frame(0.5), Theme::Dark);
        let light = generate_svg(&frame(0.5), Theme::Light);

        assert!(dark.contains(Theme::Dark.colors().bg));
        assert!(light.contains(Theme::Light.colors().bg));
        assert!(dark.starts_with("<?xml"));
        assert!(dark.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn content_is_escaped() {
        let svg = generate_svg(&frame(0.5), Theme::Dark);
        assert!(svg.contains("&lt;3 &amp; cake"));
        assert!(!svg.contains("<3 & cake"));
    }

    #[test]
    fn zero_progress_draws_no_sweep() {
        let svg = generate_svg(&frame(0.0), Theme::Dark);
        assert!(!svg.contains("<path"));
        assert!(generate_svg(&frame(0.3), Theme::Dark).contains("<path"));
    }
}
