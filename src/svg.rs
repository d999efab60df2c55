use crate::format::format_locale;
use crate::render::{Axis, AxisOrient, RenderState};
use crate::scene::Mark;
use std::fmt::Write;

const TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// Coordinates to three decimals; NaN stays NaN.
fn num(v: f64) -> String {
    if v.is_finite() {
        let rounded = (v * 1000.0).round() / 1000.0;
        format!("{}", if rounded == 0.0 { 0.0 } else { rounded })
    } else {
        format!("{}", v)
    }
}

fn write_axis(out: &mut String, axis: &Axis, layout_width: f64, layout_height: f64, padding: f64) {
    let (r0, r1) = axis.range;
    match axis.orient {
        AxisOrient::Bottom => {
            let _ = writeln!(
                out,
                r#"<g class="x-axis" transform="translate(0, {})" fill="none" font-size="10" font-family="sans-serif" text-anchor="middle">"#,
                num(layout_height - padding / 2.0),
            );
            let _ = writeln!(
                out,
                r#"<path class="domain" stroke="currentColor" d="M{},{}V0H{}V{}"/>"#,
                num(r0), TICK_SIZE, num(r1), TICK_SIZE,
            );
            for tick in &axis.ticks {
                let _ = writeln!(
                    out,
                    r#"<g class="tick" opacity="1" transform="translate({}, 0)"><line stroke="currentColor" y2="{}"/><text fill="currentColor" y="{}" dy="0.71em">{}</text></g>"#,
                    num(tick.position), TICK_SIZE, TICK_SIZE + TICK_PADDING, escape(&tick.label),
                );
            }
            let _ = writeln!(
                out,
                r#"<text class="axis-label" style="text-anchor: middle; fill: black;" transform="translate({}, {})">{}</text>"#,
                num(layout_width / 2.0), num(padding / 2.0 - 8.0), escape(&axis.label),
            );
        }
        AxisOrient::Left => {
            let _ = writeln!(
                out,
                r#"<g class="y-axis" transform="translate({}, 0)" fill="none" font-size="10" font-family="sans-serif" text-anchor="end">"#,
                num(padding / 2.0),
            );
            let _ = writeln!(
                out,
                r#"<path class="domain" stroke="currentColor" d="M-{},{}H0V{}H-{}"/>"#,
                TICK_SIZE, num(r0), num(r1), TICK_SIZE,
            );
            for tick in &axis.ticks {
                let _ = writeln!(
                    out,
                    r#"<g class="tick" opacity="1" transform="translate(0, {})"><line stroke="currentColor" x2="-{}"/><text fill="currentColor" x="-{}" dy="0.32em">{}</text></g>"#,
                    num(tick.position), TICK_SIZE, TICK_SIZE + TICK_PADDING, escape(&tick.label),
                );
            }
            let _ = writeln!(
                out,
                r#"<text class="axis-label" style="fill: black;" transform="rotate(90)" x="{}" y="{}">{}</text>"#,
                num(layout_height / 2.0 + padding / 2.0), num(padding / 2.0 - 5.0), escape(&axis.label),
            );
        }
    }
    out.push_str("</g>\n");
}

/// Plain-text hover content for the browser's native tooltip.
pub fn tooltip_text(mark: &Mark) -> String {
    let d = &mark.datum;
    format!(
        "{}\nPopulation: {}\nGDP ($): {}\nFertility rate (births/women): {}\nUnemployment(% labor force): {}",
        d.country_name,
        format_locale(d.population),
        format_locale(d.gdp),
        format_locale(d.fertility_rate),
        format_locale(d.unemployment),
    )
}

fn write_mark(out: &mut String, mark: &Mark) {
    let a = &mark.attrs;
    let _ = write!(
        out,
        r#"<circle class="plot" data-key="{}" cx="{}" cy="{}" r="{}""#,
        escape(&mark.key), num(a.cx), num(a.cy), num(a.r),
    );
    if let Some(fill) = a.fill {
        let _ = write!(out, r#" fill="{}""#, fill);
    }
    let _ = write!(out, "><title>{}</title>", escape(&tooltip_text(mark)));

    // In-flight transitions replay in the browser from the current attributes
    if let Some(t) = &mark.transition {
        let remaining = t.duration.saturating_sub(t.elapsed).as_millis();
        let to = &t.to;
        for (name, from, target) in [("cx", a.cx, to.cx), ("cy", a.cy, to.cy), ("r", a.r, to.r)] {
            let _ = write!(
                out,
                r#"<animate attributeName="{}" from="{}" to="{}" dur="{}ms" calcMode="linear" fill="freeze"/>"#,
                name, num(from), num(target), remaining,
            );
        }
        if let Some(target) = to.fill {
            let from = a.fill.unwrap_or(target);
            let _ = write!(
                out,
                r#"<animate attributeName="fill" from="{}" to="{}" dur="{}ms" calcMode="linear" fill="freeze"/>"#,
                from, target, remaining,
            );
        }
    }
    out.push_str("</circle>\n");
}

/// Serializes the current state as a standalone SVG document.
pub fn to_svg(state: &RenderState) -> String {
    let layout = &state.layout;
    let mut out = String::new();

    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = num(layout.width),
        h = num(layout.height),
    );
    let _ = writeln!(
        out,
        r#"<text class="graph-title" transform="translate({}, {})" style="fill: black; text-anchor: middle;">{}</text>"#,
        num(layout.width / 2.0), num(layout.padding / 2.0), escape(&state.title),
    );
    write_axis(&mut out, &state.x_axis, layout.width, layout.height, layout.padding);
    write_axis(&mut out, &state.y_axis, layout.width, layout.height, layout.padding);
    for mark in state.scene.marks() {
        write_mark(&mut out, mark);
    }
    out.push_str("</svg>\n");
    out
}
