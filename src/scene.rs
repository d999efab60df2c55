use crate::format::format_locale;
use crate::scale::Rgb;
use crate::svg::escape;
use crate::types::Record;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Visual attributes of one circle. `fill` is unset until the first
/// transition lands a color on it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MarkAttrs {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    pub fill: Option<Rgb>,
}

impl MarkAttrs {
    pub fn interpolate(&self, to: &MarkAttrs, t: f64) -> MarkAttrs {
        let number = |a: f64, b: f64| a * (1.0 - t) + b * t;
        let fill = match (self.fill, to.fill) {
            (Some(a), Some(b)) => Some(a.mix(&b, t)),
            (None, b) => b,
            (a, None) => if t >= 1.0 { None } else { a },
        };
        MarkAttrs {
            cx: number(self.cx, to.cx),
            cy: number(self.cy, to.cy),
            r: number(self.r, to.r),
            fill,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ease {
    #[default]
    Linear,
}

impl Ease {
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Ease::Linear => t,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: MarkAttrs,
    pub to: MarkAttrs,
    pub duration: Duration,
    pub elapsed: Duration,
    pub ease: Ease,
}

impl Transition {
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            1.0
        } else {
            (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
        }
    }
}

/// One circle bound to one country. `id` is assigned on creation and never
/// changes while the mark lives, so it identifies the element across renders.
#[derive(Debug, Clone)]
pub struct Mark {
    pub id: u64,
    pub key: String,
    pub datum: Record,
    pub attrs: MarkAttrs,
    pub transition: Option<Transition>,
}

impl Mark {
    fn start_transition(&mut self, to: MarkAttrs, duration: Duration) {
        // replaces (interrupts) any in-flight transition, starting from where it got to
        self.transition = Some(Transition {
            from: self.attrs,
            to,
            duration,
            elapsed: Duration::ZERO,
            ease: Ease::Linear,
        });
    }

    fn advance(&mut self, dt: Duration) {
        let Some(transition) = self.transition.as_mut() else { return };
        transition.elapsed += dt;
        let t = transition.progress();
        if t >= 1.0 {
            self.attrs = transition.to;
            self.transition = None;
        } else {
            self.attrs = transition.from.interpolate(&transition.to, transition.ease.apply(t));
        }
    }
}

/// Keyed reconciliation of the existing marks against a new working set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkDiff {
    /// In the working set, no mark yet. Working-set order.
    pub enter: Vec<String>,
    /// In the working set and already marked. Working-set order.
    pub update: Vec<String>,
    /// Marked but absent from the working set. Scene order.
    pub exit: Vec<String>,
}

pub fn diff_marks<'a, K>(existing: K, working_set: &[&Record]) -> MarkDiff
where
    K: IntoIterator<Item = &'a str>,
{
    let existing: Vec<&str> = existing.into_iter().collect();
    let existing_set: HashSet<&str> = existing.iter().copied().collect();
    let mut incoming: HashSet<&str> = HashSet::new();
    let mut diff = MarkDiff::default();

    for record in working_set {
        let key = record.country_code.as_str();
        if !incoming.insert(key) {
            continue;
        }
        if existing_set.contains(key) {
            diff.update.push(key.to_string());
        } else {
            diff.enter.push(key.to_string());
        }
    }

    diff.exit = existing.into_iter()
        .filter(|key| !incoming.contains(key))
        .map(str::to_string)
        .collect();

    diff
}

/// Hover overlay. Hidden at opacity 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub opacity: f64,
    pub top: f64,
    pub left: f64,
    pub html: String,
    pub width: f64,
}

impl Tooltip {
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

pub fn tooltip_html(record: &Record) -> String {
    format!(
        "<h4>{}</h4>\n\
         <p><strong>Population:</strong> {}</p>\n\
         <p><strong>GDP ($):</strong> {}</p>\n\
         <p><strong>Fertility rate (births/women):</strong> {}</p>\n\
         <p><strong>Unemployment(% labor force):</strong> {}</p>",
        escape(&record.country_name),
        format_locale(record.population),
        format_locale(record.gdp),
        format_locale(record.fertility_rate),
        format_locale(record.unemployment),
    )
}

/// The mark set plus the tooltip overlay. Marks keep insertion order,
/// which is also their paint order.
#[derive(Debug, Clone)]
pub struct Scene {
    marks: Vec<Mark>,
    next_id: u64,
    pub tooltip: Tooltip,
}

impl Scene {
    pub fn new(tooltip_width: f64) -> Self {
        Self {
            marks: Vec::new(),
            next_id: 0,
            tooltip: Tooltip {
                opacity: 0.0,
                top: 0.0,
                left: 0.0,
                html: String::new(),
                width: tooltip_width,
            },
        }
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn mark(&self, key: &str) -> Option<&Mark> {
        self.marks.iter().find(|m| m.key == key)
    }

    pub fn is_animating(&self) -> bool {
        self.marks.iter().any(|m| m.transition.is_some())
    }

    /// Brings the marks in line with `working_set`: creates marks for new
    /// keys, transitions every kept or created mark towards `target`, then
    /// drops marks whose key is gone.
    pub fn reconcile<F>(&mut self, working_set: &[&Record], target: F, duration: Duration) -> MarkDiff
    where
        F: Fn(&Record) -> MarkAttrs,
    {
        let diff = diff_marks(self.marks.iter().map(|m| m.key.as_str()), working_set);
        let records: HashMap<&str, &Record> = working_set.iter()
            .map(|r| (r.country_code.as_str(), *r))
            .rev() // first occurrence wins
            .collect();

        for key in &diff.enter {
            if let Some(record) = records.get(key.as_str()) {
                let id = self.next_id;
                self.next_id += 1;
                self.marks.push(Mark {
                    id,
                    key: key.clone(),
                    datum: (*record).clone(),
                    attrs: MarkAttrs::default(),
                    transition: None,
                });
            }
        }

        for mark in self.marks.iter_mut() {
            if let Some(record) = records.get(mark.key.as_str()) {
                mark.datum = (*record).clone();
                mark.start_transition(target(*record), duration);
            }
        }

        if !diff.exit.is_empty() {
            let gone: HashSet<&str> = diff.exit.iter().map(String::as_str).collect();
            self.marks.retain_mut(|mark| {
                if gone.contains(mark.key.as_str()) {
                    mark.transition = None;
                    false
                } else {
                    true
                }
            });
        }

        diff
    }

    pub fn advance(&mut self, dt: Duration) {
        for mark in self.marks.iter_mut() {
            mark.advance(dt);
        }
    }

    /// Runs every in-flight transition to completion.
    pub fn settle(&mut self) {
        for mark in self.marks.iter_mut() {
            if let Some(transition) = mark.transition.take() {
                mark.attrs = transition.to;
            }
        }
    }

    /// Shows the tooltip for the mark under the pointer. Returns false when
    /// no mark has that key.
    pub fn hover_enter(&mut self, key: &str, client_x: f64, client_y: f64) -> bool {
        let Some(mark) = self.marks.iter().find(|m| m.key == key) else {
            return false;
        };
        let html = tooltip_html(&mark.datum);
        let tooltip = &mut self.tooltip;
        tooltip.html = html;
        tooltip.opacity = 0.8;
        tooltip.top = client_y + 20.0;
        tooltip.left = client_x - tooltip.width / 2.0 + 5.0;
        true
    }

    pub fn hover_exit(&mut self) {
        self.tooltip.opacity = 0.0;
    }
}
