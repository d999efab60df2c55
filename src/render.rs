use crate::config::CanvasConfig;
use crate::format::format_si;
use crate::join::working_set;
use crate::scale::{extent, ColorScale, LinearScale, Rgb};
use crate::scene::{MarkAttrs, Scene};
use crate::types::Record;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;

const RADIUS_RANGE: (f64, f64) = (5.0, 30.0);
const TICK_COUNT: usize = 10;

/// Canvas geometry and transition timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub transition: Duration,
    pub tooltip_width: f64,
}

impl Layout {
    pub fn from_canvas(canvas: &CanvasConfig) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            padding: canvas.padding,
            transition: Duration::from_millis(canvas.transition_ms),
            tooltip_width: canvas.tooltip_width,
        }
    }

    pub fn x_range(&self) -> (f64, f64) {
        (self.padding, self.width - self.padding)
    }

    pub fn y_range(&self) -> (f64, f64) {
        (self.height - self.padding, self.padding)
    }
}

/// The four scales of one year's working set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scales {
    pub x: LinearScale,
    pub y: LinearScale,
    pub r: LinearScale,
    pub color: ColorScale,
}

impl Scales {
    pub fn compute(records: &[&Record], layout: &Layout, colors: (Rgb, Rgb)) -> Self {
        let field = |f: fn(&Record) -> f64| extent(records.iter().map(|r| f(r)));
        Self {
            x: LinearScale::new(field(|r| r.population), layout.x_range()),
            y: LinearScale::new(field(|r| r.gdp), layout.y_range()),
            r: LinearScale::new(field(|r| r.fertility_rate), RADIUS_RANGE),
            color: ColorScale::new(field(|r| r.unemployment), colors),
        }
    }

    pub fn target(&self, record: &Record) -> MarkAttrs {
        MarkAttrs {
            cx: self.x.apply(record.population),
            cy: self.y.apply(record.gdp),
            r: self.r.apply(record.fertility_rate),
            fill: Some(self.color.apply(record.unemployment)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrient {
    Bottom,
    Left,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub orient: AxisOrient,
    pub label: String,
    /// Significant digits of the SI tick labels.
    pub precision: usize,
    pub range: (f64, f64),
    pub ticks: Vec<Tick>,
}

impl Axis {
    pub fn new(orient: AxisOrient, label: &str, precision: usize, range: (f64, f64)) -> Self {
        Self { orient, label: label.to_string(), precision, range, ticks: Vec::new() }
    }

    pub fn update(&mut self, scale: &LinearScale) {
        self.range = scale.range;
        self.ticks = scale.ticks(TICK_COUNT).into_iter()
            .map(|value| Tick {
                value,
                position: scale.apply(value),
                label: format_si(value, self.precision),
            })
            .collect();
    }
}

/// Everything one render pass reads and writes: the selected year, the
/// scene's marks and the chrome around them.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub layout: Layout,
    pub year: Option<i32>,
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub scales: Option<Scales>,
    pub scene: Scene,
    colors: (Rgb, Rgb),
}

impl RenderState {
    pub fn new(canvas: &CanvasConfig) -> Result<Self> {
        let colors = (
            Rgb::parse(&canvas.color_low).context("Invalid low color in [canvas]")?,
            Rgb::parse(&canvas.color_high).context("Invalid high color in [canvas]")?,
        );
        let layout = Layout::from_canvas(canvas);
        Ok(Self {
            layout,
            year: None,
            title: String::new(),
            x_axis: Axis::new(AxisOrient::Bottom, "Population", 3, layout.x_range()),
            y_axis: Axis::new(AxisOrient::Left, "GDP ($)", 2, layout.y_range()),
            scales: None,
            scene: Scene::new(layout.tooltip_width),
            colors,
        })
    }
}

pub fn title_for(year: i32) -> String {
    format!("Gdp over population in {}", year)
}

/// Redraws the plot for `year`: rescales to that year's records, reconciles
/// one mark per country and refreshes the title and axes.
///
/// Never fails. Records with NaN fields keep their marks at whatever
/// position the scales produce for them.
pub fn render(state: &mut RenderState, dataset: &[Record], year: i32) {
    let records = working_set(dataset, year);
    let scales = Scales::compute(&records, &state.layout, state.colors);

    state.year = Some(year);
    state.title = title_for(year);
    state.x_axis.update(&scales.x);
    state.y_axis.update(&scales.y);

    let diff = state.scene.reconcile(&records, |r| scales.target(r), state.layout.transition);
    debug!(
        "Rendered {}: {} records, {} entered, {} updated, {} exited",
        year,
        records.len(),
        diff.enter.len(),
        diff.update.len(),
        diff.exit.len(),
    );

    state.scales = Some(scales);
}
