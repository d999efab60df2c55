use crate::config::{AppConfig, CanvasConfig};
use crate::control::YearControl;
use crate::data;
use crate::join::join;
use crate::render::{render, RenderState};
use crate::types::Dataset;
use anyhow::Result;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{info, warn};

/// The joined dataset plus the state it is drawn into.
#[derive(Debug)]
pub struct Plot {
    pub dataset: Arc<Dataset>,
    pub state: RenderState,
    last_render: Option<Instant>,
}

impl Plot {
    pub fn new(dataset: Arc<Dataset>, canvas: &CanvasConfig) -> Result<Self> {
        Ok(Self {
            dataset,
            state: RenderState::new(canvas)?,
            last_render: None,
        })
    }

    pub fn render(&mut self, year: i32) {
        // Let transitions from the previous render progress by the wall time since then
        if let Some(last) = self.last_render {
            self.state.scene.advance(last.elapsed());
        }
        render(&mut self.state, &self.dataset, year);
        self.last_render = Some(Instant::now());
    }
}

/// Loads the four tables and joins them over the configured years.
pub fn load_dataset(config: &AppConfig) -> Result<Dataset> {
    let tables = data::load_tables(config)?;
    let dataset = join(
        &tables.population,
        &tables.gdp,
        &tables.fertility_rate,
        &tables.unemployment,
        config.years.min,
        config.years.max,
    );
    info!("Joined {} records for {}-{}", dataset.len(), config.years.min, config.years.max);
    Ok(dataset)
}

/// A loaded plot wired to its year control: every control input renders.
pub struct Session {
    pub plot: Arc<Mutex<Plot>>,
    pub control: YearControl,
}

impl Session {
    /// Loads the four tables, joins them and draws the first year. Any
    /// load failure aborts.
    pub fn load(config: &AppConfig) -> Result<Self> {
        Self::new(config, load_dataset(config)?)
    }

    pub fn new(config: &AppConfig, dataset: Dataset) -> Result<Self> {
        let mut plot = Plot::new(Arc::new(dataset), &config.canvas)?;
        plot.render(config.years.min);
        let plot = Arc::new(Mutex::new(plot));

        let mut control = YearControl::new(config.years.min, config.years.max);
        let target = Arc::clone(&plot);
        control.on_input(move |year| match target.lock() {
            Ok(mut plot) => plot.render(year),
            Err(poisoned) => {
                warn!("Plot lock poisoned; rendering {} anyway", year);
                poisoned.into_inner().render(year);
            }
        });

        Ok(Self { plot, control })
    }
}
