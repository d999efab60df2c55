use crate::config::{AppConfig, CanvasConfig};
use crate::render::{render, RenderState};
use crate::svg::to_svg;
use crate::types::Record;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// The settled frame for one year, drawn from a fresh state.
pub fn render_frame(dataset: &[Record], canvas: &CanvasConfig, year: i32) -> Result<String> {
    let mut state = RenderState::new(canvas)?;
    render(&mut state, dataset, year);
    state.scene.settle();
    Ok(to_svg(&state))
}

pub fn write_frame(dataset: &[Record], canvas: &CanvasConfig, year: i32, path: &Path) -> Result<()> {
    let svg = render_frame(dataset, canvas, year)?;
    fs::write(path, svg).with_context(|| format!("Failed to write frame: {:?}", path))?;
    info!("Wrote {} frame to {:?}", year, path);
    Ok(())
}

/// Writes `frame_<year>.svg` for every configured year into the frame
/// directory. Years render in parallel, each into its own state.
pub fn generate_frames(config: &AppConfig, dataset: &[Record]) -> Result<Vec<PathBuf>> {
    let dir = &config.output.frame_dir;
    fs::create_dir_all(dir).with_context(|| format!("Failed to create frame directory: {:?}", dir))?;

    info!("Generating frames for {}-{} into {:?}...", config.years.min, config.years.max, dir);

    let years: Vec<i32> = (config.years.min..=config.years.max).collect();
    years.par_iter()
        .map(|&year| {
            let path = dir.join(format!("frame_{}.svg", year));
            write_frame(dataset, &config.canvas, year, &path)?;
            Ok::<_, anyhow::Error>(path)
        })
        .collect()
}
