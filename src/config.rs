use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{bail, Context, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub years: YearsConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub population: PathBuf,
    pub gdp: PathBuf,
    pub fertility_rate: PathBuf,
    pub unemployment: PathBuf,
    #[serde(default = "default_code_column")]
    pub code_column: String,
    #[serde(default = "default_name_column")]
    pub name_column: String,
}

fn default_code_column() -> String {
    "Country Code".to_string()
}

fn default_name_column() -> String {
    "Country Name".to_string()
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct YearsConfig {
    pub min: i32,
    pub max: i32,
}

impl Default for YearsConfig {
    fn default() -> Self {
        Self { min: 2008, max: 2016 }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub transition_ms: u64,
    pub tooltip_width: f64,
    // Unemployment gradient stops, any CSS color
    pub color_low: String,
    pub color_high: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            padding: 90.0,
            transition_ms: 250,
            tooltip_width: 160.0,
            color_low: "lightblue".to_string(),
            color_high: "darkblue".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub frame_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { frame_dir: PathBuf::from("frames") }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.years.min > self.years.max {
            bail!("Year range is empty: min {} > max {}", self.years.min, self.years.max);
        }
        let c = &self.canvas;
        if c.width <= 0.0 || c.height <= 0.0 || c.padding < 0.0 {
            bail!("Canvas must have a positive size and a non-negative padding");
        }
        if 2.0 * c.padding >= c.width.min(c.height) {
            bail!("Canvas padding {} leaves no room for the plot area", c.padding);
        }
        Ok(())
    }
}
