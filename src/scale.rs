use anyhow::{anyhow, Result};
use std::fmt;

/// `[min, max]` of the values, skipping NaN. `None` when nothing is left.
pub fn extent<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

// Maps x into [0, 1] over the domain; a zero-width domain maps every input,
// NaN included, to the range start.
fn normalize(domain: Option<(f64, f64)>, x: f64) -> f64 {
    match domain {
        None => f64::NAN,
        Some((d0, d1)) => {
            let span = d1 - d0;
            if span == 0.0 { 0.0 } else { (x - d0) / span }
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Continuous linear scale without clamping. An undefined domain maps
/// every input to NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: Option<(f64, f64)>,
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: Option<(f64, f64)>, range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, x: f64) -> f64 {
        lerp(self.range.0, self.range.1, normalize(self.domain, x))
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        match self.domain {
            Some((d0, d1)) => ticks(d0, d1, count as f64),
            None => Vec::new(),
        }
    }
}

/// RGB color with channels in `0..=255`. Channels may go NaN mid-computation;
/// display clamps them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn parse(css: &str) -> Result<Self> {
        let color = csscolorparser::parse(css)
            .map_err(|e| anyhow!("Invalid color '{}': {}", css, e))?;
        Ok(Self::new(
            (color.r as f64 * 255.0).round(),
            (color.g as f64 * 255.0).round(),
            (color.b as f64 * 255.0).round(),
        ))
    }

    pub fn mix(&self, other: &Rgb, t: f64) -> Rgb {
        Rgb::new(
            lerp(self.r, other.r, t),
            lerp(self.g, other.g, t),
            lerp(self.b, other.b, t),
        )
    }

    /// Rounded, clamped channels; NaN becomes 0.
    pub fn channels(&self) -> [u8; 3] {
        fn channel(v: f64) -> u8 {
            if v.is_nan() { 0 } else { v.round().clamp(0.0, 255.0) as u8 }
        }
        [channel(self.r), channel(self.g), channel(self.b)]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.channels();
        write!(f, "rgb({}, {}, {})", r, g, b)
    }
}

/// Linear scale onto a two-stop RGB gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub domain: Option<(f64, f64)>,
    pub range: (Rgb, Rgb),
}

impl ColorScale {
    pub fn new(domain: Option<(f64, f64)>, range: (Rgb, Rgb)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, x: f64) -> Rgb {
        let mixed = self.range.0.mix(&self.range.1, normalize(self.domain, x));
        let [r, g, b] = mixed.channels();
        Rgb::new(r as f64, g as f64, b as f64)
    }
}

// Thresholds for choosing 10, 5 or 2 as the step multiplier.
const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = 1.4142135623730951; // sqrt(2)

fn tick_spec(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor() as i32;
    let error = step / 10f64.powi(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0 {
        let inv = 10f64.powi(-power) / factor;
        i1 = (start * inv).round();
        i2 = (stop * inv).round();
        if i1 / inv < start { i1 += 1.0; }
        if i2 / inv > stop { i2 -= 1.0; }
        inc = -inv;
    } else {
        let step = 10f64.powi(power) * factor;
        i1 = (start / step).round();
        i2 = (stop / step).round();
        if i1 * step < start { i1 += 1.0; }
        if i2 * step > stop { i2 -= 1.0; }
        inc = step;
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

/// Roughly `count` round values (multiples of 1, 2 or 5 times a power of
/// ten) covering `[start, stop]`, ordered like the inputs.
pub fn ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !(count > 0.0) || start.is_nan() || stop.is_nan() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let reverse = stop < start;
    let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };
    let (i1, i2, inc) = tick_spec(lo, hi, count);
    if !(i2 >= i1) || !inc.is_finite() {
        return Vec::new();
    }

    let n = (i2 - i1 + 1.0) as usize;
    let value = |k: f64| if inc < 0.0 { k / -inc } else { k * inc };
    (0..n)
        .map(|i| {
            let k = if reverse { i2 - i as f64 } else { i1 + i as f64 };
            value(k)
        })
        .collect()
}
