/// Range input bound to the selected year: `[min, max]`, step 1, starting
/// at `min`.
///
/// Listeners are called synchronously, once per accepted input, in
/// registration order. Nothing is queued.
pub struct YearControl {
    min: i32,
    max: i32,
    value: i32,
    listeners: Vec<Box<dyn FnMut(i32) + Send>>,
}

impl YearControl {
    pub fn new(min: i32, max: i32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self { min, max, value: min, listeners: Vec::new() }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn on_input<F>(&mut self, listener: F)
    where
        F: FnMut(i32) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Snaps a raw slider value onto the range and step, the way a browser
    /// range input sanitizes its value.
    pub fn sanitize(&self, raw: f64) -> i32 {
        if raw.is_nan() {
            return self.value;
        }
        raw.round().clamp(self.min as f64, self.max as f64) as i32
    }

    /// Accepts a new value and notifies every listener with the sanitized year.
    pub fn input(&mut self, raw: f64) -> i32 {
        let year = self.sanitize(raw);
        self.value = year;
        for listener in self.listeners.iter_mut() {
            listener(year);
        }
        year
    }
}

impl std::fmt::Debug for YearControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YearControl")
            .field("min", &self.min)
            .field("max", &self.max)
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_initial_value_is_min() {
        let control = YearControl::new(2008, 2016);
        assert_eq!(control.value(), 2008);
        assert_eq!((control.min(), control.max()), (2008, 2016));
    }

    #[test]
    fn test_input_clamps_and_rounds() {
        let mut control = YearControl::new(2008, 2016);
        assert_eq!(control.input(2030.0), 2016);
        assert_eq!(control.input(1990.0), 2008);
        assert_eq!(control.input(2010.6), 2011);
        assert_eq!(control.value(), 2011);
        assert_eq!(control.input(f64::NAN), 2011);
    }

    #[test]
    fn test_listeners_fire_once_per_input() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut control = YearControl::new(2008, 2016);
        let sink = Arc::clone(&seen);
        control.on_input(move |year| sink.lock().unwrap().push(year));

        control.input(2009.0);
        control.input(2009.0);
        control.input(2012.0);
        assert_eq!(*seen.lock().unwrap(), vec![2009, 2009, 2012]);
    }
}
