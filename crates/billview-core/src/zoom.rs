//! Zoom state for page rendering.

/// Bounds and step for [`Zoom`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoomOptions {
    /// Smallest zoom factor (default: 0.5).
    pub min_zoom: f64,
    /// Largest zoom factor (default: 3.0).
    pub max_zoom: f64,
    /// Increment for zoom in/out (default: 0.1).
    pub zoom_step: f64,
}

impl Default for ZoomOptions {
    fn default() -> Self {
        Self {
            min_zoom: 0.5,
            max_zoom: 3.0,
            zoom_step: 0.1,
        }
    }
}

impl ZoomOptions {
    /// Options with finite, ordered bounds and a finite step. Non-finite
    /// values fall back to the defaults and inverted bounds are swapped.
    pub fn normalized(&self) -> Self {
        let defaults = Self::default();
        let finite_or = |v: f64, d: f64| if v.is_finite() { v } else { d };
        let min = finite_or(self.min_zoom, defaults.min_zoom);
        let max = finite_or(self.max_zoom, defaults.max_zoom);
        Self {
            min_zoom: min.min(max),
            max_zoom: min.max(max),
            zoom_step: finite_or(self.zoom_step, defaults.zoom_step),
        }
    }
}

/// Reference container width for which a tier factor of 1.0 fits the page.
const FIT_REFERENCE_WIDTH: f64 = 2050.0;

/// Zoom factor of the page fitted to a container `width` pixels wide.
///
/// Narrow containers use a factor of 0.7, medium ones (under 1200 px) 1.0 and
/// wide ones 1.5, scaled by `width / 2050`. The result is not clamped.
pub fn fit_width_factor(width: f64) -> f64 {
    let tier = if width < 600.0 {
        0.7
    } else if width < 1200.0 {
        1.0
    } else {
        1.5
    };
    tier * (width / FIT_REFERENCE_WIDTH)
}

/// Current zoom factor, always within `[min_zoom, max_zoom]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Zoom {
    options: ZoomOptions,
    factor: f64,
    initial: f64,
}

impl Default for Zoom {
    fn default() -> Self {
        Self::new(ZoomOptions::default())
    }
}

impl Zoom {
    pub fn new(options: ZoomOptions) -> Self {
        let options = options.normalized();
        let initial = 1.0_f64.clamp(options.min_zoom, options.max_zoom);
        Self {
            options,
            factor: initial,
            initial,
        }
    }

    pub fn options(&self) -> &ZoomOptions {
        &self.options
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn clamp(&self, factor: f64) -> f64 {
        if factor.is_nan() {
            return self.factor;
        }
        let rounded = (factor * 1000.0).round() / 1000.0;
        rounded.clamp(self.options.min_zoom, self.options.max_zoom)
    }

    /// Set the zoom, clamping out-of-range requests. Returns whether the
    /// factor changed.
    pub fn set(&mut self, factor: f64) -> bool {
        let next = self.clamp(factor);
        let changed = next != self.factor;
        self.factor = next;
        changed
    }

    pub fn step_in(&mut self) -> bool {
        self.set(self.factor + self.options.zoom_step)
    }

    pub fn step_out(&mut self) -> bool {
        self.set(self.factor - self.options.zoom_step)
    }

    /// Fit the page to a container `width` pixels wide and make that the
    /// reset target.
    pub fn fit_width(&mut self, width: f64) -> bool {
        self.initial = self.clamp(fit_width_factor(width));
        self.set(self.initial)
    }

    /// Return to the initial (fit-to-width) zoom.
    pub fn reset(&mut self) -> bool {
        self.set(self.initial)
    }
}
