//! Chart geometry for per-minute trade series.
//!
//! Pure, deterministic functions mapping a time-ordered price/volume series
//! to normalized plot coordinates: a price polyline in a 100×100 viewbox and
//! fractional volume-bar heights. No rendering happens here; the view layer
//! turns the geometry into whatever surface it has.
//!
//! The non-empty / time-ordered invariant is enforced once at
//! [`MinuteSeries`] construction so the geometry itself is total.

use crate::api::models::MinuteSample;

/// A validated, chartable view over a per-minute sample series.
///
/// Construction fails for an empty series or one whose timestamps run
/// backwards; geometry methods therefore never divide by an empty length.
#[derive(Debug, Clone, Copy)]
pub struct MinuteSeries<'a> {
    samples: &'a [MinuteSample],
}

impl<'a> MinuteSeries<'a> {
    /// Validate a sample slice for charting.
    ///
    /// Timestamps use the service's `"YYYY-MM-DD HH:MM"` shape, which orders
    /// lexicographically, so the monotonicity check needs no parsing.
    pub fn new(samples: &'a [MinuteSample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        if samples.windows(2).any(|pair| pair[0].time > pair[1].time) {
            return None;
        }
        Some(Self { samples })
    }

    /// The underlying samples.
    pub fn samples(&self) -> &'a [MinuteSample] {
        self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; an empty series cannot be constructed.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Minimum and maximum of the price field.
    pub fn price_range(&self) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for sample in self.samples {
            min = min.min(sample.price);
            max = max.max(sample.price);
        }
        (min, max)
    }

    /// Last price minus first price; the sign drives the up/down visual class.
    pub fn net_price_change(&self) -> f64 {
        let first = self.samples[0].price;
        let last = self.samples[self.samples.len() - 1].price;
        last - first
    }

    /// Price polyline normalized into `[0,100]×[0,100]`.
    ///
    /// x maps the sample index linearly from `[0, n-1]` onto `[0,100]`;
    /// y is `100 - (price - min) / span * 100`, so a higher price renders
    /// nearer the top. A single-sample series maps to the single point
    /// `(0, y)`.
    pub fn normalized_polyline(&self) -> Vec<(f64, f64)> {
        let (min, max) = self.price_range();
        let span = effective_span(min, max);
        let n = self.samples.len();

        self.samples
            .iter()
            .enumerate()
            .map(|(i, sample)| {
                let x = if n > 1 {
                    i as f64 / (n - 1) as f64 * 100.0
                } else {
                    0.0
                };
                let y = 100.0 - (sample.price - min) / span * 100.0;
                (x, y)
            })
            .collect()
    }

    /// Fractional volume-bar heights in `[0,1]`: volume over the series
    /// maximum, zero throughout when the maximum is zero.
    pub fn normalized_volume_bars(&self) -> Vec<f64> {
        let max = self
            .samples
            .iter()
            .map(|s| s.volume)
            .fold(0.0_f64, f64::max);

        if max <= 0.0 {
            return vec![0.0; self.samples.len()];
        }

        self.samples.iter().map(|s| s.volume / max).collect()
    }
}

/// Span used for normalization; an all-equal-price series is treated as a
/// unit span to avoid division by zero.
fn effective_span(min: f64, max: f64) -> f64 {
    let span = max - min;
    if span > 0.0 {
        span
    } else {
        1.0
    }
}

// ============================================================================
// Tests
// ============================================================================
