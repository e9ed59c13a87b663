use palette::{Hsla, IntoColor, Srgba};

use crate::data::model::{Anomaly, AnomalyDataset};

/// Opacity of every anomaly colour, so the globe texture shows through.
pub const ANOMALY_ALPHA: f32 = 0.5;

// ---------------------------------------------------------------------------
// Anomaly → colour
// ---------------------------------------------------------------------------

/// Blue for the coldest anomaly, white at zero, red for the warmest.
///
/// Positive values fade from yellow-white to red against `max`, the rest
/// fade from white to blue against `min`.
pub fn temperature_to_color(temperature: f64, min: f64, max: f64) -> Srgba {
    if temperature > 0.0 {
        Srgba::new(1.0, channel(1.0 - ratio(temperature, max)), 0.0, ANOMALY_ALPHA)
    } else {
        let c = channel(1.0 - ratio(temperature, min));
        Srgba::new(c, c, 1.0, ANOMALY_ALPHA)
    }
}

fn ratio(value: f64, bound: f64) -> f64 {
    if bound == 0.0 {
        0.0
    } else {
        value / bound
    }
}

fn channel(v: f64) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0) as f32
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// ColorScale – bounds taken from a dataset
// ---------------------------------------------------------------------------

/// Colour mapping fixed to a dataset's global anomaly range.
#[derive(Debug, Clone)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
    missing_color: Srgba,
}

impl ColorScale {
    pub fn new(min: f64, max: f64) -> Self {
        // Neutral grey, same opacity as the data colours.
        let grey: Srgba = Hsla::new(0.0_f32, 0.0, 0.5, ANOMALY_ALPHA).into_color();
        ColorScale {
            min,
            max,
            missing_color: grey,
        }
    }

    /// `None` when the dataset holds no measured value.
    pub fn for_dataset(dataset: &AnomalyDataset) -> Option<Self> {
        Some(Self::new(
            dataset.global_min_anomaly()?,
            dataset.global_max_anomaly()?,
        ))
    }

    pub fn color_for(&self, anomaly: Anomaly) -> Srgba {
        match anomaly {
            Anomaly::Measured(t) => temperature_to_color(t, self.min, self.max),
            Anomaly::Missing => self.missing_color,
        }
    }

    /// `steps` evenly spaced legend entries from `min` to `max`.
    pub fn legend_entries(&self, steps: usize) -> Vec<(String, Srgba)> {
        match steps {
            0 => Vec::new(),
            1 => vec![(
                format!("{:+.1} °C", self.min),
                self.color_for(Anomaly::Measured(self.min)),
            )],
            _ => (0..steps)
                .map(|i| {
                    let t = self.min + (self.max - self.min) * i as f64 / (steps - 1) as f64;
                    (format!("{t:+.1} °C"), self.color_for(Anomaly::Measured(t)))
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Srgba, r: f32, g: f32, b: f32) -> bool {
        (a.red - r).abs() < 1e-4 && (a.green - g).abs() < 1e-4 && (a.blue - b).abs() < 1e-4
    }

    #[test]
    fn extremes_are_pure_red_and_blue() {
        assert!(close(temperature_to_color(2.0, -1.0, 2.0), 1.0, 0.0, 0.0));
        assert!(close(temperature_to_color(-1.0, -1.0, 2.0), 0.0, 0.0, 1.0));
        assert!(close(temperature_to_color(0.0, -1.0, 2.0), 1.0, 1.0, 1.0));
    }

    #[test]
    fn midpoints_fade() {
        assert!(close(temperature_to_color(1.0, -1.0, 2.0), 1.0, 0.5, 0.0));
        assert!(close(temperature_to_color(-0.5, -1.0, 2.0), 0.5, 0.5, 1.0));
        assert_eq!(temperature_to_color(1.0, -1.0, 2.0).alpha, ANOMALY_ALPHA);
    }

    #[test]
    fn out_of_range_and_degenerate_bounds_stay_valid() {
        assert!(close(temperature_to_color(5.0, -1.0, 2.0), 1.0, 0.0, 0.0));
        assert!(close(temperature_to_color(0.0, 0.0, 0.0), 1.0, 1.0, 1.0));
        assert!(close(temperature_to_color(1.0, 0.0, 0.0), 1.0, 1.0, 0.0));
    }

    #[test]
    fn missing_is_grey() {
        let scale = ColorScale::new(-1.0, 2.0);
        assert!(close(scale.color_for(Anomaly::Missing), 0.5, 0.5, 0.5));
    }

    #[test]
    fn legend_spans_the_range() {
        let scale = ColorScale::new(-1.0, 2.0);
        let legend = scale.legend_entries(4);
        let labels: Vec<&str> = legend.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["-1.0 °C", "+0.0 °C", "+1.0 °C", "+2.0 °C"]);
        assert!(close(legend[3].1, 1.0, 0.0, 0.0));
        assert!(scale.legend_entries(0).is_empty());
    }
}
