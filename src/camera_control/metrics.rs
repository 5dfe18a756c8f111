//! Photometric readings derived from a single frame.
//!
//! Everything in here is pure: a reading depends only on the pixels it was
//! computed from, and nothing is carried between frames.

use std::fmt;

use crate::camera_control::frame::Frame;

/// Guards the red/blue ratio against an all-black blue channel.
const RATIO_EPSILON: f64 = 1e-6;

/// Neutral point of the power-law model; a frame with equal red and blue
/// means maps here.
const NEUTRAL_KELVIN: f64 = 4500.0;
const POWER_LAW_EXPONENT: f64 = 1.2;
const POWER_LAW_RANGE: (f64, f64) = (1000.0, 10000.0);

const LINEAR_SCALE: f64 = 10000.0;
const LINEAR_RANGE: (f64, f64) = (1000.0, 15000.0);

/// How the red/blue balance of a frame is turned into a color temperature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorTemperatureModel {
    /// `4500 · ratio^1.2` above neutral, `4500 / (1/ratio)^1.2` below,
    /// clamped to 1000–10000 K and rounded to whole kelvin.
    #[default]
    PowerLaw,
    /// `10000 · ratio`, clamped to 1000–15000 K. Cruder, kept for parity with
    /// setups that were tuned against it.
    Linear,
}

/// Scalar readings for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricReading {
    /// Mean of the three per-channel means, 0–255.
    pub brightness: f64,
    /// Standard deviation of luma, 0–127.5.
    pub contrast: f64,
    /// Mean HSV saturation, 0–255.
    pub saturation: f64,
    pub color_temperature_kelvin: f64,
}

impl fmt::Display for MetricReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scene B {:.1} C {:.1} S {:.1} | {:.0}K",
            self.brightness, self.contrast, self.saturation, self.color_temperature_kelvin
        )
    }
}

#[derive(Debug, Default)]
struct ChannelSums {
    red: f64,
    green: f64,
    blue: f64,
    luma: f64,
    saturation: f64,
}

/// Computes every reading for one frame.
///
/// Means come from one pass over the pixels. Contrast takes a second pass and
/// sums squared deviations from the mean luma, so a uniform frame reads 0.
///
/// The frame must be non-empty; capture adapters drop empty frames before they
/// reach the estimator.
pub fn estimate(frame: &Frame<'_>, model: ColorTemperatureModel) -> MetricReading {
    let mut sums = ChannelSums::default();
    for [r, g, b] in frame.pixels() {
        let (rf, gf, bf) = (f64::from(r), f64::from(g), f64::from(b));
        sums.red += rf;
        sums.green += gf;
        sums.blue += bf;
        sums.luma += luma(rf, gf, bf);
        sums.saturation += hsv_saturation(r, g, b);
    }

    let n = frame.pixel_count().max(1) as f64;
    let mean_red = sums.red / n;
    let mean_green = sums.green / n;
    let mean_blue = sums.blue / n;
    let mean_luma = sums.luma / n;

    let squared_deviation: f64 = frame
        .pixels()
        .map(|[r, g, b]| luma(f64::from(r), f64::from(g), f64::from(b)) - mean_luma)
        .map(|d| d * d)
        .sum();

    MetricReading {
        brightness: (mean_red + mean_green + mean_blue) / 3.0,
        contrast: (squared_deviation / n).sqrt(),
        saturation: sums.saturation / n,
        color_temperature_kelvin: color_temperature(mean_red, mean_blue, model),
    }
}

/// Estimated color temperature from channel means.
pub fn color_temperature(mean_red: f64, mean_blue: f64, model: ColorTemperatureModel) -> f64 {
    let ratio = mean_red / (mean_blue + RATIO_EPSILON);
    match model {
        ColorTemperatureModel::PowerLaw => {
            // Warm and cool deviations are deliberately not mirror images.
            let kelvin = if ratio > 1.0 {
                NEUTRAL_KELVIN * ratio.powf(POWER_LAW_EXPONENT)
            } else {
                NEUTRAL_KELVIN / (1.0 / ratio).powf(POWER_LAW_EXPONENT)
            };
            kelvin.clamp(POWER_LAW_RANGE.0, POWER_LAW_RANGE.1).round()
        }
        ColorTemperatureModel::Linear => {
            (LINEAR_SCALE * ratio).clamp(LINEAR_RANGE.0, LINEAR_RANGE.1)
        }
    }
}

fn luma(r: f64, g: f64, b: f64) -> f64 {
    0.299 * r + 0.587 * g + 0.114 * b
}

fn hsv_saturation(r: u8, g: u8, b: u8) -> f64 {
    let max = r.max(g).max(b);
    if max == 0 {
        return 0.0;
    }
    let min = r.min(g).min(b);
    255.0 * f64::from(max - min) / f64::from(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(r: u8, g: u8, b: u8, width: usize, height: usize) -> Vec<u8> {
        [r, g, b].repeat(width * height)
    }

    #[test]
    fn test_uniform_gray_frame() {
        let data = solid(128, 128, 128, 8, 4);
        let reading = estimate(&Frame::new(8, 4, &data), ColorTemperatureModel::PowerLaw);

        assert!((reading.brightness - 128.0).abs() < 1e-9);
        assert!(reading.contrast.abs() < 1e-6);
        assert_eq!(reading.saturation, 0.0);
        assert_eq!(reading.color_temperature_kelvin, 4500.0);
    }

    #[test]
    fn test_uniform_frame_has_no_contrast_at_full_resolution() {
        for level in [1u8, 77, 128, 254] {
            let data = solid(level, level, level, 1280, 720);
            let reading = estimate(&Frame::new(1280, 720, &data), ColorTemperatureModel::PowerLaw);
            assert!(reading.contrast < 1e-6, "level {} -> contrast {}", level, reading.contrast);
        }
    }

    #[test]
    fn test_reading_display() {
        let reading = MetricReading {
            brightness: 120.04,
            contrast: 12.36,
            saturation: 0.0,
            color_temperature_kelvin: 4500.0,
        };
        assert_eq!(reading.to_string(), "Scene B 120.0 C 12.4 S 0.0 | 4500K");
    }

    #[test]
    fn test_equal_red_and_blue_is_neutral() {
        for level in [1u8, 37, 200, 255] {
            assert_eq!(
                color_temperature(f64::from(level), f64::from(level), ColorTemperatureModel::PowerLaw),
                4500.0,
                "level {}",
                level
            );
        }
    }

    #[test]
    fn test_warm_frame_clamps_to_upper_bound() {
        // ratio 4.0 -> 4500 * 4^1.2 ~ 21.5k before clamping
        let data = solid(200, 100, 50, 4, 4);
        let reading = estimate(&Frame::new(4, 4, &data), ColorTemperatureModel::PowerLaw);
        assert_eq!(reading.color_temperature_kelvin, 10000.0);
    }

    #[test]
    fn test_black_frame_is_coolest() {
        let data = solid(0, 0, 0, 4, 4);
        let reading = estimate(&Frame::new(4, 4, &data), ColorTemperatureModel::PowerLaw);
        assert_eq!(reading.color_temperature_kelvin, 1000.0);
        assert_eq!(reading.saturation, 0.0);
        assert_eq!(reading.brightness, 0.0);
    }

    #[test]
    fn test_warm_and_cool_shifts_are_asymmetric() {
        let warm = color_temperature(125.0, 100.0, ColorTemperatureModel::PowerLaw);
        let cool = color_temperature(80.0, 100.0, ColorTemperatureModel::PowerLaw);

        assert!((5850.0..5900.0).contains(&warm), "warm = {}", warm);
        assert!((3400.0..3500.0).contains(&cool), "cool = {}", cool);
        assert_ne!(warm - 4500.0, 4500.0 - cool);
    }

    #[test]
    fn test_power_law_stays_in_range() {
        for r in (0..=255).step_by(15) {
            for b in (0..=255).step_by(15) {
                let k = color_temperature(f64::from(r), f64::from(b), ColorTemperatureModel::PowerLaw);
                assert!((1000.0..=10000.0).contains(&k), "r={} b={} k={}", r, b, k);
            }
        }
    }

    #[test]
    fn test_linear_model_range() {
        assert_eq!(color_temperature(200.0, 50.0, ColorTemperatureModel::Linear), 15000.0);
        assert_eq!(color_temperature(5.0, 200.0, ColorTemperatureModel::Linear), 1000.0);
        let neutral = color_temperature(100.0, 100.0, ColorTemperatureModel::Linear);
        assert!((neutral - 10000.0).abs() < 0.01);
    }

    #[test]
    fn test_saturation_of_primary_colour() {
        let data = solid(255, 0, 0, 2, 2);
        let reading = estimate(&Frame::new(2, 2, &data), ColorTemperatureModel::PowerLaw);
        assert_eq!(reading.saturation, 255.0);
        assert!((reading.brightness - 85.0).abs() < 1e-9);
    }

    #[test]
    fn test_contrast_of_split_frame() {
        let mut data = solid(0, 0, 0, 2, 1);
        data.extend(solid(255, 255, 255, 2, 1));
        let reading = estimate(&Frame::new(2, 2, &data), ColorTemperatureModel::PowerLaw);
        assert!((reading.contrast - 127.5).abs() < 1e-6, "contrast = {}", reading.contrast);
    }
}
