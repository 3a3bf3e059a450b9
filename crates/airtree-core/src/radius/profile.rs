//! Intensity-profile primitives: FWHM crossing and robust aggregation.

/// Median of a set of per-ray distances.
///
/// Callers guarantee at least one value.
pub fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).expect("distances are finite"));
    values[values.len() / 2]
}

/// Locate the single threshold crossing of a sampled intensity profile.
///
/// `samples[j]` is the intensity at distance `j * step` from the ray
/// origin. The profile must start at or above the threshold and cross it
/// exactly once; profiles that start outside, never cross, or re-cross
/// (non-monotonic around the wall) are rejected as ambiguous.
///
/// Returns the sub-sample distance of the crossing, linearly
/// interpolated between the two samples that bracket it.
pub fn fwhm_crossing(samples: &[f32], step: f64, threshold: f32) -> Option<f64> {
    if samples.len() < 2 || samples[0] < threshold {
        return None;
    }
    let mut crossing = None;
    for j in 0..samples.len() - 1 {
        let inside = samples[j] >= threshold;
        let next_inside = samples[j + 1] >= threshold;
        if inside != next_inside {
            if crossing.is_some() {
                return None; // second crossing: ambiguous profile
            }
            let frac = (samples[j] - threshold) as f64 / (samples[j] - samples[j + 1]) as f64;
            crossing = Some((j as f64 + frac) * step);
        }
    }
    crossing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_odd_and_even_sets() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), 3.0);
    }

    #[test]
    fn crossing_is_interpolated_between_samples() {
        // 100 plateau, wall between samples 3 and 4, threshold 50.
        let s = [100.0, 100.0, 100.0, 80.0, 20.0, 0.0, 0.0];
        let r = fwhm_crossing(&s, 0.5, 50.0).expect("single crossing");
        // Crossing at j=3 + (80-50)/(80-20) = 3.5 samples -> 1.75.
        assert!((r - 1.75).abs() < 1e-9, "got {r}");
    }

    #[test]
    fn profile_starting_outside_is_rejected() {
        assert!(fwhm_crossing(&[10.0, 0.0], 1.0, 50.0).is_none());
    }

    #[test]
    fn profile_without_crossing_is_rejected() {
        assert!(fwhm_crossing(&[100.0, 90.0, 80.0], 1.0, 50.0).is_none());
    }

    #[test]
    fn recrossing_profile_is_rejected() {
        let s = [100.0, 40.0, 90.0, 10.0];
        assert!(fwhm_crossing(&s, 1.0, 50.0).is_none());
    }
}
