//! Equal-loudness weighting.
//!
//! Reference levels come from the ISO 226 40-phon contour: the sound
//! pressure (dB SPL) a tone at each frequency needs to sound as loud as a
//! 40 dB tone at 1 kHz.

/// (frequency Hz, level dB SPL)
const EQUAL_LOUDNESS_40_PHON: [(f32, f32); 29] = [
    (20.0, 99.85),
    (25.0, 93.94),
    (31.5, 88.17),
    (40.0, 82.63),
    (50.0, 77.78),
    (63.0, 73.08),
    (80.0, 68.48),
    (100.0, 64.37),
    (125.0, 60.59),
    (160.0, 56.70),
    (200.0, 53.41),
    (250.0, 50.40),
    (315.0, 47.58),
    (400.0, 44.98),
    (500.0, 43.05),
    (630.0, 41.34),
    (800.0, 40.06),
    (1000.0, 40.01),
    (1250.0, 41.82),
    (1600.0, 42.51),
    (2000.0, 39.23),
    (2500.0, 36.51),
    (3150.0, 35.61),
    (4000.0, 36.65),
    (5000.0, 40.01),
    (6300.0, 45.83),
    (8000.0, 51.80),
    (10000.0, 54.28),
    (12500.0, 51.49),
];

/// Amplitude factor applied to a strength measured at `freq`.
const REFERENCE_GAIN: f32 = 56.0;

/// Reference level at `freq`, linearly interpolated between table points.
/// Frequencies outside the table use the nearest endpoint.
pub fn reference_level(freq: f32) -> f32 {
    let table = &EQUAL_LOUDNESS_40_PHON;
    let (first, last) = (table[0], table[table.len() - 1]);
    if !(freq > first.0) {
        return first.1;
    }
    if freq >= last.0 {
        return last.1;
    }

    let upper = table.partition_point(|&(f, _)| f <= freq);
    let (f0, l0) = table[upper - 1];
    let (f1, l1) = table[upper];
    l0 + (freq - f0) / (f1 - f0) * (l1 - l0)
}

/// Multiplicative correction bringing a strength at `freq` to perceived loudness.
pub fn loudness_coefficient(freq: f32) -> f32 {
    REFERENCE_GAIN / 10f32.powf(reference_level(freq) / 10.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_table_points() {
        for &(f, level) in EQUAL_LOUDNESS_40_PHON.iter() {
            assert!((reference_level(f) - level).abs() < 1e-3, "{} Hz", f);
        }
    }

    #[test]
    fn interpolates_between_points() {
        let mid = reference_level(1125.0);
        assert!((mid - (40.01 + 41.82) / 2.0).abs() < 1e-3);
        let level = reference_level(22.5);
        assert!(level < 99.85 && level > 93.94);
    }

    #[test]
    fn clamps_outside_table() {
        assert_eq!(reference_level(10.0), 99.85);
        assert_eq!(reference_level(20000.0), 51.49);
        assert!(loudness_coefficient(20000.0) > 0.0);
    }

    #[test]
    fn boosts_mid_range_over_bass() {
        // 40 dB at 1 kHz => 56 / 100 = 0.56
        assert!((loudness_coefficient(1000.0) - 56.0 / 10f32.powf(4.001 / 2.0)).abs() < 1e-4);
        assert!(loudness_coefficient(3150.0) > loudness_coefficient(1000.0));
        assert!(loudness_coefficient(1000.0) > 50.0 * loudness_coefficient(20.0));
    }
}
