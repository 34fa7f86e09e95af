//! Incremental per-note analysis state.
//!
//! A band slices the audio into consecutive periods of its note and keeps
//! the detrended waveform of every period inside a sliding window, plus
//! their elementwise sum. Moving the window only touches the periods that
//! leave or enter it. A periodic signal at the band's frequency adds up
//! coherently in the sum while everything else averages out.

use std::f32::consts::PI;

use rustfft::num_complex::Complex;

use super::notes::NoteRange;

#[derive(Clone, Debug)]
pub struct FrequencyBand {
    note: NoteRange,
    period_len: usize,
    half_period_len: usize,
    shortest_period: f32,
    longest_period: f32,
    window_periods: usize,
    audio_periods: i64,
    /// `window_periods` slots of `period_len` samples; period k lives in slot k mod window_periods
    periods_data: Vec<f32>,
    periods_sum: Vec<f32>,
    /// cos + i·sin of the band frequency over one period
    phasors: Vec<Complex<f32>>,
    scratch: Vec<f32>,
    cursor: Option<i64>,
    window: (i64, i64),
    total_shift: f32,
    phase: f32,
}

impl FrequencyBand {
    /// `window_len` and `audio_len` are in samples.
    pub fn new(note: NoteRange, sample_rate: u32, window_len: i64, audio_len: u64) -> Self {
        let rate = sample_rate as f32;
        let period = rate / note.mid;
        let period_len = ((period + 0.5) as usize).max(1);
        let half_period_len = ((period * 0.5 + 0.5) as usize).max(1);
        let window_periods = (window_len.max(0) as u64 / period_len as u64) as usize;
        let audio_periods = (audio_len / period_len as u64) as i64;

        let mut band = Self {
            note,
            period_len,
            half_period_len,
            shortest_period: rate / note.max,
            longest_period: rate / note.min,
            window_periods,
            audio_periods,
            periods_data: Vec::new(),
            periods_sum: Vec::new(),
            phasors: Vec::new(),
            scratch: Vec::new(),
            cursor: None,
            window: (0, -1),
            total_shift: 0.0,
            phase: f32::NAN,
        };

        if !band.is_inert() {
            let k = 2.0 * PI / period_len as f32;
            band.periods_data = vec![0.0; period_len * window_periods];
            band.periods_sum = vec![0.0; period_len];
            band.scratch = vec![0.0; period_len];
            band.phasors = (0..period_len)
                .map(|j| Complex::new((k * j as f32).cos(), (k * j as f32).sin()))
                .collect();
        }

        band
    }

    /// Bands too long for the audio or the window never produce a strength.
    pub fn is_inert(&self) -> bool {
        self.audio_periods == 0 || self.window_periods < 2
    }

    pub fn freq(&self) -> f32 {
        self.note.mid
    }

    pub fn period_len(&self) -> usize {
        self.period_len
    }

    pub fn window_periods(&self) -> usize {
        self.window_periods
    }

    /// Period index the window is centered on, `None` before the first update.
    pub fn cursor(&self) -> Option<i64> {
        self.cursor
    }

    /// First and last period index inside the window.
    pub fn window(&self) -> (i64, i64) {
        self.window
    }

    pub fn total_shift(&self) -> f32 {
        self.total_shift
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Allowed per-period phase drift, in samples, for a pitch bent by at
    /// most half a semitone.
    fn shift_bounds(&self) -> (f32, f32) {
        let p = self.period_len as f32;
        (p - self.longest_period, p - self.shortest_period)
    }

    /// Move the window so it is centered on the period containing `cursor`
    /// and return the new strength, or `None` when the window did not move.
    pub fn update(&mut self, samples: &[f32], cursor: i64, phase_align: bool) -> Option<f32> {
        // Inert bands keep the zero written when the histogram was built.
        if self.is_inert() {
            return None;
        }

        let p = self.period_len as i64;
        let n = self.window_periods as i64;
        let target = cursor.div_euclid(p).clamp(0, self.audio_periods - 1);

        let rebase = match self.cursor {
            Some(current) if target == current => return None,
            Some(current) => (target - current).abs() > n / 2,
            None => true,
        };

        let left = n / 2;
        let right = n - left - 1;
        let start = (target - left).max(0);
        let end = (target + right).min(self.audio_periods - 1);

        if rebase {
            log::trace!(
                "Rebasing {:.2}Hz band on period {} (window {}..={})",
                self.note.mid,
                target,
                start,
                end
            );
            self.periods_sum.fill(0.0);
            self.total_shift = 0.0;
            self.phase = f32::NAN;
            self.add_periods(samples, start, end, phase_align);
        } else {
            let (old_start, old_end) = self.window;
            self.remove_periods(old_start, old_end.min(start - 1));
            self.remove_periods(old_start.max(end + 1), old_end);
            self.add_periods(samples, start, end.min(old_start - 1), phase_align);
            self.add_periods(samples, start.max(old_end + 1), end, phase_align);
        }

        self.cursor = Some(target);
        self.window = (start, end);

        Some(self.strength())
    }

    fn slot_offset(&self, period_index: i64) -> usize {
        period_index.rem_euclid(self.window_periods as i64) as usize * self.period_len
    }

    fn remove_periods(&mut self, first: i64, last: i64) {
        for k in first..=last {
            let offset = self.slot_offset(k);
            let slot = &self.periods_data[offset..offset + self.period_len];
            for (sum, v) in self.periods_sum.iter_mut().zip(slot) {
                *sum -= v;
            }
        }
    }

    fn add_periods(&mut self, samples: &[f32], first: i64, last: i64, phase_align: bool) {
        if first > last {
            return;
        }

        let p = self.period_len;
        let p_f = p as f32;
        let (min_shift, max_shift) = self.shift_bounds();
        let half = self.half_period_len;
        let base_of = |k: i64| k * p as i64 + half as i64;

        // Consecutive periods are contiguous in the audio, so one moving
        // average slides across the whole run.
        let mut average = MovingAverage::new(samples, base_of(first), half);

        for k in first..=last {
            let base = base_of(k);

            let mut projection = Complex::new(0.0f32, 0.0);
            for (j, (v, phasor)) in self.scratch.iter_mut().zip(&self.phasors).enumerate() {
                *v = sample_at(samples, base + j as i64) - average.value();
                average.step();
                projection += *phasor * *v;
            }

            let phase = (projection.im.atan2(projection.re) * p_f / (2.0 * PI)).rem_euclid(p_f);
            if self.phase.is_nan() {
                self.phase = phase;
            }
            let delta = cyclic_distance(phase + self.total_shift, self.phase, p_f)
                .clamp(min_shift, max_shift);
            self.total_shift += delta;

            let shift = if phase_align {
                (self.total_shift.round() as i64).rem_euclid(p as i64) as usize
            } else {
                0
            };

            let offset = self.slot_offset(k);
            for (j, &v) in self.scratch.iter().enumerate() {
                let index = (j + shift) % p;
                self.periods_data[offset + index] = v;
                self.periods_sum[index] += v;
            }
        }
    }

    /// Peak-to-peak of the integrated, zero-mean period sum, per covered sample.
    fn strength(&self) -> f32 {
        let p = self.period_len as f32;
        let mean = self.periods_sum.iter().sum::<f32>() / p;

        let mut running = 0.0f32;
        let mut lowest = f32::INFINITY;
        let mut highest = f32::NEG_INFINITY;
        for &s in &self.periods_sum {
            running += s - mean;
            lowest = lowest.min(running);
            highest = highest.max(running);
        }

        let covered = ((self.window.1 - self.window.0 + 1) as f32 * p).max(1.0);
        (highest - lowest) / covered * 2.0
    }

    #[cfg(test)]
    fn recomputed_sum(&self) -> Vec<f32> {
        let mut sum = vec![0.0; self.period_len];
        for k in self.window.0..=self.window.1 {
            let offset = self.slot_offset(k);
            for (s, v) in sum.iter_mut().zip(&self.periods_data[offset..offset + self.period_len]) {
                *s += v;
            }
        }
        sum
    }
}

fn sample_at(samples: &[f32], index: i64) -> f32 {
    if index < 0 {
        return 0.0;
    }
    samples.get(index as usize).copied().unwrap_or(0.0)
}

/// Signed distance from `from` to `to` on a circle of length `modulus`,
/// in `[-modulus / 2, modulus / 2)`.
fn cyclic_distance(from: f32, to: f32, modulus: f32) -> f32 {
    let half = modulus * 0.5;
    (to - from + half).rem_euclid(modulus) - half
}

/// Mean of the `2 * half` samples centered on a position, slid one sample
/// at a time. Samples outside the audio count as silence.
struct MovingAverage<'a> {
    samples: &'a [f32],
    position: i64,
    half: i64,
    sum: f32,
    scale: f32,
}

impl<'a> MovingAverage<'a> {
    fn new(samples: &'a [f32], position: i64, half: usize) -> Self {
        let half = half as i64;
        let sum = (position - half..position + half)
            .map(|i| sample_at(samples, i))
            .sum();
        Self {
            samples,
            position,
            half,
            sum,
            scale: 1.0 / (2 * half) as f32,
        }
    }

    fn value(&self) -> f32 {
        self.sum * self.scale
    }

    fn step(&mut self) {
        self.sum += sample_at(self.samples, self.position + self.half)
            - sample_at(self.samples, self.position - self.half);
        self.position += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::notes::note_table;

    const RATE: u32 = 44100;

    fn note(mid: f32) -> NoteRange {
        note_table()
            .find(|n| (n.mid - mid).abs() < 0.01)
            .unwrap()
    }

    fn sine(freq: f32, seconds: f32) -> Vec<f32> {
        let len = (seconds * RATE as f32) as usize;
        (0..len)
            .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / RATE as f32).sin())
            .collect()
    }

    #[test]
    fn derives_sizes_from_note() {
        let band = FrequencyBand::new(note(440.0), RATE, 5512, 44100);
        assert_eq!(band.period_len(), 100);
        assert_eq!(band.window_periods(), 55);
        let period = RATE as f32 / 440.0;
        assert!(band.shortest_period < period && period < band.longest_period);
        let (lo, hi) = band.shift_bounds();
        assert!(lo < 0.0 && hi > 0.0);
        assert!(band.cursor().is_none());
        assert!(band.phase().is_nan());
    }

    #[test]
    fn degenerate_bands_are_inert() {
        let samples = vec![0.5; 50];
        let mut short_audio = FrequencyBand::new(note(440.0), RATE, 5512, samples.len() as u64);
        assert!(short_audio.is_inert());
        assert_eq!(short_audio.update(&samples, 0, false), None);

        let mut short_window = FrequencyBand::new(note(440.0), RATE, 150, 44100);
        assert!(short_window.is_inert());
        assert_eq!(short_window.update(&sine(440.0, 1.0), 0, false), None);
    }

    #[test]
    fn same_period_is_not_recomputed() {
        let samples = sine(440.0, 1.0);
        let mut band = FrequencyBand::new(note(440.0), RATE, 5512, samples.len() as u64);
        assert!(band.update(&samples, 10_000, false).is_some());
        assert_eq!(band.update(&samples, 10_050, false), None);
        assert!(band.update(&samples, 10_100, false).is_some());
    }

    #[test]
    fn cursor_is_clamped_to_audio() {
        let samples = sine(440.0, 0.5);
        let mut band = FrequencyBand::new(note(440.0), RATE, 5512, samples.len() as u64);
        band.update(&samples, -5_000, false);
        assert_eq!(band.cursor(), Some(0));
        assert_eq!(band.window().0, 0);

        band.update(&samples, 10_000_000, false);
        let last = samples.len() as i64 / 100 - 1;
        assert_eq!(band.cursor(), Some(last));
        assert_eq!(band.window().1, last);
    }

    #[test]
    fn sum_matches_window_slots() {
        let samples = sine(440.0, 1.0);
        let mut band = FrequencyBand::new(note(440.0), RATE, 5512, samples.len() as u64);
        for cursor in [0, 1_000, 2_500, 2_000, 9_000, 9_500, 40_000, 39_000] {
            band.update(&samples, cursor, false);
            let expected = band.recomputed_sum();
            for (a, b) in band.periods_sum.iter().zip(&expected) {
                assert!((a - b).abs() < 1e-3, "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn window_is_centered_on_cursor() {
        let samples = sine(440.0, 1.0);
        let mut band = FrequencyBand::new(note(440.0), RATE, 5512, samples.len() as u64);
        band.update(&samples, 20_000, false);
        assert_eq!(band.cursor(), Some(200));
        assert_eq!(band.window(), (200 - 27, 200 + 27));
    }

    #[test]
    fn tuned_tone_outweighs_detuned_band() {
        let samples = sine(440.0, 1.0);
        let mut tuned = FrequencyBand::new(note(440.0), RATE, 5512, samples.len() as u64);
        let mut detuned = FrequencyBand::new(note(466.16), RATE, 5512, samples.len() as u64);
        let a = tuned.update(&samples, 22_050, false).unwrap();
        let b = detuned.update(&samples, 22_050, false).unwrap();
        assert!(a > 0.2, "tuned strength {}", a);
        assert!(a > 4.0 * b, "tuned {} vs detuned {}", a, b);
    }

    #[test]
    fn silence_has_zero_strength() {
        let samples = vec![0.0; 44100];
        let mut band = FrequencyBand::new(note(440.0), RATE, 5512, samples.len() as u64);
        assert_eq!(band.update(&samples, 0, false), Some(0.0));
    }

    #[test]
    fn phase_alignment_tracks_drift_within_bend_range() {
        let samples = sine(440.0, 1.0);
        let mut band = FrequencyBand::new(note(440.0), RATE, 5512, samples.len() as u64);
        let aligned = band.update(&samples, 22_050, true).unwrap();
        let (lo, hi) = band.shift_bounds();
        let periods = (band.window().1 - band.window().0) as f32;
        assert!(band.total_shift() >= lo * periods - 1e-3);
        assert!(band.total_shift() <= hi * periods + 1e-3);
        assert!(!band.phase().is_nan());
        assert!(aligned > 0.2);
    }

    #[test]
    fn cyclic_distance_wraps() {
        assert!((cyclic_distance(1.0, 99.0, 100.0) + 2.0).abs() < 1e-4);
        assert!((cyclic_distance(99.0, 1.0, 100.0) - 2.0).abs() < 1e-4);
        assert!((cyclic_distance(10.0, 30.0, 100.0) - 20.0).abs() < 1e-4);
    }
}
