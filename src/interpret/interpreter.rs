use serde::Serialize;

use crate::analysis::notes::nearest_note_name;
use crate::analysis::Histogram;
use crate::sort::{adaptive_sort, RankedEntry};

use super::loudness::loudness_coefficient;

/// Neighbours on each side lowered around an accepted peak
const HARMONY_RADIUS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Note {
    pub freq: f32,
    pub strength: f32,
}

impl Note {
    pub fn name(&self) -> String {
        nearest_note_name(self.freq)
    }
}

/// Loudness coefficients are cached per histogram generation and rebuilt
/// lazily whenever the histogram they were computed for is replaced.
#[derive(Debug, Default)]
pub struct Interpreter {
    coefficients: Vec<f32>,
    generation: Option<u64>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    fn refresh(&mut self, histogram: &Histogram) {
        if self.generation == Some(histogram.generation())
            && self.coefficients.len() == histogram.len()
        {
            return;
        }
        log::debug!(
            "Rebuilding loudness coefficients for {} entries (generation {})",
            histogram.len(),
            histogram.generation()
        );
        self.coefficients = histogram
            .entries()
            .iter()
            .map(|e| loudness_coefficient(e.freq))
            .collect();
        self.generation = Some(histogram.generation());
    }

    /// Weight every strength by how loud its frequency is perceived.
    ///
    /// Not idempotent: call it once per analysis frame, before
    /// [`keep_harmony`](Self::keep_harmony) and
    /// [`extract_notes`](Self::extract_notes).
    pub fn adjust_to_human_hear(&mut self, histogram: &mut Histogram) {
        self.refresh(histogram);
        for (entry, k) in histogram.entries_mut().iter_mut().zip(&self.coefficients) {
            entry.value *= k;
        }
    }

    /// Non-maximum suppression: visiting entries strongest first, halve the
    /// strength of the neighbours of every entry not already lowered.
    pub fn keep_harmony(&mut self, histogram: &mut Histogram) {
        self.refresh(histogram);

        let ranked = rank(histogram);
        let entries = histogram.entries_mut();
        let len = entries.len();
        let mut lowered = vec![false; len];

        for r in ranked.iter().rev() {
            let index = r.index;
            if lowered[index] {
                continue;
            }
            let from = index.saturating_sub(HARMONY_RADIUS);
            let to = (index + HARMONY_RADIUS).min(len - 1);
            for i in (from..=to).filter(|&i| i != index) {
                entries[i].value *= 0.5;
                lowered[i] = true;
            }
            lowered[index] = true;
        }
    }

    /// Up to `max_count` notes standing out of the histogram, strongest first.
    ///
    /// The cutoff is the mean strength plus the mean gap between
    /// consecutive ranked strengths. Returned strengths have the loudness
    /// correction removed.
    pub fn extract_notes(&mut self, histogram: &Histogram, max_count: usize) -> Vec<Note> {
        self.refresh(histogram);

        let len = histogram.len();
        if len == 0 || max_count == 0 {
            return Vec::new();
        }

        // Accumulated in f64 so a flat histogram's mean is the value itself.
        let ranked = rank(histogram);
        let mean = ranked.iter().map(|r| r.strength as f64).sum::<f64>() / len as f64;
        let spread = if len > 1 {
            ranked
                .windows(2)
                .map(|w| (w[1].strength as f64 - w[0].strength as f64).abs())
                .sum::<f64>()
                / (len - 1) as f64
        } else {
            0.0
        };
        let cutoff = mean + spread;

        let entries = histogram.entries();
        ranked
            .iter()
            .rev()
            .take_while(|r| r.strength as f64 > cutoff)
            .take(max_count)
            .map(|r| {
                let entry = entries[r.index];
                let k = self.coefficients[r.index];
                Note {
                    freq: entry.freq,
                    strength: entry.value / (k * k),
                }
            })
            .collect()
    }
}

/// Histogram positions in ascending order of strength.
fn rank(histogram: &Histogram) -> Vec<RankedEntry> {
    let mut ranked: Vec<RankedEntry> = histogram
        .values()
        .enumerate()
        .map(|(i, v)| RankedEntry::new(i, v))
        .collect();
    adaptive_sort(&mut ranked);
    ranked
}
