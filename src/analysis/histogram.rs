use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HistogramEntry {
    pub freq: f32,
    pub value: f32,
}

/// Latest strength per tracked frequency, in ascending frequency order.
///
/// `generation` changes every time the set of tracked frequencies is
/// rebuilt, so consumers caching per-entry data can tell when it is stale.
#[derive(Clone, Debug, Default)]
pub struct Histogram {
    entries: Vec<HistogramEntry>,
    generation: u64,
}

impl Histogram {
    /// Histogram over `freqs` with every value at zero.
    pub fn new(freqs: impl IntoIterator<Item = f32>, generation: u64) -> Self {
        Self {
            entries: freqs
                .into_iter()
                .map(|freq| HistogramEntry { freq, value: 0.0 })
                .collect(),
            generation,
        }
    }

    pub fn from_entries(entries: Vec<HistogramEntry>, generation: u64) -> Self {
        Self {
            entries,
            generation,
        }
    }

    pub fn entries(&self) -> &[HistogramEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [HistogramEntry] {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.entries.iter().map(|e| e.value)
    }

    pub(crate) fn set_value(&mut self, index: usize, value: f32) {
        self.entries[index].value = value;
    }

    /// Index of the strongest entry, if any.
    pub fn peak(&self) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (i, e)| match best {
                Some((_, v)) if v >= e.value => best,
                _ => Some((i, e.value)),
            })
            .map(|(i, _)| i)
    }
}
