//! Equal-tempered note table anchored at A4 = 440 Hz.

/// Ratio between two adjacent semitones, 2^(1/12)
pub const SEMITONE_RATIO: f32 = 1.059_463_1;
/// Half a semitone, 2^(1/24). Used as the bend tolerance around each note.
pub const HALF_SEMITONE_RATIO: f32 = 1.029_302_2;

const A4_FREQ: f64 = 440.0;
const A4_MIDI: i32 = 69;

/// Semitone offsets from A4 covered by the table: 13.75 Hz up to ~21.1 kHz.
const FIRST_OFFSET: i32 = -60;
const LAST_OFFSET: i32 = 67;

pub const NOTE_COUNT: usize = (LAST_OFFSET - FIRST_OFFSET + 1) as usize;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A note of the table and the frequency span attributed to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteRange {
    pub min: f32,
    pub mid: f32,
    pub max: f32,
    pub midi: i32,
}

impl NoteRange {
    fn from_offset(offset: i32) -> Self {
        let mid = A4_FREQ * 2f64.powf(offset as f64 / 12.0);
        let half = 2f64.powf(1.0 / 24.0);
        Self {
            min: (mid / half) as f32,
            mid: mid as f32,
            max: (mid * half) as f32,
            midi: A4_MIDI + offset,
        }
    }

    /// Scientific pitch name, e.g. `A4` or `C#5`.
    pub fn name(&self) -> String {
        midi_name(self.midi)
    }
}

/// Every note of the table in ascending order.
pub fn note_table() -> impl Iterator<Item = NoteRange> {
    (FIRST_OFFSET..=LAST_OFFSET).map(NoteRange::from_offset)
}

/// Notes whose mid frequency lies within `[min_freq, max_freq]`.
pub fn notes_in_domain(min_freq: f32, max_freq: f32) -> Vec<NoteRange> {
    note_table()
        .skip_while(|n| n.mid < min_freq)
        .take_while(|n| n.mid <= max_freq)
        .collect()
}

pub fn midi_name(midi: i32) -> String {
    let octave = midi.div_euclid(12) - 1;
    format!("{}{}", NOTE_NAMES[midi.rem_euclid(12) as usize], octave)
}

/// Fractional MIDI note number of a frequency.
pub fn freq_to_midi(freq: f32) -> f32 {
    12.0 * (freq / A4_FREQ as f32).log2() + A4_MIDI as f32
}

/// Name of the table note closest to `freq`.
pub fn nearest_note_name(freq: f32) -> String {
    midi_name(freq_to_midi(freq).round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_twelve_tone_equal_temperament() {
        let table: Vec<NoteRange> = note_table().collect();
        assert_eq!(table.len(), NOTE_COUNT);
        assert!((table[0].mid - 13.75).abs() < 1e-3);
        assert!((table[NOTE_COUNT - 1].mid - 21096.16).abs() < 0.05);

        let a4 = table.iter().find(|n| n.midi == 69).unwrap();
        assert_eq!(a4.mid, 440.0);
        assert_eq!(a4.name(), "A4");

        let c4 = table.iter().find(|n| n.midi == 60).unwrap();
        assert!((c4.mid - 261.63).abs() < 0.01);
        assert_eq!(c4.name(), "C4");

        for pair in table.windows(2) {
            let ratio = pair[1].mid / pair[0].mid;
            assert!((ratio - SEMITONE_RATIO).abs() < 1e-5);
            assert!((pair[0].max - pair[1].min).abs() < pair[0].mid * 1e-5);
        }
    }

    #[test]
    fn bend_bounds_are_half_semitones() {
        for note in note_table() {
            assert!((note.max / note.mid - HALF_SEMITONE_RATIO).abs() < 1e-5);
            assert!((note.mid / note.min - HALF_SEMITONE_RATIO).abs() < 1e-5);
        }
    }

    #[test]
    fn domain_selection_uses_mid_frequency() {
        let notes = notes_in_domain(430.0, 470.0);
        let mids: Vec<f32> = notes.iter().map(|n| n.mid).collect();
        assert_eq!(mids.len(), 2);
        assert_eq!(mids[0], 440.0);
        assert!((mids[1] - 466.16).abs() < 0.01);

        assert_eq!(notes_in_domain(440.0, 440.0).len(), 1);
        assert!(notes_in_domain(5000.0, 20.0).is_empty());
        assert!(notes_in_domain(441.0, 465.0).is_empty());
        assert_eq!(notes_in_domain(0.0, 1e6).len(), NOTE_COUNT);
    }

    #[test]
    fn names_nearest_note() {
        assert_eq!(nearest_note_name(445.0), "A4");
        assert_eq!(nearest_note_name(27.5), "A0");
        assert_eq!(nearest_note_name(554.37), "C#5");
        assert_eq!(midi_name(0), "C-1");
    }
}
