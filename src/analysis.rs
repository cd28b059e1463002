//! Musical summary of a score: an estimated key and the chord progression.
//!
//! Key finding follows Krumhansl-Schmuckler: a duration-weighted pitch-class histogram is
//! correlated against the Krumhansl-Kessler probe-tone profiles for all 24 major/minor keys.
//!
//! The progression is read vertically. Every onset and release across the tracks of one input
//! starts a new slice, and each slice sounding two or more pitch classes is named as a chord.

use crate::extract::extract_events;
use crate::model::pitch::{PITCH_CLASS_NAMES, Pitch};
use crate::model::score::{Chord, Event, Score, Track};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];
const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Interval sets above the root, and the quality they spell.
const CHORD_QUALITIES: &[(&[u8], &str)] = &[
    (&[0, 7], "power chord"),
    (&[0, 4, 7], "major triad"),
    (&[0, 3, 7], "minor triad"),
    (&[0, 3, 6], "diminished triad"),
    (&[0, 4, 8], "augmented triad"),
    (&[0, 2, 7], "suspended second"),
    (&[0, 5, 7], "suspended fourth"),
    (&[0, 4, 7, 10], "dominant seventh"),
    (&[0, 4, 7, 11], "major seventh"),
    (&[0, 3, 7, 10], "minor seventh"),
    (&[0, 3, 7, 11], "minor-major seventh"),
    (&[0, 3, 6, 10], "half-diminished seventh"),
    (&[0, 3, 6, 9], "diminished seventh"),
];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Major,
    Minor,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KeyEstimate {
    pub tonic: String,
    pub mode: Mode,
    /// Pearson correlation with the winning key profile, in `-1.0..=1.0`.
    pub correlation: f64,
}

impl KeyEstimate {
    pub fn name(&self) -> String {
        match self.mode {
            Mode::Major => format!("{} major", self.tonic),
            Mode::Minor => format!("{} minor", self.tonic),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Analysis {
    pub key: Option<KeyEstimate>,
    pub chords: Vec<String>,
}

pub fn analyze(score: &Score) -> Analysis {
    Analysis {
        key: estimate_key(&extract_events(score)),
        chords: chord_progression(score),
    }
}

/// `None` means there was nothing pitched to analyze.
pub fn estimate_key(events: &[Event]) -> Option<KeyEstimate> {
    let mut histogram = [0.0f64; 12];
    for event in events {
        let weight = event.duration().max(0.0);
        for pitch in event.pitches() {
            histogram[pitch.pitch_class() as usize] += weight;
        }
    }

    if histogram.iter().sum::<f64>() <= 0.0 {
        debug!("No pitched material to estimate a key from");
        return None;
    }

    let mut best: Option<KeyEstimate> = None;
    for (mode, profile) in [(Mode::Major, &MAJOR_PROFILE), (Mode::Minor, &MINOR_PROFILE)] {
        for tonic in 0..12 {
            let rotated: [f64; 12] = std::array::from_fn(|pc| profile[(pc + 12 - tonic) % 12]);
            let correlation = pearson(&histogram, &rotated);

            if best.as_ref().is_none_or(|b| correlation > b.correlation) {
                best = Some(KeyEstimate {
                    tonic: PITCH_CLASS_NAMES[tonic].to_string(),
                    mode,
                    correlation,
                });
            }
        }
    }

    if let Some(key) = &best {
        debug!("Estimated key {} (r = {:.3})", key.name(), key.correlation);
    }

    best
}

fn pearson(xs: &[f64; 12], ys: &[f64; 12]) -> f64 {
    let mean_x = xs.iter().sum::<f64>() / 12.0;
    let mean_y = ys.iter().sum::<f64>() / 12.0;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 { 0.0 } else { cov / denom }
}

/// Names a chord by root and quality, e.g. `C major triad`. The bass note is tried as the root
/// first. Unrecognized sets fall back to their pitch classes joined by `-`.
pub fn name_chord(chord: &Chord) -> String {
    let Some(bass) = chord.pitches.first() else {
        return String::new();
    };
    let bass_pc = bass.pitch_class();

    let classes: BTreeSet<u8> = chord.pitches.iter().map(|p| p.pitch_class()).collect();
    let candidates = std::iter::once(bass_pc).chain(classes.iter().copied().filter(|&pc| pc != bass_pc));

    for root in candidates {
        let intervals: BTreeSet<u8> = classes.iter().map(|&pc| (pc + 12 - root) % 12).collect();
        let intervals: Vec<u8> = intervals.into_iter().collect();

        if let Some((_, quality)) = CHORD_QUALITIES
            .iter()
            .find(|(shape, _)| *shape == intervals.as_slice())
        {
            return format!("{} {}", PITCH_CLASS_NAMES[root as usize], quality);
        }
    }

    std::iter::once(bass_pc)
        .chain(classes.iter().copied().filter(|&pc| pc != bass_pc))
        .map(|pc| PITCH_CLASS_NAMES[pc as usize])
        .collect::<Vec<_>>()
        .join("-")
}

/// Chord names of the score's vertical sonorities in time order, one input after another.
pub fn chord_progression(score: &Score) -> Vec<String> {
    score
        .input_tracks()
        .into_iter()
        .flat_map(sonorities)
        .map(|chord| name_chord(&chord))
        .collect()
}

/// Slices tracks that share a timeline at every onset and release, keeping the slices where at
/// least two pitch classes sound at once.
fn sonorities(tracks: &[Track]) -> Vec<Chord> {
    let spans: Vec<(f64, f64, Pitch)> = tracks
        .iter()
        .flat_map(|track| &track.events)
        .filter(|event| event.duration() > 0.0)
        .flat_map(|event| {
            let (start, end) = (event.offset(), event.offset() + event.duration());
            event.pitches().into_iter().map(move |pitch| (start, end, pitch))
        })
        .collect();

    let mut boundaries: Vec<f64> = spans.iter().flat_map(|&(start, end, _)| [start, end]).collect();
    boundaries.sort_by(f64::total_cmp);
    boundaries.dedup();

    let mut chords = Vec::new();
    for window in boundaries.windows(2) {
        let (start, end) = (window[0], window[1]);
        let pitches: BTreeSet<Pitch> = spans
            .iter()
            .filter(|&&(from, until, _)| from <= start && start < until)
            .map(|&(_, _, pitch)| pitch)
            .collect();

        let classes: BTreeSet<u8> = pitches.iter().map(Pitch::pitch_class).collect();
        if classes.len() < 2 {
            continue;
        }

        chords.push(Chord {
            pitches,
            offset: start,
            duration: end - start,
        });
    }

    debug!("Found {} sonorities across {} track(s)", chords.len(), tracks.len());
    chords
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::midi_importer::{merge, parse};
    use crate::model::score::Note;
    use crate::test_util::*;

    fn note(midi: u8, offset: f64, duration: f64) -> Event {
        Event::Note(Note::new(Pitch::new(midi).unwrap(), offset, duration))
    }

    fn chord(midis: &[u8], offset: f64, duration: f64) -> Chord {
        Chord {
            pitches: midis.iter().filter_map(|&m| Pitch::new(m)).collect(),
            offset,
            duration,
        }
    }

    #[test]
    fn nothing_to_analyze() {
        assert!(estimate_key(&[]).is_none());
        assert_eq!(analyze(&Score::default()), Analysis::default());
    }

    #[test]
    fn c_major_material() {
        let mut events: Vec<Event> = [60, 62, 64, 65, 67, 69, 71, 72]
            .iter()
            .enumerate()
            .map(|(i, &m)| note(m, i as f64, 1.0))
            .collect();
        events.push(Event::Chord(chord(&[48, 52, 55], 8.0, 4.0)));

        let key = estimate_key(&events).unwrap();
        assert_eq!(key.name(), "C major");
        assert!(key.correlation > 0.5);
    }

    #[test]
    fn a_minor_material() {
        let mut events: Vec<Event> = [57, 59, 60, 62, 64, 65, 67, 69]
            .iter()
            .enumerate()
            .map(|(i, &m)| note(m, i as f64, 1.0))
            .collect();
        events.push(Event::Chord(chord(&[45, 48, 52], 8.0, 4.0)));
        events.push(Event::Chord(chord(&[52, 56, 59], 12.0, 2.0)));
        events.push(Event::Chord(chord(&[45, 48, 52], 14.0, 4.0)));

        let key = estimate_key(&events).unwrap();
        assert_eq!(key.name(), "A minor");
    }

    #[test]
    fn chord_names() {
        assert_eq!(name_chord(&chord(&[60, 64, 67], 0.0, 1.0)), "C major triad");
        assert_eq!(name_chord(&chord(&[52, 55, 60], 0.0, 1.0)), "C major triad");
        assert_eq!(name_chord(&chord(&[57, 60, 64], 0.0, 1.0)), "A minor triad");
        assert_eq!(name_chord(&chord(&[55, 59, 62, 65], 0.0, 1.0)), "G dominant seventh");
        assert_eq!(name_chord(&chord(&[59, 62, 65], 0.0, 1.0)), "B diminished triad");
        assert_eq!(name_chord(&chord(&[60, 67, 72], 0.0, 1.0)), "C power chord");
        assert_eq!(name_chord(&chord(&[60, 62], 0.0, 1.0)), "C-D");
    }

    #[test]
    fn single_track_chords() {
        let score = parse(&g_major_whole_note()).unwrap();
        assert_eq!(chord_progression(&score), vec!["G major triad"]);

        let melody = parse(&two_note_melody()).unwrap();
        assert!(chord_progression(&melody).is_empty());
    }

    #[test]
    fn chords_span_tracks() {
        env_logger::try_init().unwrap_or(());

        let bytes = smf_bytes(vec![
            notes_track(vec![], &[(60, 0, 1)]),
            notes_track(vec![], &[(52, 0, 1), (55, 0, 1)]),
        ]);
        let score = parse(&bytes).unwrap();

        // per track this is a lone C4 and an E3/G3 dyad
        assert_eq!(extract_events(&score).len(), 2);
        assert_eq!(chord_progression(&score), vec!["C major triad"]);
    }

    #[test]
    fn melody_over_held_bass() {
        let bytes = smf_bytes(vec![
            notes_track(vec![], &[(64, 0, 1), (67, 1, 1)]),
            notes_track(vec![], &[(48, 0, 2), (55, 0, 2)]),
        ]);
        let score = parse(&bytes).unwrap();

        assert_eq!(
            chord_progression(&score),
            vec!["C major triad", "C power chord"]
        );
    }

    #[test]
    fn progression_keeps_inputs_apart() {
        env_logger::try_init().unwrap_or(());

        // both inputs start at offset zero; laid over each other they would clash
        let score = merge(&[two_note_melody(), g_major_whole_note()]).unwrap();
        assert_eq!(chord_progression(&score), vec!["G major triad"]);

        let analysis = analyze(&score);
        assert_eq!(analysis.chords, vec!["G major triad"]);
        assert!(analysis.key.is_some());
    }

    #[test]
    fn rests_break_sonorities() {
        let bytes = smf_bytes(vec![
            notes_track(vec![], &[(60, 0, 1), (60, 2, 1)]),
            notes_track(vec![], &[(64, 0, 1), (62, 2, 1)]),
        ]);
        let score = parse(&bytes).unwrap();

        assert_eq!(chord_progression(&score), vec!["C-E", "C-D"]);
    }
}
