use crate::model::pitch::Pitch;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_VELOCITY: u8 = 64;
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;

const MAJOR_KEY_NAMES: [&str; 15] = [
    "Cb", "Gb", "Db", "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#",
];
const MINOR_KEY_NAMES: [&str; 15] = [
    "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#", "G#", "D#", "A#",
];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub pitch: Pitch,
    /// Quarter notes from the start of the owning track.
    pub offset: f64,
    /// Length in quarter notes.
    pub duration: f64,
    pub velocity: u8,
}

impl Note {
    pub fn new(pitch: Pitch, offset: f64, duration: f64) -> Self {
        Self {
            pitch,
            offset,
            duration,
            velocity: DEFAULT_VELOCITY,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Chord {
    pub pitches: BTreeSet<Pitch>,
    pub offset: f64,
    pub duration: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Event {
    Note(Note),
    Chord(Chord),
}

impl Event {
    pub fn offset(&self) -> f64 {
        match self {
            Event::Note(note) => note.offset,
            Event::Chord(chord) => chord.offset,
        }
    }

    pub fn duration(&self) -> f64 {
        match self {
            Event::Note(note) => note.duration,
            Event::Chord(chord) => chord.duration,
        }
    }

    /// Sounding pitches in ascending order.
    pub fn pitches(&self) -> Vec<Pitch> {
        match self {
            Event::Note(note) => vec![note.pitch],
            Event::Chord(chord) => chord.pitches.iter().copied().collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub name: Option<String>,
    pub events: Vec<Event>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }
}

/// Key signature as written in the file: a count of sharps (positive) or flats (negative).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "RawKeySignature")]
pub struct KeySignature {
    sharps: i8,
    minor: bool,
}

#[derive(Deserialize)]
struct RawKeySignature {
    sharps: i8,
    minor: bool,
}

impl TryFrom<RawKeySignature> for KeySignature {
    type Error = String;

    fn try_from(raw: RawKeySignature) -> Result<Self, Self::Error> {
        KeySignature::new(raw.sharps, raw.minor)
            .ok_or_else(|| format!("{} sharps is not a key signature", raw.sharps))
    }
}

impl KeySignature {
    /// Returns `None` outside of seven flats..=seven sharps.
    pub fn new(sharps: i8, minor: bool) -> Option<Self> {
        (-7..=7).contains(&sharps).then_some(Self { sharps, minor })
    }

    pub fn sharps(&self) -> i8 {
        self.sharps
    }

    pub fn is_minor(&self) -> bool {
        self.minor
    }

    pub fn name(&self) -> String {
        let names = if self.minor {
            &MINOR_KEY_NAMES
        } else {
            &MAJOR_KEY_NAMES
        };
        let mode = if self.minor { "minor" } else { "major" };

        match usize::try_from(i16::from(self.sharps) + 7)
            .ok()
            .and_then(|idx| names.get(idx))
        {
            Some(tonic) => format!("{} {}", tonic, mode),
            None => format!("{} sharps {}", self.sharps, mode),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Metadata {
    pub tempo_bpm: f64,
    pub time_signature: TimeSignature,
    pub key: Option<KeySignature>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            tempo_bpm: DEFAULT_TEMPO_BPM,
            time_signature: TimeSignature::default(),
            key: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Score {
    pub metadata: Metadata,
    pub tracks: Vec<Track>,
    /// How many tracks each input contributed, in input order.
    #[serde(default)]
    pub inputs: Vec<usize>,
}

impl Score {
    /// Tracks split by the input they came from. Every input's offsets start at its own zero, so
    /// only tracks of the same input line up in time. A score whose `inputs` do not add up to
    /// its track count is treated as a single input.
    pub fn input_tracks(&self) -> Vec<&[Track]> {
        if self.inputs.iter().sum::<usize>() != self.tracks.len() {
            return vec![self.tracks.as_slice()];
        }

        let mut groups = Vec::with_capacity(self.inputs.len());
        let mut start = 0;
        for &count in &self.inputs {
            groups.push(&self.tracks[start..start + count]);
            start += count;
        }
        groups
    }
}
