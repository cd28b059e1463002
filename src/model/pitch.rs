use serde::{Deserialize, Serialize};
use std::fmt;

pub const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A single MIDI pitch. Names use sharps and put middle C (60) in octave 4.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub struct Pitch {
    midi: u8,
}

impl Pitch {
    /// Returns `None` for numbers outside of the 7-bit MIDI range.
    pub fn new(midi: u8) -> Option<Self> {
        (midi <= 127).then_some(Self { midi })
    }

    pub fn midi(&self) -> u8 {
        self.midi
    }

    pub fn pitch_class(&self) -> u8 {
        self.midi % 12
    }

    pub fn octave(&self) -> i8 {
        (self.midi / 12) as i8 - 1
    }

    pub fn name(&self) -> String {
        format!(
            "{}{}",
            PITCH_CLASS_NAMES[self.pitch_class() as usize],
            self.octave()
        )
    }
}

impl TryFrom<u8> for Pitch {
    type Error = String;

    fn try_from(midi: u8) -> Result<Self, Self::Error> {
        Pitch::new(midi).ok_or_else(|| format!("midi number {} is out of range", midi))
    }
}

impl From<Pitch> for u8 {
    fn from(pitch: Pitch) -> Self {
        pitch.midi
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pitch_names() {
        assert_eq!(Pitch::new(60).unwrap().name(), "C4");
        assert_eq!(Pitch::new(61).unwrap().name(), "C#4");
        assert_eq!(Pitch::new(55).unwrap().name(), "G3");
        assert_eq!(Pitch::new(69).unwrap().name(), "A4");
        assert_eq!(Pitch::new(0).unwrap().name(), "C-1");
        assert_eq!(Pitch::new(127).unwrap().name(), "G9");
    }

    #[test]
    fn pitch_out_of_range() {
        assert!(Pitch::new(128).is_none());
        assert!(Pitch::new(255).is_none());
    }

    #[test]
    fn pitch_serde_checks_range() {
        let pitch: Pitch = serde_json::from_str("69").unwrap();
        assert_eq!(pitch.midi(), 69);
        assert_eq!(serde_json::to_string(&pitch).unwrap(), "69");

        assert!(serde_json::from_str::<Pitch>("128").is_err());
    }
}
