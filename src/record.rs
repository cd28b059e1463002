use crate::error::{DigestError, Result};
use crate::model::pitch::Pitch;
use crate::model::score::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Note,
    Chord,
}

/// Flat, serializer-friendly view of one [`Event`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub kind: EventKind,
    pub pitches: Vec<String>,
    pub midi_numbers: Vec<u8>,
    pub offset: f64,
    pub duration: f64,
    /// Only present for notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<u8>,
}

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        let pitches = event.pitches();

        let (kind, velocity) = match event {
            Event::Note(note) => (EventKind::Note, Some(note.velocity)),
            Event::Chord(_) => (EventKind::Chord, None),
        };

        Self {
            kind,
            pitches: pitches.iter().map(Pitch::name).collect(),
            midi_numbers: pitches.iter().map(Pitch::midi).collect(),
            offset: event.offset(),
            duration: event.duration(),
            velocity,
        }
    }
}

pub fn to_serializable(events: &[Event]) -> Vec<EventRecord> {
    events.iter().map(EventRecord::from).collect()
}

/// Rebuilds events from records. Notes without a velocity get [`DEFAULT_VELOCITY`].
pub fn from_serializable(records: &[EventRecord]) -> Result<Vec<Event>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| record_to_event(index, record))
        .collect()
}

fn record_to_event(index: usize, record: &EventRecord) -> Result<Event> {
    let invalid = |reason: String| DigestError::InvalidRecord { index, reason };

    if record.midi_numbers.is_empty() {
        return Err(invalid("record carries no pitches".into()));
    }
    if record.pitches.len() != record.midi_numbers.len() {
        return Err(invalid(format!(
            "{} pitch name(s) for {} midi number(s)",
            record.pitches.len(),
            record.midi_numbers.len()
        )));
    }
    if !record.offset.is_finite() || !record.duration.is_finite() {
        return Err(invalid("offset and duration must be finite".into()));
    }

    let mut pitches: Vec<Pitch> = Vec::with_capacity(record.midi_numbers.len());
    for (name, &midi) in record.pitches.iter().zip(&record.midi_numbers) {
        let pitch =
            Pitch::new(midi).ok_or_else(|| invalid(format!("midi number {} is out of range", midi)))?;
        if pitch.name() != *name {
            return Err(invalid(format!(
                "pitch name '{}' does not match midi number {} ({})",
                name,
                midi,
                pitch.name()
            )));
        }
        pitches.push(pitch);
    }

    match record.kind {
        EventKind::Note => {
            let [pitch] = pitches.as_slice() else {
                return Err(invalid(format!(
                    "note record carries {} pitches",
                    pitches.len()
                )));
            };

            let velocity = record.velocity.unwrap_or(DEFAULT_VELOCITY);
            if velocity > 127 {
                return Err(invalid(format!("velocity {} is out of range", velocity)));
            }

            Ok(Event::Note(Note {
                pitch: *pitch,
                offset: record.offset,
                duration: record.duration,
                velocity,
            }))
        }
        EventKind::Chord => Ok(Event::Chord(Chord {
            pitches: pitches.into_iter().collect::<BTreeSet<_>>(),
            offset: record.offset,
            duration: record.duration,
        })),
    }
}
