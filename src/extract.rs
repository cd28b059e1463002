use crate::model::pitch::Pitch;
use crate::model::score::*;
use log::debug;
use std::collections::BTreeSet;

/// Flattens every track into one sequence, track by track.
///
/// Inside a track, events are ordered by offset then duration. Events sharing both an offset and a
/// duration sound together and collapse into a single [`Chord`]; everything else stays separate,
/// even when the same pitches repeat at a later offset.
pub fn extract_events(score: &Score) -> Vec<Event> {
    let mut events: Vec<Event> = Vec::new();
    let mut grouped = 0usize;

    for (track_idx, track) in score.tracks.iter().enumerate() {
        let mut ordered: Vec<&Event> = track.events.iter().collect();
        ordered.sort_by(|a, b| {
            a.offset()
                .total_cmp(&b.offset())
                .then(a.duration().total_cmp(&b.duration()))
        });

        for group in ordered.chunk_by(|a, b| a.offset() == b.offset() && a.duration() == b.duration()) {
            match group {
                [single] => events.push((*single).clone()),
                _ => {
                    grouped += group.len();
                    events.push(group_simultaneous(group));
                }
            }
        }

        debug!(
            "Extracted track {} ({}) with {} source event(s)",
            track_idx,
            track.name.as_deref().unwrap_or("<unnamed>"),
            track.events.len()
        );
    }

    if grouped > 0 {
        debug!("Grouped {} simultaneous event(s) into chords", grouped);
    }

    events
}

/// `group` must be non-empty and share one offset and duration.
fn group_simultaneous(group: &[&Event]) -> Event {
    let offset = group[0].offset();
    let duration = group[0].duration();

    let pitches: BTreeSet<Pitch> = group.iter().flat_map(|event| event.pitches()).collect();

    if pitches.len() == 1 {
        // unison doubling, e.g. the same key on two channels
        let velocity = group
            .iter()
            .filter_map(|event| match event {
                Event::Note(note) => Some(note.velocity),
                Event::Chord(_) => None,
            })
            .max()
            .unwrap_or(DEFAULT_VELOCITY);

        let pitch = group[0].pitches()[0];
        return Event::Note(Note {
            pitch,
            offset,
            duration,
            velocity,
        });
    }

    Event::Chord(Chord {
        pitches,
        offset,
        duration,
    })
}
