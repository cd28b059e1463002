//! In-memory MIDI fixtures for unit tests.

use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};

pub const TPQ: u16 = 480;
pub const TEST_VELOCITY: u8 = 100;

pub fn smf_bytes(tracks: Vec<Track<'static>>) -> Vec<u8> {
    let format = if tracks.len() > 1 {
        Format::Parallel
    } else {
        Format::SingleTrack
    };

    let mut smf = Smf::new(Header::new(format, Timing::Metrical(u15::new(TPQ))));
    smf.tracks = tracks;

    let mut bytes = Vec::new();
    smf.write_std(&mut bytes).expect("in-memory MIDI write");
    bytes
}

pub fn midi(delta: u32, message: MidiMessage) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message,
        },
    }
}

pub fn note_on(delta: u32, key: u8, vel: u8) -> TrackEvent<'static> {
    midi(
        delta,
        MidiMessage::NoteOn {
            key: u7::new(key),
            vel: u7::new(vel),
        },
    )
}

pub fn note_off(delta: u32, key: u8) -> TrackEvent<'static> {
    midi(
        delta,
        MidiMessage::NoteOff {
            key: u7::new(key),
            vel: u7::new(0),
        },
    )
}

pub fn meta(delta: u32, message: MetaMessage<'static>) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Meta(message),
    }
}

pub fn tempo(delta: u32, bpm: u32) -> TrackEvent<'static> {
    meta(delta, MetaMessage::Tempo(u24::new(60_000_000 / bpm)))
}

pub fn time_signature(delta: u32, numerator: u8, denom_pow: u8) -> TrackEvent<'static> {
    meta(
        delta,
        MetaMessage::TimeSignature(numerator, denom_pow, 24, 8),
    )
}

pub fn key_signature(delta: u32, sharps: i8, minor: bool) -> TrackEvent<'static> {
    meta(delta, MetaMessage::KeySignature(sharps, minor))
}

pub fn track_name(name: &'static str) -> TrackEvent<'static> {
    meta(0, MetaMessage::TrackName(name.as_bytes()))
}

pub fn sysex(delta: u32) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::SysEx(&[0x7E, 0x7F, 0x09, 0x01, 0xF7]),
    }
}

pub fn end_of_track() -> TrackEvent<'static> {
    meta(0, MetaMessage::EndOfTrack)
}

/// Builds a track from `(key, start, length)` triples measured in quarter notes.
pub fn notes_track(
    header: Vec<TrackEvent<'static>>,
    notes: &[(u8, u32, u32)],
) -> Track<'static> {
    let tpq = TPQ as u32;

    // (tick, is_on, key); offs sort ahead of ons at the same tick
    let mut points: Vec<(u32, bool, u8)> = Vec::new();
    for &(key, start, length) in notes {
        points.push((start * tpq, true, key));
        points.push(((start + length) * tpq, false, key));
    }
    points.sort_by_key(|&(tick, is_on, key)| (tick, is_on, key));

    let mut track = header;
    let mut last_tick = 0;
    for (tick, is_on, key) in points {
        let delta = tick - last_tick;
        last_tick = tick;
        if is_on {
            track.push(note_on(delta, key, TEST_VELOCITY));
        } else {
            track.push(note_off(delta, key));
        }
    }
    track.push(end_of_track());
    track
}

/// One quarter-note C4 at offset 0 followed by a quarter-note E4 at offset 1.
pub fn two_note_melody() -> Vec<u8> {
    smf_bytes(vec![notes_track(
        vec![tempo(0, 96), time_signature(0, 3, 2), key_signature(0, 0, false)],
        &[(60, 0, 1), (64, 1, 1)],
    )])
}

/// A whole-note G3/B3/D4 chord at offset 0.
pub fn g_major_whole_note() -> Vec<u8> {
    smf_bytes(vec![notes_track(
        vec![tempo(0, 80), time_signature(0, 6, 3), key_signature(0, 1, false)],
        &[(55, 0, 4), (59, 0, 4), (62, 0, 4)],
    )])
}
