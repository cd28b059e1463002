use crate::error::{DigestError, Result};
use crate::model::pitch::Pitch;
use crate::model::score::*;
use log::{debug, info, warn};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const MICROSECONDS_PER_MINUTE: f64 = 60_000_000.0;

struct NoteInterval {
    pub midi: u8,
    pub start_tick: u64,
    pub end_tick: u64,
    pub velocity: u8,
}

/// Holds the value offered at the lowest tick. Ties keep the earliest offer.
struct FirstSeen<T> {
    seen: Option<(u64, T)>,
}

impl<T> FirstSeen<T> {
    fn new() -> Self {
        Self { seen: None }
    }

    fn offer(&mut self, tick: u64, value: T) {
        match &self.seen {
            Some((seen_tick, _)) if *seen_tick <= tick => {}
            _ => self.seen = Some((tick, value)),
        }
    }

    fn into_value(self) -> Option<T> {
        self.seen.map(|(_, value)| value)
    }
}

/// Reads every file into memory before merging, so an unreadable path never yields a partial score.
pub fn import_midi_files<P: AsRef<Path>>(paths: &[P]) -> Result<Score> {
    let mut sources: Vec<Vec<u8>> = Vec::with_capacity(paths.len());

    for path in paths {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| DigestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Read {} byte(s) from '{}'..!", bytes.len(), path.display());
        sources.push(bytes);
    }

    merge(&sources)
}

/// Lays out every source's tracks one after another. Global metadata comes from the first source.
pub fn merge<S: AsRef<[u8]>>(sources: &[S]) -> Result<Score> {
    if sources.is_empty() {
        return Err(DigestError::EmptyInput);
    }

    let mut merged = Score::default();
    for (idx, source) in sources.iter().enumerate() {
        let score = parse(source.as_ref()).map_err(|e| e.at_input(idx))?;

        if idx == 0 {
            merged.metadata = score.metadata;
        } else if score.metadata != merged.metadata {
            debug!(
                "Input #{} carries its own metadata {:?}, keeping the first input's..!",
                idx, score.metadata
            );
        }

        debug!("Appending {} track(s) from input #{}..!", score.tracks.len(), idx);
        merged.inputs.push(score.tracks.len());
        merged.tracks.extend(score.tracks);
    }

    info!(
        "Merged {} MIDI input(s) into {} track(s)..!",
        sources.len(),
        merged.tracks.len()
    );

    Ok(merged)
}

/// Decodes one Standard MIDI File. Each MIDI track becomes one [`Track`], empty ones included.
pub fn parse(bytes: &[u8]) -> Result<Score> {
    let smf = Smf::parse(bytes).map_err(|e| DigestError::Parse {
        input: 0,
        reason: e.to_string(),
    })?;

    let ticks_per_quarter = match smf.header.timing {
        Timing::Metrical(t) => t.as_int() as u64,
        Timing::Timecode(fps, subframe) => {
            return Err(DigestError::Parse {
                input: 0,
                reason: format!(
                    "SMPTE timecode timing ({:?}, {} subframes) is not supported..!",
                    fps, subframe
                ),
            });
        }
    };

    if ticks_per_quarter == 0 {
        return Err(DigestError::Parse {
            input: 0,
            reason: "header declares zero ticks per quarter note".into(),
        });
    }

    debug!("Ticks per quarter note: {}", ticks_per_quarter);
    debug!(
        "MIDI format: {:?}, tracks: {}",
        smf.header.format,
        smf.tracks.len()
    );

    let mut tempo_bpm: FirstSeen<f64> = FirstSeen::new();
    let mut time_signature: FirstSeen<TimeSignature> = FirstSeen::new();
    let mut key_signature: FirstSeen<KeySignature> = FirstSeen::new();
    let mut tracks: Vec<Track> = Vec::with_capacity(smf.tracks.len());

    for (track_idx, track) in smf.tracks.iter().enumerate() {
        let mut name: Option<String> = None;
        let mut abs_tick: u64 = 0;
        let mut intervals: Vec<NoteInterval> = Vec::new();
        let mut open_notes: HashMap<(u8, u8), Vec<(u64, u8)>> = HashMap::new();

        for event in track.iter() {
            abs_tick = abs_tick.saturating_add(event.delta.as_int() as u64);

            match &event.kind {
                TrackEventKind::Meta(meta) => match meta {
                    MetaMessage::Tempo(micro) => {
                        let mpqn: u32 = micro.as_int();
                        if mpqn == 0 {
                            skip_unsupported(track_idx, abs_tick, "zero tempo");
                            continue;
                        }

                        debug!(
                            "Tempo at tick {} -> {} us/qn (track {})",
                            abs_tick, mpqn, track_idx
                        );
                        tempo_bpm.offer(abs_tick, MICROSECONDS_PER_MINUTE / mpqn as f64);
                    }
                    MetaMessage::TimeSignature(numerator, denom_pow, _, _) => {
                        match 1u8.checked_shl(u32::from(*denom_pow)) {
                            Some(denominator) if *numerator > 0 => time_signature.offer(
                                abs_tick,
                                TimeSignature {
                                    numerator: *numerator,
                                    denominator,
                                },
                            ),
                            _ => skip_unsupported(track_idx, abs_tick, "time signature"),
                        }
                    }
                    MetaMessage::KeySignature(sharps, minor) => {
                        match KeySignature::new(*sharps, *minor) {
                            Some(signature) => key_signature.offer(abs_tick, signature),
                            None => skip_unsupported(track_idx, abs_tick, "key signature"),
                        }
                    }
                    MetaMessage::TrackName(bytes) => {
                        if name.is_none() {
                            let track_name = String::from_utf8_lossy(bytes).into_owned();
                            debug!("Track {} name: {}", track_idx, track_name);
                            name = Some(track_name);
                        }
                    }
                    MetaMessage::Unknown(..) => {
                        skip_unsupported(track_idx, abs_tick, "meta event");
                    }
                    _ => {}
                },
                TrackEventKind::Midi { channel, message } => {
                    let ch: u8 = channel.as_int();

                    match message {
                        MidiMessage::NoteOn { key, vel } => {
                            let velocity: u8 = vel.as_int();

                            if velocity == 0 {
                                close_note(
                                    &mut open_notes,
                                    &mut intervals,
                                    ch,
                                    key.as_int(),
                                    abs_tick,
                                );
                            } else {
                                open_notes
                                    .entry((ch, key.as_int()))
                                    .or_default()
                                    .push((abs_tick, velocity));
                            }
                        }
                        MidiMessage::NoteOff { key, vel: _ } => {
                            close_note(&mut open_notes, &mut intervals, ch, key.as_int(), abs_tick);
                        }
                        _ => {}
                    }
                }
                TrackEventKind::SysEx(_) => {
                    skip_unsupported(track_idx, abs_tick, "system exclusive message");
                }
                TrackEventKind::Escape(_) => {
                    skip_unsupported(track_idx, abs_tick, "escape sequence");
                }
            }
        }

        for ((ch, key), stack) in open_notes.into_iter() {
            for (start_tick, start_vel) in stack {
                let end_tick = if abs_tick > start_tick {
                    abs_tick
                } else {
                    start_tick + ticks_per_quarter
                };

                warn!(
                    "Unclosed NoteOn for {}, channel: {} at tick: {} auto-closing at: {}..!",
                    key, ch, start_tick, end_tick
                );

                intervals.push(NoteInterval {
                    midi: key,
                    start_tick,
                    end_tick,
                    velocity: start_vel,
                });
            }
        }

        let events = intervals_to_events(intervals, ticks_per_quarter);
        debug!("Track {} holds {} note(s)", track_idx, events.len());

        tracks.push(Track { name, events });
    }

    let defaults = Metadata::default();
    let metadata = Metadata {
        tempo_bpm: tempo_bpm.into_value().unwrap_or(defaults.tempo_bpm),
        time_signature: time_signature
            .into_value()
            .unwrap_or(defaults.time_signature),
        key: key_signature.into_value(),
    };

    let inputs = vec![tracks.len()];
    Ok(Score {
        metadata,
        tracks,
        inputs,
    })
}

fn intervals_to_events(intervals: Vec<NoteInterval>, ticks_per_quarter: u64) -> Vec<Event> {
    let quarter = ticks_per_quarter as f64;

    let mut notes: Vec<Note> = Vec::with_capacity(intervals.len());
    for interval in intervals.into_iter() {
        if interval.end_tick <= interval.start_tick {
            debug!(
                "Skipping zero-length midi note {} at tick {}..!",
                interval.midi, interval.start_tick
            );
            continue;
        }

        let Some(pitch) = Pitch::new(interval.midi) else {
            warn!("Dropping out-of-range MIDI {}..!", interval.midi);
            continue;
        };

        notes.push(Note {
            pitch,
            offset: interval.start_tick as f64 / quarter,
            duration: (interval.end_tick - interval.start_tick) as f64 / quarter,
            velocity: interval.velocity,
        });
    }

    notes.sort_by(|a, b| a.offset.total_cmp(&b.offset).then(a.pitch.cmp(&b.pitch)));
    notes.into_iter().map(Event::Note).collect()
}

fn skip_unsupported(track: usize, tick: u64, element: &'static str) {
    let skipped = DigestError::UnsupportedElement {
        track,
        tick,
        element,
    };
    warn!("{}, skipping..!", skipped);
}

fn close_note(
    open_notes: &mut HashMap<(u8, u8), Vec<(u64, u8)>>,
    intervals: &mut Vec<NoteInterval>,
    ch: u8,
    midi_num: u8,
    abs_tick: u64,
) {
    if let Some((start_tick, start_vel)) = open_notes
        .get_mut(&(ch, midi_num))
        .and_then(|stack| stack.pop())
    {
        intervals.push(NoteInterval {
            midi: midi_num,
            start_tick,
            end_tick: abs_tick,
            velocity: start_vel,
        });
    } else {
        debug!(
            "Orphaned NoteOff for {} ch{} at tick {}..!",
            midi_num, ch, abs_tick
        );
    }
}
