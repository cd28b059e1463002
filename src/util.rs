use crate::OutputFormat;
use crate::analysis::Analysis;
use crate::record::{EventKind, EventRecord};
use log::info;
use std::path::Path;

pub fn parse_format(s: &str) -> OutputFormat {
    match s.to_lowercase().as_str() {
        "j" | "json" => OutputFormat::Json,
        "t" | "txt" | "text" => OutputFormat::Text,
        other => {
            info!("Unknown format '{}', defaulting to `json`..!", other);
            OutputFormat::Json
        }
    }
}

/// Uploads are only accepted with a `.mid`/`.midi` extension; the contents are checked by the parser.
pub fn has_midi_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mid") || ext.eq_ignore_ascii_case("midi"))
}

pub fn describe_record(record: &EventRecord) -> String {
    let kind = match record.kind {
        EventKind::Note => "note",
        EventKind::Chord => "chord",
    };

    let mut line = format!(
        "{} [{}] offset={:.3} dur={:.3}",
        kind,
        record.pitches.join(" "),
        record.offset,
        record.duration
    );
    if let Some(velocity) = record.velocity {
        line.push_str(&format!(" vel={}", velocity));
    }
    line
}

pub fn describe_analysis(analysis: &Analysis) -> String {
    let key = analysis
        .key
        .as_ref()
        .map(|key| format!("{} (r = {:.3})", key.name(), key.correlation))
        .unwrap_or_else(|| "<nothing to analyze>".into());

    let chords = if analysis.chords.is_empty() {
        "<none>".to_string()
    } else {
        analysis.chords.join(", ")
    };

    format!("Estimated key: {}\nChord progression: {}", key, chords)
}
