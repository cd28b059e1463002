use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{debug, info};
use midi_digest::{
    Args, Digest, OutputFormat, describe_analysis, describe_record, has_midi_extension,
    import_midi_files, parse_format,
};

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let format = parse_format(&args.format);

    if let Some(path) = args.midi.iter().find(|path| !has_midi_extension(path)) {
        bail!("'{}' is not a .mid/.midi file..!", path.display());
    }

    info!("Importing {} MIDI file(s)...", args.midi.len());
    let score = import_midi_files(&args.midi)
        .with_context(|| format!("Failed to build a score from {:?}", args.midi))?;

    let digest = Digest::build(&score, args.intention.as_deref());
    debug!(
        "Built digest with {} track(s) and {} event(s)..!",
        digest.tracks.len(),
        digest.events.len()
    );

    if args.dry_run {
        info!("Previewing at most {} events..!", args.dry_run_max);
        for (i, record) in digest.events.iter().take(args.dry_run_max).enumerate() {
            info!("Event {}: {}", i, describe_record(record));
        }
        return Ok(());
    }

    if args.verbose {
        for (i, record) in digest.events.iter().enumerate() {
            info!("Event {}: {}", i, describe_record(record));
        }
    }

    match format {
        OutputFormat::Json => {
            let json = if args.pretty {
                serde_json::to_string_pretty(&digest)?
            } else {
                serde_json::to_string(&digest)?
            };
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!(
                "Tempo: {:.1} bpm | Time signature: {}/{} | Key signature: {}",
                digest.metadata.tempo_bpm,
                digest.metadata.time_signature.numerator,
                digest.metadata.time_signature.denominator,
                digest.key_signature.as_deref().unwrap_or("<none>")
            );
            for (i, track) in digest.tracks.iter().enumerate() {
                println!(
                    "Track {}: {} ({} notes)",
                    i,
                    track.name.as_deref().unwrap_or("<unnamed>"),
                    track.notes
                );
            }
            for record in digest.events.iter() {
                println!("{}", describe_record(record));
            }
            println!("{}", describe_analysis(&digest.analysis));
            if let Some(intention) = &digest.intention {
                println!("Intention: {}", intention);
            }
        }
    }

    Ok(())
}
