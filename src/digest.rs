use crate::analysis::{Analysis, analyze};
use crate::extract::extract_events;
use crate::model::score::{Metadata, Score};
use crate::record::{EventRecord, to_serializable};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrackSummary {
    pub name: Option<String>,
    /// Notes read from the track, before chord grouping.
    pub notes: usize,
}

/// Everything a downstream writer or prompt builder needs, in one serializable record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Digest {
    pub metadata: Metadata,
    pub key_signature: Option<String>,
    pub tracks: Vec<TrackSummary>,
    pub events: Vec<EventRecord>,
    pub analysis: Analysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intention: Option<String>,
}

impl Digest {
    /// The intention is carried verbatim; blank text counts as absent.
    pub fn build(score: &Score, intention: Option<&str>) -> Self {
        let events = extract_events(score);

        let tracks = score
            .tracks
            .iter()
            .map(|track| TrackSummary {
                name: track.name.clone(),
                notes: track.events.len(),
            })
            .collect();

        Self {
            metadata: score.metadata.clone(),
            key_signature: score.metadata.key.map(|key| key.name()),
            tracks,
            analysis: analyze(score),
            events: to_serializable(&events),
            intention: intention
                .filter(|text| !text.trim().is_empty())
                .map(str::to_string),
        }
    }
}
