use crate::types::{ResolvedArtist, SignalBundle, Track};
use std::collections::HashMap;

/// Working set of one user session.
///
/// Holds the artist under study, its tracks and the signals collected so far.
/// Passed explicitly to whatever needs it; nothing here is global. A new
/// successful resolution replaces the artist and drops everything derived
/// from the previous one.
#[derive(Debug, Clone, Default)]
pub struct Session {
    artist: Option<ResolvedArtist>,
    tracks: Vec<Track>,
    signals: HashMap<String, SignalBundle>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artist(&self) -> Option<&ResolvedArtist> {
        self.artist.as_ref()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Make `artist` the current subject, discarding tracks and signals.
    pub fn replace_artist(&mut self, artist: ResolvedArtist) {
        log::debug!("Session subject is now '{}'", artist.name);
        self.artist = Some(artist);
        self.tracks.clear();
        self.signals.clear();
    }

    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
    }

    /// Track at `index` in the current track list.
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Remember the signals collected for `track_id`, replacing older ones.
    pub fn record_signals(&mut self, track_id: &str, bundle: SignalBundle) {
        self.signals.insert(track_id.to_string(), bundle);
    }

    pub fn signals_for(&self, track_id: &str) -> Option<&SignalBundle> {
        self.signals.get(track_id)
    }

    /// End of session.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CandidateEntity, Signal, TagProfile};

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            name: format!("Track {id}"),
            album_name: "Album".to_string(),
            album_art_url: None,
            duration_ms: 180_000,
            popularity: 50,
            performer_ids: vec!["a1".to_string()],
            performer_names: vec!["Artist".to_string()],
            preview_url: None,
        }
    }

    #[test]
    fn test_replace_artist_drops_derived_state() {
        let mut session = Session::new();
        session.replace_artist(CandidateEntity::named("a1", "Angèle", 70).into());
        session.set_tracks(vec![track("t1"), track("t2")]);
        session.record_signals(
            "t1",
            SignalBundle {
                tags: Signal::Present(TagProfile::default()),
                ..SignalBundle::default()
            },
        );
        assert_eq!(session.track(1).map(|t| t.id.as_str()), Some("t2"));
        assert!(session.signals_for("t1").is_some());

        session.replace_artist(CandidateEntity::named("a2", "Stromae", 80).into());
        assert_eq!(session.artist().map(|a| a.name.as_str()), Some("Stromae"));
        assert!(session.tracks().is_empty());
        assert!(session.signals_for("t1").is_none());
    }

    #[test]
    fn test_clear() {
        let mut session = Session::new();
        session.replace_artist(CandidateEntity::named("a1", "Angèle", 70).into());
        session.clear();
        assert!(session.artist().is_none());
    }
}
