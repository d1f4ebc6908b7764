use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use lazy_static::lazy_static;
use rand::Rng;

use crate::capture::{error::CaptureError, image::StillImage};

pub const FALLBACK_TRACK: &str = "Música personalizada para ti";

/// The only labels the simulated classifier can produce, with their fixed
/// icon and confidence percentage.
pub const CATALOG: [(&str, &str, u8); 4] = [
    ("Felicidad", "😊", 85),
    ("Calma", "😌", 78),
    ("Energía", "🎵", 92),
    ("Concentración", "🧘", 67),
];

lazy_static! {
    static ref PLAYLISTS: HashMap<&'static str, [&'static str; 3]> = HashMap::from([
        (
            "Felicidad",
            [
                "Happy - Pharrell Williams",
                "Good as Hell - Lizzo",
                "Uptown Funk - Bruno Mars",
            ],
        ),
        (
            "Calma",
            [
                "Weightless - Marconi Union",
                "River - Joni Mitchell",
                "Mad World - Gary Jules",
            ],
        ),
        (
            "Energía",
            [
                "Eye of the Tiger - Survivor",
                "Thunder - Imagine Dragons",
                "High Hopes - Panic!",
            ],
        ),
        (
            "Concentración",
            [
                "Clair de Lune - Debussy",
                "Gymnopédie No.1 - Satie",
                "The Blue Notebooks - Max Richter",
            ],
        ),
    ]);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emotion {
    pub label: String,
    pub icon: String,
    pub confidence: u8,
}

impl Emotion {
    pub fn new(label: impl Into<String>, icon: impl Into<String>, confidence: u8) -> Self {
        Self {
            label: label.into(),
            icon: icon.into(),
            confidence,
        }
    }

    pub fn from_catalog(index: usize) -> Option<Self> {
        CATALOG
            .get(index)
            .map(|(label, icon, confidence)| Self::new(*label, *icon, *confidence))
    }

    pub fn confidence_label(&self) -> String {
        format!("{}%", self.confidence)
    }
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, image: &StillImage) -> Result<Emotion, CaptureError>;
}

pub trait PlaylistSource: Send + Sync {
    fn tracks_for(&self, label: &str) -> Vec<String>;
}

/// Stand-in for an emotion model: waits a fixed latency, then picks a
/// catalog entry uniformly at random. The image is not inspected.
pub struct SimulatedClassifier {
    latency: Duration,
}

impl SimulatedClassifier {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl Classifier for SimulatedClassifier {
    async fn classify(&self, image: &StillImage) -> Result<Emotion, CaptureError> {
        tracing::debug!(bytes = image.len(), mime = image.mime(), "simulating analysis");
        tokio::time::sleep(self.latency).await;

        let index = rand::rng().random_range(0..CATALOG.len());
        Emotion::from_catalog(index)
            .ok_or_else(|| CaptureError::Analysis(format!("no catalog entry {index}")))
    }
}

/// Fixed three-track table keyed by exact label.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticPlaylists;

impl PlaylistSource for StaticPlaylists {
    fn tracks_for(&self, label: &str) -> Vec<String> {
        match PLAYLISTS.get(label) {
            Some(tracks) => tracks.iter().map(|t| t.to_string()).collect(),
            None => vec![FALLBACK_TRACK.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::image::{ImageSource, PNG_BYTES};

    #[test]
    fn every_catalog_label_has_three_tracks() {
        for (label, _, _) in CATALOG {
            let tracks = StaticPlaylists.tracks_for(label);
            assert_eq!(tracks.len(), 3, "{label}");
            assert!(!tracks.contains(&FALLBACK_TRACK.to_string()));
        }
    }

    #[test]
    fn unknown_label_falls_back_to_placeholder() {
        assert_eq!(
            StaticPlaylists.tracks_for("Nostalgia"),
            vec![FALLBACK_TRACK.to_string()]
        );
        assert_eq!(
            StaticPlaylists.tracks_for("felicidad"),
            vec![FALLBACK_TRACK.to_string()]
        );
    }

    #[test]
    fn catalog_values_are_fixed() {
        let calma = Emotion::from_catalog(1).unwrap();
        assert_eq!(calma, Emotion::new("Calma", "😌", 78));
        assert_eq!(calma.confidence_label(), "78%");
        assert_eq!(Emotion::from_catalog(4), None);
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_classifier_waits_then_picks_from_the_catalog() {
        let classifier = SimulatedClassifier::new(Duration::from_millis(2000));
        let image = StillImage::from_bytes(PNG_BYTES.to_vec(), ImageSource::Camera).unwrap();

        for _ in 0..20 {
            let started = tokio::time::Instant::now();
            let emotion = classifier.classify(&image).await.unwrap();
            assert_eq!(started.elapsed(), Duration::from_millis(2000));

            let entry = CATALOG
                .iter()
                .find(|(label, _, _)| *label == emotion.label)
                .expect("label comes from the catalog");
            assert_eq!(emotion.icon, entry.1);
            assert_eq!(emotion.confidence, entry.2);
        }
    }
}
