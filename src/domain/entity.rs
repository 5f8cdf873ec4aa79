// Snapshot entity domain models
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: String,
    pub display_name: String,
    pub image_url: Option<String>,
    pub follower_count: u64,
    pub country: Option<String>,
    pub external_link: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityDetail {
    Track { artists: Vec<String>, album: String },
    Artist { genres: Vec<String>, follower_count: u64 },
}

/// One entry of a ranked list. `rank` is the 1-based position in the source document.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntity {
    pub id: String,
    pub display_name: String,
    pub rank: u32,
    pub popularity: u8,
    pub image_url: Option<String>,
    pub external_link: String,
    pub detail: EntityDetail,
}

impl RankedEntity {
    /// Short secondary line: artist names for tracks, the first two genres for artists.
    pub fn subtitle(&self) -> String {
        match &self.detail {
            EntityDetail::Track { artists, .. } => artists.join(", "),
            EntityDetail::Artist { genres, .. } if genres.is_empty() => "-".to_string(),
            EntityDetail::Artist { genres, .. } => {
                genres.iter().take(2).cloned().collect::<Vec<_>>().join(", ")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecentPlay {
    pub track_id: String,
    pub track_name: String,
    pub artists: Vec<String>,
    pub album: String,
    pub image_url: Option<String>,
    pub external_link: Option<String>,
    pub played_at: Option<DateTime<Utc>>,
}
