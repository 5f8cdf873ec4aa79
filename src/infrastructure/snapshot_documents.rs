// Wire format of the snapshot documents and their mapping to domain entities
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::domain::entity::{EntityDetail, Profile, RankedEntity, RecentPlay};
use crate::domain::resource::ResourceKind;

/// Most entries a recently-played feed yields.
pub const RECENT_PLAYS_LIMIT: usize = 20;

/// Container keys in lookup order; the first one present wins, even when empty.
const RECENT_CONTAINER_KEYS: [&str; 4] = ["items", "tracks", "recent", "history"];

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed document: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("invalid document: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
struct ItemsDocument<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ImageRef {
    url: String,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Followers {
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct AlbumRef {
    name: String,
    #[serde(default)]
    images: Vec<ImageRef>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    id: String,
    name: String,
    artists: Vec<NamedRef>,
    album: AlbumRef,
    external_urls: BTreeMap<String, String>,
    popularity: u8,
}

#[derive(Debug, Deserialize)]
struct ArtistItem {
    id: String,
    name: String,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    followers: Option<Followers>,
    #[serde(default)]
    images: Vec<ImageRef>,
    external_urls: BTreeMap<String, String>,
    popularity: u8,
}

#[derive(Debug, Deserialize)]
struct ProfileDocument {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    images: Vec<ImageRef>,
    #[serde(default)]
    followers: Option<Followers>,
    #[serde(default)]
    country: Option<String>,
    external_urls: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RecentItem {
    track: Option<RecentTrack>,
    #[serde(default)]
    played_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecentTrack {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    artists: Vec<NamedRef>,
    #[serde(default)]
    album: Option<AlbumRef>,
    #[serde(default)]
    external_urls: BTreeMap<String, String>,
}

pub fn decode_profile(value: serde_json::Value) -> Result<Profile, DocumentError> {
    let doc: ProfileDocument = serde_json::from_value(value)?;
    let external_link = primary_link(&doc.external_urls)?;

    Ok(Profile {
        display_name: doc.display_name.unwrap_or_else(|| doc.id.clone()),
        id: doc.id,
        image_url: first_image(&doc.images),
        follower_count: doc.followers.map(|f| f.total).unwrap_or(0),
        country: doc.country,
        external_link,
    })
}

/// Decode a ranked list, keeping the document's order as the rank order.
pub fn decode_ranked(
    kind: ResourceKind,
    value: serde_json::Value,
) -> Result<Vec<RankedEntity>, DocumentError> {
    match kind {
        ResourceKind::TopTracks => decode_items::<TrackItem>(value)?
            .into_iter()
            .enumerate()
            .map(|(idx, item)| track_entity(rank_of(idx), item))
            .collect(),
        ResourceKind::TopArtists => decode_items::<ArtistItem>(value)?
            .into_iter()
            .enumerate()
            .map(|(idx, item)| artist_entity(rank_of(idx), item))
            .collect(),
        other => Err(DocumentError::Invalid(format!("{} is not a ranked list", other))),
    }
}

/// Decode a recently-played feed, dropping incomplete entries rather than failing.
pub fn decode_recent_plays(value: serde_json::Value) -> Vec<RecentPlay> {
    let serde_json::Value::Object(mut doc) = value else {
        return Vec::new();
    };

    let items = match RECENT_CONTAINER_KEYS
        .iter()
        .find_map(|key| doc.remove(*key).filter(|v| !v.is_null()))
    {
        Some(serde_json::Value::Array(items)) => items,
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|raw| serde_json::from_value::<RecentItem>(raw).ok())
        .filter_map(recent_play)
        .take(RECENT_PLAYS_LIMIT)
        .collect()
}

fn decode_items<T: DeserializeOwned>(value: serde_json::Value) -> Result<Vec<T>, DocumentError> {
    let doc: ItemsDocument<T> = serde_json::from_value(value)?;
    Ok(doc.items)
}

fn rank_of(idx: usize) -> u32 {
    u32::try_from(idx + 1).unwrap_or(u32::MAX)
}

fn track_entity(rank: u32, item: TrackItem) -> Result<RankedEntity, DocumentError> {
    Ok(RankedEntity {
        external_link: primary_link(&item.external_urls)?,
        popularity: popularity(&item.id, item.popularity)?,
        image_url: first_image(&item.album.images),
        id: item.id,
        display_name: item.name,
        rank,
        detail: EntityDetail::Track {
            artists: item.artists.into_iter().map(|a| a.name).collect(),
            album: item.album.name,
        },
    })
}

fn artist_entity(rank: u32, item: ArtistItem) -> Result<RankedEntity, DocumentError> {
    Ok(RankedEntity {
        external_link: primary_link(&item.external_urls)?,
        popularity: popularity(&item.id, item.popularity)?,
        image_url: first_image(&item.images),
        id: item.id,
        display_name: item.name,
        rank,
        detail: EntityDetail::Artist {
            genres: item.genres,
            follower_count: item.followers.map(|f| f.total).unwrap_or(0),
        },
    })
}

fn recent_play(item: RecentItem) -> Option<RecentPlay> {
    let track = item.track?;
    let album = track.album?;
    let id = track.id.filter(|id| !id.is_empty())?;
    let name = track.name.filter(|name| !name.is_empty())?;
    if track.artists.is_empty() || album.name.is_empty() {
        return None;
    }

    Some(RecentPlay {
        track_id: id,
        track_name: name,
        artists: track.artists.into_iter().map(|a| a.name).collect(),
        image_url: first_image(&album.images),
        album: album.name,
        external_link: primary_link(&track.external_urls).ok(),
        played_at: item
            .played_at
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc)),
    })
}

fn popularity(id: &str, value: u8) -> Result<u8, DocumentError> {
    if value > 100 {
        return Err(DocumentError::Invalid(format!(
            "popularity {} of {} is outside 0-100",
            value, id
        )));
    }
    Ok(value)
}

/// Prefers the `spotify` link, otherwise the first link in key order.
fn primary_link(links: &BTreeMap<String, String>) -> Result<String, DocumentError> {
    links
        .get("spotify")
        .or_else(|| links.values().next())
        .cloned()
        .ok_or_else(|| DocumentError::Invalid("missing external link".to_string()))
}

fn first_image(images: &[ImageRef]) -> Option<String> {
    images.first().map(|image| image.url.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn track(id: &str, popularity: u64) -> serde_json::Value {
        json!({
            "id": id,
            "name": format!("Track {}", id),
            "artists": [{"id": "a1", "name": "Artist One"}, {"id": "a2", "name": "Artist Two"}],
            "album": {"name": "Album", "images": [{"url": "https://img/1"}, {"url": "https://img/2"}]},
            "external_urls": {"spotify": format!("https://open.spotify.com/track/{}", id)},
            "popularity": popularity
        })
    }

    #[test]
    fn test_decode_tracks_keeps_document_order() {
        let doc = json!({"items": [track("z", 10), track("a", 90), track("m", 50)]});
        let entities = decode_ranked(ResourceKind::TopTracks, doc).unwrap();

        let ids: Vec<_> = entities.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
        let ranks: Vec<_> = entities.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);

        assert_eq!(entities[0].image_url.as_deref(), Some("https://img/1"));
        assert_eq!(entities[0].subtitle(), "Artist One, Artist Two");
        assert_eq!(entities[1].popularity, 90);
    }

    #[test]
    fn test_decode_artists() {
        let doc = json!({"items": [{
            "id": "ar1",
            "name": "Band",
            "genres": ["shoegaze"],
            "followers": {"total": 1200},
            "images": [],
            "external_urls": {"spotify": "https://open.spotify.com/artist/ar1"},
            "popularity": 42
        }]});

        let entities = decode_ranked(ResourceKind::TopArtists, doc).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].image_url, None);
        assert_eq!(
            entities[0].detail,
            EntityDetail::Artist {
                genres: vec!["shoegaze".to_string()],
                follower_count: 1200
            }
        );
    }

    #[test]
    fn test_missing_required_field_is_malformed() {
        let mut item = track("x", 10);
        item.as_object_mut().unwrap().remove("album");
        let result = decode_ranked(ResourceKind::TopTracks, json!({"items": [item]}));
        assert!(matches!(result, Err(DocumentError::Shape(_))));

        let result = decode_ranked(ResourceKind::TopTracks, json!({"tracks": []}));
        assert!(matches!(result, Err(DocumentError::Shape(_))));
    }

    #[test]
    fn test_popularity_out_of_range_is_invalid() {
        let result = decode_ranked(ResourceKind::TopTracks, json!({"items": [track("x", 101)]}));
        assert!(matches!(result, Err(DocumentError::Invalid(_))));
    }

    #[test]
    fn test_profile_is_not_a_ranked_list() {
        let result = decode_ranked(ResourceKind::Profile, json!({"items": []}));
        assert!(matches!(result, Err(DocumentError::Invalid(_))));
    }

    #[test]
    fn test_decode_profile() {
        let doc = json!({
            "id": "user1",
            "display_name": "Listener",
            "images": [{"url": "https://img/me"}],
            "followers": {"total": 17},
            "country": "US",
            "external_urls": {"spotify": "https://open.spotify.com/user/user1"}
        });

        let profile = decode_profile(doc).unwrap();
        assert_eq!(profile.display_name, "Listener");
        assert_eq!(profile.follower_count, 17);
        assert_eq!(profile.image_url.as_deref(), Some("https://img/me"));
        assert_eq!(profile.external_link, "https://open.spotify.com/user/user1");
    }

    #[test]
    fn test_decode_profile_requires_link() {
        let doc = json!({"id": "user1", "external_urls": {}});
        assert!(matches!(decode_profile(doc), Err(DocumentError::Invalid(_))));
    }

    fn recent(id: &str, played_at: &str) -> serde_json::Value {
        json!({
            "track": {
                "id": id,
                "name": format!("Song {}", id),
                "artists": [{"id": "a", "name": "Someone"}],
                "album": {"name": "LP", "images": []},
                "external_urls": {"spotify": format!("https://open.spotify.com/track/{}", id)}
            },
            "played_at": played_at
        })
    }

    #[test]
    fn test_recent_plays_drop_incomplete_entries() {
        let doc = json!({"items": [
            recent("1", "2024-06-01T12:00:00Z"),
            {"track": {"id": "2", "name": "No artists", "artists": [], "album": {"name": "LP"}}},
            {"played_at": "2024-06-01T11:00:00Z"},
            "garbage",
            recent("3", "not a date"),
        ]});

        let plays = decode_recent_plays(doc);
        assert_eq!(plays.len(), 2);
        assert_eq!(plays[0].track_id, "1");
        assert!(plays[0].played_at.is_some());
        assert_eq!(plays[1].track_id, "3");
        assert_eq!(plays[1].played_at, None);
    }

    #[test]
    fn test_recent_plays_fallback_key_and_limit() {
        let items: Vec<_> = (0..30)
            .map(|i| recent(&i.to_string(), "2024-06-01T12:00:00Z"))
            .collect();
        let plays = decode_recent_plays(json!({"history": items}));

        assert_eq!(plays.len(), RECENT_PLAYS_LIMIT);
        assert_eq!(plays[0].track_id, "0");
        assert_eq!(plays[19].track_id, "19");
    }

    #[test]
    fn test_recent_plays_first_present_key_wins_even_if_empty() {
        let plays = decode_recent_plays(json!({
            "tracks": [],
            "history": [recent("h1", "2024-06-01T12:00:00Z")]
        }));
        assert!(plays.is_empty());

        let plays = decode_recent_plays(json!({
            "tracks": null,
            "recent": [recent("r1", "2024-06-01T12:00:00Z")]
        }));
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].track_id, "r1");
    }

    #[test]
    fn test_recent_plays_of_non_object() {
        assert!(decode_recent_plays(json!([1, 2, 3])).is_empty());
    }
}
