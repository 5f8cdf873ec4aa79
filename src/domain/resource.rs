// Snapshot resource kinds
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Identifies one snapshot document in the object store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Profile,
    TopTracks,
    TopArtists,
    RecentlyPlayed,
}

/// Where a resource lives regardless of the requested period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceScope {
    /// Lives under `profile/`, identical for every period.
    Profile,
    /// Has a live rolling-window file and one archive file per month.
    Periodic,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Profile,
        ResourceKind::TopTracks,
        ResourceKind::TopArtists,
        ResourceKind::RecentlyPlayed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Profile => "profile",
            ResourceKind::TopTracks => "top-tracks",
            ResourceKind::TopArtists => "top-artists",
            ResourceKind::RecentlyPlayed => "recently-played",
        }
    }

    pub fn scope(&self) -> ResourceScope {
        match self {
            ResourceKind::Profile | ResourceKind::RecentlyPlayed => ResourceScope::Profile,
            ResourceKind::TopTracks | ResourceKind::TopArtists => ResourceScope::Periodic,
        }
    }

    /// File stem of the rolling live snapshot (or the profile document).
    pub fn live_file(&self) -> &'static str {
        match self {
            ResourceKind::Profile => "profile",
            ResourceKind::TopTracks => "30_day_tracks",
            ResourceKind::TopArtists => "30_day_artists",
            ResourceKind::RecentlyPlayed => "recently_played",
        }
    }

    /// File stem suffix of a monthly archive snapshot.
    pub fn archive_file(&self) -> &'static str {
        match self {
            ResourceKind::Profile => "profile",
            ResourceKind::TopTracks => "tracks",
            ResourceKind::TopArtists => "artists",
            ResourceKind::RecentlyPlayed => "recently_played",
        }
    }

    /// Whether the kind is rendered as a ranked list on the dashboard.
    pub fn is_ranked(&self) -> bool {
        matches!(self, ResourceKind::TopTracks | ResourceKind::TopArtists)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown resource kind: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.as_str().parse::<ResourceKind>(), Ok(kind));
        }
        assert!("top-albums".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_scopes() {
        assert_eq!(ResourceKind::Profile.scope(), ResourceScope::Profile);
        assert_eq!(ResourceKind::RecentlyPlayed.scope(), ResourceScope::Profile);
        assert_eq!(ResourceKind::TopTracks.scope(), ResourceScope::Periodic);
        assert!(ResourceKind::TopArtists.is_ranked());
        assert!(!ResourceKind::Profile.is_ranked());
    }
}
