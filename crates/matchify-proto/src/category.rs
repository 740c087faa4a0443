//! Matching categories.
//!
//! Each category is served by its own socket endpoint. Only one category is
//! active per session.

use std::{fmt, str::FromStr};

use crate::ProtocolError;

/// What two strangers are matched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    /// Favorite musicians and artists.
    #[default]
    Artists,
    /// Iconic albums.
    Albums,
    /// Films and cinema.
    Movies,
}

impl Category {
    /// All categories in menu order.
    pub const ALL: [Self; 3] = [Self::Artists, Self::Albums, Self::Movies];

    /// Path segment of the category endpoint.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Artists => "artist",
            Self::Albums => "album",
            Self::Movies => "movie",
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Artists => "Artists",
            Self::Albums => "Albums",
            Self::Movies => "Movies",
        }
    }

    /// One-line pitch shown in the lobby.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Artists => "Connect over your favorite musicians and artists",
            Self::Albums => "Share your love for iconic albums",
            Self::Movies => "Bond over films and cinema",
        }
    }

    /// Socket endpoint for this category under `base_url`.
    pub fn endpoint(self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.path())
    }

    /// Next category in menu order, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Artists => Self::Albums,
            Self::Albums => Self::Movies,
            Self::Movies => Self::Artists,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "artist" | "artists" => Ok(Self::Artists),
            "album" | "albums" => Ok(Self::Albums),
            "movie" | "movies" => Ok(Self::Movies),
            _ => Err(ProtocolError::UnknownCategory(s.to_string())),
        }
    }
}
