//! Domain primitives for metadata requests.
//!
//! A [`MediaQuery`] is the provider-independent description of what the
//! frontend asked for. Each variant carries exactly the parameters its kind
//! needs, so adapters never see a search without a term or a detail without
//! an id.

use chrono::{Datelike, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rejections raised while turning raw query parameters into a [`MediaQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Invalid type parameter")]
    InvalidKind,

    #[error("Search query required")]
    MissingSearch,

    #[error("Anime ID required")]
    MissingId,

    #[error("Invalid anime ID: {0}")]
    InvalidId(String),

    #[error("Invalid season: {0}")]
    InvalidSeason(String),

    #[error("Invalid year: {0}")]
    InvalidYear(String),

    #[error("Invalid source parameter: {0}")]
    InvalidSource(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Trending,
    Seasonal,
    Popular,
    Search,
    Detail,
}

impl FromStr for MediaKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trending" => Ok(Self::Trending),
            "seasonal" => Ok(Self::Seasonal),
            "popular" => Ok(Self::Popular),
            "search" => Ok(Self::Search),
            "detail" => Ok(Self::Detail),
            _ => Err(QueryError::InvalidKind),
        }
    }
}

impl MediaKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trending => "trending",
            Self::Seasonal => "seasonal",
            Self::Popular => "popular",
            Self::Search => "search",
            Self::Detail => "detail",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Season of a calendar month (1-12): Mar-May spring, Jun-Aug summer,
    /// Sep-Nov fall, the rest winter.
    #[must_use]
    pub const fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Fall,
            _ => Self::Winter,
        }
    }

    #[must_use]
    pub fn current() -> Self {
        Self::from_month(Utc::now().month())
    }

    /// `AniList`'s `MediaSeason` enum value.
    #[must_use]
    pub const fn as_anilist(&self) -> &'static str {
        match self {
            Self::Winter => "WINTER",
            Self::Spring => "SPRING",
            Self::Summer => "SUMMER",
            Self::Fall => "FALL",
        }
    }

    /// Kitsu's `season` filter value.
    #[must_use]
    pub const fn as_kitsu(&self) -> &'static str {
        match self {
            Self::Winter => "winter",
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Fall => "fall",
        }
    }
}

impl FromStr for Season {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "winter" => Ok(Self::Winter),
            "spring" => Ok(Self::Spring),
            "summer" => Ok(Self::Summer),
            "fall" | "autumn" => Ok(Self::Fall),
            _ => Err(QueryError::InvalidSeason(s.to_string())),
        }
    }
}

/// Provider-independent metadata request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaQuery {
    Trending,
    Seasonal { season: Season, year: i32 },
    Popular,
    Search { search: String },
    Detail { id: i64 },
}

/// Raw, optional query parameters as they arrive from a route or the CLI.
#[derive(Debug, Clone, Default)]
pub struct MediaParams<'a> {
    pub kind: Option<&'a str>,
    pub search: Option<&'a str>,
    pub id: Option<&'a str>,
    pub season: Option<&'a str>,
    pub year: Option<&'a str>,
}

impl MediaQuery {
    /// Validates raw parameters. Empty strings count as missing.
    pub fn from_params(params: &MediaParams<'_>) -> Result<Self, QueryError> {
        fn present(value: Option<&str>) -> Option<&str> {
            value.map(str::trim).filter(|v| !v.is_empty())
        }

        let kind: MediaKind = present(params.kind)
            .ok_or(QueryError::InvalidKind)?
            .parse()?;

        match kind {
            MediaKind::Trending => Ok(Self::Trending),
            MediaKind::Popular => Ok(Self::Popular),
            MediaKind::Seasonal => {
                let season = match present(params.season) {
                    Some(raw) => raw.parse()?,
                    None => Season::current(),
                };
                let year = match present(params.year) {
                    Some(raw) => raw
                        .parse::<i32>()
                        .map_err(|_| QueryError::InvalidYear(raw.to_string()))?,
                    None => Utc::now().year(),
                };
                Ok(Self::Seasonal { season, year })
            }
            MediaKind::Search => {
                let search = present(params.search).ok_or(QueryError::MissingSearch)?;
                Ok(Self::Search {
                    search: search.to_string(),
                })
            }
            MediaKind::Detail => {
                let raw = present(params.id).ok_or(QueryError::MissingId)?;
                let id = raw
                    .parse::<i64>()
                    .ok()
                    .filter(|id| *id > 0)
                    .ok_or_else(|| QueryError::InvalidId(raw.to_string()))?;
                Ok(Self::Detail { id })
            }
        }
    }

    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        match self {
            Self::Trending => MediaKind::Trending,
            Self::Seasonal { .. } => MediaKind::Seasonal,
            Self::Popular => MediaKind::Popular,
            Self::Search { .. } => MediaKind::Search,
            Self::Detail { .. } => MediaKind::Detail,
        }
    }
}

impl fmt::Display for MediaQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seasonal { season, year } => {
                write!(f, "seasonal({}, {year})", season.as_kitsu())
            }
            Self::Search { search } => write!(f, "search({search})"),
            Self::Detail { id } => write!(f, "detail({id})"),
            other => f.write_str(other.kind().as_str()),
        }
    }
}

/// Explicit provider preference on the aggregation route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Anilist,
    Kitsu,
}

impl FromStr for Source {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anilist" => Ok(Self::Anilist),
            "kitsu" => Ok(Self::Kitsu),
            _ => Err(QueryError::InvalidSource(s.to_string())),
        }
    }
}
