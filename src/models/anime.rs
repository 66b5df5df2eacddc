use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a canonical record. `AniList` ids are numeric, normalized
/// Kitsu records keep Kitsu's string ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// Canonical (AniList-shaped) anime record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anime {
    pub id: MediaId,
    pub title: AnimeTitle,
    pub cover_image: Option<CoverImage>,
    pub banner_image: Option<String>,
    pub description: Option<String>,
    pub episodes: Option<i32>,
    pub status: Option<String>,
    pub genres: Option<Vec<String>>,
    pub average_score: Option<f64>,
    pub studios: Option<Studios>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<FuzzyDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<FuzzyDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kitsu_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeTitle {
    pub english: Option<String>,
    pub romaji: Option<String>,
    pub native: Option<String>,
}

impl AnimeTitle {
    /// First present of english, romaji, native.
    #[must_use]
    pub fn preferred(&self) -> Option<&str> {
        self.english
            .as_deref()
            .or(self.romaji.as_deref())
            .or(self.native.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverImage {
    pub large: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Studios {
    pub nodes: Vec<StudioNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioNode {
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzyDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl FuzzyDate {
    /// Parses an ISO `YYYY-MM-DD` date as Kitsu sends it.
    #[must_use]
    pub fn parse_iso(raw: &str) -> Option<Self> {
        let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()?;
        Some(Self {
            year: Some(date.year()),
            month: Some(date.month()),
            day: Some(date.day()),
        })
    }
}

impl Anime {
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.preferred().unwrap_or("Unknown")
    }
}

/// Kitsu JSON:API resource for an anime.
#[derive(Debug, Clone, Deserialize)]
pub struct KitsuAnime {
    pub id: String,
    pub attributes: KitsuAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KitsuAttributes {
    pub canonical_title: Option<String>,
    #[serde(default)]
    pub titles: KitsuTitles,
    pub synopsis: Option<String>,
    pub poster_image: Option<KitsuImage>,
    pub cover_image: Option<KitsuImage>,
    pub episode_count: Option<i32>,
    pub episode_length: Option<i32>,
    pub status: Option<String>,
    pub subtype: Option<String>,
    pub average_rating: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub age_rating: Option<String>,
    /// Only present after the detail genre enrichment.
    pub genres: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KitsuTitles {
    pub en: Option<String>,
    pub en_jp: Option<String>,
    pub ja_jp: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KitsuImage {
    pub large: Option<String>,
}

impl From<KitsuAnime> for Anime {
    fn from(kitsu: KitsuAnime) -> Self {
        let attrs = kitsu.attributes;
        let canonical = attrs.canonical_title;
        let or_canonical = |title: Option<String>| title.or_else(|| canonical.clone());

        let average_score = attrs
            .average_rating
            .as_deref()
            .and_then(|rating| rating.trim().parse::<f64>().ok())
            .map(|rating| rating * 10.0);

        Self {
            id: MediaId::Text(kitsu.id.clone()),
            title: AnimeTitle {
                english: or_canonical(attrs.titles.en),
                romaji: or_canonical(attrs.titles.en_jp),
                native: or_canonical(attrs.titles.ja_jp),
            },
            cover_image: Some(CoverImage {
                large: attrs.poster_image.and_then(|image| image.large),
            }),
            banner_image: attrs.cover_image.and_then(|image| image.large),
            description: attrs.synopsis,
            episodes: attrs.episode_count,
            status: attrs.status,
            genres: attrs.genres,
            average_score,
            studios: None,
            season: None,
            season_year: None,
            start_date: attrs.start_date.as_deref().and_then(FuzzyDate::parse_iso),
            end_date: attrs.end_date.as_deref().and_then(FuzzyDate::parse_iso),
            duration: attrs.episode_length,
            source: None,
            kitsu_id: Some(kitsu.id),
        }
    }
}
