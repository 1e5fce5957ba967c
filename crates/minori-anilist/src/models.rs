//! Domain entities decoded from catalog responses.
//!
//! Everything here is a plain value object: once a call returns, the
//! caller owns the data outright and nothing references the client.

use chrono::Datelike;
use serde::Deserialize;

/// What kind of catalog entry a media record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Anime,
    Manga,
    /// The service omitted the type field.
    Unknown,
}

impl MediaKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Anime => "Anime",
            Self::Manga => "Manga",
            Self::Unknown => "Unknown",
        }
    }
}

/// Airing/publishing status of a media record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaStatus {
    Finished,
    Releasing,
    NotYetReleased,
    Cancelled,
    Hiatus,
}

impl MediaStatus {
    pub const ALL: &[MediaStatus] = &[
        Self::Finished,
        Self::Releasing,
        Self::NotYetReleased,
        Self::Cancelled,
        Self::Hiatus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Finished => "Finished",
            Self::Releasing => "Releasing",
            Self::NotYetReleased => "NotYetReleased",
            Self::Cancelled => "Cancelled",
            Self::Hiatus => "Hiatus",
        }
    }
}

/// How a related media record connects to the one it was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaRelation {
    Adaptation,
    Prequel,
    Sequel,
    Parent,
    SideStory,
    Character,
    Summary,
    Alternative,
    SpinOff,
    Other,
    Source,
    Compilation,
    Contains,
}

impl MediaRelation {
    pub const ALL: &[MediaRelation] = &[
        Self::Adaptation,
        Self::Prequel,
        Self::Sequel,
        Self::Parent,
        Self::SideStory,
        Self::Character,
        Self::Summary,
        Self::Alternative,
        Self::SpinOff,
        Self::Other,
        Self::Source,
        Self::Compilation,
        Self::Contains,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Adaptation => "Adaptation",
            Self::Prequel => "Prequel",
            Self::Sequel => "Sequel",
            Self::Parent => "Parent",
            Self::SideStory => "SideStory",
            Self::Character => "Character",
            Self::Summary => "Summary",
            Self::Alternative => "Alternative",
            Self::SpinOff => "SpinOff",
            Self::Other => "Other",
            Self::Source => "Source",
            Self::Compilation => "Compilation",
            Self::Contains => "Contains",
        }
    }
}

/// Billing of a character within one media record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterRole {
    Main,
    Supporting,
    Background,
}

impl CharacterRole {
    pub const ALL: &[CharacterRole] = &[Self::Main, Self::Supporting, Self::Background];

    pub fn name(self) -> &'static str {
        match self {
            Self::Main => "Main",
            Self::Supporting => "Supporting",
            Self::Background => "Background",
        }
    }
}

/// Anime season (quarter of the year).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub const ALL: &[Season] = &[Self::Winter, Self::Spring, Self::Summer, Self::Fall];

    /// The GraphQL `MediaSeason` value for this season.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Winter => "WINTER",
            Self::Spring => "SPRING",
            Self::Summer => "SUMMER",
            Self::Fall => "FALL",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Winter => "Winter",
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
        }
    }

    /// Determine the current anime season from the current month.
    pub fn current() -> Self {
        let month = chrono::Utc::now().month();
        match month {
            1..=3 => Self::Winter,
            4..=6 => Self::Spring,
            7..=9 => Self::Summer,
            _ => Self::Fall,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A calendar date where year, month, and day may each be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct FuzzyDate {
    pub year: Option<u32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl FuzzyDate {
    /// Render as `YYYY-MM-DD`, filling unknown month/day with 01.
    /// Returns `None` when even the year is unknown.
    pub fn to_string_opt(&self) -> Option<String> {
        let y = self.year?;
        let m = self.month.unwrap_or(1);
        let d = self.day.unwrap_or(1);
        Some(format!("{y:04}-{m:02}-{d:02}"))
    }
}

/// The romaji/english/native title variants of a media record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MediaTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

impl MediaTitle {
    /// First available variant, preferring romaji.
    pub fn preferred(&self) -> Option<&str> {
        self.romaji
            .as_deref()
            .or(self.english.as_deref())
            .or(self.native.as_deref())
    }
}

/// An RGB color parsed from the service's hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Parse a `#rrggbb` string. Anything else is `None`.
    pub fn from_hex(hex: &str) -> Option<Color> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
        let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
        let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
        Some(Color { r, g, b })
    }
}

/// Cover art for a media record.
///
/// `color` is the raw hex string as reported by the service; `rgb` is
/// its parsed form, absent whenever the string is missing or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverImage {
    pub extra_large: Option<String>,
    pub large: Option<String>,
    pub medium: Option<String>,
    pub color: Option<String>,
    pub rgb: Option<Color>,
}

/// A media record with one level of relation and character edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    pub id: u64,
    pub kind: MediaKind,
    pub title: MediaTitle,
    pub description: Option<String>,
    pub site_url: Option<String>,
    pub start_date: Option<FuzzyDate>,
    pub end_date: Option<FuzzyDate>,
    pub is_adult: Option<bool>,
    pub episodes: Option<u32>,
    pub status: Option<MediaStatus>,
    pub genres: Vec<String>,
    pub average_score: Option<u32>,
    pub season: Option<Season>,
    pub season_year: Option<u32>,
    pub cover_image: Option<CoverImage>,
    pub relations: Vec<MediaEdge>,
    pub characters: Vec<CharacterEdge>,
}

/// Shallow reference to a related media record: just enough to show a
/// relation entry without fetching the full record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub id: u64,
    pub kind: MediaKind,
    pub title: MediaTitle,
}

/// Relation edge inside a full media record; points at a shallow node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEdge {
    pub relation: MediaRelation,
    pub node: MediaRef,
}

/// Relation edge returned by the related-media lookup; the node is a
/// full media record carrying its own shallow edges.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedMediaEdge {
    pub relation: MediaRelation,
    pub node: Media,
}

/// Structured character name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterName {
    pub first: Option<String>,
    pub middle: Option<String>,
    pub last: Option<String>,
    pub full: Option<String>,
    pub native: Option<String>,
    pub alternative: Vec<String>,
}

/// Character portrait URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CharacterImage {
    pub large: Option<String>,
    pub medium: Option<String>,
}

/// A character attached to one or more media records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub id: u64,
    pub name: CharacterName,
    pub description: Option<String>,
    pub site_url: Option<String>,
    pub image: Option<CharacterImage>,
}

/// Character edge on a media record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterEdge {
    pub role: CharacterRole,
    pub node: Character,
}

/// One page of a multi-page result.
#[derive(Debug, Clone, PartialEq)]
pub struct PageEnvelope<T> {
    pub current_page: u32,
    pub has_next_page: bool,
    pub items: Vec<T>,
}
