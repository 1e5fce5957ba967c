//! Wire-level response types and their mapping into domain entities.
//!
//! Response shapes mirror the GraphQL queries in `client.rs`. Relation
//! graphs are deliberately non-recursive: a full media node embeds only
//! shallow [`MediaRefNode`] relation targets, and the related-media
//! lookup uses its own one-level-deeper edge type. The service does not
//! serve anything deeper, so neither do these types.

use serde::Deserialize;

use crate::error::Error;
use crate::models::{
    Character, CharacterEdge, CharacterImage, CharacterName, CharacterRole, Color, CoverImage,
    FuzzyDate, Media, MediaEdge, MediaKind, MediaRef, MediaRelation, MediaStatus, MediaTitle,
    PageEnvelope, RelatedMediaEdge, Season,
};

// ── GraphQL response wrappers ────────────────────────────────────

/// The `{ "data": … }` envelope every reply arrives in. `data` is null
/// for valid-but-empty results.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct MediaData {
    #[serde(rename = "Media")]
    pub media: Option<MediaNode>,
}

#[derive(Debug, Deserialize)]
pub struct CharacterData {
    #[serde(rename = "Character")]
    pub character: Option<CharacterNode>,
}

#[derive(Debug, Deserialize)]
pub struct RelatedMediaData {
    #[serde(rename = "Media")]
    pub media: Option<RelatedMediaNode>,
}

#[derive(Debug, Deserialize)]
pub struct RelatedMediaNode {
    pub relations: Option<DeepRelationConnection>,
}

#[derive(Debug, Deserialize)]
pub struct MediaCharactersData {
    #[serde(rename = "Media")]
    pub media: Option<MediaCharactersNode>,
}

#[derive(Debug, Deserialize)]
pub struct MediaCharactersNode {
    pub characters: Option<CharacterConnection>,
}

// ── Page envelopes ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MediaPageData {
    #[serde(rename = "Page")]
    pub page: MediaPage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaPage {
    pub page_info: PageInfo,
    pub media: Vec<MediaNode>,
}

#[derive(Debug, Deserialize)]
pub struct CharacterPageData {
    #[serde(rename = "Page")]
    pub page: CharacterPage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterPage {
    pub page_info: PageInfo,
    pub characters: Vec<CharacterNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: u32,
    pub has_next_page: bool,
}

// ── Media nodes ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaNode {
    pub id: u64,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub title: Option<MediaTitle>,
    pub description: Option<String>,
    pub site_url: Option<String>,
    pub start_date: Option<FuzzyDate>,
    pub end_date: Option<FuzzyDate>,
    pub is_adult: Option<bool>,
    pub episodes: Option<u32>,
    pub status: Option<String>,
    pub genres: Option<Vec<String>>,
    pub average_score: Option<u32>,
    pub season: Option<String>,
    pub season_year: Option<u32>,
    pub cover_image: Option<CoverImageNode>,
    pub relations: Option<RelationConnection>,
    pub characters: Option<CharacterConnection>,
}

/// Shallow relation target: id, kind, and title only.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRefNode {
    pub id: u64,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub title: Option<MediaTitle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImageNode {
    pub extra_large: Option<String>,
    pub large: Option<String>,
    pub medium: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RelationConnection {
    pub edges: Option<Vec<RelationEdgeNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationEdgeNode {
    pub relation_type: String,
    pub node: MediaRefNode,
}

/// Edge returned by the related-media lookup: the node is a full media
/// record, one nesting level deeper than [`RelationEdgeNode`].
#[derive(Debug, Deserialize)]
pub struct DeepRelationConnection {
    pub edges: Option<Vec<DeepRelationEdgeNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepRelationEdgeNode {
    pub relation_type: String,
    pub node: MediaNode,
}

// ── Character nodes ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CharacterConnection {
    pub edges: Option<Vec<CharacterEdgeNode>>,
}

#[derive(Debug, Deserialize)]
pub struct CharacterEdgeNode {
    pub role: String,
    pub node: CharacterNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterNode {
    pub id: u64,
    pub name: Option<CharacterNameNode>,
    pub description: Option<String>,
    pub site_url: Option<String>,
    pub image: Option<CharacterImage>,
}

#[derive(Debug, Deserialize)]
pub struct CharacterNameNode {
    pub first: Option<String>,
    pub middle: Option<String>,
    pub last: Option<String>,
    pub full: Option<String>,
    pub native: Option<String>,
    pub alternative: Option<Vec<String>>,
}

// ── Enum wire mapping ────────────────────────────────────────────

/// Wire values that do not reduce to a variant name by case folding.
/// Checked before the generic case-insensitive match.
const STATUS_OVERRIDES: &[(&str, MediaStatus)] =
    &[("NOT_YET_RELEASED", MediaStatus::NotYetReleased)];

const RELATION_OVERRIDES: &[(&str, MediaRelation)] = &[
    ("SIDE_STORY", MediaRelation::SideStory),
    ("SPIN_OFF", MediaRelation::SpinOff),
];

fn parse_wire_enum<T: Copy>(
    wire: &str,
    overrides: &[(&str, T)],
    variants: &[T],
    name: fn(T) -> &'static str,
    what: &str,
) -> Result<T, Error> {
    if let Some((_, variant)) = overrides.iter().find(|(w, _)| *w == wire) {
        return Ok(*variant);
    }
    variants
        .iter()
        .copied()
        .find(|v| name(*v).eq_ignore_ascii_case(wire))
        .ok_or_else(|| Error::Parse(format!("unknown {what}: {wire:?}")))
}

pub(crate) fn parse_media_status(wire: &str) -> Result<MediaStatus, Error> {
    parse_wire_enum(
        wire,
        STATUS_OVERRIDES,
        MediaStatus::ALL,
        MediaStatus::name,
        "media status",
    )
}

pub(crate) fn parse_media_relation(wire: &str) -> Result<MediaRelation, Error> {
    parse_wire_enum(
        wire,
        RELATION_OVERRIDES,
        MediaRelation::ALL,
        MediaRelation::name,
        "media relation",
    )
}

pub(crate) fn parse_character_role(wire: &str) -> Result<CharacterRole, Error> {
    parse_wire_enum(wire, &[], CharacterRole::ALL, CharacterRole::name, "character role")
}

pub(crate) fn parse_season(wire: &str) -> Result<Season, Error> {
    parse_wire_enum(wire, &[], Season::ALL, Season::name, "season")
}

/// An absent type field decodes to [`MediaKind::Unknown`]; a present but
/// unrecognized one is a decode failure.
pub(crate) fn parse_media_kind(wire: Option<&str>) -> Result<MediaKind, Error> {
    match wire {
        None => Ok(MediaKind::Unknown),
        Some(wire) => parse_wire_enum(
            wire,
            &[],
            &[MediaKind::Anime, MediaKind::Manga],
            MediaKind::name,
            "media kind",
        ),
    }
}

// ── Conversions ──────────────────────────────────────────────────

impl CoverImageNode {
    pub fn into_cover_image(self) -> CoverImage {
        let rgb = self
            .color
            .as_deref()
            .filter(|hex| !hex.is_empty())
            .and_then(Color::from_hex);
        CoverImage {
            extra_large: self.extra_large,
            large: self.large,
            medium: self.medium,
            color: self.color,
            rgb,
        }
    }
}

impl MediaRefNode {
    pub fn into_media_ref(self) -> Result<MediaRef, Error> {
        Ok(MediaRef {
            id: self.id,
            kind: parse_media_kind(self.media_type.as_deref())?,
            title: self.title.unwrap_or_default(),
        })
    }
}

impl RelationEdgeNode {
    pub fn into_media_edge(self) -> Result<MediaEdge, Error> {
        Ok(MediaEdge {
            relation: parse_media_relation(&self.relation_type)?,
            node: self.node.into_media_ref()?,
        })
    }
}

impl DeepRelationEdgeNode {
    pub fn into_related_edge(self) -> Result<RelatedMediaEdge, Error> {
        Ok(RelatedMediaEdge {
            relation: parse_media_relation(&self.relation_type)?,
            node: self.node.into_media()?,
        })
    }
}

impl CharacterNameNode {
    pub fn into_name(self) -> CharacterName {
        CharacterName {
            first: self.first,
            middle: self.middle,
            last: self.last,
            full: self.full,
            native: self.native,
            alternative: self.alternative.unwrap_or_default(),
        }
    }
}

impl CharacterNode {
    pub fn into_character(self) -> Character {
        Character {
            id: self.id,
            name: self.name.map(CharacterNameNode::into_name).unwrap_or_default(),
            description: self.description,
            site_url: self.site_url,
            image: self.image,
        }
    }
}

impl CharacterEdgeNode {
    pub fn into_character_edge(self) -> Result<CharacterEdge, Error> {
        Ok(CharacterEdge {
            role: parse_character_role(&self.role)?,
            node: self.node.into_character(),
        })
    }
}

impl MediaNode {
    pub fn into_media(self) -> Result<Media, Error> {
        let relations = match self.relations.and_then(|c| c.edges) {
            Some(edges) => edges
                .into_iter()
                .map(RelationEdgeNode::into_media_edge)
                .collect::<Result<_, _>>()?,
            None => Vec::new(),
        };
        let characters = match self.characters.and_then(|c| c.edges) {
            Some(edges) => edges
                .into_iter()
                .map(CharacterEdgeNode::into_character_edge)
                .collect::<Result<_, _>>()?,
            None => Vec::new(),
        };

        Ok(Media {
            id: self.id,
            kind: parse_media_kind(self.media_type.as_deref())?,
            title: self.title.unwrap_or_default(),
            description: self.description,
            site_url: self.site_url,
            start_date: self.start_date,
            end_date: self.end_date,
            is_adult: self.is_adult,
            episodes: self.episodes,
            status: self.status.as_deref().map(parse_media_status).transpose()?,
            genres: self.genres.unwrap_or_default(),
            average_score: self.average_score,
            season: self.season.as_deref().map(parse_season).transpose()?,
            season_year: self.season_year,
            cover_image: self.cover_image.map(CoverImageNode::into_cover_image),
            relations,
            characters,
        })
    }
}

impl MediaPage {
    pub fn into_envelope(self) -> Result<PageEnvelope<Media>, Error> {
        Ok(PageEnvelope {
            current_page: self.page_info.current_page,
            has_next_page: self.page_info.has_next_page,
            items: self
                .media
                .into_iter()
                .map(MediaNode::into_media)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl CharacterPage {
    pub fn into_envelope(self) -> PageEnvelope<Character> {
        PageEnvelope {
            current_page: self.page_info.current_page,
            has_next_page: self.page_info.has_next_page,
            items: self
                .characters
                .into_iter()
                .map(CharacterNode::into_character)
                .collect(),
        }
    }
}
