//! Client library for the AniList GraphQL media catalog.
//!
//! Fetch single records ([`Client::get_media`], [`Client::get_character`]),
//! resolve relation and character edges, and walk multi-page search or
//! seasonal listings as lazy streams, all while obeying the service's
//! request quota: the client waits out exhausted windows, retries
//! throttled calls per `Retry-After`, and folds every response's
//! rate-limit headers into [`RateLimitState`].
//!
//! Queries are anonymous and read-only; the service's quota for
//! unauthenticated callers applies. One client instance drives one
//! logical request at a time; see [`Client`] for the concurrency
//! constraint.

pub mod client;
pub mod error;
pub mod models;
mod pager;
pub mod rate_limit;
pub mod transport;
pub mod types;

pub use client::Client;
pub use error::Error;
pub use models::{
    Character, CharacterEdge, CharacterImage, CharacterName, CharacterRole, Color, CoverImage,
    FuzzyDate, Media, MediaEdge, MediaKind, MediaRef, MediaRelation, MediaStatus, MediaTitle,
    PageEnvelope, RelatedMediaEdge, Season,
};
pub use rate_limit::RateLimitState;
pub use transport::{HttpTransport, RawResponse, Transport};

/// Re-exported so callers can construct cancellation tokens without
/// depending on `tokio-util` directly.
pub use tokio_util::sync::CancellationToken;
