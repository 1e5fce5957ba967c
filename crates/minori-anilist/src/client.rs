use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use futures::Stream;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::models::{Character, CharacterEdge, Media, RelatedMediaEdge, Season};
use crate::pager::paged;
use crate::rate_limit::{self, RateLimitState};
use crate::transport::{HttpTransport, Transport};
use crate::types::{
    CharacterData, CharacterEdgeNode, CharacterPageData, DeepRelationEdgeNode, Envelope,
    MediaCharactersData, MediaData, MediaPageData, RelatedMediaData,
};

const API_URL: &str = "https://graphql.anilist.co";

/// Total send attempts per logical call, counting the first.
const MAX_ATTEMPTS: u32 = 3;

const REQUEST_HEADERS: &[(&str, &str)] = &[
    ("Content-Type", "application/json"),
    ("Accept", "application/json"),
];

const GET_MEDIA_QUERY: &str = r#"
query ($id: Int) {
    Media(id: $id) {
        id
        type
        title { romaji english native }
        description
        siteUrl
        startDate { year month day }
        endDate { year month day }
        isAdult
        episodes
        status
        genres
        averageScore
        season
        seasonYear
        coverImage { extraLarge large medium color }
        relations {
            edges {
                relationType
                node { id type title { romaji english native } }
            }
        }
        characters {
            edges {
                role
                node {
                    id
                    name { first middle last full native alternative }
                    description
                    siteUrl
                    image { large medium }
                }
            }
        }
    }
}
"#;

const SEARCH_MEDIA_QUERY: &str = r#"
query ($search: String, $page: Int) {
    Page(page: $page, perPage: 50) {
        pageInfo { currentPage hasNextPage }
        media(search: $search) {
            id
            type
            title { romaji english native }
            description
            siteUrl
            startDate { year month day }
            endDate { year month day }
            isAdult
            episodes
            status
            genres
            averageScore
            season
            seasonYear
            coverImage { extraLarge large medium color }
            relations {
                edges {
                    relationType
                    node { id type title { romaji english native } }
                }
            }
            characters {
                edges {
                    role
                    node {
                        id
                        name { first middle last full native alternative }
                        description
                        siteUrl
                        image { large medium }
                    }
                }
            }
        }
    }
}
"#;

const SEASONAL_MEDIA_QUERY: &str = r#"
query ($season: MediaSeason, $seasonYear: Int, $page: Int) {
    Page(page: $page, perPage: 50) {
        pageInfo { currentPage hasNextPage }
        media(season: $season, seasonYear: $seasonYear, sort: POPULARITY_DESC) {
            id
            type
            title { romaji english native }
            description
            siteUrl
            startDate { year month day }
            endDate { year month day }
            isAdult
            episodes
            status
            genres
            averageScore
            season
            seasonYear
            coverImage { extraLarge large medium color }
            relations {
                edges {
                    relationType
                    node { id type title { romaji english native } }
                }
            }
            characters {
                edges {
                    role
                    node {
                        id
                        name { first middle last full native alternative }
                        description
                        siteUrl
                        image { large medium }
                    }
                }
            }
        }
    }
}
"#;

const RELATED_MEDIA_QUERY: &str = r#"
query ($id: Int) {
    Media(id: $id) {
        relations {
            edges {
                relationType
                node {
                    id
                    type
                    title { romaji english native }
                    description
                    siteUrl
                    startDate { year month day }
                    endDate { year month day }
                    isAdult
                    episodes
                    status
                    genres
                    averageScore
                    season
                    seasonYear
                    coverImage { extraLarge large medium color }
                    relations {
                        edges {
                            relationType
                            node { id type title { romaji english native } }
                        }
                    }
                    characters {
                        edges {
                            role
                            node {
                                id
                                name { first middle last full native alternative }
                                description
                                siteUrl
                                image { large medium }
                            }
                        }
                    }
                }
            }
        }
    }
}
"#;

const MEDIA_CHARACTERS_QUERY: &str = r#"
query ($id: Int) {
    Media(id: $id) {
        characters {
            edges {
                role
                node {
                    id
                    name { first middle last full native alternative }
                    description
                    siteUrl
                    image { large medium }
                }
            }
        }
    }
}
"#;

const GET_CHARACTER_QUERY: &str = r#"
query ($id: Int) {
    Character(id: $id) {
        id
        name { first middle last full native alternative }
        description
        siteUrl
        image { large medium }
    }
}
"#;

const SEARCH_CHARACTERS_QUERY: &str = r#"
query ($search: String, $page: Int) {
    Page(page: $page, perPage: 50) {
        pageInfo { currentPage hasNextPage }
        characters(search: $search) {
            id
            name { first middle last full native alternative }
            description
            siteUrl
            image { large medium }
        }
    }
}
"#;

/// AniList GraphQL catalog client.
///
/// A single instance drives one logical request at a time; the quota
/// state it tracks has a single expected writer. Overlapping calls on
/// the same instance race on that state and may under- or over-wait the
/// service's rate limit. Callers that need concurrency must construct
/// one client per task or serialize access externally.
pub struct Client<T: Transport = HttpTransport> {
    transport: T,
    endpoint: String,
    rate_limit: Mutex<RateLimitState>,
}

impl Client<HttpTransport> {
    /// Client against the public endpoint, queried anonymously.
    pub fn new() -> Self {
        Self::with_transport(HttpTransport::new(), API_URL)
    }
}

impl Default for Client<HttpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Client<T> {
    /// Client with an injected transport, e.g. for tests or middleware.
    pub fn with_transport(transport: T, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            rate_limit: Mutex::new(RateLimitState::default()),
        }
    }

    /// Snapshot of the most recently observed request quota.
    pub fn rate_limit(&self) -> RateLimitState {
        *self.state()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, RateLimitState> {
        // Guard never crosses an await.
        self.rate_limit.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Send one GraphQL operation and decode its `data` payload.
    ///
    /// Waits out an exhausted quota window before transmitting, folds
    /// rate-limit headers of every response into the shared state, and
    /// retries throttled sends per the `Retry-After` header up to
    /// [`MAX_ATTEMPTS`] total attempts.
    async fn dispatch<D: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &'static str,
        variables: serde_json::Value,
        cancel: &CancellationToken,
    ) -> Result<Option<D>, Error> {
        if let Some(wait) = self.state().required_wait(Utc::now()) {
            tracing::debug!(
                operation,
                wait_ms = wait.as_millis() as u64,
                "request quota exhausted, waiting for window reset"
            );
            sleep_or_cancel(wait, cancel).await?;
        }

        let body = serde_json::json!({
            "query": query,
            "variables": variables,
        })
        .to_string();

        let mut attempts = 0u32;
        loop {
            attempts += 1;
            tracing::debug!(operation, attempts, "AniList GraphQL request");

            let response = self
                .transport
                .send(&self.endpoint, body.clone(), REQUEST_HEADERS, cancel)
                .await?;

            self.state().update_from_headers(&response.headers);

            if response.status == 429 {
                match rate_limit::retry_after(&response.headers) {
                    Some(delay) if attempts < MAX_ATTEMPTS => {
                        tracing::warn!(
                            operation,
                            attempts,
                            delay_s = delay.as_secs(),
                            "throttled, retrying after delay"
                        );
                        sleep_or_cancel(delay, cancel).await?;
                        continue;
                    }
                    Some(_) => {
                        tracing::warn!(operation, attempts, "throttled, attempts exhausted");
                        return Err(Error::RateLimited { attempts });
                    }
                    None => {
                        return Err(Error::Api {
                            status: response.status,
                            message: String::from_utf8_lossy(&response.body).into_owned(),
                        });
                    }
                }
            }

            if !(200..300).contains(&response.status) {
                tracing::warn!(operation, status = response.status, "AniList API error");
                return Err(Error::Api {
                    status: response.status,
                    message: String::from_utf8_lossy(&response.body).into_owned(),
                });
            }

            let envelope: Envelope<D> = serde_json::from_slice(&response.body)
                .map_err(|e| Error::Parse(e.to_string()))?;
            return Ok(envelope.data);
        }
    }

    /// Fetch one media record with one level of relation and character
    /// edges. `None` means the service returned no record for the id.
    pub async fn get_media(
        &self,
        id: u64,
        cancel: &CancellationToken,
    ) -> Result<Option<Media>, Error> {
        let data: Option<MediaData> = self
            .dispatch(
                "GetMedia",
                GET_MEDIA_QUERY,
                serde_json::json!({ "id": id }),
                cancel,
            )
            .await?;

        match data.and_then(|d| d.media) {
            Some(node) => Ok(Some(node.into_media()?)),
            None => Ok(None),
        }
    }

    /// Fetch one character record.
    pub async fn get_character(
        &self,
        id: u64,
        cancel: &CancellationToken,
    ) -> Result<Option<Character>, Error> {
        let data: Option<CharacterData> = self
            .dispatch(
                "GetCharacter",
                GET_CHARACTER_QUERY,
                serde_json::json!({ "id": id }),
                cancel,
            )
            .await?;

        Ok(data.and_then(|d| d.character).map(|node| node.into_character()))
    }

    /// Fetch the relation edges of a media record. Each edge carries a
    /// full media node with its own one-level relation and character
    /// edges, one nesting level deeper than [`Client::get_media`]
    /// returns for the root record.
    pub async fn get_related_media(
        &self,
        id: u64,
        cancel: &CancellationToken,
    ) -> Result<Vec<RelatedMediaEdge>, Error> {
        let data: Option<RelatedMediaData> = self
            .dispatch(
                "RelatedMedia",
                RELATED_MEDIA_QUERY,
                serde_json::json!({ "id": id }),
                cancel,
            )
            .await?;

        data.and_then(|d| d.media)
            .and_then(|m| m.relations)
            .and_then(|c| c.edges)
            .unwrap_or_default()
            .into_iter()
            .map(DeepRelationEdgeNode::into_related_edge)
            .collect()
    }

    /// Fetch the character edges of a media record.
    pub async fn get_characters(
        &self,
        id: u64,
        cancel: &CancellationToken,
    ) -> Result<Vec<CharacterEdge>, Error> {
        let data: Option<MediaCharactersData> = self
            .dispatch(
                "MediaCharacters",
                MEDIA_CHARACTERS_QUERY,
                serde_json::json!({ "id": id }),
                cancel,
            )
            .await?;

        data.and_then(|d| d.media)
            .and_then(|m| m.characters)
            .and_then(|c| c.edges)
            .unwrap_or_default()
            .into_iter()
            .map(CharacterEdgeNode::into_character_edge)
            .collect()
    }

    /// Search media by title, lazily walking all result pages.
    pub fn search_media<'a>(
        &'a self,
        search: &str,
        cancel: &CancellationToken,
    ) -> impl Stream<Item = Result<Media, Error>> + 'a {
        let search = search.to_owned();
        let cancel = cancel.clone();
        let gate = cancel.clone();
        paged(gate, move |page| {
            let variables = serde_json::json!({ "search": search.as_str(), "page": page });
            let cancel = cancel.clone();
            async move {
                let data: Option<MediaPageData> = self
                    .dispatch("SearchMedia", SEARCH_MEDIA_QUERY, variables, &cancel)
                    .await?;
                data.map(|d| d.page.into_envelope()).transpose()
            }
        })
    }

    /// List a season's media, most popular first, lazily walking all
    /// result pages.
    pub fn seasonal_media<'a>(
        &'a self,
        season: Season,
        year: u32,
        cancel: &CancellationToken,
    ) -> impl Stream<Item = Result<Media, Error>> + 'a {
        let cancel = cancel.clone();
        let gate = cancel.clone();
        paged(gate, move |page| {
            let variables = serde_json::json!({
                "season": season.as_str(),
                "seasonYear": year,
                "page": page,
            });
            let cancel = cancel.clone();
            async move {
                let data: Option<MediaPageData> = self
                    .dispatch("SeasonalMedia", SEASONAL_MEDIA_QUERY, variables, &cancel)
                    .await?;
                data.map(|d| d.page.into_envelope()).transpose()
            }
        })
    }

    /// Search characters by name, lazily walking all result pages.
    pub fn search_characters<'a>(
        &'a self,
        search: &str,
        cancel: &CancellationToken,
    ) -> impl Stream<Item = Result<Character, Error>> + 'a {
        let search = search.to_owned();
        let cancel = cancel.clone();
        let gate = cancel.clone();
        paged(gate, move |page| {
            let variables = serde_json::json!({ "search": search.as_str(), "page": page });
            let cancel = cancel.clone();
            async move {
                let data: Option<CharacterPageData> = self
                    .dispatch(
                        "SearchCharacters",
                        SEARCH_CHARACTERS_QUERY,
                        variables,
                        &cancel,
                    )
                    .await?;
                Ok(data.map(|d| d.page.into_envelope()))
            }
        })
    }
}

async fn sleep_or_cancel(wait: Duration, cancel: &CancellationToken) -> Result<(), Error> {
    tokio::select! {
        _ = cancel.cancelled() => Err(Error::Canceled),
        () = tokio::time::sleep(wait) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};

    use futures::StreamExt;
    use tokio::time::{self, Instant};

    use super::*;
    use crate::models::{CharacterRole, MediaKind, MediaRelation};
    use crate::transport::RawResponse;

    struct MockTransport {
        responses: Mutex<VecDeque<RawResponse>>,
        calls: Mutex<Vec<(Instant, String)>>,
    }

    impl MockTransport {
        fn scripted(responses: Vec<RawResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for MockTransport {
        async fn send(
            &self,
            _url: &str,
            body: String,
            _headers: &[(&str, &str)],
            cancel: &CancellationToken,
        ) -> Result<RawResponse, Error> {
            if cancel.is_cancelled() {
                return Err(Error::Canceled);
            }
            self.calls.lock().unwrap().push((Instant::now(), body));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| Error::Api {
                    status: 599,
                    message: "script exhausted".into(),
                })
        }
    }

    fn response(status: u16, headers: &[(&str, &str)], body: &str) -> RawResponse {
        RawResponse {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
            body: body.as_bytes().to_vec(),
        }
    }

    fn ok(body: &str) -> RawResponse {
        response(200, &[], body)
    }

    fn throttled(retry_after_secs: u64) -> RawResponse {
        let delay = retry_after_secs.to_string();
        response(429, &[("retry-after", delay.as_str())], "Too Many Requests")
    }

    fn client(responses: Vec<RawResponse>) -> Client<MockTransport> {
        Client::with_transport(MockTransport::scripted(responses), "http://mock.test/graphql")
    }

    fn calls(client: &Client<MockTransport>) -> Vec<(Instant, String)> {
        client.transport.calls.lock().unwrap().clone()
    }

    fn media_page_body(page: u32, start_id: u64, count: u64, has_next: bool) -> String {
        let media: Vec<serde_json::Value> = (start_id..start_id + count)
            .map(|id| serde_json::json!({ "id": id, "type": "ANIME" }))
            .collect();
        serde_json::json!({
            "data": {
                "Page": {
                    "pageInfo": { "currentPage": page, "hasNextPage": has_next },
                    "media": media,
                }
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_get_media_decodes() {
        let client = client(vec![ok(
            r#"{ "data": { "Media": { "id": 1535, "type": "ANIME", "status": "FINISHED" } } }"#,
        )]);
        let media = client
            .get_media(1535, &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(media.id, 1535);
        assert_eq!(media.kind, MediaKind::Anime);

        let sent = calls(&client);
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains(r#""id":1535"#));
    }

    #[tokio::test]
    async fn test_get_media_not_found_yields_none() {
        let client = client(vec![
            ok(r#"{ "data": { "Media": null } }"#),
            ok(r#"{ "data": null }"#),
        ]);
        let token = CancellationToken::new();

        assert!(client.get_media(1, &token).await.unwrap().is_none());
        assert!(client.get_media(2, &token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_parse_error() {
        let client = client(vec![ok("surprise, not json")]);
        let result = client.get_media(1, &CancellationToken::new()).await;
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[tokio::test]
    async fn test_server_error_fails_without_retry() {
        let client = client(vec![response(500, &[], "internal error")]);
        let result = client.get_media(1, &CancellationToken::new()).await;

        match result {
            Err(Error::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "internal error");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert_eq!(calls(&client).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_exhaustion_delays_next_dispatch() {
        let reset_at = (Utc::now() + chrono::Duration::seconds(30)).timestamp();
        let reset = reset_at.to_string();
        let client = client(vec![
            response(
                200,
                &[
                    ("x-ratelimit-limit", "90"),
                    ("x-ratelimit-remaining", "0"),
                    ("x-ratelimit-reset", reset.as_str()),
                ],
                r#"{ "data": { "Media": { "id": 1 } } }"#,
            ),
            ok(r#"{ "data": { "Media": { "id": 2 } } }"#),
        ]);
        let token = CancellationToken::new();

        client.get_media(1, &token).await.unwrap();
        assert_eq!(client.rate_limit().remaining, Some(0));

        let before_second = Instant::now();
        client.get_media(2, &token).await.unwrap();

        let sent = calls(&client);
        assert_eq!(sent.len(), 2);
        // The second transmission waits out the 30s window (plus buffer)
        // in virtual time; the margin absorbs wall-clock skew between
        // building the header and evaluating the gate.
        assert!(sent[1].0 - before_second >= Duration::from_secs(29));
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttled_call_retries_after_delay() {
        let client = client(vec![
            throttled(7),
            ok(r#"{ "data": { "Media": { "id": 9 } } }"#),
        ]);
        let start = Instant::now();
        let media = client
            .get_media(9, &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(media.id, 9);
        let sent = calls(&client);
        assert_eq!(sent.len(), 2);
        assert!(sent[1].0 - start >= Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_bound_is_three_attempts() {
        let client = client(vec![throttled(1), throttled(1), throttled(1), throttled(1)]);
        let result = client.get_media(1, &CancellationToken::new()).await;

        assert!(matches!(result, Err(Error::RateLimited { attempts: 3 })));
        assert_eq!(calls(&client).len(), 3);
    }

    #[tokio::test]
    async fn test_throttled_without_retry_after_fails_immediately() {
        let client = client(vec![response(429, &[], "Too Many Requests")]);
        let result = client.get_media(1, &CancellationToken::new()).await;

        assert!(matches!(result, Err(Error::Api { status: 429, .. })));
        assert_eq!(calls(&client).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_quota_wait_sends_nothing() {
        let reset_at = (Utc::now() + chrono::Duration::seconds(60)).timestamp();
        let reset = reset_at.to_string();
        let client = client(vec![
            response(
                200,
                &[
                    ("x-ratelimit-remaining", "0"),
                    ("x-ratelimit-reset", reset.as_str()),
                ],
                r#"{ "data": { "Media": { "id": 1 } } }"#,
            ),
            ok(r#"{ "data": { "Media": { "id": 2 } } }"#),
        ]);
        let token = CancellationToken::new();
        client.get_media(1, &token).await.unwrap();

        let (result, ()) = tokio::join!(client.get_media(2, &token), async {
            time::sleep(Duration::from_secs(1)).await;
            token.cancel();
        });

        assert!(matches!(result, Err(Error::Canceled)));
        // Only the seeding call ever reached the transport.
        assert_eq!(calls(&client).len(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_snapshot_tracks_headers() {
        let client = client(vec![response(
            200,
            &[
                ("x-ratelimit-limit", "90"),
                ("x-ratelimit-remaining", "42"),
            ],
            r#"{ "data": { "Media": { "id": 1 } } }"#,
        )]);
        client
            .get_media(1, &CancellationToken::new())
            .await
            .unwrap();

        let state = client.rate_limit();
        assert_eq!(state.limit, Some(90));
        assert_eq!(state.remaining, Some(42));
    }

    #[tokio::test]
    async fn test_get_related_media_decodes_edges() {
        let client = client(vec![ok(
            r#"{
                "data": {
                    "Media": {
                        "relations": {
                            "edges": [
                                {
                                    "relationType": "SEQUEL",
                                    "node": {
                                        "id": 5,
                                        "type": "ANIME",
                                        "relations": {
                                            "edges": [
                                                { "relationType": "PREQUEL", "node": { "id": 4, "type": "ANIME" } }
                                            ]
                                        }
                                    }
                                }
                            ]
                        }
                    }
                }
            }"#,
        )]);

        let edges = client
            .get_related_media(4, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].relation, MediaRelation::Sequel);
        assert_eq!(edges[0].node.id, 5);
        assert_eq!(edges[0].node.relations[0].relation, MediaRelation::Prequel);
    }

    #[tokio::test]
    async fn test_get_characters_decodes_edges() {
        let client = client(vec![ok(
            r#"{
                "data": {
                    "Media": {
                        "characters": {
                            "edges": [
                                { "role": "MAIN", "node": { "id": 7, "name": { "full": "Edward Elric" } } },
                                { "role": "BACKGROUND", "node": { "id": 8 } }
                            ]
                        }
                    }
                }
            }"#,
        )]);

        let edges = client
            .get_characters(121, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].role, CharacterRole::Main);
        assert_eq!(edges[0].node.name.full.as_deref(), Some("Edward Elric"));
        assert_eq!(edges[1].role, CharacterRole::Background);
    }

    #[tokio::test]
    async fn test_get_character_by_id() {
        let client = client(vec![ok(
            r#"{ "data": { "Character": { "id": 40, "name": { "full": "Rei Ayanami" } } } }"#,
        )]);
        let character = client
            .get_character(40, &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(character.id, 40);
    }

    #[tokio::test]
    async fn test_search_walks_every_page_in_order() {
        let client = client(vec![
            ok(&media_page_body(1, 0, 50, true)),
            ok(&media_page_body(2, 50, 50, true)),
            ok(&media_page_body(3, 100, 7, false)),
        ]);
        let token = CancellationToken::new();

        let stream = client.search_media("evangelion", &token);
        futures::pin_mut!(stream);
        let mut ids = Vec::new();
        while let Some(item) = stream.next().await {
            ids.push(item.unwrap().id);
        }

        assert_eq!(ids.len(), 107);
        assert_eq!(ids, (0..107).collect::<Vec<u64>>());

        let sent = calls(&client);
        assert_eq!(sent.len(), 3);
        assert!(sent[0].1.contains(r#""page":1"#));
        assert!(sent[1].1.contains(r#""page":2"#));
        assert!(sent[2].1.contains(r#""page":3"#));
    }

    #[tokio::test]
    async fn test_empty_page_with_next_flag_continues() {
        let client = client(vec![
            ok(&media_page_body(1, 0, 0, true)),
            ok(&media_page_body(2, 10, 1, false)),
        ]);
        let token = CancellationToken::new();

        let stream = client.search_media("obscure", &token);
        futures::pin_mut!(stream);
        let mut ids = Vec::new();
        while let Some(item) = stream.next().await {
            ids.push(item.unwrap().id);
        }

        assert_eq!(ids, vec![10]);
        assert_eq!(calls(&client).len(), 2);
    }

    #[tokio::test]
    async fn test_pager_stops_on_absent_page() {
        let client = client(vec![ok(r#"{ "data": null }"#)]);
        let token = CancellationToken::new();

        let stream = client.search_media("void", &token);
        futures::pin_mut!(stream);
        assert!(stream.next().await.is_none());
        assert_eq!(calls(&client).len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_between_pages_stops_the_walk() {
        let client = client(vec![
            ok(&media_page_body(1, 0, 2, true)),
            ok(&media_page_body(2, 2, 2, false)),
        ]);
        let token = CancellationToken::new();

        let stream = client.search_media("aria", &token);
        futures::pin_mut!(stream);
        assert_eq!(stream.next().await.unwrap().unwrap().id, 0);
        assert_eq!(stream.next().await.unwrap().unwrap().id, 1);

        token.cancel();
        assert!(matches!(stream.next().await, Some(Err(Error::Canceled))));
        assert!(stream.next().await.is_none());
        assert_eq!(calls(&client).len(), 1);
    }

    #[tokio::test]
    async fn test_seasonal_media_variables_and_order() {
        let body = serde_json::json!({
            "data": {
                "Page": {
                    "pageInfo": { "currentPage": 1, "hasNextPage": false },
                    "media": [
                        { "id": 20, "type": "ANIME" },
                        { "id": 30, "type": "ANIME" },
                    ]
                }
            }
        })
        .to_string();
        let client = client(vec![ok(&body)]);
        let token = CancellationToken::new();

        let stream = client.seasonal_media(Season::Winter, 2024, &token);
        futures::pin_mut!(stream);
        let mut ids = Vec::new();
        while let Some(item) = stream.next().await {
            ids.push(item.unwrap().id);
        }

        assert_eq!(ids, vec![20, 30]);
        let sent = calls(&client);
        assert!(sent[0].1.contains(r#""season":"WINTER""#));
        assert!(sent[0].1.contains(r#""seasonYear":2024"#));
        assert!(sent[0].1.contains("POPULARITY_DESC"));
    }

    #[tokio::test]
    async fn test_search_characters_stream() {
        let body = serde_json::json!({
            "data": {
                "Page": {
                    "pageInfo": { "currentPage": 1, "hasNextPage": false },
                    "characters": [
                        { "id": 1, "name": { "full": "Holo" } },
                        { "id": 2, "name": { "full": "Lawrence" } },
                    ]
                }
            }
        })
        .to_string();
        let client = client(vec![ok(&body)]);
        let token = CancellationToken::new();

        let stream = client.search_characters("spice", &token);
        futures::pin_mut!(stream);
        let mut names = Vec::new();
        while let Some(item) = stream.next().await {
            names.push(item.unwrap().name.full.unwrap());
        }

        assert_eq!(names, vec!["Holo", "Lawrence"]);
    }
}
