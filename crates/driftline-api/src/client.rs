// Hand-crafted async HTTP client for the Driftline platform API.
//
// Base paths: /api/v1/ (feed) and /api/v2/ (discovery, search, messenger).
// Auth: optional `Authorization: Bearer <token>` default header.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::types::{KeysEnvelope, PageEnvelope};

/// Async client for the Driftline listing and messenger endpoints.
///
/// Cheap to clone; the underlying `reqwest::Client` is an `Arc` internally.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Anonymous client (public listings only).
    pub fn new(base_url: &str, transport: &crate::TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
        })
    }

    /// Authenticated client. Injects `Authorization: Bearer ...` as a
    /// sensitive default header on every request.
    pub fn with_access_token(
        base_url: &str,
        token: &SecretString,
        transport: &crate::TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid access token header value: {e}"),
            })?;
        value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, value);

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
        })
    }

    /// Ensure the base URL ends with a single `/` so relative joins work.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// Join a relative path (e.g. `"api/v2/search"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = &body[..body.len().min(200)];
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(parse_error(status, resp).await)
        }
    }

    /// Apply the `{status: "error", message}` envelope check shared by
    /// every listing endpoint.
    fn check_envelope(envelope: PageEnvelope) -> Result<PageEnvelope, Error> {
        if envelope.is_success() {
            Ok(envelope)
        } else {
            Err(Error::Api {
                message: envelope.status.unwrap_or_else(|| "error".to_owned()),
                status: 200,
            })
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Channel feed ─────────────────────────────────────────────────

    /// Fetch one page of a channel's activity feed.
    pub async fn channel_feed(
        &self,
        channel_guid: &str,
        offset: &str,
        limit: u32,
    ) -> Result<PageEnvelope, Error> {
        let envelope = self
            .get_with_params(
                &format!("api/v1/newsfeed/channel/{channel_guid}"),
                &[("offset", offset.to_owned()), ("limit", limit.to_string())],
            )
            .await?;
        Self::check_envelope(envelope)
    }

    // ── Discovery ────────────────────────────────────────────────────

    /// Fetch one page of the discovery listing for an entity type.
    ///
    /// `filter` selects the ranking (`trending`, `featured`, ...).
    /// Search-mode fetches go through [`search`](Self::search) instead.
    pub async fn discovery_feed(
        &self,
        entity_type: &str,
        filter: &str,
        offset: &str,
        limit: u32,
    ) -> Result<PageEnvelope, Error> {
        let envelope = self
            .get_with_params(
                &format!("api/v2/entities/suggested/{entity_type}"),
                &[
                    ("filter", filter.to_owned()),
                    ("offset", offset.to_owned()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Self::check_envelope(envelope)
    }

    // ── Search ───────────────────────────────────────────────────────

    /// Search entities of one type. Distinct endpoint from the listing
    /// path; same page envelope, so results paginate through the
    /// returned `load-next` token like any other list.
    pub async fn search(
        &self,
        entity_type: &str,
        query: &str,
        offset: &str,
        limit: u32,
    ) -> Result<PageEnvelope, Error> {
        let envelope = self
            .get_with_params(
                "api/v2/search",
                &[
                    ("q", query.to_owned()),
                    ("type", entity_type.to_owned()),
                    ("offset", offset.to_owned()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Self::check_envelope(envelope)
    }

    // ── Messenger ────────────────────────────────────────────────────

    /// Fetch one page of the conversation list.
    pub async fn conversations(&self, limit: u32, offset: &str) -> Result<PageEnvelope, Error> {
        let envelope = self
            .get_with_params(
                "api/v2/messenger/conversations",
                &[("limit", limit.to_string()), ("offset", offset.to_owned())],
            )
            .await?;
        Self::check_envelope(envelope)
    }

    /// Search conversations by participant name. Single page, no cursor.
    pub async fn search_conversations(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<PageEnvelope, Error> {
        let envelope = self
            .get_with_params(
                "api/v2/messenger/search",
                &[("q", query.to_owned()), ("limit", limit.to_string())],
            )
            .await?;
        Self::check_envelope(envelope)
    }

    /// Unlock the messenger private key with the account password.
    ///
    /// A rejected password surfaces as [`Error::Authentication`] -- the
    /// one error the sync core forwards to the user as a blocking prompt.
    pub async fn unlock_keys(&self, password: &SecretString) -> Result<SecretString, Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            password: &'a str,
        }

        let envelope: KeysEnvelope = self
            .post(
                "api/v2/messenger/keys",
                &Body {
                    password: password.expose_secret(),
                },
            )
            .await?;

        match envelope.key {
            Some(key) if envelope.status.as_deref().is_none_or(|s| s == "success") => {
                Ok(SecretString::from(key))
            }
            _ => Err(Error::Authentication {
                message: "key unlock rejected".to_owned(),
            }),
        }
    }
}

async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    #[derive(serde::Deserialize)]
    struct ErrorResponse {
        #[serde(default)]
        message: Option<String>,
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Error::SessionExpired;
    }

    let raw = resp.text().await.unwrap_or_default();

    if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
        Error::Api {
            status: status.as_u16(),
            message: err.message.unwrap_or_else(|| status.to_string()),
        }
    } else {
        Error::Api {
            status: status.as_u16(),
            message: if raw.is_empty() { status.to_string() } else { raw },
        }
    }
}
