// ── Fetch seam ──
//
// The narrow contract the stores require from the HTTP layer: one
// paginated listing request, one search request, and the messenger
// key-unlock call. `ApiClient` implements it for production; tests
// substitute in-memory fakes.

use std::future::Future;

use driftline_api::{Error, PageEnvelope};
use secrecy::SecretString;

use crate::list::ListKind;
use crate::model::Guid;

/// Context of one paginated listing fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageQuery {
    /// A channel's activity feed.
    ChannelFeed { channel: Guid },
    /// One discovery tab under a ranking filter.
    Discovery { kind: ListKind, filter: String },
    /// The messenger conversation list.
    Conversations,
}

/// One listing request: context plus cursor position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: PageQuery,
    /// Cursor token; empty fetches from the beginning.
    pub offset: String,
    pub limit: u32,
}

/// Scope of a search fetch (the distinct search endpoints).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchScope {
    /// Entity search within one list kind.
    Entities(ListKind),
    /// Conversation search by participant name.
    Conversations,
}

/// One search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub scope: SearchScope,
    pub query: String,
    pub offset: String,
    pub limit: u32,
}

/// What the stores need from the HTTP layer.
pub trait FetchClient: Send + Sync {
    /// Fetch one page of a listing.
    fn fetch_page(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<PageEnvelope, Error>> + Send;

    /// Fetch one page of search results (distinct endpoint from the
    /// listing path).
    fn fetch_search(
        &self,
        request: SearchRequest,
    ) -> impl Future<Output = Result<PageEnvelope, Error>> + Send;

    /// Unlock the messenger private key with the account password.
    fn fetch_private_key(
        &self,
        password: &SecretString,
    ) -> impl Future<Output = Result<SecretString, Error>> + Send;
}

impl FetchClient for driftline_api::ApiClient {
    async fn fetch_page(&self, request: PageRequest) -> Result<PageEnvelope, Error> {
        match &request.query {
            PageQuery::ChannelFeed { channel } => {
                self.channel_feed(channel.as_str(), &request.offset, request.limit)
                    .await
            }
            PageQuery::Discovery { kind, filter } => {
                // Non-fetchable kinds are filtered out by the stores
                // before a request is ever built.
                let api_type = kind.api_type().unwrap_or("activity");
                self.discovery_feed(api_type, filter, &request.offset, request.limit)
                    .await
            }
            PageQuery::Conversations => self.conversations(request.limit, &request.offset).await,
        }
    }

    async fn fetch_search(&self, request: SearchRequest) -> Result<PageEnvelope, Error> {
        match request.scope {
            SearchScope::Entities(kind) => {
                let api_type = kind.api_type().unwrap_or("activity");
                self.search(api_type, &request.query, &request.offset, request.limit)
                    .await
            }
            SearchScope::Conversations => {
                self.search_conversations(&request.query, request.limit)
                    .await
            }
        }
    }

    async fn fetch_private_key(&self, password: &SecretString) -> Result<SecretString, Error> {
        self.unlock_keys(password).await
    }
}
