//! HTTP consumer of the shift-swap API.
//!
//! [`SwapClient`] issues each lifecycle call as-is and leaves every rule to
//! the service. Reads go through a [`QueryCache`]; a mutation that succeeds
//! invalidates the scopes listed by [`invalidation_table`].

pub mod cache;
pub mod error;
pub mod invalidation;
pub mod session;

pub use cache::{CachedQuery, Query, QueryCache, QueryKey};
pub use error::ClientError;
pub use invalidation::{invalidation_table, Mutation, QueryScope};
pub use session::{Session, SessionState};

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::{
    lifecycle::SwapStatus,
    models::{
        CreateShiftSwapInput, RespondShiftSwapInput, ShiftAssignment, ShiftSwapRequest, SwapDashboard,
        SwapDirection, SwapPage,
    },
};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Including the `/api` prefix, e.g. `http://localhost:8080/api`.
    pub base_url: String,
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            cache_ttl: Duration::from_secs(60),
            cache_capacity: 1000,
        }
    }
}

/// Parameters of a list call; `None` leaves the service default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    pub direction: SwapDirection,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<SwapStatus>,
}

impl ListParams {
    pub fn new(direction: SwapDirection) -> Self {
        Self {
            direction,
            page: None,
            limit: None,
            status: None,
        }
    }

    fn to_pairs(self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("type", self.direction.as_str().to_string())];
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        pairs
    }
}

pub struct SwapClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
    cache: QueryCache,
}

impl SwapClient {
    pub fn new(config: ClientConfig, session: Arc<Session>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            cache: QueryCache::new(config.cache_ttl, config.cache_capacity),
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Forget every cached query in `scope`, so the next read goes to the service.
    pub async fn invalidate(&self, scope: QueryScope) {
        self.cache.invalidate_scope(scope).await;
    }

    /// End the session and forget everything cached under it.
    pub async fn logout(&self) {
        self.session.logout().await;
        self.cache.clear();
    }

    pub async fn create(&self, input: &CreateShiftSwapInput) -> Result<ShiftSwapRequest, ClientError> {
        let session = self.require_session().await?;
        let swap: ShiftSwapRequest = self
            .send(&session, Method::POST, "/shift-swaps", |rb| rb.json(input))
            .await?;
        self.cache.apply(Mutation::Create, swap.id).await;
        Ok(swap)
    }

    pub async fn respond(
        &self,
        id: Uuid,
        input: &RespondShiftSwapInput,
    ) -> Result<ShiftSwapRequest, ClientError> {
        let session = self.require_session().await?;
        let swap = self
            .send(&session, Method::PATCH, &format!("/shift-swaps/{}/respond", id), |rb| rb.json(input))
            .await?;
        self.cache.apply(Mutation::Respond, id).await;
        Ok(swap)
    }

    pub async fn cancel(&self, id: Uuid) -> Result<ShiftSwapRequest, ClientError> {
        let session = self.require_session().await?;
        let swap = self
            .send(&session, Method::PATCH, &format!("/shift-swaps/{}/cancel", id), |rb| rb)
            .await?;
        self.cache.apply(Mutation::Cancel, id).await;
        Ok(swap)
    }

    pub async fn complete(&self, id: Uuid) -> Result<ShiftSwapRequest, ClientError> {
        let session = self.require_session().await?;
        let swap = self
            .send(&session, Method::PATCH, &format!("/shift-swaps/{}/complete", id), |rb| rb)
            .await?;
        self.cache.apply(Mutation::Complete, id).await;
        Ok(swap)
    }

    pub async fn get(&self, id: Uuid) -> Result<ShiftSwapRequest, ClientError> {
        self.fetch_detail(id, false).await
    }

    /// Like [`Self::get`], but always asks the service and replaces the cached entry.
    pub async fn refresh(&self, id: Uuid) -> Result<ShiftSwapRequest, ClientError> {
        self.fetch_detail(id, true).await
    }

    async fn fetch_detail(&self, id: Uuid, fresh: bool) -> Result<ShiftSwapRequest, ClientError> {
        let session = self.require_session().await?;
        let key = QueryKey {
            viewer: session.employee_id,
            query: Query::Detail(id),
        };
        if !fresh {
            if let Some(CachedQuery::Detail(swap)) = self.cache.get(&key).await {
                return Ok(swap);
            }
        }

        let swap: ShiftSwapRequest = self
            .send(&session, Method::GET, &format!("/shift-swaps/{}", id), |rb| rb)
            .await?;
        self.cache.insert(key, CachedQuery::Detail(swap.clone())).await;
        Ok(swap)
    }

    pub async fn list(&self, params: ListParams) -> Result<SwapPage, ClientError> {
        self.fetch_list(params, false).await
    }

    /// Like [`Self::list`], but always asks the service. Changes made by the
    /// other party (a response, a cancel) only show up through a refetch.
    pub async fn refresh_list(&self, params: ListParams) -> Result<SwapPage, ClientError> {
        self.fetch_list(params, true).await
    }

    async fn fetch_list(&self, params: ListParams, fresh: bool) -> Result<SwapPage, ClientError> {
        let session = self.require_session().await?;
        let key = QueryKey {
            viewer: session.employee_id,
            query: Query::List {
                direction: params.direction,
                page: params.page,
                limit: params.limit,
                status: params.status,
            },
        };
        if !fresh {
            if let Some(CachedQuery::Page(page)) = self.cache.get(&key).await {
                tracing::debug!(direction = params.direction.as_str(), "Serving swap list from cache");
                return Ok(page);
            }
        }

        let pairs = params.to_pairs();
        let page: SwapPage = self
            .send(&session, Method::GET, "/shift-swaps", |rb| rb.query(&pairs))
            .await?;
        self.cache.insert(key, CachedQuery::Page(page.clone())).await;
        Ok(page)
    }

    /// Active assignments of `employee_id`, or of the caller when `None`.
    pub async fn assignments(&self, employee_id: Option<i32>) -> Result<Vec<ShiftAssignment>, ClientError> {
        let session = self.require_session().await?;
        let key = QueryKey {
            viewer: session.employee_id,
            query: Query::Assignments { employee_id },
        };
        if let Some(CachedQuery::Assignments(assignments)) = self.cache.get(&key).await {
            return Ok(assignments);
        }

        let assignments: Vec<ShiftAssignment> = self
            .send(&session, Method::GET, "/shift-assignments", |rb| match employee_id {
                Some(id) => rb.query(&[("employeeId", id)]),
                None => rb,
            })
            .await?;
        self.cache
            .insert(key, CachedQuery::Assignments(assignments.clone()))
            .await;
        Ok(assignments)
    }

    /// Pending counts change with every mutation, so they are never cached.
    pub async fn dashboard(&self) -> Result<SwapDashboard, ClientError> {
        let session = self.require_session().await?;
        self.send(&session, Method::GET, "/shift-swaps/dashboard", |rb| rb).await
    }

    async fn require_session(&self) -> Result<SessionState, ClientError> {
        self.session.current().await.ok_or_else(ClientError::no_session)
    }

    async fn send<T, F>(&self, session: &SessionState, method: Method, path: &str, build: F) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = format!("{}{}", self.base_url, path);
        let request = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(&session.access_token);

        let response = build(request).send().await.map_err(|e| {
            tracing::error!(error = %e, %method, url = %url, "Shift swap request failed");
            ClientError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ClientError::from_response(status, &body);
            tracing::warn!(status = %status, %method, url = %url, error = %err.message, "Shift swap API returned error");
            return Err(err);
        }

        Ok(response.json().await?)
    }
}
