use moka::future::Cache;
use std::time::Duration;
use uuid::Uuid;

use super::invalidation::{invalidation_table, Mutation, QueryScope};
use crate::{
    lifecycle::SwapStatus,
    models::{ShiftAssignment, ShiftSwapRequest, SwapDirection, SwapPage},
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Query {
    List {
        direction: SwapDirection,
        page: Option<u32>,
        limit: Option<u32>,
        status: Option<SwapStatus>,
    },
    Detail(Uuid),
    Assignments { employee_id: Option<i32> },
}

impl Query {
    /// Whether this query falls in `scope`. With a `swap_id`, `Detail` only
    /// matches that request.
    pub fn in_scope(&self, scope: QueryScope, swap_id: Option<Uuid>) -> bool {
        match (self, scope) {
            (Query::List { direction, .. }, QueryScope::SentLists) => *direction == SwapDirection::Sent,
            (Query::List { direction, .. }, QueryScope::ReceivedLists) => {
                *direction == SwapDirection::Received
            }
            (Query::Detail(id), QueryScope::Detail) => swap_id.map_or(true, |swap_id| *id == swap_id),
            (Query::Assignments { .. }, QueryScope::AssignmentLists) => true,
            _ => false,
        }
    }
}

/// Entries are keyed by the viewing employee so a new login never sees the
/// previous caller's results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub viewer: i32,
    pub query: Query,
}

#[derive(Debug, Clone)]
pub enum CachedQuery {
    Page(SwapPage),
    Detail(ShiftSwapRequest),
    Assignments(Vec<ShiftAssignment>),
}

pub struct QueryCache {
    entries: Cache<QueryKey, CachedQuery>,
}

impl QueryCache {
    pub fn new(ttl: Duration, capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        Self { entries }
    }

    pub async fn get(&self, key: &QueryKey) -> Option<CachedQuery> {
        self.entries.get(key).await
    }

    pub async fn insert(&self, key: QueryKey, value: CachedQuery) {
        self.entries.insert(key, value).await;
    }

    /// Drop every entry the mutation made stale.
    pub async fn apply(&self, mutation: Mutation, swap_id: Uuid) {
        let scopes = invalidation_table(mutation);
        let invalidated = self.invalidate_matching(scopes, Some(swap_id)).await;
        tracing::debug!(?mutation, %swap_id, invalidated, "Invalidating cached queries");
    }

    /// Drop every entry in `scope`, for every request.
    pub async fn invalidate_scope(&self, scope: QueryScope) {
        let invalidated = self.invalidate_matching(&[scope], None).await;
        tracing::debug!(?scope, invalidated, "Invalidating cached scope");
    }

    async fn invalidate_matching(&self, scopes: &[QueryScope], swap_id: Option<Uuid>) -> usize {
        let stale: Vec<QueryKey> = self
            .entries
            .iter()
            .filter(|(key, _)| scopes.iter().any(|scope| key.query.in_scope(*scope, swap_id)))
            .map(|(key, _)| (*key).clone())
            .collect();

        let count = stale.len();
        for key in stale {
            self.entries.invalidate(&key).await;
        }
        count
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}
