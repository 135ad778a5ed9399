/// A mutating call the client can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Create,
    Respond,
    Cancel,
    Complete,
}

/// A family of cached queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryScope {
    SentLists,
    ReceivedLists,
    /// The detail entry of the request the mutation touched.
    Detail,
    AssignmentLists,
}

/// Which cached queries a successful mutation makes stale.
pub fn invalidation_table(mutation: Mutation) -> &'static [QueryScope] {
    match mutation {
        Mutation::Create => &[QueryScope::SentLists],
        Mutation::Respond => &[
            QueryScope::ReceivedLists,
            QueryScope::Detail,
            QueryScope::AssignmentLists,
        ],
        Mutation::Cancel => &[QueryScope::SentLists, QueryScope::Detail],
        Mutation::Complete => &[
            QueryScope::SentLists,
            QueryScope::ReceivedLists,
            QueryScope::Detail,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_only_touches_sent_lists() {
        assert_eq!(invalidation_table(Mutation::Create), &[QueryScope::SentLists]);
    }

    #[test]
    fn test_respond_touches_received_detail_and_assignments() {
        let scopes = invalidation_table(Mutation::Respond);
        assert!(scopes.contains(&QueryScope::ReceivedLists));
        assert!(scopes.contains(&QueryScope::Detail));
        assert!(scopes.contains(&QueryScope::AssignmentLists));
        assert!(!scopes.contains(&QueryScope::SentLists));
    }

    #[test]
    fn test_cancel_leaves_received_lists_alone() {
        let scopes = invalidation_table(Mutation::Cancel);
        assert_eq!(scopes, &[QueryScope::SentLists, QueryScope::Detail]);
    }

    #[test]
    fn test_complete_never_touches_assignments() {
        assert!(!invalidation_table(Mutation::Complete).contains(&QueryScope::AssignmentLists));
    }
}
