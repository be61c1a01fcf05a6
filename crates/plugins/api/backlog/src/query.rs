//! Issue search query builder.

/// Parent/child filter of the issue search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentChildType {
    All,
    ExceptingChildren,
    Children,
    StandAlone,
    Parents,
}

impl ParentChildType {
    fn as_param(self) -> &'static str {
        match self {
            ParentChildType::All => "0",
            ParentChildType::ExceptingChildren => "1",
            ParentChildType::Children => "2",
            ParentChildType::StandAlone => "3",
            ParentChildType::Parents => "4",
        }
    }
}

/// Query parameters for `GET /api/v2/issues`.
///
/// Array filters (`projectId[]`, `id[]`, `parentIssueId[]`) may repeat.
///
/// ```ignore
/// let query = SearchIssueQuery::new()
///     .project_id(1)
///     .parent_issue_id(100)
///     .sort("updated");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchIssueQuery {
    params: Vec<(String, String)>,
}

impl SearchIssueQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project_id(self, id: u64) -> Self {
        self.push("projectId[]", id.to_string())
    }

    pub fn issue_id(self, id: u64) -> Self {
        self.push("id[]", id.to_string())
    }

    pub fn parent_issue_id(self, id: u64) -> Self {
        self.push("parentIssueId[]", id.to_string())
    }

    pub fn parent_child(self, kind: ParentChildType) -> Self {
        self.set("parentChild", kind.as_param())
    }

    /// Sort key, e.g. `created`, `updated`, `status`.
    pub fn sort(self, how: &str) -> Self {
        self.set("sort", how)
    }

    pub fn ascending(self, ascending: bool) -> Self {
        self.set("order", if ascending { "asc" } else { "desc" })
    }

    /// Page size, 1 to 100.
    pub fn count(self, count: u32) -> Self {
        self.set("count", count.to_string())
    }

    pub fn offset(self, offset: u32) -> Self {
        self.set("offset", offset.to_string())
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    fn push(mut self, key: &str, value: String) -> Self {
        self.params.push((key.to_string(), value));
        self
    }

    fn set(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.retain(|(k, _)| k != key);
        self.params.push((key.to_string(), value.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(query: &SearchIssueQuery) -> Vec<(&str, &str)> {
        query
            .params()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn test_array_filters_repeat() {
        let query = SearchIssueQuery::new()
            .project_id(1)
            .project_id(2)
            .issue_id(10)
            .parent_issue_id(7);

        assert_eq!(
            pairs(&query),
            [
                ("projectId[]", "1"),
                ("projectId[]", "2"),
                ("id[]", "10"),
                ("parentIssueId[]", "7"),
            ]
        );
    }

    #[test]
    fn test_scalar_params_replace() {
        let query = SearchIssueQuery::new()
            .sort("created")
            .sort("updated")
            .ascending(true)
            .count(50)
            .offset(100)
            .parent_child(ParentChildType::Parents);

        assert_eq!(
            pairs(&query),
            [
                ("sort", "updated"),
                ("order", "asc"),
                ("count", "50"),
                ("offset", "100"),
                ("parentChild", "4"),
            ]
        );
    }

    #[test]
    fn test_empty_query() {
        assert!(SearchIssueQuery::new().params().is_empty());
    }
}
