//! Query construction for the entries and comments endpoints.
//!
//! The service expects structured queries flattened into plain key-value
//! parameters: one `Filter{N}` key per predicate (1-based; the service
//! combines predicates in the order given, so input order is preserved),
//! a `match` mode alongside them, and `pageSize`/`pageStart`/`sort`/
//! `sortDirection`/`system` keys for the rest. Building is pure; the
//! dispatcher attaches the result to the request URL.

/// How multiple filters are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMatch {
    /// Entries must satisfy every filter.
    #[default]
    And,
    /// Entries must satisfy at least one filter.
    Or,
}

impl FilterMatch {
    fn as_str(self) -> &'static str {
        match self {
            FilterMatch::And => "AND",
            FilterMatch::Or => "OR",
        }
    }
}

/// A single entry predicate: field, operator, value.
///
/// Operators are the service's own names, e.g. `Is_equal_to` or
/// `Is_after`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub operator: String,
    pub value: String,
}

impl Filter {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// The wire form: the three parts joined by single spaces.
    fn serialize(&self) -> String {
        format!("{} {} {}", self.field, self.operator, self.value)
    }
}

/// Options for listing or counting form entries.
///
/// ```
/// use formhive::{EntriesQuery, FilterMatch};
///
/// let query = EntriesQuery::new()
///     .filter("Field1", "Is_equal_to", "Tim")
///     .filter_match(FilterMatch::Or)
///     .sort("EntryId DESC")
///     .limit(25);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntriesQuery {
    filters: Vec<Filter>,
    filter_match: FilterMatch,
    sort: Option<String>,
    limit: Option<u32>,
    page_start: Option<u32>,
    system: bool,
}

impl EntriesQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter predicate. Order is preserved on the wire.
    pub fn filter(
        mut self,
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.filters.push(Filter::new(field, operator, value));
        self
    }

    /// Set how filters combine. Ignored when no filters are present.
    pub fn filter_match(mut self, filter_match: FilterMatch) -> Self {
        self.filter_match = filter_match;
        self
    }

    /// Sort specification: `"<field> <direction>"`, direction optional
    /// and `ASC` when omitted.
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Page size.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Page start offset. Emitted only when set; the service applies its
    /// own default otherwise.
    pub fn page_start(mut self, page_start: u32) -> Self {
        self.page_start = Some(page_start);
        self
    }

    /// Include system fields in returned entries.
    pub fn system(mut self, system: bool) -> Self {
        self.system = system;
        self
    }

    /// Flatten into query parameters for the entries endpoint.
    pub(crate) fn to_params(&self) -> Vec<(String, String)> {
        let mut params = self.filter_params();

        if let Some(limit) = self.limit {
            params.push(("pageSize".into(), limit.to_string()));
        }
        if let Some(page_start) = self.page_start {
            params.push(("pageStart".into(), page_start.to_string()));
        }
        if self.system {
            params.push(("system".into(), "true".into()));
        }
        if let Some(sort) = &self.sort {
            let (field, direction) = match sort.split_once(' ') {
                Some((field, direction)) => (field, direction),
                None => (sort.as_str(), "ASC"),
            };
            params.push(("sort".into(), field.into()));
            params.push(("sortDirection".into(), direction.into()));
        }

        params
    }

    /// Flatten into query parameters for the count endpoint, which only
    /// understands filters and the system toggle.
    pub(crate) fn count_params(&self) -> Vec<(String, String)> {
        let mut params = self.filter_params();
        if self.system {
            params.push(("system".into(), "true".into()));
        }
        params
    }

    fn filter_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if !self.filters.is_empty() {
            params.push(("match".into(), self.filter_match.as_str().into()));
            for (index, filter) in self.filters.iter().enumerate() {
                params.push((format!("Filter{}", index + 1), filter.serialize()));
            }
        }
        params
    }
}

/// Options for listing form comments.
#[derive(Debug, Clone, Default)]
pub struct CommentsQuery {
    entry_id: Option<u64>,
    page_start: Option<u32>,
    page_size: Option<u32>,
}

impl CommentsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only comments on the given entry.
    pub fn entry_id(mut self, entry_id: u64) -> Self {
        self.entry_id = Some(entry_id);
        self
    }

    /// Page start offset.
    pub fn page_start(mut self, page_start: u32) -> Self {
        self.page_start = Some(page_start);
        self
    }

    /// Page size.
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub(crate) fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(entry_id) = self.entry_id {
            params.push(("entryId".into(), entry_id.to_string()));
        }
        if let Some(page_start) = self.page_start {
            params.push(("pageStart".into(), page_start.to_string()));
        }
        if let Some(page_size) = self.page_size {
            params.push(("pageSize".into(), page_size.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(query: &EntriesQuery) -> Vec<(String, String)> {
        query.to_params()
    }

    #[test]
    fn empty_query_has_no_params() {
        assert!(params(&EntriesQuery::new()).is_empty());
    }

    #[test]
    fn filters_are_numbered_in_order() {
        let query = EntriesQuery::new()
            .filter("Field1", "Is_equal_to", "Tim")
            .filter("Field2", "Is_equal_to", "Morgan");
        assert_eq!(
            params(&query),
            vec![
                ("match".to_string(), "AND".to_string()),
                ("Filter1".to_string(), "Field1 Is_equal_to Tim".to_string()),
                ("Filter2".to_string(), "Field2 Is_equal_to Morgan".to_string()),
            ]
        );
    }

    #[test]
    fn match_mode_defaults_to_and() {
        let query = EntriesQuery::new().filter("Field1", "Is_equal_to", "Tim");
        assert!(params(&query).contains(&("match".to_string(), "AND".to_string())));

        let query = query.filter_match(FilterMatch::Or);
        assert!(params(&query).contains(&("match".to_string(), "OR".to_string())));
    }

    #[test]
    fn match_mode_omitted_without_filters() {
        let query = EntriesQuery::new().filter_match(FilterMatch::Or).limit(5);
        assert_eq!(
            params(&query),
            vec![("pageSize".to_string(), "5".to_string())]
        );
    }

    #[test]
    fn sort_splits_field_and_direction() {
        let query = EntriesQuery::new().sort("Name DESC");
        assert_eq!(
            params(&query),
            vec![
                ("sort".to_string(), "Name".to_string()),
                ("sortDirection".to_string(), "DESC".to_string()),
            ]
        );
    }

    #[test]
    fn sort_direction_defaults_to_ascending() {
        let query = EntriesQuery::new().sort("Name");
        assert_eq!(
            params(&query),
            vec![
                ("sort".to_string(), "Name".to_string()),
                ("sortDirection".to_string(), "ASC".to_string()),
            ]
        );
    }

    #[test]
    fn page_start_only_when_supplied() {
        let query = EntriesQuery::new().limit(10);
        assert!(!params(&query).iter().any(|(key, _)| key == "pageStart"));

        let query = query.page_start(0);
        assert!(params(&query).contains(&("pageStart".to_string(), "0".to_string())));
    }

    #[test]
    fn system_toggle() {
        let query = EntriesQuery::new().system(true);
        assert_eq!(
            params(&query),
            vec![("system".to_string(), "true".to_string())]
        );
    }

    #[test]
    fn count_params_ignore_paging_and_sort() {
        let query = EntriesQuery::new()
            .filter("Field1", "Is_equal_to", "Tim")
            .sort("EntryId DESC")
            .limit(5)
            .page_start(10)
            .system(true);
        assert_eq!(
            query.count_params(),
            vec![
                ("match".to_string(), "AND".to_string()),
                ("Filter1".to_string(), "Field1 Is_equal_to Tim".to_string()),
                ("system".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn comments_query_params() {
        let query = CommentsQuery::new().entry_id(123).page_size(5);
        assert_eq!(
            query.to_params(),
            vec![
                ("entryId".to_string(), "123".to_string()),
                ("pageSize".to_string(), "5".to_string()),
            ]
        );
    }
}
