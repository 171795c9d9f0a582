use std::collections::BTreeMap;

use crate::api::QueryParams;

/// ListQuery
///
/// The full filter set of one list page: free-text search, the selected value of each filter
/// dropdown, and an optional page size. It is always sent whole, never as a diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: String,
    pub filters: BTreeMap<String, String>,
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Selects a filter value. An empty value means "no constraint" and removes the key.
    pub fn set_filter(&mut self, key: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.filters.remove(key);
        } else {
            self.filters.insert(key.to_string(), value.to_string());
        }
    }

    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    /// Resets the search term and every filter. The page size is not a filter and survives.
    pub fn clear(&mut self) {
        self.search.clear();
        self.filters.clear();
    }

    pub fn is_unfiltered(&self) -> bool {
        self.search.trim().is_empty() && self.filters.is_empty()
    }

    /// to_params
    ///
    /// Wire form of the query. Empty values are omitted entirely: an absent parameter is "no
    /// constraint" to the server, while an empty one could be read as "match the empty string".
    pub fn to_params(&self) -> QueryParams {
        let mut params = Vec::with_capacity(self.filters.len() + 2);
        let search = self.search.trim();
        if !search.is_empty() {
            params.push(("search".to_string(), search.to_string()));
        }
        for (key, value) in &self.filters {
            params.push((key.clone(), value.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_are_not_sent() {
        let mut query = ListQuery::default();
        query.search = "   ".into();
        query.set_filter("department_id", "");
        assert!(query.to_params().is_empty());
        assert!(query.is_unfiltered());
    }

    #[test]
    fn full_filter_set_is_sent() {
        let mut query = ListQuery::with_limit(50);
        query.search = " lan ".into();
        query.set_filter("department_id", "3");
        query.set_filter("status", "Thử việc");
        assert_eq!(
            query.to_params(),
            vec![
                ("search".to_string(), "lan".to_string()),
                ("department_id".to_string(), "3".to_string()),
                ("status".to_string(), "Thử việc".to_string()),
                ("limit".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn clear_keeps_the_limit() {
        let mut query = ListQuery::with_limit(10);
        query.search = "x".into();
        query.set_filter("role", "Admin");
        query.clear();
        assert!(query.is_unfiltered());
        assert_eq!(query.limit, Some(10));
    }

    #[test]
    fn blank_value_removes_a_filter() {
        let mut query = ListQuery::default();
        query.set_filter("position_id", "2");
        query.set_filter("position_id", " ");
        assert_eq!(query.filter("position_id"), None);
    }
}
