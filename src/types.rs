//! Core types for KairosDB query results.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::value::DataPointValue;

/// A single sample in a time series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DataPoint {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Sample value.
    pub value: DataPointValue,
}

impl DataPoint {
    /// Create a new data point.
    pub fn new(timestamp: i64, value: DataPointValue) -> Self {
        Self { timestamp, value }
    }
}

/// One entry of a query result's `group_by` list.
///
/// Descriptors are discriminated by their `name` field. Only tag groupings
/// carry content the converter uses; the other kinds are recognized so they
/// can be skipped without failing the conversion.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum GroupDescriptor {
    /// Grouping by tag, with the tag values of this series.
    Tag {
        /// Tag name to tag value.
        group: BTreeMap<String, String>,
    },
    /// Grouping by data point type.
    Type,
    /// Grouping by time range.
    Time,
    /// Grouping by value range.
    Value,
    /// Grouping by value bins.
    Bin,
    /// Any grouping kind this crate does not know about.
    #[serde(other)]
    Unknown,
}

impl GroupDescriptor {
    /// Discriminator name as it appears in the query response.
    pub fn kind(&self) -> &'static str {
        match self {
            GroupDescriptor::Tag { .. } => "tag",
            GroupDescriptor::Type => "type",
            GroupDescriptor::Time => "time",
            GroupDescriptor::Value => "value",
            GroupDescriptor::Bin => "bin",
            GroupDescriptor::Unknown => "unknown",
        }
    }
}

/// One decoded entry of a query's `results` array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryResult {
    /// Metric name.
    pub name: String,
    /// Data points in source order.
    pub data_points: Vec<DataPoint>,
    /// Group-by descriptors in source order.
    pub group_by: Vec<GroupDescriptor>,
}

impl QueryResult {
    /// Create an empty result for the given metric.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Tag name/value pairs of one result, ordered by tag name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedColumns {
    tags: BTreeMap<String, String>,
}

impl ResolvedColumns {
    /// Create an empty set of columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag, replacing any earlier value for the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(name.into(), value.into());
    }

    /// Get a tag value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    /// Tag names in ascending order.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// `(name, value)` pairs in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Mutable access to the values, in ascending name order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut String)> {
        self.tags.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of distinct tag names.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true if the result had no tag grouping.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResolvedColumns {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut columns = Self::new();
        for (name, value) in iter {
            columns.insert(name, value);
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_columns_sorted() {
        let columns: ResolvedColumns = [("svc", "api"), ("env", "prod"), ("az", "b")]
            .into_iter()
            .collect();
        assert_eq!(columns.tag_names().collect::<Vec<_>>(), vec!["az", "env", "svc"]);
        assert_eq!(columns.get("env"), Some("prod"));
        assert_eq!(columns.get("host"), None);
        assert_eq!(columns.len(), 3);
    }

    #[test]
    fn test_resolved_columns_last_write_wins() {
        let mut columns = ResolvedColumns::new();
        columns.insert("host", "a");
        columns.insert("host", "b");
        assert_eq!(columns.len(), 1);
        assert_eq!(columns.get("host"), Some("b"));
    }

    #[test]
    fn test_group_descriptor_kinds() {
        let tag = GroupDescriptor::Tag {
            group: BTreeMap::new(),
        };
        assert_eq!(tag.kind(), "tag");
        assert_eq!(GroupDescriptor::Bin.kind(), "bin");
        assert_eq!(GroupDescriptor::Unknown.kind(), "unknown");
    }

    #[test]
    fn test_group_descriptor_deserialize() {
        let tag: GroupDescriptor = serde_json::from_str(
            r#"{"name": "tag", "tags": ["host"], "group": {"host": "server1"}}"#,
        )
        .unwrap();
        assert_eq!(
            tag,
            GroupDescriptor::Tag {
                group: BTreeMap::from([("host".to_string(), "server1".to_string())]),
            }
        );

        let kind: GroupDescriptor =
            serde_json::from_str(r#"{"name": "type", "type": "number"}"#).unwrap();
        assert_eq!(kind, GroupDescriptor::Type);

        let other: GroupDescriptor =
            serde_json::from_str(r#"{"name": "rollup", "group": {"x": 1}}"#).unwrap();
        assert_eq!(other, GroupDescriptor::Unknown);
    }

    #[test]
    fn test_tag_descriptor_requires_group() {
        let err = serde_json::from_str::<GroupDescriptor>(r#"{"name": "tag"}"#);
        assert!(err.is_err());
    }
}
