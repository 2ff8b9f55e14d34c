//! Reduction of group-by descriptors to CSV tag columns.

use tracing::trace;

use crate::types::{GroupDescriptor, ResolvedColumns};

/// Merge the tag groupings of a result into name-ordered columns.
///
/// Descriptors are applied in order, so a tag name repeated by a later tag
/// descriptor takes the later value. Other grouping kinds are ignored.
pub fn resolve_columns(group_by: &[GroupDescriptor]) -> ResolvedColumns {
    let mut columns = ResolvedColumns::new();
    for descriptor in group_by {
        match descriptor {
            GroupDescriptor::Tag { group } => {
                for (name, value) in group {
                    columns.insert(name.as_str(), value.as_str());
                }
            }
            other => trace!(kind = other.kind(), "ignoring non-tag group-by"),
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn tag(pairs: &[(&str, &str)]) -> GroupDescriptor {
        GroupDescriptor::Tag {
            group: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_no_descriptors() {
        assert!(resolve_columns(&[]).is_empty());
    }

    #[test]
    fn test_non_tag_kinds_ignored() {
        let columns = resolve_columns(&[
            GroupDescriptor::Type,
            GroupDescriptor::Time,
            GroupDescriptor::Value,
            GroupDescriptor::Bin,
            GroupDescriptor::Unknown,
        ]);
        assert!(columns.is_empty());
    }

    #[test]
    fn test_merge_sorted_by_name() {
        let columns = resolve_columns(&[
            tag(&[("service", "clear-api")]),
            GroupDescriptor::Type,
            tag(&[("environment", "awslab"), ("az", "1a")]),
        ]);
        assert_eq!(
            columns.iter().collect::<Vec<_>>(),
            vec![("az", "1a"), ("environment", "awslab"), ("service", "clear-api")]
        );
    }

    #[test]
    fn test_later_descriptor_overwrites() {
        let columns = resolve_columns(&[tag(&[("host", "a"), ("dc", "x")]), tag(&[("host", "b")])]);
        assert_eq!(columns.get("host"), Some("b"));
        assert_eq!(columns.get("dc"), Some("x"));
        assert_eq!(columns.len(), 2);
    }
}
