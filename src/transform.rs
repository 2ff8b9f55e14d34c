//! Optional upper/lower-casing of selected tag values.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::ResolvedColumns;

/// Case change applied to tag values.
///
/// Parsed case-insensitively, both on the command line and in configuration
/// files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum CaseAction {
    /// Convert to lowercase.
    #[default]
    Lowercase,
    /// Convert to uppercase.
    Uppercase,
}

impl FromStr for CaseAction {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.eq_ignore_ascii_case("lowercase") {
            Ok(Self::Lowercase)
        } else if input.eq_ignore_ascii_case("uppercase") {
            Ok(Self::Uppercase)
        } else {
            Err(Error::Config(format!(
                "unknown case action '{}', expected lowercase or uppercase",
                input
            )))
        }
    }
}

impl TryFrom<String> for CaseAction {
    type Error = Error;

    fn try_from(input: String) -> Result<Self, Self::Error> {
        input.parse()
    }
}

impl std::fmt::Display for CaseAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CaseAction::Lowercase => "lowercase",
            CaseAction::Uppercase => "uppercase",
        };
        write!(f, "{}", s)
    }
}

/// Changes the case of the values of the listed tags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagTransform {
    /// Case change to apply.
    pub action: CaseAction,
    /// Tags whose values are changed. Must not be empty.
    pub tag_names: Vec<String>,
}

impl TagTransform {
    /// Create a transform for the given tags.
    pub fn new(action: CaseAction, tag_names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            action,
            tag_names: tag_names.into_iter().map(Into::into).collect(),
        }
    }

    /// Reject a transform that would not touch any tag.
    pub fn validate(&self) -> Result<(), Error> {
        if self.tag_names.is_empty() {
            return Err(Error::Config("tag names cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Apply the case change to `columns` in place.
    pub fn apply(&self, columns: &mut ResolvedColumns) {
        for (name, value) in columns.iter_mut() {
            if self.tag_names.iter().any(|t| t == name) {
                *value = match self.action {
                    CaseAction::Lowercase => value.to_lowercase(),
                    CaseAction::Uppercase => value.to_uppercase(),
                };
            }
        }
    }
}
