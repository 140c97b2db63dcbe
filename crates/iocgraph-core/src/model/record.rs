//! Indicator records.

#![allow(clippy::module_name_repetitions, clippy::missing_const_for_fn)]

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Advisory role attached to a record by the extraction layer.
///
/// The role is never derived here; it only drives nesting eligibility and
/// directional validation in [`crate::graph::hierarchy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Parent,
    Child,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parent => f.write_str("parent"),
            Self::Child => f.write_str("child"),
        }
    }
}

/// One parsed indicator of compromise.
///
/// Only `id`, `time` and `is_child` are interpreted by the engine. Every
/// other field, including presentation hints the core does not know about,
/// is carried through unchanged in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorRecord {
    pub id: String,
    #[serde(rename = "type", default)]
    pub ioc_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tactic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technique: Option<String>,
    #[serde(default)]
    pub is_child: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl IndicatorRecord {
    /// Create a parent-role record with only an id and a type tag.
    pub fn new(id: impl Into<String>, ioc_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ioc_type: ioc_type.into(),
            value: None,
            time: None,
            tactic: None,
            technique: None,
            is_child: false,
            extra: BTreeMap::new(),
        }
    }

    /// Builder-style setter for the indicator value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Builder-style setter for the time attribute.
    #[must_use]
    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    /// Builder-style setter for the role flag.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.is_child = matches!(role, Role::Child);
        self
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        if self.is_child { Role::Child } else { Role::Parent }
    }

    #[must_use]
    pub const fn is_parent(&self) -> bool {
        !self.is_child
    }

    /// Short label used by compact renderers: the value when present,
    /// otherwise the id.
    #[must_use]
    pub fn display_value(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.id)
    }
}
