//! Capability enumeration and sets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A right a principal can hold on a chain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Read the chain: detail, download, compare.
    View,
    /// Append new versions to the chain.
    Edit,
}

impl Capability {
    /// Return the capability as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Capability {
    type Err = docvault_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "view" => Ok(Self::View),
            "edit" => Ok(Self::Edit),
            _ => Err(docvault_core::AppError::validation(format!(
                "Invalid capability: '{s}'"
            ))),
        }
    }
}

/// The capabilities one principal holds on one chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    /// View granted.
    pub view: bool,
    /// Edit granted.
    pub edit: bool,
}

impl CapabilitySet {
    /// Both capabilities, as the owner implicitly holds them.
    pub const FULL: Self = Self {
        view: true,
        edit: true,
    };

    /// Build a set from stored grants.
    pub fn from_grants(grants: impl IntoIterator<Item = Capability>) -> Self {
        grants.into_iter().fold(Self::default(), |mut set, cap| {
            set.insert(cap);
            set
        })
    }

    /// Add a capability.
    pub fn insert(&mut self, capability: Capability) {
        match capability {
            Capability::View => self.view = true,
            Capability::Edit => self.edit = true,
        }
    }

    /// Whether the set contains a capability.
    pub fn contains(&self, capability: Capability) -> bool {
        match capability {
            Capability::View => self.view,
            Capability::Edit => self.edit,
        }
    }

    /// Whether no capability is held.
    pub fn is_empty(&self) -> bool {
        !self.view && !self.edit
    }

    /// The held capabilities in `view`, `edit` order.
    pub fn to_vec(&self) -> Vec<Capability> {
        [Capability::View, Capability::Edit]
            .into_iter()
            .filter(|c| self.contains(*c))
            .collect()
    }
}

impl Serialize for CapabilitySet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_vec().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CapabilitySet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Capability>::deserialize(deserializer).map(Self::from_grants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("VIEW".parse::<Capability>().expect("parse"), Capability::View);
        assert!("delete".parse::<Capability>().is_err());
    }

    #[test]
    fn test_set_serializes_as_list() {
        let set = CapabilitySet::from_grants([Capability::Edit, Capability::View]);
        let json = serde_json::to_string(&set).expect("serialize");
        assert_eq!(json, r#"["view","edit"]"#);
        assert!(CapabilitySet::default().is_empty());
    }
}
