//! VM Selection
//!
//! memuc addresses a VM either by index (`-i`) or by name (`-n`).

use serde::{Deserialize, Serialize};

/// Selector validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("Please specify either a vm index or a vm name, not both (index {index}, name {name:?})")]
    Conflicting { index: u32, name: String },
    #[error("Please specify either a vm index or a vm name")]
    Missing,
    #[error("VM name must not be empty")]
    EmptyName,
}

/// Caller-supplied VM target, validated into a [`VmSelector`] before use
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmTarget {
    pub index: Option<u32>,
    pub name: Option<String>,
}

impl VmTarget {
    /// Target a VM by index
    pub fn index(index: u32) -> Self {
        Self {
            index: Some(index),
            name: None,
        }
    }

    /// Target a VM by name
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            index: None,
            name: Some(name.into()),
        }
    }

    /// Resolve into exactly one selector
    pub fn resolve(&self) -> Result<VmSelector, SelectorError> {
        match (self.index, self.name.as_deref()) {
            (Some(index), Some(name)) => Err(SelectorError::Conflicting {
                index,
                name: name.to_string(),
            }),
            (Some(index), None) => Ok(VmSelector::Index(index)),
            (None, Some(name)) if name.trim().is_empty() => Err(SelectorError::EmptyName),
            (None, Some(name)) => Ok(VmSelector::Name(name.to_string())),
            (None, None) => Err(SelectorError::Missing),
        }
    }
}

impl From<u32> for VmTarget {
    fn from(index: u32) -> Self {
        VmTarget::index(index)
    }
}

impl From<&str> for VmTarget {
    fn from(name: &str) -> Self {
        VmTarget::name(name)
    }
}

impl From<String> for VmTarget {
    fn from(name: String) -> Self {
        VmTarget::name(name)
    }
}

impl From<VmSelector> for VmTarget {
    fn from(selector: VmSelector) -> Self {
        match selector {
            VmSelector::Index(index) => VmTarget::index(index),
            VmSelector::Name(name) => VmTarget::name(name),
        }
    }
}

/// A validated VM selector
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VmSelector {
    Index(u32),
    Name(String),
}

impl VmSelector {
    /// The flag/value token pair memuc expects
    pub fn to_args(&self) -> [String; 2] {
        match self {
            VmSelector::Index(index) => ["-i".to_string(), index.to_string()],
            VmSelector::Name(name) => ["-n".to_string(), name.clone()],
        }
    }
}

impl std::fmt::Display for VmSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VmSelector::Index(index) => write!(f, "index {}", index),
            VmSelector::Name(name) => write!(f, "name {:?}", name),
        }
    }
}
