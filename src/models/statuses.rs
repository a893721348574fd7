use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use super::package::PackageStatus;
use super::service_request::ServiceRequestStatus;

/// One entry of a status vocabulary: the wire value plus a display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOption {
    pub value: String,
    pub label: String,
}

impl StatusOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A status vocabulary as used by the admin views. Normally fetched from
/// the backend; `from_fallback` is set when the fetch failed and the
/// hardcoded list is standing in (degraded but functional).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusVocabulary {
    pub options: Vec<StatusOption>,
    pub from_fallback: bool,
}

impl StatusVocabulary {
    pub fn fetched(options: Vec<StatusOption>) -> Self {
        Self {
            options,
            from_fallback: false,
        }
    }

    /// The hardcoded package status list, used only when the backend
    /// vocabulary cannot be fetched.
    pub fn package_fallback() -> Self {
        Self {
            options: PackageStatus::iter()
                .map(|s| StatusOption::new(s.to_string(), s.label()))
                .collect(),
            from_fallback: true,
        }
    }

    /// The hardcoded service request status list.
    pub fn service_request_fallback() -> Self {
        Self {
            options: ServiceRequestStatus::iter()
                .map(|s| StatusOption::new(s.to_string(), s.label()))
                .collect(),
            from_fallback: true,
        }
    }

    /// Returns true when the vocabulary contains the given wire value.
    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}
