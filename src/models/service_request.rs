use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Service request identifier assigned by the backend.
pub type ServiceRequestId = i64;

/// Service request statuses this client knows about. The authoritative
/// vocabulary is backend-owned; this enum backs the fallback list and the
/// forward-transition helper.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceRequestStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl ServiceRequestStatus {
    /// Human-readable label used by the fallback vocabulary.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceRequestStatus::Pending => "Pending",
            ServiceRequestStatus::InProgress => "In Progress",
            ServiceRequestStatus::Completed => "Completed",
            ServiceRequestStatus::Cancelled => "Cancelled",
        }
    }

    /// The next forward transition exposed by this client, if any.
    /// `completed` is terminal and `cancelled` is absorbing; the backend
    /// may support more transitions but the admin UI only moves forward.
    pub fn next_forward(&self) -> Option<ServiceRequestStatus> {
        match self {
            ServiceRequestStatus::Pending => Some(ServiceRequestStatus::InProgress),
            ServiceRequestStatus::InProgress => Some(ServiceRequestStatus::Completed),
            ServiceRequestStatus::Completed | ServiceRequestStatus::Cancelled => None,
        }
    }
}

/// Descriptor for a warehouse-performed service (e.g. repackaging).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub is_active: bool,
    pub description: Option<String>,
}

/// A customer's request for a warehouse service on one package.
/// Created by the backend; this client only advances its status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: ServiceRequestId,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub service: Service,
}

impl ServiceRequest {
    /// Parses the status into a known value, if it is one.
    pub fn known_status(&self) -> Option<ServiceRequestStatus> {
        self.status.parse().ok()
    }
}

/// Partial update for a service request. `None` fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServiceRequestUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ServiceRequestUpdate {
    /// Shorthand for a status-only transition.
    pub fn status(status: ServiceRequestStatus) -> Self {
        Self {
            status: Some(status.to_string()),
            notes: None,
        }
    }
}
