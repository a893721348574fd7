use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, EnumString};
use validator::Validate;

use super::service_request::ServiceRequest;

/// Package identifier assigned by the backend.
pub type PackageId = i64;
/// Mailbox owner identifier.
pub type UserId = i64;
/// Warehouse identifier.
pub type WarehouseId = i64;

/// Package statuses this client knows about. The authoritative vocabulary
/// is fetched from the backend at load time; this enum only backs the
/// hardcoded fallback list, so wire models keep their status as a string
/// and unknown backend values survive untouched.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PackageStatus {
    InWarehouse,
    Consolidating,
    ReadyToShip,
    AwaitingShipment,
    Shipped,
    Returned,
    Disposed,
}

impl PackageStatus {
    /// Human-readable label used by the fallback vocabulary.
    pub fn label(&self) -> &'static str {
        match self {
            PackageStatus::InWarehouse => "In Warehouse",
            PackageStatus::Consolidating => "Consolidating",
            PackageStatus::ReadyToShip => "Ready to Ship",
            PackageStatus::AwaitingShipment => "Awaiting Shipment",
            PackageStatus::Shipped => "Shipped",
            PackageStatus::Returned => "Returned",
            PackageStatus::Disposed => "Disposed",
        }
    }
}

/// Image attached to a package. Immutable once uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageImage {
    pub id: i64,
    /// URL of the hosted image.
    pub image: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A physical parcel received at a warehouse on behalf of a user.
///
/// The backend owns and persists packages; this is the client's transient,
/// non-authoritative copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: PackageId,
    pub user: UserId,
    pub user_suite: Option<String>,
    pub full_name: Option<String>,
    pub weight: Option<Decimal>,
    pub length: Option<Decimal>,
    pub width: Option<Decimal>,
    pub height: Option<Decimal>,
    pub declared_value: Option<Decimal>,
    pub status: String,
    pub location: Option<String>,
    pub warehouse: Option<WarehouseId>,
    pub sender_name: Option<String>,
    pub tracking_number: Option<String>,
    pub arrived_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub images: Vec<PackageImage>,
    #[serde(default)]
    pub service_requests: Vec<ServiceRequest>,
}

impl Package {
    /// Parses the status into a known value, if it is one.
    pub fn known_status(&self) -> Option<PackageStatus> {
        self.status.parse().ok()
    }

    /// Finds an embedded service request by id.
    pub fn service_request(&self, request_id: i64) -> Option<&ServiceRequest> {
        self.service_requests.iter().find(|r| r.id == request_id)
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "package #{} [{}]", self.id, self.status)
    }
}

/// Partial update for a package. `None` fields are omitted from the JSON
/// body and from multipart forms, so the backend is never asked to
/// overwrite a field with an empty value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackageUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
}

impl PackageUpdate {
    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == PackageUpdate::default()
    }

    /// Flattens the set fields into `(name, value)` pairs for a multipart
    /// form body.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(v) = &self.status {
            fields.push(("status", v.clone()));
        }
        if let Some(v) = &self.location {
            fields.push(("location", v.clone()));
        }
        if let Some(v) = &self.weight {
            fields.push(("weight", v.to_string()));
        }
        if let Some(v) = &self.length {
            fields.push(("length", v.to_string()));
        }
        if let Some(v) = &self.width {
            fields.push(("width", v.to_string()));
        }
        if let Some(v) = &self.height {
            fields.push(("height", v.to_string()));
        }
        if let Some(v) = &self.declared_value {
            fields.push(("declared_value", v.to_string()));
        }
        if let Some(v) = &self.sender_name {
            fields.push(("sender_name", v.clone()));
        }
        if let Some(v) = &self.tracking_number {
            fields.push(("tracking_number", v.clone()));
        }
        fields
    }
}

/// Fields for creating a package. Warehouse, user, suite and full name are
/// required; everything else is optional.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewPackage {
    pub user: UserId,
    pub warehouse: WarehouseId,
    #[validate(length(min = 1, message = "User suite is required"))]
    pub user_suite: String,
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
    pub weight: Option<Decimal>,
    pub length: Option<Decimal>,
    pub width: Option<Decimal>,
    pub height: Option<Decimal>,
    pub declared_value: Option<Decimal>,
    pub location: Option<String>,
    pub sender_name: Option<String>,
    pub tracking_number: Option<String>,
}

impl NewPackage {
    /// Creates a draft with the required fields set and the status
    /// defaulted to `in_warehouse`.
    pub fn new(
        user: UserId,
        warehouse: WarehouseId,
        user_suite: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        Self {
            user,
            warehouse,
            user_suite: user_suite.into(),
            full_name: full_name.into(),
            status: PackageStatus::InWarehouse.to_string(),
            weight: None,
            length: None,
            width: None,
            height: None,
            declared_value: None,
            location: None,
            sender_name: None,
            tracking_number: None,
        }
    }

    /// Flattens the draft into `(name, value)` pairs for the multipart
    /// create body. Optional fields that are unset are omitted.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("user", self.user.to_string()),
            ("warehouse", self.warehouse.to_string()),
            ("user_suite", self.user_suite.clone()),
            ("full_name", self.full_name.clone()),
            ("status", self.status.clone()),
        ];
        if let Some(v) = &self.weight {
            fields.push(("weight", v.to_string()));
        }
        if let Some(v) = &self.length {
            fields.push(("length", v.to_string()));
        }
        if let Some(v) = &self.width {
            fields.push(("width", v.to_string()));
        }
        if let Some(v) = &self.height {
            fields.push(("height", v.to_string()));
        }
        if let Some(v) = &self.declared_value {
            fields.push(("declared_value", v.to_string()));
        }
        if let Some(v) = &self.location {
            fields.push(("location", v.clone()));
        }
        if let Some(v) = &self.sender_name {
            fields.push(("sender_name", v.clone()));
        }
        if let Some(v) = &self.tracking_number {
            fields.push(("tracking_number", v.clone()));
        }
        fields
    }
}
