use rust_decimal::Decimal;

use crate::errors::{AdminError, AdminResult};
use crate::models::{Package, PackageUpdate};

/// String-typed edit dialog state for one package. Fields hold whatever
/// the admin typed; converting to a `PackageUpdate` trims whitespace and
/// strips empty values, so the backend only ever sees fields that were
/// intentionally filled in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageForm {
    pub status: String,
    pub location: String,
    pub weight: String,
    pub length: String,
    pub width: String,
    pub height: String,
    pub declared_value: String,
    pub sender_name: String,
    pub tracking_number: String,
}

impl PackageForm {
    /// Pre-fills the dialog from the package being edited. Absent fields
    /// become empty strings, which round-trip back to "omitted".
    pub fn from_package(package: &Package) -> Self {
        Self {
            status: package.status.clone(),
            location: package.location.clone().unwrap_or_default(),
            weight: decimal_text(package.weight),
            length: decimal_text(package.length),
            width: decimal_text(package.width),
            height: decimal_text(package.height),
            declared_value: decimal_text(package.declared_value),
            sender_name: package.sender_name.clone().unwrap_or_default(),
            tracking_number: package.tracking_number.clone().unwrap_or_default(),
        }
    }

    /// Builds the partial update: empty fields are stripped, numeric
    /// fields must parse as decimals.
    pub fn to_update(&self) -> AdminResult<PackageUpdate> {
        Ok(PackageUpdate {
            status: text_field(&self.status),
            location: text_field(&self.location),
            weight: decimal_field("weight", &self.weight)?,
            length: decimal_field("length", &self.length)?,
            width: decimal_field("width", &self.width)?,
            height: decimal_field("height", &self.height)?,
            declared_value: decimal_field("declared value", &self.declared_value)?,
            sender_name: text_field(&self.sender_name),
            tracking_number: text_field(&self.tracking_number),
        })
    }
}

fn decimal_text(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn text_field(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn decimal_field(name: &str, raw: &str) -> AdminResult<Option<Decimal>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<Decimal>()
        .map(Some)
        .map_err(|_| AdminError::Validation(format!("{} must be a number, got '{}'", name, trimmed)))
}
