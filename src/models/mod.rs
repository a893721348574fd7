//! Typed DTOs for the warehouse admin API. The backend owns every entity;
//! these are the client's transient copies, parsed at the HTTP boundary.

pub mod package;
pub mod service_request;
pub mod statuses;

pub use package::{
    NewPackage, Package, PackageId, PackageImage, PackageStatus, PackageUpdate, UserId,
    WarehouseId,
};
pub use service_request::{
    Service, ServiceRequest, ServiceRequestId, ServiceRequestStatus, ServiceRequestUpdate,
};
pub use statuses::{StatusOption, StatusVocabulary};
