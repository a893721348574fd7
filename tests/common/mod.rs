#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};

use parcelpoint_admin::auth::StaticTokenSource;
use parcelpoint_admin::WarehouseClient;

pub const ADMIN_PREFIX: &str = "/api/v1/warehouse/admin";

/// Client pointed at a wiremock server with a fixed test token.
pub fn test_client(base_url: &str) -> WarehouseClient {
    WarehouseClient::with_parts(
        reqwest::Client::new(),
        base_url,
        Arc::new(StaticTokenSource::new("test-token")),
    )
    .expect("valid test client")
}

/// Minimal package fixture in the backend's wire shape.
pub fn package_json(id: i64, status: &str, location: &str) -> Value {
    json!({
        "id": id,
        "user": 7,
        "user_suite": "F2362C",
        "full_name": "Sahil Gholap",
        "weight": "1.25",
        "length": "30",
        "width": "20",
        "height": "10",
        "declared_value": "20.00",
        "status": status,
        "location": location,
        "warehouse": 1,
        "sender_name": "Amazon",
        "tracking_number": "1Z999AA10123456784",
        "arrived_at": "2024-11-02T10:30:00Z",
        "processed_at": null,
        "shipped_at": null,
        "images": [],
        "service_requests": []
    })
}

/// Package fixture carrying two embedded service requests.
pub fn package_with_requests_json(id: i64) -> Value {
    let mut package = package_json(id, "in_warehouse", "Shelf A3");
    package["service_requests"] = json!([
        service_request_json(9, "pending"),
        service_request_json(10, "pending"),
    ]);
    package
}

pub fn service_request_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "status": status,
        "requested_at": "2024-11-03T08:00:00Z",
        "completed_at": null,
        "notes": null,
        "service": {
            "id": 3,
            "name": "Repackaging",
            "price": "5.00",
            "is_active": true,
            "description": "Repack into a smaller box"
        }
    })
}

pub fn status_options_json() -> Value {
    json!([
        { "value": "in_warehouse", "label": "In Warehouse" },
        { "value": "shipped", "label": "Shipped" }
    ])
}
