use dashmap::DashMap;
use std::sync::RwLock;

use crate::models::{Package, PackageId, ServiceRequest, ServiceRequestId};

/// Normalized package store: one entity table keyed by package id plus an
/// explicit ordering. List and detail views both derive from the same
/// record, so a mutation merged here is visible everywhere at once and the
/// two views cannot drift apart.
#[derive(Debug, Default)]
pub struct PackageStore {
    entities: DashMap<PackageId, Package>,
    order: RwLock<Vec<PackageId>>,
}

impl PackageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole collection, preserving the backend's ordering.
    pub fn replace_all(&self, packages: Vec<Package>) {
        let mut order = self.order.write().expect("order lock poisoned");
        self.entities.clear();
        order.clear();
        for package in packages {
            order.push(package.id);
            self.entities.insert(package.id, package);
        }
    }

    /// Merges one package by id. Known ids are replaced in place; unknown
    /// ids are appended to the ordering.
    pub fn upsert(&self, package: Package) {
        let mut order = self.order.write().expect("order lock poisoned");
        let id = package.id;
        if self.entities.insert(id, package).is_none() {
            order.push(id);
        }
    }

    /// Inserts a newly created package at the front of the list.
    pub fn prepend(&self, package: Package) {
        let mut order = self.order.write().expect("order lock poisoned");
        let id = package.id;
        if self.entities.insert(id, package).is_none() {
            order.insert(0, id);
        }
    }

    /// Replaces exactly the matching embedded service request, leaving the
    /// package's sibling requests untouched. Returns false when no package
    /// holds that request.
    pub fn apply_service_request(&self, updated: &ServiceRequest) -> bool {
        let package_id = match self.package_of_request(updated.id) {
            Some(id) => id,
            None => return false,
        };
        if let Some(mut entry) = self.entities.get_mut(&package_id) {
            if let Some(slot) = entry
                .service_requests
                .iter_mut()
                .find(|r| r.id == updated.id)
            {
                *slot = updated.clone();
                return true;
            }
        }
        false
    }

    /// Finds the package holding the given service request.
    pub fn package_of_request(&self, request_id: ServiceRequestId) -> Option<PackageId> {
        self.entities.iter().find_map(|entry| {
            entry
                .service_requests
                .iter()
                .any(|r| r.id == request_id)
                .then_some(entry.id)
        })
    }

    pub fn get(&self, id: PackageId) -> Option<Package> {
        self.entities.get(&id).map(|entry| entry.clone())
    }

    pub fn contains(&self, id: PackageId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Snapshot of the collection in display order.
    pub fn list(&self) -> Vec<Package> {
        let order = self.order.read().expect("order lock poisoned");
        order
            .iter()
            .filter_map(|id| self.entities.get(id).map(|entry| entry.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.read().expect("order lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
