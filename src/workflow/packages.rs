use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use crate::client::WarehouseClient;
use crate::errors::{AdminError, AdminResult};
use crate::models::{
    NewPackage, Package, PackageId, PackageUpdate, ServiceRequest, ServiceRequestId,
    ServiceRequestStatus, ServiceRequestUpdate, StatusVocabulary, UserId,
};
use crate::store::PackageStore;
use crate::uploads::UploadFile;
use crate::workflow::forms::PackageForm;

/// How long a success notice stays visible before it auto-dismisses.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

/// Named load states for the package list. No boolean flag combinations,
/// so "loading and failed at once" is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Transient success notice. Expires on its own; error banners do not.
#[derive(Debug, Clone)]
pub struct Notice {
    text: String,
    expires_at: Instant,
}

impl Notice {
    fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            expires_at: Instant::now() + NOTICE_TTL,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Handle for one in-flight package load. Carries the view epoch at the
/// time the load started; a result applied under a newer epoch is stale
/// and gets discarded instead of merging into current state.
#[derive(Debug, Clone, Copy)]
pub struct LoadTicket {
    epoch: u64,
    pub user: UserId,
}

/// Handle for one in-flight service request transition. While it is
/// outstanding the request is marked busy and rejects a second
/// transition; siblings stay interactive.
#[derive(Debug, Clone, Copy)]
pub struct TransitionTicket {
    request_id: ServiceRequestId,
    target: ServiceRequestStatus,
}

/// Controller for the package list/detail admin view.
///
/// Owns the view state (load state, selection, edit dialog, error banner,
/// success notice, per-request busy flags) on top of the shared normalized
/// [`PackageStore`]. All backend failures are caught and turned into the
/// single user-visible error surface; nothing retries automatically.
pub struct PackageAdminView {
    client: WarehouseClient,
    store: Arc<PackageStore>,
    load_state: LoadState,
    selected: Option<PackageId>,
    edit_form: Option<PackageForm>,
    error: Option<String>,
    notice: Option<Notice>,
    busy_requests: HashSet<ServiceRequestId>,
    package_statuses: StatusVocabulary,
    service_request_statuses: StatusVocabulary,
    epoch: u64,
}

impl PackageAdminView {
    /// Creates a view over a fresh store. The status vocabularies start
    /// from the fallback lists and are replaced once
    /// [`load_status_vocabularies`](Self::load_status_vocabularies) runs.
    pub fn new(client: WarehouseClient) -> Self {
        Self {
            client,
            store: Arc::new(PackageStore::new()),
            load_state: LoadState::Idle,
            selected: None,
            edit_form: None,
            error: None,
            notice: None,
            busy_requests: HashSet::new(),
            package_statuses: StatusVocabulary::package_fallback(),
            service_request_statuses: StatusVocabulary::service_request_fallback(),
            epoch: 0,
        }
    }

    // ---- derived state -------------------------------------------------

    pub fn store(&self) -> Arc<PackageStore> {
        Arc::clone(&self.store)
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// The package list in display order.
    pub fn packages(&self) -> Vec<Package> {
        self.store.list()
    }

    /// The detail view's package, derived from the same store record the
    /// list renders, so the two can never disagree.
    pub fn selected_package(&self) -> Option<Package> {
        self.selected.and_then(|id| self.store.get(id))
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The success notice, if it has not expired yet.
    pub fn notice_at(&self, now: Instant) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|n| !n.is_expired_at(now))
            .map(|n| n.text())
    }

    /// Drops an expired notice. Views call this on their render tick.
    pub fn expire_notice(&mut self, now: Instant) {
        if self
            .notice
            .as_ref()
            .map(|n| n.is_expired_at(now))
            .unwrap_or(false)
        {
            self.notice = None;
        }
    }

    pub fn package_statuses(&self) -> &StatusVocabulary {
        &self.package_statuses
    }

    pub fn service_request_statuses(&self) -> &StatusVocabulary {
        &self.service_request_statuses
    }

    /// Whether a transition for this request is currently in flight.
    /// The UI disables exactly that request's selector; siblings stay
    /// interactive.
    pub fn is_request_busy(&self, request_id: ServiceRequestId) -> bool {
        self.busy_requests.contains(&request_id)
    }

    pub fn edit_form(&self) -> Option<&PackageForm> {
        self.edit_form.as_ref()
    }

    pub fn edit_form_mut(&mut self) -> Option<&mut PackageForm> {
        self.edit_form.as_mut()
    }

    // ---- loading -------------------------------------------------------

    /// Starts a package load. Returns `None` (a no-op) when no user is
    /// selected. Starting a load supersedes earlier in-flight loads.
    pub fn begin_load(&mut self, user: Option<UserId>) -> Option<LoadTicket> {
        let user = user?;
        self.epoch += 1;
        self.load_state = LoadState::Loading;
        self.error = None;
        Some(LoadTicket {
            epoch: self.epoch,
            user,
        })
    }

    /// Applies a load result. Stale tickets (superseded by a newer load or
    /// by leaving the view) are discarded without touching state. A 404 is
    /// benign: the user simply has no packages.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: AdminResult<Vec<Package>>) {
        if ticket.epoch != self.epoch {
            info!(user = ticket.user, "discarding stale package load");
            return;
        }
        match result {
            Ok(packages) => {
                info!(user = ticket.user, count = packages.len(), "packages loaded");
                self.store.replace_all(packages);
                self.load_state = LoadState::Loaded;
            }
            Err(err) if err.is_not_found() => {
                self.store.replace_all(Vec::new());
                self.load_state = LoadState::Loaded;
            }
            Err(err) => {
                warn!(user = ticket.user, error = %err, "package load failed");
                self.load_state = LoadState::Failed;
                self.error = Some(err.user_message());
            }
        }
    }

    /// Loads all packages for the given user. No-op when `user` is `None`.
    #[instrument(skip(self))]
    pub async fn load_packages(&mut self, user: Option<UserId>) {
        let Some(ticket) = self.begin_load(user) else {
            return;
        };
        let result = self.client.list_packages(ticket.user).await;
        self.finish_load(ticket, result);
    }

    /// Fetches both status vocabularies once at mount. A failed fetch
    /// falls back to the hardcoded list so the view stays usable.
    #[instrument(skip(self))]
    pub async fn load_status_vocabularies(&mut self) {
        self.package_statuses = match self.client.package_statuses().await {
            Ok(options) => StatusVocabulary::fetched(options),
            Err(err) => {
                warn!(error = %err, "package status fetch failed, using fallback");
                StatusVocabulary::package_fallback()
            }
        };
        self.service_request_statuses = match self.client.service_request_statuses().await {
            Ok(options) => StatusVocabulary::fetched(options),
            Err(err) => {
                warn!(error = %err, "service request status fetch failed, using fallback");
                StatusVocabulary::service_request_fallback()
            }
        };
    }

    // ---- navigation ----------------------------------------------------

    /// Switches to the detail view for an already-loaded package. No
    /// network call. Returns false when the package is not in the store.
    pub fn select_package(&mut self, id: PackageId) -> bool {
        if !self.store.contains(id) {
            return false;
        }
        self.selected = Some(id);
        true
    }

    /// Returns to the list view, clearing the selection, any open edit
    /// dialog and the error banner. In-flight detail work is superseded.
    pub fn return_to_list(&mut self) {
        self.selected = None;
        self.edit_form = None;
        self.error = None;
        self.epoch += 1;
    }

    /// Opens the edit dialog pre-filled from the selected package.
    pub fn open_edit_dialog(&mut self) -> bool {
        match self.selected_package() {
            Some(package) => {
                self.edit_form = Some(PackageForm::from_package(&package));
                true
            }
            None => false,
        }
    }

    pub fn close_edit_dialog(&mut self) {
        self.edit_form = None;
    }

    // ---- mutations -------------------------------------------------------

    /// Applies a partial update. On success the result merges into the
    /// store (list and detail at once), the dialog closes and a transient
    /// notice shows; on failure the banner is set and nothing is mutated.
    #[instrument(skip(self, update))]
    pub async fn update_package(
        &mut self,
        id: PackageId,
        update: &PackageUpdate,
    ) -> AdminResult<Package> {
        let result = self.client.update_package(id, update).await;
        self.absorb_package_result(result, "Package updated")
    }

    /// Combined field-and-image update used by the edit dialog, so one
    /// round trip covers both.
    #[instrument(skip(self, update, file))]
    pub async fn update_package_with_image(
        &mut self,
        id: PackageId,
        update: &PackageUpdate,
        file: Option<&UploadFile>,
    ) -> AdminResult<Package> {
        if let Some(file) = file {
            if let Err(err) = file.validate() {
                self.error = Some(err.user_message());
                return Err(err);
            }
        }
        let result = self.client.update_package_with_image(id, update, file).await;
        self.absorb_package_result(result, "Package updated")
    }

    /// Submits the open edit dialog against the selected package.
    pub async fn submit_edit_dialog(&mut self, file: Option<&UploadFile>) -> AdminResult<Package> {
        let id = self
            .selected
            .ok_or_else(|| AdminError::Validation("No package selected".into()))?;
        let form = self
            .edit_form
            .clone()
            .ok_or_else(|| AdminError::Validation("Edit dialog is not open".into()))?;
        let update = match form.to_update() {
            Ok(update) => update,
            Err(err) => {
                self.error = Some(err.user_message());
                return Err(err);
            }
        };
        self.update_package_with_image(id, &update, file).await
    }

    /// Attaches an image to a package. A disallowed type or oversize file
    /// fails before any bytes are sent.
    #[instrument(skip(self, file))]
    pub async fn upload_image(&mut self, id: PackageId, file: &UploadFile) -> AdminResult<Package> {
        if let Err(err) = file.validate() {
            self.error = Some(err.user_message());
            return Err(err);
        }
        let result = self.client.upload_image(id, file).await;
        self.absorb_package_result(result, "Image uploaded")
    }

    /// Creates a package and prepends it to the list. The selection is
    /// never changed by a create.
    #[instrument(skip(self, draft, file))]
    pub async fn create_package(
        &mut self,
        draft: &NewPackage,
        file: Option<&UploadFile>,
    ) -> AdminResult<Package> {
        match self.client.create_package(draft, file).await {
            Ok(package) => {
                info!(package = package.id, "package created");
                self.store.prepend(package.clone());
                self.error = None;
                self.notice = Some(Notice::new("Package created"));
                Ok(package)
            }
            Err(err) => {
                self.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    // ---- service request workflow ----------------------------------------

    /// "Start Processing": advances a pending request to in_progress.
    pub async fn start_processing(&mut self, request_id: ServiceRequestId) -> AdminResult<()> {
        self.set_service_request_status(request_id, ServiceRequestStatus::InProgress)
            .await
    }

    /// "Mark Complete": advances an in_progress request to completed.
    pub async fn mark_complete(&mut self, request_id: ServiceRequestId) -> AdminResult<()> {
        self.set_service_request_status(request_id, ServiceRequestStatus::Completed)
            .await
    }

    /// Starts one status transition: validates it (only forward
    /// transitions are exposed; a request with a transition already in
    /// flight rejects a second one while other requests stay interactive)
    /// and marks the request busy until
    /// [`finish_transition`](Self::finish_transition) runs.
    pub fn begin_transition(
        &mut self,
        request_id: ServiceRequestId,
        target: ServiceRequestStatus,
    ) -> AdminResult<TransitionTicket> {
        if self.busy_requests.contains(&request_id) {
            return Err(AdminError::Validation(
                "A transition for this request is already in progress".into(),
            ));
        }

        let package_id = self.store.package_of_request(request_id).ok_or_else(|| {
            AdminError::Validation(format!("Unknown service request {}", request_id))
        })?;
        let current = self
            .store
            .get(package_id)
            .and_then(|p| p.service_request(request_id).and_then(|r| r.known_status()))
            .ok_or_else(|| {
                AdminError::Validation(format!(
                    "Service request {} has an unrecognized status",
                    request_id
                ))
            })?;
        if current.next_forward() != Some(target) {
            return Err(AdminError::Validation(format!(
                "Cannot move a {} request to {}",
                current, target
            )));
        }

        self.busy_requests.insert(request_id);
        Ok(TransitionTicket { request_id, target })
    }

    /// Applies a transition result: clears the busy flag, then on success
    /// replaces exactly the matching embedded request; on failure sets the
    /// banner and mutates nothing, so the UI never assumes the transition
    /// happened.
    pub fn finish_transition(
        &mut self,
        ticket: TransitionTicket,
        result: AdminResult<ServiceRequest>,
    ) -> AdminResult<()> {
        self.busy_requests.remove(&ticket.request_id);
        match result {
            Ok(updated) => {
                info!(request = ticket.request_id, status = %ticket.target, "service request advanced");
                if !self.store.apply_service_request(&updated) {
                    warn!(
                        request = ticket.request_id,
                        "updated service request no longer present in the store"
                    );
                }
                self.error = None;
                Ok(())
            }
            Err(err) => {
                warn!(request = ticket.request_id, error = %err, "service request transition failed");
                self.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Sends one status transition, composing the two phases above.
    #[instrument(skip(self))]
    pub async fn set_service_request_status(
        &mut self,
        request_id: ServiceRequestId,
        target: ServiceRequestStatus,
    ) -> AdminResult<()> {
        let ticket = self.begin_transition(request_id, target)?;
        let result = self
            .client
            .update_service_request(ticket.request_id, &ServiceRequestUpdate::status(ticket.target))
            .await;
        self.finish_transition(ticket, result)
    }

    fn absorb_package_result(
        &mut self,
        result: AdminResult<Package>,
        notice: &str,
    ) -> AdminResult<Package> {
        match result {
            Ok(package) => {
                self.store.upsert(package.clone());
                self.edit_form = None;
                self.error = None;
                self.notice = Some(Notice::new(notice));
                Ok(package)
            }
            Err(err) => {
                self.error = Some(err.user_message());
                Err(err)
            }
        }
    }
}
