//! Typed REST client for the warehouse admin API. Every response is parsed
//! into a DTO at this boundary; callers never see raw JSON.

pub mod multipart;

use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::instrument;
use validator::Validate;

use crate::auth::SharedTokenSource;
use crate::config::AdminConfig;
use crate::errors::{AdminError, AdminResult};
use crate::models::{
    NewPackage, Package, PackageId, PackageUpdate, ServiceRequest, ServiceRequestId,
    ServiceRequestUpdate, StatusOption, UserId,
};
use crate::uploads::UploadFile;

const API_PREFIX: &str = "api/v1/warehouse/admin/";

/// HTTP client for the warehouse admin endpoints. Cheap to clone; the
/// bearer token is resolved from the token source on every request.
#[derive(Clone)]
pub struct WarehouseClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: SharedTokenSource,
}

impl WarehouseClient {
    /// Builds a client from loaded configuration.
    pub fn from_config(config: &AdminConfig) -> AdminResult<Self> {
        let tokens = config
            .token_source()
            .map_err(|e| AdminError::Config(e.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Self::with_parts(http, &config.api_base_url, tokens)
    }

    /// Builds a client from explicit parts, used by tests and the CLI.
    pub fn with_parts(
        http: reqwest::Client,
        base_url: &str,
        tokens: SharedTokenSource,
    ) -> AdminResult<Self> {
        let mut normalized = base_url.trim_end_matches('/').to_string();
        normalized.push('/');
        let base_url = Url::parse(&normalized)
            .map_err(|e| AdminError::Config(format!("Invalid base URL {}: {}", base_url, e)))?;
        Ok(Self {
            http,
            base_url,
            tokens,
        })
    }

    fn endpoint(&self, path: &str) -> AdminResult<Url> {
        self.base_url
            .join(API_PREFIX)
            .and_then(|u| u.join(path))
            .map_err(|e| AdminError::Config(format!("Invalid endpoint {}: {}", path, e)))
    }

    fn authorize(&self, builder: RequestBuilder) -> AdminResult<RequestBuilder> {
        let token = self.tokens.token()?;
        Ok(builder.bearer_auth(token))
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> AdminResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AdminError::from_status(status, &body))
    }

    /// Lists all packages belonging to one user.
    #[instrument(skip(self))]
    pub async fn list_packages(&self, user: UserId) -> AdminResult<Vec<Package>> {
        let url = self.endpoint("packages/")?;
        let request = self
            .authorize(self.http.get(url))?
            .query(&[("user", user)]);
        Self::parse(request.send().await?).await
    }

    /// Fetches the package status vocabulary.
    #[instrument(skip(self))]
    pub async fn package_statuses(&self) -> AdminResult<Vec<StatusOption>> {
        let url = self.endpoint("packages/statuses/")?;
        let request = self.authorize(self.http.get(url))?;
        Self::parse(request.send().await?).await
    }

    /// Fetches the service request status vocabulary.
    #[instrument(skip(self))]
    pub async fn service_request_statuses(&self) -> AdminResult<Vec<StatusOption>> {
        let url = self.endpoint("service-requests/statuses/")?;
        let request = self.authorize(self.http.get(url))?;
        Self::parse(request.send().await?).await
    }

    /// Sends a field-only partial update as JSON.
    #[instrument(skip(self, update))]
    pub async fn update_package(
        &self,
        id: PackageId,
        update: &PackageUpdate,
    ) -> AdminResult<Package> {
        let url = self.endpoint(&format!("packages/{}/", id))?;
        let request = self.authorize(self.http.patch(url))?.json(update);
        Self::parse(request.send().await?).await
    }

    /// Sends field updates plus an optional image in one multipart PATCH.
    /// The file is validated before any bytes leave the process.
    #[instrument(skip(self, update, file))]
    pub async fn update_package_with_image(
        &self,
        id: PackageId,
        update: &PackageUpdate,
        file: Option<&UploadFile>,
    ) -> AdminResult<Package> {
        if let Some(file) = file {
            file.validate()?;
        }
        let url = self.endpoint(&format!("packages/{}/", id))?;
        let form = multipart::update_form(update, file)?;
        let request = self.authorize(self.http.patch(url))?.multipart(form);
        Self::parse(request.send().await?).await
    }

    /// Attaches a new image to a package. Validation failures abort before
    /// the request is built.
    #[instrument(skip(self, file))]
    pub async fn upload_image(&self, id: PackageId, file: &UploadFile) -> AdminResult<Package> {
        self.update_package_with_image(id, &PackageUpdate::default(), Some(file))
            .await
    }

    /// Creates a package via multipart POST, with an optional image.
    #[instrument(skip(self, draft, file))]
    pub async fn create_package(
        &self,
        draft: &NewPackage,
        file: Option<&UploadFile>,
    ) -> AdminResult<Package> {
        draft.validate()?;
        if let Some(file) = file {
            file.validate()?;
        }
        let url = self.endpoint("packages/")?;
        let form = multipart::create_form(draft, file)?;
        let request = self.authorize(self.http.post(url))?.multipart(form);
        Self::parse(request.send().await?).await
    }

    /// Applies a status/notes update to one service request.
    #[instrument(skip(self, update))]
    pub async fn update_service_request(
        &self,
        id: ServiceRequestId,
        update: &ServiceRequestUpdate,
    ) -> AdminResult<ServiceRequest> {
        let url = self.endpoint(&format!("service-requests/{}/", id))?;
        let request = self.authorize(self.http.patch(url))?.json(update);
        Self::parse(request.send().await?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::auth::StaticTokenSource;

    fn client(base: &str) -> WarehouseClient {
        WarehouseClient::with_parts(
            reqwest::Client::new(),
            base,
            Arc::new(StaticTokenSource::new("test-token")),
        )
        .unwrap()
    }

    #[test]
    fn endpoints_are_joined_under_the_admin_prefix() {
        let client = client("http://localhost:8000");
        assert_eq!(
            client.endpoint("packages/42/").unwrap().as_str(),
            "http://localhost:8000/api/v1/warehouse/admin/packages/42/"
        );
        assert_eq!(
            client.endpoint("service-requests/statuses/").unwrap().as_str(),
            "http://localhost:8000/api/v1/warehouse/admin/service-requests/statuses/"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let with = client("http://localhost:8000/");
        let without = client("http://localhost:8000");
        assert_eq!(
            with.endpoint("packages/").unwrap(),
            without.endpoint("packages/").unwrap()
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = WarehouseClient::with_parts(
            reqwest::Client::new(),
            "not a url",
            Arc::new(StaticTokenSource::new("t")),
        );
        assert!(matches!(result, Err(AdminError::Config(_))));
    }
}
