use std::path::PathBuf;
use std::sync::Arc;

use crate::errors::{AdminError, AdminResult};

/// Where the bearer token comes from. The client asks the source on every
/// request, so a rotated token takes effect without restarting.
pub trait TokenSource: Send + Sync + std::fmt::Debug {
    fn token(&self) -> AdminResult<String>;
}

/// Fixed token, typically injected from configuration or the environment.
#[derive(Debug, Clone)]
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenSource for StaticTokenSource {
    fn token(&self) -> AdminResult<String> {
        if self.token.trim().is_empty() {
            return Err(AdminError::Token("Bearer token is empty".into()));
        }
        Ok(self.token.trim().to_string())
    }
}

/// Token stored in a file, re-read on every request.
#[derive(Debug, Clone)]
pub struct FileTokenSource {
    path: PathBuf,
}

impl FileTokenSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenSource for FileTokenSource {
    fn token(&self) -> AdminResult<String> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            AdminError::Token(format!("Cannot read token file {}: {}", self.path.display(), e))
        })?;
        let token = raw.trim();
        if token.is_empty() {
            return Err(AdminError::Token(format!(
                "Token file {} is empty",
                self.path.display()
            )));
        }
        Ok(token.to_string())
    }
}

/// Shared handle used by the HTTP client.
pub type SharedTokenSource = Arc<dyn TokenSource>;
