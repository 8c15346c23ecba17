//! Base client: connection configuration and repository-level operations.

use crate::encoding::encode_segment;
use crate::error::HkError;
use crate::repository::HkRepository;
use crate::response;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use std::time::Duration;
use url::Url;

/// hkbase connection configuration.
#[derive(Debug, Clone)]
pub struct HkBaseConfig {
    /// Root URL of the hkbase server (e.g., <http://localhost:3000>)
    pub base_url: String,
    /// REST API version segment
    pub api_version: String,
    /// Request timeout
    pub timeout: Duration,
    /// Optional bearer token for authentication
    pub bearer_token: Option<String>,
}

impl Default for HkBaseConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            api_version: "v2".to_string(),
            timeout: Duration::from_secs(30),
            bearer_token: default_auth_token(),
        }
    }
}

impl HkBaseConfig {
    /// Configuration for the given server URL, all other fields default.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// Process-wide default token, read from `HKBASE_AUTH_TOKEN`.
fn default_auth_token() -> Option<String> {
    std::env::var("HKBASE_AUTH_TOKEN")
        .ok()
        .filter(|token| !token.is_empty())
}

/// Communication interface with a hkbase server.
///
/// Cheap to clone; all clones share the underlying HTTP connection pool.
/// Repository handles obtained from this client each hold their own clone.
#[derive(Debug, Clone)]
pub struct HkBase {
    client: Client,
    config: HkBaseConfig,
    repository_uri: String,
    observer_uri: String,
}

impl HkBase {
    /// Create a new hkbase client.
    ///
    /// # Errors
    ///
    /// Returns [`HkError::Init`] if the base URL is not a valid URL or the
    /// HTTP client cannot be built.
    pub fn new(config: HkBaseConfig) -> Result<Self, HkError> {
        Url::parse(&config.base_url)
            .map_err(|e| HkError::Init(format!("invalid base URL {:?}: {e}", config.base_url)))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| HkError::Init(e.to_string()))?;

        let base_uri = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.api_version
        );
        let repository_uri = format!("{base_uri}/repository");
        let observer_uri = format!("{base_uri}/observer");

        Ok(Self {
            client,
            config,
            repository_uri,
            observer_uri,
        })
    }

    /// The configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &HkBaseConfig {
        &self.config
    }

    /// URI prefix of the repository namespace.
    #[must_use]
    pub fn repository_uri(&self) -> &str {
        &self.repository_uri
    }

    /// URI prefix of the observer namespace.
    #[must_use]
    pub fn observer_uri(&self) -> &str {
        &self.observer_uri
    }

    /// Build the authorization header if configured.
    fn auth_header(&self) -> Option<String> {
        self.config
            .bearer_token
            .as_ref()
            .map(|token| format!("Bearer {token}"))
    }

    /// Start a request with the authorization header applied.
    pub(crate) fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.request(method, url);
        if let Some(auth) = self.auth_header() {
            request = request.header(AUTHORIZATION, auth);
        }
        request
    }

    fn repo_url(&self, name: &str) -> String {
        format!("{}/{}/", self.repository_uri, encode_segment(name))
    }

    /// Obtain a handle to a repository without contacting the server.
    ///
    /// Prefer [`connect_repository`](Self::connect_repository) when the
    /// repository must already exist.
    #[must_use]
    pub fn repository(&self, name: &str) -> HkRepository {
        HkRepository::new(self.clone(), name)
    }

    /// Connect to an existing repository.
    ///
    /// # Errors
    ///
    /// Returns [`HkError::NotConnected`] if `name` is not in the server's
    /// repository listing, or any error from fetching the listing.
    pub async fn connect_repository(&self, name: &str) -> Result<HkRepository, HkError> {
        if self.list_repositories().await?.iter().any(|r| r == name) {
            return Ok(self.repository(name));
        }

        Err(HkError::NotConnected(name.to_string()))
    }

    /// Create a new repository.
    ///
    /// # Errors
    ///
    /// Returns [`HkError::Server`] if the server rejects the create;
    /// any other failure is wrapped into [`HkError::Client`].
    pub async fn create_repository(&self, name: &str) -> Result<HkRepository, HkError> {
        let url = self.repo_url(name);
        tracing::debug!(name, url, "PUT repository");

        let response = self
            .request(Method::PUT, &url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| HkError::wrap("repository not created", e))?;
        response::validate(response).await?;

        Ok(self.repository(name))
    }

    /// Delete an existing repository.
    ///
    /// # Errors
    ///
    /// Returns [`HkError::Server`] if the server rejects the delete;
    /// any other failure is wrapped into [`HkError::Client`].
    pub async fn delete_repository(&self, name: &str) -> Result<(), HkError> {
        let url = self.repo_url(name);
        tracing::debug!(name, url, "DELETE repository");

        let response = self
            .request(Method::DELETE, &url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| HkError::wrap("repository not deleted", e))?;
        response::validate(response).await?;

        Ok(())
    }

    /// Create a repository, deleting any existing one first if the server
    /// rejects the create.
    ///
    /// A server-reported create failure (typically "already exists")
    /// deletes the repository and creates it again, discarding its
    /// contents.
    ///
    /// # Errors
    ///
    /// Returns any error from the fallback delete or the second create;
    /// non-server failures of the first create are returned unchanged.
    pub async fn delete_create_repository(&self, name: &str) -> Result<HkRepository, HkError> {
        match self.create_repository(name).await {
            Ok(repository) => Ok(repository),
            Err(HkError::Server { .. }) => {
                self.delete_repository(name).await?;
                self.create_repository(name).await
            }
            Err(err) => Err(err),
        }
    }

    /// List the names of the repositories available on the server.
    ///
    /// # Errors
    ///
    /// Returns [`HkError::Server`] on a non-success status; any other
    /// failure is wrapped into [`HkError::Client`].
    pub async fn list_repositories(&self) -> Result<Vec<String>, HkError> {
        let url = self.repository_uri.as_str();
        tracing::debug!(url, "GET repository listing");

        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| HkError::wrap("could not retrieve existing repositories", e))?;
        let (_, body) = response::validate(response).await?;

        serde_json::from_value(body)
            .map_err(|e| HkError::wrap("could not retrieve existing repositories", e))
    }

    /// Retrieve a connected handle for every repository on the server.
    ///
    /// # Errors
    ///
    /// Returns any error from fetching the repository listing.
    pub async fn get_repositories(&self) -> Result<Vec<HkRepository>, HkError> {
        let names = self.list_repositories().await?;
        Ok(names.iter().map(|name| self.repository(name)).collect())
    }
}
