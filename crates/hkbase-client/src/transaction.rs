//! Client-side transaction identifiers.

use uuid::Uuid;

/// An identifier grouping mutation operations against one repository.
///
/// No atomicity is enforced by this layer: the id is attached to requests
/// only when the caller passes the transaction explicitly, and the server
/// is free to ignore it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HkTransaction {
    id: String,
    repository: String,
}

impl HkTransaction {
    /// Create a transaction with an explicit id.
    #[must_use]
    pub fn new(id: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            repository: repository.into(),
        }
    }

    /// Create a transaction with a generated UUID v4 id.
    #[must_use]
    pub fn generate(repository: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            repository: repository.into(),
        }
    }

    /// The transaction id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name of the repository the transaction is bound to.
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }
}

impl std::fmt::Display for HkTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}
