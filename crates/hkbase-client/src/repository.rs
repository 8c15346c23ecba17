//! Repository client: entity CRUD, RDF import, and HyQL queries.

use crate::base::HkBase;
use crate::encoding::encode_segment;
use crate::error::HkError;
use crate::response;
use crate::transaction::HkTransaction;
use hkbase_model::{ContentType, Context, HkEntity};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Method;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Communication interface with a single repository within a hkbase.
///
/// Obtained from [`HkBase::connect_repository`],
/// [`HkBase::create_repository`], or [`HkBase::repository`].
#[derive(Debug, Clone)]
pub struct HkRepository {
    base: HkBase,
    name: String,
}

impl HkRepository {
    pub(crate) fn new(base: HkBase, name: &str) -> Self {
        Self {
            base,
            name: name.to_string(),
        }
    }

    /// The repository name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn url(&self, suffix: &str) -> String {
        format!(
            "{}/{}/{suffix}",
            self.base.repository_uri(),
            encode_segment(&self.name)
        )
    }

    /// Create a transaction bound to this repository.
    ///
    /// With `None` a UUID v4 id is generated.
    #[must_use]
    pub fn create_transaction(&self, id: Option<String>) -> HkTransaction {
        match id {
            Some(id) => HkTransaction::new(id, &self.name),
            None => HkTransaction::generate(&self.name),
        }
    }

    /// Add entities to the repository.
    ///
    /// Accepts a single entity, a collection of entities, a raw JSON
    /// object, or a collection of raw JSON objects; everything is
    /// normalized to one JSON array and sent in a single PUT. The
    /// server-side PUT is an idempotent upsert.
    ///
    /// # Errors
    ///
    /// Returns [`HkError::InvalidEntity`] for raw values that are not
    /// JSON objects, [`HkError::Server`] on a non-success status, and
    /// [`HkError::Client`] for any other failure.
    pub async fn add_entities<E>(
        &self,
        entities: E,
        transaction: Option<&HkTransaction>,
    ) -> Result<(), HkError>
    where
        E: IntoEntityValues,
    {
        let values = entities.into_entity_values()?;
        let url = self.url("entity/");
        tracing::debug!(repository = %self.name, count = values.len(), "PUT entities");

        let mut request = self
            .base
            .request(Method::PUT, &url)
            .header(CONTENT_TYPE, "application/json")
            .json(&values);
        if let Some(tx) = transaction {
            request = request.query(&[("transactionId", tx.id())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HkError::wrap("entities not added", e))?;
        response::validate(response).await?;

        Ok(())
    }

    /// Update entities in the repository.
    ///
    /// The server-side PUT is an idempotent upsert, so this is the same
    /// request as [`add_entities`](Self::add_entities).
    ///
    /// # Errors
    ///
    /// Same as [`add_entities`](Self::add_entities).
    pub async fn update_entities<E>(
        &self,
        entities: E,
        transaction: Option<&HkTransaction>,
    ) -> Result<(), HkError>
    where
        E: IntoEntityValues,
    {
        self.add_entities(entities, transaction).await
    }

    /// Retrieve entities matching a filter.
    ///
    /// A text filter is sent as `text/plain`, a JSON filter as
    /// `application/json`. The response is an object keyed by entity id;
    /// its values are converted into typed entities.
    ///
    /// # Errors
    ///
    /// Returns [`HkError::Server`] on a non-success status; any other
    /// failure (network, decoding, conversion) is wrapped into
    /// [`HkError::Client`].
    pub async fn get_entities(
        &self,
        filter: impl Into<EntityFilter>,
    ) -> Result<Vec<HkEntity>, HkError> {
        let url = self.url("entity");

        let request = match filter.into() {
            EntityFilter::Text(text) => {
                tracing::debug!(repository = %self.name, "POST entity filter (text)");
                self.base
                    .request(Method::POST, &url)
                    .header(CONTENT_TYPE, "text/plain")
                    .body(text)
            }
            EntityFilter::Json(value) => {
                tracing::debug!(repository = %self.name, "POST entity filter (json)");
                self.base
                    .request(Method::POST, &url)
                    .header(CONTENT_TYPE, "application/json")
                    .json(&value)
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| HkError::wrap("could not retrieve the entities", e))?;
        let (_, body) = response::validate(response).await?;

        let entities: Map<String, Value> = serde_json::from_value(body)
            .map_err(|e| HkError::wrap("could not retrieve the entities", e))?;
        entities
            .into_iter()
            .map(|(_, value)| {
                HkEntity::from_value(value)
                    .map_err(|e| HkError::wrap("could not retrieve the entities", e))
            })
            .collect()
    }

    /// Delete entities from the repository by id.
    ///
    /// Accepts an id, a list of ids, an entity, or a list of entities;
    /// entities are reduced to their ids. One DELETE carries the whole
    /// id list as its JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`HkError::Server`] on a non-success status; any other
    /// failure is wrapped into [`HkError::Client`].
    pub async fn delete_entities<I>(
        &self,
        ids: I,
        transaction: Option<&HkTransaction>,
    ) -> Result<(), HkError>
    where
        I: IntoEntityIds,
    {
        let ids = ids.into_entity_ids();
        let url = self.url("entity/");
        tracing::debug!(repository = %self.name, count = ids.len(), "DELETE entities");

        let mut request = self
            .base
            .request(Method::DELETE, &url)
            .header(CONTENT_TYPE, "application/json")
            .json(&ids);
        if let Some(tx) = transaction {
            request = request.query(&[("transactionId", tx.id())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HkError::wrap("entities not deleted", e))?;
        response::validate(response).await?;

        Ok(())
    }

    /// Import data into the repository.
    ///
    /// With [`ImportOptions::as_hk`] set the content is parsed as hkbase
    /// JSON entities and routed through
    /// [`add_entities`](Self::add_entities). Otherwise the raw content is
    /// PUT to the RDF import endpoint with `Content-Type` from
    /// `datatype`, `Content-Length` from the content's byte length, the
    /// optional parent context attached as the `context-parent` header,
    /// and the options mirrored as query parameters. A file source is
    /// read fully into memory before the request.
    ///
    /// # Errors
    ///
    /// Returns [`HkError::Server`] on a non-success status; any other
    /// failure (file read, JSON parse, network) is wrapped into
    /// [`HkError::Client`].
    pub async fn import_data(
        &self,
        source: impl Into<ImportSource>,
        datatype: ContentType,
        options: &ImportOptions,
    ) -> Result<(), HkError> {
        let content = source.into().read().await?;

        if options.as_hk {
            let entities: Value = serde_json::from_str(&content)
                .map_err(|e| HkError::wrap("data not imported", e))?;
            return self.add_entities(entities, None).await;
        }

        let url = self.url("rdf");
        tracing::debug!(
            repository = %self.name,
            %datatype,
            bytes = content.len(),
            "PUT rdf import"
        );

        let mut request = self
            .base
            .request(Method::PUT, &url)
            .header(CONTENT_TYPE, datatype.as_str())
            .header(CONTENT_LENGTH, content.len().to_string());
        if let Some(context) = options.context_id() {
            request = request.header("context-parent", context);
        }

        let response = request
            .query(&options.query_params())
            .body(content)
            .send()
            .await
            .map_err(|e| HkError::wrap("data not imported", e))?;
        response::validate(response).await?;

        Ok(())
    }

    /// Delete every entity in the repository.
    ///
    /// Two round-trips: fetch all entities with the empty filter, then
    /// delete them. Entities added between the two calls survive.
    ///
    /// # Errors
    ///
    /// Returns any error from the fetch or the delete.
    pub async fn clear(&self) -> Result<(), HkError> {
        let entities = self.get_entities(EntityFilter::all()).await?;
        self.delete_entities(entities, None).await
    }

    /// Run a HyQL query and convert its results to entities.
    ///
    /// The query string is posted as `text/plain`; the response is a JSON
    /// array iterated in order.
    ///
    /// # Errors
    ///
    /// Returns [`HkError::Server`] on a non-success status; any other
    /// failure is wrapped into [`HkError::Client`].
    pub async fn hyql(&self, query: &str) -> Result<Vec<HkEntity>, HkError> {
        let url = self.url("query/");
        tracing::debug!(repository = %self.name, "POST hyql query");

        let response = self
            .base
            .request(Method::POST, &url)
            .header(CONTENT_TYPE, "text/plain")
            .body(query.to_string())
            .send()
            .await
            .map_err(|e| HkError::wrap("query not executed", e))?;
        let (_, body) = response::validate(response).await?;

        let rows: Vec<Value> = serde_json::from_value(body)
            .map_err(|e| HkError::wrap("query not executed", e))?;
        rows.into_iter()
            .map(|value| {
                HkEntity::from_value(value).map_err(|e| HkError::wrap("query not executed", e))
            })
            .collect()
    }
}

/// Retrieval filter for [`HkRepository::get_entities`].
#[derive(Debug, Clone)]
pub enum EntityFilter {
    /// Raw text filter, sent as `text/plain`.
    Text(String),
    /// Structured JSON filter, sent as `application/json`.
    Json(Value),
}

impl EntityFilter {
    /// The empty JSON filter, matching every entity.
    #[must_use]
    pub fn all() -> Self {
        EntityFilter::Json(Value::Object(Map::new()))
    }
}

impl From<&str> for EntityFilter {
    fn from(filter: &str) -> Self {
        EntityFilter::Text(filter.to_string())
    }
}

impl From<String> for EntityFilter {
    fn from(filter: String) -> Self {
        EntityFilter::Text(filter)
    }
}

impl From<Value> for EntityFilter {
    fn from(filter: Value) -> Self {
        EntityFilter::Json(filter)
    }
}

impl From<Map<String, Value>> for EntityFilter {
    fn from(filter: Map<String, Value>) -> Self {
        EntityFilter::Json(Value::Object(filter))
    }
}

/// Source of the content handed to [`HkRepository::import_data`].
#[derive(Debug, Clone)]
pub enum ImportSource {
    /// Inline text.
    Text(String),
    /// A file, read fully into memory before the request.
    File(PathBuf),
}

impl ImportSource {
    async fn read(self) -> Result<String, HkError> {
        match self {
            ImportSource::Text(text) => Ok(text),
            ImportSource::File(path) => tokio::fs::read_to_string(&path).await.map_err(|e| {
                HkError::wrap(format!("could not read import source {}", path.display()), e)
            }),
        }
    }
}

impl From<&str> for ImportSource {
    fn from(text: &str) -> Self {
        ImportSource::Text(text.to_string())
    }
}

impl From<String> for ImportSource {
    fn from(text: String) -> Self {
        ImportSource::Text(text)
    }
}

impl From<&Path> for ImportSource {
    fn from(path: &Path) -> Self {
        ImportSource::File(path.to_path_buf())
    }
}

impl From<PathBuf> for ImportSource {
    fn from(path: PathBuf) -> Self {
        ImportSource::File(path)
    }
}

/// Options for [`HkRepository::import_data`], mirrored as query
/// parameters on the import request.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Treat the content as hkbase JSON entities and route it through
    /// [`HkRepository::add_entities`] instead of the RDF endpoint.
    pub as_hk: bool,
    /// Parent context the imported data is scoped under.
    pub context: Option<ContextRef>,
    /// Extra options forwarded verbatim as query parameters.
    pub extra: Vec<(String, String)>,
}

impl ImportOptions {
    fn context_id(&self) -> Option<&str> {
        self.context.as_ref().map(ContextRef::id)
    }

    fn query_params(&self) -> Vec<(String, String)> {
        let mut params = self.extra.clone();
        if let Some(context) = self.context_id() {
            params.push(("context".to_string(), context.to_string()));
        }
        params
    }
}

/// A parent context given either as its id or as the context entity.
#[derive(Debug, Clone)]
pub enum ContextRef {
    /// The context id.
    Id(String),
    /// The context entity; its id is used.
    Entity(Context),
}

impl ContextRef {
    /// The id of the referenced context.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            ContextRef::Id(id) => id,
            ContextRef::Entity(context) => &context.id,
        }
    }
}

impl From<&str> for ContextRef {
    fn from(id: &str) -> Self {
        ContextRef::Id(id.to_string())
    }
}

impl From<String> for ContextRef {
    fn from(id: String) -> Self {
        ContextRef::Id(id)
    }
}

impl From<Context> for ContextRef {
    fn from(context: Context) -> Self {
        ContextRef::Entity(context)
    }
}

/// Normalization of caller input into the JSON entity values sent to the
/// server.
///
/// Implemented for typed entities, raw JSON objects, and collections of
/// either, so a single entity and a whole batch go through the same
/// method.
pub trait IntoEntityValues {
    /// Normalize into the list of JSON objects for the request body.
    ///
    /// # Errors
    ///
    /// Returns [`HkError::InvalidEntity`] for raw values that are not
    /// JSON objects.
    fn into_entity_values(self) -> Result<Vec<Value>, HkError>;
}

impl IntoEntityValues for HkEntity {
    fn into_entity_values(self) -> Result<Vec<Value>, HkError> {
        let value = self
            .to_value()
            .map_err(|e| HkError::wrap("invalid entity", e))?;
        Ok(vec![value])
    }
}

impl IntoEntityValues for &HkEntity {
    fn into_entity_values(self) -> Result<Vec<Value>, HkError> {
        self.clone().into_entity_values()
    }
}

impl IntoEntityValues for Vec<HkEntity> {
    fn into_entity_values(self) -> Result<Vec<Value>, HkError> {
        self.into_iter()
            .map(|entity| {
                entity
                    .to_value()
                    .map_err(|e| HkError::wrap("invalid entity", e))
            })
            .collect()
    }
}

impl IntoEntityValues for &[HkEntity] {
    fn into_entity_values(self) -> Result<Vec<Value>, HkError> {
        self.to_vec().into_entity_values()
    }
}

impl IntoEntityValues for Value {
    fn into_entity_values(self) -> Result<Vec<Value>, HkError> {
        match self {
            Value::Array(values) => values.into_entity_values(),
            value @ Value::Object(_) => Ok(vec![value]),
            _ => Err(HkError::InvalidEntity),
        }
    }
}

impl IntoEntityValues for Vec<Value> {
    fn into_entity_values(self) -> Result<Vec<Value>, HkError> {
        if self.iter().all(Value::is_object) {
            Ok(self)
        } else {
            Err(HkError::InvalidEntity)
        }
    }
}

/// Normalization of caller input into the entity-id list sent to the
/// server.
pub trait IntoEntityIds {
    /// Normalize into the list of ids for the request body.
    fn into_entity_ids(self) -> Vec<String>;
}

impl IntoEntityIds for &str {
    fn into_entity_ids(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoEntityIds for String {
    fn into_entity_ids(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoEntityIds for Vec<String> {
    fn into_entity_ids(self) -> Vec<String> {
        self
    }
}

impl IntoEntityIds for Vec<&str> {
    fn into_entity_ids(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl IntoEntityIds for &HkEntity {
    fn into_entity_ids(self) -> Vec<String> {
        vec![self.id().to_string()]
    }
}

impl IntoEntityIds for HkEntity {
    fn into_entity_ids(self) -> Vec<String> {
        vec![self.id().to_string()]
    }
}

impl IntoEntityIds for Vec<HkEntity> {
    fn into_entity_ids(self) -> Vec<String> {
        self.iter().map(|entity| entity.id().to_string()).collect()
    }
}

impl IntoEntityIds for &[HkEntity] {
    fn into_entity_ids(self) -> Vec<String> {
        self.iter().map(|entity| entity.id().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::HkBaseConfig;
    use hkbase_model::Node;
    use serde_json::json;

    fn repository(name: &str) -> HkRepository {
        HkBase::new(HkBaseConfig::new("http://localhost:3000"))
            .unwrap()
            .repository(name)
    }

    #[test]
    fn urls_follow_the_rest_namespace() {
        let repo = repository("books");
        assert_eq!(
            repo.url("entity/"),
            "http://localhost:3000/v2/repository/books/entity/"
        );
        assert_eq!(
            repo.url("rdf"),
            "http://localhost:3000/v2/repository/books/rdf"
        );
        assert_eq!(
            repo.url("query/"),
            "http://localhost:3000/v2/repository/books/query/"
        );
    }

    #[test]
    fn repository_name_is_encoded_in_urls() {
        let repo = repository("my repo");
        assert_eq!(
            repo.url("entity/"),
            "http://localhost:3000/v2/repository/my%20repo/entity/"
        );
    }

    #[test]
    fn single_entity_normalizes_to_one_value() {
        let values = HkEntity::Node(Node::new("n1")).into_entity_values().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0]["id"], json!("n1"));
        assert_eq!(values[0]["type"], json!("node"));
    }

    #[test]
    fn raw_objects_pass_through_unchanged() {
        let raw = json!({"type": "node", "id": "n1", "custom": true});
        let values = raw.clone().into_entity_values().unwrap();
        assert_eq!(values, vec![raw]);
    }

    #[test]
    fn raw_non_object_is_invalid() {
        let err = json!("just a string").into_entity_values().unwrap_err();
        assert!(matches!(err, HkError::InvalidEntity));
    }

    #[test]
    fn array_with_non_object_element_is_invalid() {
        let err = json!([{"type": "node", "id": "n1"}, 42])
            .into_entity_values()
            .unwrap_err();
        assert!(matches!(err, HkError::InvalidEntity));
    }

    #[test]
    fn entities_normalize_to_their_ids() {
        let entities = vec![
            HkEntity::Node(Node::new("n1")),
            HkEntity::Node(Node::new("n2")),
        ];
        assert_eq!(entities.into_entity_ids(), vec!["n1", "n2"]);
    }

    #[test]
    fn single_id_normalizes_to_one_element() {
        assert_eq!("n1".into_entity_ids(), vec!["n1"]);
    }

    #[test]
    fn filter_from_str_is_text() {
        assert!(matches!(EntityFilter::from("css filter"), EntityFilter::Text(_)));
    }

    #[test]
    fn filter_from_value_is_json() {
        assert!(matches!(
            EntityFilter::from(json!({"type": "node"})),
            EntityFilter::Json(_)
        ));
    }

    #[test]
    fn empty_filter_is_an_empty_object() {
        let EntityFilter::Json(value) = EntityFilter::all() else {
            panic!("expected json filter");
        };
        assert_eq!(value, json!({}));
    }

    #[test]
    fn context_ref_resolves_entity_to_id() {
        let context = Context::new("ctx1");
        assert_eq!(ContextRef::from(context).id(), "ctx1");
        assert_eq!(ContextRef::from("ctx2").id(), "ctx2");
    }

    #[test]
    fn import_options_mirror_context_as_query_param() {
        let options = ImportOptions {
            context: Some(ContextRef::from("ctx1")),
            extra: vec![("graph".to_string(), "g1".to_string())],
            ..ImportOptions::default()
        };
        let params = options.query_params();
        assert!(params.contains(&("graph".to_string(), "g1".to_string())));
        assert!(params.contains(&("context".to_string(), "ctx1".to_string())));
    }

    #[test]
    fn create_transaction_keeps_explicit_id() {
        let repo = repository("books");
        let tx = repo.create_transaction(Some("tx-9".to_string()));
        assert_eq!(tx.id(), "tx-9");
        assert_eq!(tx.repository(), "books");
    }

    #[test]
    fn create_transaction_generates_an_id() {
        let repo = repository("books");
        let tx = repo.create_transaction(None);
        assert!(!tx.id().is_empty());
        assert_eq!(tx.repository(), "books");
    }

    #[tokio::test]
    async fn import_source_reads_files_fully() {
        use std::io::Write as _;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<a> <b> <c> .").unwrap();

        let content = ImportSource::from(file.path()).read().await.unwrap();
        assert_eq!(content, "<a> <b> <c> .");
    }

    #[tokio::test]
    async fn import_source_missing_file_is_wrapped() {
        let err = ImportSource::File(PathBuf::from("/nonexistent/data.ttl"))
            .read()
            .await
            .unwrap_err();
        assert!(matches!(err, HkError::Client { .. }));
    }
}
