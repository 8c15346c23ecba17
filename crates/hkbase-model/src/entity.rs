//! Typed hkbase entities and their JSON conversion.
//!
//! hkbase exchanges entities as JSON objects discriminated by a `type`
//! field: `node`, `context`, `link`, `connector`, `ref`. The enum below
//! mirrors that wire shape one-to-one, so conversion is plain serde.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A graph entity as stored in a hkbase repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HkEntity {
    /// A plain graph node.
    Node(Node),
    /// A context, grouping entities under a common scope.
    Context(Context),
    /// A link binding entities through a connector's roles.
    Link(Link),
    /// A connector, describing the roles links of its class bind.
    Connector(Connector),
    /// A reference to an entity anchored in another scope.
    #[serde(rename = "ref")]
    Reference(Reference),
}

impl HkEntity {
    /// Convert a generic JSON value into a typed entity.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotAnObject`] if `value` is not a JSON
    /// object, [`ModelError::UnknownType`] if its `type` field is missing
    /// or names no known entity kind, and [`ModelError::Invalid`] if the
    /// remaining fields do not match that kind's shape.
    pub fn from_value(value: Value) -> Result<Self, ModelError> {
        let Some(object) = value.as_object() else {
            return Err(ModelError::NotAnObject);
        };

        let kind = object
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !matches!(kind, "node" | "context" | "link" | "connector" | "ref") {
            return Err(ModelError::UnknownType(kind.to_string()));
        }

        serde_json::from_value(value).map_err(|e| ModelError::Invalid(e.to_string()))
    }

    /// Convert the entity back into its generic JSON representation.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Invalid`] if serialization fails.
    pub fn to_value(&self) -> Result<Value, ModelError> {
        serde_json::to_value(self).map_err(|e| ModelError::Invalid(e.to_string()))
    }

    /// The entity's identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            HkEntity::Node(n) => &n.id,
            HkEntity::Context(c) => &c.id,
            HkEntity::Link(l) => &l.id,
            HkEntity::Connector(c) => &c.id,
            HkEntity::Reference(r) => &r.id,
        }
    }

    /// The wire name of the entity's kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            HkEntity::Node(_) => "node",
            HkEntity::Context(_) => "context",
            HkEntity::Link(_) => "link",
            HkEntity::Connector(_) => "connector",
            HkEntity::Reference(_) => "ref",
        }
    }
}

/// A plain graph node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Node {
    /// Entity identifier.
    pub id: String,
    /// Identifier of the context this node belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Arbitrary property map.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    /// Properties attached to properties.
    #[serde(
        rename = "metaProperties",
        default,
        skip_serializing_if = "Map::is_empty"
    )]
    pub meta_properties: Map<String, Value>,
}

impl Node {
    /// Create a node with the given identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// A context, grouping entities under a common scope.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Context {
    /// Entity identifier.
    pub id: String,
    /// Identifier of the enclosing context, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Arbitrary property map.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    /// Properties attached to properties.
    #[serde(
        rename = "metaProperties",
        default,
        skip_serializing_if = "Map::is_empty"
    )]
    pub meta_properties: Map<String, Value>,
}

impl Context {
    /// Create a context with the given identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// A link binding entities through a connector's roles.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Link {
    /// Entity identifier.
    pub id: String,
    /// Identifier of the connector describing this link's roles.
    pub connector: String,
    /// Role name to bound entity ids.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub binds: Map<String, Value>,
    /// Identifier of the context this link belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Arbitrary property map.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl Link {
    /// Create a link with the given identifier and connector.
    #[must_use]
    pub fn new(id: impl Into<String>, connector: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            connector: connector.into(),
            ..Self::default()
        }
    }
}

/// A connector, describing the roles links of its class bind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Connector {
    /// Entity identifier.
    pub id: String,
    /// Connector class (e.g. `facts`, `hierarchy`).
    #[serde(rename = "className")]
    pub class_name: String,
    /// Role name to role type.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub roles: Map<String, Value>,
}

impl Connector {
    /// Create a connector with the given identifier and class.
    #[must_use]
    pub fn new(id: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            class_name: class_name.into(),
            roles: Map::new(),
        }
    }
}

/// A reference to an entity anchored in another scope.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Reference {
    /// Entity identifier.
    pub id: String,
    /// Identifier of the referenced entity.
    #[serde(rename = "ref")]
    pub target: String,
    /// Identifier of the context this reference belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Arbitrary property map.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl Reference {
    /// Create a reference with the given identifier and target.
    #[must_use]
    pub fn new(id: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            target: target.into(),
            ..Self::default()
        }
    }
}

/// Errors that can occur converting between JSON values and entities.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    /// The value is not a JSON object
    #[error("entity is not a JSON object")]
    NotAnObject,
    /// The `type` field is missing or unrecognized
    #[error("unknown entity type: {0:?}")]
    UnknownType(String),
    /// The value does not match the entity shape
    #[error("invalid entity: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_from_value() {
        let value = json!({
            "type": "node",
            "id": "n1",
            "parent": "ctx1",
            "properties": {"name": "alpha"}
        });

        let entity = HkEntity::from_value(value).unwrap();
        assert_eq!(entity.id(), "n1");
        assert_eq!(entity.kind(), "node");

        let HkEntity::Node(node) = entity else {
            panic!("expected node");
        };
        assert_eq!(node.parent.as_deref(), Some("ctx1"));
        assert_eq!(node.properties["name"], json!("alpha"));
    }

    #[test]
    fn link_binds_roundtrip() {
        let mut link = Link::new("l1", "isFriendOf");
        link.binds
            .insert("subject".to_string(), json!(["n1"]));
        link.binds
            .insert("object".to_string(), json!(["n2"]));

        let value = HkEntity::Link(link).to_value().unwrap();
        assert_eq!(value["type"], json!("link"));
        assert_eq!(value["connector"], json!("isFriendOf"));
        assert_eq!(value["binds"]["subject"], json!(["n1"]));
    }

    #[test]
    fn reference_uses_ref_field() {
        let value = json!({"type": "ref", "id": "r1", "ref": "n1"});
        let entity = HkEntity::from_value(value).unwrap();

        let HkEntity::Reference(reference) = entity else {
            panic!("expected reference");
        };
        assert_eq!(reference.target, "n1");

        let back = HkEntity::Reference(reference).to_value().unwrap();
        assert_eq!(back["ref"], json!("n1"));
        assert!(back.get("target").is_none());
    }

    #[test]
    fn connector_class_name_wire_field() {
        let connector = Connector::new("isFriendOf", "facts");
        let value = HkEntity::Connector(connector).to_value().unwrap();
        assert_eq!(value["className"], json!("facts"));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = HkEntity::from_value(json!({"type": "blob", "id": "x"})).unwrap_err();
        assert!(matches!(err, ModelError::UnknownType(t) if t == "blob"));
    }

    #[test]
    fn missing_type_is_rejected() {
        let err = HkEntity::from_value(json!({"id": "x"})).unwrap_err();
        assert!(matches!(err, ModelError::UnknownType(t) if t.is_empty()));
    }

    #[test]
    fn non_object_is_rejected() {
        let err = HkEntity::from_value(json!(["not", "an", "object"])).unwrap_err();
        assert!(matches!(err, ModelError::NotAnObject));
    }

    #[test]
    fn empty_maps_are_omitted() {
        let value = HkEntity::Node(Node::new("n1")).to_value().unwrap();
        assert!(value.get("properties").is_none());
        assert!(value.get("metaProperties").is_none());
        assert!(value.get("parent").is_none());
    }
}
