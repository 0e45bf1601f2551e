//! Collection management. Superuser only.

use super::{BackendTool, Plan};
use crate::present::Present;
use crate::schema::{Access, ToolSchema, param};
use crate::tool::Tool;
use crate::validate::{FieldErrors, Paging, Params};
use pocketbridge_backend::Operation;
use serde::Deserialize;
use std::sync::Arc;

const COLLECTION_TYPES: [&str; 3] = ["base", "auth", "view"];

/// `list_collections` parameters
#[derive(Debug, Deserialize)]
pub struct ListCollectionsParams {
    /// Paging, filter and sort
    #[serde(flatten)]
    pub paging: Paging,
}

impl Params for ListCollectionsParams {
    fn check(&self, errors: &mut FieldErrors) {
        self.paging.check(errors);
    }
}

/// Parameters naming one collection
#[derive(Debug, Deserialize)]
pub struct CollectionParams {
    /// Collection name
    pub name: String,
}

impl Params for CollectionParams {
    fn check(&self, errors: &mut FieldErrors) {
        errors.collection_name("name", &self.name);
    }
}

/// `create_collection` parameters
#[derive(Debug, Deserialize)]
pub struct CreateCollectionParams {
    /// Collection name
    pub name: String,
    /// `base`, `auth` or `view`
    #[serde(rename = "type", default = "default_type")]
    pub kind: String,
    /// Field definitions
    #[serde(default)]
    pub fields: Vec<serde_json::Value>,
    /// Rules and options passed through unchanged
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_type() -> String {
    "base".to_string()
}

impl CreateCollectionParams {
    fn definition(self) -> serde_json::Value {
        let mut definition = serde_json::Map::new();
        definition.insert("name".to_string(), self.name.into());
        definition.insert("type".to_string(), self.kind.into());
        definition.insert("fields".to_string(), self.fields.into());
        for (key, value) in self.extra {
            definition.entry(key).or_insert(value);
        }
        serde_json::Value::Object(definition)
    }
}

impl Params for CreateCollectionParams {
    fn check(&self, errors: &mut FieldErrors) {
        errors.collection_name("name", &self.name);
        if !COLLECTION_TYPES.contains(&self.kind.as_str()) {
            errors.add("type", "must be one of base, auth, view");
        }
        if self.fields.iter().any(|f| !f.is_object()) {
            errors.add("fields", "every field definition must be an object");
        }
    }
}

/// `update_collection` parameters
#[derive(Debug, Deserialize)]
pub struct UpdateCollectionParams {
    /// Collection name
    pub name: String,
    /// Definition fields to change
    pub data: serde_json::Value,
}

impl Params for UpdateCollectionParams {
    fn check(&self, errors: &mut FieldErrors) {
        errors.collection_name("name", &self.name);
        errors.object("data", &self.data);
    }
}

fn name() -> serde_json::Value {
    param::string("Collection name")
}

/// Collection tools
#[must_use]
pub fn tools() -> Vec<Arc<dyn Tool>> {
    vec![
        BackendTool::<ListCollectionsParams>::shared(
            ToolSchema::new("list_collections", "List collections with their schemas")
                .with_param("page", param::integer("Page number (default 1)", 1, None))
                .with_param("perPage", param::integer("Items per page (default 30)", 1, Some(500)))
                .with_param("filter", param::string("Filter expression"))
                .with_param("sort", param::string("Sort fields"))
                .with_access(Access::Admin),
            |p: ListCollectionsParams| {
                Plan::new(
                    Operation::ListCollections {
                        query: p.paging.query(),
                    },
                    Present::Page,
                )
            },
        ),
        BackendTool::<CollectionParams>::shared(
            ToolSchema::new("get_collection", "Fetch a collection definition")
                .with_required("name", name())
                .with_access(Access::Admin),
            |p: CollectionParams| Plan::new(Operation::GetCollection { name: p.name }, Present::Document),
        ),
        BackendTool::<CreateCollectionParams>::shared(
            ToolSchema::new("create_collection", "Create a collection")
                .with_required("name", name())
                .with_param("type", param::string("Collection type: base (default), auth or view"))
                .with_param("fields", param::array("Field definitions, e.g. {\"name\":\"title\",\"type\":\"text\"}"))
                .with_param("listRule", param::string("API rule for listing"))
                .with_param("viewRule", param::string("API rule for viewing"))
                .with_param("createRule", param::string("API rule for creating"))
                .with_param("updateRule", param::string("API rule for updating"))
                .with_param("deleteRule", param::string("API rule for deleting"))
                .with_access(Access::Admin),
            |p: CreateCollectionParams| {
                Plan::new(
                    Operation::CreateCollection {
                        definition: p.definition(),
                    },
                    Present::Document,
                )
            },
        ),
        BackendTool::<UpdateCollectionParams>::shared(
            ToolSchema::new("update_collection", "Change a collection definition")
                .with_required("name", name())
                .with_required("data", param::object("Definition fields to change"))
                .with_access(Access::Admin),
            |p: UpdateCollectionParams| {
                Plan::new(
                    Operation::UpdateCollection {
                        name: p.name,
                        definition: p.data,
                    },
                    Present::Document,
                )
            },
        ),
        BackendTool::<CollectionParams>::shared(
            ToolSchema::new("delete_collection", "Delete a collection and all of its records")
                .with_required("name", name())
                .with_access(Access::Admin),
            |p: CollectionParams| {
                let present = Present::ack("deleted", "name", &p.name);
                Plan::new(Operation::DeleteCollection { name: p.name }, present)
            },
        ),
    ]
}
