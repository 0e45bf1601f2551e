//! Record CRUD.

use super::{BackendTool, Plan};
use crate::present::Present;
use crate::schema::{ToolSchema, param};
use crate::tool::Tool;
use crate::validate::{FieldErrors, Paging, Params};
use pocketbridge_backend::Operation;
use serde::Deserialize;
use std::sync::Arc;

/// `list_records` parameters
#[derive(Debug, Deserialize)]
pub struct ListRecordsParams {
    /// Collection name
    pub collection: String,
    /// Paging, filter and sort
    #[serde(flatten)]
    pub paging: Paging,
    /// Relations to expand
    #[serde(default)]
    pub expand: Option<String>,
    /// Fields to return
    #[serde(default)]
    pub fields: Option<String>,
}

impl Params for ListRecordsParams {
    fn check(&self, errors: &mut FieldErrors) {
        errors.collection_name("collection", &self.collection);
        self.paging.check(errors);
    }
}

/// `get_record` parameters
#[derive(Debug, Deserialize)]
pub struct GetRecordParams {
    /// Collection name
    pub collection: String,
    /// Record id
    pub id: String,
    /// Relations to expand
    #[serde(default)]
    pub expand: Option<String>,
    /// Fields to return
    #[serde(default)]
    pub fields: Option<String>,
}

impl Params for GetRecordParams {
    fn check(&self, errors: &mut FieldErrors) {
        errors.collection_name("collection", &self.collection);
        errors.non_empty("id", &self.id);
    }
}

/// `create_record` parameters
#[derive(Debug, Deserialize)]
pub struct CreateRecordParams {
    /// Collection name
    pub collection: String,
    /// Field values
    pub data: serde_json::Value,
    /// Relations to expand in the response
    #[serde(default)]
    pub expand: Option<String>,
}

impl Params for CreateRecordParams {
    fn check(&self, errors: &mut FieldErrors) {
        errors.collection_name("collection", &self.collection);
        errors.object("data", &self.data);
    }
}

/// `update_record` parameters
#[derive(Debug, Deserialize)]
pub struct UpdateRecordParams {
    /// Collection name
    pub collection: String,
    /// Record id
    pub id: String,
    /// Field values to change
    pub data: serde_json::Value,
    /// Relations to expand in the response
    #[serde(default)]
    pub expand: Option<String>,
}

impl Params for UpdateRecordParams {
    fn check(&self, errors: &mut FieldErrors) {
        errors.collection_name("collection", &self.collection);
        errors.non_empty("id", &self.id);
        errors.object("data", &self.data);
    }
}

/// `delete_record` parameters
#[derive(Debug, Deserialize)]
pub struct DeleteRecordParams {
    /// Collection name
    pub collection: String,
    /// Record id
    pub id: String,
}

impl Params for DeleteRecordParams {
    fn check(&self, errors: &mut FieldErrors) {
        errors.collection_name("collection", &self.collection);
        errors.non_empty("id", &self.id);
    }
}

fn collection() -> serde_json::Value {
    param::string("Collection name, e.g. posts")
}

fn with_paging(schema: ToolSchema) -> ToolSchema {
    schema
        .with_param("page", param::integer("Page number (default 1)", 1, None))
        .with_param("perPage", param::integer("Items per page (default 30)", 1, Some(500)))
        .with_param("filter", param::string("Filter expression, e.g. status = 'published'"))
        .with_param("sort", param::string("Sort fields, prefix with - for descending"))
}

/// Record tools
#[must_use]
pub fn tools() -> Vec<Arc<dyn Tool>> {
    vec![
        BackendTool::<ListRecordsParams>::shared(
            with_paging(
                ToolSchema::new("list_records", "List records of a collection, one page at a time")
                    .with_required("collection", collection()),
            )
            .with_param("expand", param::string("Relations to expand"))
            .with_param("fields", param::string("Comma-separated fields to return")),
            |p: ListRecordsParams| {
                Plan::new(
                    Operation::ListRecords {
                        collection: p.collection,
                        query: p.paging.query(),
                        expand: p.expand,
                        fields: p.fields,
                    },
                    Present::Page,
                )
            },
        ),
        BackendTool::<GetRecordParams>::shared(
            ToolSchema::new("get_record", "Fetch one record by id")
                .with_required("collection", collection())
                .with_required("id", param::string("Record id"))
                .with_param("expand", param::string("Relations to expand"))
                .with_param("fields", param::string("Comma-separated fields to return")),
            |p: GetRecordParams| {
                Plan::new(
                    Operation::GetRecord {
                        collection: p.collection,
                        id: p.id,
                        expand: p.expand,
                        fields: p.fields,
                    },
                    Present::Document,
                )
            },
        ),
        BackendTool::<CreateRecordParams>::shared(
            ToolSchema::new("create_record", "Create a record")
                .with_required("collection", collection())
                .with_required("data", param::object("Field values"))
                .with_param("expand", param::string("Relations to expand in the response")),
            |p: CreateRecordParams| {
                Plan::new(
                    Operation::CreateRecord {
                        collection: p.collection,
                        data: p.data,
                        expand: p.expand,
                    },
                    Present::Document,
                )
            },
        ),
        BackendTool::<UpdateRecordParams>::shared(
            ToolSchema::new("update_record", "Update fields of an existing record")
                .with_required("collection", collection())
                .with_required("id", param::string("Record id"))
                .with_required("data", param::object("Field values to change"))
                .with_param("expand", param::string("Relations to expand in the response")),
            |p: UpdateRecordParams| {
                Plan::new(
                    Operation::UpdateRecord {
                        collection: p.collection,
                        id: p.id,
                        data: p.data,
                        expand: p.expand,
                    },
                    Present::Document,
                )
            },
        ),
        BackendTool::<DeleteRecordParams>::shared(
            ToolSchema::new("delete_record", "Delete a record")
                .with_required("collection", collection())
                .with_required("id", param::string("Record id")),
            |p: DeleteRecordParams| {
                let present = Present::ack("deleted", "id", &p.id);
                Plan::new(
                    Operation::DeleteRecord {
                        collection: p.collection,
                        id: p.id,
                    },
                    present,
                )
            },
        ),
    ]
}
