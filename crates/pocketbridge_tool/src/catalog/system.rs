//! Health, logs and backups.

use super::{BackendTool, Plan};
use crate::present::Present;
use crate::schema::{Access, ToolSchema, param};
use crate::tool::Tool;
use crate::validate::{FieldErrors, Paging, Params};
use pocketbridge_backend::Operation;
use serde::Deserialize;
use std::sync::Arc;

/// Parameters of tools that take none
#[derive(Debug, Default, Deserialize)]
pub struct NoParams {}

impl Params for NoParams {}

/// `list_logs` parameters
#[derive(Debug, Deserialize)]
pub struct ListLogsParams {
    /// Paging, filter and sort
    #[serde(flatten)]
    pub paging: Paging,
}

impl Params for ListLogsParams {
    fn check(&self, errors: &mut FieldErrors) {
        self.paging.check(errors);
    }
}

/// `get_log` parameters
#[derive(Debug, Deserialize)]
pub struct GetLogParams {
    /// Log entry id
    pub id: String,
}

impl Params for GetLogParams {
    fn check(&self, errors: &mut FieldErrors) {
        errors.non_empty("id", &self.id);
    }
}

/// `get_log_stats` parameters
#[derive(Debug, Deserialize)]
pub struct LogStatsParams {
    /// Backend filter expression
    #[serde(default)]
    pub filter: Option<String>,
}

impl Params for LogStatsParams {}

/// `create_backup` parameters
#[derive(Debug, Deserialize)]
pub struct CreateBackupParams {
    /// Archive name; generated by the backend when absent
    #[serde(default)]
    pub name: Option<String>,
}

impl Params for CreateBackupParams {
    fn check(&self, errors: &mut FieldErrors) {
        if let Some(name) = &self.name {
            errors.backup_key("name", name);
        }
    }
}

/// Parameters naming one backup archive
#[derive(Debug, Deserialize)]
pub struct BackupParams {
    /// Archive name
    pub key: String,
}

impl Params for BackupParams {
    fn check(&self, errors: &mut FieldErrors) {
        errors.backup_key("key", &self.key);
    }
}

/// System tools
#[must_use]
pub fn tools() -> Vec<Arc<dyn Tool>> {
    vec![
        BackendTool::<NoParams>::shared(
            ToolSchema::new("health_check", "Check that the backend is up"),
            |_: NoParams| Plan::new(Operation::Health, Present::Document),
        ),
        BackendTool::<ListLogsParams>::shared(
            ToolSchema::new("list_logs", "List request logs, newest first by default")
                .with_param("page", param::integer("Page number (default 1)", 1, None))
                .with_param("perPage", param::integer("Items per page (default 30)", 1, Some(500)))
                .with_param("filter", param::string("Filter expression, e.g. data.status >= 400"))
                .with_param("sort", param::string("Sort fields, e.g. -created"))
                .with_access(Access::Admin),
            |p: ListLogsParams| {
                Plan::new(
                    Operation::ListLogs {
                        query: p.paging.query(),
                    },
                    Present::Page,
                )
            },
        ),
        BackendTool::<GetLogParams>::shared(
            ToolSchema::new("get_log", "Fetch one log entry")
                .with_required("id", param::string("Log entry id"))
                .with_access(Access::Admin),
            |p: GetLogParams| Plan::new(Operation::GetLog { id: p.id }, Present::Document),
        ),
        BackendTool::<LogStatsParams>::shared(
            ToolSchema::new("get_log_stats", "Hourly request counts")
                .with_param("filter", param::string("Filter expression"))
                .with_access(Access::Admin),
            |p: LogStatsParams| {
                Plan::new(Operation::LogStats { filter: p.filter }, Present::Under("stats"))
            },
        ),
        BackendTool::<NoParams>::shared(
            ToolSchema::new("list_backups", "List backup archives").with_access(Access::Admin),
            |_: NoParams| Plan::new(Operation::ListBackups, Present::Under("backups")),
        ),
        BackendTool::<CreateBackupParams>::shared(
            ToolSchema::new("create_backup", "Create a backup archive")
                .with_param("name", param::string("Archive name ending in .zip"))
                .with_access(Access::Admin),
            |p: CreateBackupParams| {
                let present = Present::ack("created", "name", p.name.as_deref().unwrap_or("auto"));
                Plan::new(Operation::CreateBackup { name: p.name }, present)
            },
        ),
        BackendTool::<BackupParams>::shared(
            ToolSchema::new("delete_backup", "Delete a backup archive")
                .with_required("key", param::string("Archive name"))
                .with_access(Access::Admin),
            |p: BackupParams| {
                let present = Present::ack("deleted", "key", &p.key);
                Plan::new(Operation::DeleteBackup { key: p.key }, present)
            },
        ),
        BackendTool::<BackupParams>::shared(
            ToolSchema::new("restore_backup", "Restore a backup archive; the backend restarts afterwards")
                .with_required("key", param::string("Archive name"))
                .with_access(Access::Admin),
            |p: BackupParams| {
                let present = Present::ack("restored", "key", &p.key);
                Plan::new(Operation::RestoreBackup { key: p.key }, present)
            },
        ),
    ]
}
