//! Typed backend operations and their HTTP requests.

use pocketbridge_core::Credential;

/// HTTP verb of a backend request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl Method {
    /// Upper-case verb
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Paging, filtering and sorting shared by list operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based page
    pub page: u32,
    /// Items per page
    pub per_page: u32,
    /// Backend filter expression
    pub filter: Option<String>,
    /// Sort expression, e.g. `-created,title`
    pub sort: Option<String>,
}

impl ListQuery {
    /// Default page size
    pub const DEFAULT_PER_PAGE: u32 = 30;
    /// Largest page size the backend accepts
    pub const MAX_PER_PAGE: u32 = 500;

    /// Create a query for the given page
    #[must_use]
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            filter: None,
            sort: None,
        }
    }

    /// Set the filter
    #[must_use]
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    /// Set the sort
    #[must_use]
    pub fn with_sort(mut self, sort: Option<String>) -> Self {
        self.sort = sort;
        self
    }

    fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("perPage".to_string(), self.per_page.to_string()),
        ];
        push_opt(&mut pairs, "filter", self.filter.as_deref());
        push_opt(&mut pairs, "sort", self.sort.as_deref());
        pairs
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_PER_PAGE)
    }
}

/// One backend call
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// List records of a collection
    ListRecords {
        /// Collection name or id
        collection: String,
        /// Paging and filtering
        query: ListQuery,
        /// Relations to expand
        expand: Option<String>,
        /// Fields to return
        fields: Option<String>,
    },
    /// Fetch one record
    GetRecord {
        /// Collection name or id
        collection: String,
        /// Record id
        id: String,
        /// Relations to expand
        expand: Option<String>,
        /// Fields to return
        fields: Option<String>,
    },
    /// Create a record
    CreateRecord {
        /// Collection name or id
        collection: String,
        /// Field values
        data: serde_json::Value,
        /// Relations to expand in the response
        expand: Option<String>,
    },
    /// Update a record
    UpdateRecord {
        /// Collection name or id
        collection: String,
        /// Record id
        id: String,
        /// Field values to change
        data: serde_json::Value,
        /// Relations to expand in the response
        expand: Option<String>,
    },
    /// Delete a record
    DeleteRecord {
        /// Collection name or id
        collection: String,
        /// Record id
        id: String,
    },
    /// List collections
    ListCollections {
        /// Paging and filtering
        query: ListQuery,
    },
    /// Fetch a collection definition
    GetCollection {
        /// Collection name or id
        name: String,
    },
    /// Create a collection
    CreateCollection {
        /// Full collection definition
        definition: serde_json::Value,
    },
    /// Update a collection
    UpdateCollection {
        /// Collection name or id
        name: String,
        /// Changed definition fields
        definition: serde_json::Value,
    },
    /// Delete a collection
    DeleteCollection {
        /// Collection name or id
        name: String,
    },
    /// Authenticate as a superuser
    AuthAdmin {
        /// Superuser email
        email: String,
        /// Superuser password
        password: String,
    },
    /// Authenticate a record of an auth collection
    AuthWithPassword {
        /// Auth collection
        collection: String,
        /// Username or email
        identity: String,
        /// Password
        password: String,
    },
    /// Refresh the current credential
    AuthRefresh {
        /// Collection of the current credential
        collection: String,
    },
    /// Backend health
    Health,
    /// List request logs
    ListLogs {
        /// Paging and filtering
        query: ListQuery,
    },
    /// Fetch one log entry
    GetLog {
        /// Log id
        id: String,
    },
    /// Hourly log statistics
    LogStats {
        /// Backend filter expression
        filter: Option<String>,
    },
    /// List backups
    ListBackups,
    /// Create a backup
    CreateBackup {
        /// Archive name, generated by the backend when absent
        name: Option<String>,
    },
    /// Delete a backup
    DeleteBackup {
        /// Archive key
        key: String,
    },
    /// Restore a backup
    RestoreBackup {
        /// Archive key
        key: String,
    },
}

/// HTTP request derived from an [`Operation`]
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Verb
    pub method: Method,
    /// Unencoded path segments below the base URL
    pub segments: Vec<String>,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// JSON body
    pub body: Option<serde_json::Value>,
}

impl Request {
    fn new(method: Method, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|s| (*s).to_string()).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Slash-joined path, for logging
    #[must_use]
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

impl Operation {
    /// Short name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListRecords { .. } => "list_records",
            Self::GetRecord { .. } => "get_record",
            Self::CreateRecord { .. } => "create_record",
            Self::UpdateRecord { .. } => "update_record",
            Self::DeleteRecord { .. } => "delete_record",
            Self::ListCollections { .. } => "list_collections",
            Self::GetCollection { .. } => "get_collection",
            Self::CreateCollection { .. } => "create_collection",
            Self::UpdateCollection { .. } => "update_collection",
            Self::DeleteCollection { .. } => "delete_collection",
            Self::AuthAdmin { .. } => "auth_admin",
            Self::AuthWithPassword { .. } => "auth_with_password",
            Self::AuthRefresh { .. } => "auth_refresh",
            Self::Health => "health",
            Self::ListLogs { .. } => "list_logs",
            Self::GetLog { .. } => "get_log",
            Self::LogStats { .. } => "log_stats",
            Self::ListBackups => "list_backups",
            Self::CreateBackup { .. } => "create_backup",
            Self::DeleteBackup { .. } => "delete_backup",
            Self::RestoreBackup { .. } => "restore_backup",
        }
    }

    /// Whether the backend only accepts this from a superuser
    #[must_use]
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Self::ListCollections { .. }
                | Self::GetCollection { .. }
                | Self::CreateCollection { .. }
                | Self::UpdateCollection { .. }
                | Self::DeleteCollection { .. }
                | Self::ListLogs { .. }
                | Self::GetLog { .. }
                | Self::LogStats { .. }
                | Self::ListBackups
                | Self::CreateBackup { .. }
                | Self::DeleteBackup { .. }
                | Self::RestoreBackup { .. }
        )
    }

    /// Collection whose credential a successful call yields
    #[must_use]
    pub fn auth_collection(&self) -> Option<&str> {
        match self {
            Self::AuthAdmin { .. } => Some(Credential::SUPERUSER_COLLECTION),
            Self::AuthWithPassword { collection, .. } | Self::AuthRefresh { collection } => {
                Some(collection.as_str())
            }
            _ => None,
        }
    }

    /// Build the HTTP request
    #[must_use]
    pub fn request(&self) -> Request {
        match self {
            Self::ListRecords {
                collection,
                query,
                expand,
                fields,
            } => {
                let mut pairs = query.pairs();
                push_opt(&mut pairs, "expand", expand.as_deref());
                push_opt(&mut pairs, "fields", fields.as_deref());
                Request::new(Method::Get, &["api", "collections", collection.as_str(), "records"])
                    .with_query(pairs)
            }
            Self::GetRecord {
                collection,
                id,
                expand,
                fields,
            } => {
                let mut pairs = Vec::new();
                push_opt(&mut pairs, "expand", expand.as_deref());
                push_opt(&mut pairs, "fields", fields.as_deref());
                Request::new(Method::Get, &["api", "collections", collection.as_str(), "records", id.as_str()])
                    .with_query(pairs)
            }
            Self::CreateRecord {
                collection,
                data,
                expand,
            } => {
                let mut pairs = Vec::new();
                push_opt(&mut pairs, "expand", expand.as_deref());
                Request::new(Method::Post, &["api", "collections", collection.as_str(), "records"])
                    .with_query(pairs)
                    .with_body(data.clone())
            }
            Self::UpdateRecord {
                collection,
                id,
                data,
                expand,
            } => {
                let mut pairs = Vec::new();
                push_opt(&mut pairs, "expand", expand.as_deref());
                Request::new(Method::Patch, &["api", "collections", collection.as_str(), "records", id.as_str()])
                    .with_query(pairs)
                    .with_body(data.clone())
            }
            Self::DeleteRecord { collection, id } => {
                Request::new(Method::Delete, &["api", "collections", collection.as_str(), "records", id.as_str()])
            }
            Self::ListCollections { query } => {
                Request::new(Method::Get, &["api", "collections"]).with_query(query.pairs())
            }
            Self::GetCollection { name } => Request::new(Method::Get, &["api", "collections", name.as_str()]),
            Self::CreateCollection { definition } => {
                Request::new(Method::Post, &["api", "collections"]).with_body(definition.clone())
            }
            Self::UpdateCollection { name, definition } => {
                Request::new(Method::Patch, &["api", "collections", name.as_str()])
                    .with_body(definition.clone())
            }
            Self::DeleteCollection { name } => {
                Request::new(Method::Delete, &["api", "collections", name.as_str()])
            }
            Self::AuthAdmin { email, password } => Request::new(
                Method::Post,
                &[
                    "api",
                    "collections",
                    Credential::SUPERUSER_COLLECTION,
                    "auth-with-password",
                ],
            )
            .with_body(serde_json::json!({ "identity": email, "password": password })),
            Self::AuthWithPassword {
                collection,
                identity,
                password,
            } => Request::new(
                Method::Post,
                &["api", "collections", collection.as_str(), "auth-with-password"],
            )
            .with_body(serde_json::json!({ "identity": identity, "password": password })),
            Self::AuthRefresh { collection } => {
                Request::new(Method::Post, &["api", "collections", collection.as_str(), "auth-refresh"])
            }
            Self::Health => Request::new(Method::Get, &["api", "health"]),
            Self::ListLogs { query } => {
                Request::new(Method::Get, &["api", "logs"]).with_query(query.pairs())
            }
            Self::GetLog { id } => Request::new(Method::Get, &["api", "logs", id.as_str()]),
            Self::LogStats { filter } => {
                let mut pairs = Vec::new();
                push_opt(&mut pairs, "filter", filter.as_deref());
                Request::new(Method::Get, &["api", "logs", "stats"]).with_query(pairs)
            }
            Self::ListBackups => Request::new(Method::Get, &["api", "backups"]),
            Self::CreateBackup { name } => {
                let body = match name {
                    Some(name) => serde_json::json!({ "name": name }),
                    None => serde_json::json!({}),
                };
                Request::new(Method::Post, &["api", "backups"]).with_body(body)
            }
            Self::DeleteBackup { key } => Request::new(Method::Delete, &["api", "backups", key.as_str()]),
            Self::RestoreBackup { key } => {
                Request::new(Method::Post, &["api", "backups", key.as_str(), "restore"])
            }
        }
    }
}

fn push_opt(pairs: &mut Vec<(String, String)>, key: &str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        pairs.push((key.to_string(), v.to_string()));
    }
}
