use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Code {
    TableNotFound,
    TableExists,
    TableDisabled,
    InvalidFilterConfig,
    EmptyFilterConfig,
    MalformedKeyRange,
    StorageUnavailable,
    InvalidArgument,
    Corruption,
}

#[derive(Debug, Clone)]
pub struct Status {
    code: Code,
    message: Option<String>,
}

impl Status {
    pub fn new(code: Code, msg: impl Into<String>) -> Self {
        Status {
            code,
            message: Some(msg.into()),
        }
    }

    pub fn table_not_found(table: &str) -> Self {
        Status::new(Code::TableNotFound, format!("table '{table}' does not exist"))
    }

    pub fn table_exists(table: &str) -> Self {
        Status::new(Code::TableExists, format!("table '{table}' already exists"))
    }

    pub fn table_disabled(table: &str) -> Self {
        Status::new(Code::TableDisabled, format!("table '{table}' is disabled"))
    }

    pub fn invalid_filter_config(msg: impl Into<String>) -> Self {
        Status::new(Code::InvalidFilterConfig, msg)
    }

    pub fn empty_filter_config(msg: impl Into<String>) -> Self {
        Status::new(Code::EmptyFilterConfig, msg)
    }

    pub fn malformed_key_range(msg: impl Into<String>) -> Self {
        Status::new(Code::MalformedKeyRange, msg)
    }

    pub fn storage_unavailable(msg: impl Into<String>) -> Self {
        Status::new(Code::StorageUnavailable, msg)
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Status::new(Code::InvalidArgument, msg)
    }

    pub fn corruption(msg: impl Into<String>) -> Self {
        Status::new(Code::Corruption, msg)
    }

    pub fn is_table_not_found(&self) -> bool {
        self.code == Code::TableNotFound
    }

    pub fn is_table_exists(&self) -> bool {
        self.code == Code::TableExists
    }

    pub fn is_storage_unavailable(&self) -> bool {
        self.code == Code::StorageUnavailable
    }

    pub fn is_corruption(&self) -> bool {
        self.code == Code::Corruption
    }

    pub fn code(&self) -> &Code {
        &self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{:?}: {}", self.code, msg),
            None => write!(f, "{:?}", self.code),
        }
    }
}

impl std::error::Error for Status {}

impl From<std::io::Error> for Status {
    fn from(err: std::io::Error) -> Self {
        Status::storage_unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for Status {
    fn from(err: serde_json::Error) -> Self {
        Status::corruption(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Status>;
