//! The closed set of provider operations.
//!
//! Operations arrive as a `(type, payload)` pair. [`Operation::from_parts`]
//! rejects unknown types with [`RequestError::UnsupportedOperation`] before
//! any port is touched, then decodes the payload into a typed variant.
//! Everything downstream matches on [`Operation`] exhaustively, so adding a
//! kind is a compile-checked change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RequestError;

/// Discriminant of an [`Operation`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Create a table.
    CreateTable,
    /// Read rows.
    Query,
    /// Insert rows.
    Insert,
    /// Update rows matching a filter.
    Update,
    /// Delete rows matching a filter.
    Delete,
}

impl OperationKind {
    /// Every supported kind.
    pub const ALL: [OperationKind; 5] = [
        OperationKind::CreateTable,
        OperationKind::Query,
        OperationKind::Insert,
        OperationKind::Update,
        OperationKind::Delete,
    ];

    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::CreateTable => "create_table",
            OperationKind::Query => "query",
            OperationKind::Insert => "insert",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        }
    }

    /// HTTP status reported when the provider accepts this kind of operation.
    pub fn success_status(&self) -> u16 {
        match self {
            OperationKind::CreateTable => 202,
            OperationKind::Insert => 201,
            OperationKind::Query | OperationKind::Update | OperationKind::Delete => 200,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| RequestError::UnsupportedOperation(s.to_string()))
    }
}

/// Column definition for [`CreateTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Provider-specific column type (e.g. `text`, `uuid`).
    #[serde(rename = "type")]
    pub data_type: String,
    /// Whether the column accepts nulls.
    #[serde(default)]
    pub nullable: bool,
    /// Whether the column is (part of) the primary key.
    #[serde(default)]
    pub primary_key: bool,
}

/// Payload of [`Operation::CreateTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTable {
    /// Table name.
    pub name: String,
    /// Columns; the provider picks defaults when empty.
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
}

/// Payload of [`Operation::Query`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Query {
    /// Table to read.
    pub table: String,
    /// Columns to return; all columns when empty.
    #[serde(default)]
    pub select: Vec<String>,
    /// Equality filter.
    #[serde(default)]
    pub filter: Map<String, Value>,
    /// Maximum number of rows.
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Payload of [`Operation::Insert`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Insert {
    /// Target table.
    pub table: String,
    /// Rows to insert.
    pub rows: Vec<Map<String, Value>>,
}

/// Payload of [`Operation::Update`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Update {
    /// Target table.
    pub table: String,
    /// Equality filter selecting rows; must not be empty.
    pub filter: Map<String, Value>,
    /// Column values to set.
    pub values: Map<String, Value>,
}

/// Payload of [`Operation::Delete`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Delete {
    /// Target table.
    pub table: String,
    /// Equality filter selecting rows; must not be empty.
    pub filter: Map<String, Value>,
}

/// A provider operation with its typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Operation {
    /// See [`CreateTable`].
    CreateTable(CreateTable),
    /// See [`Query`].
    Query(Query),
    /// See [`Insert`].
    Insert(Insert),
    /// See [`Update`].
    Update(Update),
    /// See [`Delete`].
    Delete(Delete),
}

impl Operation {
    /// Parses an operation from its wire type and JSON payload.
    ///
    /// # Errors
    ///
    /// - [`RequestError::UnsupportedOperation`] if `kind` is not a known type
    /// - [`RequestError::InvalidPayload`] if the payload does not decode or
    ///   fails validation
    ///
    /// # Examples
    ///
    /// ```
    /// use credential_broker::{Operation, OperationKind, RequestError};
    /// use serde_json::json;
    ///
    /// let op = Operation::from_parts("create_table", json!({ "name": "docs" })).unwrap();
    /// assert_eq!(op.kind(), OperationKind::CreateTable);
    ///
    /// let err = Operation::from_parts("drop_database", json!({})).unwrap_err();
    /// assert!(matches!(err, RequestError::UnsupportedOperation(_)));
    /// ```
    pub fn from_parts(kind: &str, payload: Value) -> Result<Self, RequestError> {
        let kind: OperationKind = kind.parse()?;
        let invalid = |e: serde_json::Error| RequestError::InvalidPayload {
            kind,
            message: e.to_string(),
        };

        let operation = match kind {
            OperationKind::CreateTable => {
                Operation::CreateTable(serde_json::from_value(payload).map_err(invalid)?)
            }
            OperationKind::Query => Operation::Query(serde_json::from_value(payload).map_err(invalid)?),
            OperationKind::Insert => {
                Operation::Insert(serde_json::from_value(payload).map_err(invalid)?)
            }
            OperationKind::Update => {
                Operation::Update(serde_json::from_value(payload).map_err(invalid)?)
            }
            OperationKind::Delete => {
                Operation::Delete(serde_json::from_value(payload).map_err(invalid)?)
            }
        };

        operation.validate()?;
        Ok(operation)
    }

    /// Returns the kind of this operation.
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::CreateTable(_) => OperationKind::CreateTable,
            Operation::Query(_) => OperationKind::Query,
            Operation::Insert(_) => OperationKind::Insert,
            Operation::Update(_) => OperationKind::Update,
            Operation::Delete(_) => OperationKind::Delete,
        }
    }

    /// Returns the table the operation touches.
    pub fn table(&self) -> &str {
        match self {
            Operation::CreateTable(op) => &op.name,
            Operation::Query(op) => &op.table,
            Operation::Insert(op) => &op.table,
            Operation::Update(op) => &op.table,
            Operation::Delete(op) => &op.table,
        }
    }

    /// Checks payload rules serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidPayload`] naming the first broken rule.
    pub fn validate(&self) -> Result<(), RequestError> {
        let kind = self.kind();
        let reject = |message: &str| {
            Err(RequestError::InvalidPayload {
                kind,
                message: message.to_string(),
            })
        };

        if self.table().trim().is_empty() {
            return reject("table name must not be empty");
        }

        match self {
            Operation::CreateTable(op) => {
                if op.columns.iter().any(|c| c.name.trim().is_empty()) {
                    return reject("column names must not be empty");
                }
            }
            Operation::Query(op) => {
                if op.limit == Some(0) {
                    return reject("limit must be greater than 0");
                }
            }
            Operation::Insert(op) => {
                if op.rows.is_empty() {
                    return reject("at least one row is required");
                }
            }
            Operation::Update(op) => {
                if op.filter.is_empty() {
                    return reject("update requires a non-empty filter");
                }
                if op.values.is_empty() {
                    return reject("update requires at least one value");
                }
            }
            Operation::Delete(op) => {
                if op.filter.is_empty() {
                    return reject("delete requires a non-empty filter");
                }
            }
        }

        Ok(())
    }
}
