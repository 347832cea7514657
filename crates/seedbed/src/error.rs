//! Error types for fixture provisioning.
//!
//! Load-time errors abort the whole load; no partial [`Definition`] is ever
//! returned. Statement errors carry the failing query and its bound
//! parameters for diagnostics.
//!
//! [`Definition`]: crate::definition::Definition

use std::path::PathBuf;

use thiserror::Error;

use crate::executor::{BoxError, SqlValue};

/// Errors that can occur while loading definitions or driving the database.
#[derive(Debug, Error)]
pub enum FixtureError {
	/// A manifest, DDL, or seed-data file is missing or unreadable.
	#[error("unreadable file: {path}")]
	FileUnreadable {
		/// Path of the file that could not be read.
		path: PathBuf,
		/// Underlying I/O error.
		#[source]
		source: std::io::Error,
	},

	/// The manifest file is not valid JSON of the expected shape.
	#[error("malformed manifest: {path}")]
	MalformedManifest {
		/// Path of the manifest file.
		path: PathBuf,
		/// Underlying JSON error.
		#[source]
		source: serde_json::Error,
	},

	/// A seed-data file failed to parse into rows.
	#[error("malformed seed data '{identifier}': {message}")]
	MalformedData {
		/// The `schema.table[.suffix]` identifier of the data set.
		identifier: String,
		/// What went wrong.
		message: String,
	},

	/// A cell's mapping form has a wrongly typed field.
	#[error("malformed cell: {0}")]
	MalformedCell(String),

	/// The database rejected a statement.
	#[error("statement failed: {query}")]
	Statement {
		/// The query text that was executed.
		query: String,
		/// The parameters that were bound to it.
		parameters: Vec<SqlValue>,
		/// Error reported by the database collaborator.
		#[source]
		source: BoxError,
	},
}

impl FixtureError {
	/// Wraps a database failure with the statement that caused it.
	pub fn statement(query: impl Into<String>, parameters: Vec<SqlValue>, source: BoxError) -> Self {
		Self::Statement {
			query: query.into(),
			parameters,
			source,
		}
	}
}

/// Result type alias for fixture operations.
pub type FixtureResult<T> = Result<T, FixtureError>;
