//! Database collaborator contract.
//!
//! The orchestrator only needs one capability from the database: execute a
//! SQL statement with a list of bound parameters. Everything else (driver,
//! pooling, timeouts) stays on the caller's side of this trait.

use std::fmt;

use async_trait::async_trait;

/// Boxed error returned by an [`Executor`] implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A value bound to a `?` placeholder.
///
/// Seed data is untyped text at this layer; the server coerces it. A cell
/// that is absent from a row binds as [`SqlValue::Null`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
	/// SQL NULL.
	Null,
	/// A string parameter, escaped by the driver.
	Text(String),
}

impl SqlValue {
	/// Returns true for [`SqlValue::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}
}

impl fmt::Display for SqlValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => write!(f, "NULL"),
			Self::Text(text) => write!(f, "'{}'", text),
		}
	}
}

impl From<&str> for SqlValue {
	fn from(text: &str) -> Self {
		Self::Text(text.to_string())
	}
}

impl From<String> for SqlValue {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl From<Option<String>> for SqlValue {
	fn from(text: Option<String>) -> Self {
		match text {
			Some(text) => Self::Text(text),
			None => Self::Null,
		}
	}
}

/// Executes SQL statements against the shared database server.
///
/// Implementations are expected to send `query` with `params` bound in
/// order. The orchestrator issues statements strictly one at a time and
/// awaits each result before the next.
#[async_trait]
pub trait Executor: Send + Sync {
	/// Executes a single statement with bound parameters.
	async fn execute(&self, query: &str, params: &[SqlValue]) -> Result<(), BoxError>;
}

#[async_trait]
impl<T: Executor + ?Sized> Executor for &T {
	async fn execute(&self, query: &str, params: &[SqlValue]) -> Result<(), BoxError> {
		(**self).execute(query, params).await
	}
}

#[async_trait]
impl<T: Executor + ?Sized> Executor for std::sync::Arc<T> {
	async fn execute(&self, query: &str, params: &[SqlValue]) -> Result<(), BoxError> {
		(**self).execute(query, params).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_from_str() {
		assert_eq!(SqlValue::from("maya"), SqlValue::Text("maya".to_string()));
	}

	#[rstest]
	fn test_from_option() {
		assert_eq!(SqlValue::from(None), SqlValue::Null);
		assert_eq!(
			SqlValue::from(Some("now()".to_string())),
			SqlValue::Text("now()".to_string())
		);
	}

	#[rstest]
	fn test_display() {
		assert_eq!(SqlValue::Null.to_string(), "NULL");
		assert_eq!(SqlValue::from("1").to_string(), "'1'");
	}

	#[rstest]
	fn test_is_null() {
		assert!(SqlValue::Null.is_null());
		assert!(!SqlValue::from("").is_null());
	}
}
