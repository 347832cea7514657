//! Fixture manifest.
//!
//! The manifest declares which schemas, tables, functions, and seed-data
//! sets make up one fixture set. It lives at the root of the fixture
//! directory as `test.config.json`:
//!
//! ```json
//! {
//!   "schemas": [
//!     {"name": "blog", "tables": ["users"], "functions": ["copy_article"]}
//!   ],
//!   "data": ["blog.users", "blog.comments.article1"]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{FixtureError, FixtureResult};

/// Conventional manifest file name inside a fixture directory.
pub const MANIFEST_FILE: &str = "test.config.json";

/// Top-level fixture declaration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Manifest {
	/// Schema descriptors, in creation order.
	#[serde(default)]
	pub schemas: Vec<ManifestSchema>,
	/// Seed-data identifiers of the form `schema.table[.suffix]`, in load
	/// order. The suffix splits one table's rows across several files.
	#[serde(default)]
	pub data: Vec<String>,
}

/// One schema and the names of its table and function DDL files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestSchema {
	/// Schema name, unprefixed.
	pub name: String,
	/// Table DDL file names (without the `.sql` extension), in order.
	#[serde(default)]
	pub tables: Vec<String>,
	/// Function DDL file names (without the `.sql` extension), in order.
	#[serde(default)]
	pub functions: Vec<String>,
}

impl Manifest {
	/// Reads and parses a manifest file.
	///
	/// # Errors
	///
	/// Returns [`FixtureError::FileUnreadable`] if the file cannot be read
	/// and [`FixtureError::MalformedManifest`] if it is not valid JSON of
	/// the expected shape.
	pub fn from_path(path: &Path) -> FixtureResult<Self> {
		let text = fs::read_to_string(path).map_err(|source| FixtureError::FileUnreadable {
			path: path.to_path_buf(),
			source,
		})?;
		serde_json::from_str(&text).map_err(|source| FixtureError::MalformedManifest {
			path: path.to_path_buf(),
			source,
		})
	}

	/// Reads `test.config.json` from a fixture directory.
	pub fn from_dir(root: &Path) -> FixtureResult<Self> {
		Self::from_path(&root.join(MANIFEST_FILE))
	}
}
