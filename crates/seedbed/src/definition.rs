//! Definition tree and loader.
//!
//! A [`Definition`] is the fully materialized form of a manifest: every DDL
//! file slurped into memory and every seed-data file parsed into rows. It is
//! built once and never mutated afterwards; loading the same fixture
//! directory twice yields structurally equal trees.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use crate::cell::Cell;
use crate::error::{FixtureError, FixtureResult};
use crate::manifest::Manifest;

/// One seed-data row: field name to cell. Key order follows the source
/// document; fields legitimately vary row to row.
pub type Row = IndexMap<String, Cell>;

/// Fully loaded fixture definition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Definition {
	/// Schemas in creation order.
	pub schemas: Vec<SchemaDef>,
	/// Seed-data sets in load order. Several entries may target the same
	/// `schema.table` (from suffixed identifiers); each loads independently.
	pub data: Vec<DataDef>,
}

/// One schema with its raw DDL bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDef {
	/// Unprefixed schema name.
	pub name: String,
	/// Raw table DDL text, in listed order.
	pub tables: Vec<String>,
	/// Raw function DDL text, in listed order.
	pub functions: Vec<String>,
}

/// One seed-data set targeting a single table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDef {
	/// Unprefixed schema name.
	pub schema: String,
	/// Table name.
	pub table: String,
	/// Seed rows, in document order.
	pub rows: Vec<Row>,
}

impl Manifest {
	/// Materializes the manifest into a [`Definition`].
	///
	/// DDL files are read from `<root>/schema/<schema>/tables/<table>.sql`
	/// and `<root>/schema/<schema>/functions/<fn>.sql`; seed data from
	/// `<root>/data/<identifier>.yml`.
	///
	/// # Errors
	///
	/// The whole load aborts on the first unreadable file
	/// ([`FixtureError::FileUnreadable`]) or unparsable data file
	/// ([`FixtureError::MalformedData`]); no partial definition is returned.
	pub fn load(&self, root: &Path) -> FixtureResult<Definition> {
		let mut definition = Definition::default();

		for schema in &self.schemas {
			let mut schema_def = SchemaDef {
				name: schema.name.clone(),
				tables: Vec::with_capacity(schema.tables.len()),
				functions: Vec::with_capacity(schema.functions.len()),
			};

			for table in &schema.tables {
				let path = root
					.join("schema")
					.join(&schema.name)
					.join("tables")
					.join(format!("{}.sql", table));
				schema_def.tables.push(read_file(&path)?);
			}

			for function in &schema.functions {
				let path = root
					.join("schema")
					.join(&schema.name)
					.join("functions")
					.join(format!("{}.sql", function));
				schema_def.functions.push(read_file(&path)?);
			}

			definition.schemas.push(schema_def);
		}

		for identifier in &self.data {
			definition.data.push(load_data(root, identifier)?);
		}

		Ok(definition)
	}
}

fn read_file(path: &Path) -> FixtureResult<String> {
	fs::read_to_string(path).map_err(|source| FixtureError::FileUnreadable {
		path: path.to_path_buf(),
		source,
	})
}

/// Loads one seed-data set. The identifier addresses both the target table
/// (first two dot-separated segments) and the source file (all segments).
fn load_data(root: &Path, identifier: &str) -> FixtureResult<DataDef> {
	let mut segments = identifier.split('.');
	let (Some(schema), Some(table)) = (segments.next(), segments.next()) else {
		return Err(FixtureError::MalformedData {
			identifier: identifier.to_string(),
			message: "identifier must be of the form schema.table[.suffix]".to_string(),
		});
	};

	let path = root.join("data").join(format!("{}.yml", identifier));
	let text = read_file(&path)?;

	// an empty document means zero rows, not a parse error
	let rows: Vec<Row> = if text.trim().is_empty() {
		Vec::new()
	} else {
		serde_yaml::from_str(&text).map_err(|source| FixtureError::MalformedData {
			identifier: identifier.to_string(),
			message: source.to_string(),
		})?
	};

	Ok(DataDef {
		schema: schema.to_string(),
		table: table.to_string(),
		rows,
	})
}
