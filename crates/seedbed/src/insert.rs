//! Batched INSERT generation.
//!
//! Turns a set of sparse, heterogeneous rows over one table into a single
//! multi-row INSERT. The column list is the union of every row's destination
//! columns, sorted lexicographically — the sort exists purely so generated
//! SQL is stable and testable; the statement would work in any order.
//!
//! Per cell:
//! - absent from the row, or present with no value: `?` placeholder, bind NULL;
//! - literal parameter: `?` placeholder, bind the value as text;
//! - raw SQL (`param: false`): the value goes into the statement text
//!   verbatim and unescaped, and binds nothing.

use std::collections::{BTreeSet, HashMap};

use crate::cell::Cell;
use crate::definition::Row;
use crate::executor::SqlValue;

/// A generated multi-row INSERT, minus the table it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInsert {
	/// Destination column names, lexicographically sorted, unquoted.
	pub columns: Vec<String>,
	/// The VALUES tuples, e.g. `(?,?,now()),(?,?,?)`.
	pub values: String,
	/// Bound parameters in row-major, then column-sorted order, matching
	/// placeholder order exactly.
	pub parameters: Vec<SqlValue>,
}

impl BatchInsert {
	/// Renders the full statement against a prefixed schema and table.
	pub fn statement(&self, prefix: &str, schema: &str, table: &str) -> String {
		let columns = self
			.columns
			.iter()
			.map(|column| format!("`{}`", column))
			.collect::<Vec<_>>()
			.join(",");
		format!(
			"insert into `{}_{}`.`{}` ({}) VALUES {}",
			prefix, schema, table, columns, self.values
		)
	}
}

/// Generates one batched INSERT for `rows`, or `None` when there is nothing
/// to insert.
pub fn generate(rows: &[Row]) -> Option<BatchInsert> {
	if rows.is_empty() {
		return None;
	}

	let columns = insert_columns(rows);
	let mut tuples = Vec::with_capacity(rows.len());
	let mut parameters = Vec::new();

	for row in rows {
		let (tuple, row_parameters) = row_values(&columns, row);
		tuples.push(tuple);
		parameters.extend(row_parameters);
	}

	Some(BatchInsert {
		columns,
		values: tuples.join(","),
		parameters,
	})
}

/// The union of every row's destination columns, sorted.
fn insert_columns(rows: &[Row]) -> Vec<String> {
	let mut columns = BTreeSet::new();
	for row in rows {
		for (field, cell) in row {
			columns.insert(cell.destination(field).to_string());
		}
	}
	columns.into_iter().collect()
}

/// One row's value tuple and its bound parameters.
fn row_values(columns: &[String], row: &Row) -> (String, Vec<SqlValue>) {
	let by_destination: HashMap<&str, &Cell> = row
		.iter()
		.map(|(field, cell)| (cell.destination(field), cell))
		.collect();

	let mut values = Vec::with_capacity(columns.len());
	let mut parameters = Vec::new();

	for column in columns {
		match by_destination.get(column.as_str()) {
			Some(cell) if cell.present && !cell.param => {
				// trusted raw SQL, inlined verbatim
				values.push(cell.value.clone());
			}
			Some(cell) if cell.present => {
				values.push("?".to_string());
				parameters.push(SqlValue::Text(cell.value.clone()));
			}
			_ => {
				values.push("?".to_string());
				parameters.push(SqlValue::Null);
			}
		}
	}

	(format!("({})", values.join(",")), parameters)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn rows(yaml: &str) -> Vec<Row> {
		serde_yaml::from_str(yaml).unwrap()
	}

	#[rstest]
	fn test_empty_rows_generate_nothing() {
		assert_eq!(generate(&[]), None);
	}

	#[rstest]
	fn test_sparse_rows_share_one_statement() {
		let rows = rows(
			"- id: 1\n  username: maya\n  joined: \"2015-05-05\"\n- id: 2\n",
		);
		let batch = generate(&rows).unwrap();

		assert_eq!(batch.columns, ["id", "joined", "username"]);
		assert_eq!(batch.values, "(?,?,?),(?,?,?)");
		assert_eq!(
			batch.parameters,
			[
				SqlValue::from("1"),
				SqlValue::from("2015-05-05"),
				SqlValue::from("maya"),
				SqlValue::from("2"),
				SqlValue::Null,
				SqlValue::Null,
			]
		);
	}

	#[rstest]
	fn test_explicit_column_overrides_field_name() {
		let rows = rows("- id: 1\n  title:\n    column: article-title\n    value: suzyQ\n");
		let batch = generate(&rows).unwrap();
		assert_eq!(batch.columns, ["article-title", "id"]);
		assert_eq!(
			batch.parameters,
			[SqlValue::from("suzyQ"), SqlValue::from("1")]
		);
	}

	#[rstest]
	fn test_raw_sql_is_inlined_and_binds_nothing() {
		let rows = rows(
			"- id: 1\n  comment: cool!\n  posted:\n    param: false\n    value: now()\n",
		);
		let batch = generate(&rows).unwrap();
		assert_eq!(batch.columns, ["comment", "id", "posted"]);
		assert_eq!(batch.values, "(?,?,now())");
		assert_eq!(
			batch.parameters,
			[SqlValue::from("cool!"), SqlValue::from("1")]
		);
	}

	#[rstest]
	fn test_raw_looking_parameter_stays_a_parameter() {
		let rows = rows("- id: 1\n  report: now()\n");
		let batch = generate(&rows).unwrap();
		assert_eq!(batch.values, "(?,?)");
		assert_eq!(
			batch.parameters,
			[SqlValue::from("1"), SqlValue::from("now()")]
		);
	}

	#[rstest]
	fn test_present_null_binds_null() {
		let rows = rows("- id: 1\n  posted: null\n");
		let batch = generate(&rows).unwrap();
		assert_eq!(batch.columns, ["id", "posted"]);
		assert_eq!(batch.values, "(?,?)");
		assert_eq!(batch.parameters, [SqlValue::from("1"), SqlValue::Null]);
	}

	#[rstest]
	fn test_columns_are_sorted_for_any_key_order() {
		let forward = rows("- a: 1\n  m: 2\n  z: 3\n");
		let backward = rows("- z: 3\n  m: 2\n  a: 1\n");
		assert_eq!(generate(&forward).unwrap().columns, ["a", "m", "z"]);
		assert_eq!(generate(&backward).unwrap().columns, ["a", "m", "z"]);
	}

	#[rstest]
	fn test_union_has_no_duplicates() {
		let rows = rows(
			"- id: 1\n- title:\n    column: id\n    value: 2\n",
		);
		let batch = generate(&rows).unwrap();
		assert_eq!(batch.columns, ["id"]);
		assert_eq!(batch.values, "(?),(?)");
	}

	#[rstest]
	fn test_full_statement_rendering() {
		let rows = rows("- id: 1\n  username: maya\n");
		let batch = generate(&rows).unwrap();
		assert_eq!(
			batch.statement("v_test", "blog", "users"),
			"insert into `v_test_blog`.`users` (`id`,`username`) VALUES (?,?)"
		);
	}
}
