//! Seed cell model.
//!
//! One cell of a seed-data row. A cell is polymorphic over three authoring
//! forms:
//!
//! - a bare scalar: sent as a bound parameter under the row's field name;
//! - `null` (or an absent field): rendered as a bound SQL NULL;
//! - a mapping `{value, column?, param?}`: `column` redirects the value to a
//!   different destination column, and `param: false` inlines `value`
//!   verbatim into the statement text instead of binding it.
//!
//! The `param: false` form is a deliberate trust boundary: the value is not
//! escaped or validated in any way, which is what makes expressions like
//! `now()` usable in seed data.

use serde::de::{self, Deserialize, Deserializer};
use serde_yaml::Value;

use crate::error::{FixtureError, FixtureResult};

/// One value slot in a seed-data row, normalized from any of the three
/// authoring forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
	/// Whether the cell carries a value at all. Absent cells bind as NULL.
	pub present: bool,
	/// If true, `value` is sent as a bound parameter; if false, it is
	/// inlined verbatim into the SQL text.
	pub param: bool,
	/// The raw value text.
	pub value: String,
	/// Destination column override; empty means "use the row's field name".
	pub column: String,
}

impl Cell {
	/// A present literal-parameter cell, the bare-scalar form.
	pub fn scalar(value: impl Into<String>) -> Self {
		Self {
			present: true,
			param: true,
			value: value.into(),
			column: String::new(),
		}
	}

	/// An absent cell, rendered as a bound NULL.
	pub fn null() -> Self {
		Self::default()
	}

	/// Normalizes an untyped YAML value into a cell.
	///
	/// # Errors
	///
	/// Returns [`FixtureError::MalformedCell`] when the mapping form has a
	/// wrongly typed field (e.g. `column` is not a string) or the value is
	/// neither a scalar nor a mapping.
	pub fn from_value(value: &Value) -> FixtureResult<Self> {
		match value {
			Value::Null => Ok(Self::null()),
			Value::Bool(_) | Value::Number(_) | Value::String(_) => {
				Ok(Self::scalar(scalar_text(value)?))
			}
			Value::Mapping(map) => {
				let mut cell = Self {
					present: true,
					param: true,
					..Self::default()
				};
				for (key, entry) in map {
					let key = key.as_str().ok_or_else(|| {
						FixtureError::MalformedCell("mapping keys must be strings".to_string())
					})?;
					match key {
						"value" => cell.value = scalar_text(entry)?,
						"column" => {
							cell.column = entry
								.as_str()
								.ok_or_else(|| {
									FixtureError::MalformedCell(
										"'column' must be a string".to_string(),
									)
								})?
								.to_string();
						}
						"param" => {
							cell.param = entry.as_bool().ok_or_else(|| {
								FixtureError::MalformedCell(
									"'param' must be a boolean".to_string(),
								)
							})?;
						}
						// unknown keys are ignored, same as the manifest format
						_ => {}
					}
				}
				if !cell.param && cell.value.is_empty() {
					// almost certainly an authoring mistake, but legal
					tracing::warn!("raw SQL cell has an empty value");
				}
				Ok(cell)
			}
			_ => Err(FixtureError::MalformedCell(
				"expected a scalar or a mapping".to_string(),
			)),
		}
	}

	/// The destination column for this cell when it sits under `field`.
	pub fn destination<'a>(&'a self, field: &'a str) -> &'a str {
		if self.column.is_empty() {
			field
		} else {
			&self.column
		}
	}
}

/// Renders a scalar YAML value as text. `null` becomes the empty string.
fn scalar_text(value: &Value) -> FixtureResult<String> {
	match value {
		Value::Null => Ok(String::new()),
		Value::Bool(flag) => Ok(flag.to_string()),
		Value::Number(number) => Ok(number.to_string()),
		Value::String(text) => Ok(text.clone()),
		_ => Err(FixtureError::MalformedCell(
			"'value' must be a scalar".to_string(),
		)),
	}
}

impl<'de> Deserialize<'de> for Cell {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = Value::deserialize(deserializer)?;
		Cell::from_value(&value).map_err(de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn parse(yaml: &str) -> FixtureResult<Cell> {
		let value: Value = serde_yaml::from_str(yaml).unwrap();
		Cell::from_value(&value)
	}

	#[rstest]
	#[case::string("maya", "maya")]
	#[case::integer("1", "1")]
	#[case::date("\"2015-05-05\"", "2015-05-05")]
	#[case::boolean("true", "true")]
	fn test_bare_scalar(#[case] yaml: &str, #[case] expected: &str) {
		let cell = parse(yaml).unwrap();
		assert!(cell.present);
		assert!(cell.param);
		assert_eq!(cell.value, expected);
		assert_eq!(cell.column, "");
	}

	#[rstest]
	fn test_null_is_absent() {
		let cell = parse("null").unwrap();
		assert_eq!(cell, Cell::null());
		assert!(!cell.present);
		assert!(!cell.param);
	}

	#[rstest]
	fn test_mapping_with_column() {
		let cell = parse("{value: suzyQ, column: article-title}").unwrap();
		assert!(cell.present);
		assert!(cell.param);
		assert_eq!(cell.value, "suzyQ");
		assert_eq!(cell.column, "article-title");
	}

	#[rstest]
	fn test_mapping_raw_sql() {
		let cell = parse("{value: now(), param: false}").unwrap();
		assert!(cell.present);
		assert!(!cell.param);
		assert_eq!(cell.value, "now()");
	}

	#[rstest]
	fn test_mapping_param_defaults_to_true() {
		let cell = parse("{value: now()}").unwrap();
		assert!(cell.param);
	}

	#[rstest]
	fn test_mapping_ignores_unknown_keys() {
		let cell = parse("{value: x, comment: whatever}").unwrap();
		assert_eq!(cell.value, "x");
	}

	#[rstest]
	#[case::column_not_string("{value: x, column: 5}")]
	#[case::param_not_bool("{value: x, param: yes-please}")]
	#[case::sequence("[1, 2]")]
	#[case::nested_value("{value: [1, 2]}")]
	fn test_malformed(#[case] yaml: &str) {
		assert!(matches!(
			parse(yaml),
			Err(FixtureError::MalformedCell(_))
		));
	}

	#[rstest]
	fn test_destination() {
		assert_eq!(Cell::scalar("x").destination("title"), "title");
		let cell = parse("{value: x, column: article-title}").unwrap();
		assert_eq!(cell.destination("title"), "article-title");
	}

	#[rstest]
	fn test_deserialize_in_row_context() {
		let row: indexmap::IndexMap<String, Cell> =
			serde_yaml::from_str("{id: 1, posted: null}").unwrap();
		assert_eq!(row["id"], Cell::scalar("1"));
		assert_eq!(row["posted"], Cell::null());
	}
}
