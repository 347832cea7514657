//! Lifecycle orchestration.
//!
//! A [`Fixture`] owns one loaded [`Definition`] and one namespace prefix and
//! drives the three lifecycle passes against the database:
//!
//! 1. [`create`](Fixture::create) — schemas, tables, functions, fail-fast;
//! 2. [`insert`](Fixture::insert) — one batched INSERT per data set, fail-fast;
//! 3. [`drop_schemas`](Fixture::drop_schemas) — best-effort teardown.
//!
//! Every created schema is recorded in a provenance table
//! (`` `<tracking>`.schemas ``, columns `name, prefix, hostname, dropped`)
//! which must already exist on the server; it is the only persistent state
//! outside the fixture schemas themselves.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::definition::{DataDef, Definition};
use crate::error::{FixtureError, FixtureResult};
use crate::executor::{Executor, SqlValue};
use crate::insert;

/// Token inside DDL bodies that stands for "this schema's prefixed name".
const SCHEMA_TOKEN: &str = "{{schema}}";

/// Default provenance schema name.
const DEFAULT_TRACKING_SCHEMA: &str = "zombie";

/// Orchestrates the create/insert/drop lifecycle for one definition under
/// one namespace prefix.
pub struct Fixture<E> {
	executor: E,
	definition: Definition,
	prefix: String,
	tracking_schema: String,
	hostname: String,
}

impl<E: Executor> Fixture<E> {
	/// Creates an orchestrator over a definition and a run-unique prefix.
	///
	/// The prefix must be unique per test run; it is what keeps concurrent
	/// runs from colliding. See [`derive_prefix`] for the conventional way
	/// to build one.
	pub fn new(executor: E, definition: Definition, prefix: impl Into<String>) -> Self {
		Self {
			executor,
			definition,
			prefix: prefix.into(),
			tracking_schema: DEFAULT_TRACKING_SCHEMA.to_string(),
			hostname: "localhost".to_string(),
		}
	}

	/// Sets the schema holding the provenance table.
	pub fn with_tracking_schema(mut self, schema: impl Into<String>) -> Self {
		self.tracking_schema = schema.into();
		self
	}

	/// Sets the hostname recorded in provenance rows.
	pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
		self.hostname = hostname.into();
		self
	}

	/// The namespace prefix this fixture applies to every schema.
	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	/// Creates schemas and inserts seed rows: [`create`](Self::create)
	/// followed by [`insert`](Self::insert).
	pub async fn set_up(&self) -> FixtureResult<()> {
		self.create().await?;
		self.insert().await
	}

	/// Drops everything created by [`set_up`](Self::set_up).
	pub async fn tear_down(&self) -> FixtureResult<()> {
		self.drop_schemas().await
	}

	/// Creates every schema with its tables and functions, in manifest
	/// order.
	///
	/// Per schema: a provenance row is inserted, the prefixed schema is
	/// created, then each table DDL and each function DDL is executed with
	/// the `{{schema}}` token substituted. The first failure aborts the
	/// whole pass; there is no rollback, so callers should still
	/// [`drop_schemas`](Self::drop_schemas) afterwards.
	pub async fn create(&self) -> FixtureResult<()> {
		for schema in &self.definition.schemas {
			self.track(&schema.name).await?;
			self.exec(format!("create schema `{}_{}`", self.prefix, schema.name), Vec::new())
				.await?;

			for ddl in &schema.tables {
				self.apply_ddl(&schema.name, ddl).await?;
			}
			for ddl in &schema.functions {
				self.apply_ddl(&schema.name, ddl).await?;
			}
		}
		Ok(())
	}

	/// Inserts all seed rows, one batched statement per data set, in
	/// manifest order. Data sets with no rows are skipped. The first
	/// failure aborts the pass; already-inserted rows remain.
	pub async fn insert(&self) -> FixtureResult<()> {
		for data in &self.definition.data {
			self.load(data).await?;
		}
		Ok(())
	}

	/// Drops every schema and stamps its provenance row.
	///
	/// Best-effort: every schema is attempted even after a failure, because
	/// an orphaned schema is worse than a lost error detail. Each failure is
	/// logged; the returned error is the last one encountered. The
	/// provenance update only runs for schemas that actually dropped.
	pub async fn drop_schemas(&self) -> FixtureResult<()> {
		let mut failure = None;

		for schema in &self.definition.schemas {
			let drop = self
				.exec(format!("drop schema `{}_{}`", self.prefix, schema.name), Vec::new())
				.await;
			let result = match drop {
				Ok(()) => {
					self.exec(
						format!(
							"update `{}`.schemas set dropped = now() where name = ? and prefix = ?",
							self.tracking_schema
						),
						vec![
							SqlValue::from(schema.name.as_str()),
							SqlValue::from(self.prefix.as_str()),
						],
					)
					.await
				}
				Err(error) => Err(error),
			};

			if let Err(error) = result {
				tracing::warn!(schema = %schema.name, %error, "teardown step failed");
				failure = Some(error);
			}
		}

		match failure {
			Some(error) => Err(error),
			None => Ok(()),
		}
	}

	/// Inserts the provenance row for one schema.
	async fn track(&self, name: &str) -> FixtureResult<()> {
		self.exec(
			format!(
				"insert into `{}`.schemas (name, prefix, hostname) values (?, ?, ?)",
				self.tracking_schema
			),
			vec![
				SqlValue::from(name),
				SqlValue::from(self.prefix.as_str()),
				SqlValue::from(self.hostname.as_str()),
			],
		)
		.await
	}

	/// Executes one DDL body with the schema token substituted.
	async fn apply_ddl(&self, schema: &str, ddl: &str) -> FixtureResult<()> {
		let query = substitute_schema(ddl, &format!("{}_{}", self.prefix, schema));
		self.exec(query, Vec::new()).await
	}

	/// Runs the batched INSERT for one data set, if it has any rows.
	async fn load(&self, data: &DataDef) -> FixtureResult<()> {
		let Some(batch) = insert::generate(&data.rows) else {
			return Ok(());
		};
		let query = batch.statement(&self.prefix, &data.schema, &data.table);
		self.exec(query, batch.parameters).await
	}

	async fn exec(&self, query: String, parameters: Vec<SqlValue>) -> FixtureResult<()> {
		tracing::debug!(%query, "executing statement");
		match self.executor.execute(&query, &parameters).await {
			Ok(()) => Ok(()),
			Err(source) => Err(FixtureError::statement(query, parameters, source)),
		}
	}
}

/// Replaces the `{{schema}}` token in a DDL body with the prefixed schema
/// name, unquoted.
fn substitute_schema(ddl: &str, prefixed: &str) -> String {
	ddl.replace(SCHEMA_TOKEN, prefixed)
}

static IDENT_UNSAFE: Lazy<Regex> =
	Lazy::new(|| Regex::new("[^0-9a-zA-Z$_]").expect("valid identifier regex"));

/// Derives a namespace prefix from a hostname and a wall-clock instant.
///
/// The hostname is reduced to characters legal in an unquoted MySQL
/// identifier and truncated to 19 characters; the result is
/// `z_<host>_<unix-seconds>`. Pure function of its inputs — the caller
/// supplies both, which keeps the lifecycle deterministic under test.
pub fn derive_prefix(hostname: &str, now: DateTime<Utc>) -> String {
	let mut host = IDENT_UNSAFE.replace_all(hostname, "_").into_owned();
	host.truncate(19);
	format!("z_{}_{}", host, now.timestamp())
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use rstest::rstest;

	#[rstest]
	fn test_substitute_schema() {
		assert_eq!(
			substitute_schema(
				"create table {{schema}}.users (id int); grant on {{schema}}.users",
				"z_host_1_blog"
			),
			"create table z_host_1_blog.users (id int); grant on z_host_1_blog.users"
		);
	}

	#[rstest]
	fn test_substitute_schema_without_token() {
		assert_eq!(substitute_schema("create table t (id int)", "p_blog"), "create table t (id int)");
	}

	#[rstest]
	#[case::clean("buildbox", "z_buildbox_1431763200")]
	#[case::sanitized("build-box.local", "z_build_box_local_1431763200")]
	#[case::truncated("a-very-long-hostname-indeed", "z_a_very_long_hostnam_1431763200")]
	fn test_derive_prefix(#[case] hostname: &str, #[case] expected: &str) {
		let now = Utc.with_ymd_and_hms(2015, 5, 16, 8, 0, 0).unwrap();
		assert_eq!(derive_prefix(hostname, now), expected);
	}
}
