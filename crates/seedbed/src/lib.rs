//! Throwaway MySQL schema fixtures for test suites.
//!
//! `seedbed` provisions and tears down isolated copies of a set of database
//! schemas so integration tests can run against real tables without
//! colliding with each other or with anything else on the server. Every run
//! gets a unique namespace prefix; every created schema is `<prefix>_<name>`
//! and is recorded in a provenance table so stragglers can be found later.
//!
//! # Fixture directory
//!
//! A fixture set is a directory with a manifest and conventional paths:
//!
//! ```text
//! test.config.json
//! schema/<name>/tables/<table>.sql
//! schema/<name>/functions/<fn>.sql
//! data/<schema>.<table>[.<suffix>].yml
//! ```
//!
//! DDL bodies may contain a `{{schema}}` token that is replaced with the
//! fully prefixed schema name before execution. Seed rows are YAML mappings
//! of field name to [`Cell`] — a bare scalar binds as a parameter, `null`
//! binds as NULL, and the mapping form supports redirecting to another
//! column or inlining raw SQL like `now()`.
//!
//! # Example
//!
//! ```ignore
//! use seedbed::{derive_prefix, Fixture, Manifest};
//!
//! let manifest = Manifest::from_dir(root)?;
//! let definition = manifest.load(root)?;
//! let prefix = derive_prefix(&hostname, chrono::Utc::now());
//!
//! let fixture = Fixture::new(conn, definition, prefix)
//!     .with_tracking_schema("zombie")
//!     .with_hostname(&hostname);
//!
//! fixture.set_up().await?;
//! // ... run tests against `<prefix>_<schema>` ...
//! fixture.tear_down().await?;
//! ```
//!
//! The database side is abstracted behind [`Executor`], a single
//! execute-with-parameters capability; any driver can be adapted to it.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cell;
pub mod definition;
pub mod error;
pub mod executor;
pub mod fixture;
pub mod insert;
pub mod manifest;
pub mod prelude;

pub use cell::Cell;
pub use definition::{DataDef, Definition, Row, SchemaDef};
pub use error::{FixtureError, FixtureResult};
pub use executor::{BoxError, Executor, SqlValue};
pub use fixture::{derive_prefix, Fixture};
pub use insert::{generate, BatchInsert};
pub use manifest::{Manifest, ManifestSchema, MANIFEST_FILE};
