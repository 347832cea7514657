//! Convenience re-exports for the common case.
//!
//! ```ignore
//! use seedbed::prelude::*;
//! ```

pub use crate::cell::Cell;
pub use crate::definition::{DataDef, Definition, Row, SchemaDef};
pub use crate::error::{FixtureError, FixtureResult};
pub use crate::executor::{Executor, SqlValue};
pub use crate::fixture::{derive_prefix, Fixture};
pub use crate::manifest::Manifest;
