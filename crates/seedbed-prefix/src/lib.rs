//! Rewrites `{{pf:name}}` placeholders into prefixed, quoted schema
//! identifiers.
//!
//! Queries against prefixed fixture schemas cannot hard-code schema names,
//! so they carry placeholders instead:
//!
//! ```text
//! SELECT * FROM {{pf:blog}}.users JOIN {{pf:reporting}}.reports
//! ```
//!
//! With prefix `my-prefix` this becomes:
//!
//! ```text
//! SELECT * FROM `my-prefix_blog`.users JOIN `my-prefix_reporting`.reports
//! ```
//!
//! Three placeholder spellings are accepted and produce identical output:
//! bare `{{pf:name}}`, pre-quoted `` `{{pf:name}}` ``, and quoted-inside
//! `{{pf:`name`}}`. An empty prefix omits the separating underscore,
//! yielding `` `name` ``. Everything else in the query passes through
//! untouched.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static QUOTED_INSIDE: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"\{\{pf:`(.+?)`\}\}").expect("valid placeholder regex"));
static QUOTED_OUTSIDE: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"`\{\{pf:(.+?)\}\}`").expect("valid placeholder regex"));
static BARE: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"\{\{pf:(.+?)\}\}").expect("valid placeholder regex"));

/// Applies `prefix` to every placeholder in `query`.
///
/// # Example
///
/// ```
/// assert_eq!(seedbed_prefix::prefix("p", "drop schema {{pf:blog}}"), "drop schema `p_blog`");
/// assert_eq!(seedbed_prefix::prefix("", "drop schema {{pf:blog}}"), "drop schema `blog`");
/// ```
pub fn prefix(prefix: &str, query: &str) -> String {
	let rewrite = |caps: &Captures| quoted(prefix, &caps[1]);
	// quoted spellings first, so their backticks are consumed along with
	// the placeholder rather than left around the bare match
	let pass = QUOTED_INSIDE.replace_all(query, rewrite);
	let pass = QUOTED_OUTSIDE.replace_all(&pass, rewrite);
	BARE.replace_all(&pass, rewrite).into_owned()
}

fn quoted(prefix: &str, name: &str) -> String {
	if prefix.is_empty() {
		format!("`{}`", name)
	} else {
		format!("`{}_{}`", prefix, name)
	}
}

/// Holds one prefix for applying to many queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prefixer {
	/// The prefix applied by [`apply`](Self::apply).
	pub prefix: String,
}

impl Prefixer {
	/// Creates a prefixer for one prefix.
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
		}
	}

	/// Applies this prefixer's prefix to a query.
	pub fn apply(&self, query: &str) -> String {
		prefix(&self.prefix, query)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	const QUERY: &str =
		"SELECT * FROM {{pf:blog}}.users JOIN `{{pf:reporting}}`.reports JOIN {{pf:`schemas`}} JOIN other";

	#[rstest]
	fn test_all_three_spellings() {
		assert_eq!(
			prefix("this-is-my-prefix", QUERY),
			"SELECT * FROM `this-is-my-prefix_blog`.users JOIN `this-is-my-prefix_reporting`.reports JOIN `this-is-my-prefix_schemas` JOIN other"
		);
	}

	#[rstest]
	fn test_empty_prefix_omits_underscore() {
		assert_eq!(
			prefix("", QUERY),
			"SELECT * FROM `blog`.users JOIN `reporting`.reports JOIN `schemas` JOIN other"
		);
	}

	#[rstest]
	#[case::bare("{{pf:blog}}")]
	#[case::quoted_outside("`{{pf:blog}}`")]
	#[case::quoted_inside("{{pf:`blog`}}")]
	fn test_spellings_are_equivalent(#[case] placeholder: &str) {
		assert_eq!(prefix("p", placeholder), "`p_blog`");
	}

	#[rstest]
	fn test_unmatched_text_passes_through() {
		assert_eq!(prefix("p", "SELECT 1"), "SELECT 1");
		assert_eq!(prefix("p", "almost {{pf:}} nothing"), "almost {{pf:}} nothing");
	}

	#[rstest]
	fn test_multiple_placeholders_in_one_query() {
		assert_eq!(
			prefix("p", "{{pf:a}}.t JOIN {{pf:b}}.u"),
			"`p_a`.t JOIN `p_b`.u"
		);
	}

	#[rstest]
	fn test_prefixer_reuses_one_prefix() {
		let prefixer = Prefixer::new("v_test");
		assert_eq!(prefixer.apply("drop schema {{pf:blog}}"), "drop schema `v_test_blog`");
		assert_eq!(prefixer.apply("drop schema {{pf:reporting}}"), "drop schema `v_test_reporting`");
	}
}
