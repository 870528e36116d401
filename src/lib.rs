// Copyright 2024 The DocAssert Authors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

use serde_json::Value;
use std::path::Path as FsPath;

mod compare;
mod config;
mod error;
mod options;
mod path;

pub use compare::{MatchMode, Mismatch, MismatchKind, MismatchReport, NumericMode};
pub use config::{ConfigNode, ConfigTree, NodeId, NodeOptions, OptionMap, SubtreeOptions};
pub use error::{Error, PathSyntaxError};
pub use options::{OptionKind, PathOption, Scope};
pub use path::{Key, Path};

use compare::Config;

/// Builder for flexible JSON assertions.
///
/// # Examples
///
/// ```
/// use flex_assert::{JsonAssert, PathOption};
/// use serde_json::json;
///
/// let expected = json!({ "id": 0, "tags": ["b", "a"] });
/// let actual = json!({ "id": 42, "tags": ["a", "b"], "extra": true });
///
/// JsonAssert::type_match()
///     .with_option(PathOption::any_order_match().at("tags"))
///     .with_option(PathOption::value_exact_match().at("tags[*]"))
///     .assert(&expected, &actual);
/// ```
#[derive(Debug, Clone)]
pub struct JsonAssert {
    config: Config,
    legacy_any_order: bool,
    options: Vec<PathOption>,
}

impl JsonAssert {
    /// Constructs a new builder comparing primitives according to `match_mode`.
    pub fn new(match_mode: MatchMode) -> Self {
        Self {
            config: Config::new(match_mode),
            legacy_any_order: false,
            options: vec![],
        }
    }

    /// Primitives must be equal by value.
    pub fn exact_match() -> Self {
        Self::new(MatchMode::Exact)
    }

    /// Primitives only need to share a type unless a path says otherwise.
    pub fn type_match() -> Self {
        Self::new(MatchMode::Type)
    }

    /// Sets how numbers are compared when values must be equal.
    ///
    /// # Examples
    ///
    /// ```
    /// use flex_assert::{JsonAssert, NumericMode};
    /// use serde_json::json;
    ///
    /// JsonAssert::exact_match()
    ///     .with_numeric_mode(NumericMode::AssumeFloat)
    ///     .assert(&json!([1]), &json!([1.0]));
    /// ```
    pub fn with_numeric_mode(mut self, numeric_mode: NumericMode) -> Self {
        self.config = self.config.numeric_mode(numeric_mode);
        self
    }

    /// Makes `[*]` and `[N*]` path steps mark the enclosing array as any-order.
    pub fn with_legacy_any_order(mut self, legacy_any_order: bool) -> Self {
        self.legacy_any_order = legacy_any_order;
        self
    }

    /// Appends an option. Options are applied in the order they were added.
    pub fn with_option(mut self, option: PathOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_options<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = PathOption>,
    {
        self.options.extend(options);
        self
    }

    /// Builds the configuration tree for the options added so far.
    ///
    /// ```
    /// use flex_assert::{JsonAssert, OptionKind, Path, PathOption};
    ///
    /// let tree = JsonAssert::type_match()
    ///     .with_option(PathOption::any_order_match().at("items"))
    ///     .config_tree();
    /// let items = tree.lookup(&Path::parse("items").unwrap()).unwrap();
    /// assert_eq!(tree.node(items).node_options().any_order_match, Some(true));
    /// assert!(tree.resolve_option(OptionKind::AnyOrderMatch, None, items));
    /// ```
    pub fn config_tree(&self) -> ConfigTree {
        ConfigTree::build(&self.options, self.legacy_any_order)
    }

    /// Compares `actual` against `expected` and returns every mismatch found.
    pub fn check(&self, expected: &Value, actual: &Value) -> Result<(), MismatchReport> {
        let tree = self.config_tree();
        log::debug!(
            "comparing with {:?} over {} option(s), {} config node(s)",
            self.config.match_mode,
            self.options.len(),
            tree.len()
        );

        let mismatches = compare::diff(expected, actual, &tree, self.config);
        if mismatches.is_empty() {
            Ok(())
        } else {
            Err(MismatchReport::new(mismatches))
        }
    }

    /// Like [`check`](Self::check) but panics with the report on mismatch.
    #[track_caller]
    pub fn assert(&self, expected: &Value, actual: &Value) {
        if let Err(report) = self.check(expected, actual) {
            panic!("{}", report);
        }
    }
}

/// Checks that `actual` matches `expected` with primitives compared by value.
///
/// Keys and elements not present in `expected` are ignored unless an option
/// says otherwise.
///
/// # Panics
///
/// Panics with the full mismatch report if anything differs.
///
/// # Examples
///
/// ```
/// use flex_assert::{assert_exact_match, PathOption};
/// use serde_json::json;
///
/// assert_exact_match(
///     &json!({ "key0-0": 1 }),
///     &json!({ "key0-0": 1, "key0-1": 1 }),
///     [],
/// );
/// ```
#[track_caller]
pub fn assert_exact_match<I>(expected: &Value, actual: &Value, options: I)
where
    I: IntoIterator<Item = PathOption>,
{
    JsonAssert::exact_match()
        .with_options(options)
        .assert(expected, actual);
}

/// Checks that `actual` matches `expected` with primitives compared by type.
///
/// # Panics
///
/// Panics with the full mismatch report if anything differs.
///
/// # Examples
///
/// ```
/// use flex_assert::{assert_type_match, PathOption, Scope};
/// use serde_json::json;
///
/// assert_type_match(
///     &json!([1, [1]]),
///     &json!([1, [2]]),
///     [PathOption::value_type_match().scope(Scope::Subtree)],
/// );
/// ```
#[track_caller]
pub fn assert_type_match<I>(expected: &Value, actual: &Value, options: I)
where
    I: IntoIterator<Item = PathOption>,
{
    JsonAssert::type_match()
        .with_options(options)
        .assert(expected, actual);
}

/// Non-panicking [`assert_exact_match`](fn@assert_exact_match).
pub fn check_exact_match<I>(
    expected: &Value,
    actual: &Value,
    options: I,
) -> Result<(), MismatchReport>
where
    I: IntoIterator<Item = PathOption>,
{
    JsonAssert::exact_match()
        .with_options(options)
        .check(expected, actual)
}

/// Non-panicking [`assert_type_match`](fn@assert_type_match).
pub fn check_type_match<I>(
    expected: &Value,
    actual: &Value,
    options: I,
) -> Result<(), MismatchReport>
where
    I: IntoIterator<Item = PathOption>,
{
    JsonAssert::type_match()
        .with_options(options)
        .check(expected, actual)
}

/// Reads and decodes a JSON file.
pub fn read_json(path: impl AsRef<FsPath>) -> Result<Value, Error> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&data)?)
}

/// Variadic form of [`assert_exact_match`](fn@crate::assert_exact_match).
///
/// ```
/// use flex_assert::PathOption;
/// use serde_json::json;
///
/// flex_assert::assert_exact_match!(
///     json!({ "a": [1, 2] }),
///     json!({ "a": [2, 1] }),
///     PathOption::any_order_match().at("a"),
/// );
/// ```
#[macro_export]
macro_rules! assert_exact_match {
    ($expected:expr, $actual:expr $(, $option:expr)* $(,)?) => {
        $crate::assert_exact_match(&$expected, &$actual, [$($option),*])
    };
}

/// Variadic form of [`assert_type_match`](fn@crate::assert_type_match).
///
/// ```
/// use flex_assert::PathOption;
/// use serde_json::json;
///
/// flex_assert::assert_type_match!(json!({ "id": 1 }), json!({ "id": 2 }));
/// ```
#[macro_export]
macro_rules! assert_type_match {
    ($expected:expr, $actual:expr $(, $option:expr)* $(,)?) => {
        $crate::assert_type_match(&$expected, &$actual, [$($option),*])
    };
}
