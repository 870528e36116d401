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

use crate::error::Error;
use crate::path::Path;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The matching policies that can be attached to a path.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    /// Array elements are paired with actual elements regardless of position.
    AnyOrderMatch,
    /// Objects and arrays must have exactly as many entries as expected.
    CollectionEqualCount,
    /// Primitives must be equal by value, not only by type.
    PrimitiveExactMatch,
    /// The key must not be present in actual.
    KeyMustBeAbsent,
}

impl OptionKind {
    pub const ALL: [OptionKind; 4] = [
        OptionKind::AnyOrderMatch,
        OptionKind::CollectionEqualCount,
        OptionKind::PrimitiveExactMatch,
        OptionKind::KeyMustBeAbsent,
    ];
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OptionKind::AnyOrderMatch => write!(f, "AnyOrderMatch"),
            OptionKind::CollectionEqualCount => write!(f, "CollectionEqualCount"),
            OptionKind::PrimitiveExactMatch => write!(f, "PrimitiveExactMatch"),
            OptionKind::KeyMustBeAbsent => write!(f, "KeyMustBeAbsent"),
        }
    }
}

/// How far an option reaches from the node its path points at.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Only the node itself.
    #[default]
    SingleNode,
    /// The node and every descendant, including ones configured later.
    Subtree,
}

fn default_active() -> bool {
    true
}

/// One matching policy applied to one or more paths.
///
/// Options are applied in order, so for the same path and kind the last one wins.
///
/// # Examples
///
/// ```
/// use flex_assert::{PathOption, Scope};
///
/// // Elements of `items` may appear in any order.
/// let any_order = PathOption::any_order_match().at("items");
/// // Every primitive below `user` must match by value.
/// let exact = PathOption::value_exact_match().at("user").scope(Scope::Subtree);
/// // The root object must not carry extra keys.
/// let count = PathOption::collection_equal_count();
/// # let _ = (any_order, exact, count);
/// ```
///
/// Options can also be decoded from JSON:
///
/// ```
/// use flex_assert::{OptionKind, PathOption};
///
/// let json = r#"[{"kind": "key_must_be_absent", "paths": ["secret"]}]"#;
/// let options = PathOption::list_from_json(json).unwrap();
/// assert_eq!(options[0].kind, OptionKind::KeyMustBeAbsent);
/// assert!(options[0].active);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathOption {
    /// Target paths. `None` and an empty list both mean the root.
    #[serde(default)]
    pub paths: Vec<Option<String>>,
    pub kind: OptionKind,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub scope: Scope,
    #[serde(skip)]
    inverted: bool,
}

impl PathOption {
    /// An active, single node option of the given kind targeting the root.
    pub fn new(kind: OptionKind) -> Self {
        Self {
            paths: vec![],
            kind,
            active: true,
            scope: Scope::SingleNode,
            inverted: false,
        }
    }

    /// Primitives must be equal by value.
    pub fn value_exact_match() -> Self {
        Self::new(OptionKind::PrimitiveExactMatch)
    }

    /// Primitives only need to have the same type.
    ///
    /// `value_type_match().active(false)` behaves like `value_exact_match()`.
    pub fn value_type_match() -> Self {
        Self {
            active: false,
            inverted: true,
            ..Self::new(OptionKind::PrimitiveExactMatch)
        }
    }

    pub fn any_order_match() -> Self {
        Self::new(OptionKind::AnyOrderMatch)
    }

    pub fn collection_equal_count() -> Self {
        Self::new(OptionKind::CollectionEqualCount)
    }

    pub fn key_must_be_absent() -> Self {
        Self::new(OptionKind::KeyMustBeAbsent)
    }

    /// Adds a target path.
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.paths.push(Some(path.into()));
        self
    }

    /// Adds the root as a target.
    pub fn at_root(mut self) -> Self {
        self.paths.push(None);
        self
    }

    /// Adds several target paths, in order.
    pub fn at_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths
            .extend(paths.into_iter().map(|path| Some(path.into())));
        self
    }

    /// Switches the option on or off.
    pub fn active(mut self, is_active: bool) -> Self {
        self.active = is_active != self.inverted;
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Shorthand for `scope(Scope::Subtree)`.
    pub fn subtree(self) -> Self {
        self.scope(Scope::Subtree)
    }

    /// The paths this option is applied to, in order. `None` is the root.
    pub fn targets(&self) -> Box<dyn Iterator<Item = Option<&str>> + '_> {
        if self.paths.is_empty() {
            Box::new(std::iter::once(None))
        } else {
            Box::new(self.paths.iter().map(|path| path.as_deref()))
        }
    }

    /// Decodes an ordered list of options from a JSON array.
    ///
    /// Unlike options built in code, every path is parsed strictly and the
    /// first malformed one is returned as [`Error::PathSyntax`].
    pub fn list_from_json(json: &str) -> Result<Vec<PathOption>, Error> {
        let options: Vec<PathOption> = serde_json::from_str(json)?;
        for path in options.iter().flat_map(|option| option.targets()).flatten() {
            Path::parse(path)?;
        }
        Ok(options)
    }
}

// `inverted` only affects how later `active` calls are read.
impl PartialEq for PathOption {
    fn eq(&self, other: &Self) -> bool {
        self.paths == other.paths
            && self.kind == other.kind
            && self.active == other.active
            && self.scope == other.scope
    }
}

impl Eq for PathOption {}
