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

mod matching;
mod misc;
mod report;

pub use report::{Mismatch, MismatchKind, MismatchReport};

use crate::config::{Anchor, ConfigTree};
use crate::options::OptionKind;
use crate::path::{Key, Path};
use matching::max_bipartite_matching;
use misc::Category;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// How primitives are compared.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MatchMode {
    /// Primitives must be equal by value.
    ///
    /// The mode used with [`assert_exact_match`](fn@crate::assert_exact_match).
    Exact,
    /// Primitives only need to share a type unless
    /// [`OptionKind::PrimitiveExactMatch`] is active for them.
    ///
    /// The mode used with [`assert_type_match`](fn@crate::assert_type_match).
    Type,
}

/// How should numbers be compared.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum NumericMode {
    /// Different numeric types aren't considered equal.
    #[default]
    Strict,
    /// All numeric types are converted to float before comparison.
    AssumeFloat,
}

/// Configuration for how JSON values should be compared.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) match_mode: MatchMode,
    pub(crate) numeric_mode: NumericMode,
}

impl Config {
    /// Create a new [`Config`] using the given [`MatchMode`].
    ///
    /// The default `numeric_mode` is [`NumericMode::Strict`].
    pub fn new(match_mode: MatchMode) -> Self {
        Self {
            match_mode,
            numeric_mode: NumericMode::Strict,
        }
    }

    /// Change the config's numeric mode.
    pub fn numeric_mode(mut self, numeric_mode: NumericMode) -> Self {
        self.numeric_mode = numeric_mode;
        self
    }
}

/// Compares `actual` against the `expected` template, guided by `tree`.
pub(crate) fn diff(
    expected: &Value,
    actual: &Value,
    tree: &ConfigTree,
    config: Config,
) -> Vec<Mismatch> {
    let mut acc = vec![];
    diff_with(
        expected,
        actual,
        tree,
        config,
        Path::Root,
        tree.root_anchor(),
        &mut acc,
    );
    acc
}

fn diff_with(
    expected: &Value,
    actual: &Value,
    tree: &ConfigTree,
    config: Config,
    path: Path,
    anchor: Anchor,
    acc: &mut Vec<Mismatch>,
) {
    let mut folder = DiffFolder {
        actual,
        tree,
        config,
        path,
        anchor,
        acc,
    };

    fold_json(expected, &mut folder);
}

#[derive(Debug)]
struct DiffFolder<'a, 'b> {
    actual: &'a Value,
    tree: &'a ConfigTree,
    config: Config,
    path: Path,
    anchor: Anchor,
    acc: &'b mut Vec<Mismatch>,
}

impl<'a, 'b> DiffFolder<'a, 'b> {
    fn record(
        &mut self,
        kind: MismatchKind,
        path: Path,
        expected: Option<&Value>,
        actual: Option<&Value>,
    ) {
        self.acc.push(Mismatch {
            kind,
            path,
            expected: expected.cloned(),
            actual: actual.cloned(),
        });
    }

    fn record_here(&mut self, kind: MismatchKind, expected: &Value) {
        let path = self.path.clone();
        let actual = self.actual;
        self.record(kind, path, Some(expected), Some(actual));
    }

    fn compare_child(&mut self, expected: &Value, actual: &Value, key: Key) {
        let anchor = self.tree.descend(self.anchor, &key);
        let path = self.path.append(key);
        diff_with(expected, actual, self.tree, self.config, path, anchor, self.acc);
    }

    /// Whether `actual` matches `expected` at `key`, without recording anything.
    fn matches_at(&self, expected: &Value, actual: &Value, key: &Key) -> bool {
        let mut scratch = vec![];
        let anchor = self.tree.descend(self.anchor, key);
        let path = self.path.append(key.clone());
        diff_with(expected, actual, self.tree, self.config, path, anchor, &mut scratch);
        scratch.is_empty()
    }

    fn check_count(&mut self, expected: &Value, expected_len: usize, actual_len: usize) {
        if expected_len != actual_len
            && self
                .tree
                .own_option(OptionKind::CollectionEqualCount, self.anchor)
        {
            self.record_here(
                MismatchKind::Count {
                    expected: expected_len,
                    actual: actual_len,
                },
                expected,
            );
        }
    }

    fn on_primitive(&mut self, expected: &Value) {
        let actual = self.actual;
        let expected_category = Category::of(expected);
        let actual_category = Category::of(actual);

        if actual_category.is_collection() {
            self.record_here(MismatchKind::Structure, expected);
            return;
        }

        if expected_category != actual_category {
            self.record_here(MismatchKind::Type, expected);
            return;
        }

        let exact = match self.config.match_mode {
            MatchMode::Exact => true,
            MatchMode::Type => self
                .tree
                .own_option(OptionKind::PrimitiveExactMatch, self.anchor),
        };

        if exact && !self.primitives_equal(expected, actual) {
            self.record_here(MismatchKind::Value, expected);
        }
    }

    fn primitives_equal(&self, expected: &Value, actual: &Value) -> bool {
        match (self.config.numeric_mode, expected, actual) {
            (NumericMode::AssumeFloat, Value::Number(expected), Value::Number(actual)) => {
                expected.as_f64() == actual.as_f64()
            }
            _ => expected == actual,
        }
    }

    fn on_array(&mut self, expected_value: &Value, expected: &[Value]) {
        let actual_value = self.actual;
        let Some(actual) = actual_value.as_array() else {
            self.record_here(MismatchKind::Structure, expected_value);
            return;
        };

        self.check_count(expected_value, expected.len(), actual.len());

        let (any_order, positional): (Vec<usize>, Vec<usize>) =
            (0..expected.len()).partition(|&idx| {
                self.tree
                    .element_option(OptionKind::AnyOrderMatch, self.anchor, &Key::Idx(idx))
            });

        for &idx in &positional {
            match actual.get(idx) {
                Some(actual) => self.compare_child(&expected[idx], actual, Key::Idx(idx)),
                None => {
                    let path = self.path.append(Key::Idx(idx));
                    self.record(MismatchKind::Missing, path, Some(&expected[idx]), None);
                }
            }
        }

        if any_order.is_empty() {
            return;
        }

        let claimed: BTreeSet<usize> = positional.iter().copied().collect();
        let candidates: Vec<usize> = (0..actual.len())
            .filter(|idx| !claimed.contains(idx))
            .collect();

        let edges: Vec<Vec<usize>> = any_order
            .iter()
            .map(|&idx| {
                candidates
                    .iter()
                    .enumerate()
                    .filter(|&(_, &candidate)| {
                        self.matches_at(&expected[idx], &actual[candidate], &Key::Idx(idx))
                    })
                    .map(|(slot, _)| slot)
                    .collect()
            })
            .collect();

        let assignment = max_bipartite_matching(&edges, candidates.len());
        for (&idx, slot) in any_order.iter().zip(assignment) {
            match slot {
                Some(slot) => log::trace!(
                    "{} matched actual element {}",
                    self.path.append(Key::Idx(idx)),
                    candidates[slot]
                ),
                None => {
                    let path = self.path.append(Key::Idx(idx));
                    self.record(MismatchKind::Unmatched, path, Some(&expected[idx]), None);
                }
            }
        }
    }

    fn on_object(&mut self, expected_value: &Value, expected: &Map<String, Value>) {
        let actual_value = self.actual;
        let Some(actual) = actual_value.as_object() else {
            self.record_here(MismatchKind::Structure, expected_value);
            return;
        };

        self.check_count(expected_value, expected.len(), actual.len());

        for (key, expected) in expected.iter() {
            match actual.get(key) {
                Some(actual) => self.compare_child(expected, actual, Key::Field(key.clone())),
                None => {
                    let path = self.path.append(Key::Field(key.clone()));
                    self.record(MismatchKind::Missing, path, Some(expected), None);
                }
            }
        }

        self.check_absent_keys(expected, actual);
    }

    /// Reports actual keys that are absent from expected and configured to stay absent.
    ///
    /// Whether a key may be present is the key's own policy, so an option set
    /// on the enclosing object alone never forbids its members.
    fn check_absent_keys(&mut self, expected: &Map<String, Value>, actual: &Map<String, Value>) {
        for (key, actual) in actual.iter() {
            if expected.contains_key(key) {
                continue;
            }

            let key = Key::Field(key.clone());
            let anchor = self.tree.descend(self.anchor, &key);
            let path = self.path.append(key);
            self.forbid_present(actual, path, anchor);
        }
    }

    /// Flags `actual` if it must be absent, else looks for forbidden keys configured below it.
    fn forbid_present(&mut self, actual: &Value, path: Path, anchor: Anchor) {
        if self.tree.own_option(OptionKind::KeyMustBeAbsent, anchor) {
            self.record(MismatchKind::Unexpected, path, None, Some(actual));
        } else {
            self.forbid_below(actual, path, anchor);
        }
    }

    /// Array elements are not keys, so only their members are checked.
    fn forbid_below(&mut self, actual: &Value, path: Path, anchor: Anchor) {
        // an inherited anchor has nothing configured below it
        if let Anchor::Inherited(_) = anchor {
            return;
        }

        match actual {
            Value::Object(map) => {
                for (key, child) in map.iter() {
                    let key = Key::Field(key.clone());
                    let child_anchor = self.tree.descend(anchor, &key);
                    self.forbid_present(child, path.append(key), child_anchor);
                }
            }
            Value::Array(items) => {
                for (idx, item) in items.iter().enumerate() {
                    let key = Key::Idx(idx);
                    let item_anchor = self.tree.descend(anchor, &key);
                    self.forbid_below(item, path.append(key), item_anchor);
                }
            }
            _ => {}
        }
    }
}

fn fold_json(json: &Value, folder: &mut DiffFolder<'_, '_>) {
    match json {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            folder.on_primitive(json)
        }
        Value::Array(items) => folder.on_array(json, items),
        Value::Object(map) => folder.on_object(json, map),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::options::PathOption;
    use serde_json::json;

    fn run(
        mode: MatchMode,
        expected: &Value,
        actual: &Value,
        options: &[PathOption],
    ) -> Vec<Mismatch> {
        let tree = ConfigTree::build(options, false);
        diff(expected, actual, &tree, Config::new(mode))
    }

    fn kinds(mismatches: &[Mismatch]) -> Vec<MismatchKind> {
        mismatches.iter().map(|m| m.kind).collect()
    }

    #[test]
    fn test_diffing_leaf_json() {
        let exact = |expected: Value, actual: Value| run(MatchMode::Exact, &expected, &actual, &[]);

        assert_eq!(exact(json!(null), json!(null)), vec![]);
        assert_eq!(exact(json!(true), json!(true)), vec![]);
        assert_eq!(kinds(&exact(json!(false), json!(true))), vec![MismatchKind::Value]);
        assert_eq!(exact(json!(1), json!(1)), vec![]);
        assert_eq!(kinds(&exact(json!(1), json!(2))), vec![MismatchKind::Value]);
        assert_eq!(exact(json!(1.0), json!(1.0)), vec![]);
        assert_eq!(kinds(&exact(json!(1), json!(1.0))), vec![MismatchKind::Value]);
        assert_eq!(kinds(&exact(json!("a"), json!(1))), vec![MismatchKind::Type]);
        assert_eq!(kinds(&exact(json!(1), json!([1]))), vec![MismatchKind::Structure]);
    }

    #[test]
    fn test_assume_float() {
        let tree = ConfigTree::new();
        let config = Config::new(MatchMode::Exact).numeric_mode(NumericMode::AssumeFloat);
        assert_eq!(diff(&json!(1), &json!(1.0), &tree, config), vec![]);
        assert_eq!(diff(&json!(1.0), &json!(1), &tree, config), vec![]);
        assert_eq!(diff(&json!(1), &json!(1.5), &tree, config).len(), 1);
    }

    #[test]
    fn test_type_mode_primitives() {
        let typed = |expected: Value, actual: Value| run(MatchMode::Type, &expected, &actual, &[]);

        assert_eq!(typed(json!(1), json!(2.5)), vec![]);
        assert_eq!(typed(json!("a"), json!("b")), vec![]);
        assert_eq!(typed(json!(false), json!(true)), vec![]);
        assert_eq!(kinds(&typed(json!(null), json!(0))), vec![MismatchKind::Type]);
        assert_eq!(kinds(&typed(json!("1"), json!(1))), vec![MismatchKind::Type]);
    }

    #[test]
    fn test_exact_mode_ignores_type_match_option() {
        let mismatches = run(
            MatchMode::Exact,
            &json!({"a": 1}),
            &json!({"a": 2}),
            &[PathOption::value_type_match().at("a")],
        );
        assert_eq!(kinds(&mismatches), vec![MismatchKind::Value]);
    }

    #[test]
    fn test_array_subset() {
        let exact = |expected: Value, actual: Value| run(MatchMode::Exact, &expected, &actual, &[]);

        assert_eq!(exact(json!([]), json!([])), vec![]);
        assert_eq!(exact(json!([]), json!([1])), vec![]);
        assert_eq!(exact(json!([1]), json!([1, 2])), vec![]);

        let mismatches = exact(json!([1, 2]), json!([1]));
        assert_eq!(kinds(&mismatches), vec![MismatchKind::Missing]);
        assert_eq!(mismatches[0].path.to_string(), "[1]");
        assert_eq!(mismatches[0].expected, Some(json!(2)));
        assert_eq!(mismatches[0].actual, None);

        assert_eq!(kinds(&exact(json!([1, 2]), json!([1, 3]))), vec![MismatchKind::Value]);
        assert_eq!(kinds(&exact(json!([1]), json!({"0": 1}))), vec![MismatchKind::Structure]);
    }

    #[test]
    fn test_collection_equal_count() {
        let options = [PathOption::collection_equal_count()];
        let mismatches = run(MatchMode::Exact, &json!([1]), &json!([1, 2]), &options);
        assert_eq!(
            kinds(&mismatches),
            vec![MismatchKind::Count {
                expected: 1,
                actual: 2
            }]
        );

        let expected = json!({"a": 1});
        let mismatches = run(MatchMode::Exact, &expected, &json!({"a": 1, "b": 2}), &options);
        assert_eq!(mismatches.len(), 1);

        // the root option does not reach nested collections
        let expected = json!({"a": [1]});
        let mismatches = run(MatchMode::Exact, &expected, &json!({"a": [1, 2]}), &options);
        assert_eq!(mismatches, vec![]);
    }

    #[test]
    fn test_object_subset() {
        let exact = |expected: Value, actual: Value| run(MatchMode::Exact, &expected, &actual, &[]);

        assert_eq!(exact(json!({}), json!({})), vec![]);
        assert_eq!(exact(json!({ "a": 1 }), json!({ "a": 1, "b": 123 })), vec![]);
        assert_eq!(exact(json!({ "a": {} }), json!({ "a": { "b": true } })), vec![]);

        let mismatches = exact(json!({ "b": 1 }), json!({ "a": 1 }));
        assert_eq!(kinds(&mismatches), vec![MismatchKind::Missing]);
        assert_eq!(mismatches[0].path.to_string(), "b");
    }

    #[test]
    fn test_collects_every_mismatch() {
        let expected = json!({
            "id": 1,
            "tags": ["a", "b"],
            "owner": { "name": "x", "age": 3 },
            "gone": null
        });
        let actual = json!({
            "id": 2,
            "tags": "a",
            "owner": { "name": "y", "age": "3" }
        });

        let mismatches = run(MatchMode::Exact, &expected, &actual, &[]);
        let paths: Vec<String> = mismatches.iter().map(|m| m.path.to_string()).collect();
        assert_eq!(paths, vec!["id", "tags", "owner.name", "owner.age", "gone"]);
        assert_eq!(
            kinds(&mismatches),
            vec![
                MismatchKind::Value,
                MismatchKind::Structure,
                MismatchKind::Value,
                MismatchKind::Type,
                MismatchKind::Missing,
            ]
        );
    }

    #[test]
    fn test_any_order_whole_array() {
        let options = [PathOption::any_order_match().at("list")];
        let expected = json!({"list": [1, 2, 3]});

        let mismatches = run(MatchMode::Exact, &expected, &json!({"list": [3, 1, 2]}), &options);
        assert_eq!(mismatches, vec![]);

        let mismatches = run(MatchMode::Exact, &expected, &json!({"list": [3, 1, 4]}), &options);
        assert_eq!(kinds(&mismatches), vec![MismatchKind::Unmatched]);
        assert_eq!(mismatches[0].path.to_string(), "list[1]");
        assert_eq!(mismatches[0].expected, Some(json!(2)));
    }

    #[test]
    fn test_any_order_elements_are_consumed_once() {
        let options = [PathOption::any_order_match()];
        let mismatches = run(MatchMode::Exact, &json!([1, 1]), &json!([1, 2]), &options);
        assert_eq!(kinds(&mismatches), vec![MismatchKind::Unmatched]);
    }

    #[test]
    fn test_any_order_skips_positionally_claimed_elements() {
        let options = [PathOption::any_order_match().at("[1]")];
        // expected[0] takes actual[0] by position, expected[1] may not reuse it
        let mismatches = run(MatchMode::Exact, &json!([7, 7]), &json!([7, 8]), &options);
        assert_eq!(kinds(&mismatches), vec![MismatchKind::Unmatched]);

        let mismatches = run(MatchMode::Exact, &json!([7, 9]), &json!([7, 8, 9]), &options);
        assert_eq!(mismatches, vec![]);
    }

    #[test]
    fn test_any_order_finds_best_pairing() {
        // greedy first-fit would pair {"a": 1} with the first actual element
        let options = [
            PathOption::any_order_match(),
            PathOption::value_exact_match().at("[*].b"),
        ];
        let expected = json!([{"a": 1}, {"a": 1, "b": 2}]);
        let actual = json!([{"a": 1, "b": 2}, {"a": 1, "b": 3}]);
        assert_eq!(run(MatchMode::Type, &expected, &actual, &options), vec![]);
    }

    #[test]
    fn test_any_order_with_equal_count() {
        let options = [
            PathOption::any_order_match(),
            PathOption::collection_equal_count(),
        ];
        let mismatches = run(MatchMode::Exact, &json!([2, 1]), &json!([1, 2, 3]), &options);
        assert_eq!(
            kinds(&mismatches),
            vec![MismatchKind::Count {
                expected: 2,
                actual: 3
            }]
        );
    }

    #[test]
    fn test_key_must_be_absent() {
        let options = [PathOption::key_must_be_absent().at_paths(["secret", "inner.token"])];
        let expected = json!({"id": 1, "inner": {}});

        let ok = json!({"id": 1, "inner": {"other": 1}, "extra": true});
        assert_eq!(run(MatchMode::Exact, &expected, &ok, &options), vec![]);

        let bad = json!({"id": 1, "secret": "x", "inner": {"token": 1}});
        let mismatches = run(MatchMode::Exact, &expected, &bad, &options);
        let paths: Vec<String> = mismatches.iter().map(|m| m.path.to_string()).collect();
        assert_eq!(paths, vec!["inner.token", "secret"]);
        assert!(mismatches.iter().all(|m| m.kind == MismatchKind::Unexpected));
        assert_eq!(mismatches[1].actual, Some(json!("x")));
    }

    #[test]
    fn test_key_must_be_absent_inactive() {
        let options = [
            PathOption::key_must_be_absent().at("secret"),
            PathOption::key_must_be_absent().at("secret").active(false),
        ];
        let mismatches = run(MatchMode::Exact, &json!({}), &json!({"secret": 1}), &options);
        assert_eq!(mismatches, vec![]);
    }

    #[test]
    fn test_key_must_be_absent_wildcard() {
        let options = [PathOption::key_must_be_absent().at("*")];
        let mismatches = run(
            MatchMode::Exact,
            &json!({"a": 1}),
            &json!({"a": 1, "b": 2, "c": 3}),
            &options,
        );
        assert_eq!(mismatches.len(), 2);
    }

    #[test]
    fn test_key_must_be_absent_below_missing_ancestor() {
        let options = [PathOption::key_must_be_absent().at("inner.token")];

        let mismatches = run(
            MatchMode::Exact,
            &json!({}),
            &json!({"inner": {"token": 1, "other": 2}}),
            &options,
        );
        assert_eq!(kinds(&mismatches), vec![MismatchKind::Unexpected]);
        assert_eq!(mismatches[0].path.to_string(), "inner.token");
        assert_eq!(mismatches[0].actual, Some(json!(1)));

        let actual = json!({"inner": {"other": 2}});
        let mismatches = run(MatchMode::Exact, &json!({}), &actual, &options);
        assert_eq!(mismatches, vec![]);
    }

    #[test]
    fn test_key_must_be_absent_inside_unexpected_array() {
        let options = [PathOption::key_must_be_absent().at("users[*].password")];
        let mismatches = run(
            MatchMode::Exact,
            &json!({}),
            &json!({"users": [{"name": "a"}, {"name": "b", "password": "x"}]}),
            &options,
        );
        assert_eq!(kinds(&mismatches), vec![MismatchKind::Unexpected]);
        assert_eq!(mismatches[0].path.to_string(), "users[1].password");
    }

    #[test]
    fn test_key_must_be_absent_on_object_does_not_reach_members() {
        let expected = json!({"obj": {}});
        let actual = json!({"obj": {"y": 1}});

        let alone = [PathOption::key_must_be_absent().at("obj")];
        assert_eq!(run(MatchMode::Exact, &expected, &actual, &alone), vec![]);

        // configuring obj.y for another kind must not change the outcome
        let with_unrelated = [
            PathOption::key_must_be_absent().at("obj"),
            PathOption::value_exact_match().at("obj.y"),
        ];
        assert_eq!(run(MatchMode::Exact, &expected, &actual, &with_unrelated), vec![]);
    }

    #[test]
    fn test_key_must_be_absent_subtree_reaches_unconfigured_keys() {
        let options = [PathOption::key_must_be_absent().at("obj.*").subtree()];
        let mismatches = run(
            MatchMode::Exact,
            &json!({"obj": {"keep": 1}}),
            &json!({"obj": {"keep": 1, "y": 1, "z": {"w": 2}}}),
            &options,
        );
        let paths: Vec<String> = mismatches.iter().map(|m| m.path.to_string()).collect();
        assert_eq!(paths, vec!["obj.y", "obj.z"]);
    }

    #[test]
    fn test_structural_mismatch_does_not_descend() {
        let mismatches = run(
            MatchMode::Exact,
            &json!({"a": {"b": 1, "c": 2}, "d": 1}),
            &json!({"a": [1], "d": 2}),
            &[],
        );
        assert_eq!(
            kinds(&mismatches),
            vec![MismatchKind::Structure, MismatchKind::Value]
        );
    }
}
