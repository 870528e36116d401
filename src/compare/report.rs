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

use super::misc::{Category, Indent};
use crate::path::Path;
use serde_json::Value;
use std::fmt;

/// Why a position did not match.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MismatchKind {
    /// Expected and actual have different shapes, e.g. object vs. number.
    Structure,
    /// Primitives of the same type with different values.
    Value,
    /// Primitives of different types.
    Type,
    /// The expected key or index is missing from actual.
    Missing,
    /// The collection sizes differ while an equal count is required.
    Count { expected: usize, actual: usize },
    /// A key that must be absent is present in actual.
    Unexpected,
    /// An any-order element has no matching actual element left.
    Unmatched,
}

/// A single difference between expected and actual.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub kind: MismatchKind,
    pub path: Path,
    pub expected: Option<Value>,
    pub actual: Option<Value>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let json_to_string =
            |json: &Value| serde_json::to_string_pretty(json).map_err(|_| fmt::Error);
        let type_name = |json: &Option<Value>| {
            json.as_ref()
                .map_or("nothing", |json| Category::of(json).name())
        };

        match self.kind {
            MismatchKind::Structure => write!(
                f,
                "json values at path \"{}\" have different shapes ({} vs {}):",
                self.path,
                type_name(&self.expected),
                type_name(&self.actual)
            )?,
            MismatchKind::Value => {
                write!(f, "json atoms at path \"{}\" are not equal:", self.path)?
            }
            MismatchKind::Type => write!(
                f,
                "json atoms at path \"{}\" have different types ({} vs {}):",
                self.path,
                type_name(&self.expected),
                type_name(&self.actual)
            )?,
            MismatchKind::Missing => {
                write!(f, "json atom at path \"{}\" is missing from actual:", self.path)?
            }
            MismatchKind::Count { expected, actual } => write!(
                f,
                "json collection at path \"{}\" has {} entries, expected exactly {}:",
                self.path, actual, expected
            )?,
            MismatchKind::Unexpected => write!(
                f,
                "json atom at path \"{}\" must be absent but is present in actual:",
                self.path
            )?,
            MismatchKind::Unmatched => write!(
                f,
                "json element at path \"{}\" has no match among the actual elements (any order):",
                self.path
            )?,
        }

        if let Some(expected) = &self.expected {
            write!(f, "\n    expected:\n{}", json_to_string(expected)?.indent(8))?;
        }
        if let Some(actual) = &self.actual {
            write!(f, "\n    actual:\n{}", json_to_string(actual)?.indent(8))?;
        }

        Ok(())
    }
}

/// Every mismatch found by one assertion, in traversal order.
#[derive(Debug, Clone, PartialEq)]
pub struct MismatchReport {
    mismatches: Vec<Mismatch>,
}

impl MismatchReport {
    pub(crate) fn new(mismatches: Vec<Mismatch>) -> Self {
        Self { mismatches }
    }

    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }

    pub fn len(&self) -> usize {
        self.mismatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }
}

impl IntoIterator for MismatchReport {
    type Item = Mismatch;
    type IntoIter = std::vec::IntoIter<Mismatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.mismatches.into_iter()
    }
}

impl fmt::Display for MismatchReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} mismatch(es) between expected and actual json:",
            self.mismatches.len()
        )?;
        for mismatch in &self.mismatches {
            write!(f, "\n\n{}", mismatch)?;
        }
        Ok(())
    }
}

impl std::error::Error for MismatchReport {}
