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

use serde_json::Value;

pub trait Indent {
    fn indent(&self, level: usize) -> String;
}

impl<T> Indent for T
where
    T: ToString,
{
    fn indent(&self, level: usize) -> String {
        let indent = " ".repeat(level);

        self.to_string()
            .lines()
            .map(|line| format!("{}{}", indent, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Coarse JSON type used when only types have to match.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Category {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl Category {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Category::Null,
            Value::Bool(_) => Category::Bool,
            Value::Number(_) => Category::Number,
            Value::String(_) => Category::String,
            Value::Array(_) => Category::Array,
            Value::Object(_) => Category::Object,
        }
    }

    pub fn is_collection(self) -> bool {
        matches!(self, Category::Array | Category::Object)
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Null => "null",
            Category::Bool => "boolean",
            Category::Number => "number",
            Category::String => "string",
            Category::Array => "array",
            Category::Object => "object",
        }
    }
}
