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

use crate::error::PathSyntaxError;
use regex::Regex;
use std::{fmt, sync::OnceLock};

/// A position inside a JSON document.
///
/// Option paths are written as dot separated keys with optional bracketed
/// array parts, e.g. `key0-1.key1-0[0][*]`. A literal `.`, `*`, `[`, `]` or
/// `\` inside a key is escaped with a backslash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Path {
    #[default]
    Root,
    Keys(Vec<Key>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Object key.
    Field(String),
    /// Array index.
    Idx(usize),
    /// Array index carrying the `*` any-order marker, written `[0*]`.
    AnyOrderIdx(usize),
    /// Any object key, written `*`.
    Wildcard,
    /// Any array index, written `[*]`.
    WildcardArray,
}

impl Key {
    /// Whether the key carries the legacy any-order marker.
    pub fn marks_any_order(&self) -> bool {
        matches!(self, Key::AnyOrderIdx(_) | Key::WildcardArray)
    }

    /// Name of the configuration node addressed by this key. Wildcards have none.
    pub fn node_name(&self) -> Option<String> {
        match self {
            Key::Field(name) => Some(name.clone()),
            Key::Idx(idx) | Key::AnyOrderIdx(idx) => Some(idx.to_string()),
            Key::Wildcard | Key::WildcardArray => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Key::Field(key) => write!(f, ".{}", escape(key)),
            Key::Idx(idx) => write!(f, "[{}]", idx),
            Key::AnyOrderIdx(idx) => write!(f, "[{}*]", idx),
            Key::Wildcard => write!(f, ".*"),
            Key::WildcardArray => write!(f, "[*]"),
        }
    }
}

fn bracket_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[([^\[\]]*)\]").expect("bracket pattern is valid"))
}

fn index_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9]+)(\*)?$").expect("index pattern is valid"))
}

impl Path {
    pub(crate) fn append(&self, next: Key) -> Path {
        match self {
            Path::Root => Path::Keys(vec![next]),
            Path::Keys(list) => {
                let mut copy = list.clone();
                copy.push(next);
                Path::Keys(copy)
            }
        }
    }

    pub fn keys(&self) -> &[Key] {
        match self {
            Path::Root => &[],
            Path::Keys(keys) => keys,
        }
    }

    /// Parses a path string, failing on the first malformed component.
    pub fn parse(path: &str) -> Result<Self, PathSyntaxError> {
        match Self::parse_keys(path) {
            (keys, None) => Ok(Self::from_keys(keys)),
            (_, Some(err)) => Err(err),
        }
    }

    /// Parses a path string, keeping the keys parsed before a malformed component.
    pub fn parse_lenient(path: &str) -> Self {
        let (keys, err) = Self::parse_keys(path);
        if let Some(err) = err {
            log::warn!("{}; using the {} key(s) parsed before it", err, keys.len());
        }
        Self::from_keys(keys)
    }

    fn from_keys(keys: Vec<Key>) -> Self {
        if keys.is_empty() {
            Path::Root
        } else {
            Path::Keys(keys)
        }
    }

    fn parse_keys(path: &str) -> (Vec<Key>, Option<PathSyntaxError>) {
        let mut keys = Vec::new();

        if path.is_empty() {
            return (keys, None);
        }

        for segment in split_segments(path) {
            let (name, mut rest) = split_name(segment);

            if !name.is_empty() || rest.is_empty() {
                if name == "*" {
                    keys.push(Key::Wildcard);
                } else {
                    keys.push(Key::Field(unescape(name)));
                }
            }

            while !rest.is_empty() {
                let Some(captures) = bracket_regex().captures(rest) else {
                    let reason = if rest.starts_with('[') {
                        format!("unterminated bracket in `{}`", rest)
                    } else {
                        format!("unexpected `{}` after `]`", rest)
                    };
                    return (keys, Some(PathSyntaxError::new(path, reason)));
                };

                let matched = captures.get(0).map_or(0, |m| m.end());
                let body = captures.get(1).map_or("", |m| m.as_str());
                match Self::parse_index(body) {
                    Ok(key) => keys.push(key),
                    Err(reason) => return (keys, Some(PathSyntaxError::new(path, reason))),
                }
                rest = &rest[matched..];
            }
        }

        (keys, None)
    }

    fn parse_index(body: &str) -> Result<Key, String> {
        if body == "*" {
            return Ok(Key::WildcardArray);
        }

        if body.is_empty() {
            return Err("empty array index `[]`".to_string());
        }

        let captures = index_regex()
            .captures(body)
            .ok_or_else(|| format!("non-numeric array index `[{}]`", body))?;
        let index: usize = captures[1]
            .parse()
            .map_err(|e| format!("array index `[{}]` out of range: {}", body, e))?;

        match captures.get(2) {
            Some(_) => Ok(Key::AnyOrderIdx(index)),
            None => Ok(Key::Idx(index)),
        }
    }
}

/// Splits on every `.` not preceded by an escaping backslash. Escapes are kept.
fn split_segments(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (pos, c) in path.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '.' => {
                segments.push(&path[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }
    segments.push(&path[start..]);

    segments
}

/// Separates the raw key name from the trailing bracket parts of a segment.
fn split_name(segment: &str) -> (&str, &str) {
    let mut escaped = false;

    for (pos, c) in segment.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' => return (&segment[..pos], &segment[pos..]),
            _ => {}
        }
    }

    (segment, "")
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }

    out
}

fn escape(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        if matches!(c, '.' | '*' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Path::Root => write!(f, "(root)"),
            Path::Keys(keys) => {
                for (pos, key) in keys.iter().enumerate() {
                    match key {
                        Key::Field(name) if pos == 0 => write!(f, "{}", escape(name))?,
                        Key::Wildcard if pos == 0 => write!(f, "*")?,
                        _ => write!(f, "{}", key)?,
                    }
                }
                Ok(())
            }
        }
    }
}
