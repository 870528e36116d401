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

use thiserror::Error;

/// A path string that could not be parsed completely.
///
/// While building a configuration tree this error is not fatal: the keys
/// parsed before the offending component are still applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid path `{path}`: {reason}")]
pub struct PathSyntaxError {
    path: String,
    reason: String,
}

impl PathSyntaxError {
    pub(crate) fn new(path: &str, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// The path string as given by the caller.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Errors raised while loading assertion inputs.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    PathSyntax(#[from] PathSyntaxError),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode json: {0}")]
    Decode(#[from] serde_json::Error),
}
