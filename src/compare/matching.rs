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

/// Pairs as many left items as possible with distinct right items.
///
/// `edges[left]` lists the right items `left` may be paired with, in order of
/// preference. Returns the right item assigned to each left item.
pub(crate) fn max_bipartite_matching(
    edges: &[Vec<usize>],
    right_len: usize,
) -> Vec<Option<usize>> {
    let mut owner: Vec<Option<usize>> = vec![None; right_len];

    for left in 0..edges.len() {
        let mut visited = vec![false; right_len];
        augment(left, edges, &mut owner, &mut visited);
    }

    let mut assignment = vec![None; edges.len()];
    for (right, left) in owner.iter().enumerate() {
        if let Some(left) = left {
            assignment[*left] = Some(right);
        }
    }
    assignment
}

fn augment(
    left: usize,
    edges: &[Vec<usize>],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &right in &edges[left] {
        if visited[right] {
            continue;
        }
        visited[right] = true;

        let free = match owner[right] {
            None => true,
            Some(other) => augment(other, edges, owner, visited),
        };
        if free {
            owner[right] = Some(left);
            return true;
        }
    }
    false
}
