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

use super::{ConfigTree, NodeId};
use crate::options::OptionKind;
use crate::path::Key;

/// Where a value position sits in the configuration tree.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Anchor {
    /// The position is covered by this node, named or wildcard.
    Node(NodeId),
    /// No node covers the position; it inherits the subtree defaults of this ancestor.
    Inherited(NodeId),
}

impl ConfigTree {
    /// Effective value of `kind` for `node` as a member of `parent`.
    ///
    /// First match wins:
    /// 1. the node's own option,
    /// 2. the option on the node's wildcard child,
    /// 3. the parent's own option,
    /// 4. the subtree default of the node, its wildcard child, then the parent.
    pub fn resolve_option(&self, kind: OptionKind, node: Option<NodeId>, parent: NodeId) -> bool {
        let node = node.map(|id| self.node(id));
        let wildcard = node.and_then(|node| node.wildcard).map(|id| self.node(id));
        let parent = self.node(parent);

        let resolved = node
            .and_then(|node| node.node_options.get(kind))
            .or_else(|| wildcard.and_then(|wildcard| wildcard.node_options.get(kind)))
            .or_else(|| parent.node_options.get(kind))
            .unwrap_or_else(|| match (node, wildcard) {
                (Some(node), _) => node.subtree_options.get(kind),
                (None, Some(wildcard)) => wildcard.subtree_options.get(kind),
                (None, None) => parent.subtree_options.get(kind),
            });

        log::trace!("resolved {} = {}", kind, resolved);
        resolved
    }

    pub(crate) fn root_anchor(&self) -> Anchor {
        Anchor::Node(Self::ROOT)
    }

    /// The node covering `key` below `node`: the named child, else the wildcard child.
    pub fn member(&self, node: NodeId, key: &Key) -> Option<NodeId> {
        let node = self.node(node);
        key.node_name()
            .and_then(|name| node.children.get(&name).copied())
            .or(node.wildcard)
    }

    /// Anchor of the value found at `key` inside the value anchored at `anchor`.
    pub(crate) fn descend(&self, anchor: Anchor, key: &Key) -> Anchor {
        match anchor {
            Anchor::Node(node) => match self.member(node, key) {
                Some(child) => Anchor::Node(child),
                None => Anchor::Inherited(node),
            },
            Anchor::Inherited(ancestor) => Anchor::Inherited(ancestor),
        }
    }

    /// How the value at `anchor` treats itself: its own count, its primitive
    /// policy, or whether it may be present at all.
    ///
    /// Options set on a parent never reach this far.
    pub(crate) fn own_option(&self, kind: OptionKind, anchor: Anchor) -> bool {
        match anchor {
            Anchor::Node(node) => {
                let node = self.node(node);
                node.node_options
                    .get(kind)
                    .unwrap_or_else(|| node.subtree_options.get(kind))
            }
            Anchor::Inherited(ancestor) => self.node(ancestor).subtree_options.get(kind),
        }
    }

    /// How the array at `anchor` treats its element at `key`.
    pub(crate) fn element_option(&self, kind: OptionKind, anchor: Anchor, key: &Key) -> bool {
        match anchor {
            Anchor::Node(node) => self.resolve_option(kind, self.member(node, key), node),
            Anchor::Inherited(ancestor) => self.node(ancestor).subtree_options.get(kind),
        }
    }
}
