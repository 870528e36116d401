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

//! Per-assertion configuration tree.
//!
//! The tree mirrors the shape of the expected document only where options
//! were declared. It is built once from an ordered list of [`PathOption`]s
//! and then only read while comparing.
//!
//! The tree is public for inspection: [`JsonAssert::config_tree`](crate::JsonAssert::config_tree)
//! returns the tree an assertion will use, and [`ConfigTree::lookup`] with
//! [`ConfigTree::resolve_option`] show which policy applies where.

mod resolve;

pub(crate) use resolve::Anchor;

use crate::options::{OptionKind, PathOption, Scope};
use crate::path::{Key, Path};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Index of a node inside a [`ConfigTree`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// One value per [`OptionKind`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct OptionMap<T> {
    pub any_order_match: T,
    pub collection_equal_count: T,
    pub primitive_exact_match: T,
    pub key_must_be_absent: T,
}

impl<T: Copy> OptionMap<T> {
    pub fn get(&self, kind: OptionKind) -> T {
        match kind {
            OptionKind::AnyOrderMatch => self.any_order_match,
            OptionKind::CollectionEqualCount => self.collection_equal_count,
            OptionKind::PrimitiveExactMatch => self.primitive_exact_match,
            OptionKind::KeyMustBeAbsent => self.key_must_be_absent,
        }
    }

    pub fn set(&mut self, kind: OptionKind, value: T) {
        let slot = match kind {
            OptionKind::AnyOrderMatch => &mut self.any_order_match,
            OptionKind::CollectionEqualCount => &mut self.collection_equal_count,
            OptionKind::PrimitiveExactMatch => &mut self.primitive_exact_match,
            OptionKind::KeyMustBeAbsent => &mut self.key_must_be_absent,
        };
        *slot = value;
    }
}

/// Options set on a single node. Unset kinds fall back to inherited values.
pub type NodeOptions = OptionMap<Option<bool>>;

/// Defaults inherited by a node and its descendants. Always complete.
pub type SubtreeOptions = OptionMap<bool>;

/// A position in the configuration tree.
///
/// Equality and hashing only look at the name and both option maps;
/// children and the wildcard child are not part of a node's identity.
#[derive(Debug, Clone)]
pub struct ConfigNode {
    name: Option<String>,
    node_options: NodeOptions,
    subtree_options: SubtreeOptions,
    children: BTreeMap<String, NodeId>,
    wildcard: Option<NodeId>,
    parent: Option<NodeId>,
}

impl ConfigNode {
    fn new(name: Option<String>, subtree_options: SubtreeOptions, parent: Option<NodeId>) -> Self {
        Self {
            name,
            node_options: NodeOptions::default(),
            subtree_options,
            children: BTreeMap::new(),
            wildcard: None,
            parent,
        }
    }

    /// Key or index of the node. `None` for the root and wildcard children.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn node_options(&self) -> &NodeOptions {
        &self.node_options
    }

    pub fn subtree_options(&self) -> &SubtreeOptions {
        &self.subtree_options
    }

    pub fn children(&self) -> &BTreeMap<String, NodeId> {
        &self.children
    }

    pub fn wildcard(&self) -> Option<NodeId> {
        self.wildcard
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

impl PartialEq for ConfigNode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.node_options == other.node_options
            && self.subtree_options == other.subtree_options
    }
}

impl Eq for ConfigNode {}

impl Hash for ConfigNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.node_options.hash(state);
        self.subtree_options.hash(state);
    }
}

/// Legacy any-order writes collected while walking a path.
#[derive(Debug)]
struct PendingWrite {
    node: NodeId,
    kind: OptionKind,
    active: bool,
}

/// Arena of [`ConfigNode`]s rooted at [`ConfigTree::ROOT`].
#[derive(Debug, Clone)]
pub struct ConfigTree {
    nodes: Vec<ConfigNode>,
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigTree {
    pub const ROOT: NodeId = NodeId(0);

    /// A tree holding only a root whose subtree defaults are all inactive.
    pub fn new() -> Self {
        Self::with_defaults(SubtreeOptions::default())
    }

    pub fn with_defaults(defaults: SubtreeOptions) -> Self {
        Self {
            nodes: vec![ConfigNode::new(None, defaults, None)],
        }
    }

    /// Builds a tree by applying `options` in order to the root.
    ///
    /// With `legacy_any_order` set, `[*]` and `[N*]` steps also mark their
    /// parent as any-order.
    pub fn build<'o, I>(options: I, legacy_any_order: bool) -> Self
    where
        I: IntoIterator<Item = &'o PathOption>,
    {
        let mut tree = Self::new();
        for option in options {
            tree.create_or_update_node(Self::ROOT, option, legacy_any_order);
        }
        tree
    }

    pub fn node(&self, id: NodeId) -> &ConfigNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut ConfigNode {
        &mut self.nodes[id.0]
    }

    /// Number of nodes, the root included.
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Follows `path` from the root without creating anything.
    ///
    /// Wildcard keys step into the wildcard child.
    pub fn lookup(&self, path: &Path) -> Option<NodeId> {
        path.keys().iter().try_fold(Self::ROOT, |id, key| {
            let node = self.node(id);
            match key.node_name() {
                Some(name) => node.children.get(&name).copied(),
                None => node.wildcard,
            }
        })
    }

    /// Applies `option` to the subtree rooted at `target`.
    pub fn create_or_update_node(&mut self, target: NodeId, option: &PathOption, legacy: bool) {
        for path in option.targets() {
            let keys = match path {
                Some(path) => Path::parse_lenient(path).keys().to_vec(),
                None => vec![],
            };

            let mut frontier = vec![target];
            let mut pending = Vec::new();

            for key in &keys {
                if legacy && key.marks_any_order() {
                    pending.extend(frontier.iter().map(|&node| PendingWrite {
                        node,
                        kind: OptionKind::AnyOrderMatch,
                        active: true,
                    }));
                }
                frontier = self.step(&frontier, key);
            }

            log::debug!(
                "applying {}={} ({:?}) at {:?} to {} node(s)",
                option.kind,
                option.active,
                option.scope,
                path.unwrap_or("(root)"),
                frontier.len()
            );

            for &node in &frontier {
                match option.scope {
                    Scope::SingleNode => self
                        .node_mut(node)
                        .node_options
                        .set(option.kind, Some(option.active)),
                    Scope::Subtree => self.set_subtree_option(node, option.kind, option.active),
                }
            }

            for write in pending {
                self.node_mut(write.node)
                    .node_options
                    .set(write.kind, Some(write.active));
            }
        }
    }

    /// Advances every frontier node by one key.
    fn step(&mut self, frontier: &[NodeId], key: &Key) -> Vec<NodeId> {
        let mut next = Vec::with_capacity(frontier.len());

        for &node in frontier {
            match key.node_name() {
                Some(name) => next.push(self.child_or_create(node, &name)),
                None => {
                    next.push(self.wildcard_or_create(node));
                    next.extend(self.node(node).children.values().copied());
                }
            }
        }

        next
    }

    fn push(&mut self, node: ConfigNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn child_or_create(&mut self, parent: NodeId, name: &str) -> NodeId {
        if let Some(&child) = self.node(parent).children.get(name) {
            return child;
        }

        let child = match self.node(parent).wildcard {
            Some(template) => {
                log::debug!("creating {:?} from the wildcard template", name);
                self.deep_clone(template, parent, Some(name.to_string()))
            }
            None => {
                let defaults = self.node(parent).subtree_options;
                self.push(ConfigNode::new(Some(name.to_string()), defaults, Some(parent)))
            }
        };

        self.node_mut(parent).children.insert(name.to_string(), child);
        child
    }

    fn wildcard_or_create(&mut self, parent: NodeId) -> NodeId {
        if let Some(wildcard) = self.node(parent).wildcard {
            return wildcard;
        }

        let defaults = self.node(parent).subtree_options;
        let wildcard = self.push(ConfigNode::new(None, defaults, Some(parent)));
        self.node_mut(parent).wildcard = Some(wildcard);
        wildcard
    }

    /// Copies `source` and all its descendants under `parent`, renamed to `name`.
    fn deep_clone(&mut self, source: NodeId, parent: NodeId, name: Option<String>) -> NodeId {
        let original = self.node(source).clone();
        let copy = self.push(ConfigNode {
            name,
            node_options: original.node_options,
            subtree_options: original.subtree_options,
            children: BTreeMap::new(),
            wildcard: None,
            parent: Some(parent),
        });

        for (child_name, child) in original.children {
            let child_copy = self.deep_clone(child, copy, Some(child_name.clone()));
            self.node_mut(copy).children.insert(child_name, child_copy);
        }

        if let Some(wildcard) = original.wildcard {
            let wildcard_copy = self.deep_clone(wildcard, copy, None);
            self.node_mut(copy).wildcard = Some(wildcard_copy);
        }

        copy
    }

    /// Overwrites one subtree default on `node` and everything below it.
    fn set_subtree_option(&mut self, node: NodeId, kind: OptionKind, active: bool) {
        let mut stack = vec![node];

        while let Some(id) = stack.pop() {
            let current = self.node_mut(id);
            current.subtree_options.set(kind, active);
            stack.extend(current.children.values().copied());
            stack.extend(current.wildcard);
        }
    }
}
