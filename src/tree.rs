use crate::{error::Error, key_value::KeyValue, map::Map};
use log::trace;
use std::{
    borrow::Borrow,
    cmp::Ordering,
    fmt::{self, Debug, Display, Formatter},
    iter::FusedIterator,
    mem,
};

/// Handle of a node in a tree arena.
type NodeId = usize;

/// Visiting order of a tree traversal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Traversal {
    Preorder,
    Inorder,
    Postorder,
}

/// Shape of a tree built from a batch of pairs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Layout {
    /// Pairs are inserted one by one in the given order.
    #[default]
    Sequential,
    /// Pairs are sorted by key and linked into a height-balanced tree.
    Balanced,
}

#[derive(Clone, Debug)]
struct Node<K, V> {
    key_value: KeyValue<K, V>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    // Non-owning back-reference. Children are owned through `left` and `right`.
    parent: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V, parent: Option<NodeId>) -> Self {
        Self {
            key_value: KeyValue::new(key, value),
            left: None,
            right: None,
            parent,
        }
    }

    fn key(&self) -> &K {
        self.key_value.key()
    }
}

/// Map of an unbalanced binary search tree.
///
/// Nodes live in a dense arena and refer to each other by handles, so parent
/// links never own their targets. Sequential insertion produces whatever
/// shape the insertion order implies; only [`Layout::Balanced`] bounds the
/// height by `log2(n)`.
#[derive(Clone)]
pub struct TreeMap<K, V> {
    nodes: Vec<Node<K, V>>,
    root: Option<NodeId>,
}

impl<K, V> TreeMap<K, V> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Returns a number of entries.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if a tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns entries in ascending key order.
    pub fn iter(&self) -> TreeIterator<'_, K, V> {
        TreeIterator {
            nodes: &self.nodes,
            stack: Vec::new(),
            current: self.root,
            remaining: self.nodes.len(),
        }
    }

    /// Returns a height of a tree, where an empty tree has a height of -1.
    pub fn height(&self) -> isize {
        self.shape().0
    }

    /// Returns a number of edges on the longest path between any two nodes.
    pub fn diameter(&self) -> usize {
        self.shape().1
    }

    /// Returns a number of empty child positions.
    pub fn null_count(&self) -> usize {
        self.levels().null_count
    }

    /// Returns a sum of depths of all nodes, where a root is at depth 0.
    pub fn sum_levels(&self) -> usize {
        self.levels().sum_levels
    }

    /// Returns a sum of depths of all empty child positions.
    pub fn sum_null_levels(&self) -> usize {
        self.levels().sum_null_levels
    }

    /// Returns an average number of comparisons of a successful search.
    pub fn successful_search_cost(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            1.0 + self.sum_levels() as f64 / self.len() as f64
        }
    }

    /// Returns an average number of comparisons of an unsuccessful search.
    pub fn unsuccessful_search_cost(&self) -> f64 {
        let levels = self.levels();

        levels.sum_null_levels as f64 / levels.null_count as f64
    }

    fn levels(&self) -> Levels {
        let mut levels = Levels {
            null_count: 0,
            sum_levels: 0,
            sum_null_levels: 0,
        };
        let mut stack = vec![(self.root, 0)];

        while let Some((id, level)) = stack.pop() {
            if let Some(id) = id {
                let node = &self.nodes[id];

                levels.sum_levels += level;
                stack.push((node.left, level + 1));
                stack.push((node.right, level + 1));
            } else {
                levels.null_count += 1;
                levels.sum_null_levels += level;
            }
        }

        levels
    }

    // Height and diameter in one post-order pass.
    fn shape(&self) -> (isize, usize) {
        let mut heights = vec![-1; self.nodes.len()];
        let mut diameters = vec![0; self.nodes.len()];

        for id in self.postorder_ids() {
            let Node { left, right, .. } = self.nodes[id];
            let left_height = left.map_or(-1, |left| heights[left]);
            let right_height = right.map_or(-1, |right| heights[right]);
            let child_diameter = left
                .into_iter()
                .chain(right)
                .map(|child| diameters[child])
                .max()
                .unwrap_or(0);

            heights[id] = 1 + left_height.max(right_height);
            diameters[id] = ((left_height + right_height + 2) as usize).max(child_diameter);
        }

        match self.root {
            Some(root) => (heights[root], diameters[root]),
            None => (-1, 0),
        }
    }

    fn preorder_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(self.nodes.len());
        let mut stack = self.root.into_iter().collect::<Vec<_>>();

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];

            ids.push(id);
            stack.extend(node.right);
            stack.extend(node.left);
        }

        ids
    }

    fn postorder_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(self.nodes.len());
        let mut stack = self.root.into_iter().collect::<Vec<_>>();

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];

            ids.push(id);
            stack.extend(node.left);
            stack.extend(node.right);
        }

        ids.reverse();
        ids
    }

    fn inorder_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(self.nodes.len());
        let mut stack = Vec::new();
        let mut current = self.root;

        while current.is_some() || !stack.is_empty() {
            while let Some(id) = current {
                stack.push(id);
                current = self.nodes[id].left;
            }

            if let Some(id) = stack.pop() {
                ids.push(id);
                current = self.nodes[id].right;
            }
        }

        ids
    }

    fn minimum(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.nodes[id].left {
            id = left;
        }

        id
    }

    fn allocate(&mut self, key: K, value: V, parent: Option<NodeId>) -> NodeId {
        self.nodes.push(Node::new(key, value, parent));
        self.nodes.len() - 1
    }

    // The node must already be unlinked from the tree. The last node of the
    // arena moves into the vacated handle.
    fn free(&mut self, id: NodeId) -> Node<K, V> {
        let old_id = self.nodes.len() - 1;
        let node = self.nodes.swap_remove(id);

        if id != old_id {
            let Node {
                parent,
                left,
                right,
                ..
            } = self.nodes[id];

            self.replace_child(parent, old_id, Some(id));

            for child in left.into_iter().chain(right) {
                self.nodes[child].parent = Some(id);
            }
        }

        node
    }

    // Puts `new` in the child slot of `parent` that holds `old`, or at the
    // root if there is no parent.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let node = &mut self.nodes[parent];

                if node.left == Some(old) {
                    node.left = new;
                } else {
                    node.right = new;
                }
            }
        }

        if let Some(new) = new {
            self.nodes[new].parent = parent;
        }
    }

    fn swap_payloads(&mut self, one: NodeId, other: NodeId) {
        let (low, high) = (one.min(other), one.max(other));
        let (head, tail) = self.nodes.split_at_mut(high);

        mem::swap(&mut head[low].key_value, &mut tail[0].key_value);
    }

    fn render(&self, ids: &[NodeId]) -> String
    where
        K: Display,
    {
        let keys = ids
            .iter()
            .map(|&id| self.nodes[id].key().to_string())
            .collect::<Vec<_>>();

        format!("[{}]", keys.join(", "))
    }

    /// Renders keys in a given traversal order as `[a, b, c]`.
    pub fn traversal(&self, order: Traversal) -> String
    where
        K: Display,
    {
        self.render(&match order {
            Traversal::Preorder => self.preorder_ids(),
            Traversal::Inorder => self.inorder_ids(),
            Traversal::Postorder => self.postorder_ids(),
        })
    }

    pub fn preorder(&self) -> String
    where
        K: Display,
    {
        self.traversal(Traversal::Preorder)
    }

    pub fn inorder(&self) -> String
    where
        K: Display,
    {
        self.traversal(Traversal::Inorder)
    }

    pub fn postorder(&self) -> String
    where
        K: Display,
    {
        self.traversal(Traversal::Postorder)
    }
}

struct Levels {
    null_count: usize,
    sum_levels: usize,
    sum_null_levels: usize,
}

impl<K: Ord, V> TreeMap<K, V> {
    /// Builds a tree from pairs.
    ///
    /// [`Layout::Balanced`] links pairs around midpoints without comparing
    /// them against a growing tree, so the pairs must be strictly ascending by
    /// key.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (K, V)>,
        layout: Layout,
    ) -> Result<Self, Error> {
        match layout {
            Layout::Sequential => Ok(pairs.into_iter().collect()),
            Layout::Balanced => Self::from_sorted(pairs.into_iter().collect()),
        }
    }

    fn from_sorted(pairs: Vec<(K, V)>) -> Result<Self, Error> {
        if let Some(index) = pairs.windows(2).position(|pairs| pairs[0].0 >= pairs[1].0) {
            return Err(Error::Unsorted { index: index + 1 });
        }

        let mut tree = Self {
            nodes: pairs
                .into_iter()
                .map(|(key, value)| Node::new(key, value, None))
                .collect(),
            root: None,
        };

        tree.root = tree.link_balanced(0, tree.nodes.len(), None);

        trace!(
            "built balanced tree of {} entries with height {}",
            tree.len(),
            tree.height()
        );

        Ok(tree)
    }

    // Links arena handles in `low..high` with the midpoint as a subtree root.
    fn link_balanced(
        &mut self,
        low: NodeId,
        high: NodeId,
        parent: Option<NodeId>,
    ) -> Option<NodeId> {
        if low >= high {
            return None;
        }

        let middle = low + (high - low - 1) / 2;

        self.nodes[middle].parent = parent;
        self.nodes[middle].left = self.link_balanced(low, middle, Some(middle));
        self.nodes[middle].right = self.link_balanced(middle + 1, high, Some(middle));

        Some(middle)
    }

    /// Finds a value associated with a key.
    pub fn get<Q: Ord + ?Sized>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
    {
        self.find(key).map(|id| self.nodes[id].key_value.value())
    }

    /// Returns true if a key is in a tree.
    pub fn contains_key<Q: Ord + ?Sized>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
    {
        self.find(key).is_some()
    }

    fn find<Q: Ord + ?Sized>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
    {
        let mut current = self.root;

        while let Some(id) = current {
            let node = &self.nodes[id];

            current = match key.cmp(node.key().borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }

        None
    }

    /// Associates a value with a key and returns a previous value if any.
    ///
    /// An existing key keeps its node and only has its value replaced.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut parent = None;
        let mut current = self.root;
        let mut ordering = Ordering::Equal;

        while let Some(id) = current {
            let node = &mut self.nodes[id];

            ordering = key.cmp(node.key());
            current = match ordering {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(mem::replace(node.key_value.value_mut(), value)),
            };
            parent = Some(id);
        }

        let id = self.allocate(key, value, parent);

        match parent {
            None => self.root = Some(id),
            Some(parent) if ordering == Ordering::Less => self.nodes[parent].left = Some(id),
            Some(parent) => self.nodes[parent].right = Some(id),
        }

        None
    }

    /// Inserts a key-value pair.
    pub fn insert_pair(&mut self, key_value: KeyValue<K, V>) -> Option<V> {
        let (key, value) = key_value.into_pair();

        self.insert(key, value)
    }

    /// Removes a key and returns its value if any.
    pub fn remove<Q: Ord + ?Sized>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
    {
        let id = self.find(key)?;
        let Node {
            parent,
            left,
            right,
            ..
        } = self.nodes[id];

        let removed = match (left, right) {
            (Some(_), Some(right)) => {
                let successor = self.minimum(right);
                let Node {
                    parent: successor_parent,
                    right: successor_right,
                    ..
                } = self.nodes[successor];

                // The successor has no left child. Its right subtree takes its
                // place, directly under the removed node if the successor is
                // the removed node's right child.
                self.replace_child(successor_parent, successor, successor_right);
                self.swap_payloads(id, successor);
                self.free(successor)
            }
            (None, None) => {
                self.replace_child(parent, id, None);
                self.free(id)
            }
            (Some(child), None) | (None, Some(child)) => {
                self.replace_child(parent, id, Some(child));
                self.free(id)
            }
        };

        Some(removed.key_value.into_pair().1)
    }

    #[cfg(test)]
    fn is_valid(&self) -> bool {
        let ids = self.inorder_ids();
        let ordered = ids
            .windows(2)
            .all(|ids| self.nodes[ids[0]].key() < self.nodes[ids[1]].key());
        let linked = ids.iter().all(|&id| {
            let node = &self.nodes[id];

            node.left
                .into_iter()
                .chain(node.right)
                .all(|child| self.nodes[child].parent == Some(id))
        });

        ids.len() == self.nodes.len()
            && self.root.and_then(|root| self.nodes[root].parent).is_none()
            && ordered
            && linked
    }
}

impl<K, V> Default for TreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Debug, V: Debug> Debug for TreeMap<K, V> {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Display, V> Display for TreeMap<K, V> {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "{}", self.inorder())
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for TreeMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for TreeMap<K, V> {}

impl<K: Ord, V> Extend<(K, V)> for TreeMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iterator: I) {
        for (key, value) in iterator {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for TreeMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iterator: I) -> Self {
        let mut tree = Self::new();

        tree.extend(iterator);

        tree
    }
}

impl<K: Ord, V> Map<K, V> for TreeMap<K, V> {
    type Iter<'a>
        = TreeIterator<'a, K, V>
    where
        K: 'a,
        V: 'a;

    fn len(&self) -> usize {
        TreeMap::len(self)
    }

    fn get(&self, key: &K) -> Option<&V> {
        TreeMap::get(self, key)
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        self.insert(key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        TreeMap::remove(self, key)
    }

    fn iter(&self) -> Self::Iter<'_> {
        TreeMap::iter(self)
    }
}

/// In-order iterator of a tree.
///
/// It walks down left spines with an explicit stack, yields a node, and then
/// resumes at the node's right subtree.
#[derive(Debug)]
pub struct TreeIterator<'a, K, V> {
    nodes: &'a [Node<K, V>],
    stack: Vec<NodeId>,
    current: Option<NodeId>,
    remaining: usize,
}

impl<K, V> TreeIterator<'_, K, V> {
    /// Returns true if there are entries left.
    pub fn has_next(&self) -> bool {
        self.current.is_some() || !self.stack.is_empty()
    }
}

impl<'a, K, V> Iterator for TreeIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;

        while let Some(id) = self.current {
            self.stack.push(id);
            self.current = nodes[id].left;
        }

        let node = &nodes[self.stack.pop()?];

        self.current = node.right;
        self.remaining -= 1;

        Some((node.key_value.key(), node.key_value.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for TreeIterator<'_, K, V> {}

impl<K, V> FusedIterator for TreeIterator<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a TreeMap<K, V> {
    type IntoIter = TreeIterator<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
