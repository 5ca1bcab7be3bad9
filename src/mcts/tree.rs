//! Search tree stored in an arena.
//!
//! Nodes live in a contiguous `Vec` and refer to each other by index, so the
//! parallel strategies pass indices around instead of aliasing mutable
//! references. Discarding a subtree means copying the part that survives into
//! a fresh arena and dropping the old one at once.

use std::collections::VecDeque;

use crate::board::{Board, Player, WIDTH};

/// Position of a node in the arena.
pub type NodeIndex = usize;

/// Index of the root in every tree.
pub const ROOT: NodeIndex = 0;

// This is a special value that is used to indicate that the node has no parent.
const TOMBSTONE_PARENT: NodeIndex = usize::MAX;

/// One position reached after a specific player's move.
#[derive(Clone, Debug)]
pub struct Node {
    board: Board,
    /// Player who moves next from this position.
    to_move: Player,
    parent: NodeIndex,
    /// Indexed by the column played to reach the child.
    children: [Option<NodeIndex>; WIDTH],
    /// Total number of simulations that went through this node.
    visits: u32,
    /// Sum of rewards from the perspective of the player who moved into this
    /// position.
    total_reward: f64,
}

impl Node {
    const fn new(board: Board, to_move: Player, parent: NodeIndex) -> Self {
        Self {
            board,
            to_move,
            parent,
            children: [None; WIDTH],
            visits: 0,
            total_reward: 0.0,
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Player who moves next from this position.
    #[must_use]
    pub const fn to_move(&self) -> Player {
        self.to_move
    }

    /// Player whose move produced this position.
    #[must_use]
    pub fn mover(&self) -> Player {
        !self.to_move
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn visits(&self) -> u32 {
        self.visits
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn total_reward(&self) -> f64 {
        self.total_reward
    }

    #[must_use]
    const fn visited(&self) -> bool {
        self.visits > 0
    }

    /// Parent index, `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeIndex> {
        if self.parent == TOMBSTONE_PARENT {
            None
        } else {
            Some(self.parent)
        }
    }

    /// Child reached by playing the column, if it was expanded.
    #[must_use]
    pub fn child(&self, column: usize) -> Option<NodeIndex> {
        self.children.get(column).copied().flatten()
    }

    /// Expanded children as `(column, index)` pairs in column order.
    pub fn children(&self) -> impl Iterator<Item = (usize, NodeIndex)> + '_ {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(column, child)| child.map(|index| (column, index)))
    }

    /// Returns `true` if the node was never expanded (or can not be).
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    /// Upper Confidence bound applied to Trees. Unvisited nodes get
    /// `unvisited_score` for both terms.
    fn uct(&self, parent_visits: u32, exploration: f64, unvisited_score: f64) -> f64 {
        if !self.visited() {
            return unvisited_score + exploration * unvisited_score;
        }
        let visits = f64::from(self.visits);
        let exploitation = self.total_reward / visits;
        let exploration_term = (2.0 * f64::from(parent_visits).ln() / visits).sqrt();
        exploitation + exploration * exploration_term
    }
}

/// Arena of [`Node`]s rooted at [`ROOT`].
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Creates a tree with a single unexpanded root.
    #[must_use]
    pub fn new(board: Board, to_move: Player) -> Self {
        Self {
            nodes: vec![Node::new(board, to_move, TOMBSTONE_PARENT)],
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.nodes[ROOT]
    }

    /// # Panics
    ///
    /// Panics if the index does not belong to the tree.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index]
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Only a tree moved out with [`Tree::take`] is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Moves the arena out, leaving an empty tree behind. Used to hand the
    /// tree over to a lock for the duration of a parallel search.
    pub(crate) fn take(&mut self) -> Self {
        Self {
            nodes: std::mem::take(&mut self.nodes),
        }
    }

    /// Child of the node with the highest UCT score; the first one in column
    /// order wins ties.
    #[must_use]
    pub fn select_child(
        &self,
        index: NodeIndex,
        exploration: f64,
        unvisited_score: f64,
    ) -> Option<NodeIndex> {
        let parent = &self.nodes[index];
        let mut best = None;
        let mut best_score = f64::NEG_INFINITY;
        for (_, child) in parent.children() {
            let score = self.nodes[child].uct(parent.visits, exploration, unvisited_score);
            if score > best_score {
                best_score = score;
                best = Some(child);
            }
        }
        best
    }

    /// Descends from the root along [`Tree::select_child`] until reaching a
    /// node without children.
    #[must_use]
    pub fn select_leaf(&self, exploration: f64, unvisited_score: f64) -> NodeIndex {
        let mut current = ROOT;
        while let Some(child) = self.select_child(current, exploration, unvisited_score) {
            current = child;
        }
        current
    }

    /// Adds a child for every legal column of a leaf and returns how many were
    /// created. Already expanded nodes and decided positions are left as they
    /// are.
    pub fn expand(&mut self, index: NodeIndex) -> usize {
        let node = &self.nodes[index];
        if !node.is_leaf() || node.board.status().is_terminal() {
            return 0;
        }
        let (board, to_move) = (node.board, node.to_move);
        let moves = board.legal_moves();
        for &column in &moves {
            let mut child_board = board;
            let _ = child_board.drop_piece(column, to_move);
            let child = self.nodes.len();
            self.nodes.push(Node::new(child_board, !to_move, index));
            self.nodes[index].children[column] = Some(child);
        }
        moves.len()
    }

    /// Records the reward at the node and walks up to the root, negating it at
    /// every step. Returns the reward recorded at the root.
    pub fn backpropagate(&mut self, index: NodeIndex, reward: f64) -> f64 {
        let mut current = index;
        let mut reward = reward;
        loop {
            let node = &mut self.nodes[current];
            node.visits += 1;
            node.total_reward += reward;
            if node.parent == TOMBSTONE_PARENT {
                return reward;
            }
            current = node.parent;
            reward = -reward;
        }
    }

    /// Most visited child of the root; the lowest column wins ties.
    #[must_use]
    pub fn best_column(&self) -> Option<usize> {
        let mut best = None;
        let mut best_visits = 0;
        for (column, child) in self.root().children() {
            let visits = self.nodes[child].visits;
            if best.is_none() || visits > best_visits {
                best = Some(column);
                best_visits = visits;
            }
        }
        best
    }

    /// Visit counts of the root's children per column (0 for unexpanded
    /// columns).
    #[must_use]
    pub fn visit_distribution(&self) -> [u32; WIDTH] {
        let mut visits = [0; WIDTH];
        for (column, child) in self.root().children() {
            visits[column] = self.nodes[child].visits;
        }
        visits
    }

    /// Copies the subtree rooted at `index` into a new compact arena where it
    /// becomes the root.
    #[must_use]
    pub fn subtree(&self, index: NodeIndex) -> Self {
        let mut nodes: Vec<Node> = Vec::new();
        let mut queue = VecDeque::from([(index, TOMBSTONE_PARENT, 0)]);
        while let Some((original, parent, column)) = queue.pop_front() {
            let copied = nodes.len();
            let mut node = self.nodes[original].clone();
            node.parent = parent;
            node.children = [None; WIDTH];
            if parent != TOMBSTONE_PARENT {
                nodes[parent].children[column] = Some(copied);
            }
            nodes.push(node);
            for (child_column, child) in self.nodes[original].children() {
                queue.push_back((child, copied, child_column));
            }
        }
        Self { nodes }
    }

    /// Tree rooted at the root's child for the column, keeping its statistics
    /// and descendants. `None` if that child was never expanded.
    #[must_use]
    pub fn reroot(&self, column: usize) -> Option<Self> {
        self.root().child(column).map(|child| self.subtree(child))
    }

    /// Adds the statistics of a tree grown from the same position to this
    /// one. Nodes are matched by the columns played from the root; branches
    /// only `other` explored are copied over.
    pub(crate) fn merge(&mut self, other: &Self) {
        debug_assert_eq!(self.root().board, other.root().board);
        let mut stack = vec![(ROOT, ROOT)];
        while let Some((ours, theirs)) = stack.pop() {
            let source = &other.nodes[theirs];
            let node = &mut self.nodes[ours];
            node.visits += source.visits;
            node.total_reward += source.total_reward;
            for (column, their_child) in source.children() {
                match self.nodes[ours].child(column) {
                    Some(our_child) => stack.push((our_child, their_child)),
                    None => self.attach(ours, column, other.subtree(their_child)),
                }
            }
        }
    }

    /// Appends a compact tree and links its root as the child of `parent`
    /// for the column.
    fn attach(&mut self, parent: NodeIndex, column: usize, subtree: Self) {
        let offset = self.nodes.len();
        self.nodes[parent].children[column] = Some(offset);
        for mut node in subtree.nodes {
            node.parent = if node.parent == TOMBSTONE_PARENT {
                parent
            } else {
                node.parent + offset
            };
            for child in node.children.iter_mut().flatten() {
                *child += offset;
            }
            self.nodes.push(node);
        }
    }
}
