use ir::NodeId;

/// Depth-first walk over an adjacency list with an explicit stack.
///
/// The first call to `next` yields the start node. Every later call pushes
/// the control successors of the node yielded last, unless
/// [`continue_next_path`](Self::continue_next_path) was called for it, and
/// then pops the most recently pushed node. Nodes may be yielded more than
/// once; callers track what they have seen.
#[derive(Debug)]
pub struct PathTraversal<'a> {
    adj: &'a [Vec<NodeId>],
    start: NodeId,
    current: Option<NodeId>,
    paths: Vec<NodeId>,
    started: bool,
    skip_successors: bool,
}

impl<'a> PathTraversal<'a> {
    pub fn new(adj: &'a [Vec<NodeId>], start: NodeId) -> Self {
        Self {
            adj,
            start,
            current: None,
            paths: Vec::new(),
            started: false,
            skip_successors: false,
        }
    }

    /// Prunes the path at the node yielded last: its successors are not
    /// explored.
    pub fn continue_next_path(&mut self) {
        self.skip_successors = true;
    }
}

impl Iterator for PathTraversal<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if !self.started {
            self.started = true;
            if self.start >= self.adj.len() {
                return None;
            }
            self.current = Some(self.start);
            return self.current;
        }
        if let Some(current) = self.current {
            if !std::mem::take(&mut self.skip_successors) {
                self.paths.extend(self.adj[current].iter().copied());
            }
        }
        self.current = self.paths.pop();
        self.current
    }
}
