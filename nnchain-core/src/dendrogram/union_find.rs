//! Disjoint-set forest used to replay merges into flat partitions.

#[derive(Clone, Debug)]
pub(super) struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
    size: Vec<usize>,
    /// Linkage-matrix node currently representing each root.
    pub(super) node: Vec<usize>,
}

impl DisjointSet {
    pub(super) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
            size: vec![1; n],
            node: (0..n).collect(),
        }
    }

    pub(super) fn find(&mut self, mut item: usize) -> usize {
        let mut root = item;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[item] != item {
            let parent = self.parent[item];
            self.parent[item] = root;
            item = parent;
        }

        root
    }

    /// Joins the sets holding `left` and `right`, returning the surviving
    /// root.
    pub(super) fn union(&mut self, left: usize, right: usize) -> usize {
        let mut left = self.find(left);
        let mut right = self.find(right);
        if left == right {
            return left;
        }
        let left_rank = self.rank[left];
        let right_rank = self.rank[right];
        if left_rank < right_rank {
            std::mem::swap(&mut left, &mut right);
        }
        self.parent[right] = left;
        self.size[left] += self.size[right];
        if left_rank == right_rank {
            self.rank[left] = left_rank.saturating_add(1);
        }
        left
    }

    pub(super) fn set_size(&mut self, item: usize) -> usize {
        let root = self.find(item);
        self.size[root]
    }

    /// Numbers the sets `0..k` in order of their lowest member.
    pub(super) fn labels(&mut self) -> Vec<usize> {
        let n = self.parent.len();
        let mut root_labels: Vec<Option<usize>> = vec![None; n];
        let mut next = 0;
        (0..n)
            .map(|item| {
                let root = self.find(item);
                *root_labels[root].get_or_insert_with(|| {
                    let label = next;
                    next += 1;
                    label
                })
            })
            .collect()
    }
}
