/// A disjoint-set (union-find) forest with path compression and union by size.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    /// Creates `len` singleton sets.
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    /// Returns the root of the set containing `id`, compressing the path on the way.
    pub fn find(&mut self, mut id: usize) -> usize {
        let mut root = id;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[id] != root {
            let next = self.parent[id];
            self.parent[id] = root;
            id = next;
        }

        root
    }

    /// Merges the sets containing `a` and `b`, returning the root of the merged set.
    pub fn union(&mut self, a: usize, b: usize) -> usize {
        let a_root = self.find(a);
        let b_root = self.find(b);

        if a_root == b_root {
            return a_root;
        }

        let (big, small) = if self.size[a_root] >= self.size[b_root] {
            (a_root, b_root)
        } else {
            (b_root, a_root)
        };
        self.parent[small] = big;
        self.size[big] += self.size[small];
        big
    }

    /// Members of every set, sets ordered by their smallest member.
    pub fn groups(&mut self) -> Vec<Vec<usize>> {
        let mut slot_of_root = vec![usize::MAX; self.parent.len()];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for id in 0..self.parent.len() {
            let root = self.find(id);
            if slot_of_root[root] == usize::MAX {
                slot_of_root[root] = groups.len();
                groups.push(Vec::with_capacity(self.size[root]));
            }
            groups[slot_of_root[root]].push(id);
        }
        groups
    }
}
