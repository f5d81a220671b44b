use super::node::TaxonTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatEntry {
    pub index: usize,
    pub depth: usize,
}

/// Pre-order walk of the forest: node first, then each child in sibling
/// order. Roots and children are expected to be sorted already.
pub fn flatten(tree: &TaxonTree) -> Vec<FlatEntry> {
    let mut ordered = Vec::with_capacity(tree.len());
    let mut stack = tree
        .roots
        .iter()
        .rev()
        .map(|&index| FlatEntry { index, depth: 0 })
        .collect::<Vec<FlatEntry>>();

    while let Some(entry) = stack.pop() {
        ordered.push(entry);
        for &child in tree.nodes[entry.index].children.iter().rev() {
            stack.push(FlatEntry {
                index: child,
                depth: entry.depth + 1,
            });
        }
    }

    ordered
}
