use itertools::Itertools;

// Partition boundaries for a dimension of size `len`: cut points are clamped
// into range, merged with 0 and `len`, sorted and deduplicated.
pub fn normalize_cuts(cuts: &[usize], len: usize) -> Vec<usize> {
    [0, len]
        .iter()
        .chain(cuts.iter())
        .map(|&c| c.min(len))
        .sorted()
        .dedup()
        .collect()
}

// Interior cut points produced by consecutive extents, e.g. [2, 1, 3] -> [2, 3].
pub fn interior_cuts(extents: &[usize]) -> Vec<usize> {
    let mut cuts: Vec<usize> = extents
        .iter()
        .scan(0, |acc, extent| {
            *acc += extent;
            Some(*acc)
        })
        .collect();
    cuts.pop();
    cuts
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
