use super::models::cell::CellRole;
use super::models::coords::SiqadCoord;
use super::models::layout::SidbLayout;
use itertools::Itertools;
use std::cmp::Ordering;

/// Two dangling bonds sharing one electron, encoding a single binary terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BdlPair {
    pub role: CellRole,
    /// The northern (then western) cell of the pair.
    pub upper: SiqadCoord,
    pub lower: SiqadCoord,
}

/// Inter-dot distance window (nm) for two cells to form a BDL pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BdlPairParams {
    pub minimum_distance_nm: f64,
    pub maximum_distance_nm: f64,
}

impl Default for BdlPairParams {
    fn default() -> Self {
        Self {
            minimum_distance_nm: 0.75,
            maximum_distance_nm: 1.5,
        }
    }
}

/// Pairs up all cells of `role` into BDL pairs, sorted from west to east.
///
/// Candidate pairs are accepted greedily in order of increasing separation, so every
/// cell belongs to at most one pair. Cells without a partner in range are ignored.
pub fn detect_bdl_pairs(
    layout: &SidbLayout,
    role: CellRole,
    params: &BdlPairParams,
) -> Vec<BdlPair> {
    let cells = layout.cells_with_role(role);

    let mut candidates: Vec<(f64, SiqadCoord, SiqadCoord)> = cells
        .iter()
        .tuple_combinations()
        .map(|(a, b)| (layout.distance_nm(*a, *b), *a, *b))
        .filter(|(d, _, _)| *d >= params.minimum_distance_nm && *d <= params.maximum_distance_nm)
        .collect();
    candidates.sort_by(|(d1, a1, b1), (d2, a2, b2)| {
        d1.partial_cmp(d2)
            .unwrap_or(Ordering::Equal)
            .then_with(|| (a1, b1).cmp(&(a2, b2)))
    });

    let mut paired: Vec<SiqadCoord> = Vec::with_capacity(cells.len());
    let mut pairs = Vec::new();
    for (_, a, b) in candidates {
        if paired.contains(&a) || paired.contains(&b) {
            continue;
        }
        paired.push(a);
        paired.push(b);
        let (upper, lower) = order_upper_lower(layout, a, b);
        pairs.push(BdlPair { role, upper, lower });
    }

    pairs.sort_by(|p, q| {
        let pp = layout.lattice().position_nm(p.upper);
        let qp = layout.lattice().position_nm(q.upper);
        pp.x.partial_cmp(&qp.x)
            .unwrap_or(Ordering::Equal)
            .then(pp.y.partial_cmp(&qp.y).unwrap_or(Ordering::Equal))
    });
    pairs
}

fn order_upper_lower(
    layout: &SidbLayout,
    a: SiqadCoord,
    b: SiqadCoord,
) -> (SiqadCoord, SiqadCoord) {
    let pa = layout.lattice().position_nm(a);
    let pb = layout.lattice().position_nm(b);
    let a_first = match pa.y.partial_cmp(&pb.y).unwrap_or(Ordering::Equal) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => pa.x <= pb.x,
    };
    if a_first { (a, b) } else { (b, a) }
}

/// Produces the layout for every input combination of a gate.
///
/// Input `i` sets bit `k` of the combination (most significant bit = westernmost pair).
/// A 1 bit keeps the lower cell of the pair and removes the upper one; a 0 bit keeps
/// the upper cell.
#[derive(Debug, Clone)]
pub struct BdlInputIterator<'a> {
    layout: &'a SidbLayout,
    input_pairs: Vec<BdlPair>,
    current: u64,
}

impl<'a> BdlInputIterator<'a> {
    pub fn new(layout: &'a SidbLayout, params: &BdlPairParams) -> Self {
        Self {
            layout,
            input_pairs: detect_bdl_pairs(layout, CellRole::Input, params),
            current: 0,
        }
    }

    pub fn input_pairs(&self) -> &[BdlPair] {
        &self.input_pairs
    }

    pub fn num_input_pairs(&self) -> usize {
        self.input_pairs.len()
    }

    pub fn num_combinations(&self) -> u64 {
        1u64 << self.input_pairs.len()
    }

    /// Returns the layout representing input combination `index`.
    pub fn layout_for(&self, index: u64) -> SidbLayout {
        let mut layout = self.layout.clone();
        let k = self.input_pairs.len();
        for (position, pair) in self.input_pairs.iter().enumerate() {
            let bit = (index >> (k - 1 - position)) & 1;
            if bit == 1 {
                layout.remove_cell(pair.upper);
            } else {
                layout.remove_cell(pair.lower);
            }
        }
        layout
    }
}

impl Iterator for BdlInputIterator<'_> {
    type Item = (u64, SidbLayout);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.num_combinations() {
            return None;
        }
        let index = self.current;
        self.current += 1;
        Some((index, self.layout_for(index)))
    }
}
