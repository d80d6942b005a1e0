use super::cell::CellRole;
use super::coords::{Lattice, SiqadCoord};
use super::defect::Defect;
use std::collections::BTreeMap;

/// A cell-level SiDB layout on a passivated silicon surface.
///
/// Cells are stored in row-major coordinate order, so every iteration over the layout
/// is deterministic. Besides the dangling bonds themselves, the layout carries the
/// electrostatic environment that every simulation of it must honor: charged point
/// defects, per-site external potentials and a global potential applied to all sites.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SidbLayout {
    /// Surface orientation used to turn coordinates into physical positions.
    lattice: Lattice,
    /// Occupied sites and their roles. `CellRole::Empty` is never stored.
    cells: BTreeMap<SiqadCoord, CellRole>,
    /// Charged defects keyed by their lattice site.
    defects: BTreeMap<SiqadCoord, Defect>,
    /// Externally applied potentials (V) on individual sites.
    local_external_potentials: BTreeMap<SiqadCoord, f64>,
    /// Potential (V) applied uniformly to every site.
    global_external_potential: f64,
}

impl SidbLayout {
    /// Creates an empty layout on the given lattice.
    pub fn new(lattice: Lattice) -> Self {
        Self {
            lattice,
            ..Self::default()
        }
    }

    /// Builds a layout from `(coordinate, role)` pairs.
    ///
    /// Later entries overwrite earlier ones, and `CellRole::Empty` entries remove the site.
    pub fn from_cells<I>(lattice: Lattice, cells: I) -> Self
    where
        I: IntoIterator<Item = (SiqadCoord, CellRole)>,
    {
        let mut layout = Self::new(lattice);
        for (coord, role) in cells {
            layout.assign_cell(coord, role);
        }
        layout
    }

    /// Builds a layout of normal cells on the Si(100) lattice.
    pub fn with_normal_cells<I>(coords: I) -> Self
    where
        I: IntoIterator<Item = SiqadCoord>,
    {
        Self::from_cells(
            Lattice::Si100,
            coords.into_iter().map(|c| (c, CellRole::Normal)),
        )
    }

    pub fn lattice(&self) -> Lattice {
        self.lattice
    }

    /// Assigns a role to a site. Assigning `CellRole::Empty` removes the cell.
    pub fn assign_cell(&mut self, coord: SiqadCoord, role: CellRole) {
        if role == CellRole::Empty {
            self.cells.remove(&coord);
        } else {
            self.cells.insert(coord, role);
        }
    }

    pub fn remove_cell(&mut self, coord: SiqadCoord) -> Option<CellRole> {
        self.cells.remove(&coord)
    }

    /// Returns the role at a site, or `CellRole::Empty` if no cell occupies it.
    pub fn role(&self, coord: SiqadCoord) -> CellRole {
        self.cells.get(&coord).copied().unwrap_or(CellRole::Empty)
    }

    pub fn is_empty_cell(&self, coord: SiqadCoord) -> bool {
        !self.cells.contains_key(&coord)
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterates over all occupied sites in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (SiqadCoord, CellRole)> + '_ {
        self.cells.iter().map(|(c, r)| (*c, *r))
    }

    pub fn coords(&self) -> Vec<SiqadCoord> {
        self.cells.keys().copied().collect()
    }

    pub fn cells_with_role(&self, role: CellRole) -> Vec<SiqadCoord> {
        self.cells
            .iter()
            .filter(|(_, r)| **r == role)
            .map(|(c, _)| *c)
            .collect()
    }

    pub fn assign_defect(&mut self, coord: SiqadCoord, defect: Defect) {
        self.defects.insert(coord, defect);
    }

    pub fn remove_defect(&mut self, coord: SiqadCoord) -> Option<Defect> {
        self.defects.remove(&coord)
    }

    pub fn defects(&self) -> impl Iterator<Item = (SiqadCoord, Defect)> + '_ {
        self.defects.iter().map(|(c, d)| (*c, *d))
    }

    pub fn has_defect(&self, coord: SiqadCoord) -> bool {
        self.defects.contains_key(&coord)
    }

    pub fn set_local_external_potential(&mut self, coord: SiqadCoord, potential: f64) {
        self.local_external_potentials.insert(coord, potential);
    }

    pub fn local_external_potential(&self, coord: SiqadCoord) -> f64 {
        self.local_external_potentials
            .get(&coord)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn set_global_external_potential(&mut self, potential: f64) {
        self.global_external_potential = potential;
    }

    pub fn global_external_potential(&self) -> f64 {
        self.global_external_potential
    }

    /// Returns the north-west and south-east corners of the smallest box enclosing all cells.
    ///
    /// The box is computed in cube coordinates, so both corners may sit on either half
    /// of a dimer row. Returns `None` for an empty layout.
    pub fn bounding_box(&self) -> Option<(SiqadCoord, SiqadCoord)> {
        let mut iter = self.cells.keys();
        let first = iter.next()?;
        let (mut min_x, mut min_row) = first.to_cube();
        let (mut max_x, mut max_row) = (min_x, min_row);
        for coord in iter {
            let (x, row) = coord.to_cube();
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_row = min_row.min(row);
            max_row = max_row.max(row);
        }
        Some((
            SiqadCoord::from_cube(min_x, min_row),
            SiqadCoord::from_cube(max_x, max_row),
        ))
    }

    /// Euclidean distance in nanometres between two sites on this layout's lattice.
    pub fn distance_nm(&self, a: SiqadCoord, b: SiqadCoord) -> f64 {
        self.lattice.distance_nm(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i64, y: i64, z: u8) -> SiqadCoord {
        SiqadCoord::new(x, y, z)
    }

    #[test]
    fn assigning_empty_role_removes_cell() {
        let mut layout = SidbLayout::new(Lattice::Si100);
        layout.assign_cell(c(1, 0, 0), CellRole::Input);
        assert_eq!(layout.role(c(1, 0, 0)), CellRole::Input);

        layout.assign_cell(c(1, 0, 0), CellRole::Empty);
        assert!(layout.is_empty());
        assert_eq!(layout.role(c(1, 0, 0)), CellRole::Empty);
    }

    #[test]
    fn cells_with_role_filters_in_row_major_order() {
        let layout = SidbLayout::from_cells(
            Lattice::Si100,
            [
                (c(5, 1, 0), CellRole::Output),
                (c(0, 0, 0), CellRole::Input),
                (c(2, 0, 0), CellRole::Normal),
                (c(3, 0, 0), CellRole::Input),
            ],
        );
        assert_eq!(
            layout.cells_with_role(CellRole::Input),
            vec![c(0, 0, 0), c(3, 0, 0)]
        );
        assert_eq!(layout.cells_with_role(CellRole::Output), vec![c(5, 1, 0)]);
        assert_eq!(layout.num_cells(), 4);
    }

    #[test]
    fn bounding_box_spans_half_rows() {
        let layout = SidbLayout::with_normal_cells([c(4, 0, 1), c(-2, 3, 0), c(1, 5, 1)]);
        let (nw, se) = layout.bounding_box().unwrap();
        assert_eq!(nw, c(-2, 0, 1));
        assert_eq!(se, c(4, 5, 1));
    }

    #[test]
    fn bounding_box_of_empty_layout_is_none() {
        assert!(SidbLayout::default().bounding_box().is_none());
    }

    #[test]
    fn external_potentials_default_to_zero() {
        let mut layout = SidbLayout::with_normal_cells([c(0, 0, 0)]);
        assert_eq!(layout.local_external_potential(c(0, 0, 0)), 0.0);
        layout.set_local_external_potential(c(0, 0, 0), -0.1);
        layout.set_global_external_potential(0.05);
        assert_eq!(layout.local_external_potential(c(0, 0, 0)), -0.1);
        assert_eq!(layout.global_external_potential(), 0.05);
    }
}
