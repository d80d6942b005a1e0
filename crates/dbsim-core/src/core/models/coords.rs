use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A lattice site in SiQAD coordinates.
///
/// `x` indexes the dimer column, `y` the dimer row and `z` (0 or 1) selects the
/// half of the dimer row the dangling bond sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SiqadCoord {
    pub x: i64,
    pub y: i64,
    pub z: u8,
}

impl SiqadCoord {
    pub const fn new(x: i64, y: i64, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Row index in cube coordinates, where every half dimer row is its own row.
    #[inline]
    pub fn cube_row(&self) -> i64 {
        2 * self.y + i64::from(self.z)
    }

    #[inline]
    pub fn to_cube(&self) -> (i64, i64) {
        (self.x, self.cube_row())
    }

    #[inline]
    pub fn from_cube(x: i64, row: i64) -> Self {
        Self {
            x,
            y: row.div_euclid(2),
            z: row.rem_euclid(2) as u8,
        }
    }
}

// Row-major order: dimer row, then row half, then column.
impl Ord for SiqadCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cube_row()
            .cmp(&other.cube_row())
            .then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for SiqadCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SiqadCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<(i64, i64, u8)> for SiqadCoord {
    fn from((x, y, z): (i64, i64, u8)) -> Self {
        Self::new(x, y, z)
    }
}

/// Surface orientation of the hydrogen-passivated silicon lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Lattice {
    /// H-Si(100)-2x1.
    #[default]
    Si100,
    /// H-Si(111)-1x1.
    Si111,
}

struct LatticeGeometry {
    column_pitch_nm: f64,
    row_pitch_nm: f64,
    half_row_offset_nm: (f64, f64),
}

const SI_100: LatticeGeometry = LatticeGeometry {
    column_pitch_nm: 0.384,
    row_pitch_nm: 0.768,
    half_row_offset_nm: (0.0, 0.225),
};

const SI_111: LatticeGeometry = LatticeGeometry {
    column_pitch_nm: 0.665,
    row_pitch_nm: 0.384,
    half_row_offset_nm: (0.3325, 0.192),
};

impl Lattice {
    fn geometry(&self) -> &'static LatticeGeometry {
        match self {
            Lattice::Si100 => &SI_100,
            Lattice::Si111 => &SI_111,
        }
    }

    /// Physical position of a site in nanometres.
    pub fn position_nm(&self, coord: SiqadCoord) -> Point2<f64> {
        let g = self.geometry();
        let z = f64::from(coord.z);
        Point2::new(
            coord.x as f64 * g.column_pitch_nm + z * g.half_row_offset_nm.0,
            coord.y as f64 * g.row_pitch_nm + z * g.half_row_offset_nm.1,
        )
    }

    /// Euclidean distance between two sites in nanometres.
    pub fn distance_nm(&self, a: SiqadCoord, b: SiqadCoord) -> f64 {
        nalgebra::distance(&self.position_nm(a), &self.position_nm(b))
    }
}
