use super::error::CrystalError;
use nalgebra::{Matrix3, Point3, Vector3};

const DUMMY_EDGE_TOLERANCE: f64 = 1e-3;

/// The six lattice parameters: edge lengths in Angstroms, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellParameters {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

/// A crystal unit cell with precomputed coordinate conversions.
///
/// The orthogonalization follows the PDB convention: the `a` axis lies along
/// Cartesian x and `b` lies in the xy plane.
#[derive(Debug, Clone, PartialEq)]
pub struct CrystalCell {
    parameters: CellParameters,
    volume: f64,
    to_cartesian: Matrix3<f64>,
    to_fractional: Matrix3<f64>,
}

impl CrystalCell {
    /// Builds a cell from its lattice parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CrystalError::InvalidCell`] if an edge is not positive, an
    /// angle lies outside (0, 180) degrees, or the angles cannot close a
    /// parallelepiped of positive volume.
    pub fn new(
        a: f64,
        b: f64,
        c: f64,
        alpha: f64,
        beta: f64,
        gamma: f64,
    ) -> Result<Self, CrystalError> {
        for (name, edge) in [("a", a), ("b", b), ("c", c)] {
            if !edge.is_finite() || edge <= 0.0 {
                return Err(CrystalError::InvalidCell(format!(
                    "edge {} must be positive, got {}",
                    name, edge
                )));
            }
        }
        for (name, angle) in [("alpha", alpha), ("beta", beta), ("gamma", gamma)] {
            if !angle.is_finite() || angle <= 0.0 || angle >= 180.0 {
                return Err(CrystalError::InvalidCell(format!(
                    "angle {} must lie strictly between 0 and 180 degrees, got {}",
                    name, angle
                )));
            }
        }

        let (cos_a, cos_b, cos_g) = (
            alpha.to_radians().cos(),
            beta.to_radians().cos(),
            gamma.to_radians().cos(),
        );
        let sin_g = gamma.to_radians().sin();

        let radicand = 1.0 - cos_a * cos_a - cos_b * cos_b - cos_g * cos_g + 2.0 * cos_a * cos_b * cos_g;
        if radicand <= 0.0 {
            return Err(CrystalError::InvalidCell(format!(
                "angles ({}, {}, {}) do not form a valid cell",
                alpha, beta, gamma
            )));
        }
        let volume = a * b * c * radicand.sqrt();

        #[rustfmt::skip]
        let to_cartesian = Matrix3::new(
            a,   b * cos_g, c * cos_b,
            0.0, b * sin_g, c * (cos_a - cos_b * cos_g) / sin_g,
            0.0, 0.0,       volume / (a * b * sin_g),
        );
        let to_fractional = to_cartesian.try_inverse().ok_or_else(|| {
            CrystalError::InvalidCell("orthogonalization matrix is singular".to_string())
        })?;

        Ok(Self {
            parameters: CellParameters {
                a,
                b,
                c,
                alpha,
                beta,
                gamma,
            },
            volume,
            to_cartesian,
            to_fractional,
        })
    }

    pub fn parameters(&self) -> &CellParameters {
        &self.parameters
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Matrix whose columns are the lattice vectors in Cartesian space.
    pub fn fractional_to_cartesian(&self) -> &Matrix3<f64> {
        &self.to_cartesian
    }

    pub fn cartesian_to_fractional(&self) -> &Matrix3<f64> {
        &self.to_fractional
    }

    pub fn to_cartesian(&self, fractional: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.to_cartesian * fractional.coords)
    }

    pub fn to_fractional(&self, cartesian: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.to_fractional * cartesian.coords)
    }

    /// Cartesian displacement of an integer lattice translation.
    pub fn lattice_vector(&self, translation: &Vector3<i32>) -> Vector3<f64> {
        self.to_cartesian * translation.map(f64::from)
    }

    /// Length of the longest of the four body diagonals.
    pub fn max_dimension(&self) -> f64 {
        let a = self.to_cartesian.column(0).into_owned();
        let b = self.to_cartesian.column(1).into_owned();
        let c = self.to_cartesian.column(2).into_owned();
        [a + b + c, a + b - c, a - b + c, -a + b + c]
            .iter()
            .map(|d| d.norm())
            .fold(0.0, f64::max)
    }

    /// Whether this is the 1x1x1 placeholder cell written for structures
    /// that were not solved by crystallography.
    pub fn is_dummy(&self) -> bool {
        let p = &self.parameters;
        [p.a, p.b, p.c]
            .iter()
            .all(|edge| (edge - 1.0).abs() < DUMMY_EDGE_TOLERANCE)
    }
}
