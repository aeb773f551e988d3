use super::cell::CrystalCell;
use super::operator::SymmetryOperator;
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// Entry-wise tolerance used when comparing transform products to the identity.
pub const IDENTITY_TOLERANCE: f64 = 1e-4;

/// A space-group operator combined with an integer lattice translation.
///
/// The transform is kept in two equivalent forms: the fractional affine
/// matrix (operator rotation, operator shift plus lattice translation) and
/// its Cartesian counterpart `C * F * C^-1`, where `C` is the cell's
/// orthogonalization matrix. Points are moved with the Cartesian form.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryTransform {
    operator_id: usize,
    translation: Vector3<i32>,
    fractional: Matrix4<f64>,
    cartesian: Matrix4<f64>,
}

impl SymmetryTransform {
    /// The transform of the deposited coordinates.
    pub fn identity() -> Self {
        Self {
            operator_id: 0,
            translation: Vector3::zeros(),
            fractional: Matrix4::identity(),
            cartesian: Matrix4::identity(),
        }
    }

    /// Resolves an operator and a lattice translation into Cartesian space.
    pub fn resolve(
        operator_id: usize,
        operator: &SymmetryOperator,
        translation: Vector3<i32>,
        cell: &CrystalCell,
    ) -> Self {
        let shift = operator.translation + translation.map(f64::from);
        let fractional = affine(&operator.rotation, &shift);

        let to_cart = cell.fractional_to_cartesian();
        let to_frac = cell.cartesian_to_fractional();
        let cartesian = affine(&(to_cart * operator.rotation * to_frac), &(to_cart * shift));

        Self {
            operator_id,
            translation,
            fractional,
            cartesian,
        }
    }

    /// Returns the same operator moved by an additional lattice translation.
    pub fn translated(&self, extra: &Vector3<i32>, cell: &CrystalCell) -> Self {
        let mut fractional = self.fractional;
        let mut cartesian = self.cartesian;
        let extra_frac = extra.map(f64::from);
        let extra_cart = cell.lattice_vector(extra);
        for row in 0..3 {
            fractional[(row, 3)] += extra_frac[row];
            cartesian[(row, 3)] += extra_cart[row];
        }
        Self {
            operator_id: self.operator_id,
            translation: self.translation + extra,
            fractional,
            cartesian,
        }
    }

    pub fn operator_id(&self) -> usize {
        self.operator_id
    }

    /// The total integer lattice translation applied on top of the operator.
    pub fn translation(&self) -> &Vector3<i32> {
        &self.translation
    }

    pub fn fractional_matrix(&self) -> &Matrix4<f64> {
        &self.fractional
    }

    pub fn cartesian_matrix(&self) -> &Matrix4<f64> {
        &self.cartesian
    }

    pub fn is_identity(&self) -> bool {
        (self.fractional - Matrix4::identity()).amax() < IDENTITY_TOLERANCE
    }

    /// Whether the translation part is zero.
    pub fn is_pure_operator(&self) -> bool {
        self.translation == Vector3::zeros()
    }

    /// Determinant of the rotation part.
    pub fn determinant(&self) -> f64 {
        self.fractional.fixed_view::<3, 3>(0, 0).determinant()
    }

    /// Whether `self * other` is the identity within [`IDENTITY_TOLERANCE`]
    /// on all sixteen entries.
    pub fn is_inverse_of(&self, other: &SymmetryTransform) -> bool {
        let product = self.fractional * other.fractional;
        (product - Matrix4::identity()).amax() < IDENTITY_TOLERANCE
    }

    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        self.cartesian.transform_point(point)
    }
}

fn affine(rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> Matrix4<f64> {
    let mut m = rotation.to_homogeneous();
    m.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
    m
}
