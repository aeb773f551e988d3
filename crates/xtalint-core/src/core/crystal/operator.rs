use super::error::CrystalError;
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};
use std::fmt;
use std::str::FromStr;

const FRACTION_TOLERANCE: f64 = 1e-6;
const DENOMINATORS: [i64; 7] = [1, 2, 3, 4, 6, 8, 12];

/// A space-group symmetry operator acting on fractional coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryOperator {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl SymmetryOperator {
    pub fn new(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros())
    }

    pub fn is_identity(&self) -> bool {
        (self.rotation - Matrix3::identity()).amax() < FRACTION_TOLERANCE
            && self.translation.amax() < FRACTION_TOLERANCE
    }

    /// Applies the operator to a point in fractional coordinates.
    pub fn apply(&self, fractional: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * fractional.coords + self.translation)
    }

    /// The operator as a 4x4 affine matrix in fractional coordinates.
    pub fn to_affine(&self) -> Matrix4<f64> {
        let mut m = self.rotation.to_homogeneous();
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        m
    }

    /// Formats the operator in the algebraic notation (e.g., `-X,Y+1/2,-Z`).
    pub fn to_algebraic(&self) -> String {
        (0..3)
            .map(|row| format_component(&self.rotation.row(row).transpose(), self.translation[row]))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromStr for SymmetryOperator {
    type Err = CrystalError;

    /// Parses an operator written as three comma-separated expressions in
    /// `x`, `y` and `z`, such as `-X+Y,-X,Z+2/3` or `1/2+x, 1/2-y, -z`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CrystalError::InvalidOperator {
            operator: s.to_string(),
            reason: reason.to_string(),
        };

        let components: Vec<&str> = s.split(',').collect();
        if components.len() != 3 {
            return Err(invalid("expected three comma-separated components"));
        }

        let mut rotation = Matrix3::zeros();
        let mut translation = Vector3::zeros();
        for (row, component) in components.iter().enumerate() {
            let (coefficients, shift) = parse_component(component).map_err(|r| invalid(&r))?;
            rotation.set_row(row, &coefficients.transpose());
            translation[row] = shift;
        }

        Ok(Self::new(rotation, translation))
    }
}

impl fmt::Display for SymmetryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_algebraic())
    }
}

fn parse_component(expr: &str) -> Result<(Vector3<f64>, f64), String> {
    let cleaned: String = expr
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    if cleaned.is_empty() {
        return Err("empty component".to_string());
    }

    let mut coefficients = Vector3::zeros();
    let mut shift = 0.0;
    let mut rest = cleaned.as_str();

    while !rest.is_empty() {
        let (sign, body) = match rest.as_bytes()[0] {
            b'+' => (1.0, &rest[1..]),
            b'-' => (-1.0, &rest[1..]),
            _ => (1.0, rest),
        };
        let end = body.find(['+', '-']).unwrap_or(body.len());
        let term = &body[..end];
        if term.is_empty() {
            return Err(format!("dangling sign in '{}'", expr.trim()));
        }

        match term.chars().last().and_then(axis_index) {
            Some(axis) => {
                let factor = term[..term.len() - 1].trim_end_matches('*');
                let factor = if factor.is_empty() {
                    1.0
                } else {
                    parse_number(factor).ok_or_else(|| format!("invalid coefficient '{}'", factor))?
                };
                coefficients[axis] += sign * factor;
            }
            None => {
                shift += sign * parse_number(term).ok_or_else(|| format!("invalid term '{}'", term))?;
            }
        }
        rest = &body[end..];
    }

    Ok((coefficients, shift))
}

fn axis_index(c: char) -> Option<usize> {
    match c {
        'x' => Some(0),
        'y' => Some(1),
        'z' => Some(2),
        _ => None,
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let value = match s.split_once('/') {
        Some((num, den)) => {
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num.parse::<f64>().ok()? / den
        }
        None => s.parse().ok()?,
    };
    value.is_finite().then_some(value)
}

fn format_component(coefficients: &Vector3<f64>, shift: f64) -> String {
    let mut out = String::new();
    for (axis, name) in ["X", "Y", "Z"].iter().enumerate() {
        let c = coefficients[axis];
        if c.abs() < FRACTION_TOLERANCE {
            continue;
        }
        let sign = if c < 0.0 { "-" } else if out.is_empty() { "" } else { "+" };
        if (c.abs() - 1.0).abs() < FRACTION_TOLERANCE {
            out.push_str(&format!("{}{}", sign, name));
        } else {
            out.push_str(&format!("{}{}*{}", sign, format_number(c.abs()), name));
        }
    }
    if shift.abs() >= FRACTION_TOLERANCE {
        let sign = if shift < 0.0 { "-" } else if out.is_empty() { "" } else { "+" };
        out.push_str(&format!("{}{}", sign, format_number(shift.abs())));
    }
    if out.is_empty() {
        out.push('0');
    }
    out
}

fn format_number(value: f64) -> String {
    for den in DENOMINATORS {
        let num = value * den as f64;
        if (num - num.round()).abs() < FRACTION_TOLERANCE {
            let num = num.round() as i64;
            return if den == 1 {
                num.to_string()
            } else {
                format!("{}/{}", num, den)
            };
        }
    }
    format!("{:.4}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(s: &str) -> SymmetryOperator {
        s.parse().unwrap()
    }

    #[test]
    fn parses_screw_axis_operator() {
        let o = op("-X,Y+1/2,-Z");
        assert_eq!(o.rotation, Matrix3::new(-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, -1.0));
        assert_eq!(o.translation, Vector3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn parses_mixed_axes_leading_constants_and_lowercase() {
        let o = op(" -x+y , 1/2-x , z+2/3 ");
        assert_eq!(o.rotation, Matrix3::new(-1.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 1.0));
        assert!((o.translation - Vector3::new(0.0, 0.5, 2.0 / 3.0)).norm() < 1e-12);
    }

    #[test]
    fn parses_decimal_shifts_and_explicit_coefficients() {
        let o = op("2*x,y+0.25,-z");
        assert_eq!(o.rotation[(0, 0)], 2.0);
        assert_eq!(o.translation[1], 0.25);
    }

    #[test]
    fn rejects_malformed_operators() {
        assert!(matches!(
            "X,Y".parse::<SymmetryOperator>(),
            Err(CrystalError::InvalidOperator { .. })
        ));
        assert!("X,Y+,Z".parse::<SymmetryOperator>().is_err());
        assert!("X,W,Z".parse::<SymmetryOperator>().is_err());
        assert!("X,Y+1/0,Z".parse::<SymmetryOperator>().is_err());
    }

    #[test]
    fn algebraic_formatting_round_trips() {
        for s in ["X,Y,Z", "-X,Y+1/2,-Z", "-Y+1/2,X+1/2,Z+3/4", "X-Y,-Y,-Z+2/3", "-X+Y,Y,-Z+1/2"] {
            assert_eq!(op(s).to_algebraic(), s);
        }
    }

    #[test]
    fn identity_is_detected() {
        assert!(op("x,y,z").is_identity());
        assert!(SymmetryOperator::identity().is_identity());
        assert!(!op("x,y,z+1").is_identity());
    }

    #[test]
    fn affine_matrix_applies_rotation_then_translation() {
        let o = op("-Y,X-Y,Z+1/3");
        let p = Point3::new(0.1, 0.2, 0.3);
        let direct = o.apply(&p);
        let via_matrix = o.to_affine() * p.to_homogeneous();
        assert!((direct.coords - via_matrix.xyz()).norm() < 1e-12);
        assert!((direct - Point3::new(-0.2, -0.1, 0.3 + 1.0 / 3.0)).norm() < 1e-12);
    }
}
