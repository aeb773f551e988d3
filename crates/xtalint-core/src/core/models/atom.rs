use super::ids::ResidueId;
use nalgebra::Point3;

/// An atom of the deposited structure.
///
/// Atoms are immutable once they have been placed in a
/// [`MolecularSystem`](super::system::MolecularSystem). Surface areas and
/// contacts are never stored here; the engine computes them as separate
/// per-atom arrays indexed in the order atoms are gathered for a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The serial number from the input file (e.g., PDB columns 7-11).
    ///
    /// Serials are used as the stable identity of an atom when comparing
    /// contact sets, so they must be unique within a chain.
    pub serial: usize,
    /// The name of the atom (e.g., "CA", "NZ", "OG1").
    pub name: String,
    /// The element symbol, normalized to capitalized form (e.g., "C", "Se", "Zn").
    pub element: String,
    /// The ID of the parent residue this atom belongs to.
    pub residue_id: ResidueId,
    /// The Cartesian coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// Whether the atom came from a `HETATM` record.
    pub is_hetero: bool,
}

impl Atom {
    /// Creates a new `Atom`.
    ///
    /// The element symbol is normalized so that lookups in radius tables are
    /// not sensitive to the casing used by the input file.
    ///
    /// # Arguments
    ///
    /// * `serial` - The serial number of the atom.
    /// * `name` - The name of the atom.
    /// * `element` - The element symbol, in any casing.
    /// * `residue_id` - The ID of the residue this atom belongs to.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(
        serial: usize,
        name: &str,
        element: &str,
        residue_id: ResidueId,
        position: Point3<f64>,
    ) -> Self {
        Self {
            serial,
            name: name.to_string(),
            element: normalize_element(element),
            residue_id,
            position,
            is_hetero: false,
        }
    }

    /// Marks the atom as originating from a hetero-atom record.
    pub fn with_hetero(mut self, is_hetero: bool) -> Self {
        self.is_hetero = is_hetero;
        self
    }

    /// Returns `true` for hydrogen and deuterium atoms.
    pub fn is_hydrogen(&self) -> bool {
        matches!(self.element.as_str(), "H" | "D")
    }
}

/// Normalizes an element symbol to its conventional capitalization.
///
/// Leading and trailing whitespace is removed; the first character is
/// upper-cased and the rest lower-cased (`"SE"` becomes `"Se"`).
pub fn normalize_element(symbol: &str) -> String {
    let trimmed = symbol.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Guesses an element symbol from a PDB-style atom name.
///
/// Used when the element columns are blank. Protein atom names start with
/// their element letter (`CA`, `OG1`, `NZ`), optionally preceded by a digit
/// for hydrogens (`1HB`), so the first alphabetic character is taken.
pub fn element_from_atom_name(name: &str) -> String {
    name.chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::ResidueId;
    use nalgebra::Point3;

    #[test]
    fn new_atom_stores_fields_and_normalizes_element() {
        let residue_id = ResidueId::default();
        let atom = Atom::new(12, "CA", " c ", residue_id, Point3::new(1.0, 2.0, 3.0));

        assert_eq!(atom.serial, 12);
        assert_eq!(atom.name, "CA");
        assert_eq!(atom.element, "C");
        assert_eq!(atom.residue_id, residue_id);
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));
        assert!(!atom.is_hetero);
    }

    #[test]
    fn with_hetero_sets_flag() {
        let atom = Atom::new(1, "ZN", "ZN", ResidueId::default(), Point3::origin()).with_hetero(true);
        assert!(atom.is_hetero);
        assert_eq!(atom.element, "Zn");
    }

    #[test]
    fn is_hydrogen_recognizes_hydrogen_and_deuterium() {
        let h = Atom::new(1, "HA", "H", ResidueId::default(), Point3::origin());
        let d = Atom::new(2, "D1", "d", ResidueId::default(), Point3::origin());
        let c = Atom::new(3, "CA", "C", ResidueId::default(), Point3::origin());
        assert!(h.is_hydrogen());
        assert!(d.is_hydrogen());
        assert!(!c.is_hydrogen());
    }

    #[test]
    fn normalize_element_handles_two_letter_symbols_and_blanks() {
        assert_eq!(normalize_element("SE"), "Se");
        assert_eq!(normalize_element("fe"), "Fe");
        assert_eq!(normalize_element("  "), "");
    }

    #[test]
    fn element_from_atom_name_skips_leading_digits() {
        assert_eq!(element_from_atom_name("1HB"), "H");
        assert_eq!(element_from_atom_name("OG1"), "O");
        assert_eq!(element_from_atom_name("123"), "");
    }
}
