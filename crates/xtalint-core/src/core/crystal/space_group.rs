use super::error::CrystalError;
use super::operator::SymmetryOperator;
use phf::{Map, phf_map};

struct SpaceGroupEntry {
    symbol: &'static str,
    operators: &'static [&'static str],
}

const P1: &[&str] = &["X,Y,Z"];
const P121: &[&str] = &["X,Y,Z", "-X,Y,-Z"];
const P1211: &[&str] = &["X,Y,Z", "-X,Y+1/2,-Z"];
const C121: &[&str] = &["X,Y,Z", "-X,Y,-Z", "X+1/2,Y+1/2,Z", "-X+1/2,Y+1/2,-Z"];
const P222: &[&str] = &["X,Y,Z", "-X,-Y,Z", "-X,Y,-Z", "X,-Y,-Z"];
const P2221: &[&str] = &["X,Y,Z", "-X,-Y,Z+1/2", "-X,Y,-Z+1/2", "X,-Y,-Z"];
const P21212: &[&str] = &["X,Y,Z", "-X,-Y,Z", "-X+1/2,Y+1/2,-Z", "X+1/2,-Y+1/2,-Z"];
const P212121: &[&str] = &[
    "X,Y,Z",
    "-X+1/2,-Y,Z+1/2",
    "-X,Y+1/2,-Z+1/2",
    "X+1/2,-Y+1/2,-Z",
];
const C2221: &[&str] = &[
    "X,Y,Z",
    "-X,-Y,Z+1/2",
    "-X,Y,-Z+1/2",
    "X,-Y,-Z",
    "X+1/2,Y+1/2,Z",
    "-X+1/2,-Y+1/2,Z+1/2",
    "-X+1/2,Y+1/2,-Z+1/2",
    "X+1/2,-Y+1/2,-Z",
];
const I222: &[&str] = &[
    "X,Y,Z",
    "-X,-Y,Z",
    "-X,Y,-Z",
    "X,-Y,-Z",
    "X+1/2,Y+1/2,Z+1/2",
    "-X+1/2,-Y+1/2,Z+1/2",
    "-X+1/2,Y+1/2,-Z+1/2",
    "X+1/2,-Y+1/2,-Z+1/2",
];
const P31: &[&str] = &["X,Y,Z", "-Y,X-Y,Z+1/3", "-X+Y,-X,Z+2/3"];
const P32: &[&str] = &["X,Y,Z", "-Y,X-Y,Z+2/3", "-X+Y,-X,Z+1/3"];
const P3121: &[&str] = &[
    "X,Y,Z",
    "-Y,X-Y,Z+1/3",
    "-X+Y,-X,Z+2/3",
    "Y,X,-Z",
    "X-Y,-Y,-Z+2/3",
    "-X,-X+Y,-Z+1/3",
];
const P3221: &[&str] = &[
    "X,Y,Z",
    "-Y,X-Y,Z+2/3",
    "-X+Y,-X,Z+1/3",
    "Y,X,-Z",
    "X-Y,-Y,-Z+1/3",
    "-X,-X+Y,-Z+2/3",
];
const P41212: &[&str] = &[
    "X,Y,Z",
    "-X,-Y,Z+1/2",
    "-Y+1/2,X+1/2,Z+1/4",
    "Y+1/2,-X+1/2,Z+3/4",
    "-X+1/2,Y+1/2,-Z+1/4",
    "X+1/2,-Y+1/2,-Z+3/4",
    "Y,X,-Z",
    "-Y,-X,-Z+1/2",
];
const P43212: &[&str] = &[
    "X,Y,Z",
    "-X,-Y,Z+1/2",
    "-Y+1/2,X+1/2,Z+3/4",
    "Y+1/2,-X+1/2,Z+1/4",
    "-X+1/2,Y+1/2,-Z+3/4",
    "X+1/2,-Y+1/2,-Z+1/4",
    "Y,X,-Z",
    "-Y,-X,-Z+1/2",
];
const P6122: &[&str] = &[
    "X,Y,Z",
    "-Y,X-Y,Z+1/3",
    "-X+Y,-X,Z+2/3",
    "-X,-Y,Z+1/2",
    "Y,-X+Y,Z+5/6",
    "X-Y,X,Z+1/6",
    "Y,X,-Z+1/3",
    "X-Y,-Y,-Z",
    "-X,-X+Y,-Z+2/3",
    "-Y,-X,-Z+5/6",
    "-X+Y,Y,-Z+1/2",
    "X,X-Y,-Z+1/6",
];
const P6522: &[&str] = &[
    "X,Y,Z",
    "-Y,X-Y,Z+2/3",
    "-X+Y,-X,Z+1/3",
    "-X,-Y,Z+1/2",
    "Y,-X+Y,Z+1/6",
    "X-Y,X,Z+5/6",
    "Y,X,-Z+2/3",
    "X-Y,-Y,-Z",
    "-X,-X+Y,-Z+1/3",
    "-Y,-X,-Z+1/6",
    "-X+Y,Y,-Z+1/2",
    "X,X-Y,-Z+5/6",
];

// Keyed by the upper-cased symbol with all whitespace removed.
static BUILTIN_SPACE_GROUPS: Map<&'static str, SpaceGroupEntry> = phf_map! {
    "P1" => SpaceGroupEntry { symbol: "P 1", operators: P1 },
    "P121" => SpaceGroupEntry { symbol: "P 1 2 1", operators: P121 },
    "P2" => SpaceGroupEntry { symbol: "P 1 2 1", operators: P121 },
    "P1211" => SpaceGroupEntry { symbol: "P 1 21 1", operators: P1211 },
    "P21" => SpaceGroupEntry { symbol: "P 1 21 1", operators: P1211 },
    "C121" => SpaceGroupEntry { symbol: "C 1 2 1", operators: C121 },
    "C2" => SpaceGroupEntry { symbol: "C 1 2 1", operators: C121 },
    "P222" => SpaceGroupEntry { symbol: "P 2 2 2", operators: P222 },
    "P2221" => SpaceGroupEntry { symbol: "P 2 2 21", operators: P2221 },
    "P21212" => SpaceGroupEntry { symbol: "P 21 21 2", operators: P21212 },
    "P212121" => SpaceGroupEntry { symbol: "P 21 21 21", operators: P212121 },
    "C2221" => SpaceGroupEntry { symbol: "C 2 2 21", operators: C2221 },
    "I222" => SpaceGroupEntry { symbol: "I 2 2 2", operators: I222 },
    "P31" => SpaceGroupEntry { symbol: "P 31", operators: P31 },
    "P32" => SpaceGroupEntry { symbol: "P 32", operators: P32 },
    "P3121" => SpaceGroupEntry { symbol: "P 31 2 1", operators: P3121 },
    "P3221" => SpaceGroupEntry { symbol: "P 32 2 1", operators: P3221 },
    "P41212" => SpaceGroupEntry { symbol: "P 41 21 2", operators: P41212 },
    "P43212" => SpaceGroupEntry { symbol: "P 43 21 2", operators: P43212 },
    "P6122" => SpaceGroupEntry { symbol: "P 61 2 2", operators: P6122 },
    "P6522" => SpaceGroupEntry { symbol: "P 65 2 2", operators: P6522 },
};

/// An ordered list of symmetry operators with its Hermann-Mauguin symbol.
///
/// Operator 0 is always the identity, so copy 0 of a unit cell is the
/// deposited asymmetric unit itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceGroup {
    symbol: String,
    operators: Vec<SymmetryOperator>,
}

impl SpaceGroup {
    /// Creates a space group from an explicit operator list.
    ///
    /// # Errors
    ///
    /// Returns [`CrystalError::MissingIdentity`] if the list is empty or
    /// does not start with the identity.
    pub fn new(symbol: &str, operators: Vec<SymmetryOperator>) -> Result<Self, CrystalError> {
        match operators.first() {
            Some(first) if first.is_identity() => Ok(Self {
                symbol: symbol.trim().to_string(),
                operators,
            }),
            _ => Err(CrystalError::MissingIdentity(symbol.to_string())),
        }
    }

    /// Creates a space group from operators in algebraic notation.
    pub fn from_algebraic<S: AsRef<str>>(symbol: &str, operators: &[S]) -> Result<Self, CrystalError> {
        let parsed = operators
            .iter()
            .map(|op| op.as_ref().parse())
            .collect::<Result<Vec<SymmetryOperator>, _>>()?;
        Self::new(symbol, parsed)
    }

    /// Looks up a space group in the built-in table.
    ///
    /// Matching ignores case and whitespace, and accepts the short
    /// monoclinic symbols (`P 21` for `P 1 21 1`).
    pub fn from_symbol(symbol: &str) -> Result<Self, CrystalError> {
        let key: String = symbol
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();
        let entry = BUILTIN_SPACE_GROUPS
            .get(key.as_str())
            .ok_or_else(|| CrystalError::UnknownSpaceGroup(symbol.trim().to_string()))?;
        Self::from_algebraic(entry.symbol, entry.operators)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn num_operators(&self) -> usize {
        self.operators.len()
    }

    pub fn operator(&self, index: usize) -> Option<&SymmetryOperator> {
        self.operators.get(index)
    }

    pub fn operators(&self) -> &[SymmetryOperator] {
        &self.operators
    }
}
