use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CrystalError {
    #[error("Invalid unit cell: {0}")]
    InvalidCell(String),

    #[error("Cannot parse symmetry operator '{operator}': {reason}")]
    InvalidOperator { operator: String, reason: String },

    #[error("Unknown space group symbol: '{0}'")]
    UnknownSpaceGroup(String),

    #[error("Space group '{0}' must list the identity as its first operator")]
    MissingIdentity(String),
}
