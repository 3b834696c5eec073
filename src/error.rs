use derive_more::{Display, From};

pub type Result<T> = core::result::Result<T, MetaballsError>;

#[derive(Debug, Display, From)]
#[display("{self:?}")]
pub enum MetaballsError {
    /// Grids need at least 4 voxels per axis so that one interior cell with
    /// well-defined corner gradients exists.
    GridTooSmall,
    /// The iso-level was NaN or infinite.
    NonFiniteIsoLevel,
}

impl std::error::Error for MetaballsError {}
