pub mod error;
pub mod field;
pub mod grid;
pub mod interp;
pub mod mesh;
pub mod normals;
pub mod plugin;
pub mod polygonize;
pub mod sweep;
pub mod tables;
pub mod types;

pub use plugin::{MetaballSurface, MetaballsPlugin};
