pub mod error;
pub mod geometry;
pub mod id_generator;
pub mod result;

pub use error::*;
pub use geometry::*;
pub use id_generator::*;
pub use result::*;
