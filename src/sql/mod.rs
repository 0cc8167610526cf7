//! Statement building: identifiers interpolated through one formatter, values as parameters.

mod builder;
pub mod params;
pub mod row;
pub use builder::*;
pub use params::*;
pub use row::*;
