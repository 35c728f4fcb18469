pub mod download;
pub mod lookup;

pub use download::*;
pub use lookup::*;
