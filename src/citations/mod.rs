pub mod counter;
pub mod validity;

pub use counter::*;
pub use validity::*;
