pub mod preprocessing;
pub mod fill;
pub mod extraction;

pub use preprocessing::*;
pub use fill::*;
pub use extraction::*;
