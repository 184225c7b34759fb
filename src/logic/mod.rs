pub mod engine;
pub mod expand;
pub mod grouping;
pub mod materialize;
pub mod pricing;

pub use engine::*;
pub use expand::*;
pub use grouping::*;
pub use materialize::*;
pub use pricing::*;
