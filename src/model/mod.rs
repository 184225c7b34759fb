pub mod access;
pub mod catalog;
pub mod common;
pub mod composition;
pub mod expanded;
pub mod ordering;
pub mod user_context;

pub use catalog::*;
pub use common::*;
pub use composition::*;
pub use expanded::*;
pub use ordering::*;
pub use user_context::*;
