//! Config loading and locale helpers shared by the frontends.

pub mod load;

pub use load::*;
