//! Profile types

mod types;

pub use types::*;
