//! The hunting agent

pub mod dweller;

pub use dweller::{Dweller, HeardSound};
