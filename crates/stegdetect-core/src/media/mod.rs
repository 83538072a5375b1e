pub mod image;
mod types;

pub use types::*;
