pub mod bit_plane;
pub mod decoder;
pub(crate) mod iterators;
pub mod visualize;

pub use bit_plane::{extract, extract_lsb, BitPlane};
pub use decoder::{decode, guess_mime_type, open};
pub use visualize::{render_lsb, render_lsb_png};
