pub mod analyze;
pub mod analyze_zip;
pub mod lsb_picture;
mod shared;

pub use shared::Input;
