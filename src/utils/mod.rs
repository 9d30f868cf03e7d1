pub mod navigation;
pub mod vector;

pub use vector::Vector;
