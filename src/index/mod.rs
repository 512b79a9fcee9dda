pub mod inverted;
pub mod partial;
pub mod posting;
