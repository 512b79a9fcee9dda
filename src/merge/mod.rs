pub mod mergeinfo;
pub mod merger;
