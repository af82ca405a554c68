pub mod exceptions;
pub mod geometry;
pub mod rstar_tree;
#[cfg(feature = "setup_tracing")]
mod settings;
