//! ABI infrastructure - Alloy-based ABI loading and decoding

mod decoder;
mod loader;

pub use decoder::{format_dyn_sol_value, AlloyCallDecoder};
pub use loader::AbiLoader;
