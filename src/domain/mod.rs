//! Domain layer - types and traits independent of transports

pub mod abi;
