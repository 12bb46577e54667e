//! Chain and contract primitives for vault deposits.
//!
//! This crate provides:
//! - The bundled table of supported EVM networks and their wrapped-native tokens
//! - Address validation and EIP-55 checksum rendering
//! - Call payload encoding for vault `deposit`/`withdraw`, token `approve` and
//!   native-token wrapping
//! - Minimal ABI encoding utilities and smallest-unit amount formatting

pub mod abi;
pub mod address;
pub mod calls;
pub mod chains;
pub mod error;
pub mod units;

pub use address::{checksum_address, is_valid_address, parse_address};
pub use calls::{parse_amount, CallKind};
pub use chains::{ChainProfile, ChainRegistry};
pub use error::ChainError;
