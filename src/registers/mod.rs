//! Typed radio registers
//!
//! Read and written with
//! [`SubGhz::read_typed_register`](crate::SubGhz::read_typed_register) and
//! [`SubGhz::write_typed_register`](crate::SubGhz::write_typed_register).
//! Multi-byte registers occupy consecutive addresses, most significant byte
//! first.

mod packet;

pub use packet::*;
