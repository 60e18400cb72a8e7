//! Value-level fake data generation
//!
//! Every scalar is replaced by a fake of the same shape: booleans stay
//! booleans, UUIDs stay UUIDs, dates keep their template and their
//! past/future relation to now, numbers keep their digit-run lengths, and
//! words are swapped for dictionary words of the same letter count.

pub mod context;
pub mod date;
pub mod number;
pub mod primitive;
pub mod text;

pub use context::RedactionContext;
pub use number::{FakeNumber, NumberKind};
pub use primitive::FakeValue;
