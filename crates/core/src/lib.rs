//! `stallbook-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the inventory and
//! reporting crates (no infrastructure concerns).

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{IdGenerator, RecordId, SequentialIdGenerator};
pub use value_object::{Money, ValueObject};
