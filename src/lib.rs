//! Bookshelf application library
//!
//! Wires the project modules onto the kernel and exposes the two entry points
//! used by the binaries: [`serve`] and [`migrate`].

pub mod bootstrap;
pub mod modules;

pub use bootstrap::{migrate, registry, serve};
