//! # Base types for arbiter
//!
//! This is an auxiliary crate for `arbiter`, which contains the core value types. It is split from the main
//! crate, so everything declared here can be used in the build script for `arbiter`.
//!
//! Normally you don't want to use this crate directly. Use `arbiter` instead, which re-exports it.

pub mod bitboard;
pub mod bitboard_consts;
pub mod geometry;
pub mod types;
