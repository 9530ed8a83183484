//! Moves and their text representations
//!
//! [`Move`] itself is a plain source/destination pair with an optional promotion. Applying it to a
//! board lives in [`make`], while [`san`] and [`uci`] convert it to and from text.

mod base;

pub mod make;
pub mod san;
pub mod uci;

pub use base::*;
