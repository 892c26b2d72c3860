//! Test function implementations organized by category
//!
//! - `unimodal`: single-optimum functions (bowl and plate shaped)
//! - `multimodal`: many local minima

pub mod multimodal;
pub mod unimodal;

pub use multimodal::*;
pub use unimodal::*;
