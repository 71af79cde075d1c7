//! Umbrella crate for the `rasterlab` workspace.
//!
//! Re-exports the buffer types of `rl-core` and every algorithm crate, so a
//! single dependency covers the whole equalize / filter / threshold /
//! morphology chain.

pub use rl_core::*;
pub use rl_filter::*;
pub use rl_hist::*;
pub use rl_morph::*;
pub use rl_point::*;
