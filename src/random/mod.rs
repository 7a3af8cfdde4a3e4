//! Independent, reproducible random number streams.
//!
//! Every stochastic decision in the model draws from a named stream declared
//! with [`crate::define_rng!`]. Each stream is seeded from the context's base seed
//! plus a stable hash of the stream's name, so adding draws to one stream
//! never perturbs the values produced by another.

mod context_ext;
mod macros;

use std::any::{Any, TypeId};
use std::cell::RefCell;

pub use context_ext::ContextRandomExt;

use crate::hashing::HashMap;
use rand::SeedableRng;

pub trait RngId: Copy + Clone {
    type RngType: SeedableRng;
    fn get_name() -> &'static str;
}

// This is a wrapper that allows for future support for different types of
// random number generators (anything that implements SeedableRng is valid).
struct RngHolder {
    rng: Box<dyn Any>,
}

/// Stores:
/// * `base_seed`: A base seed for all rngs
/// * `rng_holders`: A map of rngs, keyed by their `RngId`. Note that this is
///   stored in a `RefCell` to allow for mutable borrow without requiring a
///   mutable borrow of the `Context` itself.
pub(crate) struct RngData {
    base_seed: u64,
    rng_holders: RefCell<HashMap<TypeId, RngHolder>>,
}

impl Default for RngData {
    fn default() -> Self {
        RngData {
            base_seed: 0,
            rng_holders: RefCell::new(HashMap::default()),
        }
    }
}
