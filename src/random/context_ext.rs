use std::any::TypeId;
use std::cell::RefMut;

use log::trace;
use rand::distr::uniform::{SampleRange, SampleUniform};
use rand::distr::Distribution;
use rand::{Rng, SeedableRng};
use rand_distr::Exp;

use crate::context::Context;
use crate::hashing::hash_str;
use crate::parameters::LogNormalParams;
use crate::random::{RngHolder, RngId};

/// Gets a mutable reference to the random number generator associated with the given
/// [`RngId`]. If the Rng has not been used before, one will be created with the base seed
/// defined by `init_random` (zero for a fresh `Context`).
fn get_rng<R: RngId + 'static>(context: &Context) -> RefMut<R::RngType> {
    let data_container = &context.rng_data;

    let rng_holders = data_container.rng_holders.borrow_mut();
    RefMut::map(rng_holders, |holders| {
        holders
            .entry(TypeId::of::<R>())
            // Create a new rng holder if it doesn't exist yet
            .or_insert_with(|| {
                trace!(
                    "creating new RNG (seed={}) for {}",
                    data_container.base_seed,
                    R::get_name()
                );
                let base_seed = data_container.base_seed;
                let seed_offset = hash_str(R::get_name());
                RngHolder {
                    rng: Box::new(R::RngType::seed_from_u64(
                        base_seed.wrapping_add(seed_offset),
                    )),
                }
            })
            .rng
            .downcast_mut::<R::RngType>()
            .expect("rng holder registered under a mismatched type")
    })
}

// This is a trait extension on Context for
// random number generation functionality.
pub trait ContextRandomExt {
    /// Sets the base seed and discards every existing stream, so each stream
    /// is re-seeded lazily the next time it is used.
    fn init_random(&mut self, base_seed: u64);

    /// Gets a random sample from the random number generator associated with the given
    /// [`RngId`] by applying the specified sampler function.
    fn sample<R: RngId + 'static, T>(
        &self,
        rng_id: R,
        sampler: impl FnOnce(&mut R::RngType) -> T,
    ) -> T;

    /// Gets a random sample from the specified distribution.
    fn sample_distr<R: RngId + 'static, T>(&self, rng_id: R, distribution: impl Distribution<T>) -> T
    where
        R::RngType: Rng;

    /// Gets a random sample within the range provided by `range`.
    fn sample_range<R: RngId + 'static, S, T>(&self, rng_id: R, range: S) -> T
    where
        R::RngType: Rng,
        S: SampleRange<T>,
        T: SampleUniform;

    /// Gets a random boolean value which is true with probability `p`.
    fn sample_bool<R: RngId + 'static>(&self, rng_id: R, p: f64) -> bool
    where
        R::RngType: Rng;

    /// Gets a log-normal draw described by a median and a scatter.
    ///
    /// # Panics
    ///
    /// Panics if `params` does not describe a valid distribution. Parameters
    /// that come from a configuration file are validated when they are loaded.
    fn sample_lognormal<R: RngId + 'static>(&self, rng_id: R, params: &LogNormalParams) -> f64
    where
        R::RngType: Rng;

    /// Gets an exponentially distributed waiting time for an event that
    /// happens at `rate` per unit time.
    ///
    /// # Panics
    ///
    /// Panics if `rate` is not strictly positive and finite.
    fn sample_exp<R: RngId + 'static>(&self, rng_id: R, rate: f64) -> f64
    where
        R::RngType: Rng;
}

impl ContextRandomExt for Context {
    fn init_random(&mut self, base_seed: u64) {
        trace!("initializing random module");
        self.rng_data.base_seed = base_seed;

        // Clear any existing Rngs to ensure they get re-seeded when `get_rng` is called
        self.rng_data.rng_holders.borrow_mut().clear();
    }

    fn sample<R: RngId + 'static, T>(
        &self,
        _rng_id: R,
        sampler: impl FnOnce(&mut R::RngType) -> T,
    ) -> T {
        let mut rng = get_rng::<R>(self);
        sampler(&mut rng)
    }

    fn sample_distr<R: RngId + 'static, T>(&self, _rng_id: R, distribution: impl Distribution<T>) -> T
    where
        R::RngType: Rng,
    {
        let mut rng = get_rng::<R>(self);
        distribution.sample::<R::RngType>(&mut rng)
    }

    fn sample_range<R: RngId + 'static, S, T>(&self, rng_id: R, range: S) -> T
    where
        R::RngType: Rng,
        S: SampleRange<T>,
        T: SampleUniform,
    {
        self.sample(rng_id, |rng| rng.random_range(range))
    }

    fn sample_bool<R: RngId + 'static>(&self, rng_id: R, p: f64) -> bool
    where
        R::RngType: Rng,
    {
        self.sample(rng_id, |rng| rng.random_bool(p))
    }

    fn sample_lognormal<R: RngId + 'static>(&self, rng_id: R, params: &LogNormalParams) -> f64
    where
        R::RngType: Rng,
    {
        let distribution = params
            .distribution()
            .unwrap_or_else(|e| panic!("cannot sample {params:?}: {e}"));
        self.sample_distr(rng_id, distribution)
    }

    fn sample_exp<R: RngId + 'static>(&self, rng_id: R, rate: f64) -> f64
    where
        R::RngType: Rng,
    {
        assert!(
            rate > 0.0 && rate.is_finite(),
            "exponential rate must be positive and finite, got {rate}"
        );
        let distribution = Exp::new(rate).expect("rate checked above");
        self.sample_distr(rng_id, distribution)
    }
}
