//! Transmission inside places.
//!
//! While a place has `k > 0` infectious occupants, exposure attempts arrive
//! as a Poisson process with rate `transmissivity * k` per day. Each attempt
//! picks one present occupant uniformly at random and infects them if they
//! are uninfected.
//!
//! Plans cannot be cancelled, so every change of `k` advances the place's
//! exposure epoch and schedules a fresh attempt for the new rate. Attempts
//! carrying an older epoch do nothing. Waiting times are exponential, so
//! starting over after a change gives the same process as continuing.

use log::trace;

use crate::context::{Action, Context};
use crate::infection_manager;
use crate::people::{ContextPeopleExt, InfectionStatus};
use crate::places::{ContextPlacesExt, PlaceId};
use crate::random::ContextRandomExt;

crate::define_rng!(TransmissionRng);

fn schedule_attempt(context: &mut Context, place_id: PlaceId, epoch: u64) {
    let place = context.get_place(place_id);
    let rate = place.transmissivity() * place.infectious_occupant_count() as f64;
    let delay = context.sample_exp(TransmissionRng, rate);
    context.add_plan(
        context.get_current_time() + delay,
        Action::Exposure { place_id, epoch },
    );
}

/// Called whenever the infectious-occupant count of `place_id` changes.
pub(crate) fn restart_exposure(context: &mut Context, place_id: PlaceId) {
    let place = &mut context.places[place_id.0];
    place.exposure_epoch += 1;
    let epoch = place.exposure_epoch;
    if place.infectious_occupant_count() > 0 {
        schedule_attempt(context, place_id, epoch);
    } else {
        trace!("exposure at {place_id} stopped");
    }
}

pub(crate) fn attempt_exposure(context: &mut Context, place_id: PlaceId, epoch: u64) {
    let place = context.get_place(place_id);
    if place.exposure_epoch != epoch {
        trace!("stale exposure attempt at {place_id}");
        return;
    }
    let occupant_count = place.occupant_count();
    let index = context.sample_range(TransmissionRng, 0..occupant_count);
    if let Some(target) = context.get_place(place_id).occupant_at(index) {
        if context.get_infection_status(target) == InfectionStatus::Uninfected {
            trace!(
                "t={}: {target} infected at {place_id}",
                context.get_current_time()
            );
            infection_manager::infect(context, target);
        }
    }
    schedule_attempt(context, place_id, epoch);
}
