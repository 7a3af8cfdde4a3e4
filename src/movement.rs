//! Movement between places.
//!
//! A trip has two halves: leaving the current place right away, and an
//! `Arrive` plan after a commute drawn from the `commute` parameters. In
//! between the person is in transit and is not an occupant anywhere.
//! Arrival re-checks the traveller: the dead never arrive, and the bedridden
//! are turned around toward home.

use log::trace;

use crate::context::{Action, Context};
use crate::parameters::ContextParametersExt;
use crate::people::{ContextPeopleExt, InfectionStatus, PersonId};
use crate::places::{self, PlaceId};
use crate::random::ContextRandomExt;
use crate::time::DAY;

crate::define_rng!(MovementRng);

/// Leaves the current place, if any, and plans the arrival at `destination`.
pub(crate) fn travel_to(context: &mut Context, person_id: PersonId, destination: PlaceId) {
    if let Some(place_id) = context.get_person(person_id).place() {
        places::depart(context, person_id, place_id);
    }
    let commute = context.get_parameters().commute;
    let arrival = context.get_current_time() + context.sample_lognormal(MovementRng, &commute);
    trace!("{person_id} travelling to {destination}, arriving at {arrival}");
    context.add_plan(
        arrival,
        Action::Arrive {
            person_id,
            place_id: destination,
        },
    );
}

pub(crate) fn arrive_at(context: &mut Context, person_id: PersonId, place_id: PlaceId) {
    let person = context.get_person(person_id);
    match person.status() {
        InfectionStatus::Dead => {
            trace!("{person_id} died on the way to {place_id}");
        }
        InfectionStatus::Bedridden if place_id != person.home() => {
            trace!("{person_id} is bedridden; turning back from {place_id}");
            go_home(context, person_id);
        }
        _ => places::arrive(context, person_id, place_id),
    }
}

pub(crate) fn go_home(context: &mut Context, person_id: PersonId) {
    let home = context.get_person(person_id).home();
    travel_to(context, person_id, home);
}

/// Sends the person home from `place_id`, unless they have already left it.
pub(crate) fn send_home_from(context: &mut Context, person_id: PersonId, place_id: PlaceId) {
    if context.get_person(person_id).place() != Some(place_id) {
        trace!("{person_id} already left {place_id}");
        return;
    }
    go_home(context, person_id);
}

/// The morning commute. Always plans tomorrow's commute; only travels if the
/// employee has a job, is well enough, and is not already on the move.
pub(crate) fn go_to_work(context: &mut Context, person_id: PersonId) {
    context.add_plan(context.get_current_time() + DAY, Action::GoToWork(person_id));

    let person = context.get_person(person_id);
    let Some(job) = person.job() else {
        return;
    };
    if matches!(
        person.status(),
        InfectionStatus::Bedridden | InfectionStatus::Dead
    ) {
        trace!("{person_id} is {:?}; staying put", person.status());
        return;
    }
    match person.place() {
        None => trace!("{person_id} is still travelling"),
        Some(place_id) if place_id == job => {}
        Some(_) => travel_to(context, person_id, job),
    }
}
