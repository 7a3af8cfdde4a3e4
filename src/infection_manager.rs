//! The disease progression of a single person.
//!
//! `infect` moves an uninfected person to latent and plans the rest of the
//! course: latent people become infectious, infectious people either recover
//! or become bedridden, and bedridden people either recover or die. Every
//! delay is an independent log-normal draw from [`DiseaseParameters`].
//!
//! The functions here run as dispatched [`Action`]s. Each one checks that the
//! person is still in the status the plan was made for and does nothing
//! otherwise.
//!
//! [`DiseaseParameters`]: crate::parameters::DiseaseParameters

use log::trace;

use crate::context::{Action, Context, Event};
use crate::movement;
use crate::parameters::{ContextParametersExt, LogNormalParams};
use crate::people::{self, ContextPeopleExt, InfectionStatus, PersonId};
use crate::places;
use crate::random::ContextRandomExt;

crate::define_rng!(DiseaseRng);

pub trait ContextInfectionExt {
    /// Infects the person now if they are uninfected; otherwise does nothing.
    fn infect(&mut self, person_id: PersonId);
}

impl ContextInfectionExt for Context {
    fn infect(&mut self, person_id: PersonId) {
        infect(self, person_id);
    }
}

fn plan_after(context: &mut Context, delay: &LogNormalParams, action: Action) {
    let time = context.get_current_time() + context.sample_lognormal(DiseaseRng, delay);
    context.add_plan(time, action);
}

/// Applies a status change and notifies subscribers once the change and any
/// place bookkeeping done by `before_event` are complete.
fn transition(
    context: &mut Context,
    person_id: PersonId,
    status: InfectionStatus,
    before_event: impl FnOnce(&mut Context),
) {
    let previous = people::set_infection_status(context, person_id, status);
    trace!(
        "t={}: {person_id} {previous:?} -> {status:?}",
        context.get_current_time()
    );
    before_event(context);
    context.emit_event(Event::InfectionStatusChanged {
        person_id,
        previous,
        current: status,
    });
}

fn is_stale(context: &Context, person_id: PersonId, expected: InfectionStatus) -> bool {
    let status = context.get_infection_status(person_id);
    if status == expected {
        false
    } else {
        trace!("{person_id} is {status:?}, not {expected:?}; ignoring");
        true
    }
}

pub(crate) fn infect(context: &mut Context, person_id: PersonId) {
    if is_stale(context, person_id, InfectionStatus::Uninfected) {
        return;
    }
    transition(context, person_id, InfectionStatus::Latent, |_| {});
    let latent = context.get_parameters().disease.latent;
    plan_after(context, &latent, Action::BecomeInfectious(person_id));
}

pub(crate) fn become_infectious(context: &mut Context, person_id: PersonId) {
    if is_stale(context, person_id, InfectionStatus::Latent) {
        return;
    }
    transition(context, person_id, InfectionStatus::Infectious, |context| {
        if let Some(place_id) = context.get_person(person_id).place() {
            places::one_more_infectious(context, place_id);
        }
    });

    let disease = context.get_parameters().disease.clone();
    if context.sample_bool(DiseaseRng, disease.bedridden_probability) {
        plan_after(
            context,
            &disease.infectious_to_bedridden,
            Action::BecomeBedridden(person_id),
        );
    } else {
        plan_after(
            context,
            &disease.infectious_to_recovered,
            Action::Recover(person_id),
        );
    }
}

pub(crate) fn become_bedridden(context: &mut Context, person_id: PersonId) {
    if is_stale(context, person_id, InfectionStatus::Infectious) {
        return;
    }
    // Both statuses are infectious, so the place's count is unchanged.
    transition(context, person_id, InfectionStatus::Bedridden, |_| {});

    let disease = context.get_parameters().disease.clone();
    if context.sample_bool(DiseaseRng, disease.death_probability) {
        plan_after(context, &disease.bedridden_to_dead, Action::Die(person_id));
    } else {
        plan_after(
            context,
            &disease.bedridden_to_recovered,
            Action::Recover(person_id),
        );
    }

    let person = context.get_person(person_id);
    if person.place().is_some_and(|place_id| place_id != person.home()) {
        movement::go_home(context, person_id);
    }
}

pub(crate) fn recover(context: &mut Context, person_id: PersonId) {
    let status = context.get_infection_status(person_id);
    if !matches!(
        status,
        InfectionStatus::Infectious | InfectionStatus::Bedridden
    ) {
        trace!("{person_id} is {status:?} and cannot recover; ignoring");
        return;
    }
    transition(context, person_id, InfectionStatus::Recovered, |context| {
        if let Some(place_id) = context.get_person(person_id).place() {
            places::one_less_infectious(context, place_id);
        }
    });
}

pub(crate) fn die(context: &mut Context, person_id: PersonId) {
    if is_stale(context, person_id, InfectionStatus::Bedridden) {
        return;
    }
    // Leave while still bedridden so the place stops counting them.
    if let Some(place_id) = context.get_person(person_id).place() {
        places::depart(context, person_id, place_id);
    }
    transition(context, person_id, InfectionStatus::Dead, |_| {});
}
