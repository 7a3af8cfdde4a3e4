//! The daily duty cycle of a workplace: it opens at 8 AM, closes eight
//! hours later, and opens again sixteen hours after that, every day with no
//! notion of weekends. Closing sends every occupant home.

use log::trace;

use crate::context::{Action, Context};
use crate::places::{ContextPlacesExt, PlaceId};
use crate::time::{next_time_of_day, HOUR};

pub const OPENING_TIME: f64 = 8.0 * HOUR;
pub const OPEN_DURATION: f64 = 8.0 * HOUR;
pub const CLOSED_DURATION: f64 = 16.0 * HOUR;

pub(crate) fn start_cycle(context: &mut Context, place_id: PlaceId) {
    let first_opening = next_time_of_day(context.get_current_time(), OPENING_TIME);
    context.add_plan(first_opening, Action::OpenWorkplace(place_id));
}

pub(crate) fn open(context: &mut Context, place_id: PlaceId) {
    trace!("{} opens", context.get_place(place_id).name());
    context.places[place_id.0].is_open = true;
    let closing = context.get_current_time() + OPEN_DURATION;
    context.add_plan(closing, Action::CloseWorkplace(place_id));
}

/// Closes the workplace and sends everyone present home.
///
/// Each occupant gets a `SendHome` plan for the current time rather than
/// being moved here, so the occupant set is not changed while it is being
/// read. A person who has already left by the time their plan runs is
/// left alone.
pub(crate) fn close(context: &mut Context, place_id: PlaceId) {
    trace!("{} closes", context.get_place(place_id).name());
    context.places[place_id.0].is_open = false;
    let now = context.get_current_time();
    context.add_plan(now + CLOSED_DURATION, Action::OpenWorkplace(place_id));

    let occupants: Vec<_> = context.get_place(place_id).occupants().collect();
    for person_id in occupants {
        context.add_plan(
            now,
            Action::SendHome {
                person_id,
                place_id,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Event;
    use crate::plan::ExecutionPhase;
    use crate::people::ContextPeopleExt;
    use crate::places;
    use assert_approx_eq::assert_approx_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn is_open_at(time: f64) -> bool {
        let mut context = Context::new();
        let work = context.add_workplace_with_transmissivity(1.0);
        context.add_plan_with_phase(time, Action::Shutdown, ExecutionPhase::Last);
        context.execute();
        context.get_place(work).is_open()
    }

    #[test]
    fn cycle_is_twenty_four_hours() {
        let observed: Vec<bool> = [7.0, 9.0, 15.0, 17.0, 31.0, 33.0, 41.0]
            .into_iter()
            .map(|hour| is_open_at(hour * HOUR))
            .collect();
        assert_eq!(
            observed,
            vec![false, true, true, false, false, true, false]
        );
    }

    #[test]
    fn workplace_added_mid_morning_opens_next_day() {
        let mut context = Context::new();
        context.add_plan(10.0 * HOUR, Action::Shutdown);
        context.execute();
        // The clock stopped at 10 AM; a workplace added now opens tomorrow.
        let work = context.add_workplace_with_transmissivity(1.0);
        context.add_plan_with_phase(1.0 + 7.0 * HOUR, Action::Shutdown, ExecutionPhase::Last);
        context.execute();
        assert!(!context.get_place(work).is_open());
    }

    #[test]
    fn closing_sends_occupants_home() {
        let mut context = Context::new();
        let home = context.add_home_with_transmissivity(1.0);
        let work = context.add_workplace_with_transmissivity(1.0);
        let person = context.add_person(home);
        places::depart(&mut context, person, home);
        places::arrive(&mut context, person, work);

        let arrivals = Rc::new(RefCell::new(Vec::new()));
        let arrivals_clone = arrivals.clone();
        context.subscribe_to_event(move |context, event| {
            if let Event::Arrived { place_id, .. } = event {
                arrivals_clone
                    .borrow_mut()
                    .push((context.get_current_time(), *place_id));
            }
        });
        context.add_plan_with_phase(1.0, Action::Shutdown, ExecutionPhase::Last);
        context.execute();

        let arrivals = arrivals.borrow();
        assert_eq!(arrivals.len(), 1);
        let (time, place_id) = arrivals[0];
        assert_eq!(place_id, home);
        assert!(time > OPENING_TIME + OPEN_DURATION);
        assert_approx_eq!(time, 16.0 * HOUR + 20.0 / 1440.0, 0.02);
        assert!(!context.get_place(work).contains(person));
    }
}
