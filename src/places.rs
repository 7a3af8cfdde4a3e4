//! Places are where people spend their time and where transmission happens.
//!
//! A place tracks who is currently present and how many of those present
//! are infectious. Occupancy changes (`arrive`/`depart`) and infection
//! status changes (`one_more_infectious`/`one_less_infectious`) are the only
//! things that mutate a place; every change of the infectious count restarts
//! the place's exposure process in [`crate::transmission_manager`].
//!
//! Homes hold a fixed roster of residents. Workplaces hold a fixed roster of
//! employees and run a daily open/close cycle (see [`workplace`]).

pub mod workplace;

use std::fmt;

use indexmap::IndexSet;
use log::trace;

use crate::context::{Context, Event};
use crate::hashing::FxBuildHasher;
use crate::parameters::ContextParametersExt;
use crate::people::PersonId;
use crate::random::ContextRandomExt;
use crate::transmission_manager;

crate::define_rng!(PlaceRng);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceId(pub(crate) usize);

impl PlaceId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "place {}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaceKind {
    Home,
    Workplace,
}

#[derive(Debug)]
pub struct Place {
    name: String,
    kind: PlaceKind,
    transmissivity: f64,
    /// Residents of a home or employees of a workplace. Never shrinks: the
    /// dead stay listed.
    roster: Vec<PersonId>,
    occupants: IndexSet<PersonId, FxBuildHasher>,
    infectious_occupants: usize,
    pub(crate) exposure_epoch: u64,
    pub(crate) is_open: bool,
}

impl Place {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> PlaceKind {
        self.kind
    }

    /// Exposure attempts per day per infectious occupant.
    #[must_use]
    pub fn transmissivity(&self) -> f64 {
        self.transmissivity
    }

    #[must_use]
    pub fn roster(&self) -> &[PersonId] {
        &self.roster
    }

    pub fn occupants(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.occupants.iter().copied()
    }

    #[must_use]
    pub fn occupant_count(&self) -> usize {
        self.occupants.len()
    }

    #[must_use]
    pub fn contains(&self, person_id: PersonId) -> bool {
        self.occupants.contains(&person_id)
    }

    #[must_use]
    pub fn infectious_occupant_count(&self) -> usize {
        self.infectious_occupants
    }

    /// Homes are always open; workplaces follow their daily cycle.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub(crate) fn occupant_at(&self, index: usize) -> Option<PersonId> {
        self.occupants.get_index(index).copied()
    }
}

pub trait ContextPlacesExt {
    /// Adds a home whose transmissivity is drawn from the `home` parameters.
    fn add_home(&mut self) -> PlaceId;

    /// # Panics
    ///
    /// Panics if `transmissivity` is not positive and finite.
    fn add_home_with_transmissivity(&mut self, transmissivity: f64) -> PlaceId;

    /// Adds a workplace whose transmissivity is drawn from the `workplace`
    /// parameters and starts its open/close cycle.
    fn add_workplace(&mut self) -> PlaceId;

    /// # Panics
    ///
    /// Panics if `transmissivity` is not positive and finite.
    fn add_workplace_with_transmissivity(&mut self, transmissivity: f64) -> PlaceId;

    fn get_place(&self, place_id: PlaceId) -> &Place;

    fn get_place_count(&self) -> usize;

    fn get_place_ids(&self) -> impl Iterator<Item = PlaceId>;
}

fn add_place(context: &mut Context, kind: PlaceKind, transmissivity: f64) -> PlaceId {
    assert!(
        transmissivity.is_finite() && transmissivity > 0.0,
        "transmissivity must be positive and finite, got {transmissivity}"
    );
    let place_id = PlaceId(context.places.len());
    let name = match kind {
        PlaceKind::Home => format!("home {}", place_id.0),
        PlaceKind::Workplace => format!("workplace {}", place_id.0),
    };
    trace!("added {name} with transmissivity {transmissivity}");
    context.places.push(Place {
        name,
        kind,
        transmissivity,
        roster: Vec::new(),
        occupants: IndexSet::default(),
        infectious_occupants: 0,
        exposure_epoch: 0,
        is_open: kind == PlaceKind::Home,
    });
    place_id
}

impl ContextPlacesExt for Context {
    fn add_home(&mut self) -> PlaceId {
        let params = self.get_parameters().home.transmissivity;
        let transmissivity = self.sample_lognormal(PlaceRng, &params);
        self.add_home_with_transmissivity(transmissivity)
    }

    fn add_home_with_transmissivity(&mut self, transmissivity: f64) -> PlaceId {
        add_place(self, PlaceKind::Home, transmissivity)
    }

    fn add_workplace(&mut self) -> PlaceId {
        let params = self.get_parameters().workplace.transmissivity;
        let transmissivity = self.sample_lognormal(PlaceRng, &params);
        self.add_workplace_with_transmissivity(transmissivity)
    }

    fn add_workplace_with_transmissivity(&mut self, transmissivity: f64) -> PlaceId {
        let place_id = add_place(self, PlaceKind::Workplace, transmissivity);
        workplace::start_cycle(self, place_id);
        place_id
    }

    fn get_place(&self, place_id: PlaceId) -> &Place {
        &self.places[place_id.0]
    }

    fn get_place_count(&self) -> usize {
        self.places.len()
    }

    fn get_place_ids(&self) -> impl Iterator<Item = PlaceId> {
        (0..self.places.len()).map(PlaceId)
    }
}

/// Registers a new resident, who starts out present at home.
pub(crate) fn add_resident(context: &mut Context, home: PlaceId, person_id: PersonId) {
    let place = &mut context.places[home.0];
    place.roster.push(person_id);
    let inserted = place.occupants.insert(person_id);
    debug_assert!(inserted, "{person_id} already present at {home}");
}

pub(crate) fn add_employee(context: &mut Context, workplace: PlaceId, person_id: PersonId) {
    context.places[workplace.0].roster.push(person_id);
}

/// Makes `person_id` an occupant of `place_id`.
///
/// # Panics
///
/// Panics if the person is already at a place.
pub(crate) fn arrive(context: &mut Context, person_id: PersonId, place_id: PlaceId) {
    let person = &mut context.people[person_id.0];
    assert!(
        person.place.is_none(),
        "{person_id} arrived at {place_id} without leaving {:?}",
        person.place
    );
    person.place = Some(place_id);
    let infectious = person.is_infectious();

    let inserted = context.places[place_id.0].occupants.insert(person_id);
    assert!(inserted, "{person_id} is already present at {place_id}");
    trace!("{person_id} arrived at {place_id}");
    if infectious {
        one_more_infectious(context, place_id);
    }
    context.emit_event(Event::Arrived {
        person_id,
        place_id,
    });
}

/// Removes `person_id` from the occupants of `place_id`; they are in transit
/// afterwards.
///
/// # Panics
///
/// Panics if the person is not present at `place_id`.
pub(crate) fn depart(context: &mut Context, person_id: PersonId, place_id: PlaceId) {
    let person = &mut context.people[person_id.0];
    assert_eq!(
        person.place,
        Some(place_id),
        "{person_id} cannot leave a place they are not at"
    );
    person.place = None;
    let infectious = person.is_infectious();

    let removed = context.places[place_id.0].occupants.swap_remove(&person_id);
    assert!(removed, "{person_id} was not an occupant of {place_id}");
    trace!("{person_id} left {place_id}");
    if infectious {
        one_less_infectious(context, place_id);
    }
    context.emit_event(Event::Departed {
        person_id,
        place_id,
    });
}

/// Called when an occupant becomes infectious or an infectious person arrives.
pub(crate) fn one_more_infectious(context: &mut Context, place_id: PlaceId) {
    context.places[place_id.0].infectious_occupants += 1;
    transmission_manager::restart_exposure(context, place_id);
}

/// Called when an infectious occupant recovers or an infectious person leaves.
///
/// # Panics
///
/// Panics if the place has no infectious occupants.
pub(crate) fn one_less_infectious(context: &mut Context, place_id: PlaceId) {
    let place = &mut context.places[place_id.0];
    assert!(
        place.infectious_occupants > 0,
        "{} has no infectious occupants to remove",
        place.name
    );
    place.infectious_occupants -= 1;
    transmission_manager::restart_exposure(context, place_id);
}
