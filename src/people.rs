//! People are the agents of the model. Every person has a fixed home, an
//! infection status, and is either present at exactly one place or in
//! transit between places. Employees additionally hold a workplace, which is
//! assigned once after construction, and commute to it every morning.

use std::fmt;

use log::trace;
use serde::Serialize;

use crate::context::{Action, Context};
use crate::places::{self, ContextPlacesExt, PlaceId, PlaceKind};
use crate::time::{next_time_of_day, HOUR, MINUTE};

/// Employees leave for work at this time of day.
pub const COMMUTE_DEPARTURE: f64 = 8.0 * HOUR - 25.0 * MINUTE;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(pub(crate) usize);

impl PersonId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "person {}", self.0)
    }
}

/// The stages of infection, in the order a person moves through them.
///
/// The order of the variants is significant: every status at or after
/// `Latent` means the person has been infected at some point.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum InfectionStatus {
    Uninfected,
    Latent,
    Infectious,
    Bedridden,
    Recovered,
    Dead,
}

impl InfectionStatus {
    pub const ALL: [InfectionStatus; 6] = [
        InfectionStatus::Uninfected,
        InfectionStatus::Latent,
        InfectionStatus::Infectious,
        InfectionStatus::Bedridden,
        InfectionStatus::Recovered,
        InfectionStatus::Dead,
    ];

    /// True if a person with this status can transmit infection.
    #[must_use]
    pub fn is_infectious(self) -> bool {
        matches!(self, InfectionStatus::Infectious | InfectionStatus::Bedridden)
    }

    #[must_use]
    pub fn ever_infected(self) -> bool {
        self >= InfectionStatus::Latent
    }

    /// The only transitions a person can make.
    #[must_use]
    pub fn can_become(self, next: InfectionStatus) -> bool {
        use InfectionStatus::{Bedridden, Dead, Infectious, Latent, Recovered, Uninfected};
        matches!(
            (self, next),
            (Uninfected, Latent)
                | (Latent, Infectious)
                | (Infectious, Bedridden | Recovered)
                | (Bedridden, Recovered | Dead)
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PersonKind {
    Resident,
    /// `job` is `None` until the population builder assigns a workplace.
    Employee { job: Option<PlaceId> },
}

#[derive(Debug)]
pub struct Person {
    name: String,
    home: PlaceId,
    pub(crate) place: Option<PlaceId>,
    pub(crate) status: InfectionStatus,
    pub(crate) kind: PersonKind,
}

impl Person {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn home(&self) -> PlaceId {
        self.home
    }

    /// Where the person currently is, or `None` while in transit.
    #[must_use]
    pub fn place(&self) -> Option<PlaceId> {
        self.place
    }

    #[must_use]
    pub fn status(&self) -> InfectionStatus {
        self.status
    }

    #[must_use]
    pub fn kind(&self) -> PersonKind {
        self.kind
    }

    #[must_use]
    pub fn job(&self) -> Option<PlaceId> {
        match self.kind {
            PersonKind::Employee { job } => job,
            PersonKind::Resident => None,
        }
    }

    #[must_use]
    pub fn is_infectious(&self) -> bool {
        self.status.is_infectious()
    }
}

/// Population-wide tallies of people by infection status. The six counters
/// always sum to the number of people ever added, dead included.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PopulationCounts {
    pub uninfected: usize,
    pub latent: usize,
    pub infectious: usize,
    pub bedridden: usize,
    pub recovered: usize,
    pub dead: usize,
}

impl PopulationCounts {
    #[must_use]
    pub fn get(&self, status: InfectionStatus) -> usize {
        match status {
            InfectionStatus::Uninfected => self.uninfected,
            InfectionStatus::Latent => self.latent,
            InfectionStatus::Infectious => self.infectious,
            InfectionStatus::Bedridden => self.bedridden,
            InfectionStatus::Recovered => self.recovered,
            InfectionStatus::Dead => self.dead,
        }
    }

    fn get_mut(&mut self, status: InfectionStatus) -> &mut usize {
        match status {
            InfectionStatus::Uninfected => &mut self.uninfected,
            InfectionStatus::Latent => &mut self.latent,
            InfectionStatus::Infectious => &mut self.infectious,
            InfectionStatus::Bedridden => &mut self.bedridden,
            InfectionStatus::Recovered => &mut self.recovered,
            InfectionStatus::Dead => &mut self.dead,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        InfectionStatus::ALL.iter().map(|s| self.get(*s)).sum()
    }

    fn transition(&mut self, from: InfectionStatus, to: InfectionStatus) {
        *self.get_mut(from) -= 1;
        *self.get_mut(to) += 1;
    }
}

pub trait ContextPeopleExt {
    /// Adds a person who lives at `home` and starts the simulation there.
    ///
    /// # Panics
    ///
    /// Panics if `home` is not a home.
    fn add_person(&mut self, home: PlaceId) -> PersonId;

    /// Adds an employee who lives at `home`. The employee's daily commute is
    /// scheduled immediately; it does nothing until a workplace is assigned
    /// with [`ContextPeopleExt::set_workplace`].
    ///
    /// # Panics
    ///
    /// Panics if `home` is not a home.
    fn add_employee(&mut self, home: PlaceId) -> PersonId;

    /// Assigns the employee's workplace and adds them to its roster.
    ///
    /// # Panics
    ///
    /// Panics if the person is not an employee, already has a workplace, or
    /// `workplace` is not a workplace.
    fn set_workplace(&mut self, person_id: PersonId, workplace: PlaceId);

    fn get_person(&self, person_id: PersonId) -> &Person;

    fn get_person_count(&self) -> usize;

    fn get_infection_status(&self, person_id: PersonId) -> InfectionStatus;

    fn get_population_counts(&self) -> PopulationCounts;

    fn get_person_ids(&self) -> impl Iterator<Item = PersonId>;
}

fn add_person_internal(context: &mut Context, home: PlaceId, kind: PersonKind) -> PersonId {
    assert_eq!(
        context.get_place(home).kind(),
        PlaceKind::Home,
        "{} is not a home",
        context.get_place(home).name()
    );
    let person_id = PersonId(context.people.len());
    context.people.push(Person {
        name: person_id.to_string(),
        home,
        place: Some(home),
        status: InfectionStatus::Uninfected,
        kind,
    });
    context.population_counts.uninfected += 1;
    places::add_resident(context, home, person_id);
    trace!("added {person_id} living at {home}");
    person_id
}

impl ContextPeopleExt for Context {
    fn add_person(&mut self, home: PlaceId) -> PersonId {
        add_person_internal(self, home, PersonKind::Resident)
    }

    fn add_employee(&mut self, home: PlaceId) -> PersonId {
        let person_id = add_person_internal(self, home, PersonKind::Employee { job: None });
        let first_departure = next_time_of_day(self.get_current_time(), COMMUTE_DEPARTURE);
        self.add_plan(first_departure, Action::GoToWork(person_id));
        person_id
    }

    fn set_workplace(&mut self, person_id: PersonId, workplace: PlaceId) {
        assert_eq!(
            self.get_place(workplace).kind(),
            PlaceKind::Workplace,
            "{} is not a workplace",
            self.get_place(workplace).name()
        );
        let person = &mut self.people[person_id.0];
        match &mut person.kind {
            PersonKind::Employee { job: job @ None } => *job = Some(workplace),
            PersonKind::Employee { job: Some(existing) } => {
                panic!("{person_id} already works at {existing}")
            }
            PersonKind::Resident => panic!("{person_id} is not an employee"),
        }
        places::add_employee(self, workplace, person_id);
    }

    fn get_person(&self, person_id: PersonId) -> &Person {
        &self.people[person_id.0]
    }

    fn get_person_count(&self) -> usize {
        self.people.len()
    }

    fn get_infection_status(&self, person_id: PersonId) -> InfectionStatus {
        self.people[person_id.0].status
    }

    fn get_population_counts(&self) -> PopulationCounts {
        self.population_counts
    }

    fn get_person_ids(&self) -> impl Iterator<Item = PersonId> {
        (0..self.people.len()).map(PersonId)
    }
}

/// Moves a person to `status`, keeping the population counts in step.
/// Returns the previous status.
///
/// # Panics
///
/// Panics if the transition is not one the disease model allows.
pub(crate) fn set_infection_status(
    context: &mut Context,
    person_id: PersonId,
    status: InfectionStatus,
) -> InfectionStatus {
    let person = &mut context.people[person_id.0];
    let previous = person.status;
    assert!(
        previous.can_become(status),
        "{person_id} cannot go from {previous:?} to {status:?}"
    );
    person.status = status;
    context.population_counts.transition(previous, status);
    previous
}
