//! The central simulation object.
//!
//! A `Context` owns the logical clock, the queue of future plans, and every
//! entity in the model. Simulated activity is a sequence of [`Action`]s:
//! each is scheduled for a time with [`Context::add_plan`] and, when its
//! time comes, dispatched to the module that implements it. Actions may
//! schedule further actions. [`Context::execute`] runs until no plans remain
//! or an action requests a shutdown.
//!
//! Plans cannot be cancelled. An action that may have become irrelevant by
//! the time it runs (the person died, left, or already changed state) checks
//! the current state and does nothing.

use log::{debug, trace};

use crate::infection_manager;
use crate::movement;
use crate::parameters::Parameters;
use crate::people::{InfectionStatus, Person, PersonId, PopulationCounts};
use crate::places::{workplace, Place, PlaceId};
use crate::plan::{ExecutionPhase, Queue};
use crate::random::RngData;
use crate::report::{self, ReportData};
use crate::transmission_manager;

/// Everything that can be scheduled.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Action {
    /// Infect the person if they are still uninfected.
    Infect(PersonId),
    BecomeInfectious(PersonId),
    BecomeBedridden(PersonId),
    Recover(PersonId),
    Die(PersonId),
    /// Complete a trip that ends at `place_id`.
    Arrive {
        person_id: PersonId,
        place_id: PlaceId,
    },
    /// Send the person home if they are still at `place_id`.
    SendHome {
        person_id: PersonId,
        place_id: PlaceId,
    },
    GoToWork(PersonId),
    OpenWorkplace(PlaceId),
    CloseWorkplace(PlaceId),
    /// An exposure attempt, valid only while the place's exposure epoch
    /// still equals `epoch`.
    Exposure {
        place_id: PlaceId,
        epoch: u64,
    },
    Report,
    Shutdown,
}

/// Changes that subscribers are notified of, after the change and all of
/// its bookkeeping are complete.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Event {
    InfectionStatusChanged {
        person_id: PersonId,
        previous: InfectionStatus,
        current: InfectionStatus,
    },
    Arrived {
        person_id: PersonId,
        place_id: PlaceId,
    },
    Departed {
        person_id: PersonId,
        place_id: PlaceId,
    },
}

type EventHandler = dyn FnMut(&Context, &Event);

pub struct Context {
    plan_queue: Queue<Action>,
    current_time: f64,
    shutdown_requested: bool,
    event_handlers: Vec<Box<EventHandler>>,
    pub(crate) rng_data: RngData,
    pub(crate) parameters: Parameters,
    pub(crate) people: Vec<Person>,
    pub(crate) places: Vec<Place>,
    pub(crate) population_counts: PopulationCounts,
    pub(crate) report_data: ReportData,
}

impl Context {
    #[must_use]
    pub fn new() -> Context {
        Context {
            plan_queue: Queue::new(),
            current_time: 0.0,
            shutdown_requested: false,
            event_handlers: Vec::new(),
            rng_data: RngData::default(),
            parameters: Parameters::default(),
            people: Vec::new(),
            places: Vec::new(),
            population_counts: PopulationCounts::default(),
            report_data: ReportData::default(),
        }
    }

    /// Schedules `action` to run at `time`.
    ///
    /// # Panics
    ///
    /// Panics if `time` is NaN, infinite, or earlier than the current time.
    pub fn add_plan(&mut self, time: f64, action: Action) {
        self.add_plan_with_phase(time, action, ExecutionPhase::Normal);
    }

    /// Schedules `action` to run at `time` within the given phase.
    ///
    /// # Panics
    ///
    /// Panics if `time` is NaN, infinite, or earlier than the current time.
    pub fn add_plan_with_phase(&mut self, time: f64, action: Action, phase: ExecutionPhase) {
        assert!(
            time.is_finite() && time >= self.current_time,
            "Invalid time value {time} for {action:?} (current time {})",
            self.current_time
        );
        self.plan_queue.add_plan(time, action, phase);
    }

    #[must_use]
    pub fn get_current_time(&self) -> f64 {
        self.current_time
    }

    #[must_use]
    pub fn remaining_plan_count(&self) -> usize {
        self.plan_queue.len()
    }

    /// Requests that the simulation stop once the current action returns.
    /// Remaining plans are discarded.
    pub fn shutdown(&mut self) {
        debug!("shutdown requested at {}", self.current_time);
        self.shutdown_requested = true;
    }

    /// Registers a handler that is called for every [`Event`].
    pub fn subscribe_to_event(&mut self, handler: impl FnMut(&Context, &Event) + 'static) {
        self.event_handlers.push(Box::new(handler));
    }

    pub(crate) fn emit_event(&mut self, event: Event) {
        if self.event_handlers.is_empty() {
            return;
        }
        // Handlers only get a shared borrow, so none can be added while
        // these are detached.
        let mut handlers = std::mem::take(&mut self.event_handlers);
        for handler in &mut handlers {
            handler(self, &event);
        }
        self.event_handlers = handlers;
    }

    /// Runs plans in time order until none remain or a shutdown is requested.
    pub fn execute(&mut self) {
        debug!(
            "executing from t={} with {} plans",
            self.current_time,
            self.plan_queue.len()
        );
        self.shutdown_requested = false;
        while let Some(plan) = self.plan_queue.get_next_plan() {
            self.current_time = plan.time;
            self.dispatch(plan.data);
            if self.shutdown_requested {
                self.plan_queue.clear();
                break;
            }
        }
        debug!("execution finished at t={}", self.current_time);
    }

    fn dispatch(&mut self, action: Action) {
        trace!("t={}: {action:?}", self.current_time);
        match action {
            Action::Infect(person_id) => infection_manager::infect(self, person_id),
            Action::BecomeInfectious(person_id) => {
                infection_manager::become_infectious(self, person_id);
            }
            Action::BecomeBedridden(person_id) => {
                infection_manager::become_bedridden(self, person_id);
            }
            Action::Recover(person_id) => infection_manager::recover(self, person_id),
            Action::Die(person_id) => infection_manager::die(self, person_id),
            Action::Arrive {
                person_id,
                place_id,
            } => movement::arrive_at(self, person_id, place_id),
            Action::SendHome {
                person_id,
                place_id,
            } => movement::send_home_from(self, person_id, place_id),
            Action::GoToWork(person_id) => movement::go_to_work(self, person_id),
            Action::OpenWorkplace(place_id) => workplace::open(self, place_id),
            Action::CloseWorkplace(place_id) => workplace::close(self, place_id),
            Action::Exposure { place_id, epoch } => {
                transmission_manager::attempt_exposure(self, place_id, epoch);
            }
            Action::Report => report::report(self),
            Action::Shutdown => self.shutdown(),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
