//! Builds a synthetic town from [`PopulationParameters`] and plans the start
//! of a run: the first infections, the first report, and the shutdown.
//!
//! [`PopulationParameters`]: crate::parameters::PopulationParameters

use log::{debug, info};
use rand::seq::{index, SliceRandom};

use crate::context::{Action, Context};
use crate::parameters::{ContextParametersExt, LogNormalParams};
use crate::people::{ContextPeopleExt, PersonId};
use crate::places::ContextPlacesExt;
use crate::plan::ExecutionPhase;
use crate::random::ContextRandomExt;
use crate::report::ContextReportExt;

crate::define_rng!(PopulationRng);

// Group sizes are rounded draws, never below one.
fn draw_size(context: &Context, params: &LogNormalParams) -> usize {
    context
        .sample_lognormal(PopulationRng, params)
        .round()
        .max(1.0) as usize
}

/// Creates households until the population is complete. Returns every
/// person in creation order, and the employees among them.
fn add_households(context: &mut Context) -> (Vec<PersonId>, Vec<PersonId>) {
    let population = context.get_parameters().population.clone();
    let mut everyone = Vec::with_capacity(population.size);
    let mut employees = Vec::new();

    while everyone.len() < population.size {
        let home = context.add_home();
        let household_size =
            draw_size(context, &population.household_size).min(population.size - everyone.len());
        for _ in 0..household_size {
            let person_id = if context.sample_bool(PopulationRng, population.employed_fraction) {
                let employee = context.add_employee(home);
                employees.push(employee);
                employee
            } else {
                context.add_person(home)
            };
            everyone.push(person_id);
        }
    }
    (everyone, employees)
}

/// Shuffles the employees so coworkers are rarely housemates, then fills
/// workplaces one after another.
fn add_workplaces(context: &mut Context, mut employees: Vec<PersonId>) -> usize {
    let workplace_size = context.get_parameters().population.workplace_size;
    context.sample(PopulationRng, |rng| employees.shuffle(rng));

    let mut workplaces = 0;
    let mut remaining = employees.as_slice();
    while !remaining.is_empty() {
        let workplace = context.add_workplace();
        workplaces += 1;
        let size = draw_size(context, &workplace_size).min(remaining.len());
        let (staff, rest) = remaining.split_at(size);
        for employee in staff {
            context.set_workplace(*employee, workplace);
        }
        remaining = rest;
    }
    workplaces
}

/// Builds the population and plans the run.
///
/// Expects validated parameters and a clock at the start of the run.
pub fn init(context: &mut Context) {
    let parameters = context.get_parameters().clone();
    let population = &parameters.population;
    info!(
        "building a population of {} with seed {}",
        population.size, parameters.seed
    );

    let (everyone, employees) = add_households(context);
    let employee_count = employees.len();
    let homes = context.get_place_count();
    let workplaces = add_workplaces(context, employees);
    debug!(
        "created {homes} homes, {workplaces} workplaces and {employee_count} employees"
    );

    let now = context.get_current_time();
    let seeded = context.sample(PopulationRng, |rng| {
        index::sample(rng, everyone.len(), population.initially_infected)
    });
    for i in seeded {
        context.add_plan(now, Action::Infect(everyone[i]));
    }

    context.schedule_reports(now);
    context.add_plan_with_phase(parameters.max_time, Action::Shutdown, ExecutionPhase::Last);
}
