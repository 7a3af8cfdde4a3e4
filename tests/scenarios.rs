use std::cell::RefCell;
use std::rc::Rc;

use assert_approx_eq::assert_approx_eq;
use episim::plan::ExecutionPhase;
use episim::time::{HOUR, MINUTE};
use episim::{
    population_loader, Action, Context, ContextInfectionExt, ContextParametersExt,
    ContextPeopleExt, ContextPlacesExt, ContextRandomExt, Event, InfectionStatus,
    LogNormalParams, Parameters, PersonId, PlaceId, PopulationCounts,
};

/// Checks on every event that each place counts exactly its infectious
/// occupants.
fn check_place_counts(context: &mut Context) {
    context.subscribe_to_event(|context, _| {
        for place_id in context.get_place_ids() {
            let place = context.get_place(place_id);
            let infectious = place
                .occupants()
                .filter(|id| context.get_person(*id).is_infectious())
                .count();
            assert_eq!(
                place.infectious_occupant_count(),
                infectious,
                "{} at t={}",
                place.name(),
                context.get_current_time()
            );
        }
    });
}

fn one_employee_town(parameters: Parameters) -> (Context, PersonId, PlaceId, PlaceId) {
    let mut context = Context::new();
    context.init_random(parameters.seed);
    context.set_parameters(parameters).unwrap();
    let home = context.add_home_with_transmissivity(1.0);
    let work = context.add_workplace_with_transmissivity(1.0);
    let employee = context.add_employee(home);
    context.set_workplace(employee, work);
    (context, employee, home, work)
}

#[test]
fn single_employee_full_course() {
    for seed in 0..20 {
        let mut parameters = Parameters::default();
        parameters.seed = seed;
        let (mut context, employee, _, work) = one_employee_town(parameters);
        check_place_counts(&mut context);

        let transitions = Rc::new(RefCell::new(Vec::new()));
        let transitions_clone = transitions.clone();
        context.subscribe_to_event(move |context, event| {
            if let Event::InfectionStatusChanged {
                previous, current, ..
            } = event
            {
                transitions_clone
                    .borrow_mut()
                    .push((context.get_current_time(), *previous, *current));
            }
        });
        // The workplace counts the employee exactly while they are there
        // and infectious.
        context.subscribe_to_event(move |context, _| {
            let person = context.get_person(employee);
            let expected = usize::from(person.place() == Some(work) && person.is_infectious());
            assert_eq!(context.get_place(work).infectious_occupant_count(), expected);
        });

        context.infect(employee);
        context.add_plan_with_phase(365.0, Action::Shutdown, ExecutionPhase::Last);
        context.execute();

        let transitions = transitions.borrow();
        let statuses: Vec<_> = transitions.iter().map(|(_, _, current)| *current).collect();
        assert!(
            matches!(
                statuses.as_slice(),
                [
                    InfectionStatus::Latent,
                    InfectionStatus::Infectious,
                    InfectionStatus::Recovered
                ] | [
                    InfectionStatus::Latent,
                    InfectionStatus::Infectious,
                    InfectionStatus::Bedridden,
                    InfectionStatus::Recovered | InfectionStatus::Dead
                ]
            ),
            "seed {seed}: {statuses:?}"
        );
        for pair in transitions.windows(2) {
            assert!(pair[0].0 <= pair[1].0);
            assert!(pair[1].1.can_become(pair[1].2));
        }
        assert_eq!(context.get_place(work).infectious_occupant_count(), 0);
    }
}

#[test]
fn bedridden_mid_commute_is_redirected_home() {
    let mut parameters = Parameters::default();
    parameters.commute = LogNormalParams::new(20.0 * MINUTE, 0.0);
    parameters.disease.latent = LogNormalParams::new(7.5 * HOUR, 0.0);
    parameters.disease.bedridden_probability = 1.0;
    // Bedridden at 7:40, after leaving at 7:35 and before arriving at 7:55.
    parameters.disease.infectious_to_bedridden = LogNormalParams::new(10.0 * MINUTE, 0.0);
    parameters.disease.death_probability = 0.0;
    let (mut context, employee, home, work) = one_employee_town(parameters);
    check_place_counts(&mut context);

    let arrivals = Rc::new(RefCell::new(Vec::new()));
    let arrivals_clone = arrivals.clone();
    context.subscribe_to_event(move |context, event| {
        if let Event::Arrived { place_id, .. } = event {
            arrivals_clone
                .borrow_mut()
                .push((context.get_current_time(), *place_id));
        }
    });

    context.infect(employee);
    context.add_plan_with_phase(12.0 * HOUR, Action::Shutdown, ExecutionPhase::Last);
    context.execute();

    assert_eq!(
        context.get_infection_status(employee),
        InfectionStatus::Bedridden
    );
    let arrivals = arrivals.borrow();
    assert_eq!(arrivals.len(), 1);
    assert_eq!(arrivals[0].1, home);
    assert_approx_eq!(arrivals[0].0, 8.0 * HOUR + 15.0 * MINUTE, 1e-9);
    assert!(!context.get_place(work).contains(employee));
    assert_eq!(context.get_person(employee).place(), Some(home));
}

#[test]
fn town_invariants_hold_throughout() {
    let mut parameters = Parameters::default();
    parameters.seed = 8;
    parameters.max_time = 60.0;
    parameters.population.size = 300;
    parameters.population.initially_infected = 5;
    let mut context = Context::new();
    context.init_random(parameters.seed);
    context.set_parameters(parameters).unwrap();
    population_loader::init(&mut context);
    check_place_counts(&mut context);

    let dead: Rc<RefCell<Vec<PersonId>>> = Rc::default();
    let dead_clone = dead.clone();
    context.subscribe_to_event(move |context, event| {
        assert_eq!(context.get_population_counts().total(), 300);
        match event {
            Event::InfectionStatusChanged {
                person_id,
                previous,
                current,
            } => {
                assert!(previous.can_become(*current));
                let person = context.get_person(*person_id);
                if *previous == InfectionStatus::Bedridden {
                    // Bedridden people are home (or gone) by their next transition.
                    assert!(person.place().is_none_or(|place| place == person.home()));
                }
                if *current == InfectionStatus::Dead {
                    dead_clone.borrow_mut().push(*person_id);
                }
            }
            Event::Arrived { person_id, .. } | Event::Departed { person_id, .. } => {
                assert!(!dead_clone.borrow().contains(person_id));
            }
        }
    });

    context.execute();
    assert_approx_eq!(context.get_current_time(), 60.0);
    let counts = context.get_population_counts();
    assert_eq!(counts.total(), 300);
    assert!(counts.uninfected < 300, "{counts:?}");
    for person_id in dead.borrow().iter() {
        assert_eq!(context.get_person(*person_id).place(), None);
        let home = context.get_person(*person_id).home();
        assert!(context.get_place(home).roster().contains(person_id));
    }
}

#[test]
fn infecting_twice_changes_nothing() {
    let (mut context, employee, _, _) = one_employee_town(Parameters::default());
    context.infect(employee);
    let counts = context.get_population_counts();
    let plans = context.remaining_plan_count();
    context.infect(employee);
    assert_eq!(context.get_population_counts(), counts);
    assert_eq!(context.remaining_plan_count(), plans);
}

#[test]
fn empty_run_terminates_immediately() {
    let mut context = Context::new();
    context.execute();
    assert_approx_eq!(context.get_current_time(), 0.0);
    assert_eq!(context.get_population_counts(), PopulationCounts::default());
}

#[test]
fn run_without_plans_leaves_people_untouched() {
    let mut context = Context::new();
    let first_home = context.add_home_with_transmissivity(1.0);
    let second_home = context.add_home_with_transmissivity(1.0);
    let people = [
        context.add_person(first_home),
        context.add_person(first_home),
        context.add_person(second_home),
    ];
    assert_eq!(context.remaining_plan_count(), 0);
    let before = context.get_population_counts();
    assert_eq!(before.uninfected, 3);

    context.execute();

    assert_approx_eq!(context.get_current_time(), 0.0);
    assert_eq!(context.get_population_counts(), before);
    for person_id in people {
        let person = context.get_person(person_id);
        assert_eq!(person.status(), InfectionStatus::Uninfected);
        assert_eq!(person.place(), Some(person.home()));
    }
    assert_eq!(context.get_place(first_home).occupant_count(), 2);
    assert_eq!(context.get_place(second_home).occupant_count(), 1);
}

#[test]
fn runs_are_reproducible() {
    let run = |seed| {
        let mut parameters = Parameters::default();
        parameters.seed = seed;
        parameters.population.size = 200;
        parameters.max_time = 20.0;
        let mut context = Context::new();
        context.init_random(seed);
        context.set_parameters(parameters).unwrap();
        population_loader::init(&mut context);
        context.execute();
        context.get_population_counts()
    };
    assert_eq!(run(4), run(4));
}
