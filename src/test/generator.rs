use crate::component::{ComponentGenerator, ComponentId};
use crate::dist::{Constant, Cycle};
use crate::error::{SimError, SimResult};
use crate::sim::{Environment, TickTime, TraceCollector};

fn record_arrival(env: &mut Environment) -> SimResult<ComponentId> {
    env.add_data_component(None)
}

fn arrival_times(env: &Environment, generator: ComponentId) -> Vec<f64> {
    env.components()
        .filter(|(id, _)| *id != generator)
        .map(|(_, c)| c.creation_time().value())
        .collect()
}

#[test]
fn generator_stops_at_total() {
    let mut env = Environment::default();
    let generator = env
        .spawn_generator(ComponentGenerator::new(Constant(2.0), record_arrival).total(3))
        .expect("generator");

    env.run().expect("run");

    assert_eq!(arrival_times(&env, generator), vec![0.0, 2.0, 4.0]);
    assert!(env.component(generator).expect("gen").is_data());
    let produced = env
        .process_ref::<ComponentGenerator>(generator)
        .map(ComponentGenerator::produced);
    assert_eq!(produced, Some(3));
    assert_eq!(env.now(), TickTime(4.0));
}

#[test]
fn generator_does_not_consume_the_gap_past_till() {
    let mut env = Environment::default();
    let collector = TraceCollector::default();
    let events = collector.handle();
    env.add_listener(collector);

    let generator = env
        .spawn_generator(ComponentGenerator::new(Constant(3.0), record_arrival).till(TickTime(7.0)))
        .expect("generator");
    env.run().expect("run");

    assert_eq!(arrival_times(&env, generator), vec![0.0, 3.0, 6.0]);
    // stopped at the last arrival instead of holding until 9
    assert_eq!(env.now(), TickTime(6.0));
    let events = events.lock().expect("events lock");
    let till = events
        .iter()
        .find(|e| e.action == "till reached")
        .expect("terminal event");
    assert_eq!(till.time, TickTime(6.0));
    assert_eq!(till.source.as_deref(), Some("ComponentGenerator.1"));
}

#[test]
fn generator_starts_at_from_and_follows_the_distribution() {
    let mut env = Environment::default();
    let generator = env
        .spawn_generator(
            ComponentGenerator::new(Cycle::new([1.0, 4.0]), record_arrival)
                .from(TickTime(5.0))
                .total(4),
        )
        .expect("generator");

    env.run().expect("run");
    assert_eq!(arrival_times(&env, generator), vec![5.0, 6.0, 10.0, 11.0]);
}

#[test]
fn generator_with_zero_total_builds_nothing() {
    let mut env = Environment::default();
    let generator = env
        .spawn_generator(ComponentGenerator::new(Constant(1.0), record_arrival).total(0))
        .expect("generator");
    env.run().expect("run");

    assert!(arrival_times(&env, generator).is_empty());
    assert!(env.component(generator).expect("gen").is_data());
}

#[test]
fn negative_inter_arrival_time_is_an_error() {
    let mut env = Environment::default();
    env.spawn_generator(ComponentGenerator::new(Constant(-1.0), record_arrival))
        .expect("generator");

    let err = env.run().expect_err("negative gap");
    assert!(matches!(err, SimError::InvalidDuration { duration, .. } if duration == -1.0));
}

#[test]
fn generated_closure_distribution_is_sampled_lazily() {
    let mut env = Environment::default();
    let mut next = 0.0;
    let gaps = move || {
        next += 1.0;
        next
    };
    let generator = env
        .spawn_generator(ComponentGenerator::new(gaps, record_arrival).total(4))
        .expect("generator");
    env.run().expect("run");

    // gaps 1, 2, 3
    assert_eq!(arrival_times(&env, generator), vec![0.0, 1.0, 3.0, 6.0]);
}
