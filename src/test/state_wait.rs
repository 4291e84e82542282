use crate::component::{ComponentId, StateId, Suspend, WaitSpec};
use crate::error::SimResult;
use crate::sim::{Environment, TickTime};
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<(&'static str, f64)>>>;

fn waiter(
    name: &'static str,
    light: StateId<&'static str>,
    log: &Log,
) -> impl FnMut(&mut Environment, ComponentId) -> SimResult<Suspend> + 'static {
    let log = Arc::clone(log);
    let mut waited = false;
    move |env, _me| {
        if waited {
            log.lock().expect("log lock").push((name, env.now().value()));
            return Ok(Suspend::Done);
        }
        waited = true;
        Ok(Suspend::wait(light, |v: &&'static str| *v == "green"))
    }
}

#[test]
fn set_wakes_satisfied_waiters_in_registration_order() {
    let log = Log::default();
    let mut env = Environment::default();
    let light = env.new_state(Some("light"), "red");

    let a = env.spawn("car a", waiter("car a", light, &log)).expect("a");
    let b = env.spawn("car b", waiter("car b", light, &log)).expect("b");
    env.run().expect("run");

    assert!(env.component(a).expect("a").is_waiting());
    assert!(env.component(b).expect("b").is_waiting());
    let waiting: Vec<ComponentId> = env.state(light).expect("light").waiters().collect();
    assert_eq!(waiting, vec![a, b]);

    env.run_until(TickTime(3.0)).expect("run_until");
    env.set_state(light, "yellow").expect("set");
    assert!(env.component(a).expect("a").is_waiting());

    env.set_state(light, "green").expect("set");
    assert!(env.component(a).expect("a").is_scheduled());
    assert_eq!(env.state(light).expect("light").waiters().count(), 0);
    env.run().expect("run");

    assert_eq!(
        *log.lock().expect("log lock"),
        vec![("car a", 3.0), ("car b", 3.0)]
    );
    assert_eq!(env.state_value(light).expect("value"), "green");
}

#[test]
fn wait_on_a_satisfied_predicate_still_yields() {
    let log = Log::default();
    let mut env = Environment::default();
    let light = env.new_state(Some("light"), "green");

    let a = env.spawn("car a", waiter("car a", light, &log)).expect("a");
    assert!(env.step().expect("step"));
    // resumed at the same tick, not in place
    assert!(env.component(a).expect("a").is_scheduled());
    assert!(log.lock().expect("log lock").is_empty());

    env.run().expect("run");
    assert_eq!(*log.lock().expect("log lock"), vec![("car a", 0.0)]);
}

#[test]
fn trigger_wakes_waiters_and_restores_the_value() {
    let log = Log::default();
    let mut env = Environment::default();
    let light = env.new_state(Some("light"), "red");
    env.spawn("car a", waiter("car a", light, &log)).expect("a");
    env.run().expect("run");

    env.trigger_state(light, "green").expect("trigger");
    assert_eq!(env.state_value(light).expect("value"), "red");
    env.run().expect("run");

    assert_eq!(*log.lock().expect("log lock"), vec![("car a", 0.0)]);
}

#[test]
fn wait_timeout_withdraws_from_the_state() {
    let mut env = Environment::default();
    let door = env.new_state(Some("door"), false);
    let mut phase = 0;
    let c = env
        .spawn("visitor", move |_env: &mut Environment, _me: ComponentId| -> SimResult<Suspend> {
            phase += 1;
            Ok(match phase {
                1 => Suspend::Wait(WaitSpec::new(door, |open: &bool| *open).fail_delay(4.0)),
                _ => Suspend::Passivate,
            })
        })
        .expect("spawn");

    env.run().expect("run");

    let comp = env.component(c).expect("c");
    assert!(comp.request_failed());
    assert!(comp.is_passive());
    assert_eq!(env.now(), TickTime(4.0));
    assert_eq!(env.state(door).expect("door").waiters().count(), 0);

    // a later change no longer reaches the withdrawn visitor
    env.set_state(door, true).expect("set");
    assert!(env.component(c).expect("c").is_passive());
}

#[test]
fn state_timeline_tracks_time_per_value() {
    let mut env = Environment::default();
    let level = env.new_state(Some("level"), 0_u32);
    env.run_until(TickTime(2.0)).expect("run_until");
    env.set_state(level, 3).expect("set");
    env.run_until(TickTime(7.0)).expect("run_until");
    env.set_state(level, 0).expect("set");
    env.run_until(TickTime(8.0)).expect("run_until");

    let timeline = env
        .state(level)
        .expect("level")
        .timeline()
        .expect("timeline enabled");
    assert_eq!(timeline.total(&0, env.now()), 3.0);
    assert_eq!(timeline.total(&3, env.now()), 5.0);
}
