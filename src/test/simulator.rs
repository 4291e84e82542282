use crate::component::{ComponentId, ComponentOptions, ResourceRequest, Suspend};
use crate::error::{SimError, SimResult};
use crate::resource::ResourceOptions;
use crate::sim::{Environment, TickTime};
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<(u32, f64)>>>;

fn push_once(
    id: u32,
    log: &Log,
) -> impl FnMut(&mut Environment, ComponentId) -> SimResult<Suspend> + 'static {
    let log = Arc::clone(log);
    move |env, _me| {
        log.lock().expect("log lock").push((id, env.now().value()));
        Ok(Suspend::Done)
    }
}

fn ids(log: &Log) -> Vec<u32> {
    log.lock().expect("log lock").iter().map(|(id, _)| *id).collect()
}

#[test]
fn wake_entries_order_by_time_then_priority_then_seq() {
    let log = Log::default();
    let mut env = Environment::default();

    let at10 = ComponentOptions::default().at(TickTime(10.0));
    env.spawn_with(at10.clone(), push_once(1, &log)).expect("spawn");
    env.spawn_with(ComponentOptions::default().at(TickTime(5.0)), push_once(2, &log))
        .expect("spawn");
    env.spawn_with(at10.clone(), push_once(3, &log)).expect("spawn");
    env.spawn_with(at10.priority(5), push_once(4, &log)).expect("spawn");

    env.run().expect("run");

    assert_eq!(ids(&log), vec![2, 4, 1, 3]);
    assert_eq!(env.now(), TickTime(10.0));
    assert_eq!(env.pending(), 0);
}

#[test]
fn run_until_leaves_entries_at_the_boundary_for_the_next_call() {
    let log = Log::default();
    let mut env = Environment::default();
    env.spawn_with(ComponentOptions::default().at(TickTime(5.0)), push_once(1, &log))
        .expect("spawn");
    env.spawn_with(ComponentOptions::default().at(TickTime(10.0)), push_once(2, &log))
        .expect("spawn");

    env.run_until(TickTime(10.0)).expect("run_until");
    assert_eq!(ids(&log), vec![1]);
    assert_eq!(env.now(), TickTime(10.0));
    assert_eq!(env.peek_next(), Some(TickTime(10.0)));

    env.run_for(1.0).expect("run_for");
    assert_eq!(ids(&log), vec![1, 2]);
    assert_eq!(env.now(), TickTime(11.0));
}

#[test]
fn run_until_advances_an_idle_clock() {
    let mut env = Environment::default();
    env.run_until(TickTime(7.0)).expect("run_until");
    assert_eq!(env.now(), TickTime(7.0));

    // never moves backwards
    env.run_until(TickTime(3.0)).expect("run_until");
    assert_eq!(env.now(), TickTime(7.0));
}

#[test]
fn same_tick_activation_is_queued_not_reentrant() {
    let log = Log::default();
    let mut env = Environment::default();
    let b = env
        .spawn_with(ComponentOptions::named("b").passive(), push_once(2, &log))
        .expect("spawn b");
    let a_log = Arc::clone(&log);
    env.spawn("a", move |env: &mut Environment, _me: ComponentId| -> SimResult<Suspend> {
        env.activate(b, None)?;
        a_log.lock().expect("log lock").push((1, env.now().value()));
        Ok(Suspend::Done)
    })
    .expect("spawn a");

    env.run().expect("run");

    assert_eq!(ids(&log), vec![1, 2]);
    assert!(env.component(b).expect("b").is_data());
}

#[test]
fn activate_cancels_the_pending_hold() {
    let log = Log::default();
    let mut env = Environment::default();
    let step_log = Arc::clone(&log);
    let mut steps = 0;
    let c = env
        .spawn("sleeper", move |env: &mut Environment, _me: ComponentId| -> SimResult<Suspend> {
            steps += 1;
            step_log.lock().expect("log lock").push((steps, env.now().value()));
            Ok(if steps == 1 { Suspend::hold(10.0) } else { Suspend::Done })
        })
        .expect("spawn");

    env.run_until(TickTime(1.0)).expect("run_until");
    assert_eq!(env.component(c).expect("c").scheduled_time(), Some(TickTime(10.0)));

    env.activate(c, Some(TickTime(3.0))).expect("activate");
    assert_eq!(env.pending(), 1);
    env.run().expect("run");

    assert_eq!(*log.lock().expect("log lock"), vec![(1, 0.0), (2, 3.0)]);
    assert_eq!(env.now(), TickTime(3.0));
}

#[test]
fn blocked_components_do_not_hang_the_run() {
    let mut env = Environment::default();
    let closed = env
        .new_resource(ResourceOptions::named("closed").capacity(0.0))
        .expect("resource");
    let c = env
        .spawn("stuck", move |_env: &mut Environment, _me: ComponentId| -> SimResult<Suspend> {
            Ok(Suspend::request(ResourceRequest::new(closed)))
        })
        .expect("spawn");

    env.run().expect("run completes silently");

    assert!(env.component(c).expect("c").is_requesting());
    assert_eq!(env.pending(), 0);
}

#[test]
fn negative_hold_aborts_the_run() {
    let mut env = Environment::default();
    env.spawn("bad", |_env: &mut Environment, _me: ComponentId| -> SimResult<Suspend> {
        Ok(Suspend::hold(-1.0))
    })
        .expect("spawn");

    let err = env.run().expect_err("negative hold must fail");
    match err {
        SimError::InvalidDuration { entity, duration, time } => {
            assert_eq!(entity, "bad");
            assert_eq!(duration, -1.0);
            assert_eq!(time, TickTime::ZERO);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn process_errors_propagate_out_of_run() {
    let mut env = Environment::default();
    env.spawn("boom", |env: &mut Environment, me: ComponentId| -> SimResult<Suspend> {
        // a process may not activate itself from inside its own step
        env.activate(me, None)?;
        Ok(Suspend::Done)
    })
    .expect("spawn");

    let err = env.run().expect_err("self-activation must fail");
    assert!(matches!(err, SimError::IllegalStateTransition { .. }), "{err}");
}

#[test]
fn failed_step_keeps_standby_components() {
    let log = Log::default();
    let mut env = Environment::default();

    let w_log = Arc::clone(&log);
    let mut w_steps = 0;
    let watcher = env
        .spawn("watcher", move |env: &mut Environment, _me: ComponentId| -> SimResult<Suspend> {
            w_steps += 1;
            if w_steps == 1 {
                return Ok(Suspend::Standby);
            }
            w_log.lock().expect("log lock").push((2, env.now().value()));
            Ok(Suspend::Done)
        })
        .expect("spawn watcher");
    env.spawn("bad", |_env: &mut Environment, _me: ComponentId| -> SimResult<Suspend> {
        Ok(Suspend::hold(-1.0))
    })
    .expect("spawn bad");
    env.spawn_with(ComponentOptions::default().at(TickTime(2.0)), push_once(1, &log))
        .expect("spawn late");

    assert!(env.step().expect("watcher step"));
    env.step().expect_err("negative hold must fail");
    assert!(env.component(watcher).expect("watcher").is_standby());

    env.run().expect("run after the failure");
    assert_eq!(*log.lock().expect("log lock"), vec![(1, 2.0), (2, 2.0)]);
}
