use crate::demo::{BankConfig, build_bank};
use crate::dist::Constant;
use crate::monitor::{LevelMonitor, TallyMonitor};
use crate::queue::QueueOrder;
use crate::sim::{Environment, TickTime};

fn close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("statistic present");
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn bank_waiting_line_statistics() {
    let mut env = Environment::default();
    let cfg = BankConfig {
        service_time: 15.0,
        until: 50.0,
        ..BankConfig::default()
    };
    let bank = build_bank(&mut env, &cfg, Constant(10.0)).expect("build bank");
    env.run_until(TickTime(cfg.until)).expect("run");

    let stats = env.queue_stats(bank.waiting_line).expect("stats");
    assert_eq!(stats.name, "waiting line");
    assert_eq!(stats.ty, "queue statistics");

    let ql = &stats.queue_length;
    assert_eq!(ql.all.duration, 50.0);
    assert_eq!(ql.all.min, Some(0.0));
    assert_eq!(ql.all.max, Some(2.0));
    close(ql.all.mean, 0.8);
    close(ql.all.standard_deviation, 0.6);
    assert_eq!(ql.excl_zeros.duration, 35.0);
    assert_eq!(ql.excl_zeros.min, Some(1.0));
    close(ql.excl_zeros.mean, 40.0 / 35.0);
    close(ql.excl_zeros.standard_deviation, 0.349_927);

    let los = &stats.length_of_stay;
    assert_eq!(los.all.entries, 4);
    assert_eq!(los.all.min, Some(0.0));
    assert_eq!(los.all.max, Some(15.0));
    close(los.all.mean, 7.5);
    close(los.all.standard_deviation, (125.0_f64 / 3.0).sqrt());
    assert_eq!(los.excl_zeros.entries, 3);
    close(los.excl_zeros.mean, 10.0);
    close(los.excl_zeros.standard_deviation, 5.0);
}

#[test]
fn queue_stats_serialize_to_the_documented_shape() {
    let mut env = Environment::default();
    let q = env.new_queue(Some("line"), QueueOrder::Fifo);
    let v = serde_json::to_value(env.queue_stats(q).expect("stats")).expect("json");

    assert_eq!(v["type"], "queue statistics");
    assert_eq!(v["name"], "line");
    for bucket in ["all", "excl_zeros"] {
        let ql = &v["queue_length"][bucket];
        for key in ["duration", "min", "max", "mean", "standard_deviation"] {
            assert!(ql.get(key).is_some(), "queue_length.{bucket}.{key} missing");
        }
        let los = &v["length_of_stay"][bucket];
        for key in ["entries", "mean", "standard_deviation"] {
            assert!(los.get(key).is_some(), "length_of_stay.{bucket}.{key} missing");
        }
    }
}

#[test]
fn priority_queue_orders_by_component_priority() {
    let mut env = Environment::default();
    let q = env.new_queue(Some("triage"), QueueOrder::Priority);
    let low = env.add_data_component(Some("low")).expect("low");
    let high = env.add_data_component(Some("high")).expect("high");
    let mid = env.add_data_component(Some("mid")).expect("mid");
    let high2 = env.add_data_component(Some("high 2")).expect("high 2");
    env.set_priority(high, 9).expect("priority");
    env.set_priority(high2, 9).expect("priority");
    env.set_priority(mid, 4).expect("priority");

    for c in [low, high, mid, high2] {
        env.enter(q, c).expect("enter");
    }
    assert!(env.enter(q, low).is_err(), "double enter must fail");

    let order: Vec<_> = env.queue(q).expect("q").members().collect();
    assert_eq!(order, vec![high, high2, mid, low]);

    let vip = env.add_data_component(None).expect("vip");
    env.enter_at_head(q, vip).expect("head");
    env.leave(q, mid).expect("leave");
    assert!(env.leave(q, mid).is_err());
    assert_eq!(env.queue(q).expect("q").len(), 4);
    assert_eq!(env.pop(q).expect("pop"), Some(vip));
    assert_eq!(env.pop(q).expect("pop"), Some(high));
}

#[test]
fn disabling_monitors_keeps_history_and_skips_samples() {
    let mut env = Environment::default();
    let q = env.new_queue(Some("line"), QueueOrder::Fifo);
    let a = env.add_data_component(Some("a")).expect("a");
    let b = env.add_data_component(Some("b")).expect("b");

    env.enter(q, a).expect("enter");
    env.run_until(TickTime(2.0)).expect("run_until");
    env.leave(q, a).expect("leave");
    let before = env.queue(q).expect("q").length_of_stay_monitor().values().to_vec();
    assert_eq!(before, vec![2.0]);

    env.set_queue_monitors_enabled(q, false).expect("disable");
    env.set_queue_monitors_enabled(q, false).expect("disable twice");
    env.enter(q, b).expect("enter");
    env.run_until(TickTime(5.0)).expect("run_until");
    env.leave(q, b).expect("leave");
    assert_eq!(
        env.queue(q).expect("q").length_of_stay_monitor().values(),
        before.as_slice()
    );

    env.set_queue_monitors_enabled(q, true).expect("enable");
    env.run_until(TickTime(6.0)).expect("run_until");
    let stats = env.queue_stats(q).expect("stats");
    // [0,2) at length 1, [2,5) disabled, [5,6) at length 0
    assert_eq!(stats.queue_length.all.duration, 3.0);
    close(stats.queue_length.all.mean, 2.0 / 3.0);
    assert_eq!(stats.length_of_stay.all.entries, 1);
}

#[test]
fn reneging_skips_length_of_stay_only() {
    let mut env = Environment::default();
    let q = env.new_queue(Some("line"), QueueOrder::Fifo);
    let quitter = env.add_data_component(Some("quitter")).expect("quitter");
    let patient = env.add_data_component(Some("patient")).expect("patient");

    env.enter(q, quitter).expect("enter");
    env.run_until(TickTime(2.0)).expect("run_until");
    env.set_length_of_stay_monitor_enabled(q, false).expect("disable");
    env.leave(q, quitter).expect("renege");
    env.set_length_of_stay_monitor_enabled(q, true).expect("enable");

    env.enter(q, patient).expect("enter");
    env.run_until(TickTime(5.0)).expect("run_until");
    env.leave(q, patient).expect("leave");
    env.run_until(TickTime(6.0)).expect("run_until");

    let stats = env.queue_stats(q).expect("stats");
    assert_eq!(stats.length_of_stay.all.entries, 1);
    close(stats.length_of_stay.all.mean, 3.0);
    // queue length kept recording throughout
    assert_eq!(stats.queue_length.all.duration, 6.0);
    close(stats.queue_length.all.mean, 5.0 / 6.0);
}

#[test]
fn level_monitor_toggle_is_idempotent() {
    let mut m = LevelMonitor::new(1.0, TickTime::ZERO);
    m.set_enabled(TickTime(1.0), true);
    assert_eq!(m.len(), 1);

    m.set_enabled(TickTime(2.0), false);
    m.set_enabled(TickTime(3.0), false);
    m.record(TickTime(3.5), 4.0);
    m.set_enabled(TickTime(4.0), true);
    assert_eq!(m.len(), 3);

    let stats = m.stats(TickTime(6.0));
    // [0,2) at 1.0, [4,6) at 4.0
    assert_eq!(stats.all.duration, 4.0);
    close(stats.all.mean, 2.5);
    assert_eq!(stats.all.max, Some(4.0));
}

#[test]
fn tally_monitor_ignores_samples_while_disabled() {
    let mut t = TallyMonitor::default();
    t.add(0.0);
    t.add(4.0);
    t.set_enabled(false);
    t.add(100.0);
    t.set_enabled(true);
    t.add(8.0);

    let stats = t.stats();
    assert_eq!(stats.all.entries, 3);
    close(stats.all.mean, 4.0);
    close(stats.all.standard_deviation, 4.0);
    assert_eq!(stats.excl_zeros.entries, 2);
    close(stats.excl_zeros.mean, 6.0);
}
