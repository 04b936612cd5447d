use arbor::*;
use arbor::sim::*;
use rstest::rstest;

/// Three branches executed in order: a 4-iteration loop, an alternating
/// branch, and a (T, T, N) pattern. Unconditional branches are mixed in but
/// never affect the predictors.
fn periodic_trace() -> Vec<BranchRecord> {
    SyntheticTrace::new(7)
        .branch(Behavior::Loop { trip_count: 4 })
        .branch(Behavior::Alternating)
        .branch(Behavior::Pattern(vec![Outcome::T, Outcome::T, Outcome::N]))
        .unconditional_rate(0.2)
        .generate(30_000)
}

#[rstest]
#[case(Strategy::Gshare, 0.99)]
#[case(Strategy::Tournament, 0.99)]
// Folding a short periodic history into 9 bits aliases heavily in the
// longest component, so entries keep replacing each other there.
#[case(Strategy::Tage, 0.75)]
fn learns_periodic_branches(#[case] strategy: Strategy, #[case] min_rate: f64) {
    let trace = periodic_trace();
    let p = strategy.default_config().build().unwrap();
    let (p, stats) = simulate(p, &trace);
    assert_eq!(p.strategy(), strategy);
    assert_eq!(stats.global_brns(), 30_000);
    assert_eq!(stats.num_unique_branches(), 3);
    assert!(stats.hit_rate() >= min_rate, "{}: {}", p.name(), stats.hit_rate());
}

#[test]
fn static_baseline_is_biased_toward_taken() {
    let trace = periodic_trace();
    let p = Strategy::Static.default_config().build().unwrap();
    let (_, stats) = simulate(p, &trace);
    // 3/4, 1/2, and 2/3 of the outcomes are taken
    assert_eq!(stats.global_hits(), 7_500 + 5_000 + 6_667);
    assert!(stats.hit_rate() < 0.7);
}

#[test]
fn tage_allocates_tagged_entries() {
    let trace = periodic_trace();
    let p = Strategy::Tage.default_config().build().unwrap();
    let (p, _) = simulate(p, &trace);
    let tage = p.as_tage().unwrap();
    assert!(tage.stat.alcs > 0);
    assert_eq!(tage.stat.clk, 30_000);
    assert_eq!(tage.train_count(), 30_000);
    assert!(tage.stat.comp_hits.iter().sum::<usize>() > 0);
}

#[test]
fn replays_a_text_trace() {
    let mut text = Vec::new();
    for record in periodic_trace().iter().take(2_000) {
        write_record(&mut text, record).unwrap();
    }
    let trace = read_trace(text.as_slice()).unwrap();
    assert_eq!(trace.len(), 2_000);

    for strategy in [Strategy::Static, Strategy::Gshare,
        Strategy::Tournament, Strategy::Tage]
    {
        let mut sim = Simulator::new(
            strategy.default_config().build().unwrap()
        );
        sim.run(&trace);
        let conditional = trace.iter().filter(|r| r.is_conditional()).count();
        assert_eq!(sim.num_records(), 2_000);
        assert_eq!(sim.stats().global_brns(), conditional);
    }
}
