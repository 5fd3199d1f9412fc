use criterion::{criterion_group, criterion_main, Criterion};
use gridplan_core::Env;
use gridplan_mcts::{evaluator::RandomRolloutEvaluator, policy::Uct, Mcts};
use gridplan_toy_text::make;
use std::hint::black_box;

fn bench_env_clone(c: &mut Criterion) {
    let mut env = make("FrozenLake8x8-v1", 0).unwrap();
    env.reset().unwrap();

    c.bench_function("env_clone", |b| b.iter(|| black_box(env.clone())));
}

fn bench_snapshot_clone(c: &mut Criterion) {
    let mut env = make("CliffWalking-v0", 0).unwrap();
    let obs = env.reset().unwrap();
    let mut mcts = Mcts::new(Uct::new(1.0), RandomRolloutEvaluator::new(20, 0));
    let tree = mcts.search(&env, 128, obs, 0.0).unwrap();
    let snapshot = tree
        .root_node()
        .children()
        .find_map(|(_, id)| tree[id].env.as_ref())
        .unwrap()
        .clone();

    c.bench_function("snapshot_clone", |b| b.iter(|| black_box(snapshot.clone())));
}

fn bench_search(c: &mut Criterion) {
    let mut env = make("CliffWalking-v0", 0).unwrap();
    let obs = env.reset().unwrap();

    c.bench_function("search_64", |b| {
        b.iter(|| {
            let mut mcts = Mcts::new(Uct::new(1.0), RandomRolloutEvaluator::new(20, 0));
            mcts.search(&env, 64, obs, 0.0).unwrap()
        })
    });
}

criterion_group!(benches, bench_env_clone, bench_snapshot_clone, bench_search);
criterion_main!(benches);
