use criterion::{criterion_group, criterion_main, Criterion};
use rand::{Rng, SeedableRng};
use tagstat::{
    downsample, reduce, Cadence, Engine, MemoryStore, Method, Reading, Tag, TagStore, Value,
    WritableStore,
};

fn values(n: usize) -> Vec<Value> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    (0..n).map(|_| rng.gen_range(1.0..100.0)).collect()
}

fn store(n: i64) -> MemoryStore {
    let store = MemoryStore::new();
    store
        .create_tag(Tag::new("t", "Temperature", "°C", "temp"))
        .unwrap();

    let mut rng = rand::rngs::StdRng::seed_from_u64(42);

    for idx in 0..n {
        store
            .insert_reading(Reading::new(
                format!("r-{idx}"),
                "t",
                rng.gen_range(1.0..100.0),
                idx,
                idx as f64,
                "dev",
            ))
            .unwrap();
    }

    store
}

fn reduce_methods(c: &mut Criterion) {
    let values = values(1_000);

    for method in Method::ALL {
        c.bench_function(&format!("reduce {method} (1k)"), |b| {
            b.iter(|| reduce(&values, method));
        });
    }
}

fn downsample_tag(c: &mut Criterion) {
    let store = store(100_000);
    let cadence = Cadence::try_from(100_i64).unwrap();

    c.bench_function("downsample AVERAGE (100k -> 100)", |b| {
        b.iter(|| downsample(&store, "t", 0, 100_000, cadence, Method::Average));
    });

    c.bench_function("downsample MEDIAN (100k -> 100)", |b| {
        b.iter(|| downsample(&store, "t", 0, 100_000, cadence, Method::Median));
    });
}

fn downsample_cached(c: &mut Criterion) {
    let engine = Engine::builder(store(100_000)).cache(true).build();

    c.bench_function("downsample cached (100k -> 100)", |b| {
        b.iter(|| engine.downsample_one("t", 0, 100_000, 100, Method::Average.code()));
    });
}

criterion_group!(benches, reduce_methods, downsample_tag, downsample_cached);
criterion_main!(benches);
