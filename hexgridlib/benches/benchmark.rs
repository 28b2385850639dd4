use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use hexgridlib::{CellMetrics, Geometry, PatchStore};
use rand::Rng;

fn random_writes(count: usize, span: usize) -> Vec<(usize, Vec<u8>)> {
    let mut rng = rand::rng();
    (0..count)
        .map(|_| {
            let addr = rng.random_range(0..span);
            let len = rng.random_range(1..32);
            (addr, (0..len).map(|_| rng.random()).collect())
        })
        .collect()
}

#[allow(clippy::unwrap_used)]
fn bench_patch_writes(c: &mut Criterion) {
    let writes = random_writes(10_000, 0x10_0000);

    c.bench_function("patchstore_random_writes_10k", |b| {
        b.iter_batched(
            PatchStore::new,
            |mut store| {
                for (addr, bytes) in &writes {
                    store.write(*addr, std::hint::black_box(bytes)).unwrap();
                }
                std::hint::black_box(store);
            },
            BatchSize::SmallInput,
        );
    });

    let dense = random_writes(10_000, 0x1000);

    c.bench_function("patchstore_dense_writes_10k", |b| {
        b.iter_batched(
            PatchStore::new,
            |mut store| {
                for (addr, bytes) in &dense {
                    store.write(*addr, std::hint::black_box(bytes)).unwrap();
                }
                std::hint::black_box(store);
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_selection_path(c: &mut Criterion) {
    let geom = Geometry::new(0x1003, 0x10_0000, CellMetrics::default());

    c.bench_function("geometry_selection_path", |b| {
        b.iter(|| {
            let path = geom.selection_path(
                std::hint::black_box(0x1005),
                std::hint::black_box(0x8_0002),
                false,
                0.5,
            );
            std::hint::black_box(path);
        });
    });
}

criterion_group!(
    name = hexgridlib_benches;
    config = Criterion::default().sample_size(20);
    targets = bench_patch_writes, bench_selection_path
);
criterion_main!(hexgridlib_benches);
