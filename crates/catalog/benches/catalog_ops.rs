use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use ordertally_catalog::{BucketSet, Catalog, OrderLine};
use ordertally_core::{OrderId, ProductId};

fn line(total: i64) -> OrderLine {
    OrderLine {
        distributor: 12,
        date: "2024-01-01".to_string(),
        order: OrderId::new(500),
        description: "Widget, BrandX, 12ct".to_string(),
        total,
        price: 1.25,
    }
}

fn parsed_batch(n: i64) -> Vec<(ProductId, OrderLine)> {
    (0..n).map(|i| (ProductId::new(1000 + i), line(10))).collect()
}

fn bench_bulk_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_insert");
    for size in [100i64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let batch = parsed_batch(size);
            b.iter(|| {
                let mut catalog = Catalog::new(BucketSet::received_used());
                catalog.bulk_insert(black_box(batch.clone()));
                catalog
            });
        });
    }
    group.finish();
}

fn bench_scan_throughput(c: &mut Criterion) {
    let mut catalog = Catalog::new(BucketSet::received_used());
    catalog.bulk_insert(parsed_batch(1_000));

    c.bench_function("apply_scan", |b| {
        let mut unit = 0u32;
        b.iter(|| {
            unit = unit.wrapping_add(1) % 100;
            catalog.apply_scan(black_box("received"), ProductId::new(1500), black_box(unit))
        });
    });
}

fn bench_closure_sweep(c: &mut Criterion) {
    let mut catalog = Catalog::new(BucketSet::received_used());
    catalog.bulk_insert(parsed_batch(1_000));
    for (product, _) in parsed_batch(1_000) {
        for unit in 1..=10 {
            catalog.apply_scan("received", product, unit);
            catalog.apply_scan("used", product, unit);
        }
    }

    c.bench_function("closure_sweep_1000_rows", |b| {
        b.iter(|| {
            catalog
                .rows()
                .filter(|(_, row)| black_box(row).is_closed())
                .count()
        });
    });
}

criterion_group!(
    benches,
    bench_bulk_insert,
    bench_scan_throughput,
    bench_closure_sweep
);
criterion_main!(benches);
