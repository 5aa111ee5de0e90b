//! Criterion benchmark fuer Builder und Reader
//!
//! Run mit: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tablebuf::options::BuilderOptions;
use tablebuf::{Builder, Table};

fn build_options_tables(b: &mut Builder, count: usize) -> Vec<u8> {
    b.reset();
    let mut offsets = Vec::with_capacity(count);
    for i in 0..count {
        b.start_object(2).unwrap();
        b.add_field::<i32>(0, i as i32, 0).unwrap();
        b.add_field::<i8>(1, (i % 4) as i8, 0).unwrap();
        offsets.push(b.end_object().unwrap());
    }
    let list = b.create_vector_of_offsets(&offsets).unwrap();
    b.start_object(1).unwrap();
    b.add_offset_field(0, list).unwrap();
    let root = b.end_object().unwrap();
    b.finish(root).unwrap();
    b.finished_data().unwrap().to_vec()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for count in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*count as u64));

        // Mit vtable-Dedup (Default)
        group.bench_function(format!("tables_{}", count), |bench| {
            let mut b = Builder::new();
            bench.iter(|| black_box(build_options_tables(&mut b, *count)));
        });

        // Ohne Dedup: jede Tabelle schreibt ihre eigene vtable
        group.bench_function(format!("tables_no_dedup_{}", count), |bench| {
            let mut b = Builder::with_options(BuilderOptions::default().with_dedup_vtables(false));
            bench.iter(|| black_box(build_options_tables(&mut b, *count)));
        });
    }

    group.bench_function("strings_1000", |bench| {
        let mut b = Builder::new();
        bench.iter(|| {
            b.reset();
            for i in 0..1000 {
                black_box(b.create_string(black_box("CONCATENATION")).unwrap());
                black_box(i);
            }
        });
    });

    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");
    let count = 10000;
    let data = build_options_tables(&mut Builder::new(), count);
    group.throughput(Throughput::Elements(count as u64));

    group.bench_function("sum_axis_10000", |bench| {
        bench.iter(|| {
            let root = Table::open(black_box(&data), 0).unwrap();
            let list = root.get_vector::<Table>(0).unwrap().unwrap();
            let mut sum = 0i64;
            for child in list.iter() {
                sum += i64::from(child.unwrap().get_field::<i32>(0, 0).unwrap());
            }
            black_box(sum)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_build, bench_read);
criterion_main!(benches);
