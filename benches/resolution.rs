use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use stand_in::{ArgMatcher, Mock};

/// Benchmark the invoke path: resolve, generate, record
fn bench_invoke(c: &mut Criterion) {
    let mut group = c.benchmark_group("invoke");
    group.throughput(Throughput::Elements(1));

    group.bench_function("unconfigured_default", |b| {
        let mock = Mock::new("Bench");
        let op = mock.method::<u64, u64>("op").unwrap();
        b.iter(|| op.invoke(black_box(7)));
    });

    group.bench_function("constant", |b| {
        let mock = Mock::new("Bench");
        let op = mock.method::<u64, u64>("op").unwrap();
        op.when().always_return(1);
        b.iter(|| op.invoke(black_box(7)));
    });

    group.bench_function("computed", |b| {
        let mock = Mock::new("Bench");
        let op = mock.method::<u64, u64>("op").unwrap();
        op.when().always_compute(|v| v.wrapping_mul(31));
        b.iter(|| op.invoke(black_box(7)));
    });

    group.finish();
}

/// Benchmark first-fit resolution as the stub table grows
fn bench_table_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_depth");

    for depth in [1usize, 8, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let mock = Mock::new("Bench");
            let op = mock.method::<u64, u64>("op").unwrap();
            let mut stubbing = op.when();
            for i in 0..depth as u64 {
                stubbing = stubbing.using(ArgMatcher::eq(i)).returns(i);
            }
            let last = depth as u64 - 1;
            b.iter(|| op.invoke(black_box(last)));
        });
    }

    group.finish();
}

/// Benchmark verification over a recorded history
fn bench_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("verification");

    let mock = Mock::new("Bench");
    let read = mock.method::<u64, u64>("read").unwrap();
    let write = mock.method::<u64, ()>("write").unwrap();
    for i in 0..500 {
        read.invoke(i);
        write.invoke(i);
    }

    group.bench_function("count_1000", |b| {
        b.iter(|| stand_in::verify(read.calls().exactly(black_box(500))))
    });

    group.bench_function("strict_sequence_1000", |b| {
        b.iter(|| stand_in::verify((read.calls() + write.calls()) * black_box(500)))
    });

    group.finish();
}

criterion_group!(benches, bench_invoke, bench_table_depth, bench_verification);
criterion_main!(benches);
