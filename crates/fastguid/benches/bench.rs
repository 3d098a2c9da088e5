use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use fastguid::{Guid, GuidPg, GuidSs, fill, fill_lite};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_IDS: usize = 4096;

/// Benchmarks a single-threaded identifier constructor.
fn bench_ids<ID>(c: &mut Criterion, group_name: &str, make: impl Fn() -> ID) {
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                for _ in 0..TOTAL_IDS {
                    black_box(make());
                }
            }
            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks an identifier constructor shared by several threads, all
/// drawing from the same process-wide pool.
fn bench_ids_contended<ID>(c: &mut Criterion, group_name: &str, make: impl Fn() -> ID + Sync) {
    let mut group = c.benchmark_group(group_name);

    for thread_count in [1, 2, 4, 8, 16] {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(format!("elems/{TOTAL_IDS}/threads/{thread_count}"), |b| {
            b.iter_custom(|iters| {
                let start = Instant::now();

                for _ in 0..iters {
                    let barrier = Arc::new(Barrier::new(thread_count + 1));
                    scope(|s| {
                        for _ in 0..thread_count {
                            let barrier = Arc::clone(&barrier);
                            let make = &make;
                            s.spawn(move || {
                                barrier.wait();
                                for _ in 0..ids_per_thread {
                                    black_box(make());
                                }
                            });
                        }
                        barrier.wait();
                    });
                }

                start.elapsed()
            });
        });
    }

    group.finish();
}

/// Benchmarks a byte filler over read sizes on both sides of the cache
/// bypass threshold.
fn bench_fill(c: &mut Criterion, group_name: &str, filler: fn(&mut [u8])) {
    let mut group = c.benchmark_group(group_name);

    for len in [16, 64, 512, 1024, 64 * 1024] {
        let mut buf = vec![0u8; len];
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_function(format!("bytes/{len}"), |b| {
            b.iter(|| {
                filler(&mut buf);
                black_box(&buf);
            });
        });
    }

    group.finish();
}

fn benchmark_new_guid(c: &mut Criterion) {
    bench_ids(c, "guid/sequential/new", Guid::new);
}

fn benchmark_new_string(c: &mut Criterion) {
    bench_ids(c, "guid/sequential/new_string", Guid::new_string);
}

fn benchmark_new_pg(c: &mut Criterion) {
    bench_ids(c, "guid/sequential/pg", GuidPg::now);
}

fn benchmark_new_ss(c: &mut Criterion) {
    bench_ids(c, "guid/sequential/ss", GuidSs::now);
}

fn benchmark_contended_guid(c: &mut Criterion) {
    bench_ids_contended(c, "guid/contended/new", Guid::new);
}

fn benchmark_fill_secure(c: &mut Criterion) {
    bench_fill(c, "fill/secure", fill);
}

fn benchmark_fill_lite(c: &mut Criterion) {
    bench_fill(c, "fill/lite", fill_lite);
}

/// Baseline: every read goes to the operating system.
fn benchmark_fill_os(c: &mut Criterion) {
    use rand::{TryRngCore, rngs::OsRng};
    bench_fill(c, "fill/os", |buf| {
        let _ = OsRng.try_fill_bytes(buf);
    });
}

fn benchmark_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    let ids: Vec<Guid> = (0..TOTAL_IDS).map(|_| Guid::new()).collect();
    let texts: Vec<String> = ids.iter().map(Guid::to_string).collect();

    group.bench_function(format!("encode/elems/{TOTAL_IDS}"), |b| {
        let mut buf = [0u8; fastguid::GUID_BASE64URL_SIZE];
        b.iter(|| {
            for id in &ids {
                black_box(id.encode_to_buf(&mut buf));
            }
        });
    });

    group.bench_function(format!("decode/elems/{TOTAL_IDS}"), |b| {
        b.iter(|| {
            for text in &texts {
                let _ = black_box(Guid::parse(text));
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    // Identifier construction
    benchmark_new_guid,
    benchmark_new_string,
    benchmark_new_pg,
    benchmark_new_ss,
    benchmark_contended_guid,
    // Random byte fills
    benchmark_fill_secure,
    benchmark_fill_lite,
    benchmark_fill_os,
    // Text form
    benchmark_codec,
);
criterion_main!(benches);
