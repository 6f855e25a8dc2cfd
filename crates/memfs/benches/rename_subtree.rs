//! Subtree rename benchmark for memfs
//!
//! Rename cost is linear in the number of indexed paths: every key is
//! checked against the moved prefix, then each moved path is re-keyed.
//! The "unrelated" variant keeps the moved subtree small while growing the
//! rest of the tree.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use memfs::{FileSystem, InMemoryFs, Mode, OpenFlags, Storage};
use std::path::Path;
use tokio::runtime::{Builder, Runtime};

/// Number of files in the tree
const FILE_COUNTS: &[usize] = &[100, 1_000, 10_000];

/// Spread `n` files over `/src/d{0..16}` and `/other/d{0..16}`, with
/// `moved` of them under `/src`.
fn build_storage(n: usize, moved: usize) -> Storage {
    let mut storage = Storage::with_limits(memfs::FsLimits::unlimited());
    for i in 0..n {
        let root = if i < moved { "src" } else { "other" };
        let path = format!("/{root}/d{}/f{i}", i % 16);
        if let Ok(Some(file)) = storage.create(&path, Mode::file(0o644), OpenFlags::default()) {
            let _ = file.write_at(b"payload", 0);
        }
    }
    storage
}

fn runtime() -> Runtime {
    Builder::new_current_thread().build().unwrap()
}

fn bench_rename_whole_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("rename_subtree");

    for &n in FILE_COUNTS {
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("moved_all", n), &n, |b, &n| {
            let mut storage = build_storage(n, n);
            let mut flip = false;
            b.iter(|| {
                let (from, to) = if flip { ("/dst", "/src") } else { ("/src", "/dst") };
                flip = !flip;
                storage.rename(from, to).unwrap();
            });
        });

        group.bench_with_input(BenchmarkId::new("moved_16_unrelated", n), &n, |b, &n| {
            let mut storage = build_storage(n, 16);
            let mut flip = false;
            b.iter(|| {
                let (from, to) = if flip { ("/dst", "/src") } else { ("/src", "/dst") };
                flip = !flip;
                storage.rename(from, to).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_facade_overhead(c: &mut Criterion) {
    let rt = runtime();

    c.bench_function("facade_write_link_read", |b| {
        b.to_async(&rt).iter(|| async {
            let fs = InMemoryFs::new();
            fs.write_file(Path::new("/dir/file"), b"payload", 0o644)
                .await
                .unwrap();
            fs.link(Path::new("/dir/file"), Path::new("/link"))
                .await
                .unwrap();
            let _ = fs.read_file(Path::new("/link")).await.unwrap();
        });
    });

    c.bench_function("storage_create_nested", |b| {
        b.iter(|| {
            let mut storage = Storage::new();
            storage
                .create("/a/b/c/d/e/f", Mode::file(0o644), OpenFlags::default())
                .unwrap();
        });
    });
}

/// Verify a round trip of renames restores the tree
#[test]
fn verify_rename_round_trip() {
    let mut storage = build_storage(64, 32);
    let before = storage.paths();
    storage.rename("/src", "/dst").unwrap();
    assert!(!storage.has("/src"));
    storage.rename("/dst", "/src").unwrap();
    assert_eq!(storage.paths(), before);
}

criterion_group!(benches, bench_rename_whole_tree, bench_facade_overhead);
criterion_main!(benches);
