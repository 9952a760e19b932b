use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use oxcrypt_dircache::{DirCache, DirCacheConfig, DirIv};
use std::hint::black_box;
use std::time::Duration;

/// Build a cache holding one chain of `depth` nested directories plus
/// `fanout` siblings at every level.
fn populated_cache(depth: usize, fanout: usize) -> (DirCache, String) {
    let cache = DirCache::new(
        DirCacheConfig::default()
            .max_entries(depth * (fanout + 1))
            .max_time(Duration::from_secs(3600)),
    );
    cache.store("", DirIv::from([0u8; 16]), "");

    let mut plain = String::new();
    let mut cipher = String::new();
    for level in 0..depth {
        for sibling in 0..fanout {
            let (p, c) = join(&plain, &cipher, &format!("sib{sibling}"), &format!("U0lC{sibling}"));
            cache.store(&p, DirIv::from([sibling as u8; 16]), &c);
        }
        let (p, c) = join(&plain, &cipher, &format!("dir{level}"), &format!("RElS{level}"));
        cache.store(&p, DirIv::from([level as u8; 16]), &c);
        plain = p;
        cipher = c;
    }
    (cache, plain)
}

fn join(plain: &str, cipher: &str, name: &str, cname: &str) -> (String, String) {
    if plain.is_empty() {
        (name.to_string(), cname.to_string())
    } else {
        (format!("{plain}/{name}"), format!("{cipher}/{cname}"))
    }
}

fn bench_lookup_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("dircache_lookup");
    for depth in [1, 4, 16] {
        let (cache, deepest) = populated_cache(depth, 8);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &deepest, |b, dir| {
            b.iter(|| black_box(cache.lookup(black_box(dir))));
        });
    }
    group.finish();
}

fn bench_lookup_miss(c: &mut Criterion) {
    let (cache, _) = populated_cache(4, 8);
    c.bench_function("dircache_lookup_miss", |b| {
        b.iter(|| black_box(cache.lookup(black_box("dir0/dir1/missing/dir3"))));
    });
}

fn bench_store_with_eviction(c: &mut Criterion) {
    let cache = DirCache::new(
        DirCacheConfig::default()
            .max_entries(100)
            .max_time(Duration::from_secs(3600)),
    );
    cache.store("", DirIv::from([0u8; 16]), "");
    let names: Vec<(String, String)> = (0..1000)
        .map(|i| (format!("dir{i}"), format!("RElS{i}")))
        .collect();

    c.bench_function("dircache_store_full", |b| {
        let mut i = 0;
        b.iter(|| {
            let (dir, cdir) = &names[i % names.len()];
            cache.store(dir, DirIv::from([1u8; 16]), cdir);
            i += 1;
        });
    });
}

criterion_group!(
    benches,
    bench_lookup_depth,
    bench_lookup_miss,
    bench_store_with_eviction
);
criterion_main!(benches);
