use criterion::{black_box, criterion_group, criterion_main, Criterion};

use brisk_common::{collections::DynArr, dynarr};

fn dynarr_new(c: &mut Criterion) {
    c.bench_function("DynArr::new", |b| b.iter(|| {
        DynArr::<u32>::new()
    }));
    c.bench_function("Vec::new", |b| b.iter(|| {
        Vec::<u32>::new()
    }));
    c.bench_function("DynArr::with_capacity(64)", |b| b.iter(|| {
        DynArr::<u32>::with_capacity(64)
    }));
    c.bench_function("Vec::with_capacity(64)", |b| b.iter(|| {
        Vec::<u32>::with_capacity(64)
    }));
}

fn dynarr_push(c: &mut Criterion) {
    c.bench_function("DynArr::push(100) no reserve", |b| b.iter(|| {
        let mut arr = DynArr::<u32>::new();
        for i in 0..100 {
            arr.push(i);
        }
        arr
    }));
    c.bench_function("DynArr::push(100) reserve", |b| b.iter(|| {
        let mut arr = DynArr::<u32>::new();
        arr.reserve(100);
        for i in 0..100 {
            arr.push(i);
        }
        arr
    }));

    c.bench_function("Vec::push(100) no reserve", |b| b.iter(|| {
        let mut arr = Vec::<u32>::new();
        for i in 0..100 {
            arr.push(i);
        }
        arr
    }));
    c.bench_function("Vec::push(100) reserve", |b| b.iter(|| {
        let mut arr = Vec::<u32>::new();
        arr.reserve(100);
        for i in 0..100 {
            arr.push(i);
        }
        arr
    }));
}

fn dynarr_index(c: &mut Criterion) {
    let arr = dynarr![5; 100];
    c.bench_function("DynArr::index(100)", |b| b.iter(|| {
        for i in 0..100 {
            black_box(arr[i]);
        }
    }));

    let vbuf = vec![5; 100];
    c.bench_function("Vec::index(100)", |b| b.iter(|| {
        for i in 0..100 {
            black_box(vbuf[i]);
        }
    }));
}

fn dynarr_insert_erase(c: &mut Criterion) {
    c.bench_function("DynArr::insert+erase front(64)", |b| b.iter(|| {
        let mut arr = DynArr::<u32>::with_capacity(64);
        for i in 0..64 {
            arr.insert(0, i);
        }
        while !arr.is_empty() {
            let _ = arr.erase(0);
        }
        arr
    }));
    c.bench_function("Vec::insert+remove front(64)", |b| b.iter(|| {
        let mut arr = Vec::<u32>::with_capacity(64);
        for i in 0..64 {
            arr.insert(0, i);
        }
        while !arr.is_empty() {
            arr.remove(0);
        }
        arr
    }));
}

// One round of the mixed workload: reserve, push, shrink, resize, erase, clear and move-assign.
fn dynarr_mixed(c: &mut Criterion) {
    c.bench_function("DynArr mixed workload(1000)", |b| b.iter(|| {
        let mut arr = dynarr![1, 4, 16, 3, 5];
        for _ in 0..1000 {
            arr.reserve_to(50);
            arr.push(47);
            arr.shrink_to_fit();
            arr.resize_default(7);
            arr.push_with(|| 8);
            let _ = arr.erase(1);
            arr.clear();
            let mut arr2 = DynArr::new();
            arr2.push(6);
            arr = arr2;
            arr.shrink_to_fit();
            arr.pop();
        }
        arr
    }));
    c.bench_function("Vec mixed workload(1000)", |b| b.iter(|| {
        let mut arr = vec![1, 4, 16, 3, 5];
        for _ in 0..1000 {
            arr.reserve(50usize.saturating_sub(arr.len()));
            arr.push(47);
            arr.shrink_to_fit();
            arr.resize(7, 0);
            arr.push(8);
            arr.remove(1);
            arr.clear();
            let mut arr2 = Vec::new();
            arr2.push(6);
            arr = arr2;
            arr.shrink_to_fit();
            arr.pop();
        }
        arr
    }));
}

criterion_group!(dynarr,
    dynarr_new,
    dynarr_push,
    dynarr_index,
    dynarr_insert_erase,
    dynarr_mixed
);
criterion_main!(dynarr);
