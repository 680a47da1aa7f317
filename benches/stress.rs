use std::mem::MaybeUninit;
use std::ptr::NonNull;

use criterion::{criterion_group, criterion_main, Criterion};
use segfit::{ArenaSource, Tlsf};

const ARENA_LEN: usize = 1024 * 50;
const MAX_ALLOCS: usize = 256;

struct Xorshift32(u32);

impl Xorshift32 {
    fn next(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        self.0
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("stress");

    for &(min_size, mask) in &[
        (1, 7),
        (1, 15),
        (1, 63),
        (1, 255),
        (16, 15),
        (16, 63),
        (16, 127),
        (64, 63),
        (64, 127),
        (128, 127),
    ] {
        let size_range = min_size..min_size + mask + 1;
        let num_allocs = (ARENA_LEN / size_range.end / 2).min(MAX_ALLOCS);

        group.bench_function(format!("{:?}", size_range), |b| {
            let mut arena = vec![MaybeUninit::uninit(); ARENA_LEN];
            let mut tlsf = Tlsf::new(ArenaSource::new(&mut arena)).unwrap();
            let mut allocs: Vec<Option<NonNull<u8>>> = vec![None; num_allocs];
            let mut rng = Xorshift32(0x12345689);

            b.iter(|| {
                let i = rng.next() as usize % allocs.len();
                match allocs[i].take() {
                    Some(ptr) => unsafe { tlsf.deallocate(ptr) },
                    None => {
                        let size = min_size + (rng.next() as usize & mask);
                        allocs[i] = Some(tlsf.allocate(size).unwrap());
                    }
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
