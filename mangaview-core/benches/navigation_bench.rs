use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mangaview_core::{
    strategy_for, ChapterRequest, PageDescriptor, PagePosition, PageRegistry, PageRequest,
    PageSource, PrefetchScheduler, ReadingMode, Step,
};

struct NullSource;

impl PageSource for NullSource {
    fn request_page(&self, request: PageRequest) {
        black_box(request);
    }

    fn request_chapter(&self, _request: ChapterRequest) {}
}

fn bench_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("prefetch");

    group.bench_function("sweep_500_pages_radius_5", |b| {
        b.iter(|| {
            let mut registry = PageRegistry::new();
            registry.set(
                (0..500)
                    .map(|i| PageDescriptor::new(format!("https://img/{i}.jpg")))
                    .collect(),
            );
            let mut scheduler = PrefetchScheduler::new();
            for current in 0..500 {
                scheduler.schedule(&mut registry, current, 5, &NullSource);
            }
            black_box(registry.counts())
        });
    });

    group.finish();
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategy");

    for mode in [ReadingMode::Single, ReadingMode::Double] {
        group.bench_function(mode.label(), |b| {
            let strategy = strategy_for(mode);
            b.iter(|| {
                let mut acc = 0u32;
                for page in 1..=1000 {
                    let pos = PagePosition {
                        page,
                        page_count: 1000,
                    };
                    if let Step::Page(p) = strategy.next(black_box(pos)) {
                        acc = acc.wrapping_add(p);
                    }
                }
                acc
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_schedule, bench_strategies);
criterion_main!(benches);
