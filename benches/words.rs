//! Benchmarks for word counting and buffer edits.

use std::time::Instant;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mdpad::document::{ControllerConfig, DocumentController};
use mdpad::store::MemoryStore;
use mdpad::words::count_words;

fn bench_count_words(c: &mut Criterion) {
    let text = "lorem ipsum dolor sit amet\n\n".repeat(2_000);
    c.bench_function("count_words", |b| b.iter(|| count_words(black_box(&text))));
}

fn bench_keystroke(c: &mut Criterion) {
    let config = ControllerConfig {
        seed_text: "lorem ipsum dolor sit amet\n".repeat(500),
        ..ControllerConfig::default()
    };
    let mut document = DocumentController::open(config, MemoryStore::new());
    let now = Instant::now();
    c.bench_function("keystroke", |b| {
        b.iter(|| {
            document.edit(now, |buf| {
                buf.insert_char(black_box('x'));
                true
            })
        })
    });
}

criterion_group!(benches, bench_count_words, bench_keystroke);
criterion_main!(benches);
