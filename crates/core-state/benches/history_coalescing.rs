use core_state::{History, HistoryConfig, ManualClock};
use core_text::{LineBuffer, SelectionIndex};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

fn source(lines: usize) -> LineBuffer {
    LineBuffer::from_lines(
        (0..lines)
            .map(|i| format!("    addi $t{}, $t{}, {i}", i % 8, (i + 1) % 8))
            .collect(),
    )
}

fn bench_typing_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_push");
    group.bench_function("same_line_burst", |b| {
        b.iter_batched(
            || {
                let config = HistoryConfig {
                    commit_interval: usize::MAX,
                    ..HistoryConfig::default()
                };
                (History::new(config, Box::new(ManualClock::new())), source(2_000))
            },
            |(mut history, mut buffer)| {
                for i in 0..512 {
                    let at = SelectionIndex::new(1_000, 4 + i);
                    history.dirty(&buffer, 1_000, 1, 1, at);
                    buffer.put(at, "x");
                }
                history.commit();
            },
            BatchSize::SmallInput,
        );
    });
    group.bench_function("scattered_lines", |b| {
        b.iter_batched(
            || {
                let history = History::new(HistoryConfig::default(), Box::new(ManualClock::new()));
                (history, source(2_000))
            },
            |(mut history, buffer)| {
                for i in 0..512 {
                    let line = (i * 37) % 2_000;
                    history.dirty(&buffer, line, 1, 1, SelectionIndex::new(line, 0));
                }
                history.commit();
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_undo_full_frames(c: &mut Criterion) {
    c.bench_function("history_undo_full_frames", |b| {
        b.iter_batched(
            || {
                let buffer = source(2_000);
                let mut history =
                    History::new(HistoryConfig::default(), Box::new(ManualClock::new()));
                for _ in 0..50 {
                    history.frame(&buffer, SelectionIndex::origin());
                    history.commit();
                }
                (history, buffer)
            },
            |(mut history, buffer)| {
                while history.undo(&buffer, SelectionIndex::origin()).is_some() {}
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_typing_burst, bench_undo_full_frames);
criterion_main!(benches);
