//! Micro-benchmarks for the pure selection policy.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use call_model::StreamId;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stream_layout::layout::{build_layout, streams_to_display, CapacityConfig};
use stream_layout::model::{StreamUi, StreamUiState};

fn state_with(count: usize, pinned: usize) -> StreamUiState {
    let streams: Vec<StreamUi> = (0..count)
        .map(|i| StreamUi {
            id: StreamId::from(format!("stream-{i}")),
            username: format!("user-{i}"),
            avatar: None,
            is_mine: i == 0,
            audio: None,
            video: None,
        })
        .collect();
    let pinned_streams = streams.iter().take(pinned).cloned().collect();
    StreamUiState {
        streams,
        pinned_streams,
        fullscreen_stream: None,
        preview: None,
    }
}

fn bench_selection(c: &mut Criterion) {
    let featured = state_with(50, 0);
    c.bench_function("streams_to_display/featured-50", |b| {
        b.iter(|| streams_to_display(black_box(&featured), 15, 3));
    });

    let pinned = state_with(50, 6);
    c.bench_function("streams_to_display/pinned-50", |b| {
        b.iter(|| streams_to_display(black_box(&pinned), 15, 3));
    });

    let caps = CapacityConfig {
        max_featured_streams: 15,
        max_thumbnail_streams: 3,
        max_pinned_streams: 6,
    };
    c.bench_function("build_layout/overflow-50", |b| {
        b.iter(|| build_layout(black_box(&featured), caps));
    });
}

criterion_group!(benches, bench_selection);
criterion_main!(benches);
