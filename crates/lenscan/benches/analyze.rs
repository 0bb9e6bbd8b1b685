use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lenscan::core::{
    analyze, AnalyzerConfig, BrightestPixel, BrightestPixelParams, BrightnessClassifier,
    LumaFrame, MeanBrightness, MeanBrightnessParams,
};

fn make_plane(width: usize, height: usize) -> Vec<u8> {
    let mut plane: Vec<u8> = (0..width * height).map(|i| (i % 97) as u8).collect();
    let (cx, cy) = (width / 3, height / 4);
    for y in cy.saturating_sub(20)..(cy + 20).min(height) {
        for x in cx.saturating_sub(20)..(cx + 20).min(width) {
            plane[y * width + x] = 250;
        }
    }
    plane
}

fn bench_cluster_steps(c: &mut Criterion) {
    let (w, h) = (640, 480);
    let plane = make_plane(w, h);
    let frame = LumaFrame::packed(w, h, &plane);

    let mut group = c.benchmark_group("cluster_centroid_640x480");
    for step in [1u32, 3, 6] {
        let cfg = AnalyzerConfig::new(170, 70, step);
        group.bench_with_input(BenchmarkId::from_parameter(step), &cfg, |b, cfg| {
            b.iter(|| black_box(analyze(black_box(&frame), cfg)))
        });
    }
    group.finish();
}

fn bench_resolutions(c: &mut Criterion) {
    let cfg = AnalyzerConfig::default();
    let mut group = c.benchmark_group("cluster_centroid_step3");
    for (w, h) in [(640, 480), (1280, 720), (1920, 1080)] {
        let plane = make_plane(w, h);
        group.bench_function(format!("{w}x{h}"), |b| {
            b.iter(|| black_box(analyze(&LumaFrame::packed(w, h, black_box(&plane)), &cfg)))
        });
    }
    group.finish();
}

fn bench_strategies(c: &mut Criterion) {
    let (w, h) = (1280, 720);
    let plane = make_plane(w, h);
    let frame = LumaFrame::packed(w, h, &plane);
    let strategies: Vec<Box<dyn BrightnessClassifier>> = vec![
        Box::new(lenscan::core::ClusterCentroid::default()),
        Box::new(BrightestPixel::new(BrightestPixelParams::default()).unwrap()),
        Box::new(MeanBrightness::new(MeanBrightnessParams::default()).unwrap()),
    ];
    let mut group = c.benchmark_group("strategies_1280x720");
    for clf in &strategies {
        group.bench_function(clf.name(), |b| {
            b.iter(|| black_box(clf.classify(black_box(&frame))))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cluster_steps, bench_resolutions, bench_strategies);
criterion_main!(benches);
