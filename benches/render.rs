use criterion::{criterion_group, criterion_main, Criterion};
use glow_tree::projection::Projector;
use glow_tree::{Canvas, Scene, TreeConfig};

fn bench_render(c: &mut Criterion) {
    let config = TreeConfig {
        width: 500,
        height: 500,
        dpi: 100.0 / 3.0,
        ..TreeConfig::default()
    };
    let mut group = c.benchmark_group("render");

    group.bench_function("basic_tree", |b| {
        let scene = Scene::basic_tree(&config);
        let projector = scene.projector(config.width, config.height);
        let mut canvas = Canvas::new(config.width, config.height);
        b.iter(|| {
            scene.render(&projector, &mut canvas);
            criterion::black_box(&canvas);
        });
    });

    group.bench_function("glow_frame", |b| {
        let scene = Scene::glow_frame(&config, 1.0);
        let projector = Projector::new(
            &config.glow.view,
            &scene.bounds(),
            config.width,
            config.height,
        );
        let mut canvas = Canvas::new(config.width, config.height);
        b.iter(|| {
            scene.render(&projector, &mut canvas);
            criterion::black_box(&canvas);
        });
    });
    group.finish();
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
