use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use binaural::{BinauralRenderer, Direction, Measurement, MeasurementSet, RendererConfigBuilder};

/// A ring of 72 horizontal measurements with 200-tap responses, about the size of a real dataset's horizon.
fn synthetic_set() -> Arc<MeasurementSet> {
    let measurements = (0..72)
        .map(|i| {
            let azimuth = i as f64 * 5.0;
            let ir = |phase: f32| {
                (0..200)
                    .map(|t| (t as f32 * 0.1 + phase).sin() / (t as f32 + 1.0))
                    .collect::<Vec<_>>()
            };
            Measurement {
                direction: Direction::new(azimuth, 0.0),
                left: ir(i as f32),
                right: ir(-(i as f32)),
            }
        })
        .collect();
    Arc::new(MeasurementSet::new(44100, measurements).unwrap())
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("renderer");
    let set = synthetic_set();

    for block_len in [128usize, 512usize] {
        let input = (0..block_len)
            .map(|i| (i as f32 * 0.01).sin())
            .collect::<Vec<_>>();
        let mut output = vec![0.0f32; block_len * 2];
        let config = || {
            RendererConfigBuilder::default()
                .max_block_frames(block_len)
                .build()
                .unwrap()
        };

        group.throughput(Throughput::Elements(block_len as u64));

        group.bench_function(format!("steady, block_len={block_len}"), |b| {
            let mut renderer = BinauralRenderer::new(set.clone(), config()).unwrap();
            renderer.parameters().set_azimuth(37.0);
            b.iter(|| {
                renderer.process_mono(&input, &mut output).unwrap();
                black_box(output.last());
            });
        });

        // Every block moves the source, so every block interpolates and crossfades.
        group.bench_function(format!("moving, block_len={block_len}"), |b| {
            let mut renderer = BinauralRenderer::new(set.clone(), config()).unwrap();
            let params = renderer.parameters();
            let mut azimuth = -180.0;
            b.iter(|| {
                azimuth = if azimuth >= 179.0 { -180.0 } else { azimuth + 1.3 };
                params.set_azimuth(azimuth);
                renderer.process_mono(&input, &mut output).unwrap();
                black_box(output.last());
            });
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
