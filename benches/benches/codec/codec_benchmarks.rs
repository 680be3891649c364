use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fbxbin::{
    engine::fbx::{compress_payload, inflate_payload},
    document_to_text, from_bytes, to_bytes, CompressionPolicy, EncodeOptions, FbxDocument, Mode,
    Node,
};

// ============================================================================
// Helper functions для создания тестовых данных
// ============================================================================

/// Меш с `vertices` вершинами: координаты, индексы и нормали.
fn create_mesh(vertices: usize) -> Node {
    let coords: Vec<f64> = (0..vertices * 3).map(|i| (i as f64) * 0.125).collect();
    let indices: Vec<i32> = (0..vertices as i32)
        .map(|i| if i % 4 == 3 { !i } else { i })
        .collect();
    let normals: Vec<f32> = (0..vertices * 3).map(|i| (i % 7) as f32 / 7.0).collect();

    Node::builder("Geometry")
        .property(1i64)
        .property("Mesh\x00\x01Geometry")
        .property("Mesh")
        .child(Node::builder("Vertices").property(coords).build())
        .child(Node::builder("PolygonVertexIndex").property(indices).build())
        .child(
            Node::builder("LayerElementNormal")
                .property(0i32)
                .child(Node::builder("Normals").property(normals).build())
                .build(),
        )
        .build()
}

/// Широкое дерево из мелких узлов без массивов.
fn create_flat_scene(objects: usize) -> Node {
    let models: Vec<Node> = (0..objects)
        .map(|i| {
            Node::builder("Model")
                .property(i as i64)
                .property(format!("Cube{i}\x00\x01Model"))
                .property("Mesh")
                .child(Node::builder("Version").property(232i32).build())
                .child(
                    Node::builder("Properties70")
                        .child(
                            Node::builder("P")
                                .property("Lcl Translation")
                                .property("Lcl Translation")
                                .property("")
                                .property("A")
                                .property(i as f64)
                                .property(0.0f64)
                                .property(0.0f64)
                                .build(),
                        )
                        .build(),
                )
                .build()
        })
        .collect();

    Node::root(vec![
        Node::builder("FBXHeaderExtension")
            .child(Node::builder("FBXHeaderVersion").property(1003i32).build())
            .build(),
        Node::builder("Objects").children(models).build(),
    ])
}

fn raw_options() -> EncodeOptions {
    EncodeOptions {
        compression: CompressionPolicy::disabled(),
        ..EncodeOptions::default()
    }
}

// ============================================================================
// Кодирование и декодирование
// ============================================================================

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for size in [1_000usize, 10_000, 100_000].iter() {
        let mesh = create_mesh(*size);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("mesh/raw", size), &mesh, |b, m| {
            let opts = raw_options();
            b.iter(|| black_box(to_bytes(black_box(m), &opts).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("mesh/zlib", size), &mesh, |b, m| {
            let opts = EncodeOptions::default();
            b.iter(|| black_box(to_bytes(black_box(m), &opts).unwrap()));
        });
    }

    for objects in [100usize, 1_000].iter() {
        let scene = create_flat_scene(*objects);
        group.throughput(Throughput::Elements(scene.node_count() as u64));
        group.bench_with_input(BenchmarkId::new("scene", objects), &scene, |b, s| {
            let opts = EncodeOptions::default();
            b.iter(|| black_box(to_bytes(black_box(s), &opts).unwrap()));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.sample_size(50);

    for size in [1_000usize, 10_000, 100_000].iter() {
        let mesh = create_mesh(*size);
        let raw = to_bytes(&mesh, &raw_options()).unwrap();
        let packed = to_bytes(&mesh, &EncodeOptions::default()).unwrap();

        for (label, bytes) in [("raw", &raw), ("zlib", &packed)] {
            group.throughput(Throughput::Bytes(bytes.len() as u64));
            for mode in [Mode::Strict, Mode::Lenient] {
                group.bench_with_input(
                    BenchmarkId::new(format!("mesh/{label}/{}", mode.as_str()), size),
                    bytes,
                    |b, data| b.iter(|| black_box(from_bytes(black_box(data), mode).unwrap())),
                );
            }
        }
    }

    for objects in [100usize, 1_000].iter() {
        let bytes = to_bytes(&create_flat_scene(*objects), &EncodeOptions::default()).unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        for mode in [Mode::Strict, Mode::Lenient] {
            group.bench_with_input(
                BenchmarkId::new(format!("scene/{}", mode.as_str()), objects),
                &bytes,
                |b, data| b.iter(|| black_box(from_bytes(black_box(data), mode).unwrap())),
            );
        }
    }

    group.finish();
}

// ============================================================================
// zlib
// ============================================================================

fn bench_compression_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression");
    group.sample_size(20);

    let payload: Vec<u8> = (0..65_536)
        .flat_map(|i| ((i as f64) * 0.5).to_le_bytes())
        .collect();
    group.throughput(Throughput::Bytes(payload.len() as u64));

    for level in [1u32, 6, 9] {
        group.bench_with_input(BenchmarkId::new("compress", level), &payload, |b, p| {
            b.iter(|| black_box(compress_payload(black_box(p), level).unwrap()));
        });

        let compressed = compress_payload(&payload, level).unwrap();
        group.bench_with_input(
            BenchmarkId::new("inflate", level),
            &compressed,
            |b, data| {
                b.iter(|| {
                    // пропускаем 2 байта заголовка и 4 байта контрольной суммы
                    let deflate = &data[2..data.len() - 4];
                    black_box(inflate_payload(deflate, payload.len() as u64).unwrap())
                });
            },
        );
    }

    group.finish();
}

fn bench_text_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");
    let scene = create_flat_scene(1_000);
    group.throughput(Throughput::Elements(scene.node_count() as u64));
    let (_, _, top_level) = scene.into_parts();
    let doc = FbxDocument::from_top_level(7400, top_level);
    group.bench_function("text/scene_1000", |b| {
        b.iter(|| black_box(document_to_text(black_box(&doc))))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_compression_levels,
    bench_text_export
);
criterion_main!(benches);
