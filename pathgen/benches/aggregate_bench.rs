//! Criterion benchmarks for blob serialization and the raster stage.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use pathgen::{
    DynamicCell, GlobalConfig, MergeStatus, NavCellRecord, NavFloor, NavMeshBlob, NavMeshBuildFlags,
};
use pathgen_blob::{Blob, BlobAggregate, BlobTypeRegistry, Endianness, PayloadWriter};
use pathgen_core::{CellBox, CellPos, Guid, PixelPos};

/// A navmesh blob with `cell_count` cells of four floors each.
fn make_navmesh(cell_count: i32) -> NavMeshBlob {
    let cells = (0..cell_count)
        .map(|i| NavCellRecord {
            cell_pos: CellPos::new(i % 16, i / 16),
            floors: (0..4)
                .map(|layer| NavFloor {
                    altitude_min: layer as f32 * 0.5,
                    altitude_max: layer as f32 * 0.5 + 0.25,
                    terrain_type: layer as u32,
                    pixel_count: 64,
                })
                .collect(),
        })
        .collect();
    NavMeshBlob {
        guids: vec![Guid::from_bytes([7; 16])],
        cell_box: CellBox::new(CellPos::new(0, 0), CellPos::new(15, (cell_count - 1) / 16)),
        flags: NavMeshBuildFlags::NONE,
        cells,
    }
}

fn registry() -> BlobTypeRegistry {
    let mut registry = BlobTypeRegistry::new();
    registry.register::<NavMeshBlob>().unwrap();
    registry
}

fn bench_aggregate_roundtrip(c: &mut Criterion) {
    let registry = registry();
    let mut group = c.benchmark_group("aggregate_roundtrip");

    for cell_count in [16, 256, 1024] {
        let navmesh = make_navmesh(cell_count);
        let mut aggregate = BlobAggregate::new(&registry);
        aggregate.add_blob(&navmesh).unwrap();
        let byte_size = aggregate.compute_byte_size();
        group.throughput(Throughput::Bytes(byte_size as u64));

        group.bench_with_input(
            BenchmarkId::new("save_host", cell_count),
            &aggregate,
            |b, aggregate| {
                b.iter(|| {
                    let mut buffer = Vec::with_capacity(byte_size);
                    aggregate
                        .save(black_box(&mut buffer), Endianness::host())
                        .unwrap();
                    black_box(buffer)
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("save_foreign", cell_count),
            &aggregate,
            |b, aggregate| {
                b.iter(|| {
                    let mut buffer = Vec::with_capacity(byte_size);
                    aggregate
                        .save(black_box(&mut buffer), Endianness::host().swapped())
                        .unwrap();
                    black_box(buffer)
                })
            },
        );

        let mut saved = Vec::new();
        aggregate.save(&mut saved, Endianness::host()).unwrap();
        group.bench_with_input(BenchmarkId::new("load", cell_count), &saved, |b, saved| {
            b.iter(|| {
                let mut cursor = std::io::Cursor::new(black_box(saved.as_slice()));
                black_box(BlobAggregate::load(&registry, &mut cursor).unwrap())
            })
        });
    }
    group.finish();
}

fn bench_payload_swap(c: &mut Criterion) {
    let navmesh = make_navmesh(1024);
    let mut payload = Vec::new();
    let mut writer = PayloadWriter::new(&mut payload, Endianness::host());
    navmesh.write_payload(&mut writer).unwrap();

    c.bench_function("navmesh_swap_1024_cells", |b| {
        b.iter(|| {
            let mut bytes = payload.clone();
            NavMeshBlob::swap_payload(black_box(&mut bytes), Endianness::host()).unwrap();
            black_box(bytes)
        })
    });
}

fn bench_rasterize(c: &mut Criterion) {
    use pathgen::{InputCell, SectorInput};
    use pathgen_core::{Triangle, Vec3};

    let config = GlobalConfig::default();
    let partition = config.partition().unwrap();

    // A flat floor covering one 4 x 4 world-unit cell.
    let mut input = SectorInput::new();
    let a = Vec3::new(0.0, 0.0, 1.0);
    let b = Vec3::new(4.0, 0.0, 1.0);
    let cc = Vec3::new(4.0, 4.0, 1.0);
    let d = Vec3::new(0.0, 4.0, 1.0);
    input.push_triangle(Triangle::new(a, b, cc), 0);
    input.push_triangle(Triangle::new(a, cc, d), 0);
    let input_cell = InputCell {
        cell_pos: CellPos::new(0, 0),
        triangles: input.triangles.clone(),
    };

    c.bench_function("rasterize_flat_cell", |b| {
        b.iter(|| {
            let mut cell = DynamicCell::new(&partition, &config, CellPos::new(0, 0));
            cell.rasterize(&[black_box(&input_cell)]);
            cell.end_columns(MergeStatus::MergeEnabled);
            black_box(cell.top_floor(PixelPos::new(8, 8)))
        })
    });
}

criterion_group!(
    benches,
    bench_aggregate_roundtrip,
    bench_payload_swap,
    bench_rasterize
);
criterion_main!(benches);
