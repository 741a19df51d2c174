//! Example: generating path data for a small two-sector scene.
//!
//! This example walks the whole offline pipeline:
//! 1. Build terrain input for two overlapping sectors
//! 2. Configure and run the generator
//! 3. Reload the generated index and aggregates to inspect them
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=info cargo run -p pathgen --example generate_pathdata
//! ```
//!
//! Output files are saved to `target/pathdata_out/`.

use pathgen::{
    Generator, GlobalConfig, JumpCandidateBlob, NavMeshBlob, PathDataIndexBlob, PathObjectKind,
    RunOptions, Sector, SectorInput, SectorPartitioner,
};
use pathgen_blob::BlobAggregate;
use pathgen_core::{Guid, Triangle, Vec3};

const OUTPUT_DIR: &str = "target/pathdata_out";

/// Two triangles covering [x0, x1] x [y0, y1] at altitude z.
fn push_quad(input: &mut SectorInput, x0: f32, y0: f32, x1: f32, y1: f32, z: f32, terrain: u32) {
    let a = Vec3::new(x0, y0, z);
    let b = Vec3::new(x1, y0, z);
    let c = Vec3::new(x1, y1, z);
    let d = Vec3::new(x0, y1, z);
    input.push_triangle(Triangle::new(a, b, c), terrain);
    input.push_triangle(Triangle::new(a, c, d), terrain);
}

fn main() -> Result<(), pathgen::GenError> {
    env_logger::init();

    println!("=== pathgen: two-sector generation ===");
    println!();

    // Step 1: terrain input. A plaza at ground level, a terrace two units
    // up whose footprint overlaps the plaza's eastern edge, and a
    // teleporter connecting the far corners.
    let mut plaza = SectorInput::new();
    push_quad(&mut plaza, 0.0, 0.0, 16.0, 16.0, 0.0, 0);
    plaza.push_path_object(
        PathObjectKind::Teleporter,
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(15.0, 15.0, 0.0),
    );

    let mut terrace = SectorInput::new();
    push_quad(&mut terrace, 12.0, 0.0, 28.0, 16.0, 2.0, 1);

    // Step 2: configure and run.
    let config = GlobalConfig::default();
    let run_options = RunOptions {
        params_dump_file: Some("params.ron".to_string()),
        ..RunOptions::default()
    };

    let mut generator = Generator::new(config, run_options, OUTPUT_DIR)?;
    generator.add_sector(Sector::with_input(
        "plaza",
        Guid::from_bytes([1; 16]),
        plaza,
    ))?;
    generator.add_sector_with_partitioner(
        Sector::with_input("terrace", Guid::from_bytes([2; 16]), terrace),
        SectorPartitioner::new(2)?,
    )?;
    generator.generate()?;

    println!(
        "generated {} elements from {} sectors",
        generator.system().element_map().len(),
        generator.sector_count()
    );
    for element in generator.system().element_map().iter_sorted() {
        println!(
            "  element '{}' covering {} cells",
            element.name,
            element.cell_box.cell_count()
        );
    }
    println!();

    // Step 3: reload what was written, the way a runtime would.
    let registry = generator.system().registry();
    let index_path = generator.system().output_path("Generator", "pathdataindex");
    let index_aggregate = BlobAggregate::load_from_file(registry, &index_path)?;
    let indexes: Vec<PathDataIndexBlob> = index_aggregate.decode_all()?;

    println!("index '{}' lists:", index_path.display());
    for entry in &indexes[0].entries {
        let aggregate = BlobAggregate::load_from_file(
            registry,
            generator.system().output_dir().join(&entry.file_name),
        )?;
        let navmeshes: Vec<NavMeshBlob> = aggregate.decode_all()?;
        let candidates: Vec<JumpCandidateBlob> = aggregate.decode_all()?;
        println!(
            "  {} -> {} navmesh cells, {} connection candidates",
            entry.file_name,
            navmeshes[0].cells.len(),
            candidates[0].candidates.len()
        );
    }

    Ok(())
}
