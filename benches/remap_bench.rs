//! Benchmarks for the projection.
//!
//! Run with: `cargo bench --bench remap_bench`
//!
//! The state is a two-material shock tube after one Lagrangian step, so
//! the mesh carries a real displacement.

use ale_remap::remap::sweep::face_normal_velocities;
use ale_remap::remap::{directional_sweep, reassembly, SweepInput, SweepOptions};
use ale_remap::{
    Axis, CartesianMesh2D, FluxBoundary, HydroState, LagrangePhase, LimiterKind, MaterialEos, PhiLayout, RemapEngine,
    Scenario, SimulationState, SolverConfig,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn config(order: u8, plateau_pente: bool) -> SolverConfig {
    let mut config = SolverConfig {
        materials: vec![MaterialEos::perfect_gas(1.4), MaterialEos::perfect_gas(1.4)],
        ..SolverConfig::default()
    };
    config.projection.enabled = true;
    config.projection.order = order;
    config.projection.plateau_pente = plateau_pente;
    config.projection.limiter = if plateau_pente {
        LimiterKind::SuperbeeG
    } else {
        LimiterKind::Minmod
    };
    config
}

/// Mesh and state after one Lagrangian step of the two-material tube.
fn setup_problem(nx: usize, ny: usize, config: &SolverConfig) -> (CartesianMesh2D, HydroState, SimulationState) {
    let mesh = CartesianMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, nx, ny).unwrap();
    let lagrange = LagrangePhase::new(config);
    let mut state = HydroState::new(&mesh, config.nb_materials(), mesh.node_coordinates());
    Scenario::BiSodX.initialize(&mesh, lagrange.materials(), &mut state).unwrap();
    lagrange.initialize(&mesh, &mut state).unwrap();
    let mut sim = SimulationState::starting_with(1e-3);
    sim.next_time = sim.next_dt;
    lagrange.advance(&mesh, &mut state, &sim).unwrap();
    (mesh, state, sim)
}

/// Benchmark one cell sweep along x.
fn bench_directional_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("directional_sweep");

    let variants = [
        ("order1", 1, false),
        ("order2", 2, false),
        ("plateau_pente", 2, true),
        ("order3", 3, false),
    ];
    for (name, order, plateau_pente) in variants {
        for n in [16, 32, 64] {
            let config = config(order, plateau_pente);
            let (mesh, state, sim) = setup_problem(n, n, &config);
            let layout = PhiLayout::new(2);
            let options = SweepOptions::new(2, &config.projection);
            let boundary = FluxBoundary::default();
            let next = state.next();
            let conserved = reassembly::conserved_from_fields(&mesh, layout, next, &state.masses);
            let face_velocity =
                face_normal_velocities(&mesh, Axis::X, &next.nodes.position, &state.reference_position, sim.next_dt);
            let pure = vec![None; n * n];

            group.bench_with_input(BenchmarkId::new(name, format!("{}_cells", n * n)), &n, |b, _| {
                b.iter(|| {
                    directional_sweep(
                        black_box(&mesh),
                        black_box(&options),
                        black_box(&boundary),
                        black_box(&SweepInput {
                            axis: Axis::X,
                            coords: &next.nodes.position,
                            face_velocity: &face_velocity,
                            conserved: &conserved,
                            pure_material: &pure,
                            dt: sim.next_dt,
                        }),
                    )
                });
            });
        }
    }

    group.finish();
}

/// Benchmark the complete projection: both sweeps, nodal remap, reassembly.
fn bench_full_remap(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_remap");
    group.sample_size(30);

    for n in [16, 32, 64] {
        let config = config(2, true);
        let (mesh, state, sim) = setup_problem(n, n, &config);
        let engine = RemapEngine::new(&config);

        group.bench_with_input(BenchmarkId::new("plateau_pente", format!("{}_cells", n * n)), &n, |b, _| {
            b.iter(|| {
                let mut work = state.clone();
                engine.remap(black_box(&mesh), black_box(&mut work), black_box(&sim))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_directional_sweep, bench_full_remap);
criterion_main!(benches);
