//! Benchmarks for the Lagrangian phase and full time steps.
//!
//! Run with: `cargo bench --bench lagrange_bench`

use ale_remap::lagrange::momentum::nodal_forces;
use ale_remap::{
    CartesianMesh2D, EnergySolver, HydroState, LagrangePhase, LagrangeScheme, MaterialEos, Scenario, Simulation,
    SimulationState, SolverConfig,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn setup_problem(n: usize, config: &SolverConfig) -> (CartesianMesh2D, LagrangePhase, HydroState) {
    let mesh = CartesianMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, n, n).unwrap();
    let lagrange = LagrangePhase::new(config);
    let mut state = HydroState::new(&mesh, config.nb_materials(), mesh.node_coordinates());
    Scenario::SodX.initialize(&mesh, lagrange.materials(), &mut state).unwrap();
    lagrange.initialize(&mesh, &mut state).unwrap();
    (mesh, lagrange, state)
}

/// Benchmark the corner-force assembly.
fn bench_nodal_forces(c: &mut Criterion) {
    let mut group = c.benchmark_group("nodal_forces");

    for n in [32, 64, 128] {
        let (mesh, _, state) = setup_problem(n, &SolverConfig::default());
        group.bench_with_input(BenchmarkId::new("sod", format!("{}_cells", n * n)), &n, |b, _| {
            b.iter(|| nodal_forces(black_box(&mesh), black_box(&state.current().cells)));
        });
    }

    group.finish();
}

/// Benchmark one Lagrangian step per scheme and energy solver.
fn bench_lagrange_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("lagrange_step");

    let variants = [
        ("vnr_newton", LagrangeScheme::Vnr, EnergySolver::Newton),
        ("vnr_closed_form", LagrangeScheme::Vnr, EnergySolver::ClosedForm),
        ("csts_newton", LagrangeScheme::Csts, EnergySolver::Newton),
    ];
    for (name, scheme, energy_solver) in variants {
        for n in [32, 64] {
            let config = SolverConfig {
                scheme,
                energy_solver,
                ..SolverConfig::default()
            };
            let (mesh, lagrange, state) = setup_problem(n, &config);
            let mut sim = SimulationState::starting_with(1e-4);
            sim.next_time = sim.next_dt;

            group.bench_with_input(BenchmarkId::new(name, format!("{}_cells", n * n)), &n, |b, _| {
                b.iter(|| {
                    let mut work = state.clone();
                    lagrange.advance(black_box(&mesh), black_box(&mut work), black_box(&sim))
                });
            });
        }
    }

    group.finish();
}

/// Benchmark ten complete steps with and without projection.
fn bench_full_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_steps");
    group.sample_size(20);

    for projection in [false, true] {
        let name = if projection { "ale" } else { "lagrangian" };
        let mut config = SolverConfig {
            materials: vec![MaterialEos::perfect_gas(1.4), MaterialEos::perfect_gas(1.4)],
            max_iterations: 10,
            deltat_init: Some(1e-4),
            ..SolverConfig::default()
        };
        config.projection.enabled = projection;
        config.projection.plateau_pente = projection;

        group.bench_function(BenchmarkId::new(name, "bi_sod_32x32"), |b| {
            b.iter(|| {
                let mesh = CartesianMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 32, 32).unwrap();
                let mut sim = Simulation::new(config.clone(), mesh, Scenario::BiSodX).unwrap();
                black_box(sim.run().unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_nodal_forces, bench_lagrange_step, bench_full_steps);
criterion_main!(benches);
