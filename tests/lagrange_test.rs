//! Lagrangian phase and energy closure tests.

use ale_remap::lagrange::energy::{solve_corner_work, solve_vnr, CornerWorkInput, NewtonSettings, VnrEnergyInput};
use ale_remap::{
    compute_eos, CartesianMesh2D, EosError, EosKind, HydroError, HydroState, LagrangePhase, LagrangeReport,
    LagrangeScheme, MaterialEos, NewtonFailurePolicy, Scenario, SimulationState, SolverConfig, Vec2,
};

const SETTINGS: NewtonSettings = NewtonSettings {
    tolerance: 1e-10,
    max_iterations: 50,
};

#[test]
fn test_eos_newton_round_trip() {
    let cases = [
        (MaterialEos::perfect_gas(1.4), 1.0, 1.0),
        (MaterialEos::perfect_gas(5.0 / 3.0), 0.125, 0.1),
        (MaterialEos::stiffened_gas(4.4, 0.6), 1.5, 2.0),
    ];
    for (eos, density, pressure) in cases {
        // energy that yields `pressure`, perturbed so Newton has work to do
        let exact = match eos.kind {
            EosKind::StiffenedGas => (pressure + eos.gamma * eos.tension_limit) / ((eos.gamma - 1.0) * density),
            _ => pressure / ((eos.gamma - 1.0) * density),
        };
        let p_exact = eos.evaluate(density, exact).unwrap().pressure;
        assert!((p_exact - pressure).abs() < 1e-12);

        let input = VnrEnergyInput {
            energy_n: exact,
            pressure_n: p_exact,
            pseudo: 0.0,
            density_n: density,
            density_n1: density,
        };
        let solution = solve_vnr(&eos, &input, SETTINGS).unwrap();
        assert!(solution.converged, "{:?} did not converge", eos.kind);
        assert!(solution.iterations <= SETTINGS.max_iterations);
        assert!(
            (solution.eos.pressure - pressure).abs() < SETTINGS.tolerance,
            "{:?}: pressure {} instead of {pressure}",
            eos.kind,
            solution.eos.pressure
        );
    }
}

#[test]
fn test_compression_raises_energy_for_both_residuals() {
    let eos = MaterialEos::perfect_gas(1.4);
    let vnr = solve_vnr(
        &eos,
        &VnrEnergyInput {
            energy_n: 2.5,
            pressure_n: 1.0,
            pseudo: 0.0,
            density_n: 1.0,
            density_n1: 1.2,
        },
        SETTINGS,
    )
    .unwrap();
    assert!(vnr.converged && vnr.energy > 2.5);

    // Σ C·v·Δt < 0: the cell shrinks
    let corner = solve_corner_work(
        &eos,
        &CornerWorkInput {
            energy_n: 2.5,
            pressure_n: 1.0,
            pseudo_n: 0.0,
            pseudo_n1: 0.0,
            density_n1: 1.2,
            work_n: -0.1,
            work_n1: -0.1,
            mass: 1.0,
        },
        SETTINGS,
    )
    .unwrap();
    assert!(corner.converged && corner.energy > 2.5);
}

#[test]
fn test_solid_linear_is_rejected() {
    let err = compute_eos(EosKind::SolidLinear, 1.4, 0.0, 1.0, 1.0).unwrap_err();
    assert_eq!(err, EosError::NotImplemented(EosKind::SolidLinear));
    assert!(matches!(EosKind::try_from(999), Err(EosError::UnknownCode(999))));
    assert_eq!(EosKind::try_from(102).unwrap(), EosKind::StiffenedGas);
}

fn advance_unit(scheme: LagrangeScheme, steps: usize) -> HydroState {
    let mesh = CartesianMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 4, 4).unwrap();
    let config = SolverConfig {
        scheme,
        ..SolverConfig::default()
    };
    let lagrange = LagrangePhase::new(&config);
    let mut state = HydroState::new(&mesh, 1, mesh.node_coordinates());
    Scenario::Unit.initialize(&mesh, lagrange.materials(), &mut state).unwrap();
    lagrange.initialize(&mesh, &mut state).unwrap();

    let mut sim = SimulationState::starting_with(lagrange.initial_time_step(&mesh, &state));
    for _ in 0..steps {
        if sim.step > 0 {
            sim.next_dt = lagrange.time_step(&mesh, &state, sim.dt).unwrap();
        }
        sim.next_time = sim.time + sim.next_dt;
        lagrange.advance(&mesh, &mut state, &sim).unwrap();
        state.fields.swap();
        sim.advance();
    }
    state
}

#[test]
fn test_uniform_state_is_steady() {
    for scheme in [LagrangeScheme::Vnr, LagrangeScheme::Csts] {
        let state = advance_unit(scheme, 2);
        let fields = state.current();
        for c in 0..fields.cells.n_cells() {
            assert!(
                (fields.cells.pressure[c] - 1.0).abs() < 1e-12,
                "{scheme:?}: pressure {} in cell {c}",
                fields.cells.pressure[c]
            );
            assert!((fields.cells.density[c] - 1.0).abs() < 1e-12);
            assert!((fields.cells.energy[c] - 2.5).abs() < 1e-12);
            assert!(fields.cells.pseudo[c].abs() < 1e-12);
        }
        let momentum = fields
            .nodes
            .velocity
            .iter()
            .zip(&state.masses.node)
            .fold(Vec2::ZERO, |acc, (v, m)| acc + *v * *m);
        assert!(momentum.norm() < 1e-12, "{scheme:?}: net momentum {momentum:?}");
    }
}

#[test]
fn test_negative_density_aborts() {
    let mesh = CartesianMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 2, 2).unwrap();
    let config = SolverConfig::default();
    let lagrange = LagrangePhase::new(&config);
    let mut state = HydroState::new(&mesh, 1, mesh.node_coordinates());
    Scenario::Unit.initialize(&mesh, lagrange.materials(), &mut state).unwrap();
    lagrange.initialize(&mesh, &mut state).unwrap();

    // inverted cell: the centre node is driven through the far corner
    let centre = mesh.node_at(1, 1).get();
    state.fields.current_mut().nodes.velocity[centre] = Vec2::new(-1e3, -1e3);
    let sim = SimulationState::starting_with(1.0);
    let err = lagrange.advance(&mesh, &mut state, &sim).unwrap_err();
    assert!(
        matches!(err, HydroError::NegativeDensity { material: 0, .. }),
        "unexpected error {err}"
    );
}

/// One compressive step of the unit state with a single Newton iteration
/// allowed and a tolerance no solve can meet.
fn capped_newton_step(policy: NewtonFailurePolicy) -> Result<LagrangeReport, HydroError> {
    let mesh = CartesianMesh2D::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 4, 4).unwrap();
    let config = SolverConfig {
        threshold: 1e-300,
        newton_max_iterations: 1,
        newton_failure: policy,
        ..SolverConfig::default()
    };
    let lagrange = LagrangePhase::new(&config);
    let mut state = HydroState::new(&mesh, 1, mesh.node_coordinates());
    Scenario::Unit.initialize(&mesh, lagrange.materials(), &mut state).unwrap();
    lagrange.initialize(&mesh, &mut state).unwrap();

    let reference = state.reference_position.clone();
    state.fields.current_mut().nodes.velocity = reference
        .iter()
        .map(|p| Vec2::new(0.5 - p.x, 0.5 - p.y) * 0.1)
        .collect();
    let mut sim = SimulationState::starting_with(1e-3);
    sim.next_time = sim.next_dt;
    lagrange.advance(&mesh, &mut state, &sim)
}

#[test]
fn test_newton_failure_policies() {
    let report = capped_newton_step(NewtonFailurePolicy::Warn).unwrap();
    assert!(report.newton_failures > 0);

    let err = capped_newton_step(NewtonFailurePolicy::Abort).unwrap_err();
    assert!(
        matches!(err, HydroError::NewtonDivergence { cells } if cells == report.newton_failures),
        "unexpected error {err}"
    );
}
