//! Demonstration of the structural analyses on a small MIMO system
//!
//! Runs controllability, observability, minimality, transmission zeros and
//! pole/zero directions on a 3-state, 2-input, 2-output realization.
//!
//! Set `RUST_LOG=linsys_rs=debug` to see the analysis log.

use linsys_rs::analysis::{
    state_controllability, state_observability_with, AnalysisOptions, ObservabilityTest,
};
use linsys_rs::directions::{
    pole_zero_directions, DirectionDisplay, PoleZeroDirection, PoleZeroKind, DEFAULT_POLE_EPSILON,
};
use linsys_rs::linalg::LapackEigen;
use linsys_rs::system::StateSpace;
use ndarray::{arr2, Array1};
use num_complex::Complex64;
use tracing_subscriber::EnvFilter;

fn print_vector(label: &str, v: &Array1<Complex64>) {
    print!("    {label} = [");
    for x in v.iter() {
        print!(" {:8.4}{:+8.4}j", x.re, x.im);
    }
    println!(" ]");
}

fn main() -> linsys_rs::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("linsys_rs=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("=== Structural Analysis Demonstration ===\n");

    // Three first-order lags; the third state couples both inputs and outputs
    let sys = StateSpace::new(
        arr2(&[[-1.0, 0.0, 0.0], [0.0, -2.0, 0.0], [0.0, 0.0, -3.0]]),
        arr2(&[[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]),
        arr2(&[[1.0, 0.0, 1.0], [0.0, 1.0, 1.0]]),
        None,
    )?;

    println!("A = \n{:?}", sys.a());
    println!("B = \n{:?}", sys.b());
    println!("C = \n{:?}", sys.c());

    let ctrb = state_controllability(sys.a(), sys.b())?;
    println!("\n=== Controllability ===");
    println!("  controllable: {}", ctrb.controllable);
    for pv in &ctrb.input_pole_vectors {
        println!("  pole {:.4}: ‖u_p‖ = {:.4}", pv.eigenvalue, pv.norm());
    }
    println!("  rank of controllability matrix: {}", ctrb.matrix_rank(None)?);

    // The norm test avoids the component-sum blind spot for outputs like [1, −1]
    let options = AnalysisOptions::default().with_observability_test(ObservabilityTest::Norm);
    let obsv = state_observability_with(sys.a(), sys.c(), &options, &LapackEigen)?;
    println!("\n=== Observability ===");
    println!("  observable: {}", obsv.observable);
    for pv in &obsv.output_pole_vectors {
        println!("  pole {:.4}: y_p = {:?}", pv.eigenvalue, pv.direction.to_vec());
    }
    println!("  rank of observability matrix: {}", obsv.matrix_rank(None)?);

    println!("\nMinimal realization: {}", sys.is_minimal_realization()?);

    println!("\n=== Transmission Zeros ===");
    let zeros = sys.zeros()?;
    if zeros.is_empty() {
        println!("  none");
    }
    for z in &zeros {
        println!("  z = {} (multiplicity {})", z.root, z.multiplicity);
    }

    println!("\n=== Pole Directions ===");
    let poles = sys.poles()?.to_vec();
    let pole_dirs = pole_zero_directions(
        &sys,
        &poles,
        PoleZeroKind::Pole,
        DirectionDisplay::All,
        DEFAULT_POLE_EPSILON,
    )?;
    for dir in &pole_dirs {
        if let PoleZeroDirection::Full {
            location,
            input,
            output,
        } = dir
        {
            println!("  pole {:.4}", location);
            print_vector("u", input);
            print_vector("y", output);
        }
    }

    println!("\n=== Zero Directions ===");
    let zero_locations: Vec<Complex64> = zeros.iter().map(|z| z.root.to_complex()).collect();
    let zero_dirs = pole_zero_directions(
        &sys,
        &zero_locations,
        PoleZeroKind::Zero,
        DirectionDisplay::All,
        0.0,
    )?;
    for dir in &zero_dirs {
        if let PoleZeroDirection::Full {
            location,
            input,
            output,
        } = dir
        {
            println!("  zero {:.4}", location);
            print_vector("u", input);
            print_vector("y", output);
        }
    }

    Ok(())
}
