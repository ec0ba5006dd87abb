//! Kirchhoff - DC circuit solver
//!
//! Solves branch currents and voltages of a circuit given on the command line.
//!
//! # Usage
//!
//! ```bash
//! kirchhoff E:0:1:10 R:1:2:2.5 A:2:3 W:3:0 V:1:0
//! RUST_LOG=debug kirchhoff --demo
//! ```

use clap::Parser;
use kirchhoff_core::{
    circuit::{Circuit, ComponentSpec},
    error::Result,
    SolverConfig,
};

/// Components of the reference circuit: a 10 V cell driving 2.5 ohm through
/// an ammeter, with a voltmeter across the cell.
const DEMO: [&str; 5] = ["E:0:1:10", "R:1:2:2.5", "A:2:3", "W:3:0", "V:1:0"];

/// DC circuit solver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Components as KIND:TAIL:HEAD[:VALUE[:INTERNAL_R]], KIND one of W, R, E, A, V
    #[arg(value_name = "COMPONENT", required_unless_present = "demo")]
    components: Vec<String>,

    /// Solve the built-in reference circuit
    #[arg(long, conflicts_with = "components")]
    demo: bool,

    /// Check Kirchhoff's current law at every junction after solving
    #[arg(long)]
    verify_kcl: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let specs: Vec<&str> = if args.demo {
        DEMO.to_vec()
    } else {
        args.components.iter().map(String::as_str).collect()
    };

    // Build the circuit
    let config = SolverConfig::new().with_kcl_check(args.verify_kcl);
    let mut circuit = Circuit::with_config(config);
    for spec in specs {
        circuit.add_spec(spec.parse::<ComponentSpec>()?);
    }

    circuit.solve()?;

    print!("{circuit}");
    Ok(())
}
