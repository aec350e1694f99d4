//! Demo for the scalar autodiff graph.
//!
//! Builds the canonical `relu(a + b)` expression, runs the backward pass and
//! prints every node, then walks through a few more expressions checked
//! against finite differences.

use log::info;
use sg_core::{check_gradients, Graph, GradientCheck, NodeId};

const TOLERANCE: f64 = 1e-5;
const EPS: f64 = 1e-7;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut g = Graph::new();
    let a = g.leaf(2.0);
    let b = g.leaf(3.0);
    let c = g.add(a, b);
    let d = g.relu(c);

    g.backward(d);

    println!("{}", g[a]);
    println!("{}", g[b]);
    println!("{}", g[c]);
    println!("{}", g[d]);

    println!("\n=== Additional Examples ===\n");

    let mut failures = 0;

    // Example 1: power rule through a chain
    println!("1. Chain: z = (x + 1)^3");
    let check = check_gradients(
        |g, v| {
            let y = g.add(v[0], 1.0);
            g.pow(y, 3.0)
        },
        &[2.0],
        EPS,
    )?;
    failures += report(&["x"], &check);

    // Example 2: shared subexpressions
    println!("2. Diamond graph: z = (x + y) * (x - y) = x^2 - y^2");
    let check = check_gradients(
        |g, v| {
            let s = g.add(v[0], v[1]);
            let t = g.sub(v[0], v[1]);
            Ok(g.mul(s, t))
        },
        &[3.0, 2.0],
        EPS,
    )?;
    failures += report(&["x", "y"], &check);

    // Example 3: division and rectification
    println!("3. Rational: z = relu(x * y - 1) / (y^2 + 2)");
    let check = check_gradients(rational, &[1.5, 2.5], EPS)?;
    failures += report(&["x", "y"], &check);

    if failures > 0 {
        return Err(format!("{failures} example(s) exceeded tolerance {TOLERANCE:.0e}").into());
    }
    info!("all examples within tolerance {TOLERANCE:.0e}");
    Ok(())
}

fn rational(g: &mut Graph, v: &[NodeId]) -> sg_core::Result<NodeId> {
    let xy = g.mul(v[0], v[1]);
    let num = g.sub(xy, 1.0);
    let num = g.relu(num);
    let y2 = g.pow(v[1], 2.0)?;
    let den = g.add(y2, 2.0);
    Ok(g.div(num, den))
}

/// Print one example's gradients; returns 1 if it is out of tolerance.
fn report(names: &[&str], check: &GradientCheck) -> usize {
    println!("   z = {:.10}", check.value);
    for ((name, analytic), numeric) in names.iter().zip(&check.analytic).zip(&check.numeric) {
        println!("   dz/d{name} = {analytic:.10} (fd: {numeric:.10})");
    }

    let err = check.max_error();
    if err < TOLERANCE {
        println!("   PASS: max error {err:.2e}\n");
        0
    } else {
        println!("   FAIL: max error {err:.2e}\n");
        1
    }
}
