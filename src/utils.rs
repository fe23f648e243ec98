//! Utility functions: seeding, timing and text reports.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use itertools::Itertools;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::solution::{RoutePlan, SolveResult};

/// Mix a seed string into a 64-bit seed.
///
/// Two multiplicative lanes are folded over the UTF-8 bytes so that short
/// seeds such as "1" and "2" land far apart.
pub fn seed_from_str(seed: &str) -> u64 {
    let mut h1: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut h2: u64 = 0xC2B2_AE3D_27D4_EB4F;

    for &b in seed.as_bytes() {
        h1 ^= b as u64;
        h1 = h1.wrapping_mul(0xBF58_476D_1CE4_E5B9);
        h2 ^= (b as u64) << 1;
        h2 = h2.wrapping_mul(0x94D0_49BB_1331_11EB);
    }

    h1 ^ h2
}

/// Create the random generator owned by one solve call.
pub fn create_rng(seed: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed_from_str(seed))
}

/// Wall-clock timer for a solve call.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start_new() -> Self {
        Stopwatch {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed time rounded down to whole milliseconds.
    pub fn elapsed_millis(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Format one route as `Vehicle v: a -> b -> c | load l | dist d`.
pub fn format_route(route: &RoutePlan) -> String {
    format!(
        "Vehicle {}: {} | load {} | dist {:.2}",
        route.vehicle,
        route.nodes.iter().join(" -> "),
        route.load,
        route.distance
    )
}

/// Render a result as a human-readable report.
pub fn format_result(result: &SolveResult, instance_id: &str) -> String {
    let mut lines = vec![
        format!("CVRP Solution for instance: {}", instance_id),
        format!("Runtime: {} ms", result.runtime_ms),
        format!("Distance: {:.2}", result.distance),
        format!("Feasible: {}", result.feasible),
        format!("Vehicles used: {}", result.vehicles_used),
    ];
    lines.extend(result.routes.iter().map(format_route));
    lines.join("\n")
}

/// Save a result report to a file.
pub fn save_result<P: AsRef<Path>>(
    result: &SolveResult,
    instance_id: &str,
    path: P,
) -> std::io::Result<()> {
    let mut file = File::create(path)?;

    writeln!(file, "{}", format_result(result, instance_id))?;
    writeln!(file)?;
    for line in &result.log {
        writeln!(file, "log: {}", line)?;
    }

    Ok(())
}
