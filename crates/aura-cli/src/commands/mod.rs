pub mod check;
pub mod export;
pub mod generate;
pub mod run;

use std::path::Path;

use aura_sim::{Scenario, Simulation};
use tracing::debug;

/// Load a scenario file and build its simulation.
fn load(path: &Path) -> Result<(Scenario, Simulation), String> {
    let scenario = Scenario::load(path).map_err(|e| e.to_string())?;
    let sim = scenario
        .build()
        .map_err(|e| format!("invalid scenario {}: {e}", path.display()))?;
    debug!(path = %path.display(), passes = sim.passes().len(), "scenario loaded");
    Ok((scenario, sim))
}

/// Write `content` to `output`, or to stdout.
fn emit(content: &str, output: Option<&Path>) -> Result<(), String> {
    if let Some(path) = output {
        std::fs::write(path, content)
            .map_err(|e| format!("cannot write to {}: {e}", path.display()))?;
        println!("  Written to {}", path.display());
    } else {
        print!("{content}");
    }
    Ok(())
}
