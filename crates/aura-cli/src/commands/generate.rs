use std::path::Path;

use aura_sim::Scenario;

pub fn run(entities: usize, seed: u64, size: i32, output: Option<&Path>) -> Result<(), String> {
    if size <= 0 {
        return Err(format!("map size must be positive, got {size}"));
    }
    let scenario = Scenario::scatter(seed, entities, size);
    let content = scenario
        .to_toml()
        .map_err(|e| format!("cannot render scenario: {e}"))?;
    super::emit(&content, output)
}
