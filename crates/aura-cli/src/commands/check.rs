use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

pub fn run(path: &Path) -> Result<(), String> {
    let (scenario, sim) = super::load(path)?;
    let passes = sim.passes();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Pass", "Cadence", "Status"]);
    for (i, pass) in passes.iter().enumerate() {
        let status = match &pass.inert {
            Some(reason) => format!("inert: {reason}"),
            None => "ok".to_string(),
        };
        table.add_row(vec![
            (i + 1).to_string(),
            pass.name.clone(),
            pass.cadence.to_string(),
            status,
        ]);
    }
    println!("{table}");

    let inert = passes.iter().filter(|p| p.inert.is_some()).count();
    if inert > 0 {
        return Err(format!(
            "{inert} pass{} can never run",
            if inert == 1 { "" } else { "es" }
        ));
    }

    println!(
        "  {} for '{}'.",
        "All checks passed".green(),
        path.display()
    );
    println!(
        "  {} passes, {} effects, {} entities",
        passes.len(),
        sim.catalog().effect_count(),
        scenario.entities.len()
    );

    Ok(())
}
