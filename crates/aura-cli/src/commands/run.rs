use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use aura_core::{Catalog, Entity};
use aura_sim::SimEventKind;

pub fn run(path: &Path, ticks: u64, verbose: bool) -> Result<(), String> {
    let (scenario, mut sim) = super::load(path)?;
    sim.run(ticks);

    let map_id = scenario.map_id();
    let map = sim
        .map(map_id)
        .ok_or_else(|| format!("map {map_id} missing after run"))?;

    // Header
    println!(
        "  {} '{}' {}",
        "Simulation".bold(),
        path.display(),
        format!(
            "({ticks} ticks, {:.1} h, {} passes)",
            sim.clock().elapsed_hours(),
            sim.passes().len()
        )
        .dimmed()
    );
    println!(
        "  {} entities on {map_id}, {} events logged",
        map.len(),
        sim.events().len()
    );
    println!();

    // Events
    if verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in sim.events().events() {
            let tick_label = format!("[tick {:>5}]", event.tick).dimmed();
            let desc = colorize_event(&event.kind, &event.description);
            println!("  {tick_label} {desc}");
        }
        if sim.events().is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    } else {
        let skipped: Vec<_> = sim
            .events()
            .events()
            .iter()
            .filter(|e| matches!(e.kind, SimEventKind::PassSkipped { .. }))
            .collect();
        if !skipped.is_empty() {
            println!("  {}", "Skipped Passes".bold().underline());
            for event in &skipped {
                println!("  {}  {}", "WARN".yellow().bold(), event.description);
            }
            println!();
        }
    }

    // Effects table
    println!("  {}", "Active Effects".bold().underline());
    println!();

    let affected: Vec<&Entity> = map.population().filter(|e| !e.effects.is_empty()).collect();
    if affected.is_empty() {
        println!("  {}", "(none)".dimmed());
    } else {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Entity", "Category", "Position", "Effects"]);
        for entity in affected {
            table.add_row(vec![
                entity.name.clone(),
                entity.category.to_string(),
                entity.position().to_string(),
                format_effects(entity, sim.catalog()),
            ]);
        }
        println!("{table}");
    }
    println!();

    // Caches
    let ctx = sim
        .context(map_id)
        .ok_or_else(|| format!("map {map_id} has no context"))?;
    let mut keys: Vec<_> = ctx.cache().keys().collect();
    if !keys.is_empty() {
        keys.sort_unstable();
        println!("  {}", "Caches".bold().underline());
        println!();
        let mut table = Table::new();
        table.set_header(vec!["Cache", "Entries"]);
        for key in keys {
            table.add_row(vec![key.to_string(), ctx.cache().entries(key).to_string()]);
        }
        println!("{table}");
        println!();
    }

    Ok(())
}

fn format_effects(entity: &Entity, catalog: &Catalog) -> String {
    entity
        .effects
        .iter()
        .map(|effect| {
            let name = catalog
                .effect_name(effect.kind)
                .map_or_else(|| effect.kind.to_string(), str::to_string);
            match effect.remaining {
                Some(ticks) => format!("{name} ({ticks})"),
                None => name,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn colorize_event(kind: &SimEventKind, description: &str) -> colored::ColoredString {
    match kind {
        SimEventKind::EffectAttached { .. } => description.green(),
        SimEventKind::EffectRemoved { .. } => description.yellow(),
        SimEventKind::EffectExpired { .. } => description.red(),
        SimEventKind::CacheRebuilt { .. } => description.cyan(),
        SimEventKind::PassSkipped { .. } => description.yellow().bold(),
        SimEventKind::Custom { .. } => description.normal(),
    }
}
