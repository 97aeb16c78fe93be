//! Read-only manifest commands: list, show, order

use anyhow::{Context, Result};

use super::output::Output;
use super::session::Session;
use crate::domain::PluginKey;

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

pub fn list(session: &Session, output: &Output) -> Result<()> {
    let mut entries: Vec<_> = session.manifest.plugins.iter().collect();
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    if output.is_json() {
        output.data(&entries);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No plugins declared in {}", session.manifest_path.display());
        return Ok(());
    }

    println!("{:<24} {:<10} DEPENDENCIES", "KEY", "SINGLETON");
    println!("{}", "-".repeat(70));
    for entry in &entries {
        let deps = entry
            .dependencies
            .iter()
            .map(PluginKey::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<24} {:<10} {}",
            entry.key,
            yes_no(entry.singleton),
            if deps.is_empty() { "-" } else { deps.as_str() }
        );
    }

    println!();
    println!("{} plugin(s)", entries.len());
    Ok(())
}

pub fn show(session: &Session, output: &Output, key: &str) -> Result<()> {
    let entry = session
        .manifest
        .get(key)
        .ok_or_else(|| anyhow::anyhow!("Plugin not declared: {}", key))?;

    let graph = session.manifest.graph();
    let dependents = graph.dependents(&entry.key);

    if output.is_json() {
        output.data(&serde_json::json!({
            "key": entry.key,
            "singleton": entry.singleton,
            "description": entry.description,
            "dependencies": entry.dependencies,
            "dependents": dependents,
        }));
        return Ok(());
    }

    println!("Plugin: {}", entry.key);
    if let Some(description) = &entry.description {
        println!("Description: {}", description);
    }
    println!("Singleton: {}", yes_no(entry.singleton));

    println!();
    if entry.dependencies.is_empty() {
        println!("Dependencies: none");
    } else {
        println!("Dependencies (factory argument order):");
        for (i, dep) in entry.dependencies.iter().enumerate() {
            let marker = if graph.contains(dep) { "" } else { "  (undefined)" };
            println!("  {}. {}{}", i + 1, dep, marker);
        }
    }

    if dependents.is_empty() {
        println!("Dependents: none");
    } else {
        println!("Dependents: {}", dependents.iter().map(PluginKey::as_str).collect::<Vec<_>>().join(", "));
    }

    Ok(())
}

pub fn order(session: &Session, output: &Output, key: &str) -> Result<()> {
    let key = PluginKey::new(key)?;
    let order = session
        .manifest
        .graph()
        .resolution_order(&key)
        .with_context(|| format!("Cannot resolve '{}'", key))?;

    output.verbose_ctx("order", &format!("{} plugin(s) in resolution order", order.len()));

    if output.is_json() {
        output.data(&order);
        return Ok(());
    }

    println!("Resolution order for '{}':", key);
    for (i, plugin) in order.iter().enumerate() {
        let singleton = session
            .manifest
            .get(plugin.as_str())
            .map(|e| e.singleton)
            .unwrap_or(false);
        println!(
            "  {:>3}. {}{}",
            i + 1,
            plugin,
            if singleton { "  [singleton]" } else { "" }
        );
    }

    Ok(())
}
