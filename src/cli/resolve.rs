//! Simulated `require` against a manifest
//!
//! Installs the manifest into a fresh registry and requires one plugin a
//! number of times, showing which calls built a new instance and which got
//! the cached singleton.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use super::output::Output;
use super::session::Session;
use crate::registry::{DeclaredScope, Instance};

#[derive(Debug, Serialize)]
struct RequireCall {
    call: u32,
    reused: bool,
    scope: DeclaredScope,
}

/// Parses `--arg` values as JSON, falling back to a plain string
pub fn parse_init_args(raw: &[String]) -> Vec<Value> {
    raw.iter()
        .map(|arg| serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.clone())))
        .collect()
}

pub fn run(session: &Session, output: &Output, key: &str, args: &[String], times: u32) -> Result<()> {
    let init_args = parse_init_args(args);
    let mut registry = session.registry()?;

    output.verbose_ctx(
        "resolve",
        &format!("Requiring '{}' {} time(s) with {} init arg(s)", key, times, init_args.len()),
    );

    let mut seen: Vec<Instance> = Vec::new();
    let mut calls = Vec::new();

    for call in 1..=times {
        let instance = registry
            .require(key, &init_args)
            .with_context(|| format!("Failed to require '{}'", key))?;

        let reused = seen.iter().any(|prev| Instance::ptr_eq(prev, &instance));
        let scope = instance
            .downcast_ref::<DeclaredScope>()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Plugin '{}' is not a declared plugin", key))?;

        calls.push(RequireCall { call, reused, scope });
        seen.push(instance);
    }

    let cached: Vec<_> = registry
        .keys()
        .into_iter()
        .filter(|k| registry.is_instantiated(k.as_str()))
        .cloned()
        .collect();

    if output.is_json() {
        output.data(&serde_json::json!({
            "key": key,
            "calls": calls,
            "cached_singletons": cached,
        }));
        return Ok(());
    }

    for call in &calls {
        let scope = &call.scope;
        println!(
            "require #{:<3} {} -> instance #{} ({})",
            call.call,
            key,
            scope.serial,
            if call.reused { "cached singleton" } else { "built" }
        );
        if !call.reused {
            for dep in &scope.dependencies {
                match dep.serial {
                    Some(serial) => println!("    dep {} -> instance #{}", dep.key, serial),
                    None => println!("    dep {}", dep.key),
                }
            }
            if let Some(args) = &scope.init_args {
                if !args.is_empty() {
                    println!("    init {}", Value::Array(args.clone()));
                }
            }
        }
    }

    println!();
    if cached.is_empty() {
        println!("No singletons cached");
    } else {
        let names: Vec<_> = cached.iter().map(|k| k.as_str()).collect();
        println!("Cached singletons: {}", names.join(", "));
    }

    Ok(())
}
