//! Manifest validation

use anyhow::Result;

use super::output::Output;
use super::session::Session;
use crate::domain::PluginKey;

/// Reports every missing dependency and cycle; fails if there is any
pub fn run(session: &Session, output: &Output) -> Result<()> {
    let graph = session.manifest.graph();
    let missing = graph.missing_dependencies();
    let cycles = graph.cycles();
    let problems = missing.len() + cycles.len();

    output.verbose_ctx(
        "check",
        &format!(
            "{} plugin(s), {} missing dependency(ies), {} cycle(s)",
            graph.len(),
            missing.len(),
            cycles.len()
        ),
    );

    if output.is_json() {
        let missing: Vec<_> = missing
            .iter()
            .map(|(plugin, dep)| serde_json::json!({ "plugin": plugin, "missing": dep }))
            .collect();
        output.data(&serde_json::json!({
            "manifest": session.manifest_path.display().to_string(),
            "valid": problems == 0,
            "plugins": graph.len(),
            "missing": missing,
            "cycles": cycles,
        }));
    } else {
        for (plugin, dep) in &missing {
            println!("missing: '{}' depends on undefined plugin '{}'", plugin, dep);
        }
        for cycle in &cycles {
            let members: Vec<_> = cycle.iter().map(PluginKey::as_str).collect();
            println!("cycle: {}", members.join(", "));
        }
    }

    if problems > 0 {
        anyhow::bail!(
            "Manifest {} has {} problem(s)",
            session.manifest_path.display(),
            problems
        );
    }

    if !output.is_json() {
        output.success(&format!(
            "Manifest OK: {} plugin(s), no missing dependencies, no cycles",
            graph.len()
        ));
    }

    Ok(())
}
