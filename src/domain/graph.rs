//! Dependency graph for plugin definitions
//!
//! Static view of "who needs whom" across a set of definitions. Nothing is
//! instantiated here; the registry and the CLI use it to report missing
//! dependencies, cycles and the order in which `require` would build plugins.
//! Uses petgraph for graph operations.

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap, HashSet};
use thiserror::Error;

use super::key::{format_chain, PluginKey};

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Plugin not defined: {0}")]
    PluginNotFound(PluginKey),

    #[error("Plugin '{plugin}' depends on undefined plugin '{missing}'")]
    MissingDependency { plugin: PluginKey, missing: PluginKey },

    #[error("Circular dependency: {}", format_chain(.0))]
    Cycle(Vec<PluginKey>),
}

/// A dependency graph over plugin keys
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Edges run dependency -> dependent
    graph: DiGraph<PluginKey, ()>,

    /// Map from key to node index
    node_map: HashMap<PluginKey, NodeIndex>,

    /// Dependencies in declared order (including undefined ones)
    declared: HashMap<PluginKey, Vec<PluginKey>>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from `(key, dependencies)` pairs
    ///
    /// Dependencies that name keys outside the set are kept as declared but
    /// produce no edge; see [`DependencyGraph::missing_dependencies`].
    pub fn from_entries(entries: impl IntoIterator<Item = (PluginKey, Vec<PluginKey>)>) -> Self {
        let mut graph = Self::new();

        // First pass: add all nodes
        let entries: Vec<_> = entries.into_iter().collect();
        for (key, _) in &entries {
            graph.add_plugin(key.clone());
        }

        // Second pass: add all edges
        for (key, deps) in entries {
            let plugin_idx = graph.node_map[&key];
            for dep in &deps {
                if let Some(dep_idx) = graph.node_map.get(dep) {
                    graph.graph.update_edge(*dep_idx, plugin_idx, ());
                }
            }
            graph.declared.insert(key, deps);
        }

        graph
    }

    fn add_plugin(&mut self, key: PluginKey) {
        if !self.node_map.contains_key(&key) {
            let idx = self.graph.add_node(key.clone());
            self.node_map.insert(key.clone(), idx);
            self.declared.entry(key).or_default();
        }
    }

    /// Returns `(plugin, missing)` pairs for dependencies on undefined keys, sorted
    pub fn missing_dependencies(&self) -> Vec<(PluginKey, PluginKey)> {
        self.declared
            .iter()
            .flat_map(|(plugin, deps)| {
                deps.iter()
                    .filter(|dep| !self.node_map.contains_key(*dep))
                    .map(move |dep| (plugin.clone(), dep.clone()))
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Returns every cycle as a sorted list of the keys involved
    ///
    /// A plugin that depends on itself is reported as a one-key cycle.
    pub fn cycles(&self) -> Vec<Vec<PluginKey>> {
        let mut cycles: Vec<Vec<PluginKey>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || self.graph.find_edge(scc[0], scc[0]).is_some()
            })
            .map(|scc| {
                let mut keys: Vec<_> = scc
                    .into_iter()
                    .filter_map(|idx| self.graph.node_weight(idx).cloned())
                    .collect();
                keys.sort();
                keys
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Checks that every dependency is defined and the graph is acyclic
    pub fn validate(&self) -> Result<(), GraphError> {
        if let Some((plugin, missing)) = self.missing_dependencies().into_iter().next() {
            return Err(GraphError::MissingDependency { plugin, missing });
        }

        if let Some(cycle) = self.cycles().into_iter().next() {
            return Err(GraphError::Cycle(cycle));
        }

        Ok(())
    }

    /// Returns the direct dependencies of a plugin, in declared order
    pub fn dependencies(&self, key: &PluginKey) -> Vec<PluginKey> {
        self.declared.get(key).cloned().unwrap_or_default()
    }

    /// Returns the direct dependents of a plugin (plugins that depend on it), sorted
    pub fn dependents(&self, key: &PluginKey) -> Vec<PluginKey> {
        let idx = match self.node_map.get(key) {
            Some(idx) => *idx,
            None => return vec![],
        };

        let mut dependents: Vec<_> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .filter_map(|idx| self.graph.node_weight(idx).cloned())
            .collect();
        dependents.sort();
        dependents
    }

    /// Returns the order in which `require(key)` first builds each plugin
    ///
    /// Depth-first post-order following declared dependency order; each key
    /// appears once and `key` itself comes last.
    pub fn resolution_order(&self, key: &PluginKey) -> Result<Vec<PluginKey>, GraphError> {
        if !self.node_map.contains_key(key) {
            return Err(GraphError::PluginNotFound(key.clone()));
        }

        let mut order = Vec::new();
        let mut done = HashSet::new();
        let mut stack = Vec::new();
        self.visit(key, &mut stack, &mut done, &mut order)?;
        Ok(order)
    }

    fn visit(
        &self,
        key: &PluginKey,
        stack: &mut Vec<PluginKey>,
        done: &mut HashSet<PluginKey>,
        order: &mut Vec<PluginKey>,
    ) -> Result<(), GraphError> {
        if done.contains(key) {
            return Ok(());
        }

        if let Some(pos) = stack.iter().position(|k| k == key) {
            let mut chain = stack[pos..].to_vec();
            chain.push(key.clone());
            return Err(GraphError::Cycle(chain));
        }

        stack.push(key.clone());
        for dep in self.declared.get(key).into_iter().flatten() {
            if !self.node_map.contains_key(dep) {
                return Err(GraphError::MissingDependency {
                    plugin: key.clone(),
                    missing: dep.clone(),
                });
            }
            self.visit(dep, stack, done, order)?;
        }
        stack.pop();

        done.insert(key.clone());
        order.push(key.clone());
        Ok(())
    }

    /// Returns all plugins in topological order (dependencies before dependents)
    pub fn topological_order(&self) -> Result<Vec<PluginKey>, GraphError> {
        match toposort(&self.graph, None) {
            Ok(order) => Ok(order
                .into_iter()
                .filter_map(|idx| self.graph.node_weight(idx).cloned())
                .collect()),
            Err(cycle) => {
                let chain = self
                    .cycles()
                    .into_iter()
                    .next()
                    .or_else(|| self.graph.node_weight(cycle.node_id()).cloned().map(|k| vec![k]))
                    .unwrap_or_default();
                Err(GraphError::Cycle(chain))
            }
        }
    }

    /// Returns true if the graph contains the plugin
    pub fn contains(&self, key: &PluginKey) -> bool {
        self.node_map.contains_key(key)
    }

    /// Returns the number of plugins in the graph
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    /// Returns all plugin keys in the graph
    pub fn keys(&self) -> impl Iterator<Item = &PluginKey> {
        self.node_map.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> PluginKey {
        PluginKey::new(s).unwrap()
    }

    fn entry(k: &str, deps: &[&str]) -> (PluginKey, Vec<PluginKey>) {
        (key(k), deps.iter().map(|d| key(d)).collect())
    }

    #[test]
    fn empty_graph() {
        let graph = DependencyGraph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.len(), 0);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn dependencies_keep_declared_order() {
        let graph = DependencyGraph::from_entries([
            entry("x", &["b", "a"]),
            entry("a", &[]),
            entry("b", &[]),
        ]);

        assert_eq!(graph.dependencies(&key("x")), vec![key("b"), key("a")]);
        assert_eq!(graph.dependents(&key("a")), vec![key("x")]);
        assert!(graph.dependencies(&key("nope")).is_empty());
    }

    #[test]
    fn missing_dependencies_are_reported() {
        let graph = DependencyGraph::from_entries([
            entry("ajax", &["util", "json"]),
            entry("util", &[]),
        ]);

        assert_eq!(graph.missing_dependencies(), vec![(key("ajax"), key("json"))]);
        assert_eq!(
            graph.validate(),
            Err(GraphError::MissingDependency {
                plugin: key("ajax"),
                missing: key("json"),
            })
        );
    }

    #[test]
    fn cycle_detection() {
        let graph = DependencyGraph::from_entries([
            entry("a", &["c"]),
            entry("b", &["a"]),
            entry("c", &["b"]),
            entry("d", &[]),
        ]);

        assert_eq!(graph.cycles(), vec![vec![key("a"), key("b"), key("c")]]);
        assert!(matches!(graph.validate(), Err(GraphError::Cycle(_))));
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let graph = DependencyGraph::from_entries([entry("a", &["a"])]);

        assert_eq!(graph.cycles(), vec![vec![key("a")]]);
        assert_eq!(
            graph.resolution_order(&key("a")),
            Err(GraphError::Cycle(vec![key("a"), key("a")]))
        );
    }

    #[test]
    fn resolution_order_is_depth_first_post_order() {
        // x -> [a, b], a -> [c], b -> [c]
        let graph = DependencyGraph::from_entries([
            entry("x", &["a", "b"]),
            entry("a", &["c"]),
            entry("b", &["c"]),
            entry("c", &[]),
        ]);

        let order = graph.resolution_order(&key("x")).unwrap();
        assert_eq!(order, vec![key("c"), key("a"), key("b"), key("x")]);
    }

    #[test]
    fn resolution_order_reports_cycle_chain() {
        let graph = DependencyGraph::from_entries([
            entry("root", &["a"]),
            entry("a", &["b"]),
            entry("b", &["a"]),
        ]);

        assert_eq!(
            graph.resolution_order(&key("root")),
            Err(GraphError::Cycle(vec![key("a"), key("b"), key("a")]))
        );
    }

    #[test]
    fn resolution_order_of_unknown_plugin() {
        let graph = DependencyGraph::from_entries([entry("a", &[])]);
        assert_eq!(
            graph.resolution_order(&key("zzz")),
            Err(GraphError::PluginNotFound(key("zzz")))
        );
    }

    #[test]
    fn resolution_order_with_missing_dependency() {
        let graph = DependencyGraph::from_entries([entry("a", &["ghost"])]);
        assert_eq!(
            graph.resolution_order(&key("a")),
            Err(GraphError::MissingDependency {
                plugin: key("a"),
                missing: key("ghost"),
            })
        );
    }

    #[test]
    fn topological_order() {
        let graph = DependencyGraph::from_entries([
            entry("i18n", &["ajax"]),
            entry("ajax", &["util"]),
            entry("util", &[]),
        ]);

        let order = graph.topological_order().unwrap();
        let pos = |k: &str| order.iter().position(|o| o == &key(k)).unwrap();

        assert!(pos("util") < pos("ajax"));
        assert!(pos("ajax") < pos("i18n"));
    }

    #[test]
    fn topological_order_fails_on_cycle() {
        let graph = DependencyGraph::from_entries([entry("a", &["b"]), entry("b", &["a"])]);
        assert_eq!(
            graph.topological_order(),
            Err(GraphError::Cycle(vec![key("a"), key("b")]))
        );
    }

    #[test]
    fn duplicate_dependency_makes_one_edge() {
        let graph = DependencyGraph::from_entries([entry("x", &["a", "a"]), entry("a", &[])]);

        assert_eq!(graph.dependents(&key("a")), vec![key("x")]);
        assert_eq!(graph.dependencies(&key("x")).len(), 2);
        assert_eq!(graph.resolution_order(&key("x")).unwrap(), vec![key("a"), key("x")]);
    }

    #[test]
    fn performance_500_plugins() {
        use std::time::Instant;

        let keys: Vec<_> = (0..500).map(|i| key(&format!("p{}", i))).collect();
        let entries = keys.iter().enumerate().map(|(i, k)| {
            let deps = if i == 0 { vec![] } else { vec![keys[i - 1].clone()] };
            (k.clone(), deps)
        });
        let graph = DependencyGraph::from_entries(entries);

        let start = Instant::now();
        let order = graph.resolution_order(&keys[499]).unwrap();
        let duration = start.elapsed();

        assert_eq!(order.len(), 500);
        assert!(duration.as_millis() < 50, "Resolution order took {:?}", duration);
    }
}
