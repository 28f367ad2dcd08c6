//! Execution order: a priority-aware topological sort.
//!
//! Among the modules whose dependencies have all run, the highest priority goes
//! next; equal priorities fall back to declaration order. Runs once, when the
//! orchestrator is built.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::composition::module::{Dependency, ModuleId, PromptModule};
use crate::errors::ConfigurationError;

/// A module reduced to what the scheduler needs. `after` holds indices of
/// nodes that must run first.
#[derive(Debug, Clone)]
pub struct ScheduleNode {
    pub name: String,
    pub priority: i32,
    pub after: Vec<usize>,
}

/// Resolves module dependencies to indices and returns the execution order.
pub fn resolve_order(modules: &[Box<dyn PromptModule>]) -> Result<Vec<usize>, ConfigurationError> {
    let mut index_of: HashMap<ModuleId, usize> = HashMap::new();
    for (index, module) in modules.iter().enumerate() {
        if index_of.insert(module.id(), index).is_some() {
            return Err(ConfigurationError::DuplicateModule(module.id().name()));
        }
    }

    let mut nodes = Vec::with_capacity(modules.len());
    for module in modules {
        let mut after = Vec::new();
        for dependency in module.dependencies() {
            match (dependency, index_of.get(&dependency.target())) {
                (_, Some(&index)) => after.push(index),
                (Dependency::Hard(target), None) => {
                    return Err(ConfigurationError::MissingDependency {
                        module: module.id().name(),
                        dependency: target.name(),
                    })
                }
                (Dependency::Soft(_), None) => {}
            }
        }
        nodes.push(ScheduleNode {
            name: module.id().name(),
            priority: module.priority(),
            after,
        });
    }

    order_nodes(&nodes)
}

/// Kahn's algorithm with a `(priority, earliest declaration)` max-heap as the ready set.
pub fn order_nodes(nodes: &[ScheduleNode]) -> Result<Vec<usize>, ConfigurationError> {
    let mut pending = vec![0usize; nodes.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];

    for (index, node) in nodes.iter().enumerate() {
        for &dep in &node.after {
            pending[index] += 1;
            dependents[dep].push(index);
        }
    }

    let mut ready: BinaryHeap<(i32, Reverse<usize>)> = nodes
        .iter()
        .enumerate()
        .filter(|(index, _)| pending[*index] == 0)
        .map(|(index, node)| (node.priority, Reverse(index)))
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some((_, Reverse(index))) = ready.pop() {
        order.push(index);
        for &dependent in &dependents[index] {
            pending[dependent] -= 1;
            if pending[dependent] == 0 {
                ready.push((nodes[dependent].priority, Reverse(dependent)));
            }
        }
    }

    if order.len() < nodes.len() {
        let stuck = nodes
            .iter()
            .enumerate()
            .filter(|(index, _)| pending[*index] > 0)
            .map(|(_, node)| node.name.clone())
            .collect();
        return Err(ConfigurationError::DependencyCycle(stuck));
    }

    Ok(order)
}
