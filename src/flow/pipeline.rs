// SPDX-License-Identifier: MIT

//! Step pipelines
//!
//! A pipeline is a small directed graph of named steps with one entry, one
//! or more finish points and, optionally, conditional dispatchers that pick
//! the next step from the current state. All wiring is checked when the
//! pipeline is built, so a pipeline that exists is a pipeline that can run.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use super::error::FlowError;
use super::state::WorkflowState;
use super::step::Step;

/// Function choosing the next step from the current state
pub type DispatchFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// Conditional routing attached to a single step
struct Dispatcher<S> {
    /// Every name `route` may return
    targets: Vec<String>,
    route: DispatchFn<S>,
}

/// Outgoing transition of a step
enum Transition<S> {
    Edge(String),
    Conditional(Dispatcher<S>),
    Finish,
}

impl<S> Transition<S> {
    fn successors(&self) -> Vec<&str> {
        match self {
            Transition::Edge(to) => vec![to.as_str()],
            Transition::Conditional(d) => d.targets.iter().map(|t| t.as_str()).collect(),
            Transition::Finish => vec![],
        }
    }
}

/// A validated, runnable pipeline
pub struct Pipeline<S: WorkflowState> {
    id: String,
    entry: String,
    steps: HashMap<String, Arc<dyn Step<S>>>,
    order: Vec<String>,
    transitions: HashMap<String, Transition<S>>,
}

impl<S: WorkflowState> Pipeline<S> {
    /// Start building a pipeline
    pub fn builder(id: impl Into<String>) -> PipelineBuilder<S> {
        PipelineBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Step names in registration order
    pub fn step_names(&self) -> &[String] {
        &self.order
    }

    pub fn step(&self, name: &str) -> Option<&Arc<dyn Step<S>>> {
        self.steps.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    pub fn is_finish_point(&self, name: &str) -> bool {
        matches!(self.transitions.get(name), Some(Transition::Finish))
    }

    /// Finish points in registration order
    pub fn finish_points(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|name| self.is_finish_point(name))
            .map(|s| s.as_str())
            .collect()
    }

    /// Resolve the step after `from`; `None` once a finish point completes.
    pub fn next_step(&self, from: &str, state: &S) -> Result<Option<String>, FlowError> {
        match self.transitions.get(from) {
            None => Err(FlowError::UnknownStep {
                pipeline: self.id.clone(),
                step: from.to_string(),
            }),
            Some(Transition::Finish) => Ok(None),
            Some(Transition::Edge(to)) => Ok(Some(to.clone())),
            Some(Transition::Conditional(dispatcher)) => {
                let target = (dispatcher.route)(state);
                if dispatcher.targets.contains(&target) {
                    Ok(Some(target))
                } else {
                    Err(FlowError::UnknownDispatchTarget {
                        step: from.to_string(),
                        target,
                    })
                }
            }
        }
    }
}

/// Builder for [`Pipeline`]. Wiring mistakes are reported by [`build`](Self::build).
pub struct PipelineBuilder<S: WorkflowState> {
    id: String,
    entry: Option<String>,
    steps: Vec<Arc<dyn Step<S>>>,
    edges: Vec<(String, String)>,
    conditionals: Vec<(String, Dispatcher<S>)>,
    finish: Vec<String>,
}

impl<S: WorkflowState> PipelineBuilder<S> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entry: None,
            steps: Vec::new(),
            edges: Vec::new(),
            conditionals: Vec::new(),
            finish: Vec::new(),
        }
    }

    /// Add a step
    pub fn add_step(mut self, step: impl Step<S> + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    /// Add an already shared step
    pub fn add_shared_step(mut self, step: Arc<dyn Step<S>>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn set_entry(mut self, name: impl Into<String>) -> Self {
        self.entry = Some(name.into());
        self
    }

    /// Unconditional successor
    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    /// Route from `from` with `route`, which must only ever return one of `targets`
    pub fn add_conditional_edges<F>(
        mut self,
        from: impl Into<String>,
        targets: &[&str],
        route: F,
    ) -> Self
    where
        F: Fn(&S) -> String + Send + Sync + 'static,
    {
        self.conditionals.push((
            from.into(),
            Dispatcher {
                targets: targets.iter().map(|t| t.to_string()).collect(),
                route: Arc::new(route),
            },
        ));
        self
    }

    /// Mark a step as terminal
    pub fn set_finish_point(mut self, name: impl Into<String>) -> Self {
        self.finish.push(name.into());
        self
    }

    /// Validate the wiring and produce a runnable pipeline
    pub fn build(self) -> Result<Pipeline<S>, FlowError> {
        let id = self.id;

        let mut steps: HashMap<String, Arc<dyn Step<S>>> = HashMap::new();
        let mut order = Vec::new();
        for step in self.steps {
            let name = step.name().to_string();
            if steps.contains_key(&name) {
                return Err(FlowError::DuplicateStep(name));
            }
            order.push(name.clone());
            steps.insert(name, step);
        }

        let unknown = |step: &str| FlowError::UnknownStep {
            pipeline: id.clone(),
            step: step.to_string(),
        };

        let entry = self.entry.ok_or_else(|| FlowError::MissingEntry(id.clone()))?;
        if !steps.contains_key(&entry) {
            return Err(unknown(&entry));
        }

        let mut transitions: HashMap<String, Transition<S>> = HashMap::new();
        let mut attach = |from: String, transition: Transition<S>| {
            if !steps.contains_key(&from) {
                return Err(unknown(&from));
            }
            if transitions.contains_key(&from) {
                return Err(FlowError::ConflictingTransition(from));
            }
            transitions.insert(from, transition);
            Ok(())
        };

        for (from, to) in self.edges {
            if !steps.contains_key(&to) {
                return Err(unknown(&to));
            }
            attach(from, Transition::Edge(to))?;
        }

        for (from, dispatcher) in self.conditionals {
            if let Some(target) = dispatcher.targets.iter().find(|t| !steps.contains_key(*t)) {
                return Err(FlowError::UnknownDispatchTarget {
                    step: from,
                    target: target.clone(),
                });
            }
            attach(from, Transition::Conditional(dispatcher))?;
        }

        if self.finish.is_empty() {
            return Err(FlowError::NoFinishPoint(id.clone()));
        }
        for name in self.finish {
            attach(name, Transition::Finish)?;
        }

        if let Some(dangling) = order.iter().find(|name| !transitions.contains_key(*name)) {
            return Err(FlowError::DanglingStep(dangling.clone()));
        }

        if let Some(cycle) = find_cycle(&order, &transitions) {
            return Err(FlowError::CircularDependency(cycle));
        }

        let reachable = reachable_from(&entry, &transitions);
        for name in order.iter().filter(|n| !reachable.contains(n.as_str())) {
            log::warn!(
                "Pipeline '{}': step '{}' is unreachable from '{}'",
                id,
                name,
                entry
            );
        }

        log::debug!("Built pipeline '{}' with {} steps", id, order.len());

        Ok(Pipeline {
            id,
            entry,
            steps,
            order,
            transitions,
        })
    }
}

/// Depth-first search for a cycle; returns the offending path if any
fn find_cycle<S>(
    order: &[String],
    transitions: &HashMap<String, Transition<S>>,
) -> Option<Vec<String>> {
    fn visit<'a, S>(
        node: &'a str,
        transitions: &'a HashMap<String, Transition<S>>,
        done: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        if let Some(pos) = path.iter().position(|n| *n == node) {
            let mut cycle: Vec<String> = path[pos..].iter().map(|s| s.to_string()).collect();
            cycle.push(node.to_string());
            return Some(cycle);
        }
        if done.contains(node) {
            return None;
        }

        path.push(node);
        if let Some(transition) = transitions.get(node) {
            for next in transition.successors() {
                if let Some(cycle) = visit(next, transitions, done, path) {
                    return Some(cycle);
                }
            }
        }
        path.pop();
        done.insert(node);
        None
    }

    let mut done = HashSet::new();
    for name in order {
        let mut path = Vec::new();
        if let Some(cycle) = visit(name.as_str(), transitions, &mut done, &mut path) {
            return Some(cycle);
        }
    }
    None
}

fn reachable_from<'a, S>(
    entry: &'a str,
    transitions: &'a HashMap<String, Transition<S>>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([entry]);
    while let Some(node) = queue.pop_front() {
        if !seen.insert(node) {
            continue;
        }
        if let Some(transition) = transitions.get(node) {
            queue.extend(transition.successors());
        }
    }
    seen
}
