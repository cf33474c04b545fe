//! The workflow graph: tasks, ordering edges and the exported manifest.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use petgraph::algo::{has_path_connecting, toposort};
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::config::ScheduleConfig;
use crate::dag::phase::Phase;
use crate::dag::task::Task;
use crate::error::{Error, Result};

/// A directed acyclic graph of warehouse loading tasks.
///
/// Edges mean "must complete before". The graph is assembled once at parse
/// time and handed to the external scheduler as a [`DagState`] manifest;
/// nothing here executes tasks or tracks run state.
pub struct VaultDag {
    id: String,
    schedule: ScheduleConfig,
    graph: DiGraph<String, ()>, // node weight = task id
    tasks: HashMap<String, Task>,
    indices: HashMap<String, NodeIndex>,
}

impl VaultDag {
    pub fn new(id: impl Into<String>, schedule: ScheduleConfig) -> Self {
        Self {
            id: id.into(),
            schedule,
            graph: DiGraph::new(),
            tasks: HashMap::new(),
            indices: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn schedule(&self) -> &ScheduleConfig {
        &self.schedule
    }

    /// Add a task to the DAG.
    ///
    /// Task ids are unique within a DAG; registering an id twice is an
    /// error, never a silent merge.
    pub fn add_task(&mut self, task: Task) -> Result<()> {
        if self.tasks.contains_key(&task.id) {
            return Err(Error::DuplicateTask(task.id));
        }

        let idx = self.graph.add_node(task.id.clone());
        self.indices.insert(task.id.clone(), idx);
        self.tasks.insert(task.id.clone(), task);

        Ok(())
    }

    /// Add an ordering edge: `from` must complete before `to` starts
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<()> {
        let from_idx = self
            .indices
            .get(from)
            .ok_or_else(|| Error::TaskNotFound(from.to_string()))?;
        let to_idx = self
            .indices
            .get(to)
            .ok_or_else(|| Error::TaskNotFound(to.to_string()))?;

        self.graph.add_edge(*from_idx, *to_idx, ());

        Ok(())
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn contains_task(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    /// All tasks in insertion order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph.node_weight(idx))
            .filter_map(|id| self.tasks.get(id))
    }

    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        match (self.indices.get(from), self.indices.get(to)) {
            (Some(&from_idx), Some(&to_idx)) => {
                self.graph.find_edge(from_idx, to_idx).is_some()
            }
            _ => false,
        }
    }

    /// Tasks that must complete before `id` can start
    pub fn upstream(&self, id: &str) -> Vec<&Task> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Tasks gated by `id`
    pub fn downstream(&self, id: &str) -> Vec<&Task> {
        self.neighbors(id, Direction::Outgoing)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<&Task> {
        let Some(&idx) = self.indices.get(id) else {
            return vec![];
        };

        self.graph
            .neighbors_directed(idx, direction)
            .filter_map(|neighbor| {
                self.graph
                    .node_weight(neighbor)
                    .and_then(|task_id| self.tasks.get(task_id))
            })
            .collect()
    }

    /// Tasks with no upstream dependencies
    pub fn roots(&self) -> Vec<&Task> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .filter_map(|idx| self.graph.node_weight(idx))
            .filter_map(|id| self.tasks.get(id))
            .collect()
    }

    /// Whether a path of ordering edges leads from `from` to `to`
    pub fn is_reachable(&self, from: &str, to: &str) -> bool {
        match (self.indices.get(from), self.indices.get(to)) {
            (Some(&from_idx), Some(&to_idx)) => {
                has_path_connecting(&self.graph, from_idx, to_idx, None)
            }
            _ => false,
        }
    }

    /// Non-barrier tasks of one loading phase
    pub fn phase_tasks(&self, phase: Phase) -> Vec<&Task> {
        self.tasks()
            .filter(|task| task.phase == Some(phase) && !task.is_barrier())
            .collect()
    }

    /// Topologically sorted task ids.
    ///
    /// The external scheduler is the final authority on the acyclicity
    /// invariant; this check exists so broken wiring is caught at build
    /// time rather than at the first scheduled run.
    pub fn execution_order(&self) -> Result<Vec<String>> {
        let sorted =
            toposort(&self.graph, None).map_err(|_| Error::Cycle(self.id.clone()))?;

        Ok(sorted
            .into_iter()
            .filter_map(|idx| self.graph.node_weight(idx).cloned())
            .collect())
    }

    /// Script files referenced by tasks but absent under `root`
    pub fn missing_scripts(&self, root: &Path) -> Vec<PathBuf> {
        self.tasks()
            .filter_map(|task| task.script_file())
            .filter(|file| !root.join(file).exists())
            .map(PathBuf::from)
            .collect()
    }

    /// Check that every referenced script file exists under `root`.
    ///
    /// Opt-in: construction never touches the filesystem, matching the
    /// deferred-failure contract of the external operators.
    pub fn validate_scripts(&self, root: &Path) -> Result<()> {
        let missing = self.missing_scripts(root);
        if missing.is_empty() {
            Ok(())
        } else {
            for file in &missing {
                tracing::warn!("missing script file: {}", file.display());
            }
            Err(Error::MissingScripts(missing))
        }
    }

    pub fn stats(&self) -> DagStats {
        let mut stats = DagStats {
            total: self.task_count(),
            edges: self.edge_count(),
            ..DagStats::default()
        };
        for task in self.tasks() {
            if task.is_barrier() {
                stats.barriers += 1;
                continue;
            }
            match task.phase {
                Some(Phase::Staging) => stats.staging += 1,
                Some(Phase::Hubs) => stats.hubs += 1,
                Some(Phase::Links) => stats.links += 1,
                Some(Phase::Satellites) => stats.satellites += 1,
                None => stats.unphased += 1,
            }
        }
        stats
    }
}

impl std::fmt::Debug for VaultDag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultDag")
            .field("id", &self.id)
            .field("tasks", &self.task_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}

/// An ordering edge as serialized in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// Serializable manifest of one assembled DAG, the handoff format for the
/// external scheduler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DagState {
    pub dag: String,
    pub exported_at: DateTime<Utc>,
    pub schedule: ScheduleConfig,
    pub tasks: Vec<Task>,
    pub edges: Vec<Edge>,
}

impl VaultDag {
    pub fn to_state(&self) -> DagState {
        let edges = self
            .graph
            .edge_references()
            .filter_map(|edge| {
                let from = self.graph.node_weight(edge.source())?;
                let to = self.graph.node_weight(edge.target())?;
                Some(Edge {
                    from: from.clone(),
                    to: to.clone(),
                })
            })
            .collect();

        DagState {
            dag: self.id.clone(),
            exported_at: Utc::now(),
            schedule: self.schedule.clone(),
            tasks: self.tasks().cloned().collect(),
            edges,
        }
    }

    pub fn from_state(state: DagState) -> Result<Self> {
        let mut dag = Self::new(state.dag, state.schedule);

        for task in state.tasks {
            dag.add_task(task)?;
        }

        for edge in state.edges {
            dag.add_edge(&edge.from, &edge.to)?;
        }

        Ok(dag)
    }

    /// Write the manifest as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.to_state())?;
        std::fs::write(path, json)?;
        tracing::debug!("saved dag '{}' to {}", self.id, path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let state: DagState = serde_json::from_str(&json)?;
        Self::from_state(state)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_state())?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.to_state())?)
    }

    /// Graphviz rendering of the task graph
    pub fn to_dot(&self) -> String {
        format!(
            "{:?}",
            Dot::with_config(&self.graph, &[Config::EdgeNoLabel])
        )
    }
}

/// Per-phase task counts for one DAG
#[derive(Debug, Clone, Default)]
pub struct DagStats {
    pub total: usize,
    pub edges: usize,
    pub barriers: usize,
    pub staging: usize,
    pub hubs: usize,
    pub links: usize,
    pub satellites: usize,
    /// Tasks wired outside the phase convention
    pub unphased: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connections::ConnectionRole;
    use crate::dag::task::ScriptRef;

    fn query_task(id: &str, file: &str) -> Task {
        Task::query(id, ScriptRef::file(file), "dv_raw", ConnectionRole::VaultWarehouse)
    }

    #[test]
    fn test_add_task_and_lookup() {
        let mut dag = VaultDag::new("test", ScheduleConfig::default());
        dag.add_task(query_task("hub_person", "loading/hub_person.hql"))
            .unwrap();

        assert!(dag.contains_task("hub_person"));
        assert_eq!(dag.task_count(), 1);
        assert!(dag.get_task("hub_person").is_some());
        assert!(dag.get_task("hub_address").is_none());
    }

    #[test]
    fn test_duplicate_task_rejected() {
        let mut dag = VaultDag::new("test", ScheduleConfig::default());
        dag.add_task(query_task("hub_person", "loading/hub_person.hql"))
            .unwrap();

        let err = dag
            .add_task(query_task("hub_person", "loading/hub_person.hql"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateTask(id) if id == "hub_person"));
        assert_eq!(dag.task_count(), 1);
    }

    #[test]
    fn test_edge_requires_known_tasks() {
        let mut dag = VaultDag::new("test", ScheduleConfig::default());
        dag.add_task(Task::checkpoint("a")).unwrap();

        let err = dag.add_edge("a", "b").unwrap_err();
        assert!(matches!(err, Error::TaskNotFound(id) if id == "b"));
    }

    #[test]
    fn test_upstream_downstream() {
        let mut dag = VaultDag::new("test", ScheduleConfig::default());
        dag.add_task(Task::checkpoint("a")).unwrap();
        dag.add_task(Task::checkpoint("b")).unwrap();
        dag.add_task(Task::checkpoint("c")).unwrap();
        dag.add_edge("a", "c").unwrap();
        dag.add_edge("b", "c").unwrap();

        let upstream = dag.upstream("c");
        assert_eq!(upstream.len(), 2);
        assert!(dag.downstream("c").is_empty());
        assert_eq!(dag.downstream("a").len(), 1);
        assert!(dag.has_edge("a", "c"));
        assert!(!dag.has_edge("c", "a"));
    }

    #[test]
    fn test_roots() {
        let mut dag = VaultDag::new("test", ScheduleConfig::default());
        dag.add_task(Task::checkpoint("a")).unwrap();
        dag.add_task(Task::checkpoint("b")).unwrap();
        dag.add_task(Task::checkpoint("c")).unwrap();
        dag.add_edge("a", "c").unwrap();

        let roots: Vec<&str> = dag.roots().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(roots.len(), 2);
        assert!(roots.contains(&"a"));
        assert!(roots.contains(&"b"));
    }

    #[test]
    fn test_reachability() {
        let mut dag = VaultDag::new("test", ScheduleConfig::default());
        dag.add_task(Task::checkpoint("a")).unwrap();
        dag.add_task(Task::checkpoint("b")).unwrap();
        dag.add_task(Task::checkpoint("c")).unwrap();
        dag.add_edge("a", "b").unwrap();
        dag.add_edge("b", "c").unwrap();

        assert!(dag.is_reachable("a", "c"));
        assert!(!dag.is_reachable("c", "a"));
    }

    #[test]
    fn test_execution_order_respects_edges() {
        let mut dag = VaultDag::new("test", ScheduleConfig::default());
        dag.add_task(Task::checkpoint("a")).unwrap();
        dag.add_task(Task::checkpoint("b")).unwrap();
        dag.add_task(Task::checkpoint("c")).unwrap();
        dag.add_edge("a", "b").unwrap();
        dag.add_edge("b", "c").unwrap();

        let order = dag.execution_order().unwrap();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_cycle_detected_in_execution_order() {
        let mut dag = VaultDag::new("cyclic", ScheduleConfig::default());
        dag.add_task(Task::checkpoint("a")).unwrap();
        dag.add_task(Task::checkpoint("b")).unwrap();
        dag.add_edge("a", "b").unwrap();
        dag.add_edge("b", "a").unwrap();

        let err = dag.execution_order().unwrap_err();
        assert!(matches!(err, Error::Cycle(id) if id == "cyclic"));
    }

    #[test]
    fn test_state_roundtrip() {
        let mut dag = VaultDag::new("roundtrip", ScheduleConfig::default());
        dag.add_task(Task::barrier(Phase::Staging)).unwrap();
        dag.add_task(query_task("hub_person", "loading/hub_person.hql"))
            .unwrap();
        dag.add_edge("staging_done", "hub_person").unwrap();

        let state = dag.to_state();
        assert_eq!(state.dag, "roundtrip");
        assert_eq!(state.tasks.len(), 2);
        assert_eq!(state.edges.len(), 1);

        let restored = VaultDag::from_state(state).unwrap();
        assert_eq!(restored.task_count(), 2);
        assert!(restored.has_edge("staging_done", "hub_person"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dag.json");

        let mut dag = VaultDag::new("persisted", ScheduleConfig::default());
        dag.add_task(Task::checkpoint("a")).unwrap();
        dag.add_task(Task::checkpoint("b")).unwrap();
        dag.add_edge("a", "b").unwrap();
        dag.save(&path).unwrap();

        let loaded = VaultDag::load(&path).unwrap();
        assert_eq!(loaded.id(), "persisted");
        assert_eq!(loaded.task_count(), 2);
        assert!(loaded.has_edge("a", "b"));
    }

    #[test]
    fn test_missing_scripts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("loading")).unwrap();
        std::fs::write(dir.path().join("loading/hub_person.hql"), "SELECT 1").unwrap();

        let mut dag = VaultDag::new("test", ScheduleConfig::default());
        dag.add_task(query_task("hub_person", "loading/hub_person.hql"))
            .unwrap();
        dag.add_task(query_task("hub_address", "loading/hub_address.hql"))
            .unwrap();

        let missing = dag.missing_scripts(dir.path());
        assert_eq!(missing, vec![PathBuf::from("loading/hub_address.hql")]);
        assert!(dag.validate_scripts(dir.path()).is_err());

        std::fs::write(dir.path().join("loading/hub_address.hql"), "SELECT 1").unwrap();
        assert!(dag.validate_scripts(dir.path()).is_ok());
    }

    #[test]
    fn test_dot_contains_task_ids() {
        let mut dag = VaultDag::new("test", ScheduleConfig::default());
        dag.add_task(Task::checkpoint("staging_done")).unwrap();
        dag.add_task(Task::checkpoint("hubs_done")).unwrap();
        dag.add_edge("staging_done", "hubs_done").unwrap();

        let dot = dag.to_dot();
        assert!(dot.contains("digraph"));
        assert!(dot.contains("staging_done"));
        assert!(dot.contains("hubs_done"));
    }

    #[test]
    fn test_stats_counts_phases() {
        let mut dag = VaultDag::new("test", ScheduleConfig::default());
        dag.add_task(Task::barrier(Phase::Staging)).unwrap();
        dag.add_task(query_task("hub_person", "loading/hub_person.hql").with_phase(Phase::Hubs))
            .unwrap();
        dag.add_task(Task::checkpoint("all_done")).unwrap();

        let stats = dag.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.barriers, 2);
        assert_eq!(stats.hubs, 1);
        assert_eq!(stats.unphased, 0);
    }
}
