//! Task declarations.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::core::error::AssetError;

/// The body of a task.
pub type TaskAction<C> = Arc<dyn Fn(&C) -> Result<(), AssetError> + Send + Sync>;

/// One step of a series task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A single task
    Task(String),
    /// Tasks with no ordering between them
    Parallel(Vec<String>),
}

impl Step {
    /// Tasks in this step.
    pub fn tasks(&self) -> &[String] {
        match self {
            Step::Task(name) => std::slice::from_ref(name),
            Step::Parallel(names) => names,
        }
    }
}

/// A named build action.
pub struct Task<C> {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) deps: Vec<String>,
    pub(crate) series: Vec<Step>,
    pub(crate) aliases: Vec<String>,
    pub(crate) action: Option<TaskAction<C>>,
}

impl<C> Task<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Task {
            name: name.into(),
            description: String::new(),
            deps: Vec::new(),
            series: Vec::new(),
            aliases: Vec::new(),
            action: None,
        }
    }

    /// Set the one-line description shown by `tasks`.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Tasks that must complete before this one.
    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deps.extend(deps.into_iter().map(Into::into));
        self
    }

    /// Run `steps` in order; this task completes after the last step.
    pub fn series(mut self, steps: Vec<Step>) -> Self {
        self.series = steps;
        self
    }

    /// Alternative name for this task.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&C) -> Result<(), AssetError> + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Direct prerequisites, including every task named by series steps.
    pub fn prerequisites(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.deps.iter().map(String::as_str).collect();
        for step in &self.series {
            for name in step.tasks() {
                if !out.contains(&name.as_str()) {
                    out.push(name.as_str());
                }
            }
        }
        out
    }

    pub fn series_steps(&self) -> &[Step] {
        &self.series
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

impl<C> fmt::Debug for Task<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .field("series", &self.series)
            .field("aliases", &self.aliases)
            .field("action", &self.action.is_some())
            .finish()
    }
}

/// Named tasks and their edges.
pub struct TaskGraph<C> {
    tasks: BTreeMap<String, Task<C>>,
    aliases: BTreeMap<String, String>,
}

impl<C> Default for TaskGraph<C> {
    fn default() -> Self {
        TaskGraph {
            tasks: BTreeMap::new(),
            aliases: BTreeMap::new(),
        }
    }
}

impl<C> TaskGraph<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a task, replacing any earlier task of the same name.
    pub fn add(&mut self, task: Task<C>) -> &mut Self {
        for alias in &task.aliases {
            self.aliases.insert(alias.clone(), task.name.clone());
        }
        self.tasks.insert(task.name.clone(), task);
        self
    }

    /// Look up a task by name or alias.
    pub fn get(&self, name: &str) -> Option<&Task<C>> {
        self.tasks.get(self.canonical(name))
    }

    /// Map an alias to its task name.
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Resolve a requested name, failing for unknown tasks.
    pub fn resolve(&self, name: &str) -> Result<&Task<C>, AssetError> {
        self.get(name).ok_or_else(|| AssetError::UnknownTask {
            name: name.to_string(),
            available: self.names().map(str::to_string).collect(),
        })
    }

    /// Task names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    /// Tasks, sorted by name.
    pub fn tasks(&self) -> impl Iterator<Item = &Task<C>> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<C> fmt::Debug for TaskGraph<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskGraph")
            .field("tasks", &self.tasks.values().collect::<Vec<_>>())
            .field("aliases", &self.aliases)
            .finish()
    }
}
