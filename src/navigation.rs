use console::style;
use indicatif::ProgressBar;

use crate::kubectl::replicaset;

/// Views the tool can move to once an action completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    ReplicaSetList,
}

pub trait Navigator: Send + Sync {
    fn go(&self, view: View);
}

/// Renders views straight to the terminal.
pub struct TerminalNavigator {
    namespace: Option<String>,
    progress: Option<ProgressBar>,
}

impl TerminalNavigator {
    pub fn new(namespace: Option<String>) -> Self {
        Self {
            namespace,
            progress: None,
        }
    }

    /// Clears `progress` before a view is drawn.
    pub fn with_progress(self, progress: ProgressBar) -> Self {
        Self {
            progress: Some(progress),
            ..self
        }
    }

    fn show_replica_sets(&self) {
        let namespace = self.namespace.as_deref();
        let replica_sets = match replicaset::get(namespace) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Could not list replica sets: {e}");
                return;
            }
        };

        eprintln!(
            "{} {}",
            style("Replica sets in").bold(),
            style(namespace.unwrap_or("current namespace")).cyan()
        );
        if replica_sets.is_empty() {
            eprintln!("  (none yet)");
        }
        for rs in &replica_sets {
            eprintln!("  {rs}");
        }
    }
}

impl Navigator for TerminalNavigator {
    fn go(&self, view: View) {
        if let Some(progress) = &self.progress {
            progress.finish_and_clear();
        }
        match view {
            View::ReplicaSetList => self.show_replica_sets(),
        }
    }
}
