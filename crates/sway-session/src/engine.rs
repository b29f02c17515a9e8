//! Saving and restoring workspace layouts
//!
//! `save` snapshots the live tree and the workspace-to-output assignment.
//! `load` walks a saved tree, moves each matching live window to the
//! workspace it was saved on, then moves every workspace back to its output
//! and refocuses the workspaces that were visible.

use tracing::{debug, info};

use crate::error::SessionError;
use crate::matcher::{resolve, MatchState};
use crate::notify::Notifier;
use crate::store::{default_profile_name, ProfileStore};
use crate::sway_ipc::Compositor;
use crate::tree::{Node, Orientation};

/// A live window and where it goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub node_id: i64,
    pub workspace: String,
    pub split: Orientation,
}

/// Outcome of a load, for the end-of-run summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub profile: String,
    /// Windows moved to a workspace
    pub placed: usize,
    /// Windows matched by title similarity
    pub defaulted: usize,
    /// Live tiling windows no saved window was matched to
    pub untouched: usize,
    /// Saved windows with no live counterpart
    pub not_found: usize,
}

impl LoadReport {
    /// Diagnostic lines, one per non-zero counter
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.defaulted != 0 {
            lines.push(format!("chose {} heuristically", self.defaulted));
        }
        if self.untouched != 0 {
            lines.push(format!("left {} untouched", self.untouched));
        }
        if self.not_found != 0 {
            lines.push(format!("couldn't find {}", self.not_found));
        }
        lines
    }
}

/// The container whose children are the applications of a workspace
///
/// Split containers without an application tag are unwrapped through their
/// first child until an application shows up. Only the first branch is
/// followed; siblings of a wrapper are not visited.
pub fn application_container(workspace: &Node) -> &Node {
    let mut container = workspace;
    while let Some(first) = container.nodes.first() {
        if first.is_application() {
            break;
        }
        container = first;
    }
    container
}

/// Match every window of a saved tree against the live tree
///
/// Each matched live node is claimed in `state`, so no live window is placed
/// twice. Scratchpad outputs and workspaces are skipped.
pub fn plan_placements(saved: &Node, live: &Node, state: &mut MatchState) -> Vec<Placement> {
    let mut placements = Vec::new();

    for output in saved.nodes.iter().filter(|output| !output.is_scratchpad()) {
        for workspace in output.nodes.iter().filter(|ws| !ws.is_scratchpad()) {
            if workspace.nodes.is_empty() {
                continue;
            }

            for record in &application_container(workspace).nodes {
                let Some(node) = resolve(record, live, state) else {
                    continue;
                };
                state.touch(node.id);
                debug!(
                    node = node.id,
                    title = node.title(),
                    workspace = workspace.title(),
                    "Planned window placement"
                );
                placements.push(Placement {
                    node_id: node.id,
                    workspace: workspace.title().to_string(),
                    split: workspace.orientation,
                });
            }
        }
    }

    placements
}

/// Quote a command argument for the compositor's command parser
pub fn quote(arg: &str) -> String {
    format!("\"{}\"", arg.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Runs save and load against a compositor
pub struct Session {
    store: ProfileStore,
    notifier: Box<dyn Notifier>,
}

impl Session {
    pub fn new(store: ProfileStore, notifier: Box<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Snapshot the current layout under `profile`, or a timestamp name
    ///
    /// Returns the name the profile was saved under.
    pub async fn save<C: Compositor>(
        &self,
        ipc: &mut C,
        profile: Option<String>,
    ) -> Result<String, SessionError> {
        let profile = profile.unwrap_or_else(default_profile_name);
        info!(profile = %profile, "Saving workspace layout");

        let tree = ipc.get_tree().await?;
        let workspaces = ipc.get_workspaces().await?;
        let outputs = ipc.get_outputs().await?;

        self.store.save(&profile, &tree, workspaces, &outputs)?;

        info!(profile = %profile, "Saved workspace layout");
        self.notifier.notify("Saved Workspace Setup", &profile);
        Ok(profile)
    }

    /// The profile a load will use: the given name, else the newest profile
    pub fn resolve_profile(&self, profile: Option<String>) -> Result<String, SessionError> {
        match profile {
            Some(profile) => Ok(profile),
            None => self.store.latest_profile(),
        }
    }

    /// Restore the layout saved under `profile`, or the newest profile
    ///
    /// Fails only when the profile cannot be resolved or read; windows that
    /// cannot be matched are counted in the report.
    pub async fn load<C: Compositor>(
        &self,
        ipc: &mut C,
        profile: Option<String>,
    ) -> Result<LoadReport, SessionError> {
        let profile = self.resolve_profile(profile)?;
        info!(profile = %profile, "Loading workspace layout");

        let mapping = self.store.load_mapping(&profile)?;
        let saved = self.store.load_tree(&profile)?;
        let live = ipc.get_tree().await?;

        let mut state = MatchState::default();
        let placements = plan_placements(saved.root(), live.root(), &mut state);

        for placement in &placements {
            ipc.run_node_command(
                placement.node_id,
                &format!("split {}", placement.split.split_arg()),
            )
            .await?;
            ipc.run_node_command(
                placement.node_id,
                &format!("move container to workspace {}", quote(&placement.workspace)),
            )
            .await?;
        }

        let report = LoadReport {
            profile,
            placed: placements.len(),
            defaulted: state.defaulted().len(),
            untouched: live
                .root()
                .leaves()
                .filter(|leaf| !state.is_touched(leaf.id))
                .count(),
            not_found: state.not_found().len(),
        };
        info!(
            placed = report.placed,
            defaulted = report.defaulted,
            untouched = report.untouched,
            not_found = report.not_found,
            "Windows placed"
        );

        // A workspace must be focused before it can be moved to another output
        for workspace in &mapping {
            ipc.run_command(&format!("workspace {}", quote(&workspace.name)))
                .await?;
            ipc.run_command(&format!(
                "move workspace to output {}",
                quote(&workspace.output)
            ))
            .await?;
        }

        for workspace in mapping.iter().filter(|ws| ws.visible) {
            ipc.run_command(&format!("workspace {}", quote(&workspace.name)))
                .await?;
        }

        info!(profile = %report.profile, "Loaded workspace layout");
        self.notifier
            .notify("Loaded Workspace Setup", &report.profile);
        Ok(report)
    }
}
