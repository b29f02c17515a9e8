//! Window tree, workspace and output types
//!
//! These mirror the JSON replies of `GET_TREE`, `GET_WORKSPACES` and
//! `GET_OUTPUTS`. Only the fields sway-session reasons about are typed on
//! [`Node`]. A [`Tree`] keeps the reply exactly as the compositor sent it, so a
//! saved tree is written back out with the compositor's own schema intact.

use std::collections::VecDeque;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Name of the pseudo output that holds the scratchpad
pub const SCRATCHPAD_OUTPUT: &str = "__i3";

/// Name of the scratchpad workspace
pub const SCRATCHPAD_WORKSPACE: &str = "__i3_scratch";

/// Kind of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Root,
    Output,
    Workspace,
    Con,
    FloatingCon,
    Dockarea,
}

/// Split direction of a container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
    #[default]
    None,
}

impl Orientation {
    /// Argument for the `split` command
    ///
    /// Anything that is not explicitly horizontal is restored as a vertical split.
    pub fn split_arg(self) -> &'static str {
        match self {
            Self::Horizontal => "h",
            Self::Vertical | Self::None => "v",
        }
    }
}

/// X11 window properties reported for Xwayland clients
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WindowProperties {
    #[serde(default)]
    pub class: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Deserialize a key that may be `null`, keeping it apart from a missing key
///
/// A missing key falls back to `None` through `#[serde(default)]`; a present
/// key, `null` included, becomes `Some(_)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A node of the compositor's window tree
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Node {
    pub id: i64,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(rename = "type")]
    pub node_type: NodeType,

    #[serde(default)]
    pub orientation: Orientation,

    /// Wayland application identifier
    ///
    /// Sway reports the key for every view and leaves it out for containers.
    /// Xwayland clients and some Wayland clients report it as `null`, which
    /// is `Some(None)` here.
    #[serde(default, deserialize_with = "present")]
    pub app_id: Option<Option<String>>,

    /// X11 window id, set for Xwayland clients
    #[serde(default)]
    pub window: Option<i64>,

    #[serde(default)]
    pub window_properties: Option<WindowProperties>,

    #[serde(default)]
    pub nodes: Vec<Node>,

    #[serde(default)]
    pub floating_nodes: Vec<Node>,

    /// Every other key the compositor reported for this node
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    /// Title of the node, empty when the compositor reports none
    pub fn title(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Key used to pair saved windows with live ones
    ///
    /// The Wayland `app_id` wins; Xwayland clients fall back to their X11
    /// window class. Containers have neither and yield `None`.
    pub fn class_key(&self) -> Option<&str> {
        if let Some(app_id) = self.app_id().filter(|id| !id.is_empty()) {
            return Some(app_id);
        }
        self.window_properties
            .as_ref()
            .and_then(|props| props.class.as_deref())
            .filter(|class| !class.is_empty())
    }

    /// The Wayland `app_id`, if one was set
    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_ref().and_then(Option::as_deref)
    }

    /// Whether the node is a view rather than a split container
    ///
    /// A view reports the `app_id` key even when its value is `null`.
    pub fn is_application(&self) -> bool {
        self.app_id.is_some() || self.window.is_some() || self.window_properties.is_some()
    }

    /// Whether this output or workspace is the scratchpad pseudo container
    pub fn is_scratchpad(&self) -> bool {
        matches!(self.title(), SCRATCHPAD_OUTPUT | SCRATCHPAD_WORKSPACE)
    }

    /// All nodes below this one, breadth first
    ///
    /// At each level tiling children come before floating children.
    pub fn descendants(&self) -> Descendants<'_> {
        let mut queue = VecDeque::new();
        queue.extend(self.nodes.iter());
        queue.extend(self.floating_nodes.iter());
        Descendants { queue }
    }

    /// Tiling window leaves below this node
    pub fn leaves(&self) -> impl Iterator<Item = &Node> {
        self.descendants()
            .filter(|node| node.node_type == NodeType::Con && node.nodes.is_empty())
    }

    /// Every node whose class key equals `class`, in traversal order
    pub fn find_by_class<'a>(&'a self, class: &str) -> Vec<&'a Node> {
        self.descendants()
            .filter(|node| node.class_key() == Some(class))
            .collect()
    }
}

/// A window tree as reported by `GET_TREE`
///
/// Serializes back to exactly the JSON it was read from: null and missing keys
/// stay as they were and no defaults are filled in. [`Tree::root`] is the
/// typed view used for matching.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    raw: Value,
    root: Node,
}

impl Tree {
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        let root = Node::deserialize(&raw)?;
        Ok(Self { raw, root })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The compositor's reply as received
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Tree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Self::from_value(raw).map_err(serde::de::Error::custom)
    }
}

/// Breadth-first iterator over a subtree, see [`Node::descendants`]
pub struct Descendants<'a> {
    queue: VecDeque<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;
        self.queue.extend(node.nodes.iter());
        self.queue.extend(node.floating_nodes.iter());
        Some(node)
    }
}

/// A workspace and the output it lives on
///
/// In a saved profile `output` holds an output identifier (see
/// [`Output::identifier`]) rather than the connector name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub name: String,
    pub output: String,
    #[serde(default)]
    pub visible: bool,
}

/// A physical output as reported by `GET_OUTPUTS`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Output {
    pub name: String,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub serial: String,
}

impl Output {
    /// Stable identifier for the physical monitor
    ///
    /// Connector names such as `DP-3` change when a dock is plugged in;
    /// make, model and serial do not. Sway accepts this string wherever an
    /// output name is expected. i3 reports none of the three, so its outputs
    /// keep their connector name.
    pub fn identifier(&self) -> String {
        if self.make.is_empty() && self.model.is_empty() && self.serial.is_empty() {
            return self.name.clone();
        }
        format!("{} {} {}", self.make, self.model, self.serial)
    }
}

/// Rewrite each workspace's output to the identifier of that output
///
/// Workspaces on an output missing from `outputs` keep the connector name.
pub fn bind_outputs(workspaces: Vec<Workspace>, outputs: &[Output]) -> Vec<Workspace> {
    workspaces
        .into_iter()
        .map(|mut workspace| {
            if let Some(output) = outputs.iter().find(|o| o.name == workspace.output) {
                workspace.output = output.identifier();
            }
            workspace
        })
        .collect()
}
