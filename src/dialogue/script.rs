//! Dialogue script model
//!
//! Scripts are JSON assets: two actors and a map of nodes. A node either
//! continues to `next` on click or offers `choices`, each pointing at another
//! node. `"start"` is the entry point, `"end"` closes the dialogue.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{HubError, Result};

pub const START: &str = "start";
pub const END: &str = "end";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    /// Portrait asset key
    pub texture: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actors {
    pub left: Actor,
    pub right: Actor,
}

/// Which portrait is speaking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueNode {
    pub text: String,
    pub speaker: Side,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
}

/// How a node moves on
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step<'a> {
    Continue(&'a str),
    Choose(&'a [Choice]),
}

impl DialogueNode {
    /// Choices win over `next`; a node with neither ends the dialogue
    pub fn step(&self) -> Step<'_> {
        match (&self.choices, &self.next) {
            (Some(choices), _) => Step::Choose(choices),
            (None, Some(next)) => Step::Continue(next),
            (None, None) => Step::Continue(END),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueScript {
    pub actors: Actors,
    pub nodes: HashMap<String, DialogueNode>,
}

impl DialogueScript {
    /// Parse and validate
    pub fn from_json(text: &str) -> Result<Self> {
        let script: DialogueScript = serde_json::from_str(text)?;
        script.validate()?;
        Ok(script)
    }

    pub fn node(&self, key: &str) -> Option<&DialogueNode> {
        self.nodes.get(key)
    }

    pub fn actor(&self, side: Side) -> &Actor {
        match side {
            Side::Left => &self.actors.left,
            Side::Right => &self.actors.right,
        }
    }

    fn resolves(&self, key: &str) -> bool {
        key == END || self.nodes.contains_key(key)
    }

    /// Reject scripts that can't be walked: no start, dangling links,
    /// dead-end nodes or empty choice lists
    pub fn validate(&self) -> Result<()> {
        if !self.nodes.contains_key(START) {
            return Err(HubError::InvalidScript(format!("no \"{}\" node", START)));
        }

        let mut keys: Vec<_> = self.nodes.keys().collect();
        keys.sort();
        for key in keys {
            let node = &self.nodes[key];
            match (&node.choices, &node.next) {
                (Some(choices), _) if choices.is_empty() => {
                    return Err(HubError::InvalidScript(format!(
                        "node \"{}\" has an empty choice list",
                        key
                    )));
                }
                (Some(choices), _) => {
                    if let Some(bad) = choices.iter().find(|c| !self.resolves(&c.target)) {
                        return Err(HubError::InvalidScript(format!(
                            "choice \"{}\" in \"{}\" points at missing node \"{}\"",
                            bad.text, key, bad.target
                        )));
                    }
                }
                (None, Some(next)) if !self.resolves(next) => {
                    return Err(HubError::InvalidScript(format!(
                        "node \"{}\" continues to missing node \"{}\"",
                        key, next
                    )));
                }
                (None, Some(_)) => {}
                (None, None) => {
                    return Err(HubError::InvalidScript(format!(
                        "node \"{}\" has neither next nor choices",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
