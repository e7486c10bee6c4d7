//! Delivery channels and their branches.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{JsonDocument, SettingsError};

/// Branches every channel starts with when nothing else is known.
const DEFAULT_BRANCHES: &[(&str, &str)] = &[
    ("LBB", "Luỹ Bán Bích"),
    ("LVT", "Lê Văn Thọ"),
    ("BC", "Bàu Cát"),
    ("PVC", "Phạm Viết Chánh"),
];

/// Suffix dropped from a channel display name to build the filename token.
const CHANNEL_SUFFIX: &str = "Food";

/// Short channel token used in frame filenames (`ShopeeFood` -> `Shopee`).
pub fn channel_short(display_name: &str) -> &str {
    match display_name.strip_suffix(CHANNEL_SUFFIX) {
        Some(short) if !short.is_empty() => short,
        _ => display_name,
    }
}

fn default_branches() -> BTreeMap<String, String> {
    DEFAULT_BRANCHES
        .iter()
        .map(|(code, name)| (code.to_string(), name.to_string()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    #[serde(default)]
    pub branches: BTreeMap<String, String>,
}

/// What [`ChannelRegistry::add_branch`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchChange {
    Added,
    Renamed { previous: String },
    Unchanged,
}

/// Channel key -> channel, persisted as `channels.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelRegistry {
    channels: BTreeMap<String, Channel>,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        let mut channels = BTreeMap::new();
        channels.insert(
            "shopeefood".to_string(),
            Channel {
                name: "ShopeeFood".to_string(),
                branches: default_branches(),
            },
        );
        channels.insert(
            "grabfood".to_string(),
            Channel {
                name: "GrabFood".to_string(),
                branches: default_branches(),
            },
        );
        Self { channels }
    }
}

impl JsonDocument for ChannelRegistry {}

impl ChannelRegistry {
    pub fn empty() -> Self {
        Self {
            channels: BTreeMap::new(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Channel)> {
        self.channels.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.channels.keys()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Channel> {
        self.channels.get(key)
    }

    /// Display name of a channel, or the key itself when unknown.
    pub fn channel_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.channels.get(key).map_or(key, |c| c.name.as_str())
    }

    /// Display name of a branch, or the code itself when unknown.
    pub fn branch_name<'a>(&'a self, key: &str, code: &'a str) -> &'a str {
        self.channels
            .get(key)
            .and_then(|c| c.branches.get(code))
            .map_or(code, String::as_str)
    }

    /// Check that `key` exists and has branch `code`.
    pub fn validate(&self, key: &str, code: &str) -> Result<(), SettingsError> {
        let channel = self
            .channels
            .get(key)
            .ok_or_else(|| SettingsError::UnknownChannel(key.to_string()))?;
        if !channel.branches.contains_key(code) {
            return Err(SettingsError::UnknownBranch {
                channel: key.to_string(),
                branch: code.to_string(),
            });
        }
        Ok(())
    }

    /// Add a channel. Its branches are copied from `copy_from` when given and
    /// known, else from the first channel, else the built-in defaults.
    pub fn add_channel(
        &mut self,
        key: &str,
        name: &str,
        copy_from: Option<&str>,
    ) -> Result<&Channel, SettingsError> {
        if self.channels.contains_key(key) {
            return Err(SettingsError::ChannelExists(key.to_string()));
        }

        let branches = copy_from
            .and_then(|src| self.channels.get(src))
            .or_else(|| self.channels.values().next())
            .map(|c| c.branches.clone())
            .unwrap_or_else(default_branches);

        log::info!(
            "Added channel '{}' ({}) with {} branches",
            key,
            name,
            branches.len()
        );
        let channel = self.channels.entry(key.to_string()).or_insert(Channel {
            name: name.to_string(),
            branches,
        });
        Ok(channel)
    }

    pub fn remove_channel(&mut self, key: &str) -> Result<Channel, SettingsError> {
        self.channels
            .remove(key)
            .ok_or_else(|| SettingsError::UnknownChannel(key.to_string()))
    }

    /// Add a branch, or rename it when the code exists under another name.
    pub fn add_branch(
        &mut self,
        key: &str,
        code: &str,
        name: &str,
    ) -> Result<BranchChange, SettingsError> {
        let channel = self
            .channels
            .get_mut(key)
            .ok_or_else(|| SettingsError::UnknownChannel(key.to_string()))?;

        match channel.branches.insert(code.to_string(), name.to_string()) {
            None => Ok(BranchChange::Added),
            Some(previous) if previous == name => Ok(BranchChange::Unchanged),
            Some(previous) => Ok(BranchChange::Renamed { previous }),
        }
    }

    pub fn remove_branch(&mut self, key: &str, code: &str) -> Result<String, SettingsError> {
        let channel = self
            .channels
            .get_mut(key)
            .ok_or_else(|| SettingsError::UnknownChannel(key.to_string()))?;
        channel
            .branches
            .remove(code)
            .ok_or_else(|| SettingsError::UnknownBranch {
                channel: key.to_string(),
                branch: code.to_string(),
            })
    }
}
