//! Destination folder resolution on Drive.
//!
//! Frames land either in a folder chosen per branch (custom mapping) or in a
//! `root/date/channel/branch` hierarchy created on demand. Folder ids found
//! or created along the hierarchy are cached until the layout changes.

use chrono::{Local, NaiveDate};
use std::collections::{BTreeMap, HashMap};

use super::backend::{DriveBackend, EntryQuery};
use super::error::DriveError;
use crate::settings::FolderLayout;

/// Format of the per-day folder name.
pub const DATE_FOLDER_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("No custom folder mapped for branch '{0}'")]
    UnmappedBranch(String),

    #[error("Folder '{folder_id}' mapped for branch '{branch}' does not exist")]
    MappedFolderMissing { branch: String, folder_id: String },

    #[error("Root folder id '{0}' does not exist")]
    RootFolderMissing(String),

    #[error(transparent)]
    Backend(#[from] DriveError),
}

/// Find a folder named `name` under `parent`, creating it on a miss.
///
/// The first match wins when several folders share the name.
pub async fn find_or_create(
    backend: &dyn DriveBackend,
    name: &str,
    parent: Option<&str>,
) -> Result<String, DriveError> {
    let existing = backend
        .list_entries(&EntryQuery::folder(name, parent))
        .await?;
    if let Some(entry) = existing.into_iter().next() {
        log::debug!("Found Drive folder '{}' ({})", name, entry.id);
        return Ok(entry.id);
    }
    backend.create_folder(name, parent).await
}

/// Memoizing resolver for upload destinations.
#[derive(Debug, Default)]
pub struct FolderResolver {
    layout: FolderLayout,
    root_id: Option<String>,
    /// (parent id, child name) -> child id
    children: HashMap<(String, String), String>,
}

impl FolderResolver {
    pub fn new(layout: FolderLayout) -> Self {
        Self {
            layout,
            root_id: None,
            children: HashMap::new(),
        }
    }

    pub fn layout(&self) -> &FolderLayout {
        &self.layout
    }

    /// Adopt `layout`. Returns true when it differed and the cache was dropped.
    pub fn configure(&mut self, layout: &FolderLayout) -> bool {
        if &self.layout == layout {
            return false;
        }
        self.layout = layout.clone();
        self.invalidate();
        true
    }

    pub fn invalidate(&mut self) {
        self.root_id = None;
        self.children.clear();
    }

    /// Number of memoized folders, root included.
    pub fn cached_folders(&self) -> usize {
        self.children.len() + usize::from(self.root_id.is_some())
    }

    pub fn root_id(&self) -> Option<&str> {
        self.root_id.as_deref()
    }

    /// Destination folder for a frame of (channel, branch), dated today.
    pub async fn resolve(
        &mut self,
        backend: &dyn DriveBackend,
        channel: &str,
        branch: &str,
    ) -> Result<String, ResolveError> {
        self.resolve_on(backend, channel, branch, Local::now().date_naive())
            .await
    }

    /// Like [`FolderResolver::resolve`] with an explicit date for the date folder.
    pub async fn resolve_on(
        &mut self,
        backend: &dyn DriveBackend,
        channel: &str,
        branch: &str,
        date: NaiveDate,
    ) -> Result<String, ResolveError> {
        if self.layout.use_custom_mapping {
            return self.resolve_mapped(backend, branch).await;
        }

        let mut current = self.resolve_root(backend).await?;
        if self.layout.create_date_folders {
            let name = date.format(DATE_FOLDER_FORMAT).to_string();
            current = self.child(backend, &current, &name).await?;
        }
        if self.layout.create_channel_folders {
            current = self.child(backend, &current, channel).await?;
        }
        if self.layout.create_branch_folders {
            current = self.child(backend, &current, branch).await?;
        }
        Ok(current)
    }

    async fn resolve_mapped(
        &self,
        backend: &dyn DriveBackend,
        branch: &str,
    ) -> Result<String, ResolveError> {
        let folder_id = self
            .layout
            .custom_folder_mapping
            .get(branch)
            .ok_or_else(|| ResolveError::UnmappedBranch(branch.to_string()))?;

        if !backend.folder_exists(folder_id).await? {
            return Err(ResolveError::MappedFolderMissing {
                branch: branch.to_string(),
                folder_id: folder_id.clone(),
            });
        }
        log::debug!("Using mapped folder {} for branch {}", folder_id, branch);
        Ok(folder_id.clone())
    }

    /// Root folder id: verified when configured as an id, otherwise found or
    /// created by name at the top of My Drive.
    pub async fn resolve_root(&mut self, backend: &dyn DriveBackend) -> Result<String, ResolveError> {
        if let Some(id) = &self.root_id {
            return Ok(id.clone());
        }

        let configured = &self.layout.root_folder_name;
        let id = if self.layout.use_root_folder_id {
            if !backend.folder_exists(configured).await? {
                return Err(ResolveError::RootFolderMissing(configured.clone()));
            }
            configured.clone()
        } else {
            find_or_create(backend, configured, None).await?
        };

        log::info!("Using Drive root folder {}", id);
        self.root_id = Some(id.clone());
        Ok(id)
    }

    async fn child(
        &mut self,
        backend: &dyn DriveBackend,
        parent: &str,
        name: &str,
    ) -> Result<String, ResolveError> {
        let key = (parent.to_string(), name.to_string());
        if let Some(id) = self.children.get(&key) {
            return Ok(id.clone());
        }
        let id = find_or_create(backend, name, Some(parent)).await?;
        self.children.insert(key, id.clone());
        Ok(id)
    }

    /// Build a branch -> folder id mapping from `{branch code: folder name}`,
    /// finding or creating each folder under `parent` (the root when `None`).
    ///
    /// Branches whose folder can't be found or created are left out and logged.
    /// The result is merged into the layout's custom mapping.
    pub async fn map_branch_folders(
        &mut self,
        backend: &dyn DriveBackend,
        names: &BTreeMap<String, String>,
        parent: Option<&str>,
    ) -> Result<BTreeMap<String, String>, ResolveError> {
        let parent = match parent {
            Some(id) => id.to_string(),
            None => self.resolve_root(backend).await?,
        };

        let mut mapping = BTreeMap::new();
        for (code, folder_name) in names {
            match find_or_create(backend, folder_name, Some(&parent)).await {
                Ok(id) => {
                    log::info!("Mapped {} -> {} ({})", code, folder_name, id);
                    mapping.insert(code.clone(), id);
                }
                Err(e) => log::warn!("Could not map {} -> {}: {}", code, folder_name, e),
            }
        }

        self.layout
            .custom_folder_mapping
            .extend(mapping.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(mapping)
    }
}
