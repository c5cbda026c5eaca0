//! JSON persistence for the page tree and last scanned content.
//!
//! Version 1 files are a bare array of pages; version 2 wraps a folder tree.
//! Missing page fields load with their defaults.

use crate::error::StoreError;
use crate::page::{Page, PageFolder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub const STORE_VERSION: u32 = 2;

/// Everything persisted between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageCollection {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub root: PageFolder,
}

impl Default for PageCollection {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            root: PageFolder::new("Update Scanner's Pages"),
        }
    }
}

fn current_version() -> u32 {
    STORE_VERSION
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredFormat {
    Current(PageCollection),
    Legacy(Vec<Page>),
}

impl PageCollection {
    pub fn pages(&self) -> Vec<&Page> {
        self.root.pages()
    }

    /// Write scanned state back into the tree, matching pages by URL
    ///
    /// Pages no longer in the tree are ignored.
    pub fn merge(&mut self, pages: impl IntoIterator<Item = Page>) {
        for page in pages {
            match self.root.find_page_mut(&page.url) {
                Some(existing) => *existing = page,
                None => ::log::debug!("Dropping state for unknown page {}", page.url),
            }
        }
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        match serde_json::from_str::<StoredFormat>(json)? {
            StoredFormat::Current(collection) if collection.version > STORE_VERSION => {
                Err(StoreError::UnsupportedVersion(collection.version))
            }
            StoredFormat::Current(mut collection) => {
                collection.version = STORE_VERSION;
                Ok(collection)
            }
            StoredFormat::Legacy(pages) => {
                ::log::info!("Upgrading {} pages from the flat page list", pages.len());
                let mut collection = Self::default();
                for page in pages {
                    collection.root.add_page(page);
                }
                Ok(collection)
            }
        }
    }
}

/// Load the collection, treating a missing file as empty
pub fn load<P: AsRef<Path>>(path: P) -> Result<PageCollection, StoreError> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            ::log::info!("No page store at {}, starting empty", path.display());
            return Ok(PageCollection::default());
        }
        Err(e) => return Err(e.into()),
    };

    let collection = PageCollection::from_json(&contents)?;
    ::log::debug!(
        "Loaded {} pages from {}",
        collection.pages().len(),
        path.display()
    );
    Ok(collection)
}

/// Save the collection, replacing the file only once fully written
pub fn save<P: AsRef<Path>>(path: P, collection: &PageCollection) -> Result<(), StoreError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(collection)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;

    ::log::debug!("Saved page store to {}", path.display());
    Ok(())
}
