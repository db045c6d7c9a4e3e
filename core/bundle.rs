use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub type PackageFiles = IndexMap<String, String>;

/// Collected sources: package name -> relative path -> file content.
///
/// Both levels keep insertion order, which for a traversal is the order the
/// filesystem enumerated entries in. Re-inserting a path replaces its content
/// in place (last write wins), so a path never appears twice in a package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageBundle {
    packages: IndexMap<String, PackageFiles>,
}

impl PackageBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a file, creating the package on first use. Returns the content
    /// that was replaced, if any.
    pub fn insert(
        &mut self,
        package_name: &str,
        relative_path: impl Into<String>,
        content: impl Into<String>,
    ) -> Option<String> {
        self.packages
            .entry(package_name.to_string())
            .or_default()
            .insert(relative_path.into(), content.into())
    }

    /// Registers a package with no files yet. Decoders use this so an empty
    /// package survives a round trip.
    pub fn ensure_package(&mut self, package_name: &str) {
        self.packages.entry(package_name.to_string()).or_default();
    }

    pub fn get(&self, package_name: &str, relative_path: &str) -> Option<&str> {
        self.packages
            .get(package_name)
            .and_then(|files| files.get(relative_path))
            .map(String::as_str)
    }

    pub fn package(&self, package_name: &str) -> Option<&PackageFiles> {
        self.packages.get(package_name)
    }

    pub fn packages(&self) -> impl Iterator<Item = (&str, &PackageFiles)> {
        self.packages.iter().map(|(name, files)| (name.as_str(), files))
    }

    /// Every stored file as `(package, relative path, content)` in bundle order.
    pub fn files(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.packages.iter().flat_map(|(package, files)| {
            files
                .iter()
                .map(move |(path, content)| (package.as_str(), path.as_str(), content.as_str()))
        })
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn file_count(&self) -> usize {
        self.packages.values().map(IndexMap::len).sum()
    }

    /// Sum of the UTF-8 encoded sizes of every stored content.
    pub fn source_size(&self) -> u64 {
        self.files().map(|(_, _, content)| content.len() as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.file_count() == 0
    }
}
