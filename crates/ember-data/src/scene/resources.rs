// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::error::AssetError;
use std::fs;
use std::path::{Path, PathBuf};

/// The shared asset directory that editor and engine both read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePaths {
    root: PathBuf,
}

impl ResourcePaths {
    /// Name of the directory searched for.
    pub const DIR_NAME: &'static str = "shared_resources";
    /// How many parent directories are inspected.
    pub const MAX_DEPTH: usize = 10;

    /// Uses `root` as the resource directory, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, AssetError> {
        let root = root.into();
        ensure_dir(&root)?;
        Ok(Self { root })
    }

    /// Walks up from the working directory looking for [`Self::DIR_NAME`].
    pub fn locate() -> Result<Self, AssetError> {
        let start = std::env::current_dir().map_err(|source| AssetError::Io {
            path: PathBuf::from("."),
            source,
        })?;
        Self::locate_from(&start)
    }

    /// Walks up from `start` looking for [`Self::DIR_NAME`].
    pub fn locate_from(start: &Path) -> Result<Self, AssetError> {
        for dir in start.ancestors().take(Self::MAX_DEPTH) {
            let candidate = dir.join(Self::DIR_NAME);
            if candidate.is_dir() {
                log::info!("Resources found at {}.", candidate.display());
                return Ok(Self { root: candidate });
            }
        }
        Err(AssetError::NotFound {
            name: Self::DIR_NAME,
            start: start.to_path_buf(),
            depth: Self::MAX_DEPTH,
        })
    }

    /// The resource directory itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `scenes/`
    pub fn scenes(&self) -> Result<PathBuf, AssetError> {
        self.subdir("scenes")
    }

    /// `config/`
    pub fn config(&self) -> Result<PathBuf, AssetError> {
        self.subdir("config")
    }

    /// `variants/`
    pub fn variants(&self) -> Result<PathBuf, AssetError> {
        self.subdir("variants")
    }

    /// `variants/requires/`
    pub fn requires(&self) -> Result<PathBuf, AssetError> {
        self.subdir(Path::new("variants").join("requires"))
    }

    /// `entities/`
    pub fn entities(&self) -> Result<PathBuf, AssetError> {
        self.subdir("entities")
    }

    fn subdir(&self, relative: impl AsRef<Path>) -> Result<PathBuf, AssetError> {
        let path = self.root.join(relative);
        ensure_dir(&path)?;
        Ok(path)
    }
}

fn ensure_dir(path: &Path) -> Result<(), AssetError> {
    if path.is_dir() {
        return Ok(());
    }
    log::warn!("Creating missing directory {}.", path.display());
    fs::create_dir_all(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_resources_in_an_ancestor() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join(ResourcePaths::DIR_NAME)).unwrap();
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let paths = ResourcePaths::locate_from(&nested).unwrap();

        assert_eq!(paths.root(), temp.path().join(ResourcePaths::DIR_NAME));
    }

    #[test]
    fn search_depth_is_bounded() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join(ResourcePaths::DIR_NAME)).unwrap();
        let mut deep = temp.path().to_path_buf();
        for level in 0..ResourcePaths::MAX_DEPTH {
            deep.push(format!("level{level}"));
        }
        fs::create_dir_all(&deep).unwrap();

        let result = ResourcePaths::locate_from(&deep);

        assert!(matches!(result, Err(AssetError::NotFound { .. })));
    }

    #[test]
    fn subdirectories_are_created_on_demand() {
        let temp = tempfile::tempdir().unwrap();
        let paths = ResourcePaths::new(temp.path().join("res")).unwrap();

        let requires = paths.requires().unwrap();

        assert!(requires.is_dir());
        assert!(requires.ends_with("variants/requires"));
    }
}
