//! Routing targets and the services file that declares them.
//!
//! ```json
//! {
//!   "orders": { "rootDir": "../orders" },
//!   "web": { "rootDir": "../web" }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{CodegenError, Result};

pub const GENERATED_DIR: &str = "generated";
pub const PROTOS_DIR: &str = "protos";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceConfig {
    root_dir: PathBuf,
}

/// One downstream consumer of generated artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub root_dir: PathBuf,
    pub generated_dir: PathBuf,
    pub protos_dir: PathBuf,
}

impl Service {
    /// Creates `root/generated` and `root/protos` when they do not exist yet.
    pub fn create(name: impl Into<String>, root_dir: impl Into<PathBuf>) -> Result<Self> {
        let root_dir = root_dir.into();
        let service = Self {
            name: name.into(),
            generated_dir: root_dir.join(GENERATED_DIR),
            protos_dir: root_dir.join(PROTOS_DIR),
            root_dir,
        };
        for dir in [&service.generated_dir, &service.protos_dir] {
            if !dir.is_dir() {
                fs::create_dir_all(dir).map_err(|e| CodegenError::io(dir, e))?;
            }
        }
        Ok(service)
    }

    /// Copy `<source_dir>/<file_name>` into this service's protos directory.
    pub fn copy_proto(&self, source_dir: &Path, file_name: &str) -> Result<PathBuf> {
        let source = source_dir.join(file_name);
        let target = self.protos_dir.join(file_name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| CodegenError::io(parent, e))?;
        }
        fs::copy(&source, &target).map_err(|e| CodegenError::io(&source, e))?;
        tracing::debug!(
            service = %self.name,
            from = %source.display(),
            to = %target.display(),
            "copied proto source"
        );
        Ok(target)
    }
}

/// All configured services, iterated in the order the services file declares them.
#[derive(Debug, Default, Clone)]
pub struct ServiceRegistry {
    services: IndexMap<String, Service>,
}

impl ServiceRegistry {
    /// Load the services file and set up every service's directories.
    ///
    /// Relative `rootDir` values are taken relative to the working directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| CodegenError::io(path, e))?;
        let configs: IndexMap<String, ServiceConfig> =
            serde_json::from_str(&text).map_err(|source| CodegenError::ServicesFile {
                path: path.to_path_buf(),
                source,
            })?;
        let registry = configs
            .into_iter()
            .map(|(name, config)| Service::create(name, config.root_dir))
            .collect::<Result<Self>>()?;
        tracing::info!(
            path = %path.display(),
            services = registry.len(),
            "loaded services file"
        );
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Service> {
        self.services.values()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl FromIterator<Service> for ServiceRegistry {
    fn from_iter<I: IntoIterator<Item = Service>>(iter: I) -> Self {
        Self {
            services: iter
                .into_iter()
                .map(|service| (service.name.clone(), service))
                .collect(),
        }
    }
}
