use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    networks: HashMap<String, NetworkEntry>,
    #[serde(rename = "clip-libraries")]
    clip_libraries: HashMap<String, String>,
}

/// A network fixture, optionally paired with the clip library it plays.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NetworkEntry {
    Path(String),
    Detailed {
        definition: String,
        #[serde(default)]
        clips: Option<String>,
    },
}

impl NetworkEntry {
    fn definition(&self) -> &str {
        match self {
            NetworkEntry::Path(path) => path,
            NetworkEntry::Detailed { definition, .. } => definition,
        }
    }

    fn clips(&self) -> Option<&str> {
        match self {
            NetworkEntry::Path(_) => None,
            NetworkEntry::Detailed { clips, .. } => clips.as_deref(),
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod networks {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.networks.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.networks, "network", name)?;
        read_to_string(entry.definition())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.networks, "network", name)?;
        super::load_json(entry.definition())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.networks, "network", name)?;
        Ok(resolve_path(entry.definition()))
    }

    /// Key of the clip library paired with this network, if any.
    pub fn clips_key(name: &str) -> Result<Option<String>> {
        let entry = lookup(&MANIFEST.networks, "network", name)?;
        Ok(entry.clips().map(str::to_string))
    }
}

pub mod clip_libraries {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.clip_libraries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.clip_libraries, "clip library", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.clip_libraries, "clip library", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.clip_libraries, "clip library", name)?;
        Ok(resolve_path(rel))
    }
}
