//! Contract artifact loading from a Foundry build-output tree.
//!
//! Resolves a contract name to its ABI and creation bytecode by probing the
//! conventional `out/<Source>.sol/<Name>.json` path shapes, and caches loaded
//! artifacts for the life of the process. Artifacts are immutable content
//! keyed by name, so a racing double-load is harmless.

use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::Bytes;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::DexError;

/// Source-file names probed when the caller does not specify one.
const COMMON_SOURCE_NAMES: &[&str] = &["src", "contracts", "StandardNFT", "Pair", "PairFactory", "LPToken"];

#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub contract_name: String,
    pub source_name: String,
    pub abi: serde_json::Value,
    pub bytecode: Bytes,
}

/// Foundry writes `bytecode` as an object with an `object` field; older
/// artifact formats inline the hex string directly.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Plain(String),
    Object { object: String },
}

impl RawBytecode {
    fn hex(&self) -> &str {
        match self {
            RawBytecode::Plain(s) => s,
            RawBytecode::Object { object } => object,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawArtifact {
    abi: Option<serde_json::Value>,
    bytecode: Option<RawBytecode>,
    #[serde(rename = "contractName")]
    contract_name: Option<String>,
    #[serde(rename = "sourceName")]
    source_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CacheStatus {
    pub size: usize,
    pub keys: Vec<String>,
}

pub struct ArtifactLoader {
    artifacts_dir: PathBuf,
    cache: DashMap<String, Arc<ContractArtifact>>,
}

impl ArtifactLoader {
    pub fn new(artifacts_dir: impl Into<PathBuf>) -> Self {
        let artifacts_dir = artifacts_dir.into();
        tracing::info!(dir = %artifacts_dir.display(), "Artifact loader initialized");
        Self {
            artifacts_dir,
            cache: DashMap::new(),
        }
    }

    /// Load a contract's artifact, from cache when possible.
    pub async fn load(
        &self,
        contract_name: &str,
        source_name: Option<&str>,
    ) -> Result<Arc<ContractArtifact>, DexError> {
        let cache_key = match source_name {
            Some(source) => format!("{contract_name}_{source}"),
            None => contract_name.to_string(),
        };

        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!(contract = contract_name, "Artifact loaded from cache");
            return Ok(cached.clone());
        }

        let artifact = Arc::new(self.load_from_disk(contract_name, source_name).await?);
        self.cache.insert(cache_key, artifact.clone());

        tracing::info!(
            contract = %artifact.contract_name,
            source = %artifact.source_name,
            bytecode_len = artifact.bytecode.len(),
            "Artifact loaded"
        );
        Ok(artifact)
    }

    async fn load_from_disk(
        &self,
        contract_name: &str,
        source_name: Option<&str>,
    ) -> Result<ContractArtifact, DexError> {
        for path in self.candidate_paths(contract_name, source_name) {
            let content = match tokio::fs::read(&path).await {
                Ok(content) => content,
                Err(_) => continue,
            };

            match parse_artifact(&content, contract_name) {
                Ok(artifact) => return Ok(artifact),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unusable artifact");
                    continue;
                }
            }
        }

        Err(DexError::Artifact(match source_name {
            Some(source) => format!("No artifact found for {contract_name} in {source}"),
            None => format!("No artifact found for {contract_name}"),
        }))
    }

    fn candidate_paths(&self, contract_name: &str, source_name: Option<&str>) -> Vec<PathBuf> {
        let file = format!("{contract_name}.json");
        let mut paths = Vec::new();

        let mut push_source = |source: &str| {
            paths.push(self.artifacts_dir.join(format!("{source}.sol")).join(&file));
            paths.push(self.artifacts_dir.join(source).join(&file));
        };

        match source_name {
            Some(source) => push_source(source),
            None => {
                push_source(contract_name);
                for source in COMMON_SOURCE_NAMES {
                    push_source(source);
                }
            }
        }

        paths
    }

    /// Contract names with a build output under the artifacts directory.
    pub async fn list_available(&self) -> Result<Vec<String>, DexError> {
        let mut contracts = Vec::new();

        let mut entries = match tokio::fs::read_dir(&self.artifacts_dir).await {
            Ok(entries) => entries,
            Err(_) => {
                tracing::warn!(dir = %self.artifacts_dir.display(), "Artifacts directory missing");
                return Ok(contracts);
            }
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DexError::Artifact(format!("Artifact directory scan failed: {e}")))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }
            let mut files = tokio::fs::read_dir(entry.path())
                .await
                .map_err(|e| DexError::Artifact(format!("Artifact directory scan failed: {e}")))?;
            while let Some(file) = files
                .next_entry()
                .await
                .map_err(|e| DexError::Artifact(format!("Artifact directory scan failed: {e}")))?
            {
                let name = file.file_name();
                let name = name.to_string_lossy();
                if let Some(stem) = name.strip_suffix(".json") {
                    contracts.push(stem.to_string());
                }
            }
        }

        contracts.sort();
        contracts.dedup();
        Ok(contracts)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("Artifact cache cleared");
    }

    pub fn cache_status(&self) -> CacheStatus {
        let mut keys: Vec<String> = self.cache.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        CacheStatus {
            size: keys.len(),
            keys,
        }
    }
}

fn parse_artifact(content: &[u8], requested_name: &str) -> Result<ContractArtifact, DexError> {
    let raw: RawArtifact = serde_json::from_slice(content)
        .map_err(|e| DexError::Artifact(format!("Malformed artifact JSON: {e}")))?;

    let abi = raw
        .abi
        .filter(|abi| abi.is_array())
        .ok_or_else(|| DexError::Artifact("Artifact is missing its abi array".into()))?;

    let bytecode_hex = raw
        .bytecode
        .ok_or_else(|| DexError::Artifact("Artifact is missing bytecode".into()))?;
    let bytecode_hex = bytecode_hex.hex().trim_start_matches("0x");
    if bytecode_hex.is_empty() {
        return Err(DexError::Artifact("Artifact bytecode is empty".into()));
    }

    let bytecode = hex::decode(bytecode_hex)
        .map_err(|e| DexError::Artifact(format!("Artifact bytecode is not valid hex: {e}")))?;

    Ok(ContractArtifact {
        contract_name: raw
            .contract_name
            .unwrap_or_else(|| requested_name.to_string()),
        source_name: raw.source_name.unwrap_or_else(|| "unknown".to_string()),
        abi,
        bytecode: Bytes::from(bytecode),
    })
}

impl std::fmt::Debug for ArtifactLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactLoader")
            .field("artifacts_dir", &self.artifacts_dir)
            .field("cached", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write_artifact(dir: &Path, source: &str, name: &str, body: &str) {
        let contract_dir = dir.join(source);
        std::fs::create_dir_all(&contract_dir).unwrap();
        std::fs::write(contract_dir.join(format!("{name}.json")), body).unwrap();
    }

    const FOUNDRY_SHAPE: &str = r#"{
        "abi": [{"type": "constructor", "inputs": []}],
        "bytecode": {"object": "0x6080604052"},
        "contractName": "Pair",
        "sourceName": "src/Pair.sol"
    }"#;

    #[tokio::test]
    async fn test_load_foundry_object_bytecode() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "Pair.sol", "Pair", FOUNDRY_SHAPE);

        let loader = ArtifactLoader::new(dir.path());
        let artifact = loader.load("Pair", None).await.unwrap();
        assert_eq!(artifact.contract_name, "Pair");
        assert_eq!(artifact.bytecode.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
    }

    #[tokio::test]
    async fn test_load_plain_string_bytecode() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(
            dir.path(),
            "Pair.sol",
            "Pair",
            r#"{"abi": [], "bytecode": "0x6001"}"#,
        );

        let loader = ArtifactLoader::new(dir.path());
        let artifact = loader.load("Pair", None).await.unwrap();
        assert_eq!(artifact.bytecode.as_ref(), &[0x60, 0x01]);
    }

    #[tokio::test]
    async fn test_second_load_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "Pair.sol", "Pair", FOUNDRY_SHAPE);

        let loader = ArtifactLoader::new(dir.path());
        let first = loader.load("Pair", None).await.unwrap();

        // Remove the backing file; a cached load must still succeed with
        // identical content.
        std::fs::remove_file(dir.path().join("Pair.sol").join("Pair.json")).unwrap();
        let second = loader.load("Pair", None).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.cache_status().size, 1);
    }

    #[tokio::test]
    async fn test_missing_contract_is_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ArtifactLoader::new(dir.path());

        let err = loader.load("DoesNotExist", None).await.unwrap_err();
        assert!(matches!(err, DexError::Artifact(_)));
        assert!(err.to_string().contains("DoesNotExist"));
    }

    #[tokio::test]
    async fn test_artifact_without_abi_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "Pair.sol", "Pair", r#"{"bytecode": "0x6001"}"#);

        let loader = ArtifactLoader::new(dir.path());
        let err = loader.load("Pair", None).await.unwrap_err();
        assert!(matches!(err, DexError::Artifact(_)));
    }

    #[tokio::test]
    async fn test_list_available() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "Pair.sol", "Pair", FOUNDRY_SHAPE);
        write_artifact(dir.path(), "StandardNFT.sol", "StandardNFT", FOUNDRY_SHAPE);

        let loader = ArtifactLoader::new(dir.path());
        let names = loader.list_available().await.unwrap();
        assert_eq!(names, vec!["Pair".to_string(), "StandardNFT".to_string()]);
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "Pair.sol", "Pair", FOUNDRY_SHAPE);

        let loader = ArtifactLoader::new(dir.path());
        loader.load("Pair", None).await.unwrap();
        assert_eq!(loader.cache_status().size, 1);

        loader.clear_cache();
        assert_eq!(loader.cache_status().size, 0);
    }
}
