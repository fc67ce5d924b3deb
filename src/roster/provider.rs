// Roster data provider
// Supplies the initial player records. The store never sees a partial roster:
// any failure here yields a LoadError and the session starts empty.
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, error};

use super::models::PlayerRecord;
use crate::error::LoadError;

pub trait RosterProvider: Send + 'static {
    fn fetch(&self) -> Result<Vec<PlayerRecord>, LoadError>;
}

/// Reads the lineup from a `players.json` document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn source_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl RosterProvider for JsonFileProvider {
    fn fetch(&self) -> Result<Vec<PlayerRecord>, LoadError> {
        let source_name = self.source_name();
        let content = fs::read_to_string(&self.path).map_err(|e| {
            error!(path = ?self.path, "Could not load player data: {}", e);
            LoadError::Unreadable {
                source_name: source_name.clone(),
                reason: e.to_string(),
            }
        })?;

        let players = parse_players(&content, &source_name)?;
        debug!(path = ?self.path, count = players.len(), "Players fetched");
        Ok(players)
    }
}

/// A fixed roster, for embedding hosts that fetch the data themselves.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    players: Vec<PlayerRecord>,
}

impl StaticProvider {
    pub fn new(players: Vec<PlayerRecord>) -> Self {
        Self { players }
    }
}

impl RosterProvider for StaticProvider {
    fn fetch(&self) -> Result<Vec<PlayerRecord>, LoadError> {
        Ok(self.players.clone())
    }
}

pub fn parse_players(content: &str, source_name: &str) -> Result<Vec<PlayerRecord>, LoadError> {
    let malformed = |e: serde_json::Error| LoadError::Malformed {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    };

    let document: Value = serde_json::from_str(content).map_err(malformed)?;
    if !document.is_array() {
        return Err(LoadError::NotAnArray {
            source_name: source_name.to_string(),
        });
    }

    let players: Vec<PlayerRecord> = serde_json::from_value(document).map_err(malformed)?;

    let mut seen = HashSet::with_capacity(players.len());
    if let Some(dup) = players.iter().find(|p| !seen.insert(p.id)) {
        return Err(LoadError::DuplicateId {
            source_name: source_name.to_string(),
            id: dup.id,
        });
    }

    Ok(players)
}
