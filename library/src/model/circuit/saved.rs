//! On-disk shape of a saved circuit.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::circuit::Circuit;
use crate::error::LibraryError;
use crate::evaluation::{EvaluationConfig, evaluate};

/// A named, timestamped circuit document: `{id, name, gates, wires, timestamp}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SavedCircuit {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub circuit: Circuit,
    /// Milliseconds since the UNIX epoch at which the document was saved.
    pub timestamp: u64,
}

impl SavedCircuit {
    pub fn new(name: &str, circuit: Circuit, timestamp: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            circuit,
            timestamp,
        }
    }

    pub fn load(json_str: &str) -> Result<Self, LibraryError> {
        let saved: SavedCircuit = serde_json::from_str(json_str)?;
        for gate in &saved.circuit.gates {
            if let Some(definition) = &gate.definition {
                definition.validate()?;
            }
        }
        Ok(saved)
    }

    pub fn save(&self) -> Result<String, LibraryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let json = fs::read_to_string(path)?;
        Self::load(&json)
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), LibraryError> {
        fs::write(path, self.save()?)?;
        Ok(())
    }

    /// Evaluate the contained circuit, keeping id, name and timestamp.
    pub fn evaluate(&self, config: &EvaluationConfig, now_ms: u64) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            circuit: evaluate(&self.circuit, config, now_ms),
            timestamp: self.timestamp,
        }
    }
}
