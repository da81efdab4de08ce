use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Unknown gate kind: {0}")]
    UnknownGateKind(String),
    #[error("Gate {0} not found")]
    GateNotFound(Uuid),
    #[error("Wire {0} not found")]
    WireNotFound(Uuid),
    #[error("Gate {0} is not an INPUT gate")]
    NotAnInput(Uuid),
    #[error("Gate {0} is not a CLOCK gate")]
    NotAClock(Uuid),
    #[error("Invalid custom gate definition: {0}")]
    InvalidCustomDefinition(String),
    #[error("Connection rejected: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl LibraryError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        LibraryError::InvalidArgument(msg.into())
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        LibraryError::Runtime(msg.into())
    }
}

/// Why a connection attempt was rejected.
///
/// Returned as data so the editor can show the reason; the circuit is left
/// untouched whenever one of these is produced.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("Gate {0} not found")]
    GateNotFound(Uuid),
    #[error("A wire must run from an output pin to an input pin")]
    IncompatiblePinType,
    #[error("Cannot connect a gate to itself")]
    SelfLoop,
    #[error("Input pin already has a connection")]
    AlreadyConnected,
    #[error("Pin index {index} is out of range for gate {gate_id}")]
    InvalidPinIndex { gate_id: Uuid, index: usize },
}
