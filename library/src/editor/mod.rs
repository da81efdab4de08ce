//! Editor services - the mutation API a front end drives.
//!
//! Everything that changes a live circuit goes through [`CircuitService`], so
//! connections are always validated and readers always see an evaluated
//! snapshot.

pub mod circuit_service;

pub use circuit_service::CircuitService;

use crate::error::LibraryError;
use crate::model::circuit::Circuit;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Acquire a write lock on the circuit, converting poison errors to LibraryError.
pub fn write_circuit(
    circuit: &Arc<RwLock<Circuit>>,
) -> Result<RwLockWriteGuard<'_, Circuit>, LibraryError> {
    circuit
        .write()
        .map_err(|_| LibraryError::Runtime("Lock Poisoned".to_string()))
}

/// Acquire a read lock on the circuit, converting poison errors to LibraryError.
pub fn read_circuit(
    circuit: &Arc<RwLock<Circuit>>,
) -> Result<RwLockReadGuard<'_, Circuit>, LibraryError> {
    circuit
        .read()
        .map_err(|_| LibraryError::Runtime("Lock Poisoned".to_string()))
}
