//! Operation dispatch behind the production gate.

use tm_core::{Operation, OperationGate};
use tm_db::Database;

use crate::engine::{MigrationEngine, OperationReport};
use crate::error::{MigrateResult, MigrationError};

/// Warning logged when the production allow-list was never configured.
pub const UNCONFIGURED_OPERATIONS_WARNING: &str = "production-safe migration operations have not been set; only 'up' and 'install' will be allowed if the current environment has been set to production";

/// Fail unless the gate names an environment.
///
/// Callers run this before opening the database or touching the project
/// directory.
pub fn ensure_declared(gate: &OperationGate) -> MigrateResult<()> {
    if gate.is_declared() {
        return Ok(());
    }
    Err(MigrationError::configuration(
        "the current environment must be declared (production or development) before running any migration operation",
    ))
}

/// Maps an operation name and dry-run flag to an engine call.
pub struct Dispatcher<D: Database> {
    engine: MigrationEngine<D>,
    gate: OperationGate,
}

impl<D: Database> Dispatcher<D> {
    /// Create a dispatcher with an explicit gate.
    pub fn new(engine: MigrationEngine<D>, gate: OperationGate) -> Self {
        Self { engine, gate }
    }

    /// Run the operation called `name` (empty means `up`).
    ///
    /// Checks run in order, and each stops the call before the engine is
    /// touched: the environment must be declared, the name must be known,
    /// and the gate must allow the operation.
    pub fn handle(&mut self, name: &str, dry_run: bool) -> OperationReport {
        if let Err(e) = ensure_declared(&self.gate) {
            return OperationReport::failed(None, e);
        }

        if !self.gate.production_operations_configured() {
            log::warn!("{UNCONFIGURED_OPERATIONS_WARNING}");
        }

        if dry_run {
            self.engine.set_debug(true);
        }

        let operation = match Operation::from_name(name) {
            Ok(operation) => operation,
            Err(e) => return OperationReport::failed(None, e.into()),
        };

        self.handle_operation(operation)
    }

    /// Gate-check and run an already resolved operation.
    pub fn handle_operation(&mut self, operation: Operation) -> OperationReport {
        if !self.gate.allowed(operation) {
            log::error!("'{operation}' operation is not allowed in a production environment");
            return OperationReport::failed(
                Some(operation),
                MigrationError::PolicyViolation { operation },
            );
        }

        log::debug!("Dispatching '{operation}' (environment: {:?})", self.gate.environment());
        match operation {
            Operation::Install => match self.engine.install() {
                Ok(()) => OperationReport {
                    operation: Some(operation),
                    ..OperationReport::default()
                },
                Err(e) => OperationReport::failed(Some(operation), e),
            },
            Operation::Up => self.engine.migrate(),
            Operation::Drop => self.engine.drop_all(),
            Operation::Reset => self.engine.reset(),
        }
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &MigrationEngine<D> {
        &self.engine
    }

    /// The gate in force.
    pub fn gate(&self) -> &OperationGate {
        &self.gate
    }
}

#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod tests;
