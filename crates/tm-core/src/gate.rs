//! Environment-aware policy deciding which operations may run.
//!
//! The gate is an explicit value handed to the dispatcher at construction.
//! An environment that was never declared forbids every operation; a declared
//! non-production environment allows everything; production allows only the
//! configured allow-list (default `up` and `install`).

use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Operations allowed in production when no allow-list was configured.
pub const DEFAULT_PRODUCTION_OPERATIONS: [Operation; 2] = [Operation::Up, Operation::Install];

/// Deployment environment the migrations target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production data; destructive operations are gated
    Production,
    /// Anything else; every operation is allowed
    Development,
}

impl Environment {
    /// Map a boolean "is production" signal to an environment.
    pub fn from_production_flag(is_production: bool) -> Self {
        if is_production {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    /// Whether this is the production environment.
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Development => write!(f, "development"),
        }
    }
}

/// Production gate configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationGate {
    environment: Option<Environment>,
    production_operations: Option<BTreeSet<Operation>>,
}

impl OperationGate {
    /// A gate whose environment has not been declared. It rejects everything.
    pub fn undeclared() -> Self {
        Self::default()
    }

    /// A gate for a declared environment with the default allow-list.
    pub fn declared(environment: Environment) -> Self {
        Self {
            environment: Some(environment),
            production_operations: None,
        }
    }

    /// Declare whether the current environment is production.
    pub fn declare_production(mut self, is_production: bool) -> Self {
        self.environment = Some(Environment::from_production_flag(is_production));
        self
    }

    /// Set which operations are allowed in production.
    pub fn with_production_operations(
        mut self,
        allowed: impl IntoIterator<Item = Operation>,
    ) -> Self {
        self.production_operations = Some(allowed.into_iter().collect());
        self
    }

    /// The declared environment, if any.
    pub fn environment(&self) -> Option<Environment> {
        self.environment
    }

    /// Whether an environment has been declared.
    pub fn is_declared(&self) -> bool {
        self.environment.is_some()
    }

    /// Whether the production allow-list was set explicitly.
    pub fn production_operations_configured(&self) -> bool {
        self.production_operations.is_some()
    }

    /// The effective production allow-list.
    pub fn production_operations(&self) -> BTreeSet<Operation> {
        match &self.production_operations {
            Some(ops) => ops.clone(),
            None => DEFAULT_PRODUCTION_OPERATIONS.into_iter().collect(),
        }
    }

    /// Whether `operation` may run.
    ///
    /// An undeclared environment is treated like production here; the
    /// dispatcher rejects it outright before consulting the gate.
    pub fn allowed(&self, operation: Operation) -> bool {
        if self.environment == Some(Environment::Development) {
            return true;
        }
        match &self.production_operations {
            Some(ops) => ops.contains(&operation),
            None => DEFAULT_PRODUCTION_OPERATIONS.contains(&operation),
        }
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
