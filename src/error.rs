use thiserror::Error;

/// Errors raised by the simulation core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// Every agent is already infected (or there are no agents at all).
    ///
    /// Recoverable: callers may treat this as a no-op and retry once some agents recover.
    #[error("no healthy agents left to infect")]
    NoHealthyAgents,

    /// World or agent parameters that cannot describe a valid simulation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
