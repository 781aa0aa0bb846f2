use serde::{Deserialize, Serialize};

/// Where element-wise parameter kernels run.
///
/// Passed explicitly through the agent configuration; there is no process-wide
/// default. Every variant blocks until the computation has finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Device {
    /// Single-threaded execution on the calling thread
    #[default]
    Cpu,
    /// Data-parallel execution on the rayon global pool
    Parallel,
}
