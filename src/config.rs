//! Configuration for the debugger backends.

use crate::bus::RomSet;
use std::time::Duration;

//===========================================================================//

/// The machine simulated by the local backend.
#[derive(Clone, Debug, Default)]
pub enum Machine {
    /// A 6502 with 64kB of flat RAM.
    #[default]
    Flat,
    /// A C64: a 6510 with bank-switched ROMs.
    C64(RomSet),
}

//===========================================================================//

/// Configuration for the local (interpreter-backed) backend.
#[derive(Clone, Debug)]
pub struct LocalConfig {
    /// Wall-clock budget of one run slice before yielding.
    pub slice_time: Duration,
    /// Number of instructions executed between clock checks.
    pub slice_check_interval: u32,
    /// Optional instruction limit per run slice.
    pub slice_max_steps: Option<u64>,
    /// Pause between run slices.
    pub slice_sleep: Duration,
    /// Optional bound on consecutive steps that land on addresses without a
    /// source mapping.  Exceeding it stops the engine with a failure.
    pub unmapped_step_budget: Option<u64>,
    /// The simulated machine.
    pub machine: Machine,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            slice_time: Duration::from_millis(10),
            slice_check_interval: 1000,
            slice_max_steps: None,
            slice_sleep: Duration::from_millis(10),
            unmapped_step_budget: None,
            machine: Machine::Flat,
        }
    }
}

impl LocalConfig {
    /// Set the wall-clock budget of a run slice.
    pub fn with_slice_time(mut self, slice_time: Duration) -> Self {
        self.slice_time = slice_time;
        self
    }

    /// Set the instruction limit of a run slice.
    pub fn with_slice_max_steps(mut self, steps: u64) -> Self {
        self.slice_max_steps = Some(steps);
        self
    }

    /// Set the pause between run slices.
    pub fn with_slice_sleep(mut self, sleep: Duration) -> Self {
        self.slice_sleep = sleep;
        self
    }

    /// Set the unmapped step budget.
    pub fn with_unmapped_step_budget(mut self, budget: u64) -> Self {
        self.unmapped_step_budget = Some(budget);
        self
    }

    /// Set the simulated machine.
    pub fn with_machine(mut self, machine: Machine) -> Self {
        self.machine = machine;
        self
    }
}

//===========================================================================//

/// Configuration for a binary monitor connection.
#[derive(Clone, Debug)]
pub struct MonitorConfig {
    /// Host running the monitor.
    pub host: String,
    /// Monitor port.
    pub port: u16,
    /// Total time to keep retrying a refused connection.
    pub connect_timeout: Duration,
    /// Delay between connection attempts.
    pub retry_interval: Duration,
    /// Maximum number of outstanding requests.
    pub max_pending: usize,
    /// Size of the receive buffer in bytes.
    pub receive_buffer: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6502,
            connect_timeout: Duration::from_secs(5),
            retry_interval: Duration::from_millis(250),
            max_pending: 64,
            receive_buffer: 256 * 1024,
        }
    }
}

impl MonitorConfig {
    /// Create a configuration for the given host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port, ..Self::default() }
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the delay between connection attempts.
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Set the maximum number of outstanding requests.
    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending.max(1);
        self
    }

    /// Set the receive buffer size.
    pub fn with_receive_buffer(mut self, size: usize) -> Self {
        self.receive_buffer = size;
        self
    }
}

//===========================================================================//

/// Configuration for the remote (monitor-backed) backend.
#[derive(Clone, Debug)]
pub struct RemoteConfig {
    /// The monitor connection.
    pub monitor: MonitorConfig,
    /// Bound on consecutive single-instruction advances issued while
    /// looking for an address with a source mapping.
    pub unmapped_step_budget: Option<u64>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self { monitor: MonitorConfig::default(), unmapped_step_budget: Some(4096) }
    }
}

impl RemoteConfig {
    /// Create a configuration for the given monitor connection.
    pub fn new(monitor: MonitorConfig) -> Self {
        Self { monitor, ..Self::default() }
    }

    /// Set the unmapped step budget; `None` removes the bound.
    pub fn with_unmapped_step_budget(mut self, budget: Option<u64>) -> Self {
        self.unmapped_step_budget = budget;
        self
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{LocalConfig, Machine, MonitorConfig, RemoteConfig};
    use std::time::Duration;

    #[test]
    fn local_defaults() {
        let config = LocalConfig::default();
        assert_eq!(config.slice_time, Duration::from_millis(10));
        assert_eq!(config.slice_check_interval, 1000);
        assert_eq!(config.slice_max_steps, None);
        assert_eq!(config.unmapped_step_budget, None);
        assert!(matches!(config.machine, Machine::Flat));
    }

    #[test]
    fn monitor_builder() {
        let config = MonitorConfig::new("localhost", 6510)
            .with_connect_timeout(Duration::from_secs(1))
            .with_max_pending(0);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 6510);
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert_eq!(config.retry_interval, Duration::from_millis(250));
        assert_eq!(config.max_pending, 1);
        assert_eq!(config.receive_buffer, 256 * 1024);
    }

    #[test]
    fn remote_defaults() {
        let config = RemoteConfig::default();
        assert_eq!(config.unmapped_step_budget, Some(4096));
        assert_eq!(config.monitor.port, 6502);
        let config = config.with_unmapped_step_budget(None);
        assert_eq!(config.unmapped_step_budget, None);
    }
}

//===========================================================================//
