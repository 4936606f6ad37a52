//! Synchronizer configuration.

use wire::Limits;

/// How incoming physics truth is folded into local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileMode {
    /// Unconditionally overwrite local position with the network position.
    Warp,
    /// Below the snap threshold, keep the local position and nudge velocity
    /// toward the truth; at or above it, hard-warp.
    #[default]
    Smooth,
}

/// Tunables for the replication session.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Reconciliation strategy applied to incoming physics state.
    pub reconcile: ReconcileMode,
    /// Positional error (length units) at which smooth correction gives up
    /// and hard-warps.
    pub snap_threshold: f32,
    /// Gain applied to the positional error when nudging velocity.
    pub correction_stiffness: f32,
    /// Physics steps between periodic state broadcasts.
    pub sync_interval_steps: u32,
    /// Snapshot history ring capacity.
    pub history_capacity: usize,
    /// Decode limits for incoming messages.
    pub limits: Limits,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            reconcile: ReconcileMode::Smooth,
            snap_threshold: 5.0,
            correction_stiffness: 1.0,
            sync_interval_steps: 6,
            history_capacity: 31,
            limits: Limits::default(),
        }
    }
}

impl SyncConfig {
    /// Creates a configuration suitable for tests: tight limits, short
    /// cadence, tiny history.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            reconcile: ReconcileMode::Smooth,
            snap_threshold: 5.0,
            correction_stiffness: 1.0,
            sync_interval_steps: 2,
            history_capacity: 4,
            limits: Limits::for_testing(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reconcile_is_smooth() {
        assert_eq!(SyncConfig::default().reconcile, ReconcileMode::Smooth);
        assert_eq!(ReconcileMode::default(), ReconcileMode::Smooth);
    }

    #[test]
    fn default_threshold_and_cadence() {
        let config = SyncConfig::default();
        assert_eq!(config.snap_threshold, 5.0);
        assert_eq!(config.sync_interval_steps, 6);
        assert_eq!(config.history_capacity, 31);
    }

    #[test]
    fn testing_config_is_tighter() {
        let config = SyncConfig::for_testing();
        assert!(config.sync_interval_steps < SyncConfig::default().sync_interval_steps);
        assert!(config.history_capacity < SyncConfig::default().history_capacity);
    }
}
