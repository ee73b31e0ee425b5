//! Waste classification rules
//!
//! Pure per-kind predicates deciding whether a resource is wasted,
//! evaluated against raw resource state plus the sampled metric.

use crate::models::ResourceState;

/// Average-CPU percentage below which a running VM counts as idle
pub const IDLE_VM_CPU_THRESHOLD: f64 = 10.0;

/// Decide whether a resource is wasted.
///
/// - A VM is idle when it is running and its windowed average CPU is
///   known and strictly below [`IDLE_VM_CPU_THRESHOLD`]. A VM without
///   metric data is never classified idle.
/// - A disk is wasted when no compute instance owns it.
/// - A public IP is wasted when no IP configuration is bound to it.
pub fn is_wasted(state: &ResourceState) -> bool {
    match state {
        ResourceState::Vm { running, avg_cpu } => {
            *running && avg_cpu.map(|cpu| cpu < IDLE_VM_CPU_THRESHOLD).unwrap_or(false)
        }
        ResourceState::Disk { attached } => !attached,
        ResourceState::PublicIp { associated } => !associated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_vm_below_threshold_is_idle() {
        let state = ResourceState::Vm {
            running: true,
            avg_cpu: Some(4.5),
        };
        assert!(is_wasted(&state));
    }

    #[test]
    fn test_vm_at_threshold_is_not_idle() {
        // The threshold is strict: exactly 10.0 does not qualify
        let state = ResourceState::Vm {
            running: true,
            avg_cpu: Some(IDLE_VM_CPU_THRESHOLD),
        };
        assert!(!is_wasted(&state));
    }

    #[test]
    fn test_vm_without_metric_data_is_not_idle() {
        let state = ResourceState::Vm {
            running: true,
            avg_cpu: None,
        };
        assert!(!is_wasted(&state));
    }

    #[test]
    fn test_stopped_vm_is_not_idle() {
        let state = ResourceState::Vm {
            running: false,
            avg_cpu: Some(0.0),
        };
        assert!(!is_wasted(&state));
    }

    #[test]
    fn test_unattached_disk_is_wasted() {
        assert!(is_wasted(&ResourceState::Disk { attached: false }));
        assert!(!is_wasted(&ResourceState::Disk { attached: true }));
    }

    #[test]
    fn test_unassociated_ip_is_wasted() {
        assert!(is_wasted(&ResourceState::PublicIp { associated: false }));
        assert!(!is_wasted(&ResourceState::PublicIp { associated: true }));
    }

    #[test]
    fn test_boundary_values_around_threshold() {
        let just_below = ResourceState::Vm {
            running: true,
            avg_cpu: Some(9.999),
        };
        let just_above = ResourceState::Vm {
            running: true,
            avg_cpu: Some(10.001),
        };
        assert!(is_wasted(&just_below));
        assert!(!is_wasted(&just_above));
    }
}
