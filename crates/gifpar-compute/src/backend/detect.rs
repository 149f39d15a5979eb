//! Backend detection and selection.

use std::sync::Arc;

use super::{Accelerator, AcceleratorBackend, Backend, CpuBackend, FilterBackend};
use crate::scheduler::Capabilities;
use crate::{ComputeError, ComputeResult};

/// Information about a kernel backend.
#[derive(Debug, Clone)]
pub struct BackendInfo {
    /// Backend type.
    pub backend: Backend,
    /// Human-readable name.
    pub name: &'static str,
    /// Whether the backend can be used.
    pub available: bool,
    /// Priority for auto-selection (higher = preferred).
    pub priority: u32,
    /// Description.
    pub description: String,
}

/// Lists the CPU backend and the given accelerator, best first.
pub fn detect_backends(device: &dyn Accelerator) -> Vec<BackendInfo> {
    let cpus = sys_info::cpu_num().unwrap_or(1);
    let mem_mb = sys_info::mem_info().map(|m| m.avail / 1024).unwrap_or(0);

    let accel_available = device.is_available();
    let mut backends = vec![
        BackendInfo {
            backend: Backend::Cpu,
            name: "CPU",
            available: true,
            priority: 10,
            description: format!("{} cores, {} MB available, rayon frame parallelism", cpus, mem_mb),
        },
        BackendInfo {
            backend: Backend::Accelerator,
            name: "Accelerator",
            available: accel_available,
            priority: if accel_available { 100 } else { 0 },
            description: format!("device '{}'", device.name()),
        },
    ];

    backends.sort_by(|a, b| b.priority.cmp(&a.priority));
    backends
}

/// Builds the kernel backend for `requested`.
///
/// Availability comes from the run's `caps` snapshot; the device itself is
/// not asked again. `Auto` falls back to the CPU when the device is absent;
/// asking for the accelerator explicitly fails instead.
pub fn select_backend(
    requested: Backend,
    device: Arc<dyn Accelerator>,
    caps: &Capabilities,
) -> ComputeResult<Arc<dyn FilterBackend>> {
    match requested {
        Backend::Cpu => Ok(Arc::new(CpuBackend::new())),
        Backend::Auto if caps.accelerator => Ok(Arc::new(AcceleratorBackend::detected(device))),
        Backend::Auto => Ok(Arc::new(CpuBackend::new())),
        Backend::Accelerator => {
            if !caps.accelerator {
                return Err(ComputeError::BackendNotAvailable(format!(
                    "accelerator '{}' requested but not available",
                    device.name()
                )));
            }
            Ok(Arc::new(AcceleratorBackend::detected(device)))
        }
    }
}

/// `[+]`/`[-]` listing of every backend.
pub fn describe_backends(device: &dyn Accelerator) -> String {
    let mut desc = String::new();
    for info in detect_backends(device) {
        let status = if info.available { "+" } else { "-" };
        desc.push_str(&format!("[{}] {}: {}\n", status, info.name, info.description));
    }
    desc
}
