use candle_core::Device;
use tracing::{debug, info, warn};

use super::error::ModelError;
use crate::config::ComputeTarget;

/// Resolves a [`ComputeTarget`] to a device.
///
/// Explicit targets fail if the backend is unavailable; [`ComputeTarget::Auto`] falls back
/// to CPU.
pub fn select_device(target: ComputeTarget) -> Result<Device, ModelError> {
    let unavailable = |e: candle_core::Error| ModelError::DeviceUnavailable {
        device: target.to_string(),
        reason: e.to_string(),
    };

    match target {
        ComputeTarget::Cpu => Ok(Device::Cpu),
        ComputeTarget::Cuda(ordinal) => {
            let device = Device::new_cuda(ordinal).map_err(unavailable)?;
            info!(ordinal, "Using CUDA GPU acceleration");
            Ok(device)
        }
        ComputeTarget::Metal(ordinal) => {
            let device = Device::new_metal(ordinal).map_err(unavailable)?;
            info!(ordinal, "Using Metal GPU acceleration");
            Ok(device)
        }
        ComputeTarget::Auto => Ok(auto_device()),
    }
}

/// First compiled GPU backend that initialises, else CPU.
fn auto_device() -> Device {
    #[cfg(any(feature = "metal", feature = "cuda"))]
    let mut failures: Vec<String> = Vec::new();

    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    let failures: Vec<String> = Vec::new();

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!("Using Metal GPU acceleration");
                return device;
            }
            Err(e) => {
                let msg = e.to_string();
                warn!(error = %msg, "Metal device unavailable");
                failures.push(format!("metal failed: {msg}"));
            }
        }
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!("Using CUDA GPU acceleration");
                return device;
            }
            Err(e) => {
                let msg = e.to_string();
                warn!(error = %msg, "CUDA device unavailable");
                failures.push(format!("cuda failed: {msg}"));
            }
        }
    }

    if !cfg!(any(feature = "metal", feature = "cuda")) {
        debug!("No GPU features enabled, using CPU");
        return Device::Cpu;
    }

    let reason = if failures.is_empty() {
        "no GPU device available".to_string()
    } else {
        failures.join("; ")
    };

    warn!(reason = %reason, "Falling back to CPU device");
    Device::Cpu
}
