use candle_core::Device;
use tracing::{debug, warn};

#[cfg(any(feature = "metal", feature = "cuda"))]
use tracing::info;

use super::error::EmbeddingError;

/// Where model inference should run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DevicePreference {
    /// First available GPU backend compiled in, else CPU.
    #[default]
    Auto,
    /// Always CPU.
    Cpu,
    /// Metal only; fails if the backend is missing or unusable.
    Metal,
    /// CUDA only; fails if the backend is missing or unusable.
    Cuda,
}

impl std::str::FromStr for DevicePreference {
    type Err = EmbeddingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "metal" => Ok(Self::Metal),
            "cuda" => Ok(Self::Cuda),
            other => Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "unknown device '{other}' (expected 'auto', 'cpu', 'metal' or 'cuda')"
                ),
            }),
        }
    }
}

/// Selects the compute device for `preference`.
///
/// `Auto` falls back to CPU when no GPU backend works. An explicit `Metal` or `Cuda`
/// preference returns [`EmbeddingError::DeviceUnavailable`] instead.
pub fn select_device(preference: DevicePreference) -> Result<Device, EmbeddingError> {
    match preference {
        DevicePreference::Cpu => {
            debug!("CPU device requested");
            Ok(Device::Cpu)
        }
        DevicePreference::Metal => metal_device(),
        DevicePreference::Cuda => cuda_device(),
        DevicePreference::Auto => Ok(auto_device()),
    }
}

fn auto_device() -> Device {
    let mut failures: Vec<String> = Vec::new();

    if cfg!(feature = "metal") {
        match metal_device() {
            Ok(device) => return device,
            Err(e) => failures.push(e.to_string()),
        }
    }

    if cfg!(feature = "cuda") {
        match cuda_device() {
            Ok(device) => return device,
            Err(e) => failures.push(e.to_string()),
        }
    }

    if failures.is_empty() {
        debug!("No GPU backend compiled, using CPU");
    } else {
        warn!(reason = %failures.join("; "), "Falling back to CPU device");
    }
    Device::Cpu
}

#[cfg(feature = "metal")]
fn metal_device() -> Result<Device, EmbeddingError> {
    match Device::new_metal(0) {
        Ok(device) => {
            info!("Using Metal GPU for embeddings");
            Ok(device)
        }
        Err(e) => {
            warn!(error = %e, "Metal device unavailable");
            Err(EmbeddingError::DeviceUnavailable {
                device: "metal".to_string(),
                reason: e.to_string(),
            })
        }
    }
}

#[cfg(not(feature = "metal"))]
fn metal_device() -> Result<Device, EmbeddingError> {
    Err(EmbeddingError::DeviceUnavailable {
        device: "metal".to_string(),
        reason: "built without the 'metal' feature".to_string(),
    })
}

#[cfg(feature = "cuda")]
fn cuda_device() -> Result<Device, EmbeddingError> {
    match Device::new_cuda(0) {
        Ok(device) => {
            info!("Using CUDA GPU for embeddings");
            Ok(device)
        }
        Err(e) => {
            warn!(error = %e, "CUDA device unavailable");
            Err(EmbeddingError::DeviceUnavailable {
                device: "cuda".to_string(),
                reason: e.to_string(),
            })
        }
    }
}

#[cfg(not(feature = "cuda"))]
fn cuda_device() -> Result<Device, EmbeddingError> {
    Err(EmbeddingError::DeviceUnavailable {
        device: "cuda".to_string(),
        reason: "built without the 'cuda' feature".to_string(),
    })
}
