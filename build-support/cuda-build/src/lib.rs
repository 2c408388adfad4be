//! Build utilities for the CUDA FFI crates.
//!
//! Locates the CUDA toolkit and prints the cargo directives needed to link
//! the runtime and cuRAND libraries.

use std::env;
use std::path::{Path, PathBuf};

/// A linkable CUDA library.
#[derive(Debug, Clone)]
pub struct CudaLib {
    pub name: &'static str,
    pub header: &'static str,
    pub lib_name: &'static str,
}

pub mod libs {
    use super::CudaLib;

    pub const CUDA_RUNTIME: CudaLib = CudaLib {
        name: "CUDA Runtime",
        header: "cuda_runtime.h",
        lib_name: "cudart",
    };

    pub const CURAND: CudaLib = CudaLib {
        name: "cuRAND",
        header: "curand.h",
        lib_name: "curand",
    };
}

/// Detects the CUDA installation path.
///
/// Checks in order:
/// 1. `CUDA_PATH` environment variable
/// 2. `CUDA_HOME` environment variable
/// 3. Default Windows path: `C:\Program Files\NVIDIA GPU Computing Toolkit\CUDA\v1x.y`
/// 4. Default Linux path: `/usr/local/cuda`
pub fn detect_cuda_path() -> Option<PathBuf> {
    for var in ["CUDA_PATH", "CUDA_HOME"] {
        if let Ok(path) = env::var(var) {
            let p = PathBuf::from(&path);
            if p.exists() {
                return Some(p);
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        let versions = ["v12.6", "v12.5", "v12.4", "v12.3", "v12.2", "v12.1", "v12.0", "v11.8"];
        for ver in versions {
            let path = PathBuf::from(format!(
                r"C:\Program Files\NVIDIA GPU Computing Toolkit\CUDA\{ver}"
            ));
            if path.exists() {
                return Some(path);
            }
        }
    }

    #[cfg(target_os = "linux")]
    {
        let path = PathBuf::from("/usr/local/cuda");
        if path.exists() {
            return Some(path);
        }
    }

    None
}

/// Library directory below a toolkit root for the current platform.
pub fn lib_dir_for(cuda_path: &Path) -> PathBuf {
    if cfg!(target_os = "windows") {
        cuda_path.join("lib").join("x64")
    } else if cfg!(target_os = "linux") {
        cuda_path.join("lib64")
    } else {
        cuda_path.join("lib")
    }
}

/// Returns the library search path for CUDA.
pub fn cuda_lib_path() -> Option<PathBuf> {
    detect_cuda_path().map(|p| lib_dir_for(&p))
}

/// Returns the include path for CUDA headers.
pub fn cuda_include_path() -> Option<PathBuf> {
    detect_cuda_path().map(|p| p.join("include"))
}

/// Emits cargo directives to link a CUDA library.
///
/// This function should be called from a `build.rs` script.
pub fn link_cuda_lib(lib: &CudaLib) {
    if let Some(lib_path) = cuda_lib_path() {
        println!("cargo:rustc-link-search=native={}", lib_path.display());
    }
    println!("cargo:rustc-link-lib={}", lib.lib_name);
}

/// Emits cargo directives to link the CUDA runtime.
pub fn link_cuda_runtime() {
    link_cuda_lib(&libs::CUDA_RUNTIME);
}

/// Emits cargo directives to link cuRAND.
pub fn link_curand() {
    link_cuda_lib(&libs::CURAND);
}

/// Whether a CUDA toolkit was found to link against.
pub fn toolkit_available() -> bool {
    detect_cuda_path().is_some()
}

/// Prints build information for debugging.
pub fn print_build_info() {
    println!("cargo:rerun-if-env-changed=CUDA_PATH");
    println!("cargo:rerun-if-env-changed=CUDA_HOME");

    if !toolkit_available() {
        println!("cargo:warning=CUDA toolkit not found, building stub bindings");
    }
}

/// Enable the `stub` feature of the calling crate.
///
/// Used by the -sys build scripts when no toolkit is available, so the
/// workspace still builds and tests on machines without CUDA.
pub fn enable_stub() {
    println!("cargo:rustc-cfg=feature=\"stub\"");
}
