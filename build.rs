//! Build script: embed the git hash and pre-flight GPU toolkit checks.
//!
//! The checks run before whisper-rs-sys compiles so a missing toolkit fails
//! with an actionable message instead of a wall of C++ errors.

use std::process::Command;

fn main() {
    // Embed git short hash for version string
    if let Ok(output) = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        && output.status.success()
    {
        let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=GIT_HASH={}", hash);
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");

    if cfg!(feature = "cuda") {
        check_cuda();
    }
    if cfg!(feature = "vulkan") {
        check_vulkan();
    }
}

fn check_cuda() {
    let found = Command::new("nvcc")
        .arg("--version")
        .output()
        .is_ok_and(|out| out.status.success());
    if !found {
        panic!(
            "\n`nvcc` not found: the CUDA toolkit is not installed.\n\
             Install it from https://developer.nvidia.com/cuda-downloads\n\
             or build without CUDA: cargo build --release\n",
        );
    }
    println!("cargo::warning=CUDA toolkit detected");
}

fn check_vulkan() {
    if Command::new("vulkaninfo")
        .arg("--summary")
        .output()
        .is_err()
    {
        panic!(
            "\n`vulkaninfo` not found: the Vulkan SDK is not installed.\n\
             Install it from https://vulkan.lunarg.com/\n\
             or build without Vulkan: cargo build --release\n",
        );
    }
    println!("cargo::warning=Vulkan SDK detected");
}
