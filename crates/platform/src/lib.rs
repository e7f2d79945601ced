//! ARM/AArch64 CPU identification for multi-version code dispatch.
//!
//! This crate is the single source of truth for *what the host CPU is* and
//! *what a named CPU model can do*. It answers with catalogs and one fused
//! detection result:
//!
//! - [`features`]: fixed-width feature vectors with stable bit identifiers
//!   (word 0/1 mirror the kernel HWCAP/HWCAP2 words, word 2 is nominal).
//! - [`cpu`]: the closed per-family CPU model catalogs, with base feature
//!   sets and backend fallback chains.
//! - [`depends`]: enable/disable dependency closures over the catalogs.
//! - [`detect`]: host discovery — auxval + MIDR + procfs on Linux-likes,
//!   the brand string on Darwin — fused once per process.
//! - [`fpcr`]: floating-point control register accessors.
//!
//! # Example
//!
//! ```
//! use platform::{Family, detect};
//!
//! let (cpu, features) = detect::host();
//! let name = Family::native().cpu_name(cpu);
//! assert!(!name.is_empty());
//! let _ = features;
//! ```
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `std`   | Yes     | Runtime host discovery and the process-wide cache |
//!
//! Without `std` the catalogs and algebra are fully usable; discovery
//! degrades to the generic model with an empty feature vector.

// Fallibility discipline: deny unwrap/expect in production, allow in tests.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod cpu;
pub mod cpuid;
pub mod depends;
pub mod detect;
pub mod family;
pub mod features;
pub mod fpcr;

pub use cpu::{Cpu, CpuSpec, find_cpu_by_id, find_cpu_by_name, find_cpu_name};
pub use cpuid::{CpuId, cpuid_to_cpu};
pub use depends::FeatureDep;
pub use detect::{Host, host, host_cpu_name, test_cpu_feature};
pub use family::{ArmArch, Family};
pub use features::{FEATURE_BITS, FEATURE_WORDS, FeatureName, FeatureSet, REAL_MASK, find_feature_bit};

/// Human-readable description of the detected host.
///
/// One line with the model name, one with the named features present, in
/// catalog order. Diagnostics only; the format is not stable.
#[cfg(feature = "std")]
#[must_use]
pub fn describe_host() -> std::string::String {
  use std::fmt::Write;

  let (cpu, features) = detect::host();
  let family = Family::native();
  let mut out = std::string::String::new();
  let _ = writeln!(out, "{}", family.cpu_name(cpu));
  out.push_str("features:");
  let mut first = true;
  for f in family.feature_names() {
    if features.test(f.bit) {
      out.push_str(if first { " " } else { ", " });
      out.push_str(f.name);
      first = false;
    }
  }
  out.push('\n');
  out
}
