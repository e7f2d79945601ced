//! ARM/AArch64 CPU identification and multi-version code dispatch.
//!
//! `armmv` answers the three questions that gate native code generation and
//! precompiled-image selection on ARM:
//!
//! 1. **What is the host?** — [`platform::detect::host`] fuses the kernel
//!    auxiliary vector, per-core MIDR registers, `/proc/cpuinfo`, and the
//!    Darwin brand string into one `(model, feature vector)` pair, cached
//!    for the process lifetime.
//! 2. **What did the user ask for?** — [`targets::parse_target_string`] and
//!    [`targets::resolve_with_host`] turn `cpu[,+feat,-feat,…][;…]` target
//!    strings into closed feature sets for the compiler backend.
//! 3. **Which image variant should load?** — [`targets::jit`] scores image
//!    variants against the resolved JIT target, enforces the sysimg-then-
//!    pkgimg initialization order, and computes clone directives for
//!    multi-versioned functions.
//!
//! # Quick Start
//!
//! ```
//! use armmv::{Family, detect, parse_target_string, resolve_with_host};
//!
//! let family = Family::native();
//! let host = detect::host();
//! let cmdline = parse_target_string(family, "native")?;
//! let target = resolve_with_host(family, &cmdline[0], &host, true);
//! let (cpu, flags) = armmv::emit::backend_target_string(family, &target, 140000);
//! assert!(!cpu.is_empty());
//! let _ = flags;
//! # Ok::<(), armmv::ParseError>(())
//! ```
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `std`   | Yes     | Host discovery and the process JIT target list |
#![cfg_attr(not(feature = "std"), no_std)]

pub use platform::{
  self, ArmArch, Cpu, CpuId, CpuSpec, FeatureName, FeatureSet, Family, Host, cpuid, depends, detect, features, fpcr,
  host, host_cpu_name, test_cpu_feature,
};
pub use targets::{
  self, FeatureFlags, ImageMatch, MatchRejection, NO_MATCH, ParseError, TargetData, check_targets, emit, flags,
  match_image_targets, matcher, normalize_cpu_name, parse, parse_target_string, resolve, resolve_with_host,
};

#[cfg(feature = "std")]
pub use platform::describe_host;
#[cfg(feature = "std")]
pub use targets::{
  CloneTargetSpec, ImageError, InitError, JitTargets, clone_target_specs, cpu_has_fma, init_processor_pkgimg,
  init_processor_sysimg, jit_targets, process_backend_target,
};
