//! Multi-version target handling for an ARM/AArch64 JIT and image loader.
//!
//! Built on the `platform` catalogs, this crate turns a user target string
//! into resolved code-generation targets and decides which variant of a
//! precompiled image to load:
//!
//! - [`parse`]: `;`-separated target strings with `+feat`/`-feat`/
//!   `clone_all`/`base=`/`ext=` modifiers.
//! - [`resolve`]: base feature folding, dependency closures, host pinning.
//! - [`matcher`]: best-variant selection with per-variant rejection
//!   reasons, and the vector-call ABI reconciliation.
//! - [`emit`]: `(cpu, ±feature…)` rendering for the compiler backend,
//!   honoring backend-version fallback chains.
//! - [`jit`] (std): the single-assignment process JIT target list, the
//!   sysimg/pkgimg initialization order, clone-directive computation, and
//!   image-generation target specs.
//!
//! # Pipeline
//!
//! ```
//! use platform::Family;
//! use targets::{parse, resolve};
//!
//! let family = Family::AArch64;
//! let host = platform::detect::host();
//! let cmdline = parse::parse_target_string(family, "generic;cortex-a76,+crc,clone_all")?;
//! let first = resolve::resolve_with_host(family, &cmdline[0], &host, true);
//! assert_eq!(first.name, "generic");
//! # Ok::<(), targets::parse::ParseError>(())
//! ```

// Fallibility discipline: deny unwrap/expect in production, allow in tests.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod emit;
pub mod matcher;
pub mod parse;
pub mod resolve;
pub mod target;

#[cfg(feature = "std")]
pub mod jit;

pub use matcher::{ImageMatch, MatchRejection, NO_MATCH, match_image_targets};
pub use parse::{ParseError, check_targets, normalize_cpu_name, parse_target_string};
pub use resolve::{resolve, resolve_with_host};
pub use target::{FeatureFlags, TargetData, flags};

#[cfg(feature = "std")]
pub use jit::{
  CloneTargetSpec, ImageError, InitError, JitTargets, clone_target_specs, cpu_has_fma, init_processor_pkgimg,
  init_processor_sysimg, jit_targets, process_backend_target,
};
