//! Process-wide JIT target state and image initialization.
//!
//! The resolved JIT target list is single-assignment state: built lazily on
//! the first request, frozen forever after. System-image initialization
//! publishes it (exactly once); package-image initialization reuses it and
//! is only legal after the system image with exactly one JIT target.
//!
//! The state lives in a [`JitTargets`] value taking an explicit host, so
//! the whole pipeline is testable on local instances with synthetic hosts;
//! the process instance behind [`jit_targets`] is bound to the detected
//! host and the native family.

use alloc::{string::String, vec::Vec};

use platform::{Family, detect::Host};

use crate::{
  emit,
  matcher::{self, ImageMatch, MatchRejection},
  parse::{self, ParseError},
  resolve::resolve_with_host,
  target::{TargetData, flags},
};

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Initialization-order violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum InitError {
  /// The JIT target list is already published.
  AlreadyInitialized,
  /// Package-image initialization before system-image initialization.
  NotInitialized,
  /// Package-image initialization with a multi-target JIT list.
  MultipleTargets,
}

impl core::fmt::Display for InitError {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      Self::AlreadyInitialized => f.write_str("JIT targets already initialized"),
      Self::NotInitialized => f.write_str("JIT targets not initialized"),
      Self::MultipleTargets => f.write_str("expected exactly one JIT target"),
    }
  }
}

impl core::error::Error for InitError {}

/// Any failure of the image-initialization entry points.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ImageError {
  /// Initialization order was violated (fatal for the process).
  Init(InitError),
  /// The target string did not parse.
  Parse(ParseError),
  /// No image variant is loadable on this target.
  Match(MatchRejection),
}

impl core::fmt::Display for ImageError {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      Self::Init(e) => e.fmt(f),
      Self::Parse(e) => e.fmt(f),
      Self::Match(e) => e.fmt(f),
    }
  }
}

impl core::error::Error for ImageError {}

impl From<InitError> for ImageError {
  fn from(e: InitError) -> Self {
    Self::Init(e)
  }
}

impl From<ParseError> for ImageError {
  fn from(e: ParseError) -> Self {
    Self::Parse(e)
  }
}

impl From<MatchRejection> for ImageError {
  fn from(e: MatchRejection) -> Self {
    Self::Match(e)
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clone directives
// ─────────────────────────────────────────────────────────────────────────────

/// Decide clone directives for every non-base target.
///
/// Targets carrying [`flags::CLONE_ALL`] are left as requested. Everything
/// else always clones feature-inspecting code and loops, plus the
/// float16/math/SIMD families when the target adds the relevant features
/// over its base target.
pub fn compute_clone_flags(family: Family, targets: &mut [TargetData]) {
  let clone_fp16: [u32; 2] = match family {
    Family::AArch64 => {
      use platform::features::aarch64 as f;
      [f::FP16FML, f::FULLFP16]
    }
    Family::AArch32 => {
      use platform::features::aarch32 as f;
      [f::FP16FML, f::FULLFP16]
    }
  };

  for i in 1..targets.len() {
    let Some(t) = targets.get(i) else { break };
    if t.en.flags & flags::CLONE_ALL != 0 {
      continue;
    }
    let base_features = targets
      .get(t.base as usize)
      .map(|b| b.en.features)
      .unwrap_or_default();

    let Some(t) = targets.get_mut(i) else { break };
    // Code probing CPU features observes the target it runs on.
    t.en.flags |= flags::CLONE_CPU;
    for bit in clone_fp16 {
      if !base_features.test(bit) && t.en.features.test(bit) {
        t.en.flags |= flags::CLONE_FLOAT16;
        break;
      }
    }
    // Loops are where multi-versioning usually pays off.
    t.en.flags |= flags::CLONE_LOOP;
    if family == Family::AArch32 {
      use platform::features::aarch32 as f;
      for bit in [f::VFP3, f::VFP4, f::NEON] {
        if !base_features.test(bit) && t.en.features.test(bit) {
          t.en.flags |= flags::CLONE_MATH;
          break;
        }
      }
      if !base_features.test(f::NEON) && t.en.features.test(f::NEON) {
        t.en.flags |= flags::CLONE_SIMD;
      }
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// JitTargets
// ─────────────────────────────────────────────────────────────────────────────

/// Single-assignment JIT target list.
pub struct JitTargets {
  cell: std::sync::OnceLock<Vec<TargetData>>,
}

impl Default for JitTargets {
  fn default() -> Self {
    Self::new()
  }
}

impl JitTargets {
  /// An unset list.
  #[must_use]
  pub const fn new() -> Self {
    Self { cell: std::sync::OnceLock::new() }
  }

  /// The published list, if any.
  #[must_use]
  pub fn get(&self) -> Option<&[TargetData]> {
    self.cell.get().map(Vec::as_slice)
  }

  fn publish(&self, targets: Vec<TargetData>) -> Result<&[TargetData], InitError> {
    self
      .cell
      .set(targets)
      .map_err(|_| InitError::AlreadyInitialized)?;
    self.cell.get().map(Vec::as_slice).ok_or(InitError::AlreadyInitialized)
  }

  /// System-image initialization.
  ///
  /// Resolves the first command-line target pinned to `host`, matches it
  /// against the image variants, reconciles the vector calling convention,
  /// and publishes the adjusted target as the JIT target. Returns the
  /// match (variant index to load plus its register size).
  ///
  /// Calling this twice is an initialization-order violation.
  pub fn init_sysimg(
    &self,
    family: Family,
    host: &Host,
    variants: &[TargetData],
    cpu_target: &str,
  ) -> Result<ImageMatch, ImageError> {
    if self.cell.get().is_some() {
      return Err(InitError::AlreadyInitialized.into());
    }
    let cmdline = parse::parse_target_string(family, cpu_target)?;
    let first = cmdline.first().ok_or(ParseError::Empty)?;
    let mut target = resolve_with_host(family, first, host, true);

    let variants = normalized(variants);
    let m = matcher::match_image_targets(family, &variants, &target)?;
    if let Some(chosen) = variants.get(m.best_idx as usize) {
      matcher::reconcile_vec_call(family, &mut target, chosen, m.vreg_size);
    }

    self.publish(alloc::vec![target])?;
    Ok(m)
  }

  /// Package-image initialization.
  ///
  /// Requires a published single-target JIT list and never modifies it.
  pub fn init_pkgimg(&self, family: Family, variants: &[TargetData]) -> Result<ImageMatch, ImageError> {
    let targets = self.get().ok_or(InitError::NotInitialized)?;
    if targets.len() > 1 {
      return Err(InitError::MultipleTargets.into());
    }
    let target = targets.first().ok_or(InitError::NotInitialized)?;
    let variants = normalized(variants);
    Ok(matcher::match_image_targets(family, &variants, target)?)
  }

  /// Resolve and publish the command-line targets if nothing is published
  /// yet, computing clone directives for the secondary targets.
  ///
  /// Unlike [`JitTargets::init_sysimg`] this is idempotent: a published
  /// list is returned as-is (whichever initialization got there first).
  pub fn ensure(
    &self,
    family: Family,
    host: &Host,
    cpu_target: &str,
    imaging: bool,
  ) -> Result<&[TargetData], ImageError> {
    let cmdline = parse::parse_target_string(family, cpu_target)?;
    parse::check_targets(&cmdline, imaging)?;
    if let Some(existing) = self.get() {
      return Ok(existing);
    }
    let mut targets: Vec<TargetData> = Vec::with_capacity(cmdline.len());
    for (i, arg) in cmdline.iter().enumerate() {
      targets.push(resolve_with_host(family, arg, host, i == 0));
    }
    compute_clone_flags(family, &mut targets);
    match self.publish(targets) {
      Ok(published) => Ok(published),
      // Lost a publication race: the winner's list is the process list.
      Err(_) => self.get().ok_or(InitError::NotInitialized.into()),
    }
  }

  /// Whether 32- or 64-bit float fused-multiply-add is available.
  ///
  /// AArch64 always has FMA. On AArch32 the front JIT target decides:
  /// `vfp4sp` covers 32-bit only, `vfp4` covers both. Before any target is
  /// published, `host` answers.
  #[must_use]
  pub fn has_fma(&self, family: Family, host: &Host, bits: u32) -> bool {
    if family == Family::AArch64 {
      return true;
    }
    use platform::features::aarch32 as f;
    let features = self
      .get()
      .and_then(|t| t.first().map(|t| t.en.features))
      .unwrap_or(host.1);
    if bits == 32 && features.test(f::VFP4SP) {
      return true;
    }
    (bits == 32 || bits == 64) && features.test(f::VFP4)
  }
}

/// Clone the variant list with backend-legacy names normalized.
fn normalized(variants: &[TargetData]) -> Vec<TargetData> {
  variants
    .iter()
    .map(|v| {
      let mut v = v.clone();
      v.name = String::from(parse::normalize_cpu_name(&v.name));
      v
    })
    .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Process-wide instance and entry points
// ─────────────────────────────────────────────────────────────────────────────

static JIT_TARGETS: JitTargets = JitTargets::new();

/// The process JIT target list.
#[must_use]
pub fn jit_targets() -> &'static JitTargets {
  &JIT_TARGETS
}

/// System-image initialization on the process state, the native family, and
/// the detected host.
pub fn init_processor_sysimg(variants: &[TargetData], cpu_target: &str) -> Result<ImageMatch, ImageError> {
  JIT_TARGETS.init_sysimg(Family::native(), &platform::detect::host(), variants, cpu_target)
}

/// Package-image initialization on the process state and the native family.
pub fn init_processor_pkgimg(variants: &[TargetData]) -> Result<ImageMatch, ImageError> {
  JIT_TARGETS.init_pkgimg(Family::native(), variants)
}

/// The backend target of the process: ensures the JIT list and renders its
/// first entry. Returns the name, the flag list, and the first target's
/// clone flags.
pub fn process_backend_target(
  cpu_target: &str,
  imaging: bool,
  backend_version: u32,
) -> Result<(String, Vec<String>, u32), ImageError> {
  let family = Family::native();
  let targets = JIT_TARGETS.ensure(family, &platform::detect::host(), cpu_target, imaging)?;
  let first = targets.first().ok_or(InitError::NotInitialized)?;
  let (name, flags) = emit::backend_target_with_ext(family, first, backend_version);
  Ok((name, flags, first.en.flags))
}

/// Whether fused-multiply-add is available at the given width, consulting
/// the process JIT target.
#[must_use]
pub fn cpu_has_fma(bits: u32) -> bool {
  JIT_TARGETS.has_fma(Family::native(), &platform::detect::host(), bits)
}

// ─────────────────────────────────────────────────────────────────────────────
// Image generation
// ─────────────────────────────────────────────────────────────────────────────

/// One target of a to-be-written image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloneTargetSpec {
  /// Catalog name of the target.
  pub name: String,
  /// Backend CPU name (post fallback walk).
  pub cpu_name: String,
  /// Backend feature string.
  pub cpu_features: String,
  /// Clone-directive flags.
  pub flags: u32,
  /// Base target index.
  pub base: u32,
  /// Enabled features as the image serializes them (backend-gated).
  pub en_features: platform::FeatureSet,
  /// Disabled features as the image serializes them (backend-gated).
  pub dis_features: platform::FeatureSet,
}

/// Resolve the command-line targets for image generation.
///
/// Every target is resolved (the first pinned to `host`), clone directives
/// are computed, and features the running backend does not know are
/// stripped from the serialized sets so older loaders agree on their
/// meaning.
pub fn clone_target_specs(
  family: Family,
  host: &Host,
  cpu_target: &str,
  backend_version: u32,
) -> Result<Vec<CloneTargetSpec>, ImageError> {
  let cmdline = parse::parse_target_string(family, cpu_target)?;
  parse::check_targets(&cmdline, true)?;
  let mut targets: Vec<TargetData> = Vec::with_capacity(cmdline.len());
  for (i, arg) in cmdline.iter().enumerate() {
    targets.push(resolve_with_host(family, arg, host, i == 0));
  }
  compute_clone_flags(family, &mut targets);

  let mut specs = Vec::with_capacity(targets.len());
  for target in &targets {
    let mut en = target.en.features;
    let mut dis = target.dis.features;
    for fe in family.feature_names() {
      if fe.min_backend > backend_version {
        en.set(fe.bit, false);
        dis.set(fe.bit, false);
      }
    }
    family.disable_depends(&mut en);
    let (cpu_name, cpu_features) = emit::backend_target_string(family, target, backend_version);
    specs.push(CloneTargetSpec {
      name: target.name.clone(),
      cpu_name,
      cpu_features,
      flags: target.en.flags,
      base: target.base,
      en_features: en,
      dis_features: dis,
    });
  }
  Ok(specs)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use platform::{
    FeatureSet,
    features::{aarch32, aarch64},
  };

  use super::*;
  use crate::parse::parse_target_string;

  /// A synthetic host: the named model with its closed feature set.
  fn cpu_host(family: Family, name: &str) -> Host {
    let spec = family.find_cpu(name).unwrap();
    let mut features = spec.features;
    family.enable_depends(&mut features);
    (spec.cpu, features)
  }

  fn resolved(family: Family, spec: &str) -> TargetData {
    let parsed = parse_target_string(family, spec).unwrap().remove(0);
    resolve_with_host(family, &parsed, &cpu_host(family, "generic"), false)
  }

  #[test]
  fn clone_flags_default_cpu_and_loop() {
    let mut targets = alloc::vec![resolved(Family::AArch64, "generic"), resolved(Family::AArch64, "cortex-a57,+crc")];
    compute_clone_flags(Family::AArch64, &mut targets);
    // The base target is never annotated.
    assert_eq!(targets[0].en.flags, 0);
    let t = &targets[1];
    assert_ne!(t.en.flags & flags::CLONE_CPU, 0);
    assert_ne!(t.en.flags & flags::CLONE_LOOP, 0);
    assert_eq!(t.en.flags & flags::CLONE_ALL, 0);
  }

  #[test]
  fn clone_all_suppresses_automatic_directives() {
    let mut targets = alloc::vec![
      resolved(Family::AArch64, "generic"),
      resolved(Family::AArch64, "cortex-a57,+crc,clone_all"),
    ];
    compute_clone_flags(Family::AArch64, &mut targets);
    let t = &targets[1];
    assert_ne!(t.en.flags & flags::CLONE_ALL, 0);
    assert_eq!(t.en.flags & flags::CLONE_CPU, 0);
    assert_eq!(t.en.flags & flags::CLONE_LOOP, 0);
  }

  #[test]
  fn float16_delta_over_base_sets_clone_float16() {
    let mut targets = alloc::vec![resolved(Family::AArch64, "cortex-a53"), resolved(Family::AArch64, "apple-m2")];
    compute_clone_flags(Family::AArch64, &mut targets);
    assert_ne!(targets[1].en.flags & flags::CLONE_FLOAT16, 0);

    // No delta when the base target already has fullfp16.
    let mut targets = alloc::vec![resolved(Family::AArch64, "apple-m1"), resolved(Family::AArch64, "apple-m2")];
    compute_clone_flags(Family::AArch64, &mut targets);
    assert_eq!(targets[1].en.flags & flags::CLONE_FLOAT16, 0);
  }

  #[test]
  fn aarch32_simd_and_math_deltas() {
    let mut targets = alloc::vec![resolved(Family::AArch32, "cortex-a5"), resolved(Family::AArch32, "cortex-a7")];
    compute_clone_flags(Family::AArch32, &mut targets);
    let t = &targets[1];
    assert_ne!(t.en.flags & flags::CLONE_MATH, 0);
    assert_ne!(t.en.flags & flags::CLONE_SIMD, 0);

    // a64 never sets the 32-bit-only directives.
    let mut targets = alloc::vec![resolved(Family::AArch64, "generic"), resolved(Family::AArch64, "cortex-a57")];
    compute_clone_flags(Family::AArch64, &mut targets);
    assert_eq!(targets[1].en.flags & (flags::CLONE_MATH | flags::CLONE_SIMD), 0);
  }

  #[test]
  fn sysimg_selects_variant_and_publishes_once() {
    let jt = JitTargets::new();
    let host = cpu_host(Family::AArch64, "cortex-a55");
    let variants = alloc::vec![resolved(Family::AArch64, "generic"), resolved(Family::AArch64, "cortex-a76")];
    let m = jt.init_sysimg(Family::AArch64, &host, &variants, "generic").unwrap();
    assert_eq!(m.best_idx, 0);
    assert_eq!(jt.get().unwrap().len(), 1);

    let err = jt.init_sysimg(Family::AArch64, &host, &variants, "generic").unwrap_err();
    assert_eq!(err, ImageError::Init(InitError::AlreadyInitialized));
  }

  #[test]
  fn sysimg_scenario_a55_host_prefers_generic_over_a76() {
    // Image variants [generic, cortex-a76]; the JIT target resolves to the
    // cortex-a55 host. cortex-a76 is a strict superset the a55 cannot run.
    let jt = JitTargets::new();
    let host = cpu_host(Family::AArch64, "cortex-a55");
    let variants = alloc::vec![resolved(Family::AArch64, "generic"), resolved(Family::AArch64, "cortex-a76")];
    let m = jt.init_sysimg(Family::AArch64, &host, &variants, "cortex-a55").unwrap();
    assert_eq!(m.best_idx, 0);
  }

  #[test]
  fn pkgimg_requires_sysimg_first() {
    let jt = JitTargets::new();
    let variants = alloc::vec![resolved(Family::AArch64, "generic")];
    let err = jt.init_pkgimg(Family::AArch64, &variants).unwrap_err();
    assert_eq!(err, ImageError::Init(InitError::NotInitialized));
  }

  #[test]
  fn pkgimg_requires_exactly_one_target() {
    let jt = JitTargets::new();
    let host = cpu_host(Family::AArch64, "apple-m1");
    jt.ensure(Family::AArch64, &host, "generic;cortex-a57,+crc", true).unwrap();
    let variants = alloc::vec![resolved(Family::AArch64, "generic")];
    let err = jt.init_pkgimg(Family::AArch64, &variants).unwrap_err();
    assert_eq!(err, ImageError::Init(InitError::MultipleTargets));
  }

  #[test]
  fn pkgimg_reuses_published_target() {
    let jt = JitTargets::new();
    let host = cpu_host(Family::AArch64, "cortex-a57");
    let sysimg = alloc::vec![resolved(Family::AArch64, "generic")];
    jt.init_sysimg(Family::AArch64, &host, &sysimg, "cortex-a57").unwrap();
    // Package image offering a richer variant; the a57-pinned JIT target
    // accepts it.
    let pkg = alloc::vec![resolved(Family::AArch64, "generic"), resolved(Family::AArch64, "cortex-a57")];
    let m = jt.init_pkgimg(Family::AArch64, &pkg).unwrap();
    assert_eq!(m.best_idx, 1);
  }

  #[test]
  fn pkgimg_variant_names_are_normalized() {
    let jt = JitTargets::new();
    let host = cpu_host(Family::AArch64, "neoverse-n1");
    jt.ensure(Family::AArch64, &host, "neoverse-n1", false).unwrap();
    let mut variant = resolved(Family::AArch64, "neoverse-n1");
    variant.name = String::from("ares"); // legacy spelling of neoverse-n1
    let m = jt.init_pkgimg(Family::AArch64, &alloc::vec![variant]).unwrap();
    assert_eq!(m.best_idx, 0);
  }

  #[test]
  fn sysimg_with_no_usable_variant_reports_rejection() {
    let jt = JitTargets::new();
    let host = cpu_host(Family::AArch64, "cortex-a53");
    let variants = alloc::vec![resolved(Family::AArch64, "apple-m2")];
    let err = jt.init_sysimg(Family::AArch64, &host, &variants, "generic").unwrap_err();
    assert!(matches!(err, ImageError::Match(_)));
    // A failed match must not publish.
    assert!(jt.get().is_none());
  }

  #[test]
  fn ensure_is_single_assignment() {
    let jt = JitTargets::new();
    let host = cpu_host(Family::AArch64, "apple-m1");
    let first = jt
      .ensure(Family::AArch64, &host, "generic;cortex-a55", true)
      .unwrap()
      .to_vec();
    assert_eq!(first.len(), 2);
    // A second ensure with a different string returns the frozen list.
    let second = jt.ensure(Family::AArch64, &host, "generic", true).unwrap();
    assert_eq!(second, first.as_slice());
  }

  #[test]
  fn scenario_generic_plus_a57_clone_all() {
    let jt = JitTargets::new();
    let host = cpu_host(Family::AArch64, "apple-m1");
    let targets = jt
      .ensure(Family::AArch64, &host, "generic;cortex-a57,+crc,clone_all", true)
      .unwrap();
    assert_eq!(targets.len(), 2);
    let t1 = &targets[1];
    assert_ne!(t1.en.flags & flags::CLONE_ALL, 0);
    assert_eq!(t1.en.flags & (flags::CLONE_CPU | flags::CLONE_LOOP), 0);
    for bit in [aarch64::CRC, aarch64::AES, aarch64::SHA2] {
      assert!(t1.en.features.test(bit), "missing bit {bit}");
    }
  }

  #[test]
  fn has_fma_is_unconditional_on_aarch64() {
    let jt = JitTargets::new();
    let host = cpu_host(Family::AArch64, "generic");
    assert!(jt.has_fma(Family::AArch64, &host, 32));
    assert!(jt.has_fma(Family::AArch64, &host, 64));
  }

  #[test]
  fn has_fma_consults_front_target_on_aarch32() {
    let jt = JitTargets::new();
    let host = cpu_host(Family::AArch32, "cortex-a7");
    jt.ensure(Family::AArch32, &host, "cortex-a7", true).unwrap();
    // cortex-a7 ships vfp4.
    assert!(jt.has_fma(Family::AArch32, &host, 32));
    assert!(jt.has_fma(Family::AArch32, &host, 64));
    assert!(!jt.has_fma(Family::AArch32, &host, 16));

    let sp_only = JitTargets::new();
    let m4_host = (
      platform::Cpu::CortexM4,
      FeatureSet::of(&[aarch32::V7, aarch32::MCLASS, aarch32::HWDIV, aarch32::VFP4SP]),
    );
    sp_only
      .ensure(Family::AArch32, &m4_host, "cortex-m4,+vfp4sp", true)
      .unwrap();
    assert!(sp_only.has_fma(Family::AArch32, &m4_host, 32));
    assert!(!sp_only.has_fma(Family::AArch32, &m4_host, 64));
  }

  #[test]
  fn clone_specs_strip_backend_unknown_features() {
    let host = cpu_host(Family::AArch64, "generic");
    let specs = clone_target_specs(Family::AArch64, &host, "generic;neoverse-n2,base=0", 90000).unwrap();
    assert_eq!(specs.len(), 2);
    let n2 = &specs[1];
    // sve2 needs backend 10; a v9 image must not record it.
    assert!(!n2.en_features.test(aarch64::SVE2));
    // Stripping sve2 does not take sve with it.
    assert!(n2.en_features.test(aarch64::SVE));
    assert_ne!(n2.flags & flags::CLONE_CPU, 0);
    assert_eq!(n2.base, 0);
    assert!(!n2.cpu_features.is_empty());
  }

  #[test]
  fn clone_specs_respect_vfp_delta_on_aarch32() {
    let host = cpu_host(Family::AArch32, "cortex-a5");
    let specs = clone_target_specs(Family::AArch32, &host, "cortex-a5;cortex-a7,base=0", 120000).unwrap();
    assert_ne!(specs[1].flags & flags::CLONE_MATH, 0);
    assert_ne!(specs[1].flags & flags::CLONE_SIMD, 0);
    assert!(specs[1].en_features.test(aarch32::NEON));
  }
}
