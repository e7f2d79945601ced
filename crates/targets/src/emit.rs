//! Backend target emission.
//!
//! Renders a resolved target into the `(cpu name, feature flags)` pair the
//! compiler backend accepts. The CPU name is walked down its fallback chain
//! until the running backend release accepts it; architecture aliases fold
//! their base features in and emit as `generic`. The flag list leads with
//! the unconditional architecture block, then the version aliases in
//! descending order, then the named `+`/`-` flags (`+` strictly before `-`
//! — the backend resolves the list left to right), then the verbatim
//! pass-through suffix.

use alloc::{
  format,
  string::{String, ToString},
  vec::Vec,
};

use platform::{Family, FeatureSet};

use crate::target::TargetData;

/// Append the descending `+v8.Na` aliases for the version bits set.
fn push_version_ladder(family: Family, features: &FeatureSet, out: &mut Vec<String>) {
  let ladder: [(u32, &str); 6] = match family {
    Family::AArch64 => {
      use platform::features::aarch64 as f;
      [
        (f::V8_6A, "+v8.6a"),
        (f::V8_5A, "+v8.5a"),
        (f::V8_4A, "+v8.4a"),
        (f::V8_3A, "+v8.3a"),
        (f::V8_2A, "+v8.2a"),
        (f::V8_1A, "+v8.1a"),
      ]
    }
    Family::AArch32 => {
      use platform::features::aarch32 as f;
      [
        (f::V8_6A, "+v8.6a"),
        (f::V8_5A, "+v8.5a"),
        (f::V8_4A, "+v8.4a"),
        (f::V8_3A, "+v8.3a"),
        (f::V8_2A, "+v8.2a"),
        (f::V8_1A, "+v8.1a"),
      ]
    }
  };
  for (bit, flag) in ladder {
    if features.test(bit) {
      out.push(flag.to_string());
    }
  }
}

/// Append the AArch32 profile/version block and its `armv*-*` synonyms.
fn push_aarch32_arch_flags(features: &FeatureSet, out: &mut Vec<String>) {
  use platform::features::aarch32 as f;

  if features.test(f::V8_M_MAIN) {
    out.push("+v8m.main".to_string());
    out.push("+armv8-m.main".to_string());
  }
  if features.test(f::ACLASS) {
    out.push("+aclass".to_string());
  }
  if features.test(f::RCLASS) {
    out.push("+rclass".to_string());
  }
  if features.test(f::MCLASS) {
    out.push("+mclass".to_string());
  }
  if features.test(f::V8) {
    out.push("+v8".to_string());
    if features.test(f::ACLASS) {
      out.push("+armv8-a".to_string());
    }
    if features.test(f::RCLASS) {
      out.push("+armv8-r".to_string());
    }
    if features.test(f::MCLASS) {
      out.push("+v8m".to_string());
      out.push("+armv8-m.base".to_string());
    }
  }
  if features.test(f::V7) {
    out.push("+v7".to_string());
    if features.test(f::ACLASS) {
      out.push("+armv7-a".to_string());
    }
    if features.test(f::RCLASS) {
      out.push("+armv7-r".to_string());
    }
    if features.test(f::MCLASS) {
      out.push("+armv7-m".to_string());
    }
  }
  out.push("+v6".to_string());
  out.push("+vfp2".to_string());
}

/// Render a resolved target for the backend, without the pass-through
/// suffix.
#[must_use]
pub fn backend_target(family: Family, data: &TargetData, backend_version: u32) -> (String, Vec<String>) {
  // Walk the fallback chain until the backend accepts the name.
  let mut name = data.name.clone();
  let mut spec = family.find_cpu(&name);
  while let Some(s) = spec {
    if s.min_backend <= backend_version {
      break;
    }
    spec = family.find_cpu_by_id(s.fallback);
    if let Some(fb) = spec {
      name = fb.name.to_string();
    }
  }

  let mut features = data.en.features;
  if let Some(s) = spec {
    if s.cpu.is_generic() {
      // Architecture aliases are not backend CPU names; fold their
      // features and let the backend schedule generically.
      features |= s.features;
      name = "generic".to_string();
    }
  }
  if family == Family::AArch32 && name == "apple-a7" {
    // The 32-bit backend still knows this core by its old name.
    name = "cyclone".to_string();
  }

  let mut out: Vec<String> = Vec::new();
  match family {
    Family::AArch64 => {
      out.push("+neon".to_string());
      out.push("+fp-armv8".to_string());
      push_version_ladder(family, &features, &mut out);
    }
    Family::AArch32 => {
      push_aarch32_arch_flags(&features, &mut out);
      push_version_ladder(family, &features, &mut out);
    }
  }

  // Named flags: every descriptor the backend release understands, machine
  // words only, `+` before `-`.
  let mut minus: Vec<String> = Vec::new();
  for fe in family.feature_names() {
    if fe.min_backend > backend_version || fe.bit >= 64 {
      continue;
    }
    if features.test(fe.bit) {
      out.push(format!("+{}", fe.name));
    } else if data.dis.features.test(fe.bit) {
      minus.push(format!("-{}", fe.name));
    }
  }
  out.append(&mut minus);

  (name, out)
}

/// Render a resolved target including its pass-through suffix.
#[must_use]
pub fn backend_target_with_ext(family: Family, data: &TargetData, backend_version: u32) -> (String, Vec<String>) {
  let (name, mut flags) = backend_target(family, data, backend_version);
  append_ext_features(&mut flags, &data.ext_features);
  (name, flags)
}

/// Render a resolved target as the comma-joined string form.
#[must_use]
pub fn backend_target_string(family: Family, data: &TargetData, backend_version: u32) -> (String, String) {
  let (name, flags) = backend_target_with_ext(family, data, backend_version);
  (name, flags.join(","))
}

/// Split a pass-through suffix into flag tokens and append them.
pub fn append_ext_features(flags: &mut Vec<String>, ext: &str) {
  for token in ext.split(',') {
    let token = token.trim();
    if !token.is_empty() {
      flags.push(token.to_string());
    }
  }
}

/// Backend target for the disassembler.
///
/// The disassembler must decode whatever any multi-versioned clone may
/// contain, so it gets the host name over the widest feature set the
/// family admits, plus decoder-only extensions the dispatcher never
/// compiles for.
#[cfg(feature = "std")]
#[must_use]
pub fn disasm_target(family: Family, backend_version: u32) -> (String, String) {
  let host = platform::detect::host();
  let arch = match family {
    Family::AArch64 => platform::ArmArch::AARCH64,
    Family::AArch32 => family.feature_arch_version(&host.1),
  };
  let max = family.max_features(arch);
  let ext = match family {
    Family::AArch64 => "+ecv,+tme,+am,+specrestrict,+predres,+lor,+perfmon,+spe,+tracev8.4",
    Family::AArch32 => "+dotprod",
  };
  let data = TargetData {
    name: String::from(family.cpu_name(host.0)),
    base: 0,
    en: crate::target::FeatureFlags { features: max, flags: 0 },
    dis: crate::target::FeatureFlags {
      features: family.catalog_mask().and_not(max),
      flags: 0,
    },
    ext_features: String::from(ext),
  };
  backend_target_string(family, &data, backend_version)
}
