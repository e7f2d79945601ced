//! Target-string parsing.
//!
//! Grammar: `cpu0[,modifier…][;cpu1[,modifier…]]…` where a modifier is one
//! of
//!
//! | Modifier  | Effect                                          |
//! |-----------|-------------------------------------------------|
//! | `+feat`   | enable a named feature                          |
//! | `-feat`   | disable a named feature                         |
//! | `clone_all` | request cloning of every function             |
//! | `base=N`  | diff against target `N` (must come earlier)     |
//! | `ext=…`   | pass the token through to the backend verbatim  |
//!
//! The first target is the required-host target and always has base 0.
//! Unknown feature names and malformed tokens fail the whole parse with
//! the offending token. On AArch64, `crypto` expands to `aes + sha2` in
//! the requested polarity.

use alloc::{
  string::{String, ToString},
  vec::Vec,
};

use platform::{Family, FeatureSet, find_feature_bit};

use crate::target::{TargetData, flags};

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Parse or command-line validation failure.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
  /// The target string was empty.
  Empty,
  /// A feature name is not in the catalog.
  UnknownFeature(String),
  /// A token does not match the grammar.
  InvalidToken(String),
  /// `base=N` does not reference an earlier target.
  BaseOutOfRange(String),
  /// More than one target requires image generation.
  MultipleTargetsRequireImaging,
  /// `clone_all` on the host target requires image generation.
  CloneAllRequiresImaging,
}

impl core::fmt::Display for ParseError {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      Self::Empty => f.write_str("empty target string"),
      Self::UnknownFeature(name) => write!(f, "invalid feature name: {name}"),
      Self::InvalidToken(tok) => write!(f, "invalid target token: {tok}"),
      Self::BaseOutOfRange(tok) => write!(f, "base must reference an earlier target: {tok}"),
      Self::MultipleTargetsRequireImaging => {
        f.write_str("more than one target specified without image generation")
      }
      Self::CloneAllRequiresImaging => f.write_str("clone_all specified without image generation"),
    }
  }
}

impl core::error::Error for ParseError {}

// ─────────────────────────────────────────────────────────────────────────────
// Name normalization
// ─────────────────────────────────────────────────────────────────────────────

/// Map legacy backend CPU names onto catalog names. Idempotent.
#[must_use]
pub fn normalize_cpu_name(name: &str) -> &str {
  match name {
    "ares" => "neoverse-n1",
    "zeus" => "neoverse-v1",
    "cyclone" => "apple-a7",
    "typhoon" => "apple-a8",
    "twister" => "apple-a9",
    "hurricane" => "apple-a10",
    other => other,
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Set a named feature, expanding the AArch64 `crypto` alias.
fn set_feature(family: Family, set: &mut FeatureSet, name: &str) -> Result<(), ParseError> {
  if family == Family::AArch64 && name == "crypto" {
    set.set(platform::features::aarch64::AES, true);
    set.set(platform::features::aarch64::SHA2, true);
    return Ok(());
  }
  match find_feature_bit(family.feature_names(), name) {
    Some(bit) => {
      set.set(bit, true);
      Ok(())
    }
    None => Err(ParseError::UnknownFeature(name.to_string())),
  }
}

/// Parse a full target string into one [`TargetData`] per `;`-separated
/// entry.
pub fn parse_target_string(family: Family, spec: &str) -> Result<Vec<TargetData>, ParseError> {
  if spec.trim().is_empty() {
    return Err(ParseError::Empty);
  }
  let mut targets: Vec<TargetData> = Vec::new();
  for chunk in spec.split(';') {
    let chunk = chunk.trim();
    let mut tokens = chunk.split(',');
    let name = tokens.next().unwrap_or("").trim();
    if name.is_empty() || name.starts_with(['+', '-']) {
      return Err(ParseError::InvalidToken(chunk.to_string()));
    }
    let mut target = TargetData::named(normalize_cpu_name(name));
    for token in tokens {
      let token = token.trim();
      if token == "clone_all" {
        target.en.flags |= flags::CLONE_ALL;
      } else if let Some(value) = token.strip_prefix("base=") {
        let base: u32 = value.parse().map_err(|_| ParseError::InvalidToken(token.to_string()))?;
        if base as usize >= targets.len() {
          return Err(ParseError::BaseOutOfRange(token.to_string()));
        }
        target.base = base;
      } else if let Some(ext) = token.strip_prefix("ext=") {
        if !target.ext_features.is_empty() {
          target.ext_features.push(',');
        }
        target.ext_features.push_str(ext);
      } else if let Some(feat) = token.strip_prefix('+') {
        set_feature(family, &mut target.en.features, feat)?;
      } else if let Some(feat) = token.strip_prefix('-') {
        set_feature(family, &mut target.dis.features, feat)?;
      } else {
        return Err(ParseError::InvalidToken(token.to_string()));
      }
    }
    targets.push(target);
  }
  Ok(targets)
}

/// Validate a parsed command line against the execution mode.
///
/// Without image generation exactly one plain target is allowed: function
/// multi-versioning only exists when an image is being produced.
pub fn check_targets(targets: &[TargetData], imaging: bool) -> Result<(), ParseError> {
  let Some(first) = targets.first() else {
    return Err(ParseError::Empty);
  };
  if !imaging {
    if targets.len() > 1 {
      return Err(ParseError::MultipleTargetsRequireImaging);
    }
    if first.en.flags & flags::CLONE_ALL != 0 {
      return Err(ParseError::CloneAllRequiresImaging);
    }
  }
  Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
