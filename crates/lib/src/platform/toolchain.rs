use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// EDK2 tool tags (the `-t` argument of `build`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Toolchain {
  #[serde(rename = "GCC5")]
  Gcc5,
  #[serde(rename = "CLANG38")]
  Clang38,
  #[serde(rename = "CLANGPDB")]
  ClangPdb,
  #[serde(rename = "VS2019")]
  Vs2019,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown toolchain `{0}` (expected one of GCC5, CLANG38, CLANGPDB, VS2019)")]
pub struct UnknownToolchain(pub String);

impl Toolchain {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Gcc5 => "GCC5",
      Self::Clang38 => "CLANG38",
      Self::ClangPdb => "CLANGPDB",
      Self::Vs2019 => "VS2019",
    }
  }
}

impl FromStr for Toolchain {
  type Err = UnknownToolchain;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_uppercase().as_str() {
      "GCC5" => Ok(Self::Gcc5),
      "CLANG38" => Ok(Self::Clang38),
      "CLANGPDB" => Ok(Self::ClangPdb),
      "VS2019" => Ok(Self::Vs2019),
      _ => Err(UnknownToolchain(s.to_string())),
    }
  }
}

impl fmt::Display for Toolchain {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_case_insensitively() {
    assert_eq!("gcc5".parse(), Ok(Toolchain::Gcc5));
    assert_eq!("ClangPdb".parse(), Ok(Toolchain::ClangPdb));
    assert_eq!("VS2019".parse(), Ok(Toolchain::Vs2019));
  }

  #[test]
  fn rejects_unknown_tags() {
    assert_eq!("MSVC".parse::<Toolchain>(), Err(UnknownToolchain("MSVC".to_string())));
  }

  #[test]
  fn display_matches_edk2_tag() {
    assert_eq!(Toolchain::Clang38.to_string(), "CLANG38");
  }
}
