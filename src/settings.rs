//! Build settings: the machine the package is built for.
//!
//! Settings are fixed for one evaluation. Recipes read them; only the
//! profile loader and command-line overrides write them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RecipeError, Result};

/// Target operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Os {
    Linux,
    Windows,
    Macos,
    FreeBSD,
    Android,
    #[serde(rename = "iOS")]
    Ios,
}

impl Os {
    /// Operating system of the running host.
    pub fn host() -> Self {
        match std::env::consts::OS {
            "windows" => Os::Windows,
            "macos" => Os::Macos,
            "freebsd" => Os::FreeBSD,
            "android" => Os::Android,
            "ios" => Os::Ios,
            _ => Os::Linux,
        }
    }

    pub fn is_windows(self) -> bool {
        self == Os::Windows
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Os::Linux => "Linux",
            Os::Windows => "Windows",
            Os::Macos => "Macos",
            Os::FreeBSD => "FreeBSD",
            Os::Android => "Android",
            Os::Ios => "iOS",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Os {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(Os::Linux),
            "windows" => Ok(Os::Windows),
            "macos" => Ok(Os::Macos),
            "freebsd" => Ok(Os::FreeBSD),
            "android" => Ok(Os::Android),
            "ios" => Ok(Os::Ios),
            _ => Err(RecipeError::InvalidSetting(format!("unknown os: {}", s))),
        }
    }
}

/// CMake build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Debug" => Ok(BuildType::Debug),
            "Release" => Ok(BuildType::Release),
            "RelWithDebInfo" => Ok(BuildType::RelWithDebInfo),
            "MinSizeRel" => Ok(BuildType::MinSizeRel),
            _ => Err(RecipeError::InvalidSetting(format!(
                "unknown build_type: {}",
                s
            ))),
        }
    }
}

/// C++ language standard, as written in a profile (`17`, `gnu20`, `98`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CppStd {
    version: u32,
    gnu: bool,
}

impl CppStd {
    pub fn new(version: u32) -> Self {
        Self {
            version,
            gnu: false,
        }
    }

    /// Two-digit version as written (`98`, `11`, `17`, ...).
    pub fn version(self) -> u32 {
        self.version
    }

    /// Publication year, so that `98` orders before `11`.
    pub fn year(self) -> u32 {
        if self.version >= 90 {
            1900 + self.version
        } else {
            2000 + self.version
        }
    }
}

impl fmt::Display for CppStd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.gnu {
            write!(f, "gnu{}", self.version)
        } else {
            write!(f, "{}", self.version)
        }
    }
}

impl FromStr for CppStd {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self> {
        let (gnu, digits) = match s.strip_prefix("gnu") {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let version = digits
            .parse::<u32>()
            .map_err(|_| RecipeError::InvalidSetting(format!("invalid cppstd: {}", s)))?;
        if version > 99 {
            return Err(RecipeError::InvalidSetting(format!("invalid cppstd: {}", s)));
        }
        Ok(Self { version, gnu })
    }
}

impl TryFrom<String> for CppStd {
    type Error = RecipeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CppStd> for String {
    fn from(value: CppStd) -> Self {
        value.to_string()
    }
}

/// Settings of the machine a package is built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub os: Os,
    pub arch: String,
    pub compiler: String,
    #[serde(default)]
    pub compiler_version: Option<String>,
    /// `None` means the compiler default.
    #[serde(default)]
    pub cppstd: Option<CppStd>,
    #[serde(default)]
    pub build_type: BuildType,
}

impl Settings {
    /// Settings describing the running host.
    pub fn detect() -> Self {
        let os = Os::host();
        let compiler = match os {
            Os::Windows => "msvc",
            Os::Macos | Os::Ios => "apple-clang",
            Os::Linux => "gcc",
            Os::FreeBSD | Os::Android => "clang",
        };
        Self {
            os,
            arch: host_arch().to_string(),
            compiler: compiler.to_string(),
            compiler_version: None,
            cppstd: None,
            build_type: BuildType::Release,
        }
    }

    /// Apply a `key=value` setting override.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "os" => self.os = value.parse()?,
            "arch" => self.arch = value.to_string(),
            "compiler" => self.compiler = value.to_string(),
            "compiler.version" => self.compiler_version = Some(value.to_string()),
            "compiler.cppstd" | "cppstd" => self.cppstd = Some(value.parse()?),
            "build_type" => self.build_type = value.parse()?,
            _ => {
                return Err(RecipeError::InvalidSetting(format!(
                    "unknown setting: {}",
                    key
                )));
            }
        }
        Ok(())
    }

    /// True when these settings target a different machine than `build`.
    pub fn is_cross_building(&self, build: &Settings) -> bool {
        self.os != build.os || self.arch != build.arch
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::detect()
    }
}

/// Package-manager architecture name of the running host.
fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "x86_64",
        "x86" => "x86",
        "aarch64" => "armv8",
        "arm" => "armv7",
        "riscv64" => "riscv64",
        other => other,
    }
}
