//! Platform detection for install-geth.
//!
//! The operating system and CPU architecture are named the way the artifact
//! table and the cache key expect them (`linux`/`darwin`/`windows`,
//! `x64`/`x32`/`arm64`/`arm`). Names that have no upstream build are kept
//! verbatim so that the error message can report them.

use std::fmt;

/// Operating system identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    Darwin,
    Windows,
    /// Any other operating system, by its raw name.
    Other(String),
}

impl Os {
    /// Parses an operating system name.
    ///
    /// Accepts both Rust target names (`macos`) and the names used by the
    /// artifact table (`darwin`, `win32`).
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "linux" => Self::Linux,
            "darwin" | "macos" => Self::Darwin,
            "windows" | "win32" => Self::Windows,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "windows",
            Self::Other(name) => name,
        }
    }
}

/// CPU architecture identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arch {
    X64,
    X32,
    Arm64,
    Arm,
    /// Any other architecture, by its raw name.
    Other(String),
}

impl Arch {
    /// Parses an architecture name.
    ///
    /// Accepts Rust target names (`x86_64`, `aarch64`), Go names (`amd64`,
    /// `386`) and the short names used by the cache key.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "x64" | "x86_64" | "amd64" => Self::X64,
            "x32" | "x86" | "i386" | "i686" | "386" => Self::X32,
            "arm64" | "aarch64" => Self::Arm64,
            "arm" => Self::Arm,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::X64 => "x64",
            Self::X32 => "x32",
            Self::Arm64 => "arm64",
            Self::Arm => "arm",
            Self::Other(name) => name,
        }
    }
}

/// The (operating system, architecture) pair a build is selected for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformArch {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformArch {
    #[must_use]
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Detects the platform this binary was compiled for.
    #[must_use]
    pub fn detect() -> Self {
        Self::new(
            Os::from_name(std::env::consts::OS),
            Arch::from_name(std::env::consts::ARCH),
        )
    }

    /// Detects the platform, replacing either half with an explicit name.
    #[must_use]
    pub fn detect_with_overrides(os: Option<&str>, arch: Option<&str>) -> Self {
        let detected = Self::detect();
        Self::new(
            os.map_or(detected.os, Os::from_name),
            arch.map_or(detected.arch, Arch::from_name),
        )
    }

    /// File name of an executable on this platform (`geth.exe` on Windows).
    #[must_use]
    pub fn executable_name(&self, tool: &str) -> String {
        if self.os == Os::Windows {
            format!("{tool}.exe")
        } else {
            tool.to_string()
        }
    }
}

impl fmt::Display for PlatformArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os.as_str(), self.arch.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_names_are_normalised() {
        assert_eq!(Os::from_name("linux"), Os::Linux);
        assert_eq!(Os::from_name("macos"), Os::Darwin);
        assert_eq!(Os::from_name("Darwin"), Os::Darwin);
        assert_eq!(Os::from_name("win32"), Os::Windows);
        assert_eq!(Os::from_name("freebsd"), Os::Other("freebsd".to_string()));
    }

    #[test]
    fn arch_names_are_normalised() {
        assert_eq!(Arch::from_name("x86_64"), Arch::X64);
        assert_eq!(Arch::from_name("amd64"), Arch::X64);
        assert_eq!(Arch::from_name("x86"), Arch::X32);
        assert_eq!(Arch::from_name("aarch64"), Arch::Arm64);
        assert_eq!(Arch::from_name("arm"), Arch::Arm);
        assert_eq!(Arch::from_name("riscv64"), Arch::Other("riscv64".to_string()));
    }

    #[test]
    fn as_str_round_trips_through_from_name() {
        for os in [Os::Linux, Os::Darwin, Os::Windows] {
            assert_eq!(Os::from_name(os.as_str()), os);
        }
        for arch in [Arch::X64, Arch::X32, Arch::Arm64, Arch::Arm] {
            assert_eq!(Arch::from_name(arch.as_str()), arch);
        }
    }

    #[test]
    fn display_joins_os_and_arch() {
        let target = PlatformArch::new(Os::Darwin, Arch::Arm64);
        assert_eq!(target.to_string(), "darwin-arm64");
    }

    #[test]
    fn executable_name_has_exe_suffix_only_on_windows() {
        assert_eq!(
            PlatformArch::new(Os::Windows, Arch::X64).executable_name("geth"),
            "geth.exe"
        );
        assert_eq!(
            PlatformArch::new(Os::Linux, Arch::X64).executable_name("geth"),
            "geth"
        );
    }

    #[test]
    fn overrides_replace_detected_values() {
        let target = PlatformArch::detect_with_overrides(Some("windows"), Some("386"));
        assert_eq!(target, PlatformArch::new(Os::Windows, Arch::X32));

        let detected = PlatformArch::detect();
        assert_eq!(PlatformArch::detect_with_overrides(None, None), detected);
    }

    #[test]
    fn detect_matches_compile_target() {
        let target = PlatformArch::detect();
        #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
        assert_eq!(target, PlatformArch::new(Os::Linux, Arch::X64));

        #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
        assert_eq!(target, PlatformArch::new(Os::Darwin, Arch::Arm64));

        #[cfg(all(target_os = "windows", target_arch = "x86_64"))]
        assert_eq!(target, PlatformArch::new(Os::Windows, Arch::X64));

        let _ = target;
    }
}
