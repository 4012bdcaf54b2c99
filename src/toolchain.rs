//! Compiler flag tables and target naming.
//!
//! Nothing here probes the machine: the compiler family and target are
//! chosen on the command line or in `ccode.toml`, and this module only knows
//! how each family spells its flags and how each OS names its artifacts.

use clap::ValueEnum;
use std::fmt;

/// Supported compiler families
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Compiler {
    Gcc,
    Clang,
    Msvc,
}

impl Compiler {
    /// Parse the `compiler` value of `[build]`. Accepts driver names too.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "gcc" | "g++" => Some(Compiler::Gcc),
            "clang" | "clang++" => Some(Compiler::Clang),
            "msvc" | "cl" | "cl.exe" => Some(Compiler::Msvc),
            _ => None,
        }
    }

    pub fn default_for(os: Os) -> Self {
        match os {
            Os::Windows => Compiler::Msvc,
            Os::Macos => Compiler::Clang,
            Os::Linux => Compiler::Gcc,
        }
    }

    pub fn uses_msvc_flags(&self) -> bool {
        matches!(self, Compiler::Msvc)
    }

    pub fn cc(&self) -> &'static str {
        match self {
            Compiler::Gcc => "gcc",
            Compiler::Clang => "clang",
            Compiler::Msvc => "cl",
        }
    }

    pub fn cxx(&self) -> &'static str {
        match self {
            Compiler::Gcc => "g++",
            Compiler::Clang => "clang++",
            Compiler::Msvc => "cl",
        }
    }

    pub fn archiver(&self) -> &'static str {
        match self {
            Compiler::Gcc => "ar",
            Compiler::Clang => "llvm-ar",
            Compiler::Msvc => "lib",
        }
    }

    pub fn define_prefix(&self) -> &'static str {
        if self.uses_msvc_flags() { "/D" } else { "-D" }
    }

    pub fn include_prefix(&self) -> &'static str {
        if self.uses_msvc_flags() { "/I" } else { "-I" }
    }

    /// Options for a build configuration. Unknown configurations get none.
    pub fn config_options(&self, config: &str) -> &'static [&'static str] {
        let release = config.eq_ignore_ascii_case("release");
        let debug = config.eq_ignore_ascii_case("debug");
        match (self.uses_msvc_flags(), debug, release) {
            (false, true, _) => &["-g", "-O0"],
            (false, _, true) => &["-O2"],
            (true, true, _) => &["/Zi", "/Od"],
            (true, _, true) => &["/O2"],
            _ => &[],
        }
    }

    pub fn warning_options(&self) -> &'static [&'static str] {
        if self.uses_msvc_flags() {
            &["/W4"]
        } else {
            &["-Wall", "-Wextra"]
        }
    }

    pub fn std_flag(&self, edition: &str) -> String {
        if self.uses_msvc_flags() {
            get_std_flag_msvc(edition)
        } else {
            get_std_flag_gcc(edition)
        }
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compiler::Gcc => "gcc",
            Compiler::Clang => "clang",
            Compiler::Msvc => "msvc",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Os {
    Linux,
    Macos,
    Windows,
}

impl Os {
    pub fn host() -> Self {
        if cfg!(target_os = "windows") {
            Os::Windows
        } else if cfg!(target_os = "macos") {
            Os::Macos
        } else {
            Os::Linux
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Macos => "macos",
            Os::Windows => "windows",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Arch {
    X64,
    Arm64,
}

impl Arch {
    pub fn host() -> Self {
        if cfg!(target_arch = "aarch64") {
            Arch::Arm64
        } else {
            Arch::X64
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::Arm64 => "arm64",
        }
    }
}

/// What to generate for: compiler family plus target platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toolchain {
    pub compiler: Compiler,
    pub os: Os,
    pub arch: Arch,
}

impl Toolchain {
    pub fn new(compiler: Compiler, os: Os, arch: Arch) -> Self {
        Self { compiler, os, arch }
    }

    pub fn host() -> Self {
        let os = Os::host();
        Self::new(Compiler::default_for(os), os, Arch::host())
    }

    pub fn obj_ext(&self) -> &'static str {
        if self.compiler.uses_msvc_flags() { ".obj" } else { ".o" }
    }

    pub fn lib_prefix(&self) -> &'static str {
        if self.compiler.uses_msvc_flags() { "" } else { "lib" }
    }

    pub fn lib_ext(&self) -> &'static str {
        if self.compiler.uses_msvc_flags() { ".lib" } else { ".a" }
    }

    pub fn exe_ext(&self) -> &'static str {
        if self.os == Os::Windows { ".exe" } else { "" }
    }

    /// IntelliSense mode string as VSCode's C/C++ extension expects it
    pub fn intellisense_mode(&self) -> String {
        format!("{}-{}-{}", self.os.name(), self.compiler, self.arch.name())
    }
}

/// True for editions that name a C standard (`c11`, `gnu17`) rather than C++.
pub fn is_c_edition(edition: &str) -> bool {
    let e = edition.to_lowercase();
    let e = e
        .strip_prefix("-std=")
        .or_else(|| e.strip_prefix("/std:"))
        .unwrap_or(&e);
    !e.contains("++") && (e.starts_with('c') || e.starts_with("gnu"))
}

/// Numeric standard of an edition (`c++1z` -> `17`), for CMake and VSCode.
/// Empty when the edition has no number.
pub fn standard_number(edition: &str) -> String {
    let canonical = get_std_flag_gcc(edition);
    let digits: Vec<char> = canonical
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.into_iter().rev().collect()
}

/// Get the MSVC-compatible standard flag for a given edition
/// MSVC uses /std: prefix and has different naming for newer standards
pub fn get_std_flag_msvc(edition: &str) -> String {
    // MSVC has no GNU dialects, use the ISO standard underneath
    let lower = edition.to_lowercase();
    let iso = match lower.strip_prefix("gnu") {
        Some(rest) => format!("c{}", rest),
        None => lower,
    };
    let is_c = is_c_edition(&iso);
    let normalized = iso.replace("c++", "").replace("c", "");

    match normalized.as_str() {
        // C standards
        "89" | "90" | "99" => "/std:c11".to_string(),
        "11" if is_c => "/std:c11".to_string(),
        "17" | "18" if is_c => "/std:c17".to_string(),
        "23" | "2x" if is_c => "/std:clatest".to_string(),

        // C++ standards
        "98" | "03" | "11" | "14" => "/std:c++14".to_string(), // MSVC minimum is c++14
        "17" => "/std:c++17".to_string(),
        "20" => "/std:c++20".to_string(),
        "23" | "26" | "2" | "latest" => "/std:c++latest".to_string(),

        _ if edition.starts_with("/std:") => edition.to_string(),

        _ => format!("/std:{}", edition),
    }
}

/// Get the GCC/Clang-compatible standard flag for a given edition
pub fn get_std_flag_gcc(edition: &str) -> String {
    let normalized = edition.to_lowercase();
    let edition_clean = normalized.strip_prefix("-std=").unwrap_or(&normalized);

    let canonical = match edition_clean {
        "c89" | "c90" => "c89",
        "c17" | "c18" => "c17",
        "c23" | "c2x" => "c23",
        "c++98" | "c++03" => "c++03",
        "c++11" | "c++0x" => "c++11",
        "c++14" | "c++1y" => "c++14",
        "c++17" | "c++1z" => "c++17",
        "c++20" | "c++2a" => "c++20",
        "c++23" | "c++2b" => "c++23",
        "c++26" | "c++2c" => "c++26",
        "gnu89" | "gnu90" => "gnu89",
        "gnu17" | "gnu18" => "gnu17",
        "gnu23" | "gnu2x" => "gnu23",
        "gnu++98" | "gnu++03" => "gnu++03",
        "gnu++11" | "gnu++0x" => "gnu++11",
        "gnu++14" | "gnu++1y" => "gnu++14",
        "gnu++17" | "gnu++1z" => "gnu++17",
        "gnu++20" | "gnu++2a" => "gnu++20",
        "gnu++23" | "gnu++2b" => "gnu++23",
        other => other,
    };

    format!("-std={}", canonical)
}
