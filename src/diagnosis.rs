//! Environment diagnostics for the external Python plotting stack.
//!
//! Every probe goes through a [`CommandRunner`], so tests can swap in canned
//! output. Missing packages are only installed when the caller asks for it.

use crate::error::ProbeError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const DEFAULT_INTERPRETER: &str = "python3";
pub const DEFAULT_PACKAGES: [&str; 3] = ["numpy", "matplotlib", "networkx"];

const RULE_WIDTH: usize = 60;
const SECTION_WIDTH: usize = 50;
/// Exit status of [`PACKAGE_PROBE`] when the module cannot be located.
const PROBE_NOT_FOUND: i32 = 3;

const PACKAGE_PROBE: &str = r#"
import importlib, importlib.util, sys
name = sys.argv[1]
try:
    spec = importlib.util.find_spec(name)
except Exception:
    spec = None
if spec is None:
    sys.exit(3)
try:
    module = importlib.import_module(name)
except ImportError as exc:
    print(exc)
    sys.exit(4)
print(getattr(module, "__version__", "Unknown version"))
"#;

const PREFIX_PROBE: &str = r#"
import sys
print(sys.prefix)
print(getattr(sys, "base_prefix", sys.prefix))
print(hasattr(sys, "real_prefix"))
"#;

static PIP_VERSION_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^pip\s+(\S+)\s+from\s+(.+?)\s+\(python\s+([^)]+)\)").ok());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    fn status_text(&self) -> String {
        match self.status {
            Some(code) => format!("status {code}"),
            None => "a signal".to_string(),
        }
    }
}

pub trait CommandRunner {
    fn run(&self, program: &Path, args: &[&str]) -> io::Result<CommandOutput>;
}

/// Spawns real processes and captures their output.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[&str]) -> io::Result<CommandOutput> {
        let output = Command::new(program).args(args).output()?;
        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub program: PathBuf,
}

impl Interpreter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolves a bare executable name against `PATH`. Paths and names that
    /// match nothing are kept as given.
    pub fn locate(name: &str) -> Self {
        let candidate = Path::new(name);
        if candidate.components().count() > 1 {
            return Self::new(candidate);
        }
        let found = std::env::var_os("PATH").and_then(|paths| {
            std::env::split_paths(&paths)
                .map(|dir| dir.join(name))
                .find(|path| path.is_file())
        });
        Self::new(found.unwrap_or_else(|| PathBuf::from(name)))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::locate(DEFAULT_INTERPRETER)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageStatus {
    Available { version: String },
    ImportFailed { message: String },
    NotFound,
}

impl PackageStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualEnv {
    pub active: bool,
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManager {
    pub version: String,
    pub location: Option<String>,
    pub python: Option<String>,
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pip {}", self.version)?;
        if let Some(location) = &self.location {
            write!(f, " from {location}")?;
        }
        if let Some(python) = &self.python {
            write!(f, " (python {python})")?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct DiagnosticReport {
    pub interpreter: PathBuf,
    pub version: Result<String, ProbeError>,
    pub executable: Result<PathBuf, ProbeError>,
    pub virtual_env: VirtualEnv,
    pub package_manager: Result<PackageManager, ProbeError>,
    pub packages: Vec<(String, PackageStatus)>,
    pub installs: Vec<(String, InstallOutcome)>,
    /// Statuses after installation; empty when nothing was installed.
    pub rechecked: Vec<(String, PackageStatus)>,
    pub install_requested: bool,
    /// `pip list` output, when requested.
    pub installed: Option<Result<Vec<(String, String)>, ProbeError>>,
}

impl DiagnosticReport {
    pub fn missing(&self) -> Vec<&str> {
        self.packages
            .iter()
            .filter(|(_, status)| !status.is_available())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// True when every package is available after any installation.
    pub fn all_available(&self) -> bool {
        let last = if self.rechecked.is_empty() {
            &self.packages
        } else {
            &self.rechecked
        };
        last.iter().all(|(_, status)| status.is_available())
    }
}

pub struct Diagnostician<R: CommandRunner = SystemRunner> {
    interpreter: Interpreter,
    runner: R,
}

impl Diagnostician<SystemRunner> {
    pub fn system(interpreter: Interpreter) -> Self {
        Self::new(interpreter, SystemRunner)
    }
}

impl<R: CommandRunner> Diagnostician<R> {
    pub fn new(interpreter: Interpreter, runner: R) -> Self {
        Self {
            interpreter,
            runner,
        }
    }

    fn python(&self, args: &[&str]) -> io::Result<CommandOutput> {
        self.runner.run(&self.interpreter.program, args)
    }

    /// Runs the interpreter and insists on a zero exit status.
    fn python_ok(&self, args: &[&str]) -> Result<CommandOutput, ProbeError> {
        let program = self.interpreter.program.display().to_string();
        let output = self.python(args).map_err(|source| ProbeError::Spawn {
            program: program.clone(),
            source,
        })?;
        if output.success() {
            Ok(output)
        } else {
            Err(ProbeError::Failed {
                program,
                status: output.status_text(),
                stderr: output.stderr.trim().to_string(),
            })
        }
    }

    pub fn interpreter_version(&self) -> Result<String, ProbeError> {
        let output = self.python_ok(&["-c", "import sys; print(sys.version)"])?;
        Ok(output.stdout.trim().to_string())
    }

    pub fn executable_path(&self) -> Result<PathBuf, ProbeError> {
        let output = self.python_ok(&["-c", "import sys; print(sys.executable)"])?;
        Ok(PathBuf::from(output.stdout.trim()))
    }

    /// Asks the interpreter whether its prefix differs from the base prefix.
    /// Falls back to `VIRTUAL_ENV` when the interpreter cannot be run.
    pub fn virtual_env(&self) -> VirtualEnv {
        match self.python_ok(&["-c", PREFIX_PROBE]) {
            Ok(output) => {
                let mut lines = output.stdout.lines().map(str::trim);
                let prefix = lines.next().unwrap_or_default().to_string();
                let base = lines.next().unwrap_or_default();
                let real_prefix = lines.next() == Some("True");
                let active = real_prefix || (!prefix.is_empty() && prefix != base);
                VirtualEnv {
                    active,
                    prefix: active.then_some(prefix),
                }
            }
            Err(err) => {
                tracing::debug!(%err, "prefix probe failed, checking VIRTUAL_ENV");
                let prefix = std::env::var("VIRTUAL_ENV").ok().filter(|v| !v.is_empty());
                VirtualEnv {
                    active: prefix.is_some(),
                    prefix,
                }
            }
        }
    }

    pub fn package_manager_version(&self) -> Result<PackageManager, ProbeError> {
        let output = self.python_ok(&["-m", "pip", "--version"])?;
        Ok(parse_pip_version(output.stdout.trim()))
    }

    pub fn check_package(&self, name: &str) -> PackageStatus {
        let output = match self.python(&["-c", PACKAGE_PROBE, name]) {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(package = name, %err, "package probe could not start");
                return PackageStatus::NotFound;
            }
        };
        match output.status {
            Some(0) => PackageStatus::Available {
                version: output.stdout.trim().to_string(),
            },
            Some(PROBE_NOT_FOUND) => PackageStatus::NotFound,
            _ => {
                let message = if output.stdout.trim().is_empty() {
                    output.stderr.trim()
                } else {
                    output.stdout.trim()
                };
                PackageStatus::ImportFailed {
                    message: message.to_string(),
                }
            }
        }
    }

    pub fn install_package(&self, name: &str) -> InstallOutcome {
        tracing::info!(package = name, "attempting install");
        match self.python_ok(&["-m", "pip", "install", name]) {
            Ok(_) => InstallOutcome::Installed,
            Err(err) => {
                let message = match &err {
                    ProbeError::Failed { stderr, .. } => stderr.clone(),
                    ProbeError::Spawn { .. } => err.to_string(),
                };
                tracing::warn!(package = name, stderr = %message, "install failed");
                InstallOutcome::Failed { message }
            }
        }
    }

    /// `name==version` pairs reported by the package manager.
    pub fn list_installed(&self) -> Result<Vec<(String, String)>, ProbeError> {
        let output = self.python_ok(&["-m", "pip", "list", "--format=freeze"])?;
        Ok(output
            .stdout
            .lines()
            .filter_map(|line| {
                let (name, version) = line.trim().split_once("==")?;
                Some((name.to_string(), version.to_string()))
            })
            .collect())
    }

    /// Full sweep: environment, package checks, and optional installation of
    /// whatever is missing followed by a second check.
    pub fn run(&self, packages: &[&str], install: bool) -> DiagnosticReport {
        let statuses: Vec<(String, PackageStatus)> = packages
            .iter()
            .map(|name| (name.to_string(), self.check_package(name)))
            .collect();

        let mut report = DiagnosticReport {
            interpreter: self.interpreter.program.clone(),
            version: self.interpreter_version(),
            executable: self.executable_path(),
            virtual_env: self.virtual_env(),
            package_manager: self.package_manager_version(),
            packages: statuses,
            installs: Vec::new(),
            rechecked: Vec::new(),
            install_requested: install,
            installed: None,
        };

        let missing: Vec<String> = report.missing().into_iter().map(str::to_string).collect();
        if install && !missing.is_empty() {
            report.installs = missing
                .iter()
                .map(|name| (name.clone(), self.install_package(name)))
                .collect();
            report.rechecked = packages
                .iter()
                .map(|name| (name.to_string(), self.check_package(name)))
                .collect();
        }
        report
    }
}

fn parse_pip_version(line: &str) -> PackageManager {
    let captures = PIP_VERSION_RE.as_ref().and_then(|re| re.captures(line));
    match captures {
        Some(caps) => PackageManager {
            version: caps[1].to_string(),
            location: Some(caps[2].to_string()),
            python: Some(caps[3].to_string()),
        },
        None => PackageManager {
            version: line.to_string(),
            location: None,
            python: None,
        },
    }
}

fn write_status(f: &mut fmt::Formatter<'_>, name: &str, status: &PackageStatus) -> fmt::Result {
    match status {
        PackageStatus::Available { version } => {
            writeln!(f, "\u{2713} {name}: Available (version: {version})")
        }
        PackageStatus::ImportFailed { message } => {
            writeln!(f, "\u{2717} {name}: Import failed - {message}")
        }
        PackageStatus::NotFound => writeln!(f, "\u{2717} {name}: Not found"),
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        let section = "-".repeat(SECTION_WIDTH);

        writeln!(f, "{rule}")?;
        writeln!(f, "PYTHON ENVIRONMENT DIAGNOSTIC")?;
        writeln!(f, "{rule}")?;
        match &self.version {
            Ok(version) => writeln!(f, "Python version: {version}")?,
            Err(err) => writeln!(f, "Python version: unavailable ({err})")?,
        }
        match &self.executable {
            Ok(path) => writeln!(f, "Python executable: {}", path.display())?,
            Err(_) => writeln!(f, "Python executable: {}", self.interpreter.display())?,
        }
        writeln!(f, "{section}")?;
        writeln!(f, "Running in virtual environment: {}", self.virtual_env.active)?;
        if let Some(prefix) = &self.virtual_env.prefix {
            writeln!(f, "Virtual env prefix: {prefix}")?;
        }
        writeln!(f, "{section}")?;
        match &self.package_manager {
            Ok(pip) => writeln!(f, "Pip info: {pip}")?,
            Err(err) => writeln!(f, "Pip check failed: {err}")?,
        }
        writeln!(f, "{section}")?;

        writeln!(f, "CHECKING REQUIRED PACKAGES:")?;
        writeln!(f, "{section}")?;
        for (name, status) in &self.packages {
            write_status(f, name, status)?;
        }

        let missing = self.missing();
        if missing.is_empty() {
            writeln!(f)?;
            writeln!(f, "\u{2713} All required packages are available!")?;
        } else {
            writeln!(f)?;
            writeln!(f, "MISSING PACKAGES: {}", missing.join(", "))?;
            writeln!(f, "{section}")?;
            if !self.install_requested {
                writeln!(f, "Re-run with --install to attempt installation.")?;
            }
            for (name, outcome) in &self.installs {
                match outcome {
                    InstallOutcome::Installed => {
                        writeln!(f, "\u{2713} {name} installed successfully")?
                    }
                    InstallOutcome::Failed { message } => {
                        writeln!(f, "\u{2717} Failed to install {name}: {message}")?
                    }
                }
            }
            if !self.rechecked.is_empty() {
                writeln!(f)?;
                writeln!(f, "{rule}")?;
                writeln!(f, "RE-CHECKING PACKAGES AFTER INSTALLATION:")?;
                writeln!(f, "{rule}")?;
                for (name, status) in &self.rechecked {
                    write_status(f, name, status)?;
                }
                if self.all_available() {
                    writeln!(f)?;
                    writeln!(f, "\u{2713} All required packages are available!")?;
                }
            }
        }

        match &self.installed {
            Some(Ok(installed)) => {
                writeln!(f)?;
                writeln!(f, "INSTALLED PACKAGES ({}):", installed.len())?;
                writeln!(f, "{section}")?;
                for (name, version) in installed {
                    writeln!(f, "{name}=={version}")?;
                }
            }
            Some(Err(err)) => {
                writeln!(f)?;
                writeln!(f, "Package listing failed: {err}")?;
            }
            None => {}
        }

        writeln!(f)?;
        writeln!(f, "{rule}")?;
        writeln!(f, "DIAGNOSTIC COMPLETE")?;
        write!(f, "{rule}")
    }
}
