//! Native toolchain invocation for generated units.

use crate::Translation;
use crate::units;
use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

/// Linker profile for the graphics/windowing library stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    /// The platform this binary was built for
    pub fn host() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    pub fn linker_flags(&self) -> &'static [&'static str] {
        match self {
            Platform::Linux => &["-lglfw", "-lGL"],
            Platform::MacOs => &["-framework", "OpenGL", "-lglfw"],
            Platform::Windows => &["-lglfw3", "-lopengl32", "-lgdi32"],
        }
    }

    pub fn executable_name(&self, base: &str) -> String {
        match self {
            Platform::Windows => format!("{}.exe", base),
            _ => base.to_string(),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "macos" | "mac-os" | "mac" => Ok(Platform::MacOs),
            "windows" | "win" => Ok(Platform::Windows),
            other => Err(format!("unknown platform '{}' (expected linux, macos or windows)", other)),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
        };
        f.write_str(name)
    }
}

/// Configuration for the build step.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Where units and the executable are written (default: "bin")
    pub out_dir: PathBuf,
    /// Compiler driver (default: "g++")
    pub compiler: String,
    pub platform: Platform,
    /// Executable base name (default: "game")
    pub executable: String,
    /// Kill the toolchain after this long; `None` waits forever
    pub timeout: Option<Duration>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("bin"),
            compiler: "g++".to_string(),
            platform: Platform::host(),
            executable: "game".to_string(),
            timeout: Some(Duration::from_secs(300)),
        }
    }
}

impl BuildOptions {
    pub fn executable_path(&self) -> PathBuf {
        self.out_dir.join(self.platform.executable_name(&self.executable))
    }
}

/// A successful build
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub executable: PathBuf,
    /// Whatever the toolchain printed (warnings)
    pub diagnostics: String,
}

/// Error from the build step
#[derive(Debug)]
pub enum BuildError {
    /// Writing generated units failed
    Io { path: PathBuf, source: io::Error },
    /// The toolchain could not be started
    Spawn { program: String, source: io::Error },
    /// The toolchain exited unsuccessfully
    Failed { status: Option<i32>, diagnostics: String },
    /// The toolchain ran past the timeout and was killed
    TimedOut { after: Duration, diagnostics: String },
}

impl BuildError {
    /// Captured compiler/linker output, if any
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            BuildError::Failed { diagnostics, .. } | BuildError::TimedOut { diagnostics, .. } => Some(diagnostics),
            _ => None,
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Io { path, source } => write!(f, "could not write {}: {}", path.display(), source),
            BuildError::Spawn { program, source } => write!(f, "could not run '{}': {}", program, source),
            BuildError::Failed { status: Some(code), .. } => write!(f, "toolchain exited with status {}", code),
            BuildError::Failed { status: None, .. } => write!(f, "toolchain was terminated by a signal"),
            BuildError::TimedOut { after, .. } => write!(f, "toolchain timed out after {}s", after.as_secs()),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Io { source, .. } | BuildError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Turns translated units into an executable
pub trait BuildCollaborator {
    fn build(&self, units: &[Translation], options: &BuildOptions) -> Result<BuildOutcome, BuildError>;
}

/// Builds with a GCC-style compiler driver
#[derive(Debug, Clone, Default)]
pub struct Toolchain;

impl Toolchain {
    pub fn new() -> Self {
        Self
    }

    /// Arguments after the program name:
    /// `<sources...> -o <executable> <linker flags...>`
    pub fn arguments(&self, sources: &[PathBuf], options: &BuildOptions) -> Vec<String> {
        let mut args: Vec<String> = sources.iter().map(|p| p.display().to_string()).collect();
        args.push("-o".to_string());
        args.push(options.executable_path().display().to_string());
        args.extend(options.platform.linker_flags().iter().map(|flag| flag.to_string()));
        args
    }

    fn write_units(&self, units: &[Translation], out_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
        let to_build_error = |err: crate::CompileError| match err {
            crate::CompileError::Io { path, source } => BuildError::Io { path, source },
            other => BuildError::Io {
                path: out_dir.to_path_buf(),
                source: io::Error::other(other.to_string()),
            },
        };

        units::prepare_output_dir(out_dir).map_err(to_build_error)?;
        let mut sources = Vec::with_capacity(units.len());
        for unit in units {
            let (_, source) = units::write_unit(out_dir, unit).map_err(to_build_error)?;
            sources.push(source);
        }
        Ok(sources)
    }
}

impl BuildCollaborator for Toolchain {
    fn build(&self, units: &[Translation], options: &BuildOptions) -> Result<BuildOutcome, BuildError> {
        let sources = self.write_units(units, &options.out_dir)?;

        let mut command = Command::new(&options.compiler);
        command.args(self.arguments(&sources, options));

        let finished = run_with_timeout(&mut command, options.timeout).map_err(|source| BuildError::Spawn {
            program: options.compiler.clone(),
            source,
        })?;

        let diagnostics = finished.diagnostics();
        match finished.status {
            None => Err(BuildError::TimedOut {
                after: options.timeout.unwrap_or_default(),
                diagnostics,
            }),
            Some(status) if status.success() => Ok(BuildOutcome {
                executable: options.executable_path(),
                diagnostics,
            }),
            Some(status) => Err(BuildError::Failed {
                status: status.code(),
                diagnostics,
            }),
        }
    }
}

/// Output of a child process
#[derive(Debug)]
pub struct Finished {
    /// `None` when the process was killed at the timeout
    pub status: Option<ExitStatus>,
    pub stdout: String,
    pub stderr: String,
}

impl Finished {
    /// stderr followed by stdout, trimmed
    pub fn diagnostics(&self) -> String {
        let mut text = self.stderr.trim_end().to_string();
        let stdout = self.stdout.trim_end();
        if !stdout.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(stdout);
        }
        text
    }
}

/// Run `command` with captured output, killing it after `timeout`
pub fn run_with_timeout(command: &mut Command, timeout: Option<Duration>) -> io::Result<Finished> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    // Drain both pipes on their own threads so a chatty child cannot block
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = wait(&mut child, timeout)?;

    Ok(Finished {
        status,
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    })
}

fn wait(child: &mut Child, timeout: Option<Duration>) -> io::Result<Option<ExitStatus>> {
    let Some(timeout) = timeout else {
        return child.wait().map(Some);
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            child.kill()?;
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(Duration::from_millis(20));
    }
}
