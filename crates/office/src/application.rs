//! Handle to an external office application (LibreOffice in headless mode).
//!
//! The application is used to open documents the extractors cannot read
//! natively: legacy `.doc`/`.ppt` files are converted to their OOXML
//! counterpart in a private scratch directory and then read as packages.
//! Every process the handle launches is tracked by its identifier and
//! terminated on release.

use crate::legacy;
use crate::package::OoxmlPackage;
use doctext_core::{Container, DocumentFormat, Error, Result};
use std::ffi::OsString;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use url::Url;

/// How often a running conversion is polled when a timeout is configured.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Bytes of the application's log kept for error messages.
const LOG_TAIL_BYTES: usize = 2048;

/// Which office application a handle stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationKind {
    /// Word processor (Word / LibreOffice Writer).
    WordProcessor,
    /// Presentation program (PowerPoint / LibreOffice Impress).
    Presentation,
}

impl ApplicationKind {
    /// Extension of the OOXML format documents are converted to.
    pub fn conversion_target(self) -> &'static str {
        match self {
            ApplicationKind::WordProcessor => "docx",
            ApplicationKind::Presentation => "pptx",
        }
    }

    /// Extension of the legacy binary format.
    pub fn legacy_extension(self) -> &'static str {
        match self {
            ApplicationKind::WordProcessor => "doc",
            ApplicationKind::Presentation => "ppt",
        }
    }

    /// Main stream of the legacy CFB container.
    pub fn legacy_stream(self) -> &'static str {
        match self {
            ApplicationKind::WordProcessor => "/WordDocument",
            ApplicationKind::Presentation => "/PowerPoint Document",
        }
    }

    /// Application kind needed for a document format, if any.
    pub fn for_format(format: DocumentFormat) -> Option<Self> {
        match format {
            DocumentFormat::WordDocument { .. } => Some(ApplicationKind::WordProcessor),
            DocumentFormat::Presentation { .. } => Some(ApplicationKind::Presentation),
            _ => None,
        }
    }
}

/// How to start the office application.
#[derive(Debug, Clone)]
pub struct OfficeLauncher {
    /// Program to run (`soffice` by default, resolved through `PATH`).
    program: PathBuf,

    /// Arguments placed before the conversion arguments.
    leading_args: Vec<OsString>,

    /// Maximum time a single conversion may take. `None` waits forever.
    timeout: Option<Duration>,
}

impl OfficeLauncher {
    /// Create a launcher for the default `soffice` program.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("soffice"),
            leading_args: Vec::new(),
            timeout: None,
        }
    }

    /// Use a different program.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Pass extra arguments to the program ahead of the conversion
    /// arguments.
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Bound each conversion by `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for OfficeLauncher {
    fn default() -> Self {
        Self::new()
    }
}

/// A live office application handle.
///
/// The handle owns a scratch workspace (private user profile and conversion
/// output) and at most one running process at a time. Dropping the handle
/// releases it; [`OfficeApplication::quit`] does the same explicitly.
pub struct OfficeApplication {
    kind: ApplicationKind,
    launcher: OfficeLauncher,
    workspace: Option<TempDir>,
    process: Option<Child>,
    launched: Vec<u32>,
}

impl OfficeApplication {
    /// Start an application of the given kind.
    ///
    /// Creates the private workspace. Processes are launched on demand when
    /// a document needs the application to be opened.
    pub fn launch(kind: ApplicationKind, launcher: OfficeLauncher) -> Result<Self> {
        let workspace = tempfile::Builder::new()
            .prefix("doctext-office-")
            .tempdir()
            .map_err(|e| Error::ApplicationError(format!("Failed to create workspace: {}", e)))?;

        log::debug!(
            "Started {:?} application handle (program {}, workspace {})",
            kind,
            launcher.program().display(),
            workspace.path().display()
        );

        Ok(Self {
            kind,
            launcher,
            workspace: Some(workspace),
            process: None,
            launched: Vec::new(),
        })
    }

    pub fn kind(&self) -> ApplicationKind {
        self.kind
    }

    /// Identifiers of every process this handle has launched.
    pub fn launched_processes(&self) -> &[u32] {
        &self.launched
    }

    /// Identifier of the process currently running, if any.
    pub fn running_process(&self) -> Option<u32> {
        self.process.as_ref().map(Child::id)
    }

    /// Open a document read-only as an OOXML package.
    ///
    /// Files stored as a ZIP package are read directly. Anything else is
    /// converted by the application; CFB containers are checked for the
    /// expected main stream first.
    pub fn open(&mut self, path: &Path) -> Result<OoxmlPackage> {
        match sniff_container(path)? {
            Some(Container::Zip) => {
                log::debug!("Reading {} as an OOXML package", path.display());
                return OoxmlPackage::open(path);
            }
            Some(Container::Cfb) => legacy::probe(path, self.kind)?,
            _ => {}
        }

        let converted = self.convert(path)?;
        OoxmlPackage::open(&converted)
    }

    /// Convert `input` to the OOXML format of this application kind and
    /// return the path of the converted file inside the workspace.
    pub fn convert(&mut self, input: &Path) -> Result<PathBuf> {
        let workspace = self.workspace_path()?;
        let out_dir = workspace.join("out");
        let profile_dir = workspace.join("profile");
        for dir in [&out_dir, &profile_dir] {
            std::fs::create_dir_all(dir).map_err(|e| {
                Error::ApplicationError(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }

        let profile_url = Url::from_directory_path(&profile_dir).map_err(|_| {
            Error::ApplicationError(format!(
                "Cannot express profile directory {} as a file URL",
                profile_dir.display()
            ))
        })?;

        let log_path = workspace.join("application.log");
        let log_file = File::create(&log_path)
            .map_err(|e| Error::ApplicationError(format!("Failed to create log file: {}", e)))?;
        let log_file_err = log_file
            .try_clone()
            .map_err(|e| Error::ApplicationError(format!("Failed to create log file: {}", e)))?;

        let target = self.kind.conversion_target();
        let mut cmd = Command::new(self.launcher.program());
        cmd.args(&self.launcher.leading_args)
            .args([
                "--headless",
                "--invisible",
                "--nologo",
                "--norestore",
                "--nolockcheck",
            ])
            .arg(format!("-env:UserInstallation={}", profile_url))
            .arg("--convert-to")
            .arg(target)
            .arg("--outdir")
            .arg(&out_dir)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log_file))
            .stderr(Stdio::from(log_file_err));

        self.start_process(cmd)?;
        let status = self.wait_for_process()?;

        if !status.success() {
            return Err(Error::ApplicationError(format!(
                "{} exited with {} while converting {}: {}",
                self.launcher.program().display(),
                status,
                input.display(),
                read_log_tail(&log_path)
            )));
        }

        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        let converted = out_dir.join(format!("{}.{}", stem, target));

        if !converted.is_file() {
            return Err(Error::ApplicationError(format!(
                "{} produced no {} output for {}: {}",
                self.launcher.program().display(),
                target,
                input.display(),
                read_log_tail(&log_path)
            )));
        }

        log::debug!("Converted {} to {}", input.display(), converted.display());
        Ok(converted)
    }

    /// Quit the application: terminate any running process it launched and
    /// remove the workspace. Safe to call more than once.
    pub fn quit(&mut self) {
        self.terminate_process();

        if let Some(workspace) = self.workspace.take() {
            let path = workspace.path().to_path_buf();
            match workspace.close() {
                Ok(()) => log::debug!("Removed workspace {}", path.display()),
                Err(e) => log::warn!("Failed to remove workspace {}: {}", path.display(), e),
            }
        }
    }

    /// Spawn a process for this handle. Any process still running is
    /// terminated first so at most one is live at a time.
    pub(crate) fn start_process(&mut self, mut cmd: Command) -> Result<u32> {
        self.terminate_process();

        // Own process group so that workers forked by the launcher are
        // reached on termination.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd.spawn().map_err(|e| {
            Error::ApplicationError(format!(
                "Failed to start {}: {}",
                cmd.get_program().to_string_lossy(),
                e
            ))
        })?;

        let pid = child.id();
        log::debug!("Launched {} (pid {})", cmd.get_program().to_string_lossy(), pid);
        self.launched.push(pid);
        self.process = Some(child);
        Ok(pid)
    }

    /// Wait for the running process, honouring the configured timeout.
    fn wait_for_process(&mut self) -> Result<ExitStatus> {
        match self.launcher.timeout() {
            None => {
                self.process_exited(true)?;
            }
            Some(limit) => {
                let deadline = Instant::now() + limit;
                while !self.process_exited(false)? {
                    if Instant::now() >= deadline {
                        self.terminate_process();
                        return Err(Error::ApplicationError(format!(
                            "{} did not finish within {:?}",
                            self.launcher.program().display(),
                            limit
                        )));
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            }
        }

        let mut child = self
            .process
            .take()
            .ok_or_else(|| Error::ApplicationError("No process is running".to_string()))?;
        let pid = child.id();

        // Workers forked by the launcher may outlive it. The leader is not
        // reaped yet, so its id still names our group.
        kill_process_group(pid);
        let status = child.wait()?;
        log::debug!("Process {} exited with {}", pid, status);
        Ok(status)
    }

    /// Whether the running process has exited, without reaping it on Unix.
    fn process_exited(&mut self, block: bool) -> Result<bool> {
        let child = self
            .process
            .as_mut()
            .ok_or_else(|| Error::ApplicationError("No process is running".to_string()))?;
        Ok(has_exited(child, block)?)
    }

    /// Terminate the tracked process (and its group on Unix) and reap it.
    ///
    /// The leader is never reaped before this point, so the group id cannot
    /// have been reused.
    fn terminate_process(&mut self) {
        let Some(mut child) = self.process.take() else {
            return;
        };
        let pid = child.id();

        kill_process_group(pid);
        if let Err(e) = child.kill() {
            log::debug!("Process {} already gone: {}", pid, e);
        }
        match child.wait() {
            Ok(status) => log::debug!("Terminated process {} ({})", pid, status),
            Err(e) => log::warn!("Failed to reap process {}: {}", pid, e),
        }
    }

    fn workspace_path(&self) -> Result<PathBuf> {
        self.workspace
            .as_ref()
            .map(|w| w.path().to_path_buf())
            .ok_or_else(|| Error::ApplicationError("Application has already quit".to_string()))
    }
}

impl Drop for OfficeApplication {
    fn drop(&mut self) {
        self.quit();
    }
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return;
    };
    // ESRCH (group already empty) is the common case and not an error.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc == 0 {
        log::debug!("Killed remaining members of process group {}", pgid);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {}

/// Check for exit with `waitid(WNOWAIT)`, leaving the child a zombie so its
/// process group id stays reserved until it is reaped.
#[cfg(unix)]
fn has_exited(child: &mut Child, block: bool) -> std::io::Result<bool> {
    let pid = child.id() as libc::id_t;
    let mut flags = libc::WEXITED | libc::WNOWAIT;
    if !block {
        flags |= libc::WNOHANG;
    }

    loop {
        let mut info: libc::siginfo_t = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::waitid(libc::P_PID, pid, &mut info, flags) };
        if rc == 0 {
            // With WNOHANG and nothing to report, si_pid stays zero.
            return Ok(unsafe { info.si_pid() } != 0);
        }
        let err = std::io::Error::last_os_error();
        if err.kind() != std::io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

#[cfg(not(unix))]
fn has_exited(child: &mut Child, block: bool) -> std::io::Result<bool> {
    if block {
        child.wait().map(|_| true)
    } else {
        child.try_wait().map(|status| status.is_some())
    }
}

/// Read the file header and classify its container.
fn sniff_container(path: &Path) -> Result<Option<Container>> {
    let mut file = File::open(path).map_err(|e| doctext_core::classify_io_error(e, path))?;
    let mut magic = [0u8; 8];
    let mut filled = 0;
    while filled < magic.len() {
        let n = file.read(&mut magic[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(DocumentFormat::container_from_magic(&magic[..filled]))
}

/// Last few lines of the application's log, for error messages.
fn read_log_tail(path: &Path) -> String {
    let content = std::fs::read(path).unwrap_or_default();
    let start = content.len().saturating_sub(LOG_TAIL_BYTES);
    let tail = String::from_utf8_lossy(&content[start..]).trim().to_string();
    if tail.is_empty() {
        "no output".to_string()
    } else {
        tail
    }
}
