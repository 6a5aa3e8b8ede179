// Mountpoint directory lifecycle and mount/umount via util-linux

use crate::command::{Command, Executor, SystemExecutor};
use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

/// Permission mode used by [`MountPoint::create`] when none is given.
pub const DEFAULT_DIR_MODE: &str = "0700";

/// Mount options, normalised to a list. Build from a comma-delimited string or a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountOptions(Vec<String>);

impl MountOptions {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// The `-o` argument value.
    pub fn joined(&self) -> String {
        self.0.join(",")
    }
}

impl From<&str> for MountOptions {
    fn from(s: &str) -> Self {
        Self(
            s.split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

impl From<String> for MountOptions {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Vec<String>> for MountOptions {
    fn from(v: Vec<String>) -> Self {
        Self(
            v.into_iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
        )
    }
}

impl From<&[&str]> for MountOptions {
    fn from(v: &[&str]) -> Self {
        Self::from(v.iter().map(|o| o.to_string()).collect::<Vec<_>>())
    }
}

impl<const N: usize> From<[&str; N]> for MountOptions {
    fn from(v: [&str; N]) -> Self {
        Self::from(&v[..])
    }
}

/// One directory that a filesystem is (or will be) mounted on.
///
/// Holds no OS resources; dropping it never unmounts anything.
#[derive(Clone)]
pub struct MountPoint {
    path: PathBuf,
    executor: Arc<dyn Executor>,
}

impl fmt::Debug for MountPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountPoint")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl MountPoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_executor(path, Arc::new(SystemExecutor))
    }

    pub fn with_executor(path: impl Into<PathBuf>, executor: Arc<dyn Executor>) -> Self {
        Self {
            path: path.into(),
            executor,
        }
    }

    /// Mountpoint for a filesystem identifier, placed under `base`. See [`build_path`].
    pub fn for_id(base: impl AsRef<Path>, id: &str, executor: Arc<dyn Executor>) -> Self {
        Self::with_executor(build_path(base, id), executor)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    /// `Ok(true)` if the path is a directory, `Ok(false)` if nothing is there.
    /// Anything else at the path is [`Error::NotADirectory`].
    pub fn exists(&self) -> Result<bool> {
        match std::fs::metadata(&self.path) {
            Ok(meta) if meta.is_dir() => Ok(true),
            Ok(_) => Err(Error::NotADirectory(self.path.clone())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(Error::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Create the directory (and parents) with `mode`. No-op if it already exists.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn create(&self, mode: &str) -> Result<()> {
        if self.exists()? {
            return Ok(());
        }
        self.executor.execute(
            &Command::new("mkdir")
                .arg("--parents")
                .arg(format!("--mode={}", mode))
                .arg(self.path_arg()),
        )?;
        tracing::info!(mode, "Created mountpoint directory");
        Ok(())
    }

    /// Remove the directory recursively. No-op if it does not exist.
    /// With `force`, a concurrent removal of the path is not an error.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn unlink(&self, force: bool) -> Result<()> {
        if !self.exists()? {
            return Ok(());
        }
        let mut cmd = Command::new("rm").arg("--recursive");
        if force {
            cmd = cmd.arg("--force");
        }
        self.executor.execute(&cmd.arg(self.path_arg()))?;
        tracing::info!("Removed mountpoint directory");
        Ok(())
    }

    /// Whether the path is currently a mount boundary.
    ///
    /// `mountpoint -q` answers through its exit status: 0 is true, anything else false.
    /// Only a failure to run the program at all is an error.
    pub fn is_mount_point(&self) -> Result<bool> {
        let output = self.executor.execute(
            &Command::new("mountpoint")
                .arg("-q")
                .arg(self.path_arg())
                .ignore_failure(),
        )?;
        Ok(output.success())
    }

    pub fn is_mounted(&self) -> Result<bool> {
        self.is_mount_point()
    }

    /// Mount whatever fstab assigns to this path. The directory must already exist.
    #[instrument(skip(self, options), fields(path = %self.path.display()))]
    pub fn mount(&self, options: impl Into<MountOptions>) -> Result<()> {
        let options = options.into();
        let mut cmd = Command::new("mount").arg("-v");
        if !options.is_empty() {
            cmd = cmd.arg("-o").arg(options.joined());
        }
        self.executor
            .execute(&cmd.arg("--target").arg(self.path_arg()).merge_stderr())?;
        tracing::info!(options = %options.joined(), "Mounted");
        Ok(())
    }

    /// Unmount. `force` and `lazy` map to `-f` and `-l` and may be combined.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn umount(&self, force: bool, lazy: bool) -> Result<()> {
        let mut cmd = Command::new("umount").arg("-v");
        if force {
            cmd = cmd.arg("-f");
        }
        if lazy {
            cmd = cmd.arg("-l");
        }
        self.executor
            .execute(&cmd.arg(self.path_arg()).merge_stderr())?;
        tracing::info!("Unmounted");
        Ok(())
    }

    fn path_arg(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// True for paths of the form `/dev/<something>`.
pub fn is_device_file(id: &str) -> bool {
    id.len() > "/dev/".len() && id.starts_with("/dev/")
}

/// Decode `\xNN` (udev/systemd) and `\NNN` octal (mount table) escapes.
pub fn unescape_path(path: &str) -> String {
    let bytes = path.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            let rest = &bytes[i + 1..];
            if rest.len() >= 3
                && rest[0] == b'x'
                && rest[1].is_ascii_hexdigit()
                && rest[2].is_ascii_hexdigit()
                && let Ok(v) = u8::from_str_radix(&path[i + 2..i + 4], 16)
            {
                out.push(v);
                i += 4;
                continue;
            }
            if rest.len() >= 3
                && rest[..3].iter().all(|b| (b'0'..=b'7').contains(b))
                && let Ok(v) = u8::from_str_radix(&path[i + 1..i + 4], 8)
            {
                out.push(v);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Canonical mountpoint directory for a filesystem identifier (UUID, label or device file).
///
/// Device files are flattened into a single token:
/// `/dev/disk/by-id/wwn-0x5000cca211cc703c-part1` becomes
/// `<base>/dev-disk-by-id-wwn-0x5000cca211cc703c-part1`. Other identifiers are used as is.
/// Pure: touches no filesystem.
pub fn build_path(base: impl AsRef<Path>, id: &str) -> PathBuf {
    let token = if is_device_file(id) {
        unescape_path(id)
            .trim_matches('/')
            .replace(['/', ':'], "-")
    } else {
        id.to_string()
    };
    base.as_ref().join(token)
}
