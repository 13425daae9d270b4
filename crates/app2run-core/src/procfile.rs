//! Procfile side-car handling
//!
//! Buildpack runtimes read their start command from a `Procfile` in the
//! application directory rather than from a deploy flag. The decision of
//! what to do with an existing file is a pure function
//! ([`plan_procfile`]); reading and writing go through [`ProcfileStore`].

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File name buildpacks look for
pub const PROCFILE_NAME: &str = "Procfile";

/// Process type that serves HTTP traffic
pub const WEB_PROCESS: &str = "web";

/// Read/write access to the Procfile
pub trait ProcfileStore {
    /// Current contents, `None` when no Procfile exists
    ///
    /// # Errors
    /// Returns any IO error other than the file being absent.
    fn read(&self) -> io::Result<Option<String>>;

    /// Create the Procfile with `contents`
    ///
    /// # Errors
    /// Returns the underlying IO error.
    fn write(&self, contents: &str) -> io::Result<()>;
}

/// What to do with the Procfile for a given entrypoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcfileAction {
    /// No Procfile yet; create one with these contents
    Create {
        /// Full file contents
        contents: String,
    },
    /// The existing Procfile already declares this `web` process
    AlreadyDeclared,
    /// The existing Procfile lacks this `web` process; it is left untouched
    Conflict {
        /// What the existing file declares for `web`, if anything
        existing_web: Option<String>,
    },
}

/// Decide how to reconcile `existing` Procfile contents with `entrypoint`
#[must_use]
pub fn plan_procfile(existing: Option<&str>, entrypoint: &str) -> ProcfileAction {
    let Some(existing) = existing else {
        return ProcfileAction::Create {
            contents: format!("{WEB_PROCESS}: {entrypoint}\n"),
        };
    };

    match process_command(existing, WEB_PROCESS) {
        Some(command) if command == entrypoint.trim() => ProcfileAction::AlreadyDeclared,
        other => ProcfileAction::Conflict {
            existing_web: other.map(str::to_string),
        },
    }
}

/// Command declared for process `name`, from line-oriented `name: command`
fn process_command<'a>(contents: &'a str, name: &str) -> Option<&'a str> {
    contents.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        (key.trim() == name).then(|| value.trim())
    })
}

/// Procfile in a directory on disk
#[derive(Debug, Clone)]
pub struct FsProcfile {
    path: PathBuf,
}

impl FsProcfile {
    /// Procfile inside `dir`
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(PROCFILE_NAME),
        }
    }

    /// Full path of the file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProcfileStore for FsProcfile {
    fn read(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        std::fs::write(&self.path, contents)
    }
}

/// Procfile held in memory
#[derive(Debug, Default)]
pub struct MemoryProcfile {
    contents: Mutex<Option<String>>,
}

impl MemoryProcfile {
    /// No Procfile
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing Procfile with `contents`
    #[must_use]
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }

    /// Current contents
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .map_or_else(|poisoned| poisoned.into_inner().clone(), |c| c.clone())
    }
}

impl ProcfileStore for MemoryProcfile {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        let mut guard = self
            .contents
            .lock()
            .map_err(|_| io::Error::other("procfile lock poisoned"))?;
        *guard = Some(contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_creates_missing_file() {
        assert_eq!(
            plan_procfile(None, "gunicorn -b :$PORT main:app"),
            ProcfileAction::Create {
                contents: "web: gunicorn -b :$PORT main:app\n".to_string()
            }
        );
    }

    #[test]
    fn plan_accepts_matching_web_entry() {
        let existing = "worker: celery\nweb:   gunicorn main:app  \n";
        assert_eq!(
            plan_procfile(Some(existing), "gunicorn main:app"),
            ProcfileAction::AlreadyDeclared
        );
    }

    #[test]
    fn plan_reports_conflicting_web_entry() {
        assert_eq!(
            plan_procfile(Some("web: python app.py\n"), "gunicorn main:app"),
            ProcfileAction::Conflict {
                existing_web: Some("python app.py".to_string())
            }
        );
    }

    #[test]
    fn plan_reports_missing_web_entry() {
        assert_eq!(
            plan_procfile(Some("worker: rake jobs\n"), "bundle exec ruby app.rb"),
            ProcfileAction::Conflict { existing_web: None }
        );
    }

    #[test]
    fn web_command_may_contain_colons() {
        assert_eq!(
            process_command("web: gunicorn -b :$PORT main:app", "web"),
            Some("gunicorn -b :$PORT main:app")
        );
    }

    #[test]
    fn fs_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsProcfile::in_dir(dir.path());
        assert_eq!(store.read().unwrap(), None);

        store.write("web: ./run\n").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("web: ./run\n"));
        assert!(store.path().ends_with(PROCFILE_NAME));
    }

    #[test]
    fn memory_store_records_writes() {
        let store = MemoryProcfile::new();
        store.write("web: a\n").unwrap();
        assert_eq!(store.contents().as_deref(), Some("web: a\n"));
    }
}
