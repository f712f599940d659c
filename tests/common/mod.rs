//! Common test utilities for rigup integration tests
//!
//! Every test runs the real binary inside a sandbox: a temporary home
//! directory, a stub package manager, and a mirrorlist path of its own,
//! all wired through environment variables on the spawned command only.

use std::path::PathBuf;

use tempfile::TempDir;

/// A sandboxed host for one pipeline run
pub struct Sandbox {
    /// Temporary directory backing the sandbox
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Sandbox home directory
    pub home: PathBuf,
    /// Log file the stub package manager appends its arguments to
    pub pkg_log: PathBuf,
    stub: PathBuf,
}

impl Sandbox {
    /// Sandbox with a stub package manager that always succeeds.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let home = temp.path().join("home");
        std::fs::create_dir_all(&home).expect("Failed to create sandbox home");

        // Committer identity for the snapshot step
        std::fs::write(
            home.join(".gitconfig"),
            "[user]\n\tname = Sandbox User\n\temail = sandbox@example.com\n",
        )
        .expect("Failed to write .gitconfig");

        let pkg_log = temp.path().join("pkg-invocations.log");
        let stub = temp.path().join("pkgstub");
        let sandbox = Self {
            temp,
            home,
            pkg_log,
            stub,
        };
        sandbox.write_stub(0);
        sandbox
    }

    /// Rewrite the stub package manager to exit with `code`.
    pub fn write_stub(&self, code: i32) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            std::fs::write(
                &self.stub,
                format!(
                    "#!/bin/sh\necho \"$@\" >> {}\nexit {code}\n",
                    self.pkg_log.display()
                ),
            )
            .expect("Failed to write package manager stub");
            std::fs::set_permissions(&self.stub, std::fs::Permissions::from_mode(0o755))
                .expect("Failed to mark stub executable");
        }
    }

    /// Path the sandboxed run writes mirror endpoints to.
    pub fn mirrorlist(&self) -> PathBuf {
        self.home.join("mirrorlist")
    }

    /// A command for the rigup binary, fully wired into this sandbox.
    /// PATH is emptied so capability probes see a bare host.
    pub fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("rigup").expect("rigup binary");
        cmd.env_clear()
            .env("HOME", &self.home)
            .env("RIGUP_HOME", &self.home)
            .env("RIGUP_PKG", &self.stub)
            .env("RIGUP_MIRRORLIST", self.mirrorlist())
            .env("PATH", "");
        cmd
    }

    /// Read a file under the sandbox home.
    pub fn read_home_file(&self, rel: &str) -> String {
        std::fs::read_to_string(self.home.join(rel)).expect("Failed to read sandbox file")
    }

    /// All backup files directly under the sandbox home.
    pub fn home_backups(&self) -> Vec<PathBuf> {
        std::fs::read_dir(&self.home)
            .expect("Failed to list sandbox home")
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.to_string_lossy().contains(".backup."))
            .collect()
    }
}
