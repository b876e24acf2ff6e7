use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Stand-in for `go`: logs every invocation, answers `go env` from
/// `FAKE_GOPATH`/`FAKE_GOMODCACHE`, and "disassembles" a binary by printing
/// its contents.
const FAKE_GO: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_GO_LOG"
case "$1" in
  version)
    [ -n "$FAKE_GO_BROKEN" ] && exit 1
    echo "go version go1.22.0 linux/amd64"
    ;;
  env)
    case "$2" in
      GOPATH) echo "$FAKE_GOPATH" ;;
      GOMODCACHE) echo "$FAKE_GOMODCACHE" ;;
    esac
    ;;
  tool)
    if [ -s "$5" ]; then
      cat "$5"
    else
      echo "objdump: $5: not a Go executable" >&2
      exit 1
    fi
    ;;
  install)
    if [ "$2" = "$FAKE_GO_FAIL_INSTALL" ]; then
      echo "go: $2: module not found" >&2
      exit 1
    fi
    echo "fake go: installed $2"
    ;;
esac
"#;

#[allow(dead_code)]
pub struct TestContext {
    pub _temp_dir: TempDir,
    pub go_path: PathBuf,
    pub go_log: PathBuf,
    pub gopath: PathBuf,
    pub bin_dir: PathBuf,
    pub module_cache: PathBuf,
    pub bin_path: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let go_path = temp_dir.path().join("fake-go");
        let go_log = temp_dir.path().join("go-calls.log");
        let gopath = temp_dir.path().join("gopath");
        let bin_dir = gopath.join("bin");
        let module_cache = gopath.join("pkg").join("mod");

        fs::write(&go_path, FAKE_GO).expect("Failed to write fake go");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&go_path).unwrap().permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&go_path, perms).unwrap();
        }
        fs::create_dir_all(&bin_dir).expect("Failed to create bin dir");
        fs::create_dir_all(&module_cache).expect("Failed to create module cache");

        let bin_path = PathBuf::from(env!("CARGO_BIN_EXE_gobinupdate"));

        Self {
            _temp_dir: temp_dir,
            go_path,
            go_log,
            gopath,
            bin_dir,
            module_cache,
            bin_path,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(&self.bin_path);
        cmd.env("GOBINUPDATE_GO", &self.go_path);
        cmd.env("FAKE_GO_LOG", &self.go_log);
        cmd.env("FAKE_GOPATH", &self.gopath);
        cmd.env("FAKE_GOMODCACHE", &self.module_cache);
        cmd.env_remove("GOBINUPDATE_DRY_RUN");
        cmd.env_remove("RUST_LOG");
        cmd.env_remove("CLICOLOR_FORCE");
        cmd
    }

    /// A fake installed binary whose symbol table points at
    /// `<module cache>/<module_at_version>/<package_file>`.
    pub fn install_binary(
        &self,
        name: &str,
        module_at_version: &str,
        package_file: &str,
    ) -> PathBuf {
        let source = self.module_cache.join(module_at_version).join(package_file);
        self.write_binary(
            name,
            &format!(
                "TEXT main.main(SB) {}\n  main.go:10\t0x4a1b20\t493b6610\tCMPQ 0x10(R14), SP\n",
                source.display()
            ),
        )
    }

    pub fn write_binary(&self, name: &str, objdump_output: &str) -> PathBuf {
        let path = self.bin_dir.join(name);
        fs::write(&path, objdump_output).expect("Failed to write fake binary");
        path
    }

    /// Every `go` invocation so far, one per line, without the executable.
    pub fn go_calls(&self) -> Vec<String> {
        read_lines(&self.go_log)
    }

    pub fn go_installs(&self) -> Vec<String> {
        self.go_calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix("install ").map(str::to_string))
            .collect()
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

#[allow(dead_code)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }
}

#[allow(dead_code)]
impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        if !self.status.success() {
            panic!(
                "Command failed with status {:?}\nstdout: {}\nstderr: {}",
                self.status.code(),
                self.stdout,
                self.stderr
            );
        }
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Stdout did not contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    pub fn assert_stdout_lacks(&self, text: &str) -> &Self {
        assert!(
            !self.stdout.contains(text),
            "Stdout unexpectedly contained '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }
}
