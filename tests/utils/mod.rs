// Integration test utilities
//
// Fake runtime installations: a `bin/java` shell script whose behavior is
// picked by the last argument (the benchmark name passed by the catalog).

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Script body shared by all fake runtimes
///
/// - `-version`: prints a banner and exits 0
/// - `ok`: prints a profile with the given unknown_Java percentage
/// - `validation`: prints a profile, a validation failure and exits 1
/// - `crash`: writes hs_err.log into the working directory and exits 134
/// - `binary-crash`: writes non-UTF-8 bytes to both streams and exits 134
/// - `env`: prints JAVA_HOME and PATH
const SCRIPT: &str = r#"#!/bin/sh
for last; do :; done
case "$last" in
  -version)
    echo "fake runtime __LABEL__" >&2
    exit __VERSION_EXIT__
    ;;
  ok)
    echo "--- Execution profile ---"
    echo "Total samples       : 1000"
    echo "unknown_Java        : 10 (__PERCENT__%)"
    echo "not_walkable_Java   : 0 (0.00%)"
    echo ""
    exit 0
    ;;
  validation)
    echo "--- Execution profile ---"
    echo "unknown_Java (__PERCENT__%) (3 samples)"
    echo ""
    echo "Digest validation failed"
    exit 1
    ;;
  crash)
    printf '# A fatal error has been detected\n# SIGSEGV (0xb)\n' > hs_err.log
    echo "boom from __LABEL__" >&2
    exit 134
    ;;
  binary-crash)
    printf 'out \377 end\n'
    printf 'bad \377\376 bytes\n' >&2
    exit 134
    ;;
  env)
    echo "JAVA_HOME=$JAVA_HOME"
    echo "PATH=$PATH"
    echo "ARGS=$*"
    exit 0
    ;;
esac
echo "unknown workload $last" >&2
exit 3
"#;

/// A temporary runtime home containing an executable `bin/java`
pub struct FakeRuntime {
    pub dir: TempDir,
}

impl FakeRuntime {
    /// Runtime whose `ok`/`validation` workloads report `percent` unknown_Java
    pub fn new(label: &str, percent: &str) -> Self {
        Self::with_version_exit(label, percent, 0)
    }

    pub fn with_version_exit(label: &str, percent: &str, version_exit: i32) -> Self {
        let dir = TempDir::new().unwrap();
        let bin = dir.path().join("bin");
        fs::create_dir_all(&bin).unwrap();

        let script = SCRIPT
            .replace("__LABEL__", label)
            .replace("__PERCENT__", percent)
            .replace("__VERSION_EXIT__", &version_exit.to_string());
        let java = bin.join("java");
        fs::write(&java, script).unwrap();
        fs::set_permissions(&java, fs::Permissions::from_mode(0o755)).unwrap();

        Self { dir }
    }

    pub fn home(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }
}

/// Write a catalog with one benchmark per name; the name doubles as the workload
pub fn write_catalog(dir: &Path, names: &[&str]) -> PathBuf {
    let mut toml = String::new();
    for name in names {
        toml.push_str(&format!(
            "[[benchmark]]\nname = \"{}\"\nargs = [\"{}\"]\n\n",
            name, name
        ));
    }
    let path = dir.join("catalog.toml");
    fs::write(&path, toml).unwrap();
    path
}
