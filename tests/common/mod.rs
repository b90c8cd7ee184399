//! Shared fixtures for the integration suites: a throwaway C project
//! with a fake compiler and a fake clang-tidy built from shell scripts.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tidycache::cache::fs::FsStore;
use tidycache::config::Config;
use tidycache::orchestrator::Orchestrator;

/// Write an executable shell script at `path`.
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::write(path, body).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Fake compiler: in preprocess mode it copies the input file to the
/// `-o` target, so the "preprocessed output" is the source bytes.
pub fn fake_cc_body() -> String {
    r#"#!/bin/sh
out=""
prev=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then out="$a"; fi
  prev="$a"
done
cat "$prev" > "$out"
"#
    .to_string()
}

/// Fake compiler variant that prepends the working directory to the
/// output, so the result embeds an absolute checkout path.
pub fn fake_cc_embedding_cwd_body() -> String {
    r#"#!/bin/sh
out=""
prev=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then out="$a"; fi
  prev="$a"
done
{ pwd; cat "$prev"; } > "$out"
"#
    .to_string()
}

/// Fake clang-tidy: logs each run, honours `-export-fixes`, and exits
/// with the given code.
pub fn fake_tidy_body(runs_log: &Path, export_content: &str, exit_code: i32) -> String {
    format!(
        r#"#!/bin/sh
echo run >> "{log}"
exp=""
prev=""
for a in "$@"; do
  if [ "$prev" = "-export-fixes" ]; then exp="$a"; fi
  prev="$a"
done
if [ -n "$exp" ]; then printf '{content}\n' > "$exp"; fi
exit {code}
"#,
        log = runs_log.display(),
        content = export_content,
        code = exit_code,
    )
}

/// One self-contained project checkout plus tool scripts and cache dir.
pub struct Project {
    pub dir: tempfile::TempDir,
    pub root: PathBuf,
    pub cache_dir: PathBuf,
    pub runs_log: PathBuf,
    pub cc: PathBuf,
    pub tidy: PathBuf,
}

impl Project {
    pub fn new() -> Self {
        Self::with_tool_exit(0)
    }

    pub fn with_tool_exit(exit_code: i32) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("project");
        std::fs::create_dir_all(root.join("inc")).unwrap();

        std::fs::write(root.join("main.c"), "int main(void) { return 0; }\n").unwrap();
        std::fs::write(root.join(".clang-tidy"), "Checks: 'readability-*'\n").unwrap();

        let cc = dir.path().join("fake-cc");
        write_script(&cc, &fake_cc_body());

        let runs_log = dir.path().join("runs.log");
        let tidy = dir.path().join("fake-tidy");
        write_script(&tidy, &fake_tidy_body(&runs_log, "fixes-content", exit_code));

        let project = Self {
            cache_dir: dir.path().join("cache"),
            dir,
            root,
            runs_log,
            cc,
            tidy,
        };
        project.write_compile_db();
        project
    }

    /// Write (or rewrite) `compile_commands.json` for `main.c`.
    pub fn write_compile_db(&self) {
        let db = serde_json::json!([{
            "directory": self.root.display().to_string(),
            "command": format!("{} -I./inc -c main.c -o main.o", self.cc.display()),
            "file": "main.c",
        }]);
        std::fs::write(
            self.root.join("compile_commands.json"),
            serde_json::to_string_pretty(&db).unwrap(),
        )
        .unwrap();
    }

    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.tool.path = self.tidy.display().to_string();
        config.cache.dir = Some(self.cache_dir.clone());
        config
    }

    pub fn store(&self) -> FsStore {
        FsStore::new(Some(self.cache_dir.clone())).unwrap()
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(self.config(), Box::new(self.store()))
    }

    pub fn export_path(&self) -> PathBuf {
        self.dir.path().join("fixes.yaml")
    }

    /// Argument vector for a cached analysis run of `main.c`.
    pub fn tidy_args(&self) -> Vec<String> {
        vec![
            "-export-fixes".to_string(),
            self.export_path().display().to_string(),
            "-p".to_string(),
            self.root.display().to_string(),
            "main.c".to_string(),
        ]
    }

    /// How many times the fake tool has been invoked.
    pub fn tool_runs(&self) -> usize {
        std::fs::read_to_string(&self.runs_log)
            .map(|log| log.lines().count())
            .unwrap_or(0)
    }

    /// Number of entries in the local cache store.
    pub fn cache_entries(&self) -> usize {
        self.store().stats().unwrap().entries
    }
}
