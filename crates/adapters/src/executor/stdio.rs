// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stdio sink resolution (§3: `stdout_path`/`stderr_path`, "same path means
//! merged") and the optional per-line timestamp prefix reader (§4.1 step 2).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::process::Stdio;

/// How one of a job's output streams (stdout or stderr) is wired up.
pub enum StdioPlan {
    /// No reformatting needed: the fd is handed straight to the child.
    Direct(Stdio),
    /// The child's output is piped back to us so each line can be
    /// timestamp-prefixed before reaching the real destination.
    Prefixed(Box<dyn Write + Send>),
}

#[cfg(unix)]
fn open_sink(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    // create|append|sync (§4.1 step 1, §5): every write durable before the
    // syscall returns, matching the "appended to" wording for restarted jobs.
    OpenOptions::new()
        .create(true)
        .append(true)
        .custom_flags(libc::O_SYNC)
        .open(path)
}

#[cfg(not(unix))]
fn open_sink(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

enum RawSink {
    Inherit,
    File(File),
}

/// Opens `stdout_path`/`stderr_path`, sharing a single open file description
/// when they're the same path so stdout and stderr truly merge into one
/// stream (same offset, same fd) rather than racing two independent fds
/// pointed at the same file.
fn resolve_raw(
    stdout_path: Option<&Path>,
    stderr_path: Option<&Path>,
) -> std::io::Result<(RawSink, RawSink)> {
    if let (Some(out), Some(err)) = (stdout_path, stderr_path) {
        if out == err {
            let file = open_sink(out)?;
            let dup = file.try_clone()?;
            return Ok((RawSink::File(file), RawSink::File(dup)));
        }
    }

    let stdout = match stdout_path {
        Some(p) => RawSink::File(open_sink(p)?),
        None => RawSink::Inherit,
    };
    let stderr = match stderr_path {
        Some(p) => RawSink::File(open_sink(p)?),
        None => RawSink::Inherit,
    };
    Ok((stdout, stderr))
}

/// Resolve both of a job's output streams. When `prefixed` is false (no
/// `timestamp_format` configured) each stream is handed to the child
/// directly; otherwise both come back as [`StdioPlan::Prefixed`] writers the
/// caller pipes the child's actual output through, one line at a time.
pub fn resolve_stdio(
    stdout_path: Option<&Path>,
    stderr_path: Option<&Path>,
    prefixed: bool,
) -> std::io::Result<(StdioPlan, StdioPlan)> {
    let (stdout, stderr) = resolve_raw(stdout_path, stderr_path)?;

    if !prefixed {
        return Ok((
            StdioPlan::Direct(stdio_for(stdout, Stdio::inherit)),
            StdioPlan::Direct(stdio_for(stderr, Stdio::inherit)),
        ));
    }

    Ok((
        StdioPlan::Prefixed(writer_for(stdout, || Box::new(std::io::stdout()))),
        StdioPlan::Prefixed(writer_for(stderr, || Box::new(std::io::stderr()))),
    ))
}

fn stdio_for(sink: RawSink, inherit: fn() -> Stdio) -> Stdio {
    match sink {
        RawSink::Inherit => inherit(),
        RawSink::File(file) => Stdio::from(file),
    }
}

fn writer_for(
    sink: RawSink,
    inherit: impl FnOnce() -> Box<dyn Write + Send>,
) -> Box<dyn Write + Send> {
    match sink {
        RawSink::Inherit => inherit(),
        RawSink::File(file) => Box::new(file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unwrap_direct(plan: StdioPlan) -> Stdio {
        match plan {
            StdioPlan::Direct(stdio) => stdio,
            StdioPlan::Prefixed(_) => panic!("expected a direct plan"),
        }
    }

    #[test]
    fn no_path_inherits() {
        // Stdio has no PartialEq; just assert it doesn't error.
        let (stdout, stderr) = resolve_stdio(None, None, false).unwrap();
        let _ = unwrap_direct(stdout);
        let _ = unwrap_direct(stderr);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/out.log");
        let (stdout, _stderr) = resolve_stdio(Some(&path), None, false).unwrap();
        let _ = unwrap_direct(stdout);
        assert!(path.parent().unwrap().is_dir());
    }

    #[test]
    fn appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");
        std::fs::write(&path, b"first\n").unwrap();
        let (stdout, _stderr) = resolve_stdio(Some(&path), None, false).unwrap();
        let _ = unwrap_direct(stdout);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\n");
    }

    #[test]
    fn equal_paths_share_one_file_description() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("combined.log");
        let (stdout, stderr) = resolve_stdio(Some(&path), Some(&path), true).unwrap();
        let StdioPlan::Prefixed(mut out) = stdout else {
            panic!("expected a prefixed plan")
        };
        let StdioPlan::Prefixed(mut err) = stderr else {
            panic!("expected a prefixed plan")
        };
        writeln!(out, "from stdout").unwrap();
        writeln!(err, "from stderr").unwrap();
        drop(out);
        drop(err);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "from stdout\nfrom stderr\n");
    }

    #[test]
    fn distinct_paths_get_independent_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("out.log");
        let err_path = dir.path().join("err.log");
        let (stdout, stderr) = resolve_stdio(Some(&out_path), Some(&err_path), true).unwrap();
        let StdioPlan::Prefixed(mut out) = stdout else {
            panic!("expected a prefixed plan")
        };
        let StdioPlan::Prefixed(mut err) = stderr else {
            panic!("expected a prefixed plan")
        };
        writeln!(out, "o").unwrap();
        writeln!(err, "e").unwrap();
        drop(out);
        drop(err);
        assert_eq!(std::fs::read_to_string(&out_path).unwrap(), "o\n");
        assert_eq!(std::fs::read_to_string(&err_path).unwrap(), "e\n");
    }
}
