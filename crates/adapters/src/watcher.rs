// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File watcher (§4.4): poll-based glob matching, mtime diffing.

use ignite_core::Watch;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

/// Result of one poll pass over a job's `watches[]` (§4.4 step 1-3).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchPoll {
    /// Watches (by index into the job's `watches[]`) whose glob matched a
    /// file that's new, changed, or deleted since the last poll.
    pub triggered: Vec<usize>,
}

/// Expand every `watches[].glob_pattern`, diff against `known`, and update
/// `known` in place. The first call (with an empty `known`) seeds the map
/// without triggering anything for files that already existed.
pub fn poll(
    watches: &[Watch],
    known: &mut HashMap<PathBuf, SystemTime>,
    seed_only: bool,
) -> WatchPoll {
    let mut result = WatchPoll::default();
    let mut still_present = std::collections::HashSet::new();

    for (idx, watch) in watches.iter().enumerate() {
        let paths = match glob::glob(&watch.glob_pattern) {
            Ok(paths) => paths,
            Err(_) => continue,
        };

        for entry in paths {
            let Ok(path) = entry else { continue };
            let Ok(metadata) = std::fs::metadata(&path) else {
                continue;
            };
            let Ok(mtime) = metadata.modified() else {
                continue;
            };

            still_present.insert(path.clone());

            match known.get(&path) {
                Some(prev) if *prev == mtime => {}
                _ => {
                    known.insert(path, mtime);
                    if !seed_only {
                        result.triggered.push(idx);
                    }
                }
            }
        }
    }

    // Deleted files also trigger (§4.4 "check deleted files").
    if !seed_only {
        let deleted: Vec<PathBuf> = known
            .keys()
            .filter(|p| !still_present.contains(*p))
            .cloned()
            .collect();
        if !deleted.is_empty() {
            for path in &deleted {
                known.remove(path);
            }
            // A deleted watched file signals every watch, since we don't
            // track which watch originally matched which path.
            result.triggered.extend(0..watches.len());
        }
    }

    result
}
