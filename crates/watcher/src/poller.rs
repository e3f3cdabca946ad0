//! Fixed-interval change detection loop
//!
//! One [`Poller`] owns the active watch list for a session and drives
//! repeated scans over it. A scan stats every entry, compares the
//! observed mtime against the entry's last-seen value, and hands
//! changed entries to the copier. Per-entry failures are logged and
//! contained; one unreadable file or failed copy never stops the rest
//! of the session.

use crate::copier;
use crate::registry::ActiveWatchList;
use std::fs;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default wait between scan cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// What one scan cycle did, for logging and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Entries whose mtime was read this cycle.
    pub entries_checked: usize,
    /// Source paths replicated this cycle.
    pub copied: Vec<PathBuf>,
    /// Entries that could not be stat'd (skipped until next cycle).
    pub unreadable: usize,
    /// Replications that failed after a change was detected.
    pub copy_failures: usize,
}

/// The polling engine for one watch session.
///
/// Single-owner: the poller alone mutates entry timestamps, so a
/// change triggers at most one copy.
pub struct Poller {
    list: ActiveWatchList,
    interval: Duration,
    /// Per-group disabled flags, set once destinations are validated.
    disabled: Vec<bool>,
    prepared: bool,
}

impl Poller {
    pub fn new(list: ActiveWatchList, interval: Duration) -> Self {
        Self {
            list,
            interval,
            disabled: Vec::new(),
            prepared: false,
        }
    }

    /// Run one scan cycle over every enabled group.
    ///
    /// The first cycle of a session validates destinations and
    /// baselines entries without copying; later cycles copy any entry
    /// whose observed mtime differs from its last-seen value. The
    /// cached mtime is updated even when the copy fails, so a failed
    /// copy is retried only once the source changes again.
    pub fn scan(&mut self) -> ScanReport {
        if !self.prepared {
            self.prepare_destinations();
            self.prepared = true;
        }

        let mut report = ScanReport::default();

        for (idx, group) in self.list.groups.iter_mut().enumerate() {
            if self.disabled[idx] {
                continue;
            }

            for entry in &mut group.entries {
                let observed = match fs::metadata(&entry.source).and_then(|m| m.modified()) {
                    Ok(mtime) => mtime,
                    Err(err) => {
                        warn!(
                            "could not read {}, skipping this cycle: {}",
                            entry.source.display(),
                            err
                        );
                        report.unreadable += 1;
                        continue;
                    }
                };
                report.entries_checked += 1;

                if entry.last_seen == Some(observed) {
                    continue;
                }

                // First observation only establishes the baseline.
                if entry.last_seen.is_some() {
                    match copier::copy_file(&entry.source, &group.dest) {
                        Ok(target) => {
                            info!(
                                "{} changed, copied to {}",
                                entry.source.display(),
                                target.display()
                            );
                            report.copied.push(entry.source.clone());
                        }
                        Err(err) => {
                            error!("{}", err);
                            report.copy_failures += 1;
                        }
                    }
                }

                entry.last_seen = Some(observed);
            }
        }

        report
    }

    /// Repeat [`Poller::scan`] until `shutdown` resolves.
    ///
    /// Cancellation is checked only between cycles, so a copy in
    /// progress always completes or fails before the loop exits.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        let mut timer = tokio::time::interval(self.interval);

        info!(
            "watching {} files across {} destinations (every {:?})",
            self.list.len(),
            self.list.groups.len(),
            self.interval
        );

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    let report = self.scan();
                    if report.copied.is_empty() && report.copy_failures == 0 {
                        debug!("scan cycle: {} entries, no changes", report.entries_checked);
                    }
                }
                _ = &mut shutdown => {
                    info!("stop requested, ending watch session");
                    break;
                }
            }
        }
    }

    /// Create or verify each group's destination root, once per
    /// session. A destination that cannot be resolved to a writable
    /// directory disables its whole group for the session; the other
    /// groups keep running.
    fn prepare_destinations(&mut self) {
        self.disabled = vec![false; self.list.groups.len()];

        for (idx, group) in self.list.groups.iter().enumerate() {
            if group.entries.is_empty() {
                continue;
            }

            if let Err(err) = fs::create_dir_all(&group.dest) {
                error!(
                    "destination {} is not usable ({}), skipping {} entries for this session",
                    group.dest.display(),
                    err,
                    group.entries.len()
                );
                self.disabled[idx] = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{build_active_list, single_group};
    use crate::testutil::in_dir;
    use filetime::FileTime;
    use std::path::Path;
    use tempfile::TempDir;
    use wac_core::Config;

    fn poller_for(sources: &[&str], dest: &str) -> Poller {
        let list = single_group(
            sources.iter().map(|s| PathBuf::from(*s)).collect(),
            Path::new(dest),
        );
        Poller::new(list, DEFAULT_POLL_INTERVAL)
    }

    fn set_mtime(path: &str, unix_seconds: i64) {
        filetime::set_file_mtime(path, FileTime::from_unix_time(unix_seconds, 0)).unwrap();
    }

    #[test]
    fn first_scan_baselines_without_copying() {
        let dir = TempDir::new().unwrap();
        in_dir(dir.path(), || {
            fs::write("x.txt", b"v1").unwrap();

            let mut poller = poller_for(&["x.txt"], "out");
            let report = poller.scan();

            assert_eq!(report.entries_checked, 1);
            assert!(report.copied.is_empty());
            assert!(!Path::new("out/x.txt").exists());
        });
    }

    #[test]
    fn change_after_baseline_copies_once() {
        let dir = TempDir::new().unwrap();
        in_dir(dir.path(), || {
            fs::write("x.txt", b"v1").unwrap();
            set_mtime("x.txt", 1_600_000_000);

            let mut poller = poller_for(&["x.txt"], "out");
            poller.scan();

            fs::write("x.txt", b"v2").unwrap();
            set_mtime("x.txt", 1_600_000_100);

            let report = poller.scan();
            assert_eq!(report.copied, vec![PathBuf::from("x.txt")]);
            assert_eq!(fs::read("out/x.txt").unwrap(), b"v2");

            // Nothing changed since, so repeated scans stay quiet.
            let report = poller.scan();
            assert!(report.copied.is_empty());
            assert_eq!(report.copy_failures, 0);
        });
    }

    #[test]
    fn nested_source_mirrors_structure() {
        let dir = TempDir::new().unwrap();
        in_dir(dir.path(), || {
            fs::create_dir_all("src").unwrap();
            fs::write("src/x.txt", b"v1").unwrap();
            set_mtime("src/x.txt", 1_600_000_000);

            let mut poller = poller_for(&["src/x.txt"], "out");
            poller.scan();

            fs::write("src/x.txt", b"v2").unwrap();
            set_mtime("src/x.txt", 1_600_000_100);
            poller.scan();

            assert_eq!(fs::read("out/src/x.txt").unwrap(), b"v2");
        });
    }

    #[test]
    fn unreadable_entry_is_skipped_not_dropped() {
        let dir = TempDir::new().unwrap();
        in_dir(dir.path(), || {
            fs::write("present.txt", b"v1").unwrap();

            let mut poller = poller_for(&["gone.txt", "present.txt"], "out");
            let report = poller.scan();

            assert_eq!(report.unreadable, 1);
            assert_eq!(report.entries_checked, 1);

            // The missing file reappears with a fresh mtime: it gets a
            // baseline first, then copies on the next real change.
            fs::write("gone.txt", b"back").unwrap();
            set_mtime("gone.txt", 1_600_000_000);
            let report = poller.scan();
            assert_eq!(report.unreadable, 0);
            assert!(report.copied.is_empty());

            fs::write("gone.txt", b"back again").unwrap();
            set_mtime("gone.txt", 1_600_000_100);
            let report = poller.scan();
            assert_eq!(report.copied, vec![PathBuf::from("gone.txt")]);
        });
    }

    #[test]
    fn deleting_after_baseline_then_restoring_copies() {
        let dir = TempDir::new().unwrap();
        in_dir(dir.path(), || {
            fs::write("x.txt", b"v1").unwrap();
            set_mtime("x.txt", 1_600_000_000);

            let mut poller = poller_for(&["x.txt"], "out");
            poller.scan();

            fs::remove_file("x.txt").unwrap();
            let report = poller.scan();
            assert_eq!(report.unreadable, 1);

            fs::write("x.txt", b"v2").unwrap();
            set_mtime("x.txt", 1_600_000_200);
            let report = poller.scan();
            assert_eq!(report.copied, vec![PathBuf::from("x.txt")]);
            assert_eq!(fs::read("out/x.txt").unwrap(), b"v2");
        });
    }

    #[test]
    fn unusable_destination_disables_only_its_group() {
        let dir = TempDir::new().unwrap();
        in_dir(dir.path(), || {
            fs::write("a.txt", b"a").unwrap();
            set_mtime("a.txt", 1_600_000_000);
            fs::write("b.txt", b"b").unwrap();
            set_mtime("b.txt", 1_600_000_000);
            // "bad" already exists as a regular file.
            fs::write("bad", b"in the way").unwrap();

            let mut config = Config::default();
            config.add_watch_files(["a.txt"], Path::new("bad"));
            config.add_watch_files(["b.txt"], Path::new("good"));
            let mut poller = Poller::new(build_active_list(&config), DEFAULT_POLL_INTERVAL);

            poller.scan();
            fs::write("a.txt", b"a2").unwrap();
            set_mtime("a.txt", 1_600_000_100);
            fs::write("b.txt", b"b2").unwrap();
            set_mtime("b.txt", 1_600_000_100);

            let report = poller.scan();
            assert_eq!(report.copied, vec![PathBuf::from("b.txt")]);
            assert_eq!(fs::read("good/b.txt").unwrap(), b"b2");
            assert!(!Path::new("bad").is_dir());
        });
    }

    #[test]
    fn failed_copy_is_not_retried_until_next_change() {
        let dir = TempDir::new().unwrap();
        in_dir(dir.path(), || {
            fs::create_dir("sub").unwrap();
            fs::write("sub/x.txt", b"v1").unwrap();
            set_mtime("sub/x.txt", 1_600_000_000);

            let mut poller = poller_for(&["sub/x.txt"], "out");
            poller.scan();

            // Block the mirrored subdirectory so the copy fails. The
            // destination root itself already exists from the first
            // scan.
            fs::write("out/sub", b"in the way").unwrap();

            fs::write("sub/x.txt", b"v2").unwrap();
            set_mtime("sub/x.txt", 1_600_000_100);
            let report = poller.scan();
            assert_eq!(report.copy_failures, 1);

            // The cached mtime advanced anyway: no retry without a new
            // change.
            let report = poller.scan();
            assert_eq!(report.copy_failures, 0);
            assert!(report.copied.is_empty());

            // Unblock and touch the source again: the copy goes through.
            fs::remove_file("out/sub").unwrap();
            fs::write("sub/x.txt", b"v3").unwrap();
            set_mtime("sub/x.txt", 1_600_000_200);
            let report = poller.scan();
            assert_eq!(report.copied, vec![PathBuf::from("sub/x.txt")]);
            assert_eq!(fs::read("out/sub/x.txt").unwrap(), b"v3");
        });
    }

    #[test]
    fn empty_group_creates_no_destination() {
        let dir = TempDir::new().unwrap();
        in_dir(dir.path(), || {
            let mut config = Config::default();
            config.add_watch_files(["x.txt"], Path::new("out"));
            config.add_ignore_files(["x.txt"]);

            let mut poller = Poller::new(build_active_list(&config), DEFAULT_POLL_INTERVAL);
            let report = poller.scan();

            assert_eq!(report.entries_checked, 0);
            assert!(!Path::new("out").exists());
        });
    }

    #[tokio::test]
    async fn run_exits_when_shutdown_resolves() {
        let poller = Poller::new(ActiveWatchList::default(), Duration::from_millis(10));
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let handle = tokio::spawn(poller.run(async {
            let _ = rx.await;
        }));

        tokio::time::sleep(Duration::from_millis(30)).await;
        tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
