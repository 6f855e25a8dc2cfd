//! Behavioral checks for any [`FileSystem`] implementation.
//!
//! Each check takes a fresh filesystem, drives it through the public trait
//! only and reports the first deviation it finds. The runners build one
//! filesystem per check so checks never see each other's files.
//!
//! ```rust
//! use memfs::InMemoryFs;
//! use memfs::conformance::{run_link_suite, run_tree_suite};
//!
//! # tokio_test::block_on(async {
//! let report = run_link_suite(InMemoryFs::new).await;
//! assert!(report.is_ok(), "{report}");
//!
//! let report = run_tree_suite(InMemoryFs::new).await;
//! assert!(report.is_ok(), "{report}");
//! # });
//! ```

use std::fmt;
use std::io::{self, Read};
use std::path::Path;

use thiserror::Error;

use crate::error::Error;
use crate::fs::FileSystem;

/// Why a check failed.
#[derive(Error, Debug)]
pub enum CheckError {
    /// A call that should have succeeded returned an error.
    #[error("{check}: unexpected error: {source}")]
    Fs {
        check: &'static str,
        #[source]
        source: Error,
    },

    /// Reading through a handle failed.
    #[error("{check}: read failed: {source}")]
    Io {
        check: &'static str,
        #[source]
        source: io::Error,
    },

    /// A call returned something other than what the contract requires.
    #[error("{check}: {message}")]
    Mismatch {
        check: &'static str,
        message: String,
    },
}

/// Outcome of one check.
pub type CheckResult = std::result::Result<(), CheckError>;

/// Attach the failing check's name to an error.
trait Context<T> {
    fn during(self, check: &'static str) -> std::result::Result<T, CheckError>;
}

impl<T> Context<T> for crate::error::Result<T> {
    fn during(self, check: &'static str) -> std::result::Result<T, CheckError> {
        self.map_err(|source| CheckError::Fs { check, source })
    }
}

impl<T> Context<T> for io::Result<T> {
    fn during(self, check: &'static str) -> std::result::Result<T, CheckError> {
        self.map_err(|source| CheckError::Io { check, source })
    }
}

fn mismatch(check: &'static str, message: impl Into<String>) -> CheckError {
    CheckError::Mismatch {
        check,
        message: message.into(),
    }
}

fn expect_eq<T: PartialEq + fmt::Debug>(
    check: &'static str,
    what: &str,
    actual: T,
    expected: T,
) -> CheckResult {
    if actual == expected {
        return Ok(());
    }
    Err(mismatch(
        check,
        format!("{what}: expected {expected:?}, got {actual:?}"),
    ))
}

fn expect_kind<T: fmt::Debug>(
    check: &'static str,
    what: &str,
    result: crate::error::Result<T>,
    kind: io::ErrorKind,
) -> CheckResult {
    match result {
        Err(err) if err.kind() == kind => Ok(()),
        Err(err) => Err(mismatch(
            check,
            format!("{what}: expected {kind:?}, got {:?} ({err})", err.kind()),
        )),
        Ok(value) => Err(mismatch(
            check,
            format!("{what}: expected {kind:?}, got Ok({value:?})"),
        )),
    }
}

async fn write<F: FileSystem + ?Sized>(
    fs: &F,
    check: &'static str,
    path: &str,
    content: &[u8],
) -> CheckResult {
    fs.write_file(Path::new(path), content, 0o644)
        .await
        .during(check)
}

/// Open `path` for reading and read it to the end.
async fn read_through_handle<F: FileSystem + ?Sized>(
    fs: &F,
    check: &'static str,
    path: &str,
) -> std::result::Result<(String, Vec<u8>), CheckError> {
    let mut handle = fs.open(Path::new(path)).await.during(check)?;
    let mut content = Vec::new();
    handle.read_to_end(&mut content).during(check)?;
    Ok((handle.name().to_string(), content))
}

async fn expect_content<F: FileSystem + ?Sized>(
    fs: &F,
    check: &'static str,
    path: &str,
    expected: &[u8],
) -> CheckResult {
    let (_, content) = read_through_handle(fs, check, path).await?;
    expect_eq(
        check,
        &format!("content of {path}"),
        String::from_utf8_lossy(&content),
        String::from_utf8_lossy(expected),
    )
}

/// Results of a suite run, in execution order.
#[derive(Debug, Default)]
pub struct Report {
    results: Vec<(&'static str, CheckResult)>,
}

impl Report {
    fn record(&mut self, name: &'static str, result: CheckResult) {
        self.results.push((name, result));
    }

    /// True if every check passed.
    pub fn is_ok(&self) -> bool {
        self.results.iter().all(|(_, result)| result.is_ok())
    }

    /// Number of checks run.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Names of the checks that ran.
    pub fn names(&self) -> Vec<&'static str> {
        self.results.iter().map(|(name, _)| *name).collect()
    }

    pub fn failures(&self) -> Vec<&CheckError> {
        self.results
            .iter()
            .filter_map(|(_, result)| result.as_ref().err())
            .collect()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failures = self.failures();
        write!(
            f,
            "{} of {} checks passed",
            self.len() - failures.len(),
            self.len()
        )?;
        for failure in failures {
            write!(f, "\n  {failure}")?;
        }
        Ok(())
    }
}

/// Hard-link behavior.
pub mod link {
    use super::*;

    pub async fn link<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "link";
        write(fs, CHECK, "file", b"").await?;
        fs.link(Path::new("file"), Path::new("link"))
            .await
            .during(CHECK)
    }

    /// A link of a link reaches the file and reports its own name.
    pub async fn link_nested<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "link_nested";
        write(fs, CHECK, "file", b"hello world!").await?;
        fs.link(Path::new("file"), Path::new("linkA"))
            .await
            .during(CHECK)?;
        fs.link(Path::new("linkA"), Path::new("linkB"))
            .await
            .during(CHECK)?;

        let meta = fs.stat(Path::new("linkB")).await.during(CHECK)?;
        expect_eq(CHECK, "name", meta.name.as_str(), "linkB")?;
        expect_eq(CHECK, "size", meta.size, 12)
    }

    pub async fn link_with_nonexistent_target<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "link_with_nonexistent_target";
        let result = fs.link(Path::new("file"), Path::new("link")).await;
        expect_kind(CHECK, "link to missing file", result, io::ErrorKind::NotFound)
    }

    pub async fn link_with_existing_link<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "link_with_existing_link";
        write(fs, CHECK, "file", b"foo").await?;
        write(fs, CHECK, "link", b"").await?;
        let result = fs.link(Path::new("file"), Path::new("link")).await;
        expect_kind(CHECK, "link onto existing path", result, io::ErrorKind::AlreadyExists)?;
        expect_content(fs, CHECK, "link", b"").await
    }

    pub async fn open_with_link_to_absolute_path<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "open_with_link_to_absolute_path";
        write(fs, CHECK, "dir/file", b"foo").await?;
        fs.link(Path::new("/dir/file"), Path::new("dir/link"))
            .await
            .during(CHECK)?;
        expect_content(fs, CHECK, "dir/link", b"foo").await
    }

    /// The link is listed in its directory under its own name.
    pub async fn link_properly_named<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "link_properly_named";
        write(fs, CHECK, "dir/file", b"").await?;
        fs.link(Path::new("dir/file"), Path::new("link"))
            .await
            .during(CHECK)?;

        let handle = fs.open(Path::new("link")).await.during(CHECK)?;
        expect_eq(CHECK, "handle name", handle.name(), "link")?;

        let entries = fs.read_dir(Path::new("/")).await.during(CHECK)?;
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        expect_eq(CHECK, "entries of /", names, vec!["dir", "link"])
    }

    pub async fn rename_with_link<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "rename_with_link";
        write(fs, CHECK, "dir/file", b"foo").await?;
        fs.link(Path::new("dir/file"), Path::new("link"))
            .await
            .during(CHECK)?;
        fs.rename(Path::new("link"), Path::new("newlink"))
            .await
            .during(CHECK)?;

        let (name, content) = read_through_handle(fs, CHECK, "newlink").await?;
        expect_eq(CHECK, "content", content.as_slice(), &b"foo"[..])?;
        expect_eq(CHECK, "handle name", name.as_str(), "newlink")
    }

    /// Moving the original path leaves the link readable.
    pub async fn rename_target_with_link<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "rename_target_with_link";
        write(fs, CHECK, "dir/file", b"foo").await?;
        fs.link(Path::new("dir/file"), Path::new("link"))
            .await
            .during(CHECK)?;
        fs.rename(Path::new("dir/file"), Path::new("dif/newfile"))
            .await
            .during(CHECK)?;

        expect_content(fs, CHECK, "link", b"foo").await?;
        let meta = fs.stat(Path::new("link")).await.during(CHECK)?;
        expect_eq(CHECK, "name", meta.name.as_str(), "link")
    }

    pub async fn remove_link_target<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "remove_link_target";
        write(fs, CHECK, "file", b"foo").await?;
        fs.link(Path::new("file"), Path::new("link"))
            .await
            .during(CHECK)?;
        fs.remove(Path::new("file")).await.during(CHECK)?;
        expect_content(fs, CHECK, "link", b"foo").await
    }

    pub async fn remove_link<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "remove_link";
        write(fs, CHECK, "file", b"foo").await?;
        fs.link(Path::new("file"), Path::new("link"))
            .await
            .during(CHECK)?;
        fs.remove(Path::new("link")).await.during(CHECK)?;

        let opened = fs.open(Path::new("link")).await.map(|h| h.name().to_string());
        expect_kind(CHECK, "open removed link", opened, io::ErrorKind::NotFound)?;
        expect_content(fs, CHECK, "file", b"foo").await
    }

    pub async fn write_to_link<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "write_to_link";
        write(fs, CHECK, "dir/file", b"foo").await?;
        fs.link(Path::new("dir/file"), Path::new("link"))
            .await
            .during(CHECK)?;
        write(fs, CHECK, "link", b"bar").await?;
        expect_content(fs, CHECK, "dir/file", b"bar").await
    }

    pub async fn write_to_target<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "write_to_target";
        write(fs, CHECK, "dir/file", b"foo").await?;
        fs.link(Path::new("dir/file"), Path::new("link"))
            .await
            .during(CHECK)?;
        write(fs, CHECK, "dir/file", b"bar").await?;
        expect_content(fs, CHECK, "link", b"bar").await
    }

    pub async fn link_to_directory_fails<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "link_to_directory_fails";
        fs.mkdir_all(Path::new("dir"), 0o755).await.during(CHECK)?;
        let result = fs.link(Path::new("dir"), Path::new("alias")).await;
        expect_kind(CHECK, "link to directory", result, io::ErrorKind::IsADirectory)?;
        let exists = fs.exists(Path::new("alias")).await.during(CHECK)?;
        expect_eq(CHECK, "alias exists", exists, false)
    }
}

/// Directory tree behavior: creation, subtree rename and removal.
pub mod tree {
    use super::*;

    async fn names<F: FileSystem + ?Sized>(
        fs: &F,
        check: &'static str,
        dir: &str,
    ) -> std::result::Result<Vec<String>, CheckError> {
        let entries = fs.read_dir(Path::new(dir)).await.during(check)?;
        Ok(entries.into_iter().map(|e| e.name).collect())
    }

    /// Creating an existing directory again changes nothing.
    pub async fn mkdir_all_idempotent<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "mkdir_all_idempotent";
        fs.mkdir_all(Path::new("a/b"), 0o755).await.during(CHECK)?;
        fs.mkdir_all(Path::new("a/b"), 0o755).await.during(CHECK)?;
        write(fs, CHECK, "a/b/c", b"").await?;
        fs.mkdir_all(Path::new("/a"), 0o755).await.during(CHECK)?;

        expect_eq(CHECK, "entries of /", names(fs, CHECK, "/").await?, vec!["a".to_string()])?;
        expect_eq(CHECK, "entries of /a", names(fs, CHECK, "a").await?, vec!["b".to_string()])
    }

    pub async fn rename_subtree<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "rename_subtree";
        write(fs, CHECK, "dir/x", b"x").await?;
        write(fs, CHECK, "dir/sub/y", b"y").await?;
        fs.rename(Path::new("dir"), Path::new("dir2"))
            .await
            .during(CHECK)?;

        expect_content(fs, CHECK, "dir2/x", b"x").await?;
        expect_content(fs, CHECK, "dir2/sub/y", b"y").await?;
        let exists = fs.exists(Path::new("dir")).await.during(CHECK)?;
        expect_eq(CHECK, "old directory exists", exists, false)?;
        expect_eq(
            CHECK,
            "entries of /dir2",
            names(fs, CHECK, "dir2").await?,
            vec!["sub".to_string(), "x".to_string()],
        )
    }

    /// `dir2x` shares a textual prefix with `dir` but is not below it.
    pub async fn rename_skips_prefix_sibling<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "rename_skips_prefix_sibling";
        write(fs, CHECK, "dir/x", b"1").await?;
        write(fs, CHECK, "dir2x/x", b"2").await?;
        fs.rename(Path::new("dir"), Path::new("moved"))
            .await
            .during(CHECK)?;

        expect_content(fs, CHECK, "moved/x", b"1").await?;
        expect_content(fs, CHECK, "dir2x/x", b"2").await
    }

    /// A link from outside a moved subtree keeps reaching the moved file.
    pub async fn link_survives_subtree_rename<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "link_survives_subtree_rename";
        write(fs, CHECK, "dir/file", b"foo").await?;
        fs.link(Path::new("dir/file"), Path::new("link"))
            .await
            .during(CHECK)?;
        fs.rename(Path::new("dir"), Path::new("dir2"))
            .await
            .during(CHECK)?;

        expect_content(fs, CHECK, "link", b"foo").await?;
        write(fs, CHECK, "dir2/file", b"bar").await?;
        expect_content(fs, CHECK, "link", b"bar").await
    }

    pub async fn remove_non_empty_dir_fails<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "remove_non_empty_dir_fails";
        write(fs, CHECK, "dir/file", b"keep").await?;

        let result = fs.remove(Path::new("dir")).await;
        expect_kind(CHECK, "remove dir", result, io::ErrorKind::DirectoryNotEmpty)?;
        expect_content(fs, CHECK, "dir/file", b"keep").await?;

        fs.remove(Path::new("dir/file")).await.during(CHECK)?;
        fs.remove(Path::new("dir")).await.during(CHECK)?;
        let exists = fs.exists(Path::new("dir")).await.during(CHECK)?;
        expect_eq(CHECK, "dir exists", exists, false)
    }

    pub async fn remove_missing_fails<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "remove_missing_fails";
        let result = fs.remove(Path::new("nothing/here")).await;
        expect_kind(CHECK, "remove missing", result, io::ErrorKind::NotFound)
    }

    pub async fn rename_missing_fails<F: FileSystem + ?Sized>(fs: &F) -> CheckResult {
        const CHECK: &str = "rename_missing_fails";
        let result = fs.rename(Path::new("nothing"), Path::new("else")).await;
        expect_kind(CHECK, "rename missing", result, io::ErrorKind::NotFound)
    }
}

/// Run every [`link`] check, each against a fresh filesystem.
pub async fn run_link_suite<F, M>(mut make_fs: M) -> Report
where
    F: FileSystem,
    M: FnMut() -> F,
{
    let mut report = Report::default();
    report.record("link", link::link(&make_fs()).await);
    report.record("link_nested", link::link_nested(&make_fs()).await);
    report.record(
        "link_with_nonexistent_target",
        link::link_with_nonexistent_target(&make_fs()).await,
    );
    report.record(
        "link_with_existing_link",
        link::link_with_existing_link(&make_fs()).await,
    );
    report.record(
        "open_with_link_to_absolute_path",
        link::open_with_link_to_absolute_path(&make_fs()).await,
    );
    report.record(
        "link_properly_named",
        link::link_properly_named(&make_fs()).await,
    );
    report.record("rename_with_link", link::rename_with_link(&make_fs()).await);
    report.record(
        "rename_target_with_link",
        link::rename_target_with_link(&make_fs()).await,
    );
    report.record(
        "remove_link_target",
        link::remove_link_target(&make_fs()).await,
    );
    report.record("remove_link", link::remove_link(&make_fs()).await);
    report.record("write_to_link", link::write_to_link(&make_fs()).await);
    report.record("write_to_target", link::write_to_target(&make_fs()).await);
    report.record(
        "link_to_directory_fails",
        link::link_to_directory_fails(&make_fs()).await,
    );
    report
}

/// Run every [`tree`] check, each against a fresh filesystem.
pub async fn run_tree_suite<F, M>(mut make_fs: M) -> Report
where
    F: FileSystem,
    M: FnMut() -> F,
{
    let mut report = Report::default();
    report.record(
        "mkdir_all_idempotent",
        tree::mkdir_all_idempotent(&make_fs()).await,
    );
    report.record("rename_subtree", tree::rename_subtree(&make_fs()).await);
    report.record(
        "rename_skips_prefix_sibling",
        tree::rename_skips_prefix_sibling(&make_fs()).await,
    );
    report.record(
        "link_survives_subtree_rename",
        tree::link_survives_subtree_rename(&make_fs()).await,
    );
    report.record(
        "remove_non_empty_dir_fails",
        tree::remove_non_empty_dir_fails(&make_fs()).await,
    );
    report.record(
        "remove_missing_fails",
        tree::remove_missing_fails(&make_fs()).await,
    );
    report.record(
        "rename_missing_fails",
        tree::rename_missing_fails(&make_fs()).await,
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_report_display_lists_failures() {
        let mut report = Report::default();
        report.record("ok", Ok(()));
        report.record(
            "bad",
            Err(CheckError::Fs {
                check: "bad",
                source: Error::NotFound(PathBuf::from("/x")),
            }),
        );

        assert!(!report.is_ok());
        assert_eq!(report.len(), 2);
        assert_eq!(report.names(), vec!["ok", "bad"]);
        assert_eq!(
            report.to_string(),
            "1 of 2 checks passed\n  bad: unexpected error: not found: /x"
        );
    }

    #[test]
    fn test_expect_kind_rejects_success() {
        let err = expect_kind("c", "op", Ok(()), io::ErrorKind::NotFound).unwrap_err();
        assert_eq!(err.to_string(), "c: op: expected NotFound, got Ok(())");
    }
}
