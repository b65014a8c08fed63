use std::{
    fs::{self, OpenOptions},
    io::Write as _,
    path::{Path, PathBuf},
};

pub mod error {
    use std::{io, path::PathBuf};

    pub type Result<T> = std::result::Result<T, self::Error>;

    type Msg = &'static str;

    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        #[error("{0} ({1}): {2}")]
        SingleIO(Msg, PathBuf, #[source] io::Error),

        #[error("File already exists: '{0}'")]
        AlreadyExists(PathBuf),

        #[error("Not a regular file: '{0}'")]
        NotAFile(PathBuf),
    }
}
pub use error::{Error, Result};

#[must_use]
pub fn mkdir_all(path: impl AsRef<Path>) -> Result<()> {
    let dir = path.as_ref();
    fs::create_dir_all(dir).map_err(|e| Error::SingleIO("Cannot create dir", dir.to_owned(), e))
}

#[must_use]
pub fn write<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    fs::write(&filepath, contents)
        .map_err(|e| Error::SingleIO("Cannot write file", filepath.as_ref().to_owned(), e))
}

#[must_use]
pub fn write_with_mkdir<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    if let Some(dir) = filepath.as_ref().parent() {
        if !dir.as_os_str().is_empty() {
            self::mkdir_all(dir)?;
        }
    }
    self::write(filepath, contents)
}

/// Write `contents` to a new file. Fails if `filepath` already exists.
#[must_use]
pub fn write_new<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    let filepath = filepath.as_ref();
    let mut f = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(filepath)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => Error::AlreadyExists(filepath.to_owned()),
            _ => Error::SingleIO("Cannot create file", filepath.to_owned(), e),
        })?;
    f.write_all(contents.as_ref())
        .map_err(|e| Error::SingleIO("Cannot write file", filepath.to_owned(), e))
}

#[must_use]
pub fn read_to_string(filepath: impl AsRef<Path>) -> Result<String> {
    fs::read_to_string(&filepath)
        .map_err(|e| Error::SingleIO("Cannot read file", filepath.as_ref().to_owned(), e))
}

/// Ok if `filepath` exists and is a regular file (symlinks are followed).
#[must_use]
pub fn ensure_file(filepath: impl AsRef<Path>) -> Result<()> {
    let filepath = filepath.as_ref();
    let meta = fs::metadata(filepath)
        .map_err(|e| Error::SingleIO("Cannot access file", filepath.to_owned(), e))?;
    if meta.is_file() {
        Ok(())
    } else {
        Err(Error::NotAFile(filepath.to_owned()))
    }
}

/// Resolve `path` against `base_dir` unless it is already absolute.
/// ```
/// use fsutil::resolve_path;
/// use std::path::Path;
///
/// assert_eq!(resolve_path("/proj", "unit_tests.md"), Path::new("/proj/unit_tests.md"));
/// assert_eq!(resolve_path("/proj", "./rr"), Path::new("/proj/rr"));
/// assert_eq!(resolve_path("/proj", "/usr/bin/rr"), Path::new("/usr/bin/rr"));
/// assert_eq!(resolve_path("", "rr"), Path::new("rr"));
/// ```
pub fn resolve_path(base_dir: impl AsRef<Path>, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        return path.to_owned();
    }
    self::normalize_path(base_dir.as_ref().join(path))
}

/// Normalize the path
/// ```
/// use fsutil::normalize_path;
/// use std::path::Path;
///
/// assert_eq!(normalize_path("./hoge/.config/././foo"), Path::new("hoge/.config/foo"));
/// assert_eq!(normalize_path("hoge/.config/../../bar/."), Path::new("bar"));
/// assert_eq!(normalize_path("../foo/../hello"), Path::new("../hello"));
/// assert_eq!(normalize_path("/"), Path::new("/"));
/// assert_eq!(normalize_path("./foo/"), Path::new("foo"));
/// assert_eq!(normalize_path("."), Path::new("."));
/// ```
pub fn normalize_path(path: impl AsRef<Path>) -> PathBuf {
    use ::std::path::Component;
    let components = path.as_ref().components();
    let mut stack: Vec<Component> = Vec::with_capacity(components.size_hint().1.unwrap_or(4));
    for c in components {
        match c {
            Component::CurDir => (),
            Component::ParentDir
                if matches!(stack.last(), Some(Component::Normal(_))) =>
            {
                stack.pop();
            }
            _ => {
                stack.push(c);
            }
        }
    }
    if stack.is_empty() {
        stack.push(Component::CurDir);
    }
    stack.iter().collect()
}
