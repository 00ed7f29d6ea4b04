//! Zip extraction and packaging.
//!
//! Everything here is blocking; callers run it on the blocking pool.

use std::{
  fs::{self, File},
  io::{self, Read as _},
  path::{Path, PathBuf},
};

use serde::Serialize;
use sha2::{Digest as _, Sha256};
use zip::{ZipArchive, ZipWriter, write::SimpleFileOptions};

use crate::{Error, Result};

/// Entries never copied into a packaged archive.
const SKIPPED: &[&str] = &[".git"];

/// A zip written to the downloads directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedArchive {
  pub path:     PathBuf,
  pub filename: String,
  /// Hex SHA-256 of the archive bytes.
  pub sha256:   String,
}

/// Unpack `archive` into `dest`, which must not exist yet.
pub(crate) fn extract(archive: &Path, dest: &Path) -> Result<()> {
  let file = File::open(archive).map_err(Error::fs("open archive", archive))?;
  let mut zip = ZipArchive::new(file)?;
  fs::create_dir(dest).map_err(Error::fs("create extraction dir", dest))?;
  zip.extract(dest)?;
  Ok(())
}

/// The single top-level directory of an extracted archive.
pub(crate) fn single_root(dir: &Path) -> Result<PathBuf> {
  let mut entries = Vec::new();
  for entry in fs::read_dir(dir).map_err(Error::fs("read extraction dir", dir))? {
    entries.push(entry.map_err(Error::fs("read extraction dir", dir))?.path());
  }
  match entries.as_slice() {
    [only] if only.is_dir() => Ok(only.clone()),
    [] => Err(Error::Archive("archive is empty".into())),
    _ => Err(Error::Archive(format!(
      "expected exactly one top-level directory, found {} entries",
      entries.len()
    ))),
  }
}

/// Zip the contents of `src` into `dest`, with every entry under `prefix/`.
pub(crate) fn pack_dir(src: &Path, prefix: &str, dest: &Path) -> Result<()> {
  let file = File::create(dest).map_err(Error::fs("create archive", dest))?;
  let mut zip = ZipWriter::new(file);
  let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

  zip.add_directory(format!("{prefix}/"), options)?;
  add_dir(&mut zip, src, prefix, options)?;
  zip.finish()?;
  Ok(())
}

fn add_dir(
  zip: &mut ZipWriter<File>,
  dir: &Path,
  prefix: &str,
  options: SimpleFileOptions,
) -> Result<()> {
  let mut entries = Vec::new();
  for entry in fs::read_dir(dir).map_err(Error::fs("read dir", dir))? {
    entries.push(entry.map_err(Error::fs("read dir", dir))?);
  }
  entries.sort_by_key(|e| e.file_name());

  for entry in entries {
    let name = entry.file_name();
    let name = name.to_string_lossy();
    if SKIPPED.contains(&name.as_ref()) {
      continue;
    }
    let path = entry.path();
    let zip_path = format!("{prefix}/{name}");
    let file_type = entry.file_type().map_err(Error::fs("stat", &path))?;

    if file_type.is_dir() {
      zip.add_directory(format!("{zip_path}/"), options)?;
      add_dir(zip, &path, &zip_path, options)?;
    } else if file_type.is_file() {
      zip.start_file(zip_path, options)?;
      let mut f = File::open(&path).map_err(Error::fs("open", &path))?;
      io::copy(&mut f, zip).map_err(Error::fs("copy into archive", &path))?;
    }
  }
  Ok(())
}

pub(crate) fn sha256_file(path: &Path) -> Result<String> {
  let mut file = File::open(path).map_err(Error::fs("open", path))?;
  let mut hasher = Sha256::new();
  let mut buf = [0u8; 64 * 1024];
  loop {
    let n = file.read(&mut buf).map_err(Error::fs("read", path))?;
    if n == 0 {
      break;
    }
    hasher.update(&buf[..n]);
  }
  Ok(hex::encode(hasher.finalize()))
}

/// Reduce a version label to characters safe in a file name.
pub(crate) fn sanitize_version(version: &str) -> Result<String> {
  let cleaned: String = version
    .trim()
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '-' })
    .collect();
  let cleaned = cleaned.trim_matches(|c| c == '.' || c == '-').to_owned();
  if cleaned.is_empty() {
    return Err(Error::InvalidVersion(version.to_owned()));
  }
  Ok(cleaned)
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  fn names(path: &Path) -> Vec<String> {
    let zip = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = zip.file_names().map(str::to_owned).collect();
    names.sort();
    names
  }

  #[test]
  fn pack_skips_git_and_prefixes_entries() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(src.join(".git")).unwrap();
    fs::create_dir_all(src.join("inc")).unwrap();
    fs::write(src.join(".git/HEAD"), "ref").unwrap();
    fs::write(src.join("main.php"), "<?php").unwrap();
    fs::write(src.join("inc/a.php"), "<?php").unwrap();

    let out = dir.path().join("out.zip");
    pack_dir(&src, "plugin", &out).unwrap();

    assert_eq!(
      names(&out),
      vec!["plugin/", "plugin/inc/", "plugin/inc/a.php", "plugin/main.php"]
    );
  }

  #[test]
  fn single_root_rejects_flat_archives() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("loose.php"), "").unwrap();
    assert!(matches!(single_root(dir.path()), Err(Error::Archive(_))));

    let empty = tempfile::tempdir().unwrap();
    assert!(matches!(single_root(empty.path()), Err(Error::Archive(_))));
  }

  #[test]
  fn extract_rejects_non_zip() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("bogus.zip");
    File::create(&bogus).unwrap().write_all(b"not a zip").unwrap();
    let err = extract(&bogus, &dir.path().join("x")).unwrap_err();
    assert!(matches!(err, Error::Archive(_)));
  }

  #[test]
  fn sha256_is_hex_of_contents() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("f");
    fs::write(&p, "abc").unwrap();
    assert_eq!(
      sha256_file(&p).unwrap(),
      "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
  }

  #[test]
  fn versions_are_sanitised() {
    assert_eq!(sanitize_version("v1.2.0").unwrap(), "v1.2.0");
    assert_eq!(sanitize_version("main (latest)").unwrap(), "main--latest");
    assert_eq!(sanitize_version("../etc").unwrap(), "etc");
    assert!(matches!(sanitize_version(" / "), Err(Error::InvalidVersion(_))));
  }
}
