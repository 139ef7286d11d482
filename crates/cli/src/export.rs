use anyhow::{Context, Result};
use serde::Serialize;
use sift_index::SynchronizedIndex;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the index as `{ word: { document: [positions] } }` under shared
/// access.
pub fn write_index(path: &Path, index: &SynchronizedIndex) -> Result<()> {
    let bytes = index
        .read_with(serde_json::to_vec_pretty)
        .context("serialize index")?;
    write_atomic(path, &bytes)
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serialize JSON")?;
    write_atomic(path, &bytes)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }

    let tmp = tmp_path(path);
    fs::write(&tmp, bytes).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("rename into {}", path.display()))?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sift_index::{text, InvertedIndex};
    use tempfile::TempDir;

    #[test]
    fn index_export_is_ordered_pretty_json() {
        let mut local = InvertedIndex::new();
        local.add_all(&text::split("b a b"), "z.txt", 1);
        local.add("a", "m.txt", 4);
        let index = SynchronizedIndex::from(local);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/index.json");
        write_index(&path, &index).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "{\n  \"a\": {\n    \"m.txt\": [\n      4\n    ],\n    \"z.txt\": [\n      2\n    ]\n  },\n  \"b\": {\n    \"z.txt\": [\n      1,\n      3\n    ]\n  }\n}"
        );
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("dir/results.json")),
            PathBuf::from("dir/results.json.tmp")
        );
    }
}
