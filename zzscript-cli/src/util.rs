use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Error, Result};

/// Expands the given paths into a list of script files.
///
/// Files are taken as they are, directories are scanned (non-recursively)
/// for files with the script extension.
pub(crate) fn collect_script_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut script_paths = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in fs::read_dir(path)? {
                let entry_path = entry?.path();
                if entry_path.is_file() && has_script_extension(&entry_path) {
                    found.push(entry_path);
                }
            }
            found.sort();
            script_paths.extend(found);
        } else if path.is_file() {
            script_paths.push(path.clone());
        } else {
            return Err(Error::msg(format!("path not found: {}", path.display())));
        }
    }
    if script_paths.is_empty() {
        return Err(Error::msg("no scripts found"));
    }
    Ok(script_paths)
}

fn has_script_extension(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext == zzscript::SCRIPT_FILE_EXTENSION)
}

/// Resolves a path given on the command line against the working directory.
pub(crate) fn resolve_path(path: &str) -> Result<PathBuf> {
    let p = PathBuf::from(path);
    if p.is_relative() {
        Ok(std::env::current_dir()?.join(p))
    } else {
        Ok(p)
    }
}

pub(crate) fn format_elements_list(paths: &[PathBuf]) -> String {
    let mut list = String::new();
    for path in paths {
        list = format!(
            "{}\n   {}",
            list,
            path.file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default()
        );
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directories_expand_to_scripts() {
        let dir = std::env::temp_dir().join("zzscript_cli_collect_test");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("b.zzs"), "Idle\n").unwrap();
        fs::write(dir.join("a.zzs"), "Idle\n").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();

        let paths = collect_script_paths(&[dir.clone()]).unwrap();
        assert_eq!(paths, vec![dir.join("a.zzs"), dir.join("b.zzs")]);
        assert_eq!(format_elements_list(&paths), "\n   a\n   b");

        assert!(collect_script_paths(&[dir.join("missing.zzs")]).is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
