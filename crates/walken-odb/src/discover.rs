use std::fs;
use std::path::{Path, PathBuf};

use crate::StoreError;

/// Find the git directory for `start` by walking up its ancestors.
///
/// At each level a `.git` directory wins, then a `.git` file holding
/// `gitdir: <path>`, then the directory itself if it looks like a bare
/// repository (has `HEAD` and `objects/`).
pub fn discover_git_dir(start: &Path) -> Result<PathBuf, StoreError> {
    let start = fs::canonicalize(start).map_err(|_| StoreError::NotARepository(start.to_path_buf()))?;
    let mut current = start.as_path();

    loop {
        let dot_git = current.join(".git");
        if dot_git.is_dir() {
            return Ok(dot_git);
        }
        if dot_git.is_file() {
            let content = fs::read_to_string(&dot_git)?;
            if let Some(target) = content.trim().strip_prefix("gitdir:") {
                let target = Path::new(target.trim());
                return Ok(if target.is_absolute() {
                    target.to_path_buf()
                } else {
                    current.join(target)
                });
            }
        }
        if is_git_dir(current) {
            return Ok(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return Err(StoreError::NotARepository(start)),
        }
    }
}

pub(crate) fn is_git_dir(path: &Path) -> bool {
    path.join("HEAD").is_file() && path.join("objects").is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_dot_git_from_a_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let git = dir.path().join(".git");
        fs::create_dir_all(git.join("objects")).unwrap();
        fs::write(git.join("HEAD"), "ref: refs/heads/main\n").unwrap();
        let nested = dir.path().join("src/deep");
        fs::create_dir_all(&nested).unwrap();

        let found = discover_git_dir(&nested).unwrap();
        assert_eq!(found, fs::canonicalize(&git).unwrap());
    }

    #[test]
    fn follows_gitdir_files() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.git");
        fs::create_dir_all(real.join("objects")).unwrap();
        fs::write(real.join("HEAD"), "ref: refs/heads/main\n").unwrap();
        let work = dir.path().join("work");
        fs::create_dir_all(&work).unwrap();
        fs::write(work.join(".git"), format!("gitdir: {}\n", real.display())).unwrap();

        assert_eq!(discover_git_dir(&work).unwrap(), real);
    }

    #[test]
    fn accepts_bare_repositories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("objects")).unwrap();
        fs::write(dir.path().join("HEAD"), "ref: refs/heads/main\n").unwrap();
        assert_eq!(
            discover_git_dir(dir.path()).unwrap(),
            fs::canonicalize(dir.path()).unwrap()
        );
    }
}
