use std::fs;
use std::io::{Read, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lru::LruCache;
use walken_hash::hasher::Hasher;
use walken_hash::{HashAlgorithm, ObjectId};
use walken_object::Object;

use crate::discover::{discover_git_dir, is_git_dir};
use crate::refs::resolve_in_git_dir;
use crate::{ObjectStore, RefResolver, StoreError};

const CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1024) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Read access to the loose objects and refs of a `.git` directory.
///
/// Each object file is zlib-compressed `"<type> <size>\0<content>"`. Objects
/// that only exist inside packfiles are reported as not found. Parsed objects
/// are kept in an LRU cache so revisiting shared subtrees across sessions is
/// cheap.
pub struct LooseStore {
    git_dir: PathBuf,
    objects_dir: PathBuf,
    algo: HashAlgorithm,
    cache: Mutex<LruCache<ObjectId, Object>>,
}

impl LooseStore {
    /// Open the git directory at `git_dir`.
    pub fn open(git_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let git_dir = git_dir.into();
        if !is_git_dir(&git_dir) {
            return Err(StoreError::NotARepository(git_dir));
        }
        tracing::debug!(git_dir = %git_dir.display(), "opened loose object store");
        Ok(Self {
            objects_dir: git_dir.join("objects"),
            git_dir,
            algo: HashAlgorithm::Sha1,
            cache: Mutex::new(LruCache::new(CACHE_CAPACITY)),
        })
    }

    /// Find the repository containing `start` and open it.
    pub fn discover(start: &Path) -> Result<Self, StoreError> {
        Self::open(discover_git_dir(start)?)
    }

    /// Create an empty repository layout with `HEAD` on `refs/heads/main`.
    pub fn init(git_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let git_dir = git_dir.into();
        fs::create_dir_all(git_dir.join("objects"))?;
        fs::create_dir_all(git_dir.join("refs/heads"))?;
        fs::create_dir_all(git_dir.join("refs/tags"))?;
        if !git_dir.join("HEAD").exists() {
            fs::write(git_dir.join("HEAD"), "ref: refs/heads/main\n")?;
        }
        Self::open(git_dir)
    }

    /// Use `algo` for ids of written objects and ids embedded in parsed ones.
    pub fn with_algorithm(mut self, algo: HashAlgorithm) -> Self {
        self.algo = algo;
        self
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.object_path(oid).is_file()
    }

    /// Write `object` as a loose object if it is not stored yet.
    pub fn write(&self, object: &Object) -> Result<ObjectId, StoreError> {
        let raw = object.serialize();
        let mut hasher = Hasher::new(self.algo);
        hasher.update(&raw);
        let oid = hasher.finalize().map_err(|e| StoreError::Io(std::io::Error::other(e)))?;

        let path = self.object_path(&oid);
        if path.is_file() {
            return Ok(oid);
        }
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw)?;
        // Write to a temp name first so readers never see a partial file.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, encoder.finish()?)?;
        fs::rename(&tmp, &path)?;
        tracing::trace!(%oid, kind = %object.object_type(), "wrote loose object");
        Ok(oid)
    }

    /// Point the full ref `name` at `oid`.
    pub fn write_ref(&self, name: &str, oid: &ObjectId) -> Result<(), StoreError> {
        let path = self.git_dir.join(name);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, format!("{oid}\n"))?;
        Ok(())
    }

    /// Lock the cache, taking it back from a poisoned lock.
    fn cache(&self) -> MutexGuard<'_, LruCache<ObjectId, Object>> {
        self.cache.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("object cache lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn object_path(&self, oid: &ObjectId) -> PathBuf {
        self.objects_dir.join(oid.loose_path())
    }

    fn read_object(&self, oid: &ObjectId) -> Result<Object, StoreError> {
        let compressed = match fs::read(self.object_path(oid)) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(*oid))
            }
            Err(e) => return Err(e.into()),
        };

        let corrupt = |reason: String| StoreError::Corrupt { oid: *oid, reason };
        let mut raw = Vec::new();
        ZlibDecoder::new(&compressed[..])
            .read_to_end(&mut raw)
            .map_err(|e| corrupt(format!("zlib: {e}")))?;

        let mut hasher = Hasher::new(oid.algorithm());
        hasher.update(&raw);
        let actual = hasher.finalize().map_err(|e| corrupt(e.to_string()))?;
        if actual != *oid {
            return Err(corrupt(format!("content hashes to {actual}")));
        }

        Object::parse(&raw, self.algo).map_err(|e| corrupt(e.to_string()))
    }
}

impl ObjectStore for LooseStore {
    fn resolve(&self, oid: &ObjectId) -> Result<Object, StoreError> {
        if let Some(hit) = self.cache().get(oid).cloned() {
            return Ok(hit);
        }
        let object = self.read_object(oid)?;
        self.cache().put(*oid, object.clone());
        Ok(object)
    }
}

impl RefResolver for LooseStore {
    fn resolve_name(&self, name: &str) -> Result<Option<ObjectId>, StoreError> {
        resolve_in_git_dir(&self.git_dir, name)
    }
}
