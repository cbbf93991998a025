use crate::{HashAlgorithm, HashError, ObjectId};

enum Inner {
    Sha1(Box<sha1_checked::Sha1>),
    Sha256(sha2::Sha256),
}

/// Incremental digest over SHA-1 (with collision detection) or SHA-256.
pub struct Hasher {
    inner: Inner,
}

impl Hasher {
    pub fn new(algo: HashAlgorithm) -> Self {
        use digest::Digest;
        let inner = match algo {
            HashAlgorithm::Sha1 => Inner::Sha1(Box::new(sha1_checked::Sha1::new())),
            HashAlgorithm::Sha256 => Inner::Sha256(sha2::Sha256::new()),
        };
        Self { inner }
    }

    pub fn update(&mut self, data: &[u8]) {
        use digest::Digest;
        match &mut self.inner {
            Inner::Sha1(h) => h.update(data),
            Inner::Sha256(h) => h.update(data),
        }
    }

    /// Finish the digest. Fails only when SHA-1 collision detection fires.
    pub fn finalize(self) -> Result<ObjectId, HashError> {
        match self.inner {
            Inner::Sha1(h) => {
                let result = h.try_finalize();
                if result.has_collision() {
                    return Err(HashError::Sha1Collision);
                }
                ObjectId::from_bytes(result.hash().as_slice(), HashAlgorithm::Sha1)
            }
            Inner::Sha256(h) => {
                use digest::Digest;
                ObjectId::from_bytes(h.finalize().as_slice(), HashAlgorithm::Sha256)
            }
        }
    }

    /// Id of an object with the given type name and content:
    /// the digest of `"<type> <len>\0<content>"`.
    pub fn hash_object(
        algo: HashAlgorithm,
        type_name: &str,
        content: &[u8],
    ) -> Result<ObjectId, HashError> {
        let mut h = Self::new(algo);
        h.update(format!("{} {}\0", type_name, content.len()).as_bytes());
        h.update(content);
        h.finalize()
    }
}
