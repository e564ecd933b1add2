//! Password hashing seam
//!
//! The hashing scheme itself lives outside this layer; repositories only
//! need plaintext -> stored form.

/// Maps a plaintext password to its stored hash form.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> String;
}

/// Unsalted md5, matching the rows the production deployment already has.
pub struct Md5Hasher;

impl PasswordHasher for Md5Hasher {
    fn hash(&self, plaintext: &str) -> String {
        format!("{:x}", md5::compute(plaintext))
    }
}
