use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::{CommonError, CommonResult};

/// Derive a stable seed from a document name using CRC32
pub fn get_document_seed(name: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(name.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential id generator for nodes created inside one document.
///
/// Lives inside editor state so that paste, duplicate and draw produce the same ids
/// when replayed from the same starting point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(document_name: &str) -> Self {
        Self {
            seed: get_document_seed(document_name),
            count: 0,
        }
    }

    pub fn from_seed(seed: impl Into<String>) -> CommonResult<Self> {
        let seed = seed.into();
        if seed.is_empty() || seed.contains(char::is_whitespace) {
            return Err(CommonError::InvalidId(seed));
        }
        Ok(Self { seed, count: 0 })
    }

    /// Generate next sequential id
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Number of ids handed out so far
    pub fn count(&self) -> u32 {
        self.count
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new("untitled")
    }
}
