use sha2::{Digest, Sha256};

/// Compute the SHA-256 seal of a block's fields.
///
/// The preimage is the plain textual concatenation of
/// `index`, `previous_seal`, `timestamp`, `payload` and `nonce`, in that
/// order and without separators. The digest is returned as lowercase hex.
pub fn seal(index: u64, previous_seal: &str, timestamp: i64, payload: &str, nonce: u64) -> String {
    let preimage = format!("{index}{previous_seal}{timestamp}{payload}{nonce}");
    let mut hasher = Sha256::new();
    hasher.update(preimage.as_bytes());
    hex::encode(hasher.finalize())
}

/// True when the first `difficulty` characters of `seal` are all `'0'`.
///
/// A difficulty of 0 is satisfied by every seal. A seal shorter than the
/// difficulty never is.
pub fn meets_difficulty(seal: &str, difficulty: u32) -> bool {
    let difficulty = difficulty as usize;
    seal.len() >= difficulty && seal.bytes().take(difficulty).all(|c| c == b'0')
}
