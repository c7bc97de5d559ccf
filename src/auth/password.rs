use bcrypt::{hash, verify};

pub fn hash_password(password: &str, cost: u32) -> Result<String, anyhow::Error> {
    let hashed =
        hash(password, cost).map_err(|e| anyhow::anyhow!("Password hashing error: {:?}", e))?;
    Ok(hashed)
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    verify(password, hash).unwrap_or(false)
}
