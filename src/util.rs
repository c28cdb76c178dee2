use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Shortens long addresses to `0x1234...abcd` for labels.
pub fn short_address(address: &str) -> String {
    const HEAD: usize = 6;
    const TAIL: usize = 4;

    let chars = address.chars().collect::<Vec<_>>();
    if chars.len() <= HEAD + TAIL + 3 {
        return address.to_owned();
    }

    let head = chars[..HEAD].iter().collect::<String>();
    let tail = chars[chars.len() - TAIL..].iter().collect::<String>();
    format!("{head}...{tail}")
}

pub fn stable_hash(id: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    hasher.finish()
}

/// Two values in `[-1, 1]` derived from `id`, stable for the lifetime of the process.
pub fn stable_pair(id: &str) -> (f32, f32) {
    let hash = stable_hash(id);

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}
