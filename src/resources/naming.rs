//! Replica identity suffixes.
//!
//! Every created replica draws one fresh suffix shared by its pod and all of
//! its claims. Suffixes are never reused, so rapid delete/create cycles can
//! never collide on identity. The source is injectable so tests can supply a
//! deterministic sequence.

use rand::Rng;

/// Suffix length in hex characters
pub const SUFFIX_LEN: usize = 8;

/// Source of replica identity suffixes
pub trait SuffixSource: Send + Sync {
    /// Produce one fresh suffix
    fn next(&self) -> String;
}

/// Random lowercase hex suffixes
pub struct RandomSuffixes;

impl SuffixSource for RandomSuffixes {
    fn next(&self) -> String {
        const CHARSET: &[u8] = b"0123456789abcdef";
        let mut rng = rand::rng();
        (0..SUFFIX_LEN)
            .filter_map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET.get(idx).map(|&c| c as char)
            })
            .collect()
    }
}
