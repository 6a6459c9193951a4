// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Short unique identifiers for new variants

use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Length of a generated fid
pub const FID_LEN: usize = 5;

/// Lowercase letters and digits
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Source of fresh variant identifiers
pub trait FidGenerator {
    /// Produce an identifier not handed out before
    fn next_fid(&mut self) -> String;
}

impl<G: FidGenerator + ?Sized> FidGenerator for &mut G {
    fn next_fid(&mut self) -> String {
        (**self).next_fid()
    }
}

/// Digest-based generator that never repeats an id it issued or reserved
#[derive(Debug, Clone)]
pub struct HashFidGenerator {
    seed: String,
    counter: u64,
    taken: HashSet<String>,
}

impl HashFidGenerator {
    /// Generator with a fixed seed; the same seed yields the same sequence
    #[must_use]
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            counter: 0,
            taken: HashSet::new(),
        }
    }

    /// Generator seeded from the current time
    #[must_use]
    pub fn from_clock() -> Self {
        Self::new(Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true))
    }

    /// Reserve existing ids so they are never generated
    #[must_use]
    pub fn with_taken<I, S>(mut self, fids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.taken.extend(fids.into_iter().map(Into::into));
        self
    }

    /// Reserve one id
    pub fn reserve(&mut self, fid: impl Into<String>) {
        self.taken.insert(fid.into());
    }

    fn candidate(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.as_bytes());
        hasher.update(self.counter.to_le_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        let mut n = u64::from_le_bytes(bytes);

        let mut fid = String::with_capacity(FID_LEN);
        for _ in 0..FID_LEN {
            fid.push(char::from(ALPHABET[(n % 36) as usize]));
            n /= 36;
        }
        fid
    }
}

impl FidGenerator for HashFidGenerator {
    fn next_fid(&mut self) -> String {
        loop {
            self.counter += 1;
            let fid = self.candidate();
            if self.taken.insert(fid.clone()) {
                return fid;
            }
        }
    }
}

/// Predictable generator: `<prefix>1`, `<prefix>2`, ...
#[derive(Debug, Clone)]
pub struct SequenceFidGenerator {
    prefix: String,
    next: u64,
}

impl SequenceFidGenerator {
    /// Start a sequence
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), next: 1 }
    }
}

impl FidGenerator for SequenceFidGenerator {
    fn next_fid(&mut self) -> String {
        let fid = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        fid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fid_shape() {
        let mut fids = HashFidGenerator::new("seed");
        for _ in 0..50 {
            let fid = fids.next_fid();
            assert_eq!(fid.len(), FID_LEN);
            assert!(fid.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = HashFidGenerator::new("seed");
        let mut b = HashFidGenerator::new("seed");
        assert_eq!(a.next_fid(), b.next_fid());
        assert_eq!(a.next_fid(), b.next_fid());
    }

    #[test]
    fn test_no_repeats() {
        let mut fids = HashFidGenerator::new("seed");
        let issued: HashSet<_> = (0..2000).map(|_| fids.next_fid()).collect();
        assert_eq!(issued.len(), 2000);
    }

    #[test]
    fn test_reserved_ids_are_skipped() {
        let first = HashFidGenerator::new("seed").next_fid();

        let mut fids = HashFidGenerator::new("seed").with_taken([first.clone()]);
        assert_ne!(fids.next_fid(), first);
    }

    #[test]
    fn test_sequence() {
        let mut fids = SequenceFidGenerator::new("new");
        assert_eq!(fids.next_fid(), "new1");
        assert_eq!((&mut fids).next_fid(), "new2");
    }
}
