use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Snapshot of operations a [`super::SoftwareProvider`] has performed
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProviderStats {
    pub imports: u64,
    pub generations: u64,
    pub exports: u64,
    pub encryptions: u64,
    pub decryptions: u64,
    pub signatures: u64,
    pub verifications: u64,
    pub releases: u64,
    pub live_keys: u64,
}

impl ProviderStats {
    /// Key derivations of any kind (imports plus generations)
    pub fn derivations(&self) -> u64 {
        self.imports + self.generations
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Op {
    Import,
    Generate,
    Export,
    Encrypt,
    Decrypt,
    Sign,
    Verify,
    Release,
}

#[derive(Default)]
pub(crate) struct Counters {
    imports: AtomicU64,
    generations: AtomicU64,
    exports: AtomicU64,
    encryptions: AtomicU64,
    decryptions: AtomicU64,
    signatures: AtomicU64,
    verifications: AtomicU64,
    releases: AtomicU64,
}

impl Counters {
    pub(crate) fn record(&self, op: Op) {
        let counter = match op {
            Op::Import => &self.imports,
            Op::Generate => &self.generations,
            Op::Export => &self.exports,
            Op::Encrypt => &self.encryptions,
            Op::Decrypt => &self.decryptions,
            Op::Sign => &self.signatures,
            Op::Verify => &self.verifications,
            Op::Release => &self.releases,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, live_keys: u64) -> ProviderStats {
        ProviderStats {
            imports: self.imports.load(Ordering::Relaxed),
            generations: self.generations.load(Ordering::Relaxed),
            exports: self.exports.load(Ordering::Relaxed),
            encryptions: self.encryptions.load(Ordering::Relaxed),
            decryptions: self.decryptions.load(Ordering::Relaxed),
            signatures: self.signatures.load(Ordering::Relaxed),
            verifications: self.verifications.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            live_keys,
        }
    }
}
