//! Fixed-key AES tweakable PRF used by the half-gate and row-reduction gate
//! constructions.
//!
//! `π` is keyed once per garbling session from a 256-bit key and reused for
//! every gate; reimplementations must not re-key AES per gate (much slower,
//! different security argument).

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes256;

use crate::label::Label;

/// The session-wide AES-based PRF `π`.
pub struct Prf {
    cipher: Aes256,
}

impl Prf {
    pub fn new(key: &[u8; 32]) -> Self {
        Prf { cipher: Aes256::new(GenericArray::from_slice(key)) }
    }

    #[inline]
    fn pi(&self, block: Label) -> Label {
        let mut buf = GenericArray::clone_from_slice(block.as_bytes());
        self.cipher.encrypt_block(&mut buf);
        let mut out = [0u8; 16];
        out.copy_from_slice(buf.as_slice());
        Label::from_bytes(out)
    }

    /// `encrypt(a, b, c, t) = π(K) ⊕ K ⊕ c`, `K = 2a ⊕ 4b ⊕ tweak(t)`.
    /// Used for the 4-row encryption of row-reduced OR/INV.
    pub fn encrypt(&self, a: Label, b: Label, c: Label, t: u32) -> Label {
        let k = a.mul2() ^ b.mul4() ^ Label::tweak(t);
        self.pi(k) ^ k ^ c
    }

    /// XOR-inverse of [`Prf::encrypt`]: `decrypt(a, b, t, encrypt(a,b,c,t)) = c`.
    pub fn decrypt(&self, a: Label, b: Label, t: u32, cipher_row: Label) -> Label {
        let k = a.mul2() ^ b.mul4() ^ Label::tweak(t);
        self.pi(k) ^ k ^ cipher_row
    }

    /// `encryptHalf(x, i) = π(K) ⊕ K`, `K = 2x ⊕ tweak(i)`. Used for
    /// half-gate AND.
    pub fn encrypt_half(&self, x: Label, i: u32) -> Label {
        let k = x.mul2() ^ Label::tweak(i);
        self.pi(k) ^ k
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn key(seed: u64) -> [u8; 32] {
        use rand::RngCore;
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut k = [0u8; 32];
        rng.fill_bytes(&mut k);
        k
    }

    #[test]
    fn decrypt_inverts_encrypt() {
        let prf = Prf::new(&key(1));
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        for _ in 0..32 {
            let a = Label::random(&mut rng);
            let b = Label::random(&mut rng);
            let c = Label::random(&mut rng);
            let t = 7u32;
            let row = prf.encrypt(a, b, c, t);
            assert_eq!(prf.decrypt(a, b, t, row), c);
        }
    }

    #[test]
    fn encrypt_half_is_deterministic() {
        let prf = Prf::new(&key(3));
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let x = Label::random(&mut rng);
        let a = prf.encrypt_half(x, 11);
        let b = prf.encrypt_half(x, 11);
        assert_eq!(a, b);
        let c = prf.encrypt_half(x, 12);
        assert_ne!(a, c);
    }
}
