//! 128-bit wire labels and the GF(2^128)-ish algebra the garbler/evaluator and
//! the IKNP layer build on.
//!
//! A [`Label`] is the unit of value in the garbled-circuit core: every wire
//! carries two of them (see `garbled_circuits::Wire`), and the IKNP extension
//! treats correlated-OT outputs as labels too. The algebra here intentionally
//! stops at "left shift" for `mul2`/`mul4` — these are PRF tweak derivations,
//! not a reduced field multiplication, per the half-gate construction.

use std::fmt;
use std::ops::{BitAnd, BitXor, BitXorAssign};

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

/// A 128-bit wire label, stored as two big-endian 64-bit halves `(D0, D1)`.
///
/// `D0` occupies bytes `0..8`, `D1` occupies bytes `8..16`. The select bit
/// (`S`) is the most significant bit of `D0`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Label([u8; 16]);

impl Label {
    pub const LEN: usize = 16;

    pub const ZERO: Label = Label([0u8; 16]);

    #[inline]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Label(bytes)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Constructs a label from its two 64-bit halves.
    #[inline]
    pub fn from_halves(d0: u64, d1: u64) -> Self {
        let mut bytes = [0u8; 16];
        bytes[0..8].copy_from_slice(&d0.to_be_bytes());
        bytes[8..16].copy_from_slice(&d1.to_be_bytes());
        Label(bytes)
    }

    #[inline]
    pub fn d0(&self) -> u64 {
        u64::from_be_bytes(self.0[0..8].try_into().unwrap())
    }

    #[inline]
    pub fn d1(&self) -> u64 {
        u64::from_be_bytes(self.0[8..16].try_into().unwrap())
    }

    /// Draws a uniformly random label.
    pub fn random<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        Label(bytes)
    }

    /// Draws a random global offset `Delta` with the select bit forced to 1,
    /// as required for free-XOR.
    pub fn random_delta<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        let mut delta = Self::random(rng);
        delta.set_s(true);
        delta
    }

    /// Reads the select bit: the most significant bit of `D0`.
    #[inline]
    pub fn s(&self) -> bool {
        (self.0[0] & 0x80) != 0
    }

    /// Sets or clears the select bit, leaving every other bit untouched.
    #[inline]
    pub fn set_s(&mut self, value: bool) {
        if value {
            self.0[0] |= 0x80;
        } else {
            self.0[0] &= 0x7f;
        }
    }

    /// Reads bit `i` of the label, where bit 0 is the least significant bit
    /// of `D1` and bit 127 is the select bit (MSB of `D0`).
    #[inline]
    pub fn bit(&self, i: u32) -> bool {
        debug_assert!(i < 128);
        let byte_from_end = (i / 8) as usize;
        let byte_idx = 15 - byte_from_end;
        let bit_idx = i % 8;
        (self.0[byte_idx] >> bit_idx) & 1 == 1
    }

    /// Sets bit `i`, same indexing convention as [`Label::bit`].
    #[inline]
    pub fn set_bit(&mut self, i: u32, value: bool) {
        debug_assert!(i < 128);
        let byte_from_end = (i / 8) as usize;
        let byte_idx = 15 - byte_from_end;
        let bit_idx = i % 8;
        if value {
            self.0[byte_idx] |= 1 << bit_idx;
        } else {
            self.0[byte_idx] &= !(1 << bit_idx);
        }
    }

    #[inline]
    fn as_u128(&self) -> u128 {
        u128::from_be_bytes(self.0)
    }

    #[inline]
    fn from_u128(v: u128) -> Self {
        Label(v.to_be_bytes())
    }

    /// Multiply-by-`x` in the sense of a plain left shift by one bit across
    /// the full 128-bit value (no field reduction). Used only to derive PRF
    /// tweaks.
    #[inline]
    pub fn mul2(&self) -> Self {
        Self::from_u128(self.as_u128() << 1)
    }

    /// Left shift by two bits; see [`Label::mul2`].
    #[inline]
    pub fn mul4(&self) -> Self {
        Self::from_u128(self.as_u128() << 2)
    }

    /// Builds the PRF tweak for gate index `t`: `D1 = t`, `D0 = 0`.
    #[inline]
    pub fn tweak(t: u32) -> Self {
        Label::from_halves(0, t as u64)
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label(")?;
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}

impl BitXor for Label {
    type Output = Label;

    #[inline]
    fn bitxor(self, rhs: Label) -> Label {
        let mut out = [0u8; 16];
        for i in 0..16 {
            out[i] = self.0[i] ^ rhs.0[i];
        }
        Label(out)
    }
}

impl BitXorAssign for Label {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Label) {
        for i in 0..16 {
            self.0[i] ^= rhs.0[i];
        }
    }
}

impl BitAnd for Label {
    type Output = Label;

    #[inline]
    fn bitand(self, rhs: Label) -> Label {
        let mut out = [0u8; 16];
        for i in 0..16 {
            out[i] = self.0[i] & rhs.0[i];
        }
        Label(out)
    }
}

/// 64x64 -> 128 bit carry-less multiplication, the primitive [`mul128`] is
/// built from. Picks a hardware `pclmulqdq` path when available at runtime,
/// falling back to a portable bit-loop that is required to agree bit-for-bit.
#[inline]
fn clmul64(a: u64, b: u64) -> u128 {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("pclmulqdq") && is_x86_feature_detected!("sse2") {
            return unsafe { clmul64_hw(a, b) };
        }
    }
    clmul64_portable(a, b)
}

#[inline]
fn clmul64_portable(a: u64, b: u64) -> u128 {
    let mut result: u128 = 0;
    for i in 0..64 {
        if (a >> i) & 1 == 1 {
            result ^= (b as u128) << i;
        }
    }
    result
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "pclmulqdq,sse2")]
unsafe fn clmul64_hw(a: u64, b: u64) -> u128 {
    use std::arch::x86_64::*;
    let va = _mm_set_epi64x(0, a as i64);
    let vb = _mm_set_epi64x(0, b as i64);
    let prod = _mm_clmulepi64_si128(va, vb, 0x00);
    let lo = _mm_cvtsi128_si64(prod) as u64;
    let hi = _mm_cvtsi128_si64(_mm_srli_si128(prod, 8)) as u64;
    ((hi as u128) << 64) | lo as u128
}

/// Accumulates `value << shift` (`shift` in `{0, 64, 128}`) into a running
/// 256-bit XOR-accumulator represented as `(lo, hi)`.
#[inline]
fn xor_shifted(lo: &mut u128, hi: &mut u128, value: u128, shift: u32) {
    match shift {
        0 => *lo ^= value,
        64 => {
            *lo ^= value << 64;
            *hi ^= value >> 64;
        }
        128 => *hi ^= value,
        _ => unreachable!("shift is always 0, 64 or 128"),
    }
}

/// Unreduced 128x128 -> 256 bit carry-less multiplication, returned as
/// `(lo, hi)` labels. Bilinear over XOR: `mul128(a^a', b) = mul128(a,b) ^
/// mul128(a',b)`. Used only by the active-secure IKNP check.
pub fn mul128(a: Label, b: Label) -> (Label, Label) {
    let a = a.as_u128();
    let b = b.as_u128();
    let a_lo = a as u64;
    let a_hi = (a >> 64) as u64;
    let b_lo = b as u64;
    let b_hi = (b >> 64) as u64;

    let t0 = clmul64(a_lo, b_lo);
    let t1 = clmul64(a_lo, b_hi);
    let t2 = clmul64(a_hi, b_lo);
    let t3 = clmul64(a_hi, b_hi);
    let cross = t1 ^ t2;

    let mut lo: u128 = 0;
    let mut hi: u128 = 0;
    xor_shifted(&mut lo, &mut hi, t0, 0);
    xor_shifted(&mut lo, &mut hi, cross, 64);
    xor_shifted(&mut lo, &mut hi, t3, 128);

    (Label::from_u128(lo), Label::from_u128(hi))
}

/// Portable-only reference implementation of [`mul128`], used in tests to
/// check agreement with whichever path `mul128` picked at runtime.
pub fn mul128_ref(a: Label, b: Label) -> (Label, Label) {
    let a = a.as_u128();
    let b = b.as_u128();
    let a_lo = a as u64;
    let a_hi = (a >> 64) as u64;
    let b_lo = b as u64;
    let b_hi = (b >> 64) as u64;

    let t0 = clmul64_portable(a_lo, b_lo);
    let t1 = clmul64_portable(a_lo, b_hi);
    let t2 = clmul64_portable(a_hi, b_lo);
    let t3 = clmul64_portable(a_hi, b_hi);
    let cross = t1 ^ t2;

    let mut lo: u128 = 0;
    let mut hi: u128 = 0;
    xor_shifted(&mut lo, &mut hi, t0, 0);
    xor_shifted(&mut lo, &mut hi, cross, 64);
    xor_shifted(&mut lo, &mut hi, t3, 128);

    (Label::from_u128(lo), Label::from_u128(hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn xor_is_associative_and_self_inverse() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let x = Label::random(&mut rng);
        let y = Label::random(&mut rng);
        let z = Label::random(&mut rng);
        assert_eq!((x ^ y) ^ z, x ^ (y ^ z));
        assert_eq!(x ^ x, Label::ZERO);
    }

    #[test]
    fn s_bit_set_and_clear() {
        let mut l = Label::ZERO;
        l.set_s(true);
        assert!(l.s());
        assert_eq!(l.d0(), 1u64 << 63);
        l.set_s(false);
        assert!(!l.s());
        assert_eq!(l, Label::ZERO);
    }

    #[test]
    fn bit_roundtrip() {
        let mut l = Label::ZERO;
        for i in [0u32, 1, 63, 64, 65, 127] {
            l.set_bit(i, true);
            assert!(l.bit(i));
            l.set_bit(i, false);
            assert!(!l.bit(i));
        }
    }

    #[test]
    fn mul128_matches_reference() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        for _ in 0..64 {
            let a = Label::random(&mut rng);
            let b = Label::random(&mut rng);
            assert_eq!(mul128(a, b), mul128_ref(a, b));
        }
    }

    #[test]
    fn mul128_commutative_and_bilinear() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let a = Label::random(&mut rng);
        let a2 = Label::random(&mut rng);
        let b = Label::random(&mut rng);

        assert_eq!(mul128(a, b), mul128(b, a));

        let (lo1, hi1) = mul128(a, b);
        let (lo2, hi2) = mul128(a2, b);
        let (lo3, hi3) = mul128(a ^ a2, b);
        assert_eq!(lo3, lo1 ^ lo2);
        assert_eq!(hi3, hi1 ^ hi2);
    }

    fn arb_label() -> impl proptest::strategy::Strategy<Value = Label> {
        use proptest::prelude::*;
        any::<[u8; 16]>().prop_map(Label::from_bytes)
    }

    proptest::proptest! {
        #[test]
        fn prop_xor_self_inverse(a in arb_label()) {
            proptest::prop_assert_eq!(a ^ a, Label::ZERO);
        }

        #[test]
        fn prop_mul128_bilinear_over_xor(a in arb_label(), a2 in arb_label(), b in arb_label()) {
            let (lo1, hi1) = mul128(a, b);
            let (lo2, hi2) = mul128(a2, b);
            let (lo3, hi3) = mul128(a ^ a2, b);
            proptest::prop_assert_eq!(lo3, lo1 ^ lo2);
            proptest::prop_assert_eq!(hi3, hi1 ^ hi2);
        }

        #[test]
        fn prop_mul128_agrees_with_portable_reference(a in arb_label(), b in arb_label()) {
            proptest::prop_assert_eq!(mul128(a, b), mul128_ref(a, b));
        }

        #[test]
        fn prop_bit_roundtrip(a in arb_label(), i in 0u32..128) {
            let mut l = a;
            let original = l.bit(i);
            l.set_bit(i, !original);
            proptest::prop_assert_eq!(l.bit(i), !original);
            l.set_bit(i, original);
            proptest::prop_assert_eq!(l, a);
        }
    }
}
