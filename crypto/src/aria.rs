// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! ARIA block cipher (KS X 1213-1) with CBC mode.
//!
//! ARIA is the block cipher the insurance authorities mandate for EDI
//! payload encryption. It is a 128-bit substitution-permutation network
//! accepting 128/192/256-bit keys with 12/14/16 rounds respectively. The
//! S-box tables are generated once at first use from their defining maps
//! over GF(2^8).

use once_cell::sync::Lazy;

use crate::errors::Error;

/// Cipher block width in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Key-schedule constants (the 128-bit fractional parts of 1/pi).
const KRK: [u128; 3] = [
    0x517c_c1b7_2722_0a94_fe13_abe8_fa9a_6ee0,
    0x6db1_4acc_9e21_c820_ff28_b1d5_ef5d_e2b0,
    0xdb92_371d_2126_e970_0324_9775_04e8_c90e,
];

/// Affine rows and constant defining the type-2 S-box over x^247.
const SB2_MATRIX: [u8; 8] = [0x5e, 0x3d, 0xd7, 0x9d, 0x2c, 0x81, 0x5d, 0xd3];
const SB2_CONSTANT: u8 = 0x47;

struct SboxTables {
    sb1: [u8; 256],
    sb2: [u8; 256],
    sb1_inv: [u8; 256],
    sb2_inv: [u8; 256],
}

static TABLES: Lazy<SboxTables> = Lazy::new(build_tables);

/// Multiplication in GF(2^8) modulo x^8 + x^4 + x^3 + x + 1.
fn gf_mul(mut a: u8, mut b: u8) -> u8 {
    let mut acc = 0u8;
    while b != 0 {
        if b & 1 != 0 {
            acc ^= a;
        }
        let carry = a & 0x80;
        a <<= 1;
        if carry != 0 {
            a ^= 0x1b;
        }
        b >>= 1;
    }
    acc
}

fn gf_pow(x: u8, mut exp: u32) -> u8 {
    let mut base = x;
    let mut acc = 1u8;
    while exp != 0 {
        if exp & 1 != 0 {
            acc = gf_mul(acc, base);
        }
        base = gf_mul(base, base);
        exp >>= 1;
    }
    acc
}

fn build_tables() -> SboxTables {
    let mut sb1 = [0u8; 256];
    let mut sb2 = [0u8; 256];
    let mut sb1_inv = [0u8; 256];
    let mut sb2_inv = [0u8; 256];

    for x in 0..=255u8 {
        // Type 1: the Rijndael map, A(x^-1) + 0x63.
        let inv = if x == 0 { 0 } else { gf_pow(x, 254) };
        sb1[x as usize] = inv
            ^ inv.rotate_left(1)
            ^ inv.rotate_left(2)
            ^ inv.rotate_left(3)
            ^ inv.rotate_left(4)
            ^ 0x63;

        // Type 2: B(x^247) + 0x47.
        let q = gf_pow(x, 247);
        let mut out = 0u8;
        for (i, row) in SB2_MATRIX.iter().enumerate() {
            let bit = ((row & q).count_ones() & 1) as u8;
            out |= bit << (7 - i);
        }
        sb2[x as usize] = out ^ SB2_CONSTANT;
    }

    for x in 0..=255u8 {
        sb1_inv[sb1[x as usize] as usize] = x;
        sb2_inv[sb2[x as usize] as usize] = x;
    }

    SboxTables {
        sb1,
        sb2,
        sb1_inv,
        sb2_inv,
    }
}

type Block = [u8; BLOCK_SIZE];

fn xor(a: Block, b: Block) -> Block {
    let mut out = [0u8; BLOCK_SIZE];
    for i in 0..BLOCK_SIZE {
        out[i] = a[i] ^ b[i];
    }
    out
}

/// Odd-round substitution layer: SB1, SB2, SB1^-1, SB2^-1 per byte column.
fn sl1(x: Block) -> Block {
    let t = &*TABLES;
    let mut out = [0u8; BLOCK_SIZE];
    for i in 0..BLOCK_SIZE {
        out[i] = match i % 4 {
            0 => t.sb1[x[i] as usize],
            1 => t.sb2[x[i] as usize],
            2 => t.sb1_inv[x[i] as usize],
            _ => t.sb2_inv[x[i] as usize],
        };
    }
    out
}

/// Even-round substitution layer, the inverse of [`sl1`].
fn sl2(x: Block) -> Block {
    let t = &*TABLES;
    let mut out = [0u8; BLOCK_SIZE];
    for i in 0..BLOCK_SIZE {
        out[i] = match i % 4 {
            0 => t.sb1_inv[x[i] as usize],
            1 => t.sb2_inv[x[i] as usize],
            2 => t.sb1[x[i] as usize],
            _ => t.sb2[x[i] as usize],
        };
    }
    out
}

/// The 16x16 involutive binary diffusion layer.
fn diffuse(x: Block) -> Block {
    [
        x[3] ^ x[4] ^ x[6] ^ x[8] ^ x[9] ^ x[13] ^ x[14],
        x[2] ^ x[5] ^ x[7] ^ x[8] ^ x[9] ^ x[12] ^ x[15],
        x[1] ^ x[4] ^ x[6] ^ x[10] ^ x[11] ^ x[12] ^ x[15],
        x[0] ^ x[5] ^ x[7] ^ x[10] ^ x[11] ^ x[13] ^ x[14],
        x[0] ^ x[2] ^ x[5] ^ x[8] ^ x[11] ^ x[14] ^ x[15],
        x[1] ^ x[3] ^ x[4] ^ x[9] ^ x[10] ^ x[14] ^ x[15],
        x[0] ^ x[2] ^ x[7] ^ x[9] ^ x[10] ^ x[12] ^ x[13],
        x[1] ^ x[3] ^ x[6] ^ x[8] ^ x[11] ^ x[12] ^ x[13],
        x[0] ^ x[1] ^ x[4] ^ x[7] ^ x[10] ^ x[13] ^ x[15],
        x[0] ^ x[1] ^ x[5] ^ x[6] ^ x[11] ^ x[12] ^ x[14],
        x[2] ^ x[3] ^ x[5] ^ x[6] ^ x[8] ^ x[13] ^ x[15],
        x[2] ^ x[3] ^ x[4] ^ x[7] ^ x[9] ^ x[12] ^ x[14],
        x[1] ^ x[2] ^ x[6] ^ x[7] ^ x[9] ^ x[11] ^ x[12],
        x[0] ^ x[3] ^ x[6] ^ x[7] ^ x[8] ^ x[10] ^ x[13],
        x[0] ^ x[3] ^ x[4] ^ x[5] ^ x[9] ^ x[11] ^ x[14],
        x[1] ^ x[2] ^ x[4] ^ x[5] ^ x[8] ^ x[10] ^ x[15],
    ]
}

fn to_block(v: u128) -> Block {
    v.to_be_bytes()
}

fn to_u128(b: Block) -> u128 {
    u128::from_be_bytes(b)
}

/// Odd round function: substitution then diffusion, key added first.
fn fo(x: u128, k: u128) -> u128 {
    to_u128(diffuse(sl1(to_block(x ^ k))))
}

/// Even round function.
fn fe(x: u128, k: u128) -> u128 {
    to_u128(diffuse(sl2(to_block(x ^ k))))
}

/// ARIA block cipher with a fixed key schedule.
pub struct AriaCipher {
    rounds: usize,
    ek: Vec<Block>,
    dk: Vec<Block>,
}

impl AriaCipher {
    /// Build the cipher from a 16, 24 or 32 byte key.
    pub fn new(key: &[u8]) -> Result<Self, Error> {
        let rounds = match key.len() {
            16 => 12,
            24 => 14,
            32 => 16,
            n => return Err(Error::InvalidKeySize(n)),
        };

        let mut kl = [0u8; 16];
        kl.copy_from_slice(&key[..16]);
        let mut kr = [0u8; 16];
        kr[..key.len() - 16].copy_from_slice(&key[16..]);
        let kl = to_u128(kl);
        let kr = to_u128(kr);

        let (ck1, ck2, ck3) = match key.len() {
            16 => (KRK[0], KRK[1], KRK[2]),
            24 => (KRK[1], KRK[2], KRK[0]),
            _ => (KRK[2], KRK[0], KRK[1]),
        };

        let w0 = kl;
        let w1 = fo(w0, ck1) ^ kr;
        let w2 = fe(w1, ck2) ^ w0;
        let w3 = fo(w2, ck3) ^ w1;

        let all_ek: [u128; 17] = [
            w0 ^ w1.rotate_right(19),
            w1 ^ w2.rotate_right(19),
            w2 ^ w3.rotate_right(19),
            w0.rotate_right(19) ^ w3,
            w0 ^ w1.rotate_right(31),
            w1 ^ w2.rotate_right(31),
            w2 ^ w3.rotate_right(31),
            w0.rotate_right(31) ^ w3,
            w0 ^ w1.rotate_left(61),
            w1 ^ w2.rotate_left(61),
            w2 ^ w3.rotate_left(61),
            w0.rotate_left(61) ^ w3,
            w0 ^ w1.rotate_left(31),
            w1 ^ w2.rotate_left(31),
            w2 ^ w3.rotate_left(31),
            w0.rotate_left(31) ^ w3,
            w0 ^ w1.rotate_left(19),
        ];

        let ek: Vec<Block> = all_ek[..rounds + 1].iter().map(|&k| to_block(k)).collect();

        // Decryption reuses the forward structure with diffused reversed keys.
        let mut dk = Vec::with_capacity(rounds + 1);
        dk.push(ek[rounds]);
        for i in 1..rounds {
            dk.push(diffuse(ek[rounds - i]));
        }
        dk.push(ek[0]);

        Ok(Self { rounds, ek, dk })
    }

    /// Number of rounds selected by the key length.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    fn crypt(&self, input: Block, rk: &[Block]) -> Block {
        let mut state = input;
        for r in 1..self.rounds {
            state = xor(state, rk[r - 1]);
            state = if r % 2 == 1 {
                diffuse(sl1(state))
            } else {
                diffuse(sl2(state))
            };
        }
        // The final round substitutes without diffusion and whitens.
        state = sl2(xor(state, rk[self.rounds - 1]));
        xor(state, rk[self.rounds])
    }

    /// Encrypt exactly one 16-byte block.
    pub fn encrypt_block(&self, block: &[u8]) -> Result<[u8; BLOCK_SIZE], Error> {
        let block: Block = block
            .try_into()
            .map_err(|_| Error::InvalidBlockSize(block.len()))?;
        Ok(self.crypt(block, &self.ek))
    }

    /// Decrypt exactly one 16-byte block.
    pub fn decrypt_block(&self, block: &[u8]) -> Result<[u8; BLOCK_SIZE], Error> {
        let block: Block = block
            .try_into()
            .map_err(|_| Error::InvalidBlockSize(block.len()))?;
        Ok(self.crypt(block, &self.dk))
    }
}

/// ARIA in cipher-block-chaining mode.
///
/// Inputs must be a whole number of blocks; padding is the caller's concern.
/// Every call chains from the configured IV, which defaults to all zeroes.
pub struct AriaCbc {
    cipher: AriaCipher,
    iv: [u8; BLOCK_SIZE],
}

impl AriaCbc {
    pub fn new(key: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            cipher: AriaCipher::new(key)?,
            iv: [0u8; BLOCK_SIZE],
        })
    }

    pub fn with_iv(key: &[u8], iv: &[u8]) -> Result<Self, Error> {
        let iv: [u8; BLOCK_SIZE] = iv.try_into().map_err(|_| Error::InvalidIv(iv.len()))?;
        Ok(Self {
            cipher: AriaCipher::new(key)?,
            iv,
        })
    }

    pub fn iv(&self) -> &[u8; BLOCK_SIZE] {
        &self.iv
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        if plaintext.len() % BLOCK_SIZE != 0 {
            return Err(Error::NotBlockAligned(plaintext.len()));
        }
        let mut out = Vec::with_capacity(plaintext.len());
        let mut prev: Block = self.iv;
        for chunk in plaintext.chunks_exact(BLOCK_SIZE) {
            let mixed = xor(chunk.try_into().expect("exact chunk"), prev);
            let enc = self.cipher.crypt(mixed, &self.cipher.ek);
            out.extend_from_slice(&enc);
            prev = enc;
        }
        Ok(out)
    }

    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
        if ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(Error::NotBlockAligned(ciphertext.len()));
        }
        let mut out = Vec::with_capacity(ciphertext.len());
        let mut prev: Block = self.iv;
        for chunk in ciphertext.chunks_exact(BLOCK_SIZE) {
            let block: Block = chunk.try_into().expect("exact chunk");
            let dec = self.cipher.crypt(block, &self.cipher.dk);
            out.extend_from_slice(&xor(dec, prev));
            prev = block;
        }
        Ok(out)
    }
}
