// Copyright 2019 Zhizhesihai (Beijing) Technology Limited.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// See the License for the specific language governing permissions and
// limitations under the License.

/// Table of set bits per byte value.
pub const BYTE_COUNTS: [u8; 256] = build_byte_counts();

/// For every byte value, the 1-based positions of its set bits packed one
/// per nibble, lowest bit first. `0b1010_0001` maps to `0x861`.
///
/// Walking the nibbles of an entry yields the set bits in ascending order
/// without testing each bit.
pub const BIT_LISTS: [u32; 256] = build_bit_lists();

const fn build_byte_counts() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 1;
    while i < 256 {
        // i >> 1 is always computed before i
        table[i] = table[i >> 1] + (i & 1) as u8;
        i += 1;
    }
    table
}

const fn build_bit_lists() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut val = 0;
    while val < 256 {
        let mut packed = 0u32;
        let mut shift = 8;
        while shift > 0 {
            if val & (1 << (shift - 1)) != 0 {
                packed = (packed << 4) | shift as u32;
            }
            shift -= 1;
        }
        table[val] = packed;
        val += 1;
    }
    table
}

/// Returns the number of bits set in `b`.
#[inline]
pub fn bit_count(b: u8) -> u32 {
    BYTE_COUNTS[b as usize] as u32
}

/// Returns the packed list of set bit positions of `b`, see `BIT_LISTS`.
#[inline]
pub fn bit_list(b: u8) -> u32 {
    BIT_LISTS[b as usize]
}

/// Returns the number of set bits in an array of longs.
pub fn pop_array(arr: &[i64]) -> usize {
    let mut pop_count = 0usize;
    for &v in arr {
        let mut v = v as u64;
        // high zero bytes contribute nothing
        while v != 0 {
            pop_count += bit_count((v & 0xff) as u8) as usize;
            v >>= 8;
        }
    }
    pop_count
}

/// Zig-zag encoding maps signed integers to unsigned-magnitude order so
/// that values close to zero, negative or positive, stay small: 0, -1, 1,
/// -2, 2 encode as 0, 1, 2, 3, 4.
pub trait ZigZagEncoding {
    fn encode(self) -> Self;
    fn decode(self) -> Self;
}

impl ZigZagEncoding for i64 {
    #[inline]
    fn encode(self) -> Self {
        (self >> 63) ^ (self << 1)
    }

    #[inline]
    fn decode(self) -> Self {
        ((self as u64 >> 1) as i64) ^ -(self & 1)
    }
}

impl ZigZagEncoding for i32 {
    #[inline]
    fn encode(self) -> Self {
        (self >> 31) ^ (self << 1)
    }

    #[inline]
    fn decode(self) -> Self {
        ((self as u32 >> 1) as i32) ^ -(self & 1)
    }
}
