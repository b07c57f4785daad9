//! Wraparound arithmetic over the channel-index ring.
//!
//! Channel counts never exceed 255 on any supported controller model, so
//! the functions are concrete over `u8` rather than generic. `sub_mod`
//! stays in non-negative intermediate values throughout, which keeps the
//! maths correct on an unsigned index type.

/// `(a + b) mod n`. Requires `n > 0`.
pub fn add_mod(a: u8, b: u8, n: u8) -> u8 {
    ((u16::from(a) + u16::from(b)) % u16::from(n)) as u8
}

/// `(a - b) mod n` without ever going below zero. Requires `n > 0`.
pub fn sub_mod(a: u8, b: u8, n: u8) -> u8 {
    let mut a = u16::from(a);
    let b = u16::from(b);
    while b > a {
        a += u16::from(n);
    }
    ((a - b) % u16::from(n)) as u8
}
