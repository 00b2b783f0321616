//! IR symbol alphabet and its timing table.
//!
//! The Globo remote speaks a pulse-distance protocol with four symbols. Every symbol is a
//! carrier-on *mark* followed by a carrier-off *space*:
//!
//! | Char | Symbol          | Mark (µs) | Space (µs) |
//! |------|-----------------|-----------|------------|
//! | `0`  | [`Symbol::Zero`] | 400       | 1200       |
//! | `1`  | [`Symbol::One`]  | 1200      | 400        |
//! | `*`  | [`Symbol::Star`] | 400       | 8000       |
//! | `#`  | [`Symbol::Hash`] | 1200      | 7000       |
//!
//! `*` and `#` terminate a frame; their long space separates frames.
//!
//! ## Functions
//!
//! - [`Symbol::from_char`]: maps a code character to its symbol
//! - [`decode_code`]: turns a whole code string into symbols
//! - [`code_duration_us`]: nominal airtime of a code

use alloc::vec::Vec;

use crate::consts::{
    HASH_SPACE_US, LONG_MARK_US, ONE_SPACE_US, SHORT_MARK_US, STAR_SPACE_US, ZERO_SPACE_US,
};
use crate::error::Error;

/// One atomic unit of the IR protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Logical zero: short mark, long space.
    Zero,
    /// Logical one: long mark, short space.
    One,
    /// Frame terminator with a short mark.
    Star,
    /// Frame terminator with a long mark.
    Hash,
}

/// Mark and space durations of a symbol, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolTiming {
    /// Carrier-on time.
    pub mark_us: u32,
    /// Carrier-off time.
    pub space_us: u32,
}

impl SymbolTiming {
    /// Nominal airtime of the symbol.
    pub const fn total_us(&self) -> u32 {
        self.mark_us + self.space_us
    }
}

impl Symbol {
    /// All symbols, in table order.
    pub const ALL: [Symbol; 4] = [Symbol::Zero, Symbol::One, Symbol::Star, Symbol::Hash];

    /// Maps a code character to its symbol.
    pub fn from_char(c: char) -> Result<Self, Error> {
        match c {
            '0' => Ok(Symbol::Zero),
            '1' => Ok(Symbol::One),
            '*' => Ok(Symbol::Star),
            '#' => Ok(Symbol::Hash),
            other => Err(Error::UnknownSymbol(other)),
        }
    }

    /// The character used for this symbol in catalog codes.
    pub const fn as_char(&self) -> char {
        match self {
            Symbol::Zero => '0',
            Symbol::One => '1',
            Symbol::Star => '*',
            Symbol::Hash => '#',
        }
    }

    /// Position of the symbol in [`Symbol::ALL`].
    pub const fn index(&self) -> usize {
        match self {
            Symbol::Zero => 0,
            Symbol::One => 1,
            Symbol::Star => 2,
            Symbol::Hash => 3,
        }
    }

    /// Mark and space durations of the symbol.
    pub const fn timing(&self) -> SymbolTiming {
        match self {
            Symbol::Zero => SymbolTiming {
                mark_us: SHORT_MARK_US,
                space_us: ZERO_SPACE_US,
            },
            Symbol::One => SymbolTiming {
                mark_us: LONG_MARK_US,
                space_us: ONE_SPACE_US,
            },
            Symbol::Star => SymbolTiming {
                mark_us: SHORT_MARK_US,
                space_us: STAR_SPACE_US,
            },
            Symbol::Hash => SymbolTiming {
                mark_us: LONG_MARK_US,
                space_us: HASH_SPACE_US,
            },
        }
    }
}

/// Decodes a code string into its symbols.
///
/// Fails with [`Error::UnknownSymbol`] on the first character outside the alphabet; a
/// malformed code is never partially transmitted.
pub fn decode_code(code: &str) -> Result<Vec<Symbol>, Error> {
    code.chars().map(Symbol::from_char).collect()
}

/// Nominal airtime of a code in microseconds, ignoring carrier rounding.
pub fn code_duration_us(code: &str) -> Result<u64, Error> {
    code.chars().try_fold(0u64, |total, c| {
        Ok(total + u64::from(Symbol::from_char(c)?.timing().total_us()))
    })
}
