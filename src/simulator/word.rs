use std::fmt;

/// An 8-byte value. Registers and memory cells all store Words, and most instructions read
/// them as a signed 64-bit integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Word(u64);

impl Word {
    pub const ZERO: Word = Word(0);

    pub fn new<T: IntoWord>(x: T) -> Self {
        Self(x.into_word())
    }

    pub fn get<T: FromWord>(self) -> T {
        FromWord::from_word(self.0)
    }

    pub fn as_i64(self) -> i64 {
        self.0 as i64
    }

    pub fn to_le_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    pub fn from_le_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_le_bytes(bytes))
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

///
/// If a type implements IntoWord, then we can store its bit representation
/// in a Word. Signed types are sign-extended to 64 bits.
///
pub trait IntoWord {
    fn into_word(self) -> u64;
}

macro_rules! impl_into_word {
    ($type:ident, $conv:ident) => {
        impl IntoWord for $type {
            fn into_word(self) -> u64 {
                self as $conv as u64
            }
        }

        impl From<$type> for Word {
            fn from(x: $type) -> Self {
                Word::new(x)
            }
        }
    };
}

impl_into_word!(u64, u64);
impl_into_word!(i64, i64);
impl_into_word!(u32, u32);
impl_into_word!(i32, i64);
impl_into_word!(usize, usize);
impl_into_word!(u8, u8);

impl IntoWord for bool {
    fn into_word(self) -> u64 {
        self as u64
    }
}

impl From<bool> for Word {
    fn from(x: bool) -> Self {
        Word::new(x)
    }
}

pub trait FromWord {
    fn from_word(x: u64) -> Self;
}

macro_rules! impl_from_word {
    ($type:ident) => {
        impl FromWord for $type {
            fn from_word(x: u64) -> Self {
                x as $type
            }
        }
    };
}

impl_from_word!(u64);
impl_from_word!(i64);
impl_from_word!(u32);
impl_from_word!(i32);
impl_from_word!(u8);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_values_are_sign_extended() {
        assert_eq!(Word::new(-1i32).get::<u64>(), u64::MAX);
        assert_eq!(Word::new(-1i32).as_i64(), -1);
        assert_eq!(Word::new(u32::MAX).as_i64(), u32::MAX as i64);
    }

    #[test]
    fn bytes_are_little_endian() {
        let w = Word::new(0x0102_0304_0506_0708u64);
        assert_eq!(w.to_le_bytes(), [8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(Word::from_le_bytes(w.to_le_bytes()), w);
    }

    #[test]
    fn bools_become_zero_or_one() {
        assert_eq!(Word::from(true).as_i64(), 1);
        assert_eq!(Word::from(false), Word::ZERO);
    }
}
