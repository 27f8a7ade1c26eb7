use hashbrown::HashMap;
use lazy_static::*;

pub const PC_INDEX: usize = 0;
pub const ZERO_INDEX: usize = 1;
pub const SP_INDEX: usize = 2;
pub const RA_INDEX: usize = 3;

pub const REGISTER_COUNT: usize = REGVEC.len();

/// Canonical register names, in index order. Register 0 is the program counter.
pub const REGVEC: [&str; 46] = [
    "pc", "zero", "sp", "ra", "a0", "a1", "a2", "a3", "a4", "a5", "a6", "a7", "a8", "a9", "s0",
    "s1", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "t0", "t1", "t2", "t3", "t4", "t5", "t6",
    "t7", "t8", "t9", "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "lo", "hi", "k0", "k1",
];

lazy_static! {
    pub static ref REG_MAP: HashMap<String, usize> = {
        let mut map = HashMap::with_capacity(2 * REGISTER_COUNT);

        // Insert numbered registers
        for i in 0..REGISTER_COUNT {
            map.insert(i.to_string(), i);
        }

        // Insert named registers
        for (i, name) in REGVEC.iter().enumerate() {
            map.insert(name.to_string(), i);
        }

        map
    };
}

/// Looks up a register by name (without the `$`). Names are case-insensitive, and numbered
/// registers (`$0`, `$1`, ...) are accepted as well.
pub fn index_of(name: &str) -> Option<usize> {
    match REG_MAP.get(name) {
        Some(&i) => Some(i),
        None => REG_MAP.get(name.to_ascii_lowercase().as_str()).copied(),
    }
}

pub fn name_of(index: usize) -> Option<&'static str> {
    REGVEC.get(index).copied()
}
