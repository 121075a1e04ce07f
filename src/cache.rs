//! Cache geometry of a two-level hierarchy

use std::fmt;

use crate::error::CacheError;

pub fn get_log_2(value: u32) -> u32 {
    assert!(value > 0);
    31 - value.leading_zeros()
}

pub fn is_pow_2(value: u32) -> bool {
    value != 0 && value & (value - 1) == 0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheLevel {
    L1i,
    L1d,
    L2,
}

impl CacheLevel {
    /// Whether the level is built from the larger, faster L1 cells
    pub fn is_l1(&self) -> bool {
        matches!(self, CacheLevel::L1i | CacheLevel::L1d)
    }
}

impl fmt::Display for CacheLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CacheLevel::L1i => "L1i",
            CacheLevel::L1d => "L1d",
            CacheLevel::L2 => "L2",
        };
        f.write_str(name)
    }
}

/// Capacity and associativity of one cache level
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CacheGeometry {
    pub size_kb: u32,
    pub associativity: u32,
}

impl CacheGeometry {
    pub fn make(size_kb: u32, associativity: u32) -> Self {
        Self {
            size_kb,
            associativity,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_kb as u64 * 1024
    }

    /// Number of lines, rounded down
    pub fn num_lines(&self, cacheline_b: u32) -> u64 {
        if cacheline_b == 0 {
            return 0;
        }
        self.size_bytes() / cacheline_b as u64
    }

    /// Number of sets; a zero associativity is treated as one set per line
    pub fn num_sets(&self, cacheline_b: u32) -> u64 {
        let lines = self.num_lines(cacheline_b);
        if self.associativity == 0 {
            lines
        } else {
            lines / self.associativity as u64
        }
    }
}

/// L1i/L1d/L2 hierarchy sharing one cache line size
#[derive(Clone, Debug, PartialEq)]
pub struct CacheConfig {
    pub name: String,
    pub l1i: CacheGeometry,
    pub l1d: CacheGeometry,
    pub l2: CacheGeometry,
    pub cacheline_b: u32,
}

impl Default for CacheConfig {
    /// gem5 se.py defaults used for the baseline runs
    fn default() -> Self {
        Self {
            name: String::from("Default"),
            l1i: CacheGeometry::make(32, 2),
            l1d: CacheGeometry::make(64, 2),
            l2: CacheGeometry::make(2048, 8),
            cacheline_b: 64,
        }
    }
}

impl CacheConfig {
    pub fn levels(&self) -> [(CacheLevel, CacheGeometry); 3] {
        [
            (CacheLevel::L1i, self.l1i),
            (CacheLevel::L1d, self.l1d),
            (CacheLevel::L2, self.l2),
        ]
    }

    pub fn l1_total_kb(&self) -> u32 {
        self.l1i.size_kb + self.l1d.size_kb
    }

    pub fn total_kb(&self) -> u32 {
        self.l1_total_kb() + self.l2.size_kb
    }

    /// Mean associativity over the three levels
    pub fn mean_associativity(&self) -> f64 {
        let sum: u32 = self.levels().iter().map(|(_, g)| g.associativity).sum();
        sum as f64 / 3.0
    }

    pub fn validate(&self) -> Result<(), CacheError> {
        if !is_pow_2(self.cacheline_b) {
            return Err(CacheError::LineNotPow2(self.cacheline_b));
        }
        for (level, geometry) in self.levels() {
            if geometry.size_kb == 0 {
                return Err(CacheError::ZeroSize(level.to_string()));
            }
            if geometry.associativity == 0 {
                return Err(CacheError::ZeroAssociativity(level.to_string()));
            }
            let lines = geometry.num_lines(self.cacheline_b);
            if lines == 0 {
                return Err(CacheError::LineTooLarge {
                    level: level.to_string(),
                    size_kb: geometry.size_kb,
                    line: self.cacheline_b,
                });
            }
            if geometry.associativity as u64 > lines {
                return Err(CacheError::AssociativityTooLarge {
                    level: level.to_string(),
                    assoc: geometry.associativity,
                    lines: lines as u32,
                });
            }
        }
        Ok(())
    }
}
