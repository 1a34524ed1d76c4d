// cdf_binarize/src/offset.rs

/// Position of `P(X < 0)` inside each CDF of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CdfOffset {
    /// One offset used for every CDF.
    Shared(usize),
    /// One offset per CDF, positionally matched.
    PerItem(Vec<usize>),
}

impl CdfOffset {
    /// Returns the offset for the CDF at `index`, or `None` past the end of a per-item list.
    pub fn resolve(&self, index: usize) -> Option<usize> {
        match self {
            CdfOffset::Shared(offset) => Some(*offset),
            CdfOffset::PerItem(offsets) => offsets.get(index).copied(),
        }
    }

    /// True when every index below `count` resolves.
    pub fn covers(&self, count: usize) -> bool {
        match self {
            CdfOffset::Shared(_) => true,
            CdfOffset::PerItem(offsets) => offsets.len() >= count,
        }
    }
}

impl From<usize> for CdfOffset {
    fn from(offset: usize) -> Self {
        CdfOffset::Shared(offset)
    }
}

impl From<Vec<usize>> for CdfOffset {
    fn from(offsets: Vec<usize>) -> Self {
        CdfOffset::PerItem(offsets)
    }
}

impl From<&[usize]> for CdfOffset {
    fn from(offsets: &[usize]) -> Self {
        CdfOffset::PerItem(offsets.to_vec())
    }
}
