// cdf_binarize/src/batch.rs

use ndarray::ArrayView2;

use crate::error::CdfError;
use crate::offset::CdfOffset;

/// A set of CDFs with their lengths and offsets, checked once at construction.
///
/// Each CDF stores `P(X < i)` at position `i`, except the entry at `length - 1`, which holds the
/// escape mass. Entries at or past `length` are never read.
#[derive(Debug, Clone, PartialEq)]
pub struct CdfBatch {
    cdfs: Vec<Vec<f64>>,
    lengths: Vec<usize>,
    offset: CdfOffset,
}

impl CdfBatch {
    /// Builds a batch, rejecting any shape or index relationship the conversion cannot honour.
    ///
    /// # Errors
    ///
    /// * `ShapeMismatch` if `cdfs` and `lengths` differ in size.
    /// * `IndexOutOfRange` if a per-item offset list is too short or a length exceeds its CDF.
    /// * `LengthTooShort` if a length is below 2.
    /// * `OffsetOutOfRange` if `offset + 1 >= length`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cdf_binarize::CdfBatch;
    ///
    /// let batch = CdfBatch::new(vec![vec![0.1, 0.3, 0.5, 0.7, 0.9, 0.1]], vec![6], 2).unwrap();
    /// assert_eq!(batch.len(), 1);
    /// ```
    pub fn new(
        cdfs: Vec<Vec<f64>>,
        lengths: Vec<usize>,
        offset: impl Into<CdfOffset>,
    ) -> Result<Self, CdfError> {
        let batch = CdfBatch {
            cdfs,
            lengths,
            offset: offset.into(),
        };
        batch.check_structure()?;
        Ok(batch)
    }

    /// Builds a batch from a padded table with one CDF per row.
    ///
    /// Cells of row `i` at or past `lengths[i]` are padding and are dropped.
    pub fn from_table(
        table: ArrayView2<'_, f64>,
        lengths: Vec<usize>,
        offset: impl Into<CdfOffset>,
    ) -> Result<Self, CdfError> {
        if table.nrows() != lengths.len() {
            return Err(CdfError::ShapeMismatch {
                cdfs: table.nrows(),
                lengths: lengths.len(),
            });
        }

        let mut cdfs = Vec::with_capacity(table.nrows());
        for (item, (row, &length)) in table.rows().into_iter().zip(&lengths).enumerate() {
            if length > row.len() {
                return Err(CdfError::IndexOutOfRange {
                    what: "length",
                    item,
                    index: length,
                    available: row.len(),
                });
            }
            cdfs.push(row.iter().take(length).copied().collect());
        }

        CdfBatch::new(cdfs, lengths, offset)
    }

    pub fn len(&self) -> usize {
        self.cdfs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cdfs.is_empty()
    }

    pub fn offset(&self) -> &CdfOffset {
        &self.offset
    }

    /// Iterates `(cdf, length, offset)` triples in input order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&[f64], usize, usize)> + '_ {
        self.cdfs
            .iter()
            .zip(&self.lengths)
            .enumerate()
            .map(move |(item, (cdf, &length))| (cdf.as_slice(), length, self.offset_at(item)))
    }

    /// Offset of the CDF at `item`. Only valid after `check_structure` has passed.
    pub(crate) fn offset_at(&self, item: usize) -> usize {
        self.offset.resolve(item).unwrap_or_default()
    }

    fn check_structure(&self) -> Result<(), CdfError> {
        if self.cdfs.len() != self.lengths.len() {
            return Err(CdfError::ShapeMismatch {
                cdfs: self.cdfs.len(),
                lengths: self.lengths.len(),
            });
        }

        if !self.offset.covers(self.cdfs.len()) {
            let available = match &self.offset {
                CdfOffset::PerItem(offsets) => offsets.len(),
                CdfOffset::Shared(_) => self.cdfs.len(),
            };
            return Err(CdfError::IndexOutOfRange {
                what: "offset",
                item: available,
                index: available,
                available,
            });
        }

        for (item, (cdf, &length)) in self.cdfs.iter().zip(&self.lengths).enumerate() {
            if length < 2 {
                return Err(CdfError::LengthTooShort { item, length });
            }
            if length > cdf.len() {
                return Err(CdfError::IndexOutOfRange {
                    what: "length",
                    item,
                    index: length,
                    available: cdf.len(),
                });
            }
            let offset = self.offset_at(item);
            if offset >= length - 1 {
                return Err(CdfError::OffsetOutOfRange {
                    item,
                    offset,
                    length,
                });
            }
        }

        Ok(())
    }

    /// Checks the numeric preconditions that the conversion itself assumes but never verifies.
    ///
    /// Every entry below `length` must lie in [0, 1], the cumulative part (everything before the
    /// escape slot) must not decrease, and `cdf[offset]` must not exceed one half.
    pub fn validate_numeric(&self, tolerance: f64) -> Result<(), CdfError> {
        for (item, (cdf, length, offset)) in self.iter().enumerate() {
            for (position, &value) in cdf[..length].iter().enumerate() {
                if !(-tolerance..=1.0 + tolerance).contains(&value) {
                    return Err(CdfError::ValueOutOfRange {
                        item,
                        position,
                        value,
                    });
                }
            }

            let cumulative = &cdf[..length - 1];
            for (position, pair) in cumulative.windows(2).enumerate() {
                if pair[1] < pair[0] - tolerance {
                    return Err(CdfError::NonMonotonic {
                        item,
                        position: position + 1,
                        value: pair[1],
                        previous: pair[0],
                    });
                }
            }

            if cdf[offset] > 0.5 + tolerance {
                return Err(CdfError::AsymmetricOffset {
                    item,
                    offset,
                    value: cdf[offset],
                });
            }
        }
        Ok(())
    }
}
