use crate::errors::{
    DataProcessingError,
    Result,
};

/// Row-major flat 2D array.
///
/// `values` is a flattened array, `ncols` values per row. Values that
/// belong to the same row are adjacent in memory. This is the tensor
/// type handed to (and returned by) scoring models: channels as rows,
/// window positions as columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Array2D<T: Clone + Copy> {
    values: Vec<T>,
    nrows: usize,
    ncols: usize,
}

impl<T: Clone + Copy> Array2D<T> {
    pub fn try_new<S: AsRef<[T]>, C: AsRef<[S]>>(rows: C) -> Result<Array2D<T>> {
        let nrows = rows.as_ref().len();
        if nrows == 0 {
            return Err(DataProcessingError::empty("Array2D with no rows"));
        }
        let ncols = rows.as_ref()[0].as_ref().len();
        if ncols == 0 {
            return Err(DataProcessingError::empty("Array2D with no columns"));
        }

        let mut values = Vec::with_capacity(nrows * ncols);
        for row in rows.as_ref() {
            if row.as_ref().len() != ncols {
                return Err(DataProcessingError::ExpectedSlicesSameLength {
                    expected: ncols,
                    other: row.as_ref().len(),
                    context: "Array2D rows",
                });
            }
            values.extend_from_slice(row.as_ref());
        }

        Ok(Array2D {
            values,
            nrows,
            ncols,
        })
    }

    pub fn from_flat_vector(values: Vec<T>, nrows: usize, ncols: usize) -> Result<Array2D<T>> {
        if values.len() != nrows * ncols {
            return Err(DataProcessingError::ExpectedSlicesSameLength {
                expected: nrows * ncols,
                other: values.len(),
                context: "Array2D flat vector",
            });
        }
        Ok(Array2D {
            values,
            nrows,
            ncols,
        })
    }

    pub fn new_filled(nrows: usize, ncols: usize, value: T) -> Array2D<T> {
        Array2D {
            values: vec![value; nrows * ncols],
            nrows,
            ncols,
        }
    }

    pub fn get_row(&self, index: usize) -> Option<&[T]> {
        if index >= self.nrows {
            return None;
        }
        let start = index * self.ncols;
        Some(&self.values[start..start + self.ncols])
    }

    pub fn get_row_mut(&mut self, index: usize) -> Option<&mut [T]> {
        if index >= self.nrows {
            return None;
        }
        let start = index * self.ncols;
        Some(&mut self.values[start..start + self.ncols])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> {
        self.values.chunks(self.ncols)
    }

    pub fn iter_mut_rows(&mut self) -> impl Iterator<Item = &mut [T]> {
        self.values.chunks_mut(self.ncols)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn as_flat_slice(&self) -> &[T] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array2d_new() -> Result<()> {
        let array = Array2D::try_new(vec![vec![1, 2, 3], vec![4, 5, 6]])?;

        assert_eq!(array.nrows(), 2);
        assert_eq!(array.ncols(), 3);
        // Values in the same row are adjacent.
        assert_eq!(array.as_flat_slice(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(array.get_row(1), Some([4, 5, 6].as_ref()));
        assert_eq!(array.get_row(2), None);

        Ok(())
    }

    #[test]
    fn test_array2d_error_handling() {
        // Inconsistent row lengths.
        let invalid = vec![vec![1, 2, 3], vec![4, 5]];
        assert!(Array2D::try_new(&invalid).is_err());

        // Empty array.
        let empty: Vec<Vec<i32>> = vec![];
        assert!(Array2D::try_new(&empty).is_err());

        // Flat vector of the wrong size.
        assert!(Array2D::from_flat_vector(vec![1, 2, 3], 2, 2).is_err());
    }

    #[test]
    fn test_array2d_mutation() {
        let mut array = Array2D::new_filled(2, 3, 0.0f32);
        array
            .get_row_mut(1)
            .unwrap()
            .copy_from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(array.as_flat_slice(), &[0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);

        for row in array.iter_mut_rows() {
            for v in row.iter_mut() {
                *v += 1.0;
            }
        }
        assert_eq!(array.get_row(0), Some([1.0f32, 1.0, 1.0].as_ref()));
    }
}
