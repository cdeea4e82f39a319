//! Utility functions for Python and Rust interoperation.

/// Conversions between ndarray and numpy arrays.
pub mod ndarray {
    use ::ndarray::{Array1, Array2};
    use anyhow::Result;
    use num_traits::cast::AsPrimitive;
    use numpy::{Element, PyArray1, PyArray2};
    use pyo3::{IntoPy, PyAny, PyObject, Python};

    /// Converts a 1-dimensional Python array into an ndarray.
    pub fn pyany_to_array1<T1, T2>(obj: &PyAny) -> Result<Array1<T2>>
    where
        T1: Element + AsPrimitive<T2>,
        T2: 'static + Copy,
    {
        let arr: &PyArray1<T1> = obj.extract()?;
        Ok(arr.to_owned_array().mapv(|elem| elem.as_()))
    }

    /// Converts a 1-dimensional ndarray into a numpy array.
    ///
    /// The type of the output array is `f64`, which is what the Python side of the
    /// maze environments works with.
    pub fn array1_to_pyobj(py: Python, arr: &Array1<f32>) -> PyObject {
        let arr = arr.mapv(f64::from);
        PyArray1::from_array(py, &arr).into_py(py)
    }

    /// Stacks rows of equal length into a 2-dimensional numpy array of `f64`.
    pub fn rows_to_pyobj(py: Python, rows: &[Vec<f32>]) -> PyObject {
        let ncols = rows.first().map(|row| row.len()).unwrap_or(0);
        let mut arr = Array2::<f64>::zeros((rows.len(), ncols));
        for (i, row) in rows.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                arr[[i, j]] = f64::from(*v);
            }
        }
        PyArray2::from_array(py, &arr).into_py(py)
    }
}
