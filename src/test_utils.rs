#[cfg(feature = "gdal")]
use std::path::{Path, PathBuf};

/// A struct that contains a temporary directory and a path to a file in that directory.
#[cfg(feature = "gdal")]
pub struct TempFixture {
    _temp_dir: tempfile::TempDir,
    temp_path: PathBuf,
}

#[cfg(feature = "gdal")]
impl TempFixture {
    /// Creates a temporary directory and path to a non-existent file with given `name`.
    /// Useful for writing results to during testing
    ///
    /// Returns the struct `TempFixture` that contains the temp dir (for clean-up on `drop`)
    /// as well as the empty file path.
    pub fn empty(name: &str) -> Self {
        let _temp_dir = tempfile::tempdir().unwrap();
        let temp_path = _temp_dir.path().join(name);
        Self {
            _temp_dir,
            temp_path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.temp_path
    }
}

#[cfg(feature = "gdal")]
impl AsRef<Path> for TempFixture {
    fn as_ref(&self) -> &Path {
        self.path()
    }
}

/// Scoped value for temporarily suppressing thread-local GDAL log messages.
///
/// Useful for tests that expect GDAL errors and want to keep the output log clean
/// of distracting yet expected error messages.
#[cfg(feature = "gdal")]
pub(crate) struct SuppressGDALErrorLog {
    // Make !Sync and !Send, and force use of `new`.
    _private: std::marker::PhantomData<*mut std::ffi::c_void>,
}

#[cfg(feature = "gdal")]
impl SuppressGDALErrorLog {
    pub(crate) fn new() -> Self {
        unsafe { gdal_sys::CPLPushErrorHandler(Some(gdal_sys::CPLQuietErrorHandler)) };
        SuppressGDALErrorLog {
            _private: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "gdal")]
impl Drop for SuppressGDALErrorLog {
    fn drop(&mut self) {
        unsafe { gdal_sys::CPLPopErrorHandler() };
    }
}

#[macro_export]
macro_rules! assert_near {
    ($left:expr, $right:expr) => {
        assert_near!($left, $right, epsilon = f64::EPSILON)
    };
    ($left:expr, $right:expr, epsilon = $ep:expr) => {
        assert!(
            ($left - $right).abs() <= $ep,
            "|{} - {}| = {} is greater than epsilon {:.4e}",
            $left,
            $right,
            ($left - $right).abs(),
            $ep
        )
    };
    (Rect, $left:expr, $right:expr, epsilon = $ep:expr) => {
        assert_near!($left.min().x, $right.min().x, epsilon = $ep);
        assert_near!($left.min().y, $right.min().y, epsilon = $ep);
        assert_near!($left.max().x, $right.max().x, epsilon = $ep);
        assert_near!($left.max().y, $right.max().y, epsilon = $ep);
    };
}
