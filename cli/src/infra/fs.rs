//! Filesystem infrastructure: implements the `LocalFs` port.

use std::path::Path;

/// Production filesystem implementation of `LocalFs`.
pub struct LocalFs;

impl crate::application::ports::LocalFs for LocalFs {
    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }
}
