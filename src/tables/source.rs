//! Shared, lazily loaded table bundle

use super::loader::{load_or_default, tables_dir_from_env};
use super::TableBundle;
use log::debug;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

/// Loads the tables once on first use and hands out the same bundle afterwards.
///
/// Safe to share across threads; concurrent first callers all observe a
/// single load.
#[derive(Debug, Default)]
pub struct TableSource {
    dir: Option<PathBuf>,
    bundle: OnceLock<Arc<TableBundle>>,
}

impl TableSource {
    /// Tables read from `dir` on first use, falling back to the built-in set
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        TableSource { dir: Some(dir.into()), bundle: OnceLock::new() }
    }

    /// Tables read from the directory named by `QUOTE_TABLES_DIR`, or `data/tables`
    pub fn from_env() -> Self {
        Self::from_dir(tables_dir_from_env())
    }

    /// Only the built-in dataset, never touching the filesystem
    pub fn builtin() -> Self {
        TableSource { dir: None, bundle: OnceLock::new() }
    }

    /// A source already holding `bundle`
    pub fn with_bundle(bundle: TableBundle) -> Self {
        TableSource { dir: None, bundle: OnceLock::from(Arc::new(bundle)) }
    }

    pub fn bundle(&self) -> Arc<TableBundle> {
        self.bundle
            .get_or_init(|| {
                let bundle = match &self.dir {
                    Some(dir) => load_or_default(dir),
                    None => {
                        debug!("Using built-in tables");
                        TableBundle::default_bundle()
                    }
                };
                Arc::new(bundle)
            })
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.bundle.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concurrent_first_use_loads_once() {
        let source = TableSource::from_dir("data/tables");
        assert!(!source.is_loaded());

        let bundles: Vec<Arc<TableBundle>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| source.bundle())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(source.is_loaded());
        assert!(bundles.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    }

    #[test]
    fn test_missing_dir_serves_builtin() {
        let source = TableSource::from_dir("no/such/dir");
        assert_eq!(*source.bundle(), TableBundle::default_bundle());
    }

    #[test]
    fn test_with_bundle_is_preloaded() {
        let mut tables = TableBundle::default_bundle();
        tables.addons = None;
        let source = TableSource::with_bundle(tables);
        assert!(source.is_loaded());
        assert!(source.bundle().addons.is_none());
    }
}
