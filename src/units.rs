//! Translation units on disk: discovery, per-file translation and output.

use crate::{CompileError, LexMode, Options, Pipeline, Translation};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use walkdir::WalkDir;

/// Extension of FL source files
pub const SOURCE_EXTENSION: &str = "fl";

/// Outcome of translating one file
#[derive(Debug)]
pub struct UnitReport {
    pub path: PathBuf,
    /// Source text, when the file could be read (used to render errors)
    pub source: Option<String>,
    pub result: Result<Translation, CompileError>,
}

/// Unit name for a source path: its file stem
pub fn unit_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("main")
        .to_string()
}

pub fn is_source_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}

/// All `.fl` files under `root`, sorted. A file path is returned as is.
pub fn discover(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_source_file(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// Split paths into ones with a unique unit name and the later duplicates.
/// Two files with the same stem would overwrite each other's output.
pub fn dedupe(paths: Vec<PathBuf>) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    let mut duplicates = Vec::new();

    for path in paths {
        if seen.insert(unit_name(&path)) {
            unique.push(path);
        } else {
            duplicates.push(path);
        }
    }

    (unique, duplicates)
}

/// Read and translate one file
pub fn translate_file(path: &Path, lex_mode: LexMode) -> UnitReport {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            return UnitReport {
                path: path.to_path_buf(),
                source: None,
                result: Err(CompileError::io(path, err)),
            };
        }
    };

    let options = Options {
        unit_name: unit_name(path),
        lex_mode,
    };
    let result = Pipeline::standard().compile(&source, &options);

    UnitReport {
        path: path.to_path_buf(),
        source: Some(source),
        result,
    }
}

/// Translate files concurrently, one isolated pipeline per file and at
/// most `available_parallelism()` threads at a time.
/// Reports come back in the order of `paths`.
pub fn translate_files(paths: &[PathBuf], lex_mode: LexMode) -> Vec<UnitReport> {
    let workers = thread::available_parallelism().map_or(1, |n| n.get());
    let mut reports = Vec::with_capacity(paths.len());

    for batch in paths.chunks(workers) {
        thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter()
                .map(|path| (path, scope.spawn(move || translate_file(path, lex_mode))))
                .collect();

            reports.extend(handles.into_iter().map(|(path, handle)| {
                handle.join().unwrap_or_else(|_| UnitReport {
                    path: path.clone(),
                    source: None,
                    result: Err(CompileError::io(
                        path,
                        std::io::Error::other("translation thread panicked"),
                    )),
                })
            }));
        });
    }

    reports
}

/// Create the output directory; an existing directory is fine
pub fn prepare_output_dir(out_dir: &Path) -> Result<(), CompileError> {
    fs::create_dir_all(out_dir).map_err(|err| CompileError::io(out_dir, err))
}

/// Write `<unit>.h` and `<unit>.cpp` into `out_dir`
pub fn write_unit(out_dir: &Path, unit: &Translation) -> Result<(PathBuf, PathBuf), CompileError> {
    let header_path = out_dir.join(format!("{}.h", unit.unit));
    let source_path = out_dir.join(format!("{}.cpp", unit.unit));

    fs::write(&header_path, &unit.header).map_err(|err| CompileError::io(&header_path, err))?;
    fs::write(&source_path, &unit.source).map_err(|err| CompileError::io(&source_path, err))?;

    Ok((header_path, source_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("flc-units-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_unit_name() {
        assert_eq!(unit_name(Path::new("game/Player.fl")), "Player");
        assert_eq!(unit_name(Path::new("Enemy.v2.fl")), "Enemy.v2");
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = scratch_dir("discover");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("b.fl"), "").unwrap();
        fs::write(dir.join("a.fl"), "").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();
        fs::write(dir.join("nested/c.fl"), "").unwrap();

        let found = discover(&dir);
        assert_eq!(found, vec![dir.join("a.fl"), dir.join("b.fl"), dir.join("nested/c.fl")]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let (unique, duplicates) = dedupe(vec![
            PathBuf::from("a/Player.fl"),
            PathBuf::from("b/Player.fl"),
            PathBuf::from("a/Enemy.fl"),
        ]);
        assert_eq!(unique, [PathBuf::from("a/Player.fl"), PathBuf::from("a/Enemy.fl")]);
        assert_eq!(duplicates, [PathBuf::from("b/Player.fl")]);
    }

    #[test]
    fn test_translate_files_keeps_order_across_batches() {
        let dir = scratch_dir("batches");
        let workers = thread::available_parallelism().map_or(1, |n| n.get());
        let paths: Vec<PathBuf> = (0..workers * 2 + 1)
            .map(|i| {
                let path = dir.join(format!("Unit{i}.fl"));
                fs::write(&path, format!("class Unit{i} {{ }}")).unwrap();
                path
            })
            .collect();

        let reports = translate_files(&paths, LexMode::Permissive);
        assert_eq!(reports.len(), paths.len());
        for (i, (path, report)) in paths.iter().zip(&reports).enumerate() {
            assert_eq!(&report.path, path);
            assert_eq!(report.result.as_ref().unwrap().unit, format!("Unit{i}"));
        }

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let report = translate_file(Path::new("/definitely/not/here.fl"), LexMode::Permissive);
        assert!(report.source.is_none());
        assert!(matches!(report.result, Err(CompileError::Io { .. })));
    }

    #[test]
    fn test_write_unit_and_idempotent_dir() {
        let dir = scratch_dir("write").join("bin");
        prepare_output_dir(&dir).unwrap();
        prepare_output_dir(&dir).unwrap();

        let unit = crate::translate("class A { }", "A").unwrap();
        let (header, source) = write_unit(&dir, &unit).unwrap();
        assert_eq!(fs::read_to_string(header).unwrap(), unit.header);
        assert_eq!(fs::read_to_string(source).unwrap(), unit.source);

        fs::remove_dir_all(dir.parent().unwrap()).unwrap();
    }
}
