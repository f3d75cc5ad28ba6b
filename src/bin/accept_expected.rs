//! Binary to generate/update .expected.h, .expected.cpp and .expected.err files
//!
//! Usage:
//!   cargo run --bin accept_expected            # Update all
//!   cargo run --bin accept_expected -- basic   # Update only cases matching "basic"

use fl_transpiler::{Options, Pipeline};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

fn main() {
    let filter: Option<String> = std::env::args().nth(1);
    let cases_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("cases");

    let mut updated = 0;
    let mut skipped = 0;

    for entry in WalkDir::new(&cases_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|s| s == "fl"))
    {
        let path = entry.path();

        if let Some(ref f) = filter {
            if !path.to_string_lossy().contains(f.as_str()) {
                skipped += 1;
                continue;
            }
        }

        process_file(path);
        updated += 1;
    }

    println!("Updated {} cases, skipped {}", updated, skipped);
}

fn write(path: &Path, contents: &str) {
    if let Err(e) = fs::write(path, contents) {
        eprintln!("Failed to write {:?}: {}", path, e);
    } else {
        println!("  wrote {}", path.display());
    }
}

fn remove_stale(path: &Path) {
    if path.exists() {
        let _ = fs::remove_file(path);
    }
}

fn process_file(path: &Path) {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {:?}: {}", path, e);
            return;
        }
    };

    let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("main");
    let is_error_case = path
        .parent()
        .and_then(|p| p.file_name())
        .is_some_and(|dir| dir == "errors");

    match Pipeline::standard().compile(&source, &Options::for_unit(name)) {
        Ok(unit) => {
            if is_error_case {
                eprintln!("ERROR: {:?} is in errors/ but translated successfully", path);
                return;
            }
            write(&path.with_extension("expected.h"), &unit.header);
            write(&path.with_extension("expected.cpp"), &unit.source);
            remove_stale(&path.with_extension("expected.err"));
        }
        Err(e) => {
            if is_error_case {
                let filename = path.file_name().and_then(|s| s.to_str()).unwrap_or("unknown");
                write(&path.with_extension("expected.err"), &e.render(&source, filename));
            } else {
                eprintln!("ERROR: {:?} failed to translate but is not in errors/: {}", path, e);
            }
        }
    }
}
