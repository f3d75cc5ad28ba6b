//! Property checks that hold for every translation, run against a fixed
//! set of inputs plus the case corpus.
//!
//! Run with: cargo test --test invariants

use fl_transpiler::units::{translate_file, translate_files};
use fl_transpiler::{CompileError, LexMode, Options, Pipeline, Translation, translate};
use libtest_mimic::{Arguments, Failed, Trial};
use std::path::{Path, PathBuf};

const SAMPLES: &[(&str, &str)] = &[
    ("empty", ""),
    ("single", "class Foo { int bar() { cout x; } }"),
    (
        "sections",
        "class Door {\npublic:\n    void open() { angle = 90; }\nprivate:\n    bool locked() { return bolt; }\n}\n",
    ),
    (
        "two_types",
        "import gl\nstruct Point { float x() { return px; } }\nclass Shape { void draw() { gl_draw(p); } int sides() { return n; } }\n",
    ),
    (
        "parameters",
        "class Config {\n    void set(int a, string b) { key = b; }\n    map lookup(vector keys) { return table; }\n}\n",
    ),
    (
        "nested_blocks",
        "class Loop { void run() { while (running) { if (i) { cout i; } else { i = next; } } } }",
    ),
];

const UNCLOSED: &[&str] = &[
    "class A {",
    "class A { void f() {",
    "class A { void f() { cout x;",
    "import gl class A { int g() { if (x) { y = x; }",
];

fn translate_sample(source: &str) -> Result<Translation, Failed> {
    translate(source, "Sample").map_err(|e| Failed::from(e.to_string()))
}

/// `(return type, name, parameters)` of a member
type Signature = (String, String, String);

/// Split `<return type> <name>(<params>)` into a signature. Constructors
/// and destructors have no return type and yield `None`.
fn signature(text: &str) -> Option<Signature> {
    let (head, params) = text.split_once('(')?;
    let params = params.strip_suffix(')')?;
    let (return_type, name) = head.trim().rsplit_once(' ')?;
    Some((return_type.to_string(), name.to_string(), params.to_string()))
}

/// Member signatures in the order they are declared in the header
fn declared_members(header: &str) -> Vec<Signature> {
    header
        .lines()
        .filter(|line| line.starts_with("    "))
        .filter_map(|line| signature(line.strip_suffix(';')?))
        .collect()
}

/// Member signatures in the order they are defined in the source, with
/// the owner qualification removed
fn defined_members(source: &str) -> Vec<Signature> {
    source
        .lines()
        .filter(|line| !line.starts_with(' '))
        .filter_map(|line| {
            let (return_type, qualified, params) = signature(line.strip_suffix(" {")?)?;
            let (_, name) = qualified.rsplit_once("::")?;
            Some((return_type, name.to_string(), params))
        })
        .collect()
}

/// Every member declared in the header is defined in the source with the
/// same signature, in the same order
fn check_declaration_pairing(source: &str) -> Result<(), Failed> {
    let unit = translate_sample(source)?;
    let declared = declared_members(&unit.header);
    let defined = defined_members(&unit.source);
    if declared != defined {
        return Err(format!("declared {:?} but defined {:?}", declared, defined).into());
    }

    let names: Vec<&str> = declared.iter().map(|(_, name, _)| name.as_str()).collect();
    let summarized: Vec<&str> = unit
        .types
        .iter()
        .flat_map(|t| t.members.iter().map(String::as_str))
        .collect();
    if summarized != names {
        return Err(format!("type summaries list {:?}, header declares {:?}", summarized, names).into());
    }
    Ok(())
}

/// Every type gets one constructor and one destructor
fn check_lifecycle_pairs(source: &str) -> Result<(), Failed> {
    let unit = translate_sample(source)?;
    for summary in &unit.types {
        let name = &summary.name;
        let declared = format!("    {}();", name);
        let constructor = format!("{name}::{name}() {{");
        let destructor = format!("{name}::~{name}() {{");
        for (text, needle) in [(&unit.header, &declared), (&unit.source, &constructor), (&unit.source, &destructor)] {
            if text.matches(needle.as_str()).count() != 1 {
                return Err(format!("expected exactly one '{}' for type {}", needle, name).into());
            }
        }
    }
    Ok(())
}

/// Braces in both output files balance
fn check_balanced_braces(source: &str) -> Result<(), Failed> {
    let unit = translate_sample(source)?;
    for (label, text) in [("header", &unit.header), ("source", &unit.source)] {
        let opens = text.matches('{').count();
        let closes = text.matches('}').count();
        if opens != closes {
            return Err(format!("{}: {} '{{' vs {} '}}'\n{}", label, opens, closes, text).into());
        }
    }
    Ok(())
}

/// Repeating an import never adds a second include
fn check_import_idempotence() -> Result<(), Failed> {
    let once = translate_sample("import math\nclass A { }")?;
    let thrice = translate_sample("import math\nimport math\nclass A { }\nimport math")?;
    if once.source != thrice.source || thrice.source.matches("#include <math.h>").count() != 1 {
        return Err(format!("repeated import changed the output:\n{}", thrice.source).into());
    }
    if thrice.imports != ["math"] {
        return Err(format!("imports recorded as {:?}", thrice.imports).into());
    }
    Ok(())
}

/// Empty input still yields a guarded header and a source that includes it
fn check_empty_input() -> Result<(), Failed> {
    let unit = translate("", "Blank").map_err(|e| Failed::from(e.to_string()))?;
    if !unit.header.starts_with("#ifndef Blank_H\n#define Blank_H\n") || !unit.header.ends_with("#endif\n") {
        return Err(format!("unexpected header:\n{}", unit.header).into());
    }
    if unit.source != "#include \"Blank.h\"\n" {
        return Err(format!("unexpected source:\n{}", unit.source).into());
    }
    if !unit.types.is_empty() || !unit.imports.is_empty() {
        return Err("empty input produced metadata".into());
    }
    Ok(())
}

/// Unclosed input is a structural error, never partial text
fn check_unclosed(source: &str) -> Result<(), Failed> {
    match translate(source, "Sample") {
        Ok(unit) => Err(format!("translated unclosed input:\n{}", unit.source).into()),
        Err(CompileError::Structural(_)) => Ok(()),
        Err(other) => Err(format!("expected a structural error, got {}", other).into()),
    }
}

/// Translating the same text twice gives the same bytes
fn check_deterministic(source: &str) -> Result<(), Failed> {
    let pipeline = Pipeline::standard();
    let options = Options::for_unit("Sample");
    let first = pipeline.compile(source, &options).map_err(|e| Failed::from(e.to_string()))?;
    let second = pipeline.compile(source, &options).map_err(|e| Failed::from(e.to_string()))?;
    if first != second {
        return Err("repeated translation differed".into());
    }
    Ok(())
}

fn corpus() -> Vec<PathBuf> {
    let pattern = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/cases/**/*.fl");
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .expect("valid glob pattern")
        .filter_map(Result::ok)
        .collect();
    files.sort();
    files
}

/// Concurrent translation of the corpus matches one-at-a-time translation
fn check_concurrent_matches_sequential() -> Result<(), Failed> {
    let paths = corpus();
    if paths.is_empty() {
        return Err("no cases found".into());
    }

    let concurrent = translate_files(&paths, LexMode::Permissive);
    if concurrent.len() != paths.len() {
        return Err(format!("{} reports for {} files", concurrent.len(), paths.len()).into());
    }

    for (path, report) in paths.iter().zip(&concurrent) {
        if &report.path != path {
            return Err(format!("report for {} out of order", report.path.display()).into());
        }
        let sequential = translate_file(path, LexMode::Permissive);
        let same = match (&report.result, &sequential.result) {
            (Ok(a), Ok(b)) => a == b,
            (Err(a), Err(b)) => a.to_string() == b.to_string(),
            _ => false,
        };
        if !same {
            return Err(format!("{} differs between concurrent and sequential runs", path.display()).into());
        }
    }
    Ok(())
}

fn main() {
    let args = Arguments::from_args();
    let mut trials = Vec::new();

    for (name, source) in SAMPLES {
        trials.push(Trial::test(format!("pairing::{name}"), move || check_declaration_pairing(source)));
        trials.push(Trial::test(format!("lifecycle::{name}"), move || check_lifecycle_pairs(source)));
        trials.push(Trial::test(format!("braces::{name}"), move || check_balanced_braces(source)));
        trials.push(Trial::test(format!("deterministic::{name}"), move || check_deterministic(source)));
    }

    for (i, source) in UNCLOSED.iter().enumerate() {
        trials.push(Trial::test(format!("unclosed::{i}"), move || check_unclosed(source)));
    }

    trials.push(Trial::test("imports::idempotent", check_import_idempotence));
    trials.push(Trial::test("empty::round_trip", check_empty_input));
    trials.push(Trial::test("concurrency::matches_sequential", check_concurrent_matches_sequential));

    libtest_mimic::run(&args, trials).exit();
}
