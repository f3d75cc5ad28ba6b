use clap::{Parser, Subcommand};
use fl_transpiler::build::{BuildCollaborator, BuildError, BuildOptions, Platform, Toolchain};
use fl_transpiler::units::{self, UnitReport};
use fl_transpiler::{CompileError, LexMode, Options, Pipeline};
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "flc")]
#[command(about = "FL compiler - translates .fl classes to C++ and builds them")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate C++ from .fl files
    Generate {
        /// Path to .fl file or directory
        #[arg(required_unless_present = "stdin")]
        file: Option<PathBuf>,

        /// Read from stdin
        #[arg(long)]
        stdin: bool,

        /// Unit name for stdin input
        #[arg(long, default_value = "main")]
        name: String,

        /// Directory for generated .h/.cpp files
        #[arg(long, default_value = "bin", conflicts_with = "stdin")]
        out_dir: PathBuf,

        /// Fail on characters outside the language instead of dropping them
        #[arg(long)]
        strict: bool,

        /// Print translations and errors as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// Generate C++ from .fl files and compile them into an executable
    Build {
        /// Path to .fl file or directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Directory for generated files and the executable
        #[arg(long, default_value = "bin")]
        out_dir: PathBuf,

        /// Fail on characters outside the language instead of dropping them
        #[arg(long)]
        strict: bool,

        /// C++ compiler driver
        #[arg(long, default_value = "g++")]
        compiler: String,

        /// Linker profile: linux, macos or windows (default: host)
        #[arg(long)]
        platform: Option<Platform>,

        /// Executable name
        #[arg(long, short, default_value = "game")]
        output: String,

        /// Seconds before the compiler is killed (0 waits forever)
        #[arg(long, default_value_t = 300)]
        timeout: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { file, stdin, name, out_dir, strict, json } => {
            let lex_mode = lex_mode(strict);
            if stdin {
                generate_stdin(&name, lex_mode, json);
            } else if let Some(path) = file {
                generate_path(&path, &out_dir, lex_mode, json);
            } else {
                eprintln!("Error: provide a file/directory or use --stdin");
                std::process::exit(1);
            }
        }
        Commands::Build { path, out_dir, strict, compiler, platform, output, timeout } => {
            let options = BuildOptions {
                out_dir,
                compiler,
                platform: platform.unwrap_or_else(Platform::host),
                executable: output,
                timeout: (timeout > 0).then(|| Duration::from_secs(timeout)),
            };
            build_path(&path, lex_mode(strict), &options);
        }
    }
}

fn lex_mode(strict: bool) -> LexMode {
    if strict { LexMode::Strict } else { LexMode::Permissive }
}

fn generate_stdin(name: &str, lex_mode: LexMode, json_output: bool) {
    let mut source = String::new();
    if let Err(err) = io::stdin().read_to_string(&mut source) {
        eprintln!("Error: failed to read stdin: {}", err);
        std::process::exit(1);
    }

    let options = Options {
        unit_name: name.to_string(),
        lex_mode,
    };

    match Pipeline::standard().compile(&source, &options) {
        Ok(unit) if json_output => match serde_json::to_string(&unit) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("Error: {}", err);
                std::process::exit(1);
            }
        },
        Ok(unit) => {
            println!("// {}.h", unit.unit);
            print!("{}", unit.header);
            println!();
            println!("// {}.cpp", unit.unit);
            print!("{}", unit.source);
        }
        Err(err) => {
            if json_output {
                println!("{}", error_json(&err));
            } else {
                print_error(&err, &source, "<stdin>");
            }
            std::process::exit(1);
        }
    }
}

/// Translate every unit under `path`, one report per unique unit
fn translate_path(path: &Path, lex_mode: LexMode) -> Vec<UnitReport> {
    if !path.exists() {
        eprintln!("Error: {} does not exist", path.display());
        std::process::exit(1);
    }
    if path.is_file() && !units::is_source_file(path) {
        eprintln!("Error: {} is not a .{} file", path.display(), units::SOURCE_EXTENSION);
        std::process::exit(1);
    }

    let (paths, duplicates) = units::dedupe(units::discover(path));
    for duplicate in &duplicates {
        print_warning(&format!(
            "skipping {}: another unit is already named '{}'",
            duplicate.display(),
            units::unit_name(duplicate)
        ));
    }

    if paths.is_empty() {
        eprintln!("No .{} files found in {}", units::SOURCE_EXTENSION, path.display());
        std::process::exit(1);
    }

    units::translate_files(&paths, lex_mode)
}

fn generate_path(path: &Path, out_dir: &Path, lex_mode: LexMode, json_output: bool) {
    let start = Instant::now();
    let reports = translate_path(path, lex_mode);

    if let Err(err) = units::prepare_output_dir(out_dir) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    let mut entries = Vec::new();
    let mut written = 0;
    let mut failed = 0;
    for UnitReport { path, source, result } in reports {
        let unit = match result {
            Ok(unit) => unit,
            Err(err) => {
                failed += 1;
                if json_output {
                    let mut entry = error_json(&err);
                    entry["path"] = serde_json::json!(path.display().to_string());
                    entries.push(entry);
                } else {
                    print_error(&err, source.as_deref().unwrap_or(""), &path.display().to_string());
                }
                continue;
            }
        };

        match units::write_unit(out_dir, &unit) {
            Ok((header, source)) => {
                print_generated(&header.display().to_string());
                print_generated(&source.display().to_string());
                written += 1;
            }
            Err(err) => {
                failed += 1;
                eprintln!("Error: {}", err);
                continue;
            }
        }

        if json_output {
            match serde_json::to_value(&unit) {
                Ok(entry) => entries.push(entry),
                Err(err) => eprintln!("Error: {}", err),
            }
        }
    }

    if json_output {
        println!("{}", serde_json::Value::Array(entries));
    }

    print_summary(written, failed, start.elapsed());
    if failed > 0 {
        std::process::exit(1);
    }
}

fn build_path(path: &Path, lex_mode: LexMode, options: &BuildOptions) {
    let start = Instant::now();

    let mut translated = Vec::new();
    let mut failed = 0;
    for UnitReport { path, source, result } in translate_path(path, lex_mode) {
        match result {
            Ok(unit) => translated.push(unit),
            Err(err) => {
                failed += 1;
                print_error(&err, source.as_deref().unwrap_or(""), &path.display().to_string());
            }
        }
    }

    if failed > 0 {
        print_summary(translated.len(), failed, start.elapsed());
        eprintln!("Not compiling: {} unit(s) failed to translate", failed);
        std::process::exit(1);
    }

    eprintln!("Compiling generated C++ files ({} for {})...", options.compiler, options.platform);
    match Toolchain::new().build(&translated, options) {
        Ok(outcome) => {
            if !outcome.diagnostics.is_empty() {
                eprintln!("{}", outcome.diagnostics);
            }
            print_summary(translated.len(), 0, start.elapsed());
            eprintln!("Compilation finished! Executable saved in {}", outcome.executable.display());
        }
        Err(err) => {
            print_build_error(&err);
            std::process::exit(1);
        }
    }
}

fn error_json(err: &CompileError) -> serde_json::Value {
    match err.parse_error() {
        Some(parse) => serde_json::json!({
            "error": parse.kind,
            "title": parse.kind.as_str(),
            "message": parse.message,
            "line": parse.span.start.line + 1,
            "col": parse.span.start.col + 1,
        }),
        None => serde_json::json!({
            "error": "Io",
            "message": err.to_string(),
        }),
    }
}

fn print_error(err: &CompileError, source: &str, filename: &str) {
    if io::stderr().is_terminal() {
        eprint!("{}", err.render_color(source, filename));
    } else {
        eprint!("{}", err.render(source, filename));
    }
}

fn print_build_error(err: &BuildError) {
    if io::stderr().is_terminal() {
        eprintln!("\x1b[1;31merror\x1b[0m: \x1b[1m{}\x1b[0m", err);
    } else {
        eprintln!("error: {}", err);
    }
    if let Some(diagnostics) = err.diagnostics().filter(|d| !d.is_empty()) {
        eprintln!("{}", diagnostics);
    }
}

fn print_warning(message: &str) {
    if io::stderr().is_terminal() {
        eprintln!("  \x1b[33m!\x1b[0m {}", message);
    } else {
        eprintln!("  ! {}", message);
    }
}

fn print_generated(path: &str) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("  \x1b[32m✓\x1b[0m {}", path);
    } else {
        eprintln!("  ✓ {}", path);
    }
}

fn print_summary(count: usize, failed: usize, elapsed: Duration) {
    let is_tty = io::stderr().is_terminal();
    let time_str = format_duration(elapsed);
    let units_word = if count == 1 { "unit" } else { "units" };
    let failed_str = if failed > 0 { format!(", {} failed", failed) } else { String::new() };

    if is_tty {
        eprintln!("\n\x1b[1m✨ Generated {} {}{} in {}\x1b[0m", count, units_word, failed_str, time_str);
    } else {
        eprintln!("\n✨ Generated {} {}{} in {}", count, units_word, failed_str, time_str);
    }
}

fn format_duration(d: Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
