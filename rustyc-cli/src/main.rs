use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use rustyc_core::{
    CompileOptions, CompiledUnit, CoreError, DiagnosticEmitter, Emit, FileId, SourceFile,
    collect_source_files, compile_source,
};
use tracing_subscriber::EnvFilter;
use wasmi::{Engine, Linker, Module, Store};

/// Compiles RustyC source files.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Source files or directories; directories are searched for `*.rs` files
    #[arg(required = true, value_name = "PATHS")]
    paths: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t = EmitKind::Check, help = "What to produce")]
    emit: EmitKind,

    #[arg(
        short,
        long,
        value_name = "DIR",
        help = "Directory for .wasm output (defaults to next to each input)"
    )]
    out_dir: Option<PathBuf>,

    #[arg(long, help = "Run exported `main` of each module; implies --emit wasm")]
    run: bool,

    #[arg(long, help = "Print diagnostics as plain `file:line:col` lines")]
    plain: bool,

    #[arg(short, long, action = ArgAction::Count, help = "Raise the log level (-v, -vv, -vvv)")]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum EmitKind {
    Check,
    Wasm,
    Ast,
}

impl From<EmitKind> for Emit {
    fn from(kind: EmitKind) -> Self {
        match kind {
            EmitKind::Check => Emit::Check,
            EmitKind::Wasm => Emit::Wasm,
            EmitKind::Ast => Emit::Ast,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    println!("RustyC v{}", env!("CARGO_PKG_VERSION"));
    execute(cli)
}

/// `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn execute(cli: Cli) -> Result<()> {
    let inputs = collect_source_files(&cli.paths);
    let emit = if cli.run {
        Emit::Wasm
    } else {
        cli.emit.into()
    };
    let options = CompileOptions { emit };

    let total = inputs.len();
    let mut failed = 0usize;
    for (index, input) in inputs.into_iter().enumerate() {
        let result = match input {
            Ok(path) => {
                tracing::info!(path = %path.display(), "compiling");
                process_file(&cli, &options, FileId(index as u32), &path)
            }
            Err(err) => Err(anyhow::Error::new(err).context("failed to collect source files")),
        };
        if let Err(err) = result {
            failed += 1;
            eprintln!("error: {err:#}");
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {total} file(s) failed to compile");
    }
    Ok(())
}

fn process_file(cli: &Cli, options: &CompileOptions, file: FileId, path: &Path) -> Result<()> {
    let name = path.display().to_string();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read input file {name}"))?;

    let unit = match compile_source(file, &name, &text, options) {
        Ok(unit) => unit,
        Err(err) => {
            if let Some(span) = err.span() {
                let source = SourceFile::new(file, name.as_str(), text.as_str());
                eprintln!("{name}:{}: error: {err}", source.line_col(span.start));
            }
            return Err(err).with_context(|| format!("failed to compile {name}"));
        }
    };

    report_diagnostics(cli, &unit)?;
    unit.ensure_success()
        .with_context(|| format!("failed to compile {name}"))?;

    match options.emit {
        Emit::Check => {}
        Emit::Ast => println!("{}", unit.ast_string()),
        Emit::Wasm => {
            let wasm = unit.wasm.as_deref().ok_or_else(|| {
                CoreError::Codegen(format!("no wasm module was produced for {name}"))
            })?;
            let output = output_path(cli.out_dir.as_deref(), path);
            write_output(&output, wasm)?;
            if cli.run {
                let result = run_wasm(wasm)
                    .with_context(|| format!("failed to run {}", output.display()))?;
                println!("Program exited with {result}");
            }
        }
    }
    Ok(())
}

fn report_diagnostics(cli: &Cli, unit: &CompiledUnit) -> Result<()> {
    let emitter = DiagnosticEmitter::new(&unit.source).with_color(io::stderr().is_terminal());
    for diagnostic in &unit.diagnostics {
        if cli.plain {
            eprintln!("{}", diagnostic.render_plain(&unit.source));
        } else {
            emitter
                .emit(diagnostic)
                .context("failed to write diagnostic")?;
        }
    }
    Ok(())
}

fn output_path(out_dir: Option<&Path>, input: &Path) -> PathBuf {
    match out_dir {
        Some(dir) => {
            let stem = input.file_stem().unwrap_or(input.as_os_str());
            dir.join(stem).with_extension("wasm")
        }
        None => input.with_extension("wasm"),
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    fs::write(path, bytes)
        .with_context(|| format!("failed to write output file {}", path.display()))?;
    Ok(())
}

/// Runs exported `main`. A `main` without a result exits with 0.
fn run_wasm(wasm: &[u8]) -> Result<String> {
    let engine = Engine::default();
    let module = Module::new(&engine, wasm).context("failed to compile wasm module")?;
    let linker = Linker::new(&engine);
    let mut store = Store::new(&engine, ());
    let instance = linker
        .instantiate_and_start(&mut store, &module)
        .context("failed to instantiate module")?;

    if let Ok(main) = instance.get_typed_func::<(), i32>(&store, "main") {
        let result = main.call(&mut store, ()).context("failed to execute main")?;
        return Ok(result.to_string());
    }
    if let Ok(main) = instance.get_typed_func::<(), i64>(&store, "main") {
        let result = main.call(&mut store, ()).context("failed to execute main")?;
        return Ok(result.to_string());
    }
    let main = instance
        .get_typed_func::<(), ()>(&store, "main")
        .context("exported main function missing or has wrong type")?;
    main.call(&mut store, ()).context("failed to execute main")?;
    Ok("0".to_string())
}
