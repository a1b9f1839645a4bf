//! Generates Unicode classification functions (`is_letter`, `is_whitespace`, ...) for each code
//! unit type from a copy of the Unicode Character Database.

mod catalog;
mod cpp;
mod generate;
mod rust_module;

use generate::Generator;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, Level};
use ucd_predicates::emit::cpp::CppOptions;
use ucd_predicates::{CodePointCache, CodeUnit, Compiler, Config, UcdSupplier, UnicodeDatabase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    Cpp,
    Rust,
}

#[derive(Parser, Debug)]
#[command(name = "ucd_predicates_gen")]
#[command(about = "Generate Unicode classification functions for each code unit type")]
struct Args {
    /// Directory with UnicodeData.txt, PropList.txt and DerivedCoreProperties.txt
    #[arg(long)]
    ucd_dir: PathBuf,

    /// Directory generated headers (or modules) are written to
    #[arg(long)]
    out_dir: PathBuf,

    /// Directory generated Catch2 tests are written to. No tests are generated when omitted.
    #[arg(long)]
    tests_dir: Option<PathBuf>,

    /// Directory resolved code point sets are cached in between runs
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Code unit types to generate functions for, e.g. `char16_t`. Defaults to all of them.
    #[arg(long = "code-unit")]
    code_units: Vec<String>,

    #[arg(long, value_enum, default_value = "cpp")]
    backend: Backend,

    /// Bits per bitmask (8, 16, 32 or 64)
    #[arg(long, default_value_t = 64)]
    word_size: u32,

    /// Number of values and ranges a node tests with comparisons before it is subdivided
    #[arg(long, default_value_t = 3)]
    compound_boolean_limit: usize,

    /// Maximum subdivision depth, 0 for unlimited
    #[arg(long, default_value_t = 0)]
    depth_limit: u32,

    #[arg(long)]
    no_bitmask_expressions: bool,

    #[arg(long)]
    no_bitmask_tables: bool,

    /// Give constant children of a dispatch their own cases
    #[arg(long)]
    no_hoist: bool,

    /// Check every compiled predicate against its set
    #[arg(long)]
    verify: bool,

    /// Namespace of the generated C++ functions
    #[arg(long, default_value = "unicode")]
    namespace: String,

    /// Attributes placed before each generated C++ function
    #[arg(long)]
    attributes: Option<String>,

    /// Macro used to pass assumptions to the C++ compiler, e.g. `MUU_ASSUME`
    #[arg(long)]
    assume_macro: Option<String>,

    /// Declaration specifiers of bitmask tables. `static constexpr` needs C++23.
    #[arg(long, default_value = "constexpr")]
    table_storage: String,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            word_size: self.word_size,
            compound_boolean_limit: self.compound_boolean_limit,
            depth_limit: self.depth_limit,
            bitmask_expressions: !self.no_bitmask_expressions,
            bitmask_tables: !self.no_bitmask_tables,
            hoist_constant_children: !self.no_hoist,
        }
    }

    fn code_units(&self) -> Result<Vec<CodeUnit>> {
        if self.code_units.is_empty() {
            return Ok(CodeUnit::ALL.to_vec());
        }
        self.code_units
            .iter()
            .map(|name| match CodeUnit::from_name(name) {
                Some(code_unit) => Ok(code_unit),
                None => bail!("unknown code unit {:?}", name),
            })
            .collect()
    }
}

fn write(dir: &Path, file_name: &str, contents: &str) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(file_name);
    fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "wrote");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let code_units = args.code_units()?;
    let compiler = Compiler::new(args.config()).context("invalid synthesis options")?;

    let db = UnicodeDatabase::load(&args.ucd_dir)
        .with_context(|| format!("reading the database in {}", args.ucd_dir.display()))?;
    let cache = match &args.cache_dir {
        Some(dir) => CodePointCache::new(dir.clone()),
        None => CodePointCache::in_memory(),
    };
    let mut generator = Generator::new(UcdSupplier::new(&db, cache), compiler, args.verify);

    match args.backend {
        Backend::Cpp => {
            let options = cpp::HeaderOptions {
                namespace: args.namespace.clone(),
                attributes: args.attributes.clone(),
                emitter: CppOptions {
                    assume_macro: args.assume_macro.clone(),
                    table_storage: args.table_storage.clone(),
                    ..Default::default()
                },
            };
            for code_unit in &code_units {
                info!(code_unit = code_unit.name, "generating");
                let output = cpp::generate(&mut generator, code_unit, &options)?;
                write(&args.out_dir, &cpp::header_file_name(code_unit), &output.header)?;
                if let (Some(dir), Some(tests)) = (&args.tests_dir, &output.tests) {
                    write(dir, &cpp::tests_file_name(code_unit), tests)?;
                }
            }
            if let Some(dir) = &args.tests_dir {
                write(dir, cpp::TEST_HELPERS_FILE_NAME, cpp::TEST_HELPERS)?;
            }
        }
        Backend::Rust => {
            for code_unit in &code_units {
                info!(code_unit = code_unit.name, "generating");
                match rust_module::generate(&mut generator, code_unit)? {
                    Some(module) => {
                        write(&args.out_dir, &rust_module::file_name(code_unit), &module)?
                    }
                    None => info!(
                        code_unit = code_unit.name,
                        "skipped, functions forward to another type"
                    ),
                }
            }
        }
    }

    Ok(())
}
