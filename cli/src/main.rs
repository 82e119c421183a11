use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

use flatjl::{generate_to_memory, load_schema_file, FileSink, GenError, GeneratorOptions, JuliaGenerator};

#[derive(Parser)]
#[command(name = "flatjl")]
#[command(about = "Generate Julia FlatBuffers accessors and builders from a schema IR", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct GenArgs {
    /// Input schema IR (`.json`)
    #[arg(short, long)]
    input: PathBuf,

    /// Directory the generated `.jl` files go into
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Put every entity into one file
    #[arg(long)]
    single_file: bool,

    /// Base name of the single file
    #[arg(long, default_value = "schema")]
    file_name: String,

    /// Dotted namespace that replaces every entity's own when laying out files
    #[arg(long)]
    namespace: Option<String>,

    /// Fail on union fields instead of emitting placeholders
    #[arg(long)]
    strict_unions: bool,

    /// Statement that brings the FlatBuffers runtime into scope
    #[arg(long, default_value = "using FlatBuffers")]
    runtime_import: String,
}

impl GenArgs {
    fn options(&self) -> GeneratorOptions {
        GeneratorOptions {
            single_file: self.single_file,
            namespace_override: self.namespace.clone(),
            output_dir: self.output.clone(),
            file_name: self.file_name.clone(),
            runtime_import: self.runtime_import.clone(),
            strict_unions: self.strict_unions,
            ..GeneratorOptions::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Julia code and write it under the output directory
    Gen(GenArgs),

    /// Run the generator without writing anything and list the files it would produce
    Check(GenArgs),
}

fn run(cli: &Cli) -> Result<bool, GenError> {
    match &cli.command {
        Commands::Gen(args) => {
            let schema = load_schema_file(&args.input)?;
            let options = args.options();
            let ok = JuliaGenerator::new(&schema, &options)?.generate(&mut FileSink)?;
            if ok {
                info!("generated {} into {}", args.input.display(), args.output.display());
            }
            Ok(ok)
        }

        Commands::Check(args) => {
            let schema = load_schema_file(&args.input)?;
            for unit in generate_to_memory(&schema, &args.options())? {
                println!("{} ({} bytes)", unit.path.display(), unit.contents.len());
            }
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("generation stopped: some files could not be written");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
