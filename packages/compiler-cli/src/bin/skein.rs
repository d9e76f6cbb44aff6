/**
 * Skein Compiler CLI - skein
 *
 * Compiles template packages into Rust modules. Packages are compiled in
 * the order given, so a package may embed components of any package named
 * before it. Macros of all packages are collected before any compiles.
 */
use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use skein_cli::config::ProjectConfig;
use skein_cli::compiler::template::MacroSet;
use skein_cli::perform_compile::{
    collect_macros, load_registry, perform_compilation, save_registry, CompileOptions,
};
use std::path::PathBuf;
use std::process;

fn cli() -> Command {
    Command::new("skein")
        .version(skein_cli::version())
        .about("Compiles skein templates into Rust modules")
        .arg(
            Arg::new("packages")
                .value_name("DIR")
                .num_args(1..)
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Package directories, dependencies first"),
        )
        .arg(
            Arg::new("out-dir")
                .short('o')
                .long("out-dir")
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Output directory; one subdirectory per package when several are given"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Config file used instead of each package's skein.json"),
        )
        .arg(
            Arg::new("runtime-crate")
                .long("runtime-crate")
                .value_name("PATH")
                .help("Path generated code uses to reach the runtime crate"),
        )
        .arg(
            Arg::new("registry")
                .short('r')
                .long("registry")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Registry of compiled packages, read first and updated afterwards"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("More logging; repeat for more"),
        )
}

fn run(matches: &clap::ArgMatches) -> anyhow::Result<bool> {
    let packages: Vec<&PathBuf> = matches
        .get_many::<PathBuf>("packages")
        .map(Iterator::collect)
        .unwrap_or_default();
    let out_dir = matches.get_one::<PathBuf>("out-dir");
    let shared_config = matches
        .get_one::<PathBuf>("config")
        .map(|path| ProjectConfig::load(path))
        .transpose()?;
    let registry_path = matches.get_one::<PathBuf>("registry");
    let mut registry = match registry_path {
        Some(path) => load_registry(path)?,
        None => Default::default(),
    };

    let mut all_options = Vec::with_capacity(packages.len());
    for dir in &packages {
        let mut config = match &shared_config {
            Some(config) => config.clone(),
            None => ProjectConfig::discover(dir)?,
        };
        if let Some(runtime) = matches.get_one::<String>("runtime-crate") {
            config.compiler.runtime_crate = runtime.clone();
        }

        let mut options = CompileOptions::new(dir.as_path(), config);
        options.out_dir = out_dir.map(|out| {
            if packages.len() > 1 {
                out.join(dir.file_name().unwrap_or_default())
            } else {
                out.clone()
            }
        });
        all_options.push(options);
    }

    let mut macros = MacroSet::new();
    for options in &all_options {
        let errors = collect_macros(options, &mut macros)
            .with_context(|| format!("reading {}", options.package_dir.display()))?;
        // compiling the package reports these again
        log::debug!(
            "{}: {} macro error(s)",
            options.package_dir.display(),
            errors.len()
        );
    }

    let mut failed = false;

    for options in &all_options {
        let dir = &options.package_dir;
        let result = perform_compilation(options, &mut registry, &macros)
            .with_context(|| format!("compiling {}", dir.display()))?;
        for error in &result.errors {
            eprintln!("Error: {}", error);
        }
        failed |= result.has_errors();
        println!(
            "{}: {} component(s) -> {}",
            result.package_path,
            result.components.len(),
            options
                .out_dir
                .as_deref()
                .unwrap_or(dir.as_path())
                .display()
        );
    }

    if let Some(path) = registry_path {
        save_registry(path, &registry)?;
    }
    Ok(!failed)
}

fn main() {
    let matches = cli().get_matches();

    let level = match matches.get_count("verbose") {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    match run(&matches) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
