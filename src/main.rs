use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use selfblog::build::{build_site, stats};
use selfblog::config::Config;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn project_arg() -> Arg<'static, 'static> {
    Arg::with_name("PROJECT_DIR")
        .help("A directory inside the project (defaults to the current directory)")
        .index(1)
}

/// The project directory, made absolute so the search for the project file
/// can walk up past it.
fn project_dir(matches: &ArgMatches) -> std::io::Result<PathBuf> {
    std::fs::canonicalize(matches.value_of("PROJECT_DIR").unwrap_or("."))
}

fn run(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        ("build", Some(matches)) => {
            let output = matches.value_of("output").map(Path::new);
            build_site(Config::from_directory(&project_dir(matches)?, output)?)?;
        }
        ("stats", Some(matches)) => {
            let stats = stats(&Config::from_directory(&project_dir(matches)?, None)?)?;
            println!("Categories:");
            for (category, count) in &stats.categories {
                println!("  {} ({})", category.name, count);
            }
            println!("Tags:");
            for (tag, count) in &stats.tags {
                println!("  {} ({})", tag.name, count);
            }
        }
        _ => unreachable!("clap requires a subcommand"),
    }
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let matches = App::new("selfblog")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Builds the site")
                .arg(
                    Arg::with_name("output")
                        .long("output")
                        .short("o")
                        .takes_value(true)
                        .value_name("DIR")
                        .help("The output directory (defaults to `_output` in the project)"),
                )
                .arg(project_arg()),
        )
        .subcommand(
            SubCommand::with_name("stats")
                .about("Prints the published article counts per category and tag")
                .arg(project_arg()),
        )
        .get_matches();

    if let Err(e) = run(&matches) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
