//! rsp_launch CLI

use clap::{Parser, Subcommand, ValueEnum};
use rsp_launch::{
    ament::{AmentIndex, LocalFs},
    config::LaunchConfig,
    description::XacroCompiler,
    error::Result,
    launch_context,
    orchestrator::{JointStateSource, Orchestrator, Visualization},
};
use std::{
    collections::HashMap,
    io::Write,
    path::{Path, PathBuf},
    process,
};

#[derive(Parser)]
#[command(name = "rsp_launch")]
#[command(about = "Robot state publisher / rviz2 launch description generator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML file overriding the default launch configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Robot package providing the model and rviz layout
    #[arg(short, long, global = true)]
    package: Option<String>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the launch description and write it out
    Generate {
        /// Launch arguments (key:=value)
        #[arg(value_parser = parse_launch_arg)]
        args: Vec<(String, String)>,

        /// Output file path, or '-' for stdout
        #[arg(short, long, default_value = "launch_record.json")]
        output: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// Evaluate substitutions (runs the description compiler)
        #[arg(long)]
        resolve: bool,
    },

    /// Show which processes would be selected, without writing anything
    Plan {
        /// Launch arguments (key:=value)
        #[arg(value_parser = parse_launch_arg)]
        args: Vec<(String, String)>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

fn parse_launch_arg(s: &str) -> std::result::Result<(String, String), String> {
    let parts: Vec<&str> = s.split(":=").collect();
    if parts.len() != 2 || parts[0].is_empty() {
        return Err(format!("Invalid launch argument format: {}", s));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => LaunchConfig::from_yaml_file(path)?,
        None => LaunchConfig::default(),
    };
    if let Some(package) = cli.package {
        config.package = package;
        config.validate()?;
    }

    let packages = AmentIndex::from_env();
    let compiler = XacroCompiler::new(config.xacro.as_str());
    let orchestrator = Orchestrator::new(&config, &packages, &LocalFs, &compiler);

    match cli.command {
        Commands::Generate {
            args,
            output,
            format,
            resolve,
        } => {
            let overrides: HashMap<String, String> = args.into_iter().collect();
            let mut record = orchestrator.assemble()?;
            let context = launch_context(&record, &overrides)?;
            if resolve {
                record = record.resolve(&context)?;
            }

            let text = match format {
                Format::Json => record.to_json()?,
                Format::Yaml => record.to_yaml()?,
            };
            write_output(&output, &text)?;

            log::info!(
                "  {} entities: {} nodes, {} processes",
                record.len(),
                record.nodes().count(),
                record.processes().count()
            );
        }
        Commands::Plan { args } => {
            let overrides: HashMap<String, String> = args.into_iter().collect();
            let plan = orchestrator.plan()?;
            let declarations = [Orchestrator::sim_time_argument()];
            let declarations: Vec<_> = declarations.iter().collect();
            let arguments = rsp_launch::actions::resolve_arguments(&declarations, &overrides)?;

            println!("package share:  {}", plan.share_directory.display());
            println!("description:    {}", plan.description_file.display());
            match &plan.joint_state_source {
                JointStateSource::Gui { package } => println!("joint states:   {} (GUI)", package),
                JointStateSource::Static { command } => {
                    println!("joint states:   static: {}", command.join(" "))
                }
            }
            match &plan.visualization {
                Visualization::WithConfig(path) => {
                    println!("rviz2:          -d {}", path.display())
                }
                Visualization::Default => println!("rviz2:          default view"),
            }
            let mut names: Vec<_> = arguments.keys().collect();
            names.sort();
            for name in names {
                println!("argument:       {}:={}", name, arguments[name]);
            }
        }
    }

    Ok(())
}

fn write_output(output: &Path, text: &str) -> Result<()> {
    if output == Path::new("-") {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.write_all(b"\n")?;
    } else {
        std::fs::write(output, text)?;
        log::info!("Generated launch record: {}", output.display());
    }
    Ok(())
}
