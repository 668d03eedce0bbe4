// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! naoutil-discover - List NAO robots on the local network
//!
//! ```bash
//! # Browse for 2 seconds and list every robot
//! naoutil-discover
//!
//! # Which endpoint would a broker connect to?
//! naoutil-discover resolve --robot Pepper
//!
//! # Write a config file with the robots found
//! naoutil-discover gen-config naoutil.toml
//! ```

use clap::{Parser, Subcommand};
use colored::*;
use naoutil::discovery::{DiscoveryBackend, RobotRecord};
use naoutil::resolver::{resolve_endpoint, Endpoint};
use naoutil::NaoutilConfig;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// List NAO robots advertised on the local network
#[derive(Parser, Debug)]
#[command(name = "naoutil-discover")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Browse window in milliseconds
    #[arg(long)]
    timeout: Option<u64>,

    /// List IPv6 addresses instead of IPv4
    #[arg(long)]
    ipv6: bool,

    /// Output format: pretty, json
    #[arg(short, long, default_value = "pretty")]
    format: OutputFormat,

    /// Robot id (address, host name or robot name)
    #[arg(short, long)]
    robot: Option<String>,

    /// Robot middleware port
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Quiet mode - compact output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List discovered robots (default)
    List,
    /// Show the endpoint a broker would connect to
    Resolve,
    /// Write a config file listing the discovered robots
    GenConfig {
        /// Output path
        #[arg(default_value = "naoutil.toml")]
        output: PathBuf,
    },
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "p" => Ok(OutputFormat::Pretty),
            "json" | "j" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

fn main() {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_config(args: &Args) -> Result<NaoutilConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            NaoutilConfig::from_file(path)?
        }
        None => NaoutilConfig::default(),
    }
    .apply_env()?;

    if let Some(ms) = args.timeout {
        config.discovery_timeout_ms = ms;
    }
    if args.ipv6 {
        config.ipv6 = true;
    }
    if args.robot.is_some() {
        config.robot = args.robot.clone();
    }
    if args.port.is_some() {
        config.port = args.port;
    }
    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args)?;
    let backend = config.discovery_backend();

    if !args.quiet && matches!(args.format, OutputFormat::Pretty) {
        eprintln!(
            "{} Browsing {} for {} ms",
            ">>>".green().bold(),
            config.service_type,
            config.discovery_timeout_ms
        );
    }

    match &args.command {
        None | Some(Command::List) => {
            let robots = backend.find_all(config.ipv6)?;
            match args.format {
                OutputFormat::Pretty => print_robots(&robots, args.quiet),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&robots)?),
            }
        }
        Some(Command::Resolve) => {
            let endpoint = resolve(&config, backend.as_ref());
            print_endpoint(&endpoint, &args.format)?;
        }
        Some(Command::GenConfig { output }) => {
            let robots = backend.find_all(config.ipv6)?;
            let generated = NaoutilConfig {
                robots: robots.clone(),
                ..config.clone()
            };
            generated.to_file(output)?;
            if !args.quiet {
                eprintln!(
                    "{} Wrote {} robot(s) to {}",
                    "OK".green().bold(),
                    robots.len(),
                    output.display()
                );
            }
        }
    }

    Ok(())
}

/// Endpoint a broker started with `config` would join. Discovery errors fall
/// back to the default endpoint as they do for brokers.
fn resolve(config: &NaoutilConfig, backend: &dyn DiscoveryBackend) -> Endpoint {
    resolve_endpoint(backend, config.robot.as_deref(), config.port)
}

fn print_robots(robots: &[RobotRecord], quiet: bool) {
    if robots.is_empty() {
        println!("{}", "No robot found".yellow());
        return;
    }

    if !quiet {
        println!();
        println!(
            "{} {} robot(s) discovered",
            "Robots:".cyan().bold(),
            robots.len()
        );
        println!();
    }

    for (i, robot) in robots.iter().enumerate() {
        let mut flags = Vec::new();
        if robot.local {
            flags.push("local".blue().to_string());
        }
        if robot.favorite {
            flags.push("favorite".magenta().to_string());
        }

        if quiet {
            println!(
                "{} {}:{} {}",
                robot.robot_name,
                robot.ip_address,
                robot.port,
                flags.join(",")
            );
        } else {
            println!(
                "  {} {} {}",
                format!("[{}]", i + 1).yellow(),
                robot.robot_name.green(),
                flags.join(" ")
            );
            println!("      Host: {}", robot.host_name);
            println!("      Endpoint: {}:{}", robot.ip_address, robot.port);
            println!();
        }
    }
}

fn print_endpoint(
    endpoint: &Endpoint,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Pretty => println!("{}", endpoint.to_string().green().bold()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&serde_json::json!({
                "address": endpoint.address,
                "port": endpoint.port,
            }))?
        ),
    }
    Ok(())
}
