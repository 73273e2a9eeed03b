//! radosd command-line tool
//!
//! A small operator surface over an in-process rados-lite cluster: boots
//! a demo topology and runs a single put/get/rm/ls/status/osd-state
//! command against it. A local, dependency-free way to poke at the
//! core without standing up a network-facing control plane.

use std::io::{self, Read, Write};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use monitor::{ClusterConfig, Monitor, PoolSeed};
use osd::{OsdSeed, OsdState};
use rados::Rados;
use tracing::debug;

#[derive(Parser)]
#[command(name = "radosd")]
#[command(about = "rados-lite cluster operator CLI", long_about = None)]
struct Cli {
    /// Comma-separated rack name per bootstrap OSD (osd.0, osd.1, ...).
    #[arg(long, env = "RADOSD_RACKS", default_value = "r1,r1,r2,r2,r3")]
    racks: String,

    /// Replica count for the `default` pool.
    #[arg(long, default_value_t = 3)]
    default_pool_size: u32,

    /// PG count for the `default` pool.
    #[arg(long, default_value_t = 32)]
    default_pool_pg_num: u32,

    /// PG count for the `metadata` pool.
    #[arg(long, default_value_t = 16)]
    metadata_pool_pg_num: u32,

    /// Enable debug logging.
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an object from a file or stdin ("-").
    Put {
        pool: String,
        object: String,
        file: String,
    },
    /// Read an object to a file or stdout ("-").
    Get {
        pool: String,
        object: String,
        file: String,
    },
    /// Remove an object.
    Rm { pool: String, object: String },
    /// List objects in a pool.
    Ls { pool: String },
    /// Print aggregated cluster health.
    Status,
    /// Print the full cluster map: pools, OSDs, PG state histogram.
    DetailedStatus,
    /// Transition an OSD between up/down/out.
    OsdState { osd_id: u64, state: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(log_level))
        .with_writer(std::io::stderr)
        .init();

    let monitor = Arc::new(bootstrap_cluster(
        &cli.racks,
        cli.default_pool_size,
        cli.default_pool_pg_num,
        cli.metadata_pool_pg_num,
    )?);
    let rados = Rados::new(monitor.clone());

    match cli.command {
        Commands::Put { pool, object, file } => {
            let data = read_input(&file).context("failed to read input")?;
            let len = data.len();
            let result = rados
                .put_object(&pool, &object, data)
                .map_err(|e| anyhow!("put failed: {e}"))?;
            if cli.debug {
                eprintln!(
                    "wrote {len} bytes to {object} (pg {}, replicas {:?})",
                    result.pg_id, result.replicas
                );
            }
        }
        Commands::Get { pool, object, file } => {
            let (data, metadata) = rados
                .get_object(&pool, &object)
                .ok_or_else(|| anyhow!("object '{object}' not found in pool '{pool}'"))?;
            write_output(&file, &data).context("failed to write output")?;
            if cli.debug {
                eprintln!("read {} bytes from {object} (checksum {})", data.len(), metadata.checksum);
            }
        }
        Commands::Rm { pool, object } => {
            let removed = rados.delete_object(&pool, &object);
            if cli.debug {
                eprintln!("removed {object}: {removed}");
            }
        }
        Commands::Ls { pool } => {
            let objects = rados
                .list_objects(&pool)
                .map_err(|e| anyhow!("list failed: {e}"))?;
            for obj in &objects {
                println!("{}", obj.object_id);
            }
            if cli.debug {
                eprintln!("listed {} objects", objects.len());
            }
        }
        Commands::Status => {
            let status = monitor.cluster_status();
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::DetailedStatus => {
            let status = monitor.detailed_status();
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::OsdState { osd_id, state } => {
            let state: OsdState = state
                .parse()
                .map_err(|e| anyhow!("invalid osd state '{state}': {e}"))?;
            monitor
                .set_osd_state(osd_id, state)
                .map_err(|e| anyhow!("osd state change failed: {e}"))?;
            if cli.debug {
                eprintln!("osd.{osd_id} -> {state}");
            }
        }
    }

    Ok(())
}

/// Boot the demo topology: one OSD per entry in `racks`, plus a
/// `default` and a `metadata` pool. Assembled as a `ClusterConfig`
/// rather than a sequence of ad hoc `add_osd`/`create_pool` calls, so
/// the CLI's job is just translating flags into that config.
fn bootstrap_cluster(
    racks: &str,
    default_pool_size: u32,
    default_pool_pg_num: u32,
    metadata_pool_pg_num: u32,
) -> Result<Monitor> {
    let mut config = ClusterConfig::default();
    for (id, rack) in racks.split(',').map(str::trim).enumerate() {
        if rack.is_empty() {
            return Err(anyhow!("empty rack name in --racks at position {id}"));
        }
        debug!(osd_id = id, rack, "bootstrapping osd");
        config.osds.push(OsdSeed::new(id as u64, rack));
    }
    config
        .pools
        .push(PoolSeed::new("default", default_pool_size, default_pool_pg_num));
    config
        .pools
        .push(PoolSeed::new("metadata", default_pool_size, metadata_pool_pg_num));

    Monitor::bootstrap(config).context("failed to bootstrap cluster")
}

fn read_input(file: &str) -> Result<Vec<u8>> {
    if file == "-" {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("failed to read from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read(file).with_context(|| format!("failed to read file: {file}"))
    }
}

fn write_output(file: &str, data: &[u8]) -> Result<()> {
    if file == "-" {
        io::stdout().write_all(data).context("failed to write to stdout")?;
        io::stdout().flush().context("failed to flush stdout")?;
    } else {
        std::fs::write(file, data).with_context(|| format!("failed to write file: {file}"))?;
    }
    Ok(())
}
