//! chainreg CLI — inspect registry chains and contracts from the terminal.
//!
//! Usage:
//! ```bash
//! # List supported chains
//! chainreg chains
//!
//! # Resolve a contract address or deployment artifact
//! chainreg resolve --input deployments/localhost.json
//!
//! # Run an allocate/read round trip against the in-memory mock chain
//! chainreg demo
//! ```

use std::env;
use std::process;
use std::sync::Arc;

use alloy_primitives::{Address, B256};
use anyhow::Context;
use chainreg_client::mock::{MockChain, MockRunner};
use chainreg_client::{for_chain, resolve, Blockchain, SUPPORTED_CHAINS};
use chainreg_core::{ContractConfig, RegistryError, RegistrySettings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "chains" => {
            cmd_chains();
            Ok(())
        }
        "resolve" => cmd_resolve(&args[2..]),
        "demo" => cmd_demo().await,
        "version" | "--version" | "-V" => {
            println!("chainreg {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        match e.downcast_ref::<RegistryError>() {
            Some(err) => eprintln!("Error: {err}"),
            None => eprintln!("Error: {e:#}"),
        }
        process::exit(1);
    }
}

fn print_usage() {
    println!("chainreg {}", env!("CARGO_PKG_VERSION"));
    println!("Inspect registry chains and contracts\n");
    println!("USAGE:");
    println!("    chainreg <COMMAND>\n");
    println!("COMMANDS:");
    println!("    chains     List supported chains and contract versions");
    println!("    resolve    Resolve a contract address or deployment artifact");
    println!("    demo       Allocate/read round trip against an in-memory chain");
    println!("    version    Print version");
    println!("    help       Print this help\n");
    println!("RESOLVE FLAGS:");
    println!("    --input <ADDR-OR-PATH>   Hex address or path to {{ \"address\": ... }}  [required]");
}

fn cmd_chains() {
    println!("Supported chains:\n");
    for (chain, version) in SUPPORTED_CHAINS {
        println!("  {:>10}  {:<12} contracts: {version}", chain.chain_id, chain.env);
    }
}

fn cmd_resolve(args: &[String]) -> anyhow::Result<()> {
    let input = parse_flag(args, "--input").context("--input is required")?;
    let address = resolve(&input)?;
    println!("{address}");
    Ok(())
}

async fn cmd_demo() -> anyhow::Result<()> {
    const DEMO_ADDRESS: &str = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

    let factory = for_chain(31337)?;
    let mock = MockChain::new();
    let blockchain =
        Blockchain::new(*factory.chain(), Arc::new(mock.clone()), Arc::new(MockRunner));
    let cfg = ContractConfig { address: DEMO_ADDRESS.into(), version: factory.version().into() };
    let registry = factory.stream_registry(&blockchain, &cfg, RegistrySettings::default())?;

    println!("Chain:    {}", blockchain.chain());
    println!("Registry: {}", registry.address());

    let nodes = [Address::repeat_byte(0x11), Address::repeat_byte(0x22)];
    registry
        .allocate_stream("demo-stream", &nodes, B256::repeat_byte(0x42), b"genesis")
        .await?;
    println!("Allocated demo-stream ({} nodes)", nodes.len());

    let record = registry.get_stream("demo-stream").await?;
    println!("Read back: {} @ miniblock {}", record.stream_id, record.last_miniblock_num);
    println!("Streams:   {}", registry.get_stream_count().await?);

    for event in registry.stream_allocated_events(0, mock.block_number()).await? {
        println!(
            "Event:     StreamAllocated({}, {} nodes) in block {}",
            event.stream_id,
            event.nodes.len(),
            event.block_number
        );
    }

    match registry.allocate_stream("demo-stream", &nodes, B256::repeat_byte(0x42), b"").await {
        Err(e) => println!("Duplicate: {} (as expected)", e.kind()),
        Ok(()) => println!("Duplicate: unexpectedly succeeded"),
    }

    Ok(())
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}
