use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, B256, U256};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crowdfund_client::abi::{CrowdfundAbi, CROWDFUND_ABI_JSON};
use crowdfund_client::{
    config, create_provider, node_banner, Crowdfund, Deployment, EthereumProvider,
    ProjectStarted, ProviderConfig, StartProject,
};

#[derive(Debug, Parser)]
#[command(
    name = "crowdfund",
    version,
    about = "CLI client for the crowdfund contract deployments"
)]
struct Args {
    /// HTTP JSON-RPC endpoint (e.g. http://localhost:8545)
    #[arg(long, global = true)]
    rpc: Option<String>,

    /// WebSocket endpoint (e.g. ws://localhost:8546)
    #[arg(long, global = true)]
    ws: Option<String>,

    /// IPC path (e.g. ~/.ethereum/geth.ipc). Unix only.
    #[cfg(unix)]
    #[arg(long, global = true)]
    ipc: Option<PathBuf>,

    /// Deployment name ("primary"/"secondary") or an explicit 0x address
    #[arg(long, global = true, default_value = "primary")]
    deployment: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all project contract addresses
    Projects,

    /// Start a new crowdfunding project
    Start {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// Funding window in days
        #[arg(long)]
        duration_days: u64,

        /// Funding goal in wei
        #[arg(long)]
        goal: String,

        /// Sending account (defaults to the node's first unlocked account)
        #[arg(long)]
        from: Option<String>,

        /// Print the encoded calldata instead of submitting
        #[arg(long)]
        calldata_only: bool,
    },

    /// Follow ProjectStarted events
    Watch {
        /// Start block for the initial backfill
        #[arg(long)]
        from_block: Option<u64>,
    },

    /// Print the embedded ABI and its computed selectors
    Abi,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let config = config::load();

    // No endpoint needed to inspect the embedded ABI
    if let Command::Abi = args.command {
        return print_abi();
    }

    let endpoint = endpoint_from_args_and_config(&args, &config)?;
    info!(endpoint = %endpoint.display(), "connecting");
    let provider: Arc<dyn EthereumProvider> = Arc::from(create_provider(endpoint).await?);
    info!("connected to {}", node_banner(provider.as_ref()).await);

    let address = resolve_deployment(&args.deployment, &config)?;
    let handle = Crowdfund::new(Arc::clone(&provider), address)?;
    info!(contract = %handle.address(), "bound crowdfund handle");

    match args.command {
        Command::Projects => cmd_projects(&handle).await,
        Command::Start {
            title,
            description,
            duration_days,
            goal,
            from,
            calldata_only,
        } => {
            let params = StartProject {
                title,
                description,
                duration_days: U256::from(duration_days),
                goal_amount: goal.parse().context("Invalid goal (expected wei amount)")?,
            };
            cmd_start(&provider, &handle, params, from, calldata_only).await
        }
        Command::Watch { from_block } => cmd_watch(&provider, &handle, from_block).await,
        Command::Abi => unreachable!("handled above"),
    }
}

/// Explicit endpoint flags win over config; fall back to localhost HTTP
fn endpoint_from_args_and_config(args: &Args, config: &config::Config) -> Result<ProviderConfig> {
    if let Some(url) = &args.rpc {
        return Ok(ProviderConfig::Http(url.clone()));
    }
    if let Some(url) = &args.ws {
        return Ok(ProviderConfig::WebSocket(url.clone()));
    }
    #[cfg(unix)]
    if let Some(path) = &args.ipc {
        return Ok(ProviderConfig::Ipc(path.clone()));
    }

    for endpoint in &config.endpoints {
        if let Some(url) = &endpoint.rpc {
            return Ok(ProviderConfig::Http(url.clone()));
        }
        if let Some(url) = &endpoint.ws {
            return Ok(ProviderConfig::WebSocket(url.clone()));
        }
        #[cfg(unix)]
        if let Some(path) = &endpoint.ipc {
            return Ok(ProviderConfig::Ipc(PathBuf::from(path)));
        }
    }

    Ok(ProviderConfig::Http("http://localhost:8545".to_string()))
}

fn resolve_deployment(selector: &str, config: &config::Config) -> Result<Address> {
    if selector.starts_with("0x") || selector.starts_with("0X") {
        return selector
            .parse()
            .with_context(|| format!("Invalid contract address '{}'", selector));
    }

    let Some(deployment) = Deployment::from_name(selector) else {
        bail!(
            "Unknown deployment '{}' (expected primary, secondary, or a 0x address)",
            selector
        );
    };
    Ok(config
        .deployment_address(deployment.name())
        .unwrap_or_else(|| deployment.address()))
}

async fn cmd_projects(handle: &Crowdfund) -> Result<()> {
    let projects = handle.return_all_projects().await?;
    if projects.is_empty() {
        println!("No projects started yet");
        return Ok(());
    }
    for (index, address) in projects.iter().enumerate() {
        println!("{:>3}  {}", index, address);
    }
    Ok(())
}

async fn cmd_start(
    provider: &Arc<dyn EthereumProvider>,
    handle: &Crowdfund,
    params: StartProject,
    from: Option<String>,
    calldata_only: bool,
) -> Result<()> {
    if calldata_only {
        let calldata = handle.start_project_calldata(&params)?;
        println!("0x{}", hex::encode(calldata));
        return Ok(());
    }

    let from: Address = match from {
        Some(value) => value
            .parse()
            .with_context(|| format!("Invalid from address '{}'", value))?,
        None => {
            let accounts = provider
                .accounts()
                .await
                .context("Node exposes no account list; pass --from or use --calldata-only")?;
            *accounts
                .first()
                .context("Node has no unlocked accounts; pass --from or use --calldata-only")?
        }
    };

    let hash = handle.start_project(&params, from).await?;
    println!("submitted: {hash}");
    wait_for_receipt(provider.as_ref(), hash).await
}

async fn wait_for_receipt(provider: &dyn EthereumProvider, hash: B256) -> Result<()> {
    let mut poll = tokio::time::interval(Duration::from_millis(500));
    for _ in 0..120 {
        poll.tick().await;
        if let Some(receipt) = provider.get_receipt(hash).await? {
            let status = if receipt.status() { "success" } else { "reverted" };
            println!(
                "mined in block {} ({})",
                receipt.block_number.unwrap_or_default(),
                status
            );
            return Ok(());
        }
    }
    warn!(%hash, "transaction still pending after 60s");
    Ok(())
}

async fn cmd_watch(
    provider: &Arc<dyn EthereumProvider>,
    handle: &Crowdfund,
    from_block: Option<u64>,
) -> Result<()> {
    if provider.supports_subscriptions() {
        let (backfill, mut rx) = handle.follow_project_started(from_block).await?;
        for event in backfill {
            println!("{event}");
        }
        info!("subscribed to ProjectStarted");
        while let Some(log) = rx.recv().await {
            match ProjectStarted::from_log(&log) {
                Ok(event) => println!("{event}"),
                Err(err) => warn!("undecodable ProjectStarted log: {err:#}"),
            }
        }
        return Ok(());
    }

    // HTTP transport: poll the head and query each new block range.
    // The poll loop resumes exactly where the backfill ended.
    let head = provider.block_number().await?;
    if let Some(start) = from_block {
        if start <= head {
            for event in handle.project_started_events(start, head).await? {
                println!("{event}");
            }
        }
    }

    info!("polling for ProjectStarted (HTTP endpoint)");
    let mut last = head;
    let mut poll = tokio::time::interval(Duration::from_secs(2));
    loop {
        poll.tick().await;
        let head = match provider.block_number().await {
            Ok(head) => head,
            Err(err) => {
                warn!("block number fetch failed: {err:#}");
                continue;
            }
        };
        if head <= last {
            continue;
        }
        match handle.project_started_events(last + 1, head).await {
            Ok(events) => {
                for event in events {
                    println!("{event}");
                }
            }
            Err(err) => warn!("log query failed: {err:#}"),
        }
        last = head;
    }
}

fn print_abi() -> Result<()> {
    let abi = CrowdfundAbi::load()?;

    let value: serde_json::Value = serde_json::from_str(CROWDFUND_ABI_JSON)?;
    println!("{}", serde_json::to_string_pretty(&value)?);

    for function in [abi.start_project()?, abi.return_all_projects()?] {
        println!(
            "selector 0x{}  {}",
            hex::encode(CrowdfundAbi::selector(function)),
            function.signature()
        );
    }
    let event = abi.project_started()?;
    println!(
        "topic0   {}  {}",
        CrowdfundAbi::event_topic(event),
        event.signature()
    );
    Ok(())
}
