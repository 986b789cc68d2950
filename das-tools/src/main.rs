use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use das_client::{
    fetch_verified_proofs, AssetBatchRequest, AssetProofRequest, AssetsByOwnerRequest,
    ClientError, GatewayClient, GatewayReply, GetAssetRequest, SearchAssetsRequest,
    DEFAULT_GATEWAY_URL,
};
use das_common::{AssetId, DisplayFlag, SortBy, SortDirection, SortSpec};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "das-tools",
    about = "Query Digital Asset Standard data through the DAS gateway"
)]
struct Cli {
    /// Gateway base URL.
    #[arg(long, global = true, env = "DAS_GATEWAY_URL", default_value = DEFAULT_GATEWAY_URL)]
    gateway: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one asset.
    Asset(AssetArgs),
    /// Fetch up to 1000 assets.
    AssetBatch(AssetBatchArgs),
    /// Fetch the Merkle proof of a compressed asset.
    Proof(ProofArgs),
    /// Fetch proofs, skipping assets that are not compressed NFTs.
    ProofBatch(IdList),
    /// List assets held by an owner.
    Owner(OwnerArgs),
    /// Search assets with a JSON filter object.
    Search(SearchArgs),
}

#[derive(Args)]
struct DisplayArgs {
    #[arg(long)]
    show_fungible: bool,
    #[arg(long)]
    show_inscription: bool,
    #[arg(long)]
    show_unverified_collections: bool,
    #[arg(long)]
    show_collection_metadata: bool,
}

impl DisplayArgs {
    /// Flags switched on at the command line. Off means unset.
    fn enabled(&self) -> Vec<DisplayFlag> {
        [
            (DisplayFlag::ShowFungible, self.show_fungible),
            (DisplayFlag::ShowInscription, self.show_inscription),
            (DisplayFlag::ShowUnverifiedCollections, self.show_unverified_collections),
            (DisplayFlag::ShowCollectionMetadata, self.show_collection_metadata),
        ]
        .into_iter()
        .filter_map(|(flag, on)| on.then_some(flag))
        .collect()
    }
}

#[derive(Args)]
struct IdList {
    /// Asset IDs.
    ids: Vec<String>,
    /// Read asset IDs from a file, one per line.
    #[arg(long)]
    file: Option<PathBuf>,
}

impl IdList {
    fn collect(&self) -> Result<Vec<AssetId>> {
        let mut ids: Vec<AssetId> = self.ids.iter().map(|id| AssetId::from(id.as_str())).collect();
        if let Some(path) = &self.file {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            ids.extend(parse_id_lines(&text));
        }
        if ids.is_empty() {
            bail!("no asset IDs given");
        }
        Ok(ids)
    }
}

#[derive(Args)]
struct AssetArgs {
    id: String,
    #[command(flatten)]
    display: DisplayArgs,
}

#[derive(Args)]
struct AssetBatchArgs {
    #[command(flatten)]
    ids: IdList,
    #[command(flatten)]
    display: DisplayArgs,
}

#[derive(Args)]
struct ProofArgs {
    id: String,
}

#[derive(Args)]
struct OwnerArgs {
    owner: String,
    #[arg(long)]
    page: Option<u64>,
    #[arg(long)]
    limit: Option<u64>,
    /// created, recent_action, updated or none.
    #[arg(long, value_parser = parse_sort_by)]
    sort_by: Option<SortBy>,
    /// asc or desc.
    #[arg(long, value_parser = parse_sort_direction)]
    sort_direction: Option<SortDirection>,
    #[arg(long)]
    before: Option<String>,
    #[arg(long)]
    after: Option<String>,
}

#[derive(Args)]
struct SearchArgs {
    /// Filter object, e.g. '{"ownerAddress":"...","compressed":true}'.
    #[arg(long, default_value = "{}")]
    filters: String,
    #[arg(long)]
    page: Option<u64>,
    #[arg(long)]
    limit: Option<u64>,
}

fn parse_sort_by(raw: &str) -> Result<SortBy, String> {
    SortBy::parse(raw).ok_or_else(|| format!("unknown sort key '{}'", raw))
}

fn parse_sort_direction(raw: &str) -> Result<SortDirection, String> {
    SortDirection::parse(raw).ok_or_else(|| format!("unknown sort direction '{}'", raw))
}

/// One ID per line. Blank lines are skipped.
fn parse_id_lines(text: &str) -> Vec<AssetId> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(AssetId::from)
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "das_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let client = GatewayClient::new(cli.gateway);

    match cli.command {
        Commands::Asset(args) => asset(&client, args).await,
        Commands::AssetBatch(args) => asset_batch(&client, args).await,
        Commands::Proof(args) => proof(&client, args).await,
        Commands::ProofBatch(args) => proof_batch(&client, args).await,
        Commands::Owner(args) => owner(&client, args).await,
        Commands::Search(args) => search(&client, args).await,
    }
}

async fn asset(client: &GatewayClient, args: AssetArgs) -> Result<()> {
    let request = args
        .display
        .enabled()
        .into_iter()
        .try_fold(GetAssetRequest::new(args.id), |request, flag| {
            request.with_flag(flag, true)
        })?;
    print_reply(client.get_asset(&request).await?)
}

async fn asset_batch(client: &GatewayClient, args: AssetBatchArgs) -> Result<()> {
    let request = args
        .display
        .enabled()
        .into_iter()
        .try_fold(AssetBatchRequest::new(args.ids.collect()?), |request, flag| {
            request.with_flag(flag, true)
        })?;
    print_reply(client.get_asset_batch(&request).await?)
}

async fn proof(client: &GatewayClient, args: ProofArgs) -> Result<()> {
    print_reply(client.get_asset_proof(&AssetProofRequest::new(args.id)).await?)
}

async fn proof_batch(client: &GatewayClient, args: IdList) -> Result<()> {
    let ids = args.collect()?;
    match fetch_verified_proofs(client, &ids).await {
        Ok(report) => {
            for warning in &report.warnings {
                eprintln!(
                    "warning: skipped {}: {}",
                    warning.identifier,
                    warning.reason.as_deref().unwrap_or_default()
                );
            }
            print_json(&report.response)
        }
        Err(ClientError::NoValidInput { warnings }) => {
            for warning in &warnings {
                eprintln!(
                    "warning: skipped {}: {}",
                    warning.identifier,
                    warning.reason.as_deref().unwrap_or_default()
                );
            }
            bail!("none of the {} asset IDs is a compressed NFT", ids.len())
        }
        Err(ClientError::Gateway { status, body }) => {
            print_json(&body)?;
            bail!("gateway answered with status {}", status)
        }
        Err(err) => Err(err.into()),
    }
}

async fn owner(client: &GatewayClient, args: OwnerArgs) -> Result<()> {
    let mut request = AssetsByOwnerRequest::new(args.owner);
    if let Some(page) = args.page {
        request = request.with_page(page);
    }
    if let Some(limit) = args.limit {
        request = request.with_limit(limit);
    }
    if args.sort_by.is_some() || args.sort_direction.is_some() {
        request = request.with_sort(SortSpec {
            sort_by: args.sort_by.unwrap_or_default(),
            sort_direction: args.sort_direction.unwrap_or_default(),
        });
    }
    if let Some(before) = args.before {
        request = request.with_before(before);
    }
    if let Some(after) = args.after {
        request = request.with_after(after);
    }
    print_reply(client.get_assets_by_owner(&request).await?)
}

async fn search(client: &GatewayClient, args: SearchArgs) -> Result<()> {
    let filters = match serde_json::from_str::<Value>(&args.filters)
        .context("--filters is not valid JSON")?
    {
        Value::Object(filters) => filters,
        _ => bail!("--filters must be a JSON object"),
    };

    let mut request = SearchAssetsRequest::from_filters(filters);
    if let Some(page) = args.page {
        request = request.with_page(page);
    }
    if let Some(limit) = args.limit {
        request = request.with_limit(limit);
    }
    print_reply(client.search_assets(&request).await?)
}

fn print_json(body: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(body)?);
    Ok(())
}

fn print_reply(reply: GatewayReply) -> Result<()> {
    print_json(&reply.body)?;
    if !reply.is_success() {
        bail!("gateway answered with status {}", reply.status);
    }
    Ok(())
}
