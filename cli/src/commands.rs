//! Subcommands.

use anyhow::Context;
use ferry_types::{AddressHash, Amount, AssetAmount, AssetId, TxHash};
use ferry_utils::format_amount;
use ferry_wallet_core::builder::{build, build_sweep};
use ferry_wallet_core::sync::reconcile_pending;
use ferry_wallet_core::{
    Address, AddressSyncer, AssetAmounts, EventBus, HttpExplorerClient, HttpNodeClient, PendingTransaction,
    PendingTransactionStore, SharedPendingStore, UnsignedTxBatch, WalletConfig, WalletEvent,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Decimals of the native asset.
const NATIVE_DECIMALS: usize = 18;

#[derive(clap::Subcommand)]
pub enum Command {
    /// Ask the node to build a send and print the unsigned transactions.
    Build {
        /// Source address.
        #[arg(long)]
        from: AddressHash,
        /// Hex public key of the source address.
        #[arg(long)]
        public_key: String,
        /// Destination address.
        #[arg(long)]
        to: AddressHash,
        /// Native amount in the smallest unit.
        #[arg(long)]
        amount: Option<Amount>,
        /// Token amount as `<asset id>=<amount>`; repeatable.
        #[arg(long = "token", value_parser = parse_token)]
        tokens: Vec<AssetAmount>,
    },
    /// Ask the node to build the consolidation sweep of an address into itself.
    Sweep {
        #[arg(long)]
        from: AddressHash,
        #[arg(long)]
        public_key: String,
    },
    /// Print the confirmed (first page) and mempool transactions of addresses.
    Sync {
        #[arg(long = "address", required = true)]
        addresses: Vec<AddressHash>,
    },
    /// Sync once and drop pending entries the explorer now reports.
    Reconcile {
        /// JSON file holding the pending transaction list; rewritten in place.
        #[arg(long)]
        pending: PathBuf,
        #[arg(long = "address", required = true)]
        addresses: Vec<AddressHash>,
    },
    /// Reconcile on every sync interval until interrupted.
    Watch {
        #[arg(long)]
        pending: PathBuf,
        #[arg(long = "address", required = true)]
        addresses: Vec<AddressHash>,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn parse_token(raw: &str) -> Result<AssetAmount, String> {
    let (id, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected <asset id>=<amount>, got {raw:?}"))?;
    let id = AssetId::parse(id).map_err(|e| e.to_string())?;
    let amount: Amount = amount.parse().map_err(|e: ferry_types::FerryError| e.to_string())?;
    Ok(AssetAmount { id, amount })
}

/// One entry per asset with zero amounts dropped. A token id given twice, or
/// the native id given as a token, is rejected rather than merged.
fn send_assets(amount: Option<Amount>, tokens: Vec<AssetAmount>) -> anyhow::Result<AssetAmounts> {
    let mut assets = AssetAmounts::new();
    for token in tokens {
        anyhow::ensure!(
            !token.id.is_native(),
            "the native asset is sent with --amount, not --token"
        );
        anyhow::ensure!(
            assets.get(&token.id).is_none(),
            "token {} is given more than once",
            token.id.as_str()
        );
        assets.set(token.id, Some(token.amount));
    }
    if let Some(native) = amount {
        assets.set(AssetId::native(), Some(native));
    }
    Ok(assets)
}

#[derive(Serialize)]
struct BatchOutput {
    tx_ids: Vec<TxHash>,
    fees: Amount,
    fees_display: String,
}

impl From<&UnsignedTxBatch> for BatchOutput {
    fn from(batch: &UnsignedTxBatch) -> Self {
        Self {
            tx_ids: batch.unsigned_txs().iter().map(|tx| tx.tx_id.clone()).collect(),
            fees: batch.fees().clone(),
            fees_display: format_amount(batch.fees(), NATIVE_DECIMALS),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run(command: Command, config: &WalletConfig) -> anyhow::Result<()> {
    match command {
        Command::Build {
            from,
            public_key,
            to,
            amount,
            tokens,
        } => {
            let assets = send_assets(amount, tokens)?;
            let node = HttpNodeClient::from_config(config)?;
            let batch = build(&node, &Address::new(from, public_key), &to, assets.as_slice()).await?;
            print_json(&BatchOutput::from(&batch))
        }
        Command::Sweep { from, public_key } => {
            let node = HttpNodeClient::from_config(config)?;
            let batch = build_sweep(&node, &Address::new(from, public_key)).await?;
            print_json(&BatchOutput::from(&batch))
        }
        Command::Sync { addresses } => {
            let syncer = syncer(config)?;
            let event = syncer.sync_addresses_data(&addresses).await?;
            print_json(&event.payload())
        }
        Command::Reconcile { pending, addresses } => {
            let store = load_pending(&pending)?;
            let syncer = syncer(config)?;
            let removed = reconcile_once(&syncer, &store, &events(), &addresses).await?;
            save_pending(&pending, &store).await?;
            print_json(&removed)
        }
        Command::Watch { pending, addresses } => {
            watch(config, &pending, &addresses).await
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn syncer(config: &WalletConfig) -> anyhow::Result<AddressSyncer> {
    let explorer = HttpExplorerClient::from_config(config)?;
    Ok(AddressSyncer::new(Arc::new(explorer), config.sync_page_limit))
}

fn events() -> EventBus {
    let mut bus = EventBus::new();
    bus.subscribe(Box::new(|event: &WalletEvent| {
        if let WalletEvent::PendingReconciled { removed } = event {
            for hash in removed {
                tracing::info!(%hash, "no longer pending");
            }
        }
    }));
    bus
}

async fn reconcile_once(
    syncer: &AddressSyncer,
    store: &SharedPendingStore,
    events: &EventBus,
    addresses: &[AddressHash],
) -> anyhow::Result<Vec<TxHash>> {
    let event = syncer.sync_addresses_data(addresses).await?;
    Ok(reconcile_pending(store, events, &event).await)
}

async fn watch(config: &WalletConfig, pending: &Path, addresses: &[AddressHash]) -> anyhow::Result<()> {
    let store = load_pending(pending)?;
    let syncer = syncer(config)?;
    let events = events();
    let mut ticker = tokio::time::interval(config.sync_interval());

    tracing::info!(
        addresses = addresses.len(),
        pending = store.read().await.len(),
        interval_secs = config.sync_interval_secs,
        "watching"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match reconcile_once(&syncer, &store, &events, addresses).await {
                    Ok(removed) if !removed.is_empty() => save_pending(pending, &store).await?,
                    Ok(_) => {}
                    Err(e) => tracing::warn!("sync failed: {e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown signal received, stopping watch");
                break;
            }
        }
    }
    save_pending(pending, &store).await
}

/// Read the pending list; a missing file is an empty list.
fn load_pending(path: &Path) -> anyhow::Result<SharedPendingStore> {
    let store = PendingTransactionStore::shared();
    if !path.exists() {
        return Ok(store);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let entries: Vec<PendingTransaction> = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;

    let mut guard = store
        .try_write()
        .context("pending store is already in use")?;
    for entry in entries {
        guard.insert(entry);
    }
    drop(guard);
    Ok(store)
}

async fn save_pending(path: &Path, store: &SharedPendingStore) -> anyhow::Result<()> {
    let entries = store.read().await.enumerate();
    std::fs::write(path, serde_json::to_string_pretty(&entries)?)
        .with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_types::Timestamp;
    use ferry_wallet_core::PendingStatus;

    #[test]
    fn token_argument_parses() {
        let id = "ab".repeat(32);
        let parsed = parse_token(&format!("{id}=42")).unwrap();
        assert_eq!(parsed.id.as_str(), id);
        assert_eq!(parsed.amount, Amount::from(42u64));

        assert!(parse_token("no-separator").is_err());
        assert!(parse_token(&format!("{id}=-1")).is_err());
    }

    fn token(byte: u8, amount: u64) -> AssetAmount {
        parse_token(&format!("{}={amount}", format!("{byte:02x}").repeat(32))).unwrap()
    }

    #[test]
    fn repeated_token_is_rejected() {
        let err = send_assets(None, vec![token(0x11, 3), token(0x11, 4)]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn native_id_as_token_is_rejected() {
        let err = send_assets(Some(Amount::from(10u64)), vec![token(0, 5)]).unwrap_err();
        assert!(err.to_string().contains("--amount"));
    }

    #[test]
    fn send_assets_hold_one_entry_per_asset_without_zeros() {
        let assets = send_assets(
            Some(Amount::from(10u64)),
            vec![token(0x11, 3), token(0x22, 0)],
        )
        .unwrap();

        let ids: Vec<_> = assets.iter().map(|a| a.id.clone()).collect();
        assert_eq!(ids, vec![token(0x11, 3).id, AssetId::native()]);
        assert_eq!(assets.get(&AssetId::native()), Some(&Amount::from(10u64)));

        let none = send_assets(Some(Amount::zero()), Vec::new()).unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn pending_file_survives_a_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pending.json");

        let empty = load_pending(&path).unwrap();
        assert!(empty.read().await.is_empty());

        empty.write().await.insert(PendingTransaction {
            hash: TxHash::new("t1"),
            from_address: AddressHash::parse("addr1").unwrap(),
            to_address: AddressHash::parse("addr2").unwrap(),
            amount: Amount::from(10u64),
            tokens: Vec::new(),
            timestamp: Timestamp::from_millis(5),
            status: PendingStatus::Pending,
        });
        save_pending(&path, &empty).await.unwrap();

        let loaded = load_pending(&path).unwrap();
        assert_eq!(loaded.read().await.enumerate(), empty.read().await.enumerate());
    }
}
