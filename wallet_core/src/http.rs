//! HTTP implementation of [`NodeClient`] against the node REST API.

use async_trait::async_trait;
use ferry_types::{Amount, AssetAmount, AddressHash, TxHash};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::address::Address;
use crate::amounts::aggregate;
use crate::auth::{SignerError, TransactionSigner};
use crate::config::WalletConfig;
use crate::node::{NodeClient, NodeError, UnsignedTx, UnsignedTxBatch};

// ── Wire types ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BuildTransactionRequest<'a> {
    from_public_key: &'a str,
    destinations: Vec<Destination<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Destination<'a> {
    address: &'a AddressHash,
    atto_alph_amount: Amount,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tokens: Vec<AssetAmount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuiltTransaction {
    tx_id: TxHash,
    unsigned_tx: String,
    gas_amount: u64,
    gas_price: Amount,
}

impl BuiltTransaction {
    fn fee(&self) -> Amount {
        &self.gas_price * self.gas_amount
    }

    fn into_unsigned(self) -> UnsignedTx {
        UnsignedTx {
            tx_id: self.tx_id,
            unsigned_tx: self.unsigned_tx,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SweepRequest<'a> {
    from_public_key: &'a str,
    to_address: &'a AddressHash,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SweepResponse {
    unsigned_txs: Vec<BuiltTransaction>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest<'a> {
    unsigned_tx: &'a str,
    signature: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    tx_id: TxHash,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    detail: Option<String>,
}

/// Turn a batch of built transactions into one [`UnsignedTxBatch`] whose fee
/// is the sum of the individual fees.
fn into_batch(built: Vec<BuiltTransaction>) -> UnsignedTxBatch {
    let fees = built.iter().map(BuiltTransaction::fee).sum();
    UnsignedTxBatch::new(built.into_iter().map(BuiltTransaction::into_unsigned).collect(), fees)
}

/// Error for a non-success response. The body is only trusted for its
/// `detail` field.
fn api_error(status: u16, body: &str) -> NodeError {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.detail);
    NodeError::Api { status, detail }
}

fn build_request<'a>(from: &'a Address, to: &'a AddressHash, assets: &[AssetAmount]) -> BuildTransactionRequest<'a> {
    let totals = aggregate(assets);
    BuildTransactionRequest {
        from_public_key: &from.public_key,
        destinations: vec![Destination {
            address: to,
            atto_alph_amount: totals.native_amount,
            tokens: totals.token_amounts,
        }],
    }
}

// ── Client ──────────────────────────────────────────────────────────────

/// HTTP client for the node REST API.
///
/// Signing is delegated to a [`TransactionSigner`]; without one, building
/// works and submitting fails.
#[derive(Clone)]
pub struct HttpNodeClient {
    http: reqwest::Client,
    node_url: String,
    signer: Option<Arc<dyn TransactionSigner>>,
}

impl HttpNodeClient {
    /// Create a client targeting the given base URL (e.g. `http://127.0.0.1:22973`).
    pub fn new(node_url: impl Into<String>, timeout: Duration, connect_timeout: Duration) -> Result<Self, NodeError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| NodeError::Request(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            node_url: node_url.into().trim_end_matches('/').to_string(),
            signer: None,
        })
    }

    pub fn from_config(config: &WalletConfig) -> Result<Self, NodeError> {
        Self::new(
            config.node_host.clone(),
            config.request_timeout(),
            config.connect_timeout(),
        )
    }

    pub fn with_signer(mut self, signer: Arc<dyn TransactionSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// The configured node URL.
    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    async fn post<B: Serialize + Sync, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R, NodeError> {
        let url = format!("{}{}", self.node_url, path);
        debug!(%url, "node request");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| NodeError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = api_error(status.as_u16(), &body);
            warn!(%url, %err, "node rejected request");
            return Err(err);
        }

        response
            .json()
            .await
            .map_err(|e| NodeError::Decode(e.to_string()))
    }
}

#[async_trait]
impl NodeClient for HttpNodeClient {
    async fn build_unsigned_transactions(
        &self,
        from: &Address,
        to: &AddressHash,
        assets: &[AssetAmount],
    ) -> Result<UnsignedTxBatch, NodeError> {
        let built: BuiltTransaction = self
            .post("/transactions/build", &build_request(from, to, assets))
            .await?;
        Ok(into_batch(vec![built]))
    }

    async fn build_sweep_transactions(
        &self,
        from: &Address,
        to: &AddressHash,
    ) -> Result<UnsignedTxBatch, NodeError> {
        let request = SweepRequest {
            from_public_key: &from.public_key,
            to_address: to,
        };
        let response: SweepResponse = self
            .post("/transactions/sweep-address/build", &request)
            .await?;
        Ok(into_batch(response.unsigned_txs))
    }

    async fn sign_and_send_transaction(
        &self,
        from: &Address,
        tx_id: &TxHash,
        unsigned_tx: &str,
    ) -> Result<TxHash, NodeError> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| SignerError("no signer configured".into()))?;
        let signature = signer.sign(from, tx_id.as_str()).await?;
        let response: SubmitResponse = self
            .post(
                "/transactions/submit",
                &SubmitRequest {
                    unsigned_tx,
                    signature: &signature,
                },
            )
            .await?;
        Ok(response.tx_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_types::AssetId;

    fn from() -> Address {
        Address::new(AddressHash::parse("addr1").unwrap(), "02abcd")
    }

    #[test]
    fn build_request_has_node_shape() {
        let from = from();
        let to = AddressHash::parse("addr2").unwrap();
        let token = AssetId::parse(&"11".repeat(32)).unwrap();
        let assets = vec![
            AssetAmount::new(AssetId::native(), 10u64),
            AssetAmount::new(token.clone(), 3u64),
        ];

        let json = serde_json::to_value(build_request(&from, &to, &assets)).unwrap();

        assert_eq!(json["fromPublicKey"], "02abcd");
        let dest = &json["destinations"][0];
        assert_eq!(dest["address"], "addr2");
        // Raised to the per-token dust minimum.
        assert_eq!(dest["attoAlphAmount"], "1000000000000000");
        assert_eq!(dest["tokens"][0]["id"], token.as_str());
        assert_eq!(dest["tokens"][0]["amount"], "3");
    }

    #[test]
    fn native_only_request_omits_tokens() {
        let from = from();
        let to = AddressHash::parse("addr2").unwrap();
        let assets = vec![AssetAmount::new(AssetId::native(), 10u64)];
        let json = serde_json::to_value(build_request(&from, &to, &assets)).unwrap();
        assert_eq!(json["destinations"][0]["attoAlphAmount"], "10");
        assert!(json["destinations"][0].get("tokens").is_none());
    }

    #[test]
    fn batch_fee_is_gas_amount_times_price_summed() {
        let body = r#"{"unsignedTxs":[
            {"txId":"t1","unsignedTx":"u1","gasAmount":20000,"gasPrice":"100000000000"},
            {"txId":"t2","unsignedTx":"u2","gasAmount":30000,"gasPrice":"100000000000"}
        ]}"#;
        let response: SweepResponse = serde_json::from_str(body).unwrap();
        let batch = into_batch(response.unsigned_txs);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.unsigned_txs()[0].tx_id, TxHash::new("t1"));
        assert_eq!(batch.unsigned_txs()[1].unsigned_tx, "u2");
        assert_eq!(batch.fees(), &Amount::from(5_000_000_000_000_000u64));
    }

    #[test]
    fn api_error_extracts_detail() {
        let err = api_error(500, r#"{"detail":"Too many inputs, consider consolidating"}"#);
        assert_eq!(err.detail(), Some("Too many inputs, consider consolidating"));
        assert_eq!(err.kind(), crate::node::NodeErrorKind::ConsolidationRequired);
    }

    #[test]
    fn api_error_tolerates_non_json_body() {
        let err = api_error(502, "<html>bad gateway</html>");
        assert!(matches!(err, NodeError::Api { status: 502, detail: None }));
    }

    #[tokio::test]
    async fn submit_without_signer_fails_before_any_request() {
        let client = HttpNodeClient::new(
            "http://127.0.0.1:1",
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap();
        let err = client
            .sign_and_send_transaction(&from(), &TxHash::new("t1"), "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::Signing(_)));
    }
}
