use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Value};

use framebridge_core::error::{BridgeError, Result};
use framebridge_core::protocol::CallEnvelope;

use crate::wallet::WalletConnector;

/// Handles one wallet method on the host side.
#[async_trait]
pub trait MethodHandler: Send + Sync {
    async fn handle(&self, wallet: &dyn WalletConnector, call: &CallEnvelope) -> Result<Value>;
}

/// Open method table: name -> handler, with a default for everything else.
///
/// The default forwards verbatim, so wallet capabilities the bridge has never
/// heard of keep working.
pub struct MethodTable {
    handlers: DashMap<String, Arc<dyn MethodHandler>>,
    fallback: Arc<dyn MethodHandler>,
}

impl Default for MethodTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MethodTable {
    /// Table with the account-listing handlers and the forwarding default.
    pub fn new() -> Self {
        let table = Self::empty(Arc::new(ForwardHandler));
        let accounts: Arc<dyn MethodHandler> = Arc::new(AccountsHandler);
        table.register("eth_accounts", Arc::clone(&accounts));
        table.register("eth_requestAccounts", accounts);
        table
    }

    pub fn empty(fallback: Arc<dyn MethodHandler>) -> Self {
        Self {
            handlers: DashMap::new(),
            fallback,
        }
    }

    pub fn register(&self, method: impl Into<String>, handler: Arc<dyn MethodHandler>) {
        self.handlers.insert(method.into(), handler);
    }

    pub fn registered_methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    fn resolve(&self, method: &str) -> Arc<dyn MethodHandler> {
        self.handlers
            .get(method)
            .map(|h| Arc::clone(h.value()))
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }

    pub async fn dispatch(&self, wallet: &dyn WalletConnector, call: &CallEnvelope) -> Result<Value> {
        let handler = self.resolve(&call.method);
        handler.handle(wallet, call).await
    }
}

/// `eth_accounts` / `eth_requestAccounts`: the active address or `[]`. Never fails.
///
/// The requesting variant does not open a connect flow: an iframe-originated
/// call cannot surface a user-facing prompt from the host.
pub struct AccountsHandler;

#[async_trait]
impl MethodHandler for AccountsHandler {
    async fn handle(&self, wallet: &dyn WalletConnector, call: &CallEnvelope) -> Result<Value> {
        let Some(conn) = wallet.connection() else {
            return Ok(json!([]));
        };
        match conn.accounts().await {
            Ok(accounts) => Ok(json!(accounts.into_iter().take(1).collect::<Vec<_>>())),
            Err(e) => {
                tracing::debug!(id = call.id, error = %e, "account lookup failed; answering empty");
                Ok(json!([]))
            }
        }
    }
}

/// Default: fresh connection per call, `{method, params}` forwarded verbatim.
pub struct ForwardHandler;

#[async_trait]
impl MethodHandler for ForwardHandler {
    async fn handle(&self, wallet: &dyn WalletConnector, call: &CallEnvelope) -> Result<Value> {
        let conn = wallet.connection().ok_or(BridgeError::NotConnected)?;
        conn.request(&call.method, call.params.clone())
            .await
            .map_err(|e| BridgeError::Rpc(e.into_rpc_error()))
    }
}
