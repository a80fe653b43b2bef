#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use framebridge_gateway::discovery::ProviderInfo;
use framebridge_gateway::dispatch::MethodTable;
use framebridge_gateway::host::{BridgeHost, LocalFrame};
use framebridge_gateway::stub::{bootstrap, FrameScope, StubRuntime};
use framebridge_gateway::transport::{MessagePort, Origin, Window, WindowHandle};
use framebridge_gateway::wallet::{WalletConnection, WalletConnector, WalletError};

pub const HOST_ORIGIN: &str = "https://host.test";
pub const FRAME_ORIGIN: &str = "https://miniapp.test";
pub const ACCOUNT: &str = "0x00000000000000000000000000000000000000aa";

/// One scripted answer, optionally delayed.
#[derive(Clone)]
pub struct Reply {
    pub outcome: Result<Value, WalletError>,
    pub delay: Duration,
}

/// Wallet answering from a fixed table and recording what it was asked.
#[derive(Default)]
pub struct ScriptedWallet {
    replies: HashMap<String, Reply>,
    pub calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl ScriptedWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, method: &str, result: Value) -> Self {
        self.replies.insert(
            method.to_string(),
            Reply {
                outcome: Ok(result),
                delay: Duration::ZERO,
            },
        );
        self
    }

    pub fn answer_after(mut self, method: &str, result: Value, delay: Duration) -> Self {
        self.replies.insert(
            method.to_string(),
            Reply {
                outcome: Ok(result),
                delay,
            },
        );
        self
    }

    pub fn fail(mut self, method: &str, err: WalletError) -> Self {
        self.replies.insert(
            method.to_string(),
            Reply {
                outcome: Err(err),
                delay: Duration::ZERO,
            },
        );
        self
    }

    pub fn methods_called(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
    }
}

#[async_trait]
impl WalletConnection for ScriptedWallet {
    async fn accounts(&self) -> Result<Vec<String>, WalletError> {
        Ok(vec![ACCOUNT.to_string()])
    }

    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, WalletError> {
        self.calls.lock().unwrap().push((method.to_string(), params));
        let Some(reply) = self.replies.get(method).cloned() else {
            return Err(WalletError::new(4200, format!("Unsupported method: {method}")));
        };
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.outcome
    }
}

pub struct ScriptedConnector {
    pub wallet: Option<Arc<ScriptedWallet>>,
}

impl ScriptedConnector {
    pub fn connected(wallet: ScriptedWallet) -> Arc<Self> {
        Arc::new(Self {
            wallet: Some(Arc::new(wallet)),
        })
    }

    pub fn disconnected() -> Arc<Self> {
        Arc::new(Self { wallet: None })
    }

    pub fn calls(&self) -> Vec<String> {
        self.wallet.as_ref().map(|w| w.methods_called()).unwrap_or_default()
    }
}

impl WalletConnector for ScriptedConnector {
    fn connection(&self) -> Option<Arc<dyn WalletConnection>> {
        self.wallet
            .as_ref()
            .map(|w| Arc::clone(w) as Arc<dyn WalletConnection>)
    }
}

/// Host page + embedded frame wired in-process, stub installed and listening.
pub struct Bridge {
    pub host: Arc<BridgeHost>,
    pub host_window: WindowHandle,
    pub frame_window: WindowHandle,
    pub scope: Arc<FrameScope>,
    pub runtime: StubRuntime,
}

pub fn bridge(wallet: Arc<dyn WalletConnector>, call_timeout: Duration) -> Bridge {
    let (host_window, host_rx) = Window::new(Origin::new(HOST_ORIGIN)).into_parts();
    let (frame_window, frame_rx) = Window::new(Origin::new(FRAME_ORIGIN)).into_parts();

    let host = Arc::new(BridgeHost::new(wallet, Arc::new(MethodTable::new())));
    host.attach(Arc::new(LocalFrame::new(host_window.clone(), frame_window.clone())));
    host.spawn_listener(host_rx);

    let scope = Arc::new(FrameScope::new());
    let parent: Arc<dyn MessagePort> = Arc::new(host_window.port_from(&frame_window));
    let runtime = bootstrap(
        Arc::clone(&scope),
        parent,
        frame_rx,
        ProviderInfo::default(),
        call_timeout,
    )
    .expect("fresh scope accepts the stub");

    Bridge {
        host,
        host_window,
        frame_window,
        scope,
        runtime,
    }
}
