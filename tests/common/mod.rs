//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tools_gateway::tools::ToolApi;
use tools_gateway::{GatewayConfig, GatewayServer, Shutdown};

/// A gateway running on an ephemeral local port.
pub struct RunningGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl RunningGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let result = tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop in time")
            .expect("server task panicked");
        result.expect("server returned an error");
    }
}

/// Start a gateway with the default tools plus `extra`.
pub async fn start_gateway(config: GatewayConfig, extra: Vec<Box<dyn ToolApi>>) -> RunningGateway {
    let mut tools = tools_gateway::tools::default_tools();
    tools.extend(extra);

    let server = GatewayServer::with_tools(config, tools).expect("tools mount cleanly");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let signalled = shutdown.signalled();
    let handle = tokio::spawn(async move { server.run(listener, signalled).await });

    RunningGateway { addr, shutdown, handle }
}

/// HTTP client that never pools or proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
