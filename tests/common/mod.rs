//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use wallet_watch::config::TrackersConfig;

pub const EVM_ADDR: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb1";
pub const OTHER_EVM_ADDR: &str = "0x1111111111111111111111111111111111111111";
pub const TON_ADDR: &str = "EQD1Lp1KcmGHFpE8eIvL1mnHT83b4HdB8HJxuSfq6Rq4zGyN";

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub method: String,
    pub target: String,
    pub body: String,
}

impl MockRequest {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or_default()
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.target.split_once('?')?.1;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<MockRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    Some(MockRequest {
        method,
        target,
        body,
    })
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` maps each request to a status code and a JSON body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(MockRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                let (status, body) = f(request).await;
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason(status),
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Tracker settings pointing every chain at `addr`, with no pacing.
pub fn trackers_for(addr: SocketAddr) -> TrackersConfig {
    let mut config = TrackersConfig::default();
    config.rate_limit_min_interval_ms = 0;
    config.request_timeout_secs = 5;
    config.ton.base_url = format!("http://{addr}/api/v2");
    config.ethereum.base_url = format!("http://{addr}/v2/api");
    config.bsc.base_url = format!("http://{addr}/v2/api");
    config
}

/// `0x`-prefixed 64-digit hash for `n`.
pub fn tx_hash(n: u64) -> String {
    format!("0x{n:064x}")
}

/// Etherscan `txlist` body: incoming transfers of 1 ETH to `to`, newest first.
pub fn etherscan_txlist(to: &str, hashes: &[String]) -> String {
    if hashes.is_empty() {
        return serde_json::json!({
            "status": "0", "message": "No transactions found", "result": []
        })
        .to_string();
    }

    let records: Vec<_> = hashes
        .iter()
        .enumerate()
        .map(|(i, hash)| {
            serde_json::json!({
                "blockNumber": "19000000",
                "timeStamp": (1_700_000_000 - i as i64).to_string(),
                "hash": hash,
                "from": OTHER_EVM_ADDR,
                "to": to.to_lowercase(),
                "value": "1000000000000000000",
                "isError": "0",
                "txreceipt_status": "1"
            })
        })
        .collect();

    serde_json::json!({ "status": "1", "message": "OK", "result": records }).to_string()
}
