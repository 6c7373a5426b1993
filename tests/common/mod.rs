//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use forward_proxy::config::ProxyConfig;
use forward_proxy::net::Listener;
use forward_proxy::{ObjectCache, ProxyServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A mock origin that answers every connection with the same bytes and
/// remembers what it was sent.
#[allow(dead_code)]
pub struct MockOrigin {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl MockOrigin {
    /// Number of connections the origin has served.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Raw request heads received so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a mock origin on an ephemeral port.
pub async fn start_mock_origin(response: Vec<u8>) -> MockOrigin {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let response = Arc::new(response);

    let (h, r) = (hits.clone(), requests.clone());
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let (h, r, response) = (h.clone(), r.clone(), response.clone());
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        h.fetch_add(1, Ordering::SeqCst);
                        r.lock().unwrap().push(head);
                        let _ = socket.write_all(&response).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockOrigin { addr, hits, requests }
}

async fn read_head(socket: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.ends_with(b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

/// A running proxy bound to an ephemeral port.
#[allow(dead_code)]
pub struct TestProxy {
    pub addr: SocketAddr,
    pub cache: Arc<ObjectCache>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

/// Start a proxy with `config`; the listener is bound before this returns.
pub async fn start_proxy(mut config: ProxyConfig) -> TestProxy {
    config.listener.bind_host = "127.0.0.1".into();
    let listener = Listener::bind(&config.listener, 0).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cache = Arc::new(ObjectCache::new(config.cache.slots, config.cache.max_object_size));

    let shutdown = Shutdown::new();
    let server = ProxyServer::new(&config, cache.clone());
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestProxy { addr, cache, shutdown, handle }
}

/// Send a raw request through the proxy and collect everything until close.
pub async fn send(proxy: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(proxy).await.unwrap();
    stream.write_all(request).await.unwrap();

    let mut response = Vec::new();
    let read = tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut response))
        .await
        .expect("proxy did not close the connection");
    match read {
        Ok(_) => {}
        // Closing with unread request bytes may reset instead of FIN.
        Err(e) if e.kind() == std::io::ErrorKind::ConnectionReset => {}
        Err(e) => panic!("reading proxy response failed: {e}"),
    }
    response
}

/// Send `GET <url>` with a typical browser header set.
#[allow(dead_code)]
pub async fn get(proxy: SocketAddr, url: &str) -> Vec<u8> {
    let request = format!(
        "GET {url} HTTP/1.1\r\n\
         Host: {host}\r\n\
         User-Agent: test-client/1.0\r\n\
         Connection: keep-alive\r\n\
         Accept: */*\r\n\
         \r\n",
        host = url.trim_start_matches("http://").split('/').next().unwrap_or_default(),
    );
    send(proxy, request.as_bytes()).await
}
