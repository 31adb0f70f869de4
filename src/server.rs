use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpSocket, TcpStream};

use crate::prelude::*;

const BACKLOG: u32 = 5;
const BUFFER_SIZE: usize = 1024;

/// The server's listening socket, owned explicitly by whichever task
/// drives `serve`.
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Binds and starts listening. Any failure here is fatal to startup.
    pub async fn bind(endpoint: &Endpoint) -> anyhow::Result<Self> {
        let addr = endpoint
            .resolve()
            .await
            .with_context(|| format!("resolving bind address {endpoint}"))?;
        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4(),
            SocketAddr::V6(_) => TcpSocket::new_v6(),
        }
        .context("creating listening socket")?;
        socket
            .bind(addr)
            .with_context(|| format!("binding to {addr}"))?;
        let inner = socket.listen(BACKLOG).context("listening")?;
        info!("listening on {}", inner.local_addr()?);
        Ok(Self { inner })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.inner.local_addr()?)
    }

    /// Accept loop. Each accepted connection is handed to its own task
    /// and never awaited; an accept failure is logged and the loop keeps
    /// going. Runs until the process is killed.
    pub async fn serve(self) -> anyhow::Result<()> {
        loop {
            match self.inner.accept().await {
                Ok((stream, peer)) => {
                    tokio::task::spawn(handle_client(stream, peer));
                }
                Err(err) => warn!("accept failed: {err}"),
            }
        }
    }
}

/// Services exactly one connection: read a chunk, echo it back, repeat
/// until the peer disconnects or the socket errors. The stream is owned
/// here, so it is closed exactly once on every exit path. Errors stay
/// local to this task.
async fn handle_client(mut stream: TcpStream, peer: SocketAddr) {
    let mut buf = [0u8; BUFFER_SIZE];
    loop {
        let n = match stream.read(&mut buf).await {
            Ok(0) => {
                info!("{peer} disconnected");
                break;
            }
            Ok(n) => n,
            Err(err) => {
                warn!("{peer}: read failed: {err}");
                break;
            }
        };
        let chunk = &buf[..n];
        // Decode is observability only; the echo is byte-exact either way.
        match std::str::from_utf8(chunk) {
            Ok(text) => debug!("{peer}: received {text:?}"),
            Err(err) => warn!("{peer}: received non-utf8 data: {err}"),
        }
        if let Err(err) = stream.write_all(chunk).await {
            warn!("{peer}: write failed: {err}");
            break;
        }
    }
    stream.shutdown().await.ok();
}

pub fn main(endpoint: Endpoint) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let listener = Listener::bind(&endpoint).await?;
            listener.serve().await
        })
}
