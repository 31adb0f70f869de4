use std::io;

use tokio::net::TcpStream;

use crate::prelude::*;

const BUFFER_SIZE: usize = 1024;

/// Sent when no message is supplied on the command line.
pub const DEFAULT_MESSAGE: &str =
    "Who has not asked himself at some time or other: am I a monster or is this what it means to be a person?";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("connecting to {endpoint}: {source}")]
    Connect {
        endpoint: Endpoint,
        #[source]
        source: io::Error,
    },
    #[error("sending message: {0}")]
    Send(#[source] io::Error),
    #[error("receiving response: {0}")]
    Receive(#[source] io::Error),
}

/// What the single read of the session produced.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The echoed response, decoded as UTF-8.
    Response(String),
    /// The response was not valid UTF-8; the exchange still counts as
    /// successful and the raw bytes are kept.
    Binary(Vec<u8>),
    /// The peer closed the connection without sending any data.
    PeerClosed,
}

/// One-shot session: connect, send `message` in a single write, perform
/// exactly one read, close. Each call is independent; the stream is
/// dropped on every exit path.
///
/// The single read mirrors the reference behavior and assumes the whole
/// echo arrives in one segment; an echo split across segments would be
/// truncated. Kept as-is rather than silently looping.
pub async fn run(endpoint: &Endpoint, message: &str) -> Result<Outcome, ClientError> {
    let connect_err = |source| ClientError::Connect {
        endpoint: endpoint.clone(),
        source,
    };
    let addr = endpoint.resolve().await.map_err(&connect_err)?;
    let mut stream = TcpStream::connect(addr).await.map_err(&connect_err)?;
    debug!("connected to {addr}");

    stream
        .write_all(message.as_bytes())
        .await
        .map_err(ClientError::Send)?;

    let mut buf = [0u8; BUFFER_SIZE];
    let n = stream.read(&mut buf).await.map_err(ClientError::Receive)?;
    if n == 0 {
        info!("server closed the connection without data");
        return Ok(Outcome::PeerClosed);
    }
    match std::str::from_utf8(&buf[..n]) {
        Ok(text) => Ok(Outcome::Response(text.to_string())),
        Err(err) => {
            warn!("response is not valid utf-8: {err}");
            Ok(Outcome::Binary(buf[..n].to_vec()))
        }
    }
}

pub fn main(endpoint: Endpoint, message: String) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async {
            match run(&endpoint, &message).await? {
                Outcome::Response(text) => println!("server response: {text}"),
                Outcome::Binary(bytes) => println!("server response (non-utf8): {bytes:02x?}"),
                Outcome::PeerClosed => println!("server closed the connection without data"),
            }
            Ok(())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::Listener;
    use tokio::net::TcpListener;

    fn local_endpoint(port: u16) -> Endpoint {
        Endpoint::new("127.0.0.1", port)
    }

    #[tokio::test]
    async fn round_trip_against_real_server() -> anyhow::Result<()> {
        let listener = Listener::bind(&Endpoint::new("127.0.0.1", 0)).await?;
        let port = listener.local_addr()?.port();
        tokio::task::spawn(listener.serve());

        let outcome = run(&local_endpoint(port), "ping").await?;
        assert_eq!(outcome, Outcome::Response("ping".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn refused_connection_is_a_connect_error() {
        // Bind then drop so the port is very likely unused.
        let port = {
            let sock = TcpListener::bind("127.0.0.1:0").await.unwrap();
            sock.local_addr().unwrap().port()
        };

        let res = run(&local_endpoint(port), "ping").await;
        assert!(matches!(res, Err(ClientError::Connect { .. })));
    }

    #[tokio::test]
    async fn peer_closing_without_data_is_reported() -> anyhow::Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        tokio::task::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            // Consume the request, then close without answering.
            stream.read(&mut buf).await.unwrap();
            stream.shutdown().await.unwrap();
        });

        let outcome = run(&local_endpoint(port), "ping").await?;
        assert_eq!(outcome, Outcome::PeerClosed);
        Ok(())
    }

    #[tokio::test]
    async fn non_utf8_response_is_kept_raw() -> anyhow::Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        tokio::task::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            stream.read(&mut buf).await.unwrap();
            stream.write_all(&[0xFF, 0xFE]).await.unwrap();
        });

        let outcome = run(&local_endpoint(port), "ping").await?;
        assert_eq!(outcome, Outcome::Binary(vec![0xFF, 0xFE]));
        Ok(())
    }

    #[tokio::test]
    async fn unresolvable_host_is_a_connect_error() {
        let endpoint = Endpoint::new("host.invalid.", 12346);
        let res = run(&endpoint, "ping").await;
        assert!(matches!(res, Err(ClientError::Connect { .. })));
    }
}
