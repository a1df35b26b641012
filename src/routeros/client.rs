// TCP client for the RouterOS API (plain API service, port 8728)

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;

use super::protocol::{parse_reply, read_sentence, write_sentence, Reply, ReplyKind};
use super::{Record, RouterClient, RouterTarget, Session};
use crate::error::ClientError;

pub const DEFAULT_API_PORT: u16 = 8728;

/// Append the default API port when the address has none
pub fn with_default_port(address: &str) -> String {
    let has_port = match address.rsplit_once(':') {
        // Bracketed IPv6 literal: only a colon after `]` separates a port
        Some((host, port)) if address.starts_with('[') => host.ends_with(']') && port.parse::<u16>().is_ok(),
        // Bare IPv6 literal cannot carry a port
        Some((host, _)) if host.contains(':') => false,
        Some((_, port)) => port.parse::<u16>().is_ok(),
        None => false,
    };

    if has_port {
        address.to_string()
    } else if address.contains(':') && !address.starts_with('[') {
        format!("[{}]:{}", address, DEFAULT_API_PORT)
    } else {
        format!("{}:{}", address, DEFAULT_API_PORT)
    }
}

/// Connects to the RouterOS API over TCP
#[derive(Debug, Clone, Default)]
pub struct TcpRouterClient;

impl TcpRouterClient {
    pub fn new() -> Self {
        TcpRouterClient
    }
}

#[async_trait]
impl RouterClient for TcpRouterClient {
    async fn open(&self, target: &RouterTarget) -> Result<Box<dyn Session>, ClientError> {
        let address = with_default_port(&target.address);
        tracing::debug!("Connecting to RouterOS API at {}", address);

        let stream = TcpStream::connect(&address)
            .await
            .map_err(|source| ClientError::Connect {
                address: address.clone(),
                source,
            })?;
        let (reader, writer) = stream.into_split();

        let mut session = ApiSession::new(reader, writer);
        session.login(&target.username, &target.password).await?;
        tracing::debug!("Logged in to {} as {}", address, target.username);

        Ok(Box::new(session))
    }
}

/// A logged-in API connection over any byte stream
pub struct ApiSession<R, W> {
    reader: BufReader<R>,
    writer: BufWriter<W>,
}

impl<R, W> ApiSession<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        ApiSession {
            reader: BufReader::new(reader),
            writer: BufWriter::new(writer),
        }
    }

    /// Post-6.43 login: credentials in the first `/login` sentence
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        let name = format!("=name={}", username);
        let password = format!("=password={}", password);
        write_sentence(&mut self.writer, &["/login", name.as_str(), password.as_str()]).await?;

        match self.exchange("/login").await {
            Ok(_) => Ok(()),
            Err(ClientError::Trap { message, .. }) => Err(ClientError::LoginRejected(message)),
            Err(e) => Err(e),
        }
    }

    async fn read_reply(&mut self) -> Result<Reply, ClientError> {
        let sentence = read_sentence(&mut self.reader).await?;
        parse_reply(sentence)
    }

    /// Read replies up to `!done`, keeping `!re` rows in order
    async fn exchange(&mut self, command: &str) -> Result<Vec<Record>, ClientError> {
        let mut records = Vec::new();
        let mut trap: Option<String> = None;

        loop {
            let reply = self.read_reply().await?;
            match reply.kind {
                ReplyKind::Re => records.push(reply.attributes),
                ReplyKind::Empty => {}
                ReplyKind::Trap => {
                    // The router still sends `!done` after a trap; keep reading so
                    // the stream stays aligned for the next command.
                    if trap.is_none() {
                        trap = Some(reply.message());
                    }
                }
                ReplyKind::Fatal => return Err(ClientError::Fatal(reply.message())),
                ReplyKind::Done => break,
            }
        }

        match trap {
            Some(message) => Err(ClientError::Trap {
                command: command.to_string(),
                message,
            }),
            None => Ok(records),
        }
    }
}

#[async_trait]
impl<R, W> Session for ApiSession<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn run(&mut self, command: &str) -> Result<Vec<Record>, ClientError> {
        write_sentence(&mut self.writer, &[command]).await?;
        self.exchange(command).await
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        // `/quit` is answered with `!fatal`; nothing to wait for.
        write_sentence(&mut self.writer, &["/quit"]).await?;
        self.writer.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_with_default_port() {
        assert_eq!(with_default_port("192.0.2.1"), "192.0.2.1:8728");
        assert_eq!(with_default_port("192.0.2.1:8729"), "192.0.2.1:8729");
        assert_eq!(with_default_port("router.example.net"), "router.example.net:8728");
        assert_eq!(with_default_port("2001:db8::1"), "[2001:db8::1]:8728");
        assert_eq!(with_default_port("[2001:db8::1]:9000"), "[2001:db8::1]:9000");
        assert_eq!(with_default_port("[2001:db8::1]"), "[2001:db8::1]:8728");
    }

    /// Serve one connection: accept the login, answer each command from `script`.
    async fn scripted_router(script: Vec<(&'static str, Vec<Vec<&'static str>>)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, writer) = stream.into_split();
            let mut reader = BufReader::new(reader);
            let mut writer = BufWriter::new(writer);

            let login = read_sentence(&mut reader).await.unwrap();
            assert_eq!(login[0], "/login");
            if login.contains(&"=password=secret".to_string()) {
                write_sentence(&mut writer, &["!done"]).await.unwrap();
            } else {
                write_sentence(&mut writer, &["!trap", "=message=invalid user name or password (6)"])
                    .await
                    .unwrap();
                write_sentence(&mut writer, &["!done"]).await.unwrap();
                return;
            }

            for (expected, replies) in script {
                let command = read_sentence(&mut reader).await.unwrap();
                assert_eq!(command, vec![expected.to_string()]);
                for reply in replies {
                    write_sentence(&mut writer, &reply).await.unwrap();
                }
            }

            let quit = read_sentence(&mut reader).await.unwrap();
            assert_eq!(quit, vec!["/quit".to_string()]);
        });

        address
    }

    fn target(address: String, password: &str) -> RouterTarget {
        RouterTarget {
            address,
            username: "admin".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_run_collects_records_in_order() {
        let address = scripted_router(vec![(
            "/routing/bgp/network/print",
            vec![
                vec!["!re", "=.id=*1", "=network=203.0.113.0/24"],
                vec!["!re", "=.id=*2", "=network=2001:db8::/32"],
                vec!["!done"],
            ],
        )])
        .await;

        let mut session = TcpRouterClient::new().open(&target(address, "secret")).await.unwrap();
        let records = session.run("/routing/bgp/network/print").await.unwrap();
        session.close().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["network"], "203.0.113.0/24");
        assert_eq!(records[1]["network"], "2001:db8::/32");
    }

    #[tokio::test]
    async fn test_trap_is_reported_and_stream_stays_usable() {
        let address = scripted_router(vec![
            (
                "/routing/bgp/instance/print",
                vec![vec!["!trap", "=message=no such command prefix"], vec!["!done"]],
            ),
            ("/system/identity/print", vec![vec!["!re", "=name=core-rtr1"], vec!["!done"]]),
        ])
        .await;

        let mut session = TcpRouterClient::new().open(&target(address, "secret")).await.unwrap();

        match session.run("/routing/bgp/instance/print").await {
            Err(ClientError::Trap { command, message }) => {
                assert_eq!(command, "/routing/bgp/instance/print");
                assert_eq!(message, "no such command prefix");
            }
            other => panic!("expected trap, got {:?}", other.map(|r| r.len())),
        }

        let records = session.run("/system/identity/print").await.unwrap();
        assert_eq!(records[0]["name"], "core-rtr1");
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_fatal_reply_ends_command() {
        let address = scripted_router(vec![(
            "/routing/bgp/peer/print",
            vec![vec!["!fatal", "session terminated"]],
        )])
        .await;

        let mut session = TcpRouterClient::new().open(&target(address, "secret")).await.unwrap();

        match session.run("/routing/bgp/peer/print").await {
            Err(ClientError::Fatal(message)) => assert_eq!(message, "session terminated"),
            other => panic!("expected fatal, got {:?}", other.map(|r| r.len())),
        }
        let _ = session.close().await;
    }

    #[tokio::test]
    async fn test_empty_reply_yields_no_records() {
        let address = scripted_router(vec![(
            "/routing/bgp/network/print",
            vec![vec!["!empty"], vec!["!done"]],
        )])
        .await;

        let mut session = TcpRouterClient::new().open(&target(address, "secret")).await.unwrap();
        let records = session.run("/routing/bgp/network/print").await.unwrap();
        session.close().await.unwrap();

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let address = scripted_router(vec![]).await;

        match TcpRouterClient::new().open(&target(address, "wrong")).await {
            Err(ClientError::LoginRejected(message)) => assert!(message.contains("invalid user name")),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("login should have been rejected"),
        }
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let result = TcpRouterClient::new().open(&target(address, "secret")).await;
        assert!(matches!(result, Err(ClientError::Connect { .. })));
    }
}
