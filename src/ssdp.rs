use crate::error::Result;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use uuid::Uuid;

/// SSDP multicast group
pub const SSDP_MULTICAST_ADDR: &str = "239.255.255.250";

/// SSDP multicast port
pub const SSDP_PORT: u16 = 1900;

/// Search target advertised by Roku media players
pub const ROKU_SERVICE_TYPE: &str = "roku:ecp";

/// Seconds responders may spread their answers over (MX header)
const SEARCH_MX_SECS: u8 = 3;

/// SSDP datagrams are small header blocks; this is plenty
const MAX_DATAGRAM: usize = 1536;

const RESPONSE_CHANNEL_CAPACITY: usize = 64;

/// One unicast answer to an M-SEARCH request
///
/// Responses are ephemeral: they are consumed to decide device creation and
/// then discarded. No deduplication happens at this layer.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    /// Status code from the HTTP-style status line
    pub status: u16,

    /// Address the response was sent from
    pub sender: SocketAddr,

    headers: BTreeMap<String, String>,
}

impl SearchResponse {
    /// Whether the responder answered with 200 OK
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Look up a header by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// The ST header (search target the responder matched)
    pub fn st(&self) -> Option<&str> {
        self.header("ST")
    }

    /// The USN header (unique service name)
    pub fn usn(&self) -> Option<&str> {
        self.header("USN")
    }

    /// The LOCATION header (responder's description URL)
    pub fn location(&self) -> Option<&str> {
        self.header("LOCATION")
    }

    /// Device UUID embedded in the USN header (`uuid:<id>` or `uuid:<id>::<st>`)
    pub fn device_uuid(&self) -> Option<Uuid> {
        let usn = self.usn()?;
        let rest = usn.strip_prefix("uuid:")?;
        let id = rest.split("::").next()?;
        Uuid::parse_str(id).ok()
    }
}

/// Render an M-SEARCH request for the given service type
///
/// CRLF line endings are required by the protocol; bare newlines make strict
/// responders drop the request silently.
pub fn build_search(service_type: &str) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
HOST: {}:{}\r\n\
MAN: \"ssdp:discover\"\r\n\
MX: {}\r\n\
ST: {}\r\n\
\r\n",
        SSDP_MULTICAST_ADDR, SSDP_PORT, SEARCH_MX_SECS, service_type
    )
}

/// Parse a unicast search response datagram
///
/// Returns `None` for anything that is not an HTTP-style header block:
/// non-UTF-8 payloads, missing status line, M-SEARCH echoes from other
/// clients on the segment. Header names are folded to upper case.
pub fn parse_response(buf: &[u8], sender: SocketAddr) -> Option<SearchResponse> {
    let text = std::str::from_utf8(buf).ok()?;
    let mut lines = text.lines();

    let status = parse_status_line(lines.next()?)?;

    let mut headers = BTreeMap::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_uppercase(), value.trim().to_string());
        }
    }

    Some(SearchResponse {
        status,
        sender,
        headers,
    })
}

fn parse_status_line(line: &str) -> Option<u16> {
    let mut parts = line.split_whitespace();
    if !parts.next()?.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}

/// Client side of SSDP discovery
///
/// Sends a single multicast M-SEARCH and surfaces every answer as a message
/// on an output channel. The search is fire-once: no retry, no timeout —
/// responders may answer at any delay or not at all, and the listen loop
/// runs until the receiver is dropped.
pub struct SsdpClient {
    socket: Arc<UdpSocket>,
}

impl SsdpClient {
    /// Bind an ephemeral UDP socket for a discovery session
    pub async fn bind() -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.set_multicast_ttl_v4(2)?;

        Ok(Self {
            socket: Arc::new(socket),
        })
    }

    /// The local address the discovery socket is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Send one M-SEARCH for `service_type` and start listening for answers
    ///
    /// Responses arrive on the returned channel in whatever order the
    /// network delivers them. Malformed datagrams are dropped with a debug
    /// log.
    pub async fn search(&self, service_type: &str) -> Result<mpsc::Receiver<SearchResponse>> {
        self.search_at(
            service_type,
            &format!("{}:{}", SSDP_MULTICAST_ADDR, SSDP_PORT),
        )
        .await
    }

    /// Send the M-SEARCH to an explicit target address
    ///
    /// Exists so tests can point a search at a loopback responder instead of
    /// the multicast group.
    pub async fn search_at(
        &self,
        service_type: &str,
        target: &str,
    ) -> Result<mpsc::Receiver<SearchResponse>> {
        let request = build_search(service_type);
        self.socket.send_to(request.as_bytes(), target).await?;
        tracing::info!("Sent M-SEARCH for {} to {}", service_type, target);

        let (tx, rx) = mpsc::channel(RESPONSE_CHANNEL_CAPACITY);
        let socket = self.socket.clone();

        tokio::spawn(async move {
            let mut buf = vec![0u8; MAX_DATAGRAM];
            loop {
                match socket.recv_from(&mut buf).await {
                    Ok((len, sender)) => match parse_response(&buf[..len], sender) {
                        Some(response) => {
                            tracing::debug!(
                                "Discovery response from {} (status {})",
                                sender,
                                response.status
                            );
                            if tx.send(response).await.is_err() {
                                tracing::debug!("Response receiver dropped, ending listen loop");
                                break;
                            }
                        }
                        None => {
                            tracing::debug!("Ignoring malformed datagram from {}", sender);
                        }
                    },
                    Err(e) => {
                        tracing::error!("Discovery socket error: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(rx)
    }
}
