//! Blocking WebSocket relay pool

use std::collections::HashSet;
use std::io::ErrorKind;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use tungstenite::client::IntoClientRequest;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use super::{ClientMessage, EventPublisher, EventSource, Filter, PublishReport, RelayMessage};
use crate::error::{Result, TenexError};
use crate::event::Event;
use crate::trace_time;

/// How long a single socket read may block while waiting on several relays.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

/// One read from a relay socket
enum Frame {
    Message(RelayMessage),
    /// The relay closed or dropped the connection.
    Closed,
    /// Read timed out, or the frame carried nothing we understand.
    Idle,
}

/// A set of relays queried one connection at a time
#[derive(Debug, Clone)]
pub struct RelayPool {
    relays: Vec<String>,
    timeout: Duration,
}

impl RelayPool {
    pub fn new(relays: Vec<String>, timeout: Duration) -> Self {
        Self { relays, timeout }
    }

    pub fn relays(&self) -> &[String] {
        &self.relays
    }

    fn fetch_from(&self, url: &str, filter: &Filter) -> Result<Vec<Event>> {
        let start = Instant::now();
        let mut socket = connect(url, self.timeout)?;
        let subscription_id = subscription_id();
        send(
            &mut socket,
            &ClientMessage::Req {
                subscription_id: &subscription_id,
                filter,
            },
        )?;

        let deadline = Instant::now() + self.timeout;
        let mut events = Vec::new();
        while Instant::now() < deadline {
            match read_message(&mut socket)? {
                Frame::Message(RelayMessage::Event {
                    subscription_id: sub,
                    event,
                }) if sub == subscription_id => events.push(*event),
                Frame::Message(RelayMessage::Eose {
                    subscription_id: sub,
                }) if sub == subscription_id => break,
                Frame::Message(RelayMessage::Closed {
                    subscription_id: sub,
                    message,
                }) if sub == subscription_id => {
                    tracing::warn!(relay = url, reason = %message, "subscription closed by relay");
                    break;
                }
                Frame::Message(RelayMessage::Notice { message }) => {
                    tracing::debug!(relay = url, notice = %message, "relay notice");
                }
                Frame::Closed => {
                    tracing::debug!(relay = url, count = events.len(), "connection closed before EOSE");
                    trace_time!(start, "fetch_from", relay = url, count = events.len());
                    return Ok(events);
                }
                _ => {}
            }
        }

        let _ = send(
            &mut socket,
            &ClientMessage::Close {
                subscription_id: &subscription_id,
            },
        );
        let _ = socket.close(None);
        trace_time!(start, "fetch_from", relay = url, count = events.len());
        Ok(events)
    }

    fn publish_to(&self, url: &str, event: &Event) -> Result<std::result::Result<(), String>> {
        let mut socket = connect(url, self.timeout)?;
        send(&mut socket, &ClientMessage::Event(event))?;

        let deadline = Instant::now() + self.timeout;
        let mut outcome = Err("no acknowledgement".to_string());
        while Instant::now() < deadline {
            match read_message(&mut socket)? {
                Frame::Message(RelayMessage::Ok {
                    event_id,
                    accepted,
                    message,
                }) if event_id == event.id => {
                    outcome = if accepted { Ok(()) } else { Err(message) };
                    break;
                }
                Frame::Closed => {
                    return Ok(Err("connection closed by relay".to_string()));
                }
                _ => {}
            }
        }
        let _ = socket.close(None);
        Ok(outcome)
    }
}

impl EventSource for RelayPool {
    fn fetch_events(&self, filter: &Filter) -> Result<Vec<Event>> {
        tracing::debug!(filter = %serde_json::to_string(filter)?, "fetching events");

        let mut seen = HashSet::new();
        let mut events = Vec::new();
        let mut answered = 0usize;
        for url in &self.relays {
            match self.fetch_from(url, filter) {
                Ok(batch) => {
                    answered += 1;
                    for event in batch {
                        if let Err(e) = event.verify() {
                            tracing::debug!(relay = %url, id = %event.id, error = %e, "dropping invalid event");
                            continue;
                        }
                        if seen.insert(event.id.clone()) {
                            events.push(event);
                        }
                    }
                }
                Err(e) => tracing::warn!(relay = %url, error = %e, "relay unavailable"),
            }
        }

        if answered == 0 && !self.relays.is_empty() {
            return Err(TenexError::relay("no relay answered the request"));
        }
        tracing::debug!(count = events.len(), relays = answered, "fetched events");
        Ok(events)
    }

    fn wait_for_event(&self, filter: &Filter, timeout: Duration) -> Result<Option<Event>> {
        let subscription_id = subscription_id();
        let mut sockets: Vec<(&str, Socket)> = Vec::new();
        for url in &self.relays {
            let opened = connect(url, self.timeout).and_then(|mut socket| {
                send(
                    &mut socket,
                    &ClientMessage::Req {
                        subscription_id: &subscription_id,
                        filter,
                    },
                )?;
                set_read_timeout(&socket, POLL_INTERVAL)?;
                Ok(socket)
            });
            match opened {
                Ok(socket) => sockets.push((url.as_str(), socket)),
                Err(e) => tracing::warn!(relay = %url, error = %e, "relay unavailable"),
            }
        }
        if sockets.is_empty() && !self.relays.is_empty() {
            return Err(TenexError::relay("no relay accepted the subscription"));
        }

        let deadline = Instant::now() + timeout;
        let mut found = None;
        'wait: while Instant::now() < deadline && !sockets.is_empty() {
            let mut index = 0;
            while index < sockets.len() {
                let (url, socket) = &mut sockets[index];
                match read_message(socket) {
                    Ok(Frame::Message(RelayMessage::Event {
                        subscription_id: sub,
                        event,
                    })) if sub == subscription_id && event.verify().is_ok() => {
                        found = Some(*event);
                        break 'wait;
                    }
                    Ok(Frame::Closed) => {
                        tracing::debug!(relay = %url, "relay closed the subscription socket");
                        sockets.remove(index);
                    }
                    Ok(_) => index += 1,
                    Err(e) => {
                        tracing::warn!(relay = %url, error = %e, "dropping relay connection");
                        sockets.remove(index);
                    }
                }
            }
        }

        for (_, socket) in &mut sockets {
            let _ = send(
                socket,
                &ClientMessage::Close {
                    subscription_id: &subscription_id,
                },
            );
            let _ = socket.close(None);
        }
        Ok(found)
    }
}

impl EventPublisher for RelayPool {
    fn publish(&self, event: &Event) -> Result<PublishReport> {
        let mut report = PublishReport {
            event_id: event.id.clone(),
            ..Default::default()
        };

        for url in &self.relays {
            match self.publish_to(url, event) {
                Ok(Ok(())) => report.accepted.push(url.clone()),
                Ok(Err(reason)) => report.rejected.push((url.clone(), reason)),
                Err(e) => report.rejected.push((url.clone(), e.to_string())),
            }
        }

        tracing::info!(
            id = %event.id,
            kind = event.kind,
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            "published event"
        );

        if report.accepted.is_empty() {
            let reasons: Vec<String> = report
                .rejected
                .iter()
                .map(|(url, reason)| format!("{}: {}", url, reason))
                .collect();
            return Err(TenexError::relay(format!(
                "no relay accepted event {} ({})",
                event.id,
                reasons.join("; ")
            )));
        }
        Ok(report)
    }
}

fn subscription_id() -> String {
    format!("tenex-{:08x}", rand::random::<u32>())
}

/// Open a WebSocket with connect, read and write timeouts applied to the
/// underlying TCP stream.
fn connect(url: &str, timeout: Duration) -> Result<Socket> {
    let request = url
        .into_client_request()
        .map_err(|e| TenexError::relay(format!("{}: {}", url, e)))?;
    let uri = request.uri();
    let host = uri
        .host()
        .ok_or_else(|| TenexError::relay(format!("{}: missing host", url)))?
        .to_string();
    let port = uri
        .port_u16()
        .unwrap_or(if uri.scheme_str() == Some("ws") { 80 } else { 443 });

    let addr = (host.as_str(), port)
        .to_socket_addrs()
        .map_err(|e| TenexError::relay(format!("{}: {}", url, e)))?
        .next()
        .ok_or_else(|| TenexError::relay(format!("{}: no address", url)))?;

    let stream = TcpStream::connect_timeout(&addr, timeout)?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;

    let (socket, _response) = tungstenite::client_tls(request, stream)
        .map_err(|e| TenexError::relay(format!("{}: {}", url, e)))?;
    tracing::debug!(relay = url, "connected");
    Ok(socket)
}

fn set_read_timeout(socket: &Socket, timeout: Duration) -> Result<()> {
    match socket.get_ref() {
        MaybeTlsStream::Plain(stream) => stream.set_read_timeout(Some(timeout))?,
        MaybeTlsStream::Rustls(stream) => stream.get_ref().set_read_timeout(Some(timeout))?,
        _ => {}
    }
    Ok(())
}

fn send(socket: &mut Socket, message: &ClientMessage<'_>) -> Result<()> {
    socket
        .send(Message::text(message.to_json()?))
        .map_err(TenexError::relay)
}

/// Next frame from the relay. A close handshake or a dropped connection
/// both end the stream as [`Frame::Closed`].
fn read_message(socket: &mut Socket) -> Result<Frame> {
    match socket.read() {
        Ok(Message::Text(text)) => match RelayMessage::from_json(text.as_str()) {
            Ok(message) => Ok(Frame::Message(message)),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unparseable relay message");
                Ok(Frame::Idle)
            }
        },
        Ok(Message::Close(_)) => Ok(Frame::Closed),
        Ok(_) => Ok(Frame::Idle),
        Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
            Ok(Frame::Closed)
        }
        Err(tungstenite::Error::Protocol(
            tungstenite::error::ProtocolError::ResetWithoutClosingHandshake,
        )) => Ok(Frame::Closed),
        Err(tungstenite::Error::Io(e))
            if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
        {
            Ok(Frame::Idle)
        }
        Err(tungstenite::Error::Io(e))
            if matches!(e.kind(), ErrorKind::ConnectionReset | ErrorKind::UnexpectedEof) =>
        {
            Ok(Frame::Closed)
        }
        Err(e) => Err(TenexError::relay(e)),
    }
}
