//! Outbound datagram transport.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use crate::frame::{Frame, FRAME_SIZE};

/// Fire-and-forget sink for frames. Only the session worker calls it.
pub trait Transport: Send + 'static {
    fn send_frame(&mut self, frame: &Frame) -> io::Result<()>;
}

/// A UDP socket connected to the peer.
pub struct UdpTransport {
    socket: Socket,
    peer: SocketAddr,
}

impl UdpTransport {
    pub fn connect(peer: SocketAddr) -> io::Result<Self> {
        let socket = Socket::new(Domain::for_address(peer), Type::DGRAM, Some(Protocol::UDP))?;
        socket.connect(&SockAddr::from(peer))?;
        log::debug!("UDP socket connected to {}", peer);
        Ok(Self { socket, peer })
    }
}

impl Transport for UdpTransport {
    fn send_frame(&mut self, frame: &Frame) -> io::Result<()> {
        let written = self.socket.send(frame)?;
        if written != FRAME_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short datagram to {}: {} of {} bytes", self.peer, written, FRAME_SIZE),
            ));
        }
        Ok(())
    }
}

/// Resolve the configured peer to its first address.
pub fn resolve(host: &str, port: u16) -> Result<SocketAddr, Box<dyn std::error::Error + Send + Sync>> {
    let addr = (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or("Could not resolve host address")?;
    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameFields;
    use crate::input::InputState;
    use std::net::UdpSocket;
    use std::time::Duration;

    #[test]
    fn test_loopback_delivery() {
        let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
        peer.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

        let mut transport = UdpTransport::connect(peer.local_addr().unwrap()).unwrap();
        let frame = InputState::new().frame();
        transport.send_frame(&frame).unwrap();

        let mut buf = [0u8; 64];
        let n = peer.recv(&mut buf).unwrap();
        assert_eq!(n, FRAME_SIZE);
        assert_eq!(&buf[..n], &frame[..]);
        assert!(FrameFields::parse(&buf[..n]).is_some());
    }

    #[test]
    fn test_resolve_literal() {
        let addr = resolve("127.0.0.1", 4950).unwrap();
        assert_eq!(addr, "127.0.0.1:4950".parse::<SocketAddr>().unwrap());
    }
}
