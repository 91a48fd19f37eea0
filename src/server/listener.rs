// Reusable listener module
// Creates TCP listeners with SO_REUSEADDR (and SO_REUSEPORT on unix)

use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Pending-connection queue length
pub const LISTEN_BACKLOG: i32 = 1024;

/// Create a `TcpListener` with address reuse enabled.
///
/// `SO_REUSEADDR` lets a restarted process rebind while old sockets sit in
/// `TIME_WAIT`; `SO_REUSEPORT` lets a replacement process bind before the
/// old one exits.
///
/// # Arguments
///
/// * `addr` - The socket address to bind to
/// * `backlog` - Listen queue length
pub fn create_reusable_listener(addr: SocketAddr, backlog: i32) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_reuse_address(true)?;

    // Required before handing the socket to tokio
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(backlog)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
