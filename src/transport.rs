//! 패킷 전송 계층
//!
//! 송신 루프는 [`PacketTransport`]에만 의존한다. 실제 전송은 raw ICMP 소켓
//! ([`IcmpSocket`])이 담당하고, 테스트는 메모리 구현을 끼워 넣는다.

use std::future::Future;
use std::io;
use std::net::Ipv4Addr;

/// 직렬화된 ICMP 메시지를 목적지로 보내는 전송 계층
pub trait PacketTransport {
    /// 패킷 하나 전송, 보낸 바이트 수 반환
    fn send_to(
        &self,
        packet: &[u8],
        dest: Ipv4Addr,
    ) -> impl Future<Output = io::Result<usize>> + Send;
}

#[cfg(unix)]
pub use self::raw::IcmpSocket;

#[cfg(unix)]
mod raw {
    use std::io;
    use std::net::{Ipv4Addr, SocketAddrV4};

    use socket2::{Domain, Protocol, SockAddr, Socket, Type};
    use tokio::io::unix::AsyncFd;
    use tracing::debug;

    use super::PacketTransport;
    use crate::{Error, Result};

    /// raw ICMPv4 소켓 (IP 헤더는 커널이 작성)
    ///
    /// 보통 root 또는 `CAP_NET_RAW` 권한이 필요하다. drop 시 소켓이 닫힌다.
    #[derive(Debug)]
    pub struct IcmpSocket {
        inner: AsyncFd<Socket>,
    }

    impl IcmpSocket {
        /// 소켓 생성 후 `0.0.0.0`에 바인딩
        ///
        /// tokio 런타임 안에서 호출해야 한다.
        pub fn open() -> Result<Self> {
            let socket = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))
                .map_err(Error::TransportOpen)?;

            let local = SockAddr::from(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0));
            socket.bind(&local).map_err(Error::TransportOpen)?;
            socket.set_nonblocking(true).map_err(Error::TransportOpen)?;

            let inner = AsyncFd::new(socket).map_err(Error::TransportOpen)?;
            debug!("raw ICMP socket opened");

            Ok(Self { inner })
        }
    }

    impl PacketTransport for IcmpSocket {
        async fn send_to(&self, packet: &[u8], dest: Ipv4Addr) -> io::Result<usize> {
            let addr = SockAddr::from(SocketAddrV4::new(dest, 0));

            loop {
                let mut guard = self.inner.writable().await?;
                match guard.try_io(|fd| fd.get_ref().send_to(packet, &addr)) {
                    Ok(result) => return result,
                    Err(_would_block) => continue,
                }
            }
        }
    }
}
