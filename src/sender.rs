//! 송신자
//!
//! - 프레임을 ICMP Echo Request로 직렬화
//! - 고정 간격 pacing (기본 200ms)
//! - 첫 에러에서 즉시 중단, 재시도 없음

use std::io;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::icmp::EchoRequest;
use crate::session::TransferSession;
use crate::stats::TransferStats;
use crate::transport::PacketTransport;
use crate::{
    Config, Error, Result, DEFAULT_SEND_INTERVAL_MS, DEFAULT_WRITE_TIMEOUT_MS, ECHO_SEQUENCE,
};

/// 송신 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// 첫 프레임 전
    Idle,

    /// 프레임 전송 중
    Sending,

    /// 모든 프레임 전송 완료
    Done,

    /// 에러로 중단
    Failed,
}

/// 실행 중인 송신을 프레임 사이에서 멈추는 핸들
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        !self.running.load(Ordering::SeqCst)
    }
}

/// 송신자 (세션 하나를 한 번만 실행)
#[derive(Debug)]
pub struct Sender {
    /// 패킷 전송 간격
    send_interval: Duration,

    /// 패킷 쓰기 타임아웃
    write_timeout: Option<Duration>,

    /// 실행 중 플래그
    running: Arc<AtomicBool>,

    state: DriverState,
}

impl Default for Sender {
    fn default() -> Self {
        Self::with_timing(
            Duration::from_millis(DEFAULT_SEND_INTERVAL_MS),
            Some(Duration::from_millis(DEFAULT_WRITE_TIMEOUT_MS)),
        )
    }
}

impl Sender {
    /// 설정의 전송 간격과 타임아웃으로 생성
    pub fn new(config: &Config) -> Self {
        Self::with_timing(config.send_interval, config.write_timeout)
    }

    pub fn with_timing(send_interval: Duration, write_timeout: Option<Duration>) -> Self {
        Self {
            send_interval,
            write_timeout,
            running: Arc::new(AtomicBool::new(true)),
            state: DriverState::Idle,
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: self.running.clone(),
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// 세션 전송
    ///
    /// 모든 프레임을 보내면 통계를, 아니면 첫 에러를 반환한다.
    /// 이미 보낸 패킷은 되돌릴 수 없으므로 에러 전까지의 진행은 로그로만 남는다.
    pub async fn run<T: PacketTransport>(
        &mut self,
        session: TransferSession,
        transport: &T,
    ) -> Result<TransferStats> {
        if self.state != DriverState::Idle {
            return Err(Error::SessionConsumed);
        }

        self.state = DriverState::Sending;
        let result = self.transmit(session, transport).await;
        self.state = match result {
            Ok(_) => DriverState::Done,
            Err(_) => DriverState::Failed,
        };

        result
    }

    async fn transmit<T: PacketTransport>(
        &self,
        session: TransferSession,
        transport: &T,
    ) -> Result<TransferStats> {
        let identifier = session.identifier();
        let destination = session.destination();

        info!(
            "Sending {} bytes to {} in {} frames (id={}, chunk={} bytes, crc32={:08X})",
            session.source_len(),
            destination,
            session.frame_count(),
            identifier,
            session.chunk_size(),
            session.source_crc32(),
        );

        let mut stats = TransferStats::new(session.frame_count());

        for frame in session.into_frames() {
            if !self.running.load(Ordering::SeqCst) {
                warn!("Transfer stopped after {} frames", stats.frames_sent);
                return Err(Error::Cancelled {
                    sent: stats.frames_sent as usize,
                });
            }

            let request = EchoRequest::new(identifier, ECHO_SEQUENCE, frame.wire_payload());
            let packet = request.to_bytes()?;

            self.write_packet(transport, &packet, destination, frame.index)
                .await?;
            stats.record_send(frame.payload.len(), packet.len());

            info!(
                "{} bytes ICMP packet sent successfully to {}",
                frame.payload.len(),
                destination
            );
            debug!(
                "frame {}/{} ({} wire bytes)",
                frame.index + 1,
                stats.total_frames,
                packet.len()
            );

            tokio::time::sleep(self.send_interval).await;
        }

        info!("Transfer complete: {}", stats.summary());
        Ok(stats)
    }

    async fn write_packet<T: PacketTransport>(
        &self,
        transport: &T,
        packet: &[u8],
        destination: Ipv4Addr,
        frame: usize,
    ) -> Result<()> {
        let send = transport.send_to(packet, destination);
        let result = match self.write_timeout {
            Some(limit) => tokio::time::timeout(limit, send)
                .await
                .map_err(|_| Error::WriteTimeout { frame })?,
            None => send.await,
        };

        match result {
            Ok(written) if written == packet.len() => Ok(()),
            Ok(written) => Err(Error::Transmit {
                frame,
                source: io::Error::new(
                    io::ErrorKind::WriteZero,
                    format!("short write: {} of {} bytes", written, packet.len()),
                ),
            }),
            Err(source) => Err(Error::Transmit { frame, source }),
        }
    }
}

/// 기본 간격으로 세션 전송, 보낸 프레임 수 반환
pub async fn run_session<T: PacketTransport>(
    session: TransferSession,
    transport: &T,
) -> Result<usize> {
    let stats = Sender::default().run(session, transport).await?;
    Ok(stats.frames_sent as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::sync::Mutex;

    use crate::frame::Frame;
    use crate::icmp::ICMP_HEADER_LEN;
    use crate::NAME_TAG_LEN;

    /// 보낸 패킷을 기록하는 전송 계층
    #[derive(Default)]
    struct MockTransport {
        sent: Mutex<Vec<(Vec<u8>, Ipv4Addr)>>,
        fail_at: Option<usize>,
    }

    impl PacketTransport for MockTransport {
        async fn send_to(&self, packet: &[u8], dest: Ipv4Addr) -> io::Result<usize> {
            let mut sent = self.sent.lock().unwrap();
            if self.fail_at == Some(sent.len()) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
            }
            sent.push((packet.to_vec(), dest));
            Ok(packet.len())
        }
    }

    fn session(len: usize, chunk_size: usize) -> TransferSession {
        let data: Bytes = (0..len).map(|i| i as u8).collect::<Vec<_>>().into();
        TransferSession::new(777, Ipv4Addr::new(10, 1, 2, 3), chunk_size, b"file.bin", data)
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_sends_every_frame() {
        let transport = MockTransport::default();
        let mut sender = Sender::default();
        assert_eq!(sender.state(), DriverState::Idle);

        let stats = sender.run(session(250, 100), &transport).await.unwrap();
        assert_eq!(sender.state(), DriverState::Done);
        assert_eq!(stats.frames_sent, 3);
        assert_eq!(stats.payload_bytes, 250);

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        for (i, (packet, dest)) in sent.iter().enumerate() {
            assert_eq!(*dest, Ipv4Addr::new(10, 1, 2, 3));
            let req = EchoRequest::from_bytes(packet).unwrap();
            assert_eq!(req.identifier, 777);
            assert_eq!(req.sequence, ECHO_SEQUENCE);

            let (tag, payload) = Frame::parse_wire(&req.data).unwrap();
            assert_eq!(tag.name(), b"file.bin");
            assert_eq!(payload.first().copied(), Some((i * 100) as u8));
        }
        assert_eq!(sent[2].0.len(), ICMP_HEADER_LEN + NAME_TAG_LEN + 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_aborts_session() {
        let transport = MockTransport {
            fail_at: Some(1),
            ..Default::default()
        };
        let mut sender = Sender::default();

        let err = sender.run(session(500, 100), &transport).await.unwrap_err();
        assert!(matches!(err, Error::Transmit { frame: 1, .. }));
        assert_eq!(sender.state(), DriverState::Failed);
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversize_frame_fails_before_write() {
        let transport = MockTransport::default();
        let err = run_session(session(70_000, 65_500), &transport)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Serialization { .. }));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_run() {
        let transport = MockTransport::default();
        let mut sender = Sender::default();
        sender.stop_handle().stop();

        let err = sender.run(session(300, 100), &transport).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled { sent: 0 }));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sender_runs_once() {
        let transport = MockTransport::default();
        let mut sender = Sender::default();
        sender.run(session(10, 100), &transport).await.unwrap();

        let err = sender.run(session(10, 100), &transport).await.unwrap_err();
        assert!(matches!(err, Error::SessionConsumed));
        assert_eq!(sender.state(), DriverState::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_session_sends_nothing() {
        let transport = MockTransport::default();
        let sent = run_session(session(0, 100), &transport).await.unwrap();
        assert_eq!(sent, 0);
        assert!(transport.sent.lock().unwrap().is_empty());
    }
}
