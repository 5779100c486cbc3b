//! 전송 통계

use std::time::Duration;

use tokio::time::Instant;

/// 전체 전송 통계
#[derive(Debug, Clone)]
pub struct TransferStats {
    /// 시작 시간
    pub start_time: Instant,

    /// 마지막 패킷 전송 시간
    pub last_send_time: Option<Instant>,

    /// 세션의 총 프레임 수
    pub total_frames: u64,

    /// 전송 완료된 프레임 수
    pub frames_sent: u64,

    /// 전송한 파일 데이터 바이트 (이름 태그 제외)
    pub payload_bytes: u64,

    /// 전송한 ICMP 메시지 바이트 (헤더, 이름 태그 포함)
    pub wire_bytes: u64,
}

impl TransferStats {
    pub fn new(total_frames: usize) -> Self {
        Self {
            start_time: Instant::now(),
            last_send_time: None,
            total_frames: total_frames as u64,
            frames_sent: 0,
            payload_bytes: 0,
            wire_bytes: 0,
        }
    }

    /// 패킷 전송 기록
    pub fn record_send(&mut self, payload_len: usize, wire_len: usize) {
        self.frames_sent += 1;
        self.payload_bytes += payload_len as u64;
        self.wire_bytes += wire_len as u64;
        self.last_send_time = Some(Instant::now());
    }

    /// 경과 시간
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 진행률 (0.0 ~ 1.0), 프레임이 없으면 1.0
    pub fn progress(&self) -> f64 {
        if self.total_frames == 0 {
            return 1.0;
        }
        self.frames_sent as f64 / self.total_frames as f64
    }

    /// 페이로드 처리율 (bytes/sec)
    pub fn payload_throughput(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed == 0.0 {
            return 0.0;
        }
        self.payload_bytes as f64 / elapsed
    }

    /// 통계 요약 문자열
    pub fn summary(&self) -> String {
        format!(
            "Elapsed: {:.2}s | Frames: {}/{} | Payload: {} bytes | Wire: {} bytes | Throughput: {:.2} KB/s",
            self.elapsed().as_secs_f64(),
            self.frames_sent,
            self.total_frames,
            self.payload_bytes,
            self.wire_bytes,
            self.payload_throughput() / 1_000.0,
        )
    }
}

impl Default for TransferStats {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_send() {
        let mut stats = TransferStats::new(4);
        assert_eq!(stats.progress(), 0.0);
        assert!(stats.last_send_time.is_none());

        stats.record_send(1000, 1108);
        stats.record_send(500, 608);

        assert_eq!(stats.frames_sent, 2);
        assert_eq!(stats.payload_bytes, 1500);
        assert_eq!(stats.wire_bytes, 1716);
        assert_eq!(stats.progress(), 0.5);
        assert!(stats.last_send_time.is_some());
        assert!(stats.summary().contains("Frames: 2/4"));
    }

    #[test]
    fn test_empty_session_progress() {
        assert_eq!(TransferStats::default().progress(), 1.0);
    }
}
