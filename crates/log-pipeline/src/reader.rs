//! JSON lines 입력 수집기
//!
//! 상류 syslog 리스너가 내보낸 JSON lines(한 줄에 필드 맵 하나)를 읽어
//! 파이프라인에 넘깁니다. 디코딩 실패와 저장 실패는 기록 후 건너뜁니다.
//! 데몬(stdin/파일 스트리밍)과 CLI(`hostlog ingest`)가 함께 사용합니다.

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use hostlog_core::metrics as m;

use crate::error::IngestError;
use crate::field::decode_bag;
use crate::pipeline::IngestPipeline;

/// 입력 한 번을 처리한 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadSummary {
    /// 읽은 라인 수 (빈 줄 제외)
    pub lines: u64,
    /// 저장된 엔트리 수
    pub stored: u64,
    /// 디코딩 실패 라인 수
    pub decode_errors: u64,
    /// 저장 실패 라인 수
    pub store_errors: u64,
}

/// EOF 또는 종료 신호까지 라인을 읽어 수집합니다.
///
/// `shutdown`이 없으면 EOF까지 읽습니다. 읽기 I/O 에러만 반환합니다.
pub async fn ingest_lines<R>(
    pipeline: &IngestPipeline,
    reader: R,
    mut shutdown: Option<broadcast::Receiver<()>>,
) -> Result<ReadSummary, IngestError>
where
    R: AsyncBufRead + Unpin,
{
    let max_line_length = pipeline.config().max_line_length;
    let mut lines = reader.lines();
    let mut summary = ReadSummary::default();
    let mut line_no = 0_usize;

    loop {
        let next = match shutdown.as_mut() {
            Some(rx) => tokio::select! {
                line = lines.next_line() => line?,
                _ = rx.recv() => {
                    debug!(line = line_no, "input reader received shutdown");
                    break;
                }
            },
            None => lines.next_line().await?,
        };
        let Some(line) = next else {
            break;
        };
        line_no += 1;

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        summary.lines += 1;

        if trimmed.len() > max_line_length {
            summary.decode_errors += 1;
            metrics::counter!(m::DAEMON_DECODE_ERRORS_TOTAL).increment(1);
            warn!(
                line = line_no,
                length = trimmed.len(),
                max = max_line_length,
                "input line too long, skipping"
            );
            continue;
        }

        let bag = match decode_bag(trimmed, line_no) {
            Ok(bag) => bag,
            Err(e) => {
                summary.decode_errors += 1;
                metrics::counter!(m::DAEMON_DECODE_ERRORS_TOTAL).increment(1);
                warn!(error = %e, "skipping malformed input line");
                continue;
            }
        };

        match pipeline.ingest(bag).await {
            Ok(_) => summary.stored += 1,
            Err(e) => {
                summary.store_errors += 1;
                warn!(line = line_no, error = %e, "dropping message");
            }
        }
    }

    debug!(
        lines = summary.lines,
        stored = summary.stored,
        decode_errors = summary.decode_errors,
        store_errors = summary.store_errors,
        "input reader finished"
    );
    Ok(summary)
}
