//! One client connection: read a message, reply, repeat until the peer leaves.

use std::fmt::Display;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::protocol::{ProtocolError, Response};
use crate::server::handlers::handle_line;
use crate::server::SharedState;

/// Result of reading one line from the peer
#[derive(Debug, PartialEq, Eq)]
enum ReadOutcome {
    /// A complete message is in the buffer, line terminator removed
    Line,
    /// The line exceeded the limit and was discarded up to its terminator
    TooLarge,
    Eof,
}

/// Read up to the next `\n`, keeping at most `limit` bytes.
///
/// Input past the limit is consumed and dropped so the stream stays aligned on
/// message boundaries. A final line without a terminator still counts as a line.
async fn read_message<R>(reader: &mut R, buf: &mut Vec<u8>, limit: usize) -> std::io::Result<ReadOutcome>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let mut oversized = false;
    let mut seen_any = false;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(match (seen_any, oversized) {
                (false, _) => ReadOutcome::Eof,
                (true, true) => ReadOutcome::TooLarge,
                (true, false) => ReadOutcome::Line,
            });
        }
        seen_any = true;

        let newline = available.iter().position(|&b| b == b'\n');
        let (take, consumed) = match newline {
            Some(i) => (i, i + 1),
            None => (available.len(), available.len()),
        };

        if !oversized {
            if buf.len() + take > limit {
                oversized = true;
                buf.clear();
            } else {
                buf.extend_from_slice(&available[..take]);
            }
        }
        reader.consume(consumed);

        if newline.is_some() {
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
            return Ok(if oversized {
                ReadOutcome::TooLarge
            } else {
                ReadOutcome::Line
            });
        }
    }
}

/// Serve one connection until the peer closes it or the transport fails.
///
/// Every message gets its replies written and flushed before the next one is
/// read. Bad input never closes the session; it is answered with `ERROR`.
pub async fn run_session<S, P>(stream: S, state: SharedState, max_message_bytes: usize, peer: P)
where
    S: AsyncRead + AsyncWrite + Unpin,
    P: Display,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        let responses = match read_message(&mut reader, &mut buf, max_message_bytes).await {
            Ok(ReadOutcome::Eof) => break,
            Ok(ReadOutcome::TooLarge) => {
                warn!("Discarded oversized message from {peer}");
                vec![Response::error(
                    ProtocolError::TooLarge {
                        limit: max_message_bytes,
                    }
                    .to_string(),
                )]
            }
            Ok(ReadOutcome::Line) => match std::str::from_utf8(&buf) {
                Ok(line) => handle_line(&state, line).await,
                Err(_) => {
                    warn!("Discarded non-UTF-8 message from {peer}");
                    vec![Response::error(ProtocolError::InvalidUtf8.to_string())]
                }
            },
            Err(e) => {
                error!("Read from {peer} failed: {e}");
                break;
            }
        };

        if let Err(e) = write_responses(&mut writer, &responses).await {
            error!("Write to {peer} failed: {e}");
            break;
        }
    }

    info!("Client disconnected: {peer}");
}

async fn write_responses<W>(writer: &mut W, responses: &[Response]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    for response in responses {
        let line = response.to_message().encode();
        debug!("Sending: {}", line.trim_end());
        writer.write_all(line.as_bytes()).await?;
    }
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn read_all(input: &[u8], limit: usize) -> Vec<(ReadOutcome, Vec<u8>)> {
        let mut reader = BufReader::with_capacity(4, input);
        let mut buf = Vec::new();
        let mut out = Vec::new();
        loop {
            let outcome = read_message(&mut reader, &mut buf, limit).await.unwrap();
            if outcome == ReadOutcome::Eof {
                break;
            }
            out.push((outcome, buf.clone()));
        }
        out
    }

    #[tokio::test]
    async fn test_reads_lines_across_small_buffers() {
        let lines = read_all(b"GET_PATIENT|PAT-1|EOT\r\nDELETE_PATIENT|PAT-2|EOT\n", 64).await;
        assert_eq!(
            lines,
            vec![
                (ReadOutcome::Line, b"GET_PATIENT|PAT-1|EOT".to_vec()),
                (ReadOutcome::Line, b"DELETE_PATIENT|PAT-2|EOT".to_vec()),
            ]
        );
    }

    #[tokio::test]
    async fn test_oversized_line_is_skipped_not_fatal() {
        let mut input = vec![b'A'; 100];
        input.extend_from_slice(b"\nGET_PATIENT|X|EOT\n");

        let lines = read_all(&input, 32).await;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].0, ReadOutcome::TooLarge);
        assert_eq!(lines[1], (ReadOutcome::Line, b"GET_PATIENT|X|EOT".to_vec()));
    }

    #[tokio::test]
    async fn test_limit_excludes_newline() {
        let mut input = vec![b'A'; 32];
        input.push(b'\n');
        input.extend_from_slice(&[b'B'; 33]);
        input.push(b'\n');

        let lines = read_all(&input, 32).await;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], (ReadOutcome::Line, vec![b'A'; 32]));
        assert_eq!(lines[1].0, ReadOutcome::TooLarge);
    }

    #[tokio::test]
    async fn test_unterminated_final_line() {
        let lines = read_all(b"GET_PATIENT|X|EOT", 64).await;
        assert_eq!(lines, vec![(ReadOutcome::Line, b"GET_PATIENT|X|EOT".to_vec())]);
    }

    #[tokio::test]
    async fn test_empty_input_is_eof() {
        assert!(read_all(b"", 64).await.is_empty());
    }
}
