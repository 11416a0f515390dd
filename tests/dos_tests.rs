//! Resource-exhaustion tests for the session layer.
//!
//! Oversized and malformed traffic must be answered without closing the
//! connection or taking the server down.

mod common;

use std::time::Duration;

use common::{create_fields, write_catalog};
use genoscreen::protocol::{decode, encode};
use genoscreen::server::Transport;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

const LIMIT: usize = 1024;

async fn read_reply(stream: &mut BufReader<TcpStream>) -> String {
    let mut line = String::new();
    timeout(Duration::from_secs(30), stream.read_line(&mut line))
        .await
        .expect("timed out waiting for reply")
        .unwrap();
    line
}

/// Messages over the size limit are discarded and answered with one ERROR
#[tokio::test]
async fn test_oversized_message_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path());
    let mut config = common::config(dir.path(), Transport::Plaintext);
    config.max_message_bytes = LIMIT;
    let server = common::start(config).await;

    let mut stream = BufReader::new(TcpStream::connect(server.addr).await.unwrap());

    let mut oversized = b"SEND_FASTA|PAT-1|>S\\n".to_vec();
    oversized.extend(std::iter::repeat(b'A').take(LIMIT * 8));
    oversized.extend_from_slice(b"|EOT\n");
    stream.get_mut().write_all(&oversized).await.unwrap();

    let reply = decode(&read_reply(&mut stream).await).unwrap();
    assert_eq!(reply.tag, "ERROR");
    assert_eq!(
        reply.fields,
        vec![format!("Message exceeds maximum size of {LIMIT} bytes")]
    );

    // The stream is realigned on the next message
    let content = common::unrelated_fasta();
    let create = encode("CREATE_PATIENT", &create_fields("DOC-DOS", &content));
    stream.get_mut().write_all(create.as_bytes()).await.unwrap();
    let reply = decode(&read_reply(&mut stream).await).unwrap();
    assert_eq!(reply.tag, "SUCCESS");

    server.stop().await;
}

/// Several requests in one write are answered in order
#[tokio::test]
async fn test_pipelined_requests_answered_in_order() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path());
    let server = common::start(common::config(dir.path(), Transport::Plaintext)).await;

    let mut stream = BufReader::new(TcpStream::connect(server.addr).await.unwrap());
    let content = common::unrelated_fasta();
    let mut batch = String::new();
    batch.push_str(&encode("CREATE_PATIENT", &create_fields("DOC-P1", &content)));
    batch.push_str("NOT_A_COMMAND|EOT\n");
    batch.push_str(&encode("CREATE_PATIENT", &create_fields("DOC-P1", &content)));
    batch.push_str(&encode("CREATE_PATIENT", &create_fields("DOC-P2", &content)));
    stream.get_mut().write_all(batch.as_bytes()).await.unwrap();

    let tags: Vec<String> = {
        let mut tags = Vec::new();
        for _ in 0..4 {
            tags.push(decode(&read_reply(&mut stream).await).unwrap().tag);
        }
        tags
    };
    assert_eq!(tags, vec!["SUCCESS", "ERROR", "ERROR", "SUCCESS"]);

    server.stop().await;
}

/// A client that disconnects mid-message does not disturb other sessions
#[tokio::test]
async fn test_abandoned_connection_is_harmless() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path());
    let server = common::start(common::config(dir.path(), Transport::Plaintext)).await;

    {
        let mut abandoned = TcpStream::connect(server.addr).await.unwrap();
        abandoned.write_all(b"CREATE_PATIENT|half a mess").await.unwrap();
    }

    let mut stream = BufReader::new(TcpStream::connect(server.addr).await.unwrap());
    stream
        .get_mut()
        .write_all(b"GET_PATIENT|PAT-00000000|EOT\n")
        .await
        .unwrap();
    let reply = decode(&read_reply(&mut stream).await).unwrap();
    assert_eq!(reply.fields, vec!["Patient not found: PAT-00000000"]);

    server.stop().await;
}
