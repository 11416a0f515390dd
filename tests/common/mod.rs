//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use genoscreen::server::{AppState, DataPaths, Server, ServerConfig, Transport};
use genoscreen::utils::checksum::sha256_hex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Reference sequence of disease `D001`, long enough to be scored
pub const REFERENCE: &str = "ACGTACGTTAGCTAGCTAGGCTAACGTTAGCATCGATCGATGCTAGCTAGCATCGATGGCCAATT";

/// Reference sequence of disease `D002`
pub const SECOND_REFERENCE: &str =
    "TTGACCGTAGGCTTAACGGATCCGATTACGGCATGCCGTTAGGACTTACGGATCAGGCTAATCCGG";

pub fn fasta(header: &str, sequence: &str) -> String {
    format!(">{header}\n{sequence}")
}

/// A submission matching no catalog entry
pub fn unrelated_fasta() -> String {
    fasta("sample", &"A".repeat(70))
}

/// Write a two-disease catalog into `dir`
pub fn write_catalog(dir: &Path) {
    let paths = DataPaths::from_data_dir(dir);
    std::fs::create_dir_all(&paths.sequence_dir).unwrap();
    std::fs::write(
        &paths.manifest,
        "disease_id,name,severity\nD001,Example Syndrome,8\nD002,Second Disorder,3\n",
    )
    .unwrap();
    std::fs::write(paths.sequence_dir.join("D001.fasta"), fasta("D001", REFERENCE)).unwrap();
    std::fs::write(
        paths.sequence_dir.join("D002.fasta"),
        fasta("D002", SECOND_REFERENCE),
    )
    .unwrap();
}

/// Fields of a CREATE_PATIENT request registering `content`
pub fn create_fields(document_id: &str, content: &str) -> Vec<String> {
    vec![
        "Barbara McClintock".to_string(),
        document_id.to_string(),
        "52".to_string(),
        "F".to_string(),
        "barbara@example.org".to_string(),
        "maize | genetics".to_string(),
        sha256_hex(content.as_bytes()),
        content.len().to_string(),
    ]
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<AppState>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Stop accepting and wait for the accept loop to finish
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.unwrap();
        }
    }
}

pub fn config(data_dir: &Path, transport: Transport) -> ServerConfig {
    let mut config = ServerConfig::new(data_dir);
    config.address = "127.0.0.1".to_string();
    config.port = 0;
    config.transport = transport;
    config
}

/// Start a server on an ephemeral loopback port
pub async fn start(config: ServerConfig) -> TestServer {
    let state = Arc::new(AppState::open(config.paths.clone(), config.replay).unwrap());
    let server = Server::bind(&config, Arc::clone(&state)).await.unwrap();
    let addr = server.local_addr().unwrap();

    let (tx, rx) = oneshot::channel();
    let handle = tokio::spawn(server.serve_until(async {
        let _ = rx.await;
    }));

    TestServer {
        addr,
        state,
        shutdown: Some(tx),
        handle: Some(handle),
    }
}
