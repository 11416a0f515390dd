use crate::cli::ServeArgs;
use crate::server::{self, ServerConfig, Transport};

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        let transport = match (args.cert, args.key) {
            (Some(cert), Some(key)) if !args.plaintext => Transport::Tls { cert, key },
            _ => Transport::Plaintext,
        };

        let mut config = ServerConfig::new(&args.data_dir);
        config.address = args.address;
        config.port = args.port;
        config.transport = transport;
        config.replay = !args.no_replay;
        config.max_message_bytes = args.max_message_bytes;
        config
    }
}

/// Run the screening server until Ctrl-C
///
/// # Errors
///
/// Returns an error if the tokio runtime cannot be created or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    let config = ServerConfig::from(args);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(server::run(config))?;
    Ok(())
}
