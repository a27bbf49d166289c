use asr_client_rs::{
    client::AsrClient,
    config::{self, ClientConfig},
    error::{AsrError, Result as AsrResult},
};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::fs::File;

#[derive(Parser, Debug)]
#[command(name = "asr-client", about = "Streaming speech recognition client")]
struct Args {
    /// ASR server to connect
    #[arg(short, long, default_value = config::DEFAULT_SERVER)]
    server: String,

    /// Server port
    #[arg(short, long, default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// API key for the recognition service
    #[arg(short = 'k', long)]
    key: String,

    /// Recognition model topic
    #[arg(long, default_value = config::DEFAULT_TOPIC)]
    topic: String,

    /// Recognition language
    #[arg(long, default_value = config::DEFAULT_LANG)]
    lang: String,

    /// Input file format descriptor
    #[arg(long, default_value = config::DEFAULT_FORMAT)]
    format: String,

    /// Bytes of audio per outbound frame
    #[arg(long, default_value_t = config::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Log protocol-level progress, not only recognized text
    #[arg(short, long)]
    verbose: bool,

    /// Audio file to recognize
    file: PathBuf,
}

impl Args {
    fn into_config(self) -> (ClientConfig, PathBuf) {
        let config = ClientConfig {
            server: self.server,
            port: self.port,
            api_key: self.key,
            topic: self.topic,
            lang: self.lang,
            format: self.format,
            chunk_size: self.chunk_size,
            verbose: self.verbose,
            ..ClientConfig::default()
        };
        (config, self.file)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let (config, file) = Args::parse().into_config();

    let default_level = if config.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    match run(config, file).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ClientConfig, path: PathBuf) -> AsrResult<()> {
    let file = File::open(&path).await.map_err(AsrError::Source)?;
    let source_size = file.metadata().await.map_err(AsrError::Source)?.len();
    log::info!("Recognizing {} ({} bytes)", path.display(), source_size);

    let client = AsrClient::connect(config).await?;
    client
        .recognize(file, source_size, |event| {
            println!("{}", event.text);
            if event.end_of_utterance {
                log::debug!("end of utterance");
            }
        })
        .await
}
