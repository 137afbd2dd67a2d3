// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cadence::config::{self, ConfigSource, DeliveryConfig, HumanizerDegree};
use cadence::message::{Fragment, ModelError};
use cadence::session::{SessionDeps, SessionOutcome, SessionTarget, StreamSession};
use cadence::sink::{ChannelId, MessageId, MessageSink, SendOptions, SinkError};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::ReceiverStream;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cadence",
    about = "Replay a recorded model stream through paced chat delivery"
)]
struct Cli {
    /// Path to a cadence.yaml config file. Built-in defaults when omitted.
    #[arg(long, env = "CADENCE_CONFIG")]
    config: Option<PathBuf>,

    /// JSONL transcript, one fragment per line
    #[arg(long)]
    transcript: PathBuf,

    /// Channel id reported in sends
    #[arg(long, default_value = "replay")]
    channel: String,

    /// Message id of the trigger; the first send replies to it
    #[arg(long)]
    reply_to: Option<String>,

    /// Override the configured humanizer degree
    #[arg(long)]
    degree: Option<HumanizerDegree>,

    /// Delay between transcript fragments, in milliseconds
    #[arg(long, default_value_t = 0)]
    fragment_delay_ms: u64,

    /// Message size limit of the stdout sink
    #[arg(long, default_value_t = 2000)]
    sink_max_len: usize,
}

// ---------------------------------------------------------------------------
// Stdout sink
// ---------------------------------------------------------------------------

/// Prints every sink operation as a JSON line on stdout.
struct StdoutSink {
    max_len: usize,
    next_id: AtomicUsize,
}

#[async_trait::async_trait]
impl MessageSink for StdoutSink {
    async fn send_typing(&self, channel: &ChannelId) -> Result<(), SinkError> {
        println!("{}", serde_json::json!({ "op": "typing", "channel": channel.0 }));
        Ok(())
    }

    async fn send(
        &self,
        channel: &ChannelId,
        text: &str,
        options: SendOptions,
    ) -> Result<MessageId, SinkError> {
        let len = text.chars().count();
        if len > self.max_len {
            return Err(SinkError::TooLong {
                len,
                limit: self.max_len,
            });
        }
        let id = MessageId::new(format!(
            "out-{}",
            self.next_id.fetch_add(1, Ordering::SeqCst)
        ));
        println!(
            "{}",
            serde_json::json!({
                "op": "send",
                "channel": channel.0,
                "id": id.0,
                "reply_to": options.reply_to.map(|m| m.0),
                "text": text,
            })
        );
        Ok(id)
    }

    fn max_message_len(&self) -> usize {
        self.max_len
    }
}

// ---------------------------------------------------------------------------
// Transcript reader
// ---------------------------------------------------------------------------

/// Stream transcript lines into `tx`. Unparseable lines surface as a model
/// error, which ends the session the way a broken upstream would.
async fn replay(
    path: PathBuf,
    delay: Duration,
    tx: tokio::sync::mpsc::Sender<Result<Fragment, ModelError>>,
) {
    let file = match tokio::fs::File::open(&path).await {
        Ok(f) => f,
        Err(e) => {
            let _ = tx
                .send(Err(ModelError(format!(
                    "cannot open transcript {}: {e}",
                    path.display()
                ))))
                .await;
            return;
        }
    };

    let mut lines = BufReader::new(file).lines();
    let mut line_no = 0usize;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                let _ = tx.send(Err(ModelError(e.to_string()))).await;
                break;
            }
        };
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let item = serde_json::from_str::<Fragment>(&line)
            .map_err(|e| ModelError(format!("transcript line {line_no}: {e}")));
        let failed = item.is_err();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if tx.send(item).await.is_err() || failed {
            break;
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .json()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut delivery = match &cli.config {
        Some(path) => match config::load_config(&ConfigSource::file(path.clone())) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("failed to load config: {e}");
                std::process::exit(1);
            }
        },
        None => DeliveryConfig::default(),
    };
    if let Some(degree) = cli.degree {
        delivery.degree = degree;
    }

    tracing::info!(
        version = %delivery.version,
        degree = %delivery.degree,
        max_message_len = delivery.max_message_len,
        config_hash = %delivery.config_hash,
        "config loaded"
    );

    let sink: Arc<dyn MessageSink> = Arc::new(StdoutSink {
        max_len: cli.sink_max_len,
        next_id: AtomicUsize::new(0),
    });
    let target = SessionTarget {
        channel: ChannelId::new(cli.channel),
        reply_to: cli.reply_to.map(MessageId::new),
    };

    let session = match StreamSession::new(delivery, SessionDeps::new(sink), target) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("invalid session setup: {e}");
            std::process::exit(1);
        }
    };

    let (tx, rx) = tokio::sync::mpsc::channel(16);
    let reader = tokio::spawn(replay(
        cli.transcript,
        Duration::from_millis(cli.fragment_delay_ms),
        tx,
    ));

    let outcome = session.run(ReceiverStream::new(rx)).await;
    reader.abort();

    let summary = match &outcome {
        SessionOutcome::Completed { sent } => {
            serde_json::json!({ "outcome": "completed", "sent": sent })
        }
        SessionOutcome::FunctionCall(cont) => serde_json::json!({
            "outcome": "function_call",
            "sent": cont.sent,
            "tool": cont.call.name,
            "args": cont.call.args,
            "accumulated_text": cont.accumulated_text(),
        }),
        SessionOutcome::Error { error, sent } => serde_json::json!({
            "outcome": "error",
            "sent": sent,
            "error": error.to_string(),
        }),
        SessionOutcome::Timeout { after, sent } => serde_json::json!({
            "outcome": "timeout",
            "sent": sent,
            "after_ms": after.as_millis() as u64,
        }),
    };
    println!("{summary}");

    if matches!(outcome, SessionOutcome::Error { .. } | SessionOutcome::Timeout { .. }) {
        std::process::exit(2);
    }
}
