//! Tifa: Italian wake-word voice assistant
//!
//! Say the wake word, then the command. Local commands are answered
//! directly; everything else goes to the chat-completion service.

mod config;

use anyhow::{Context, Result};
use chat_completion::mock::MockBackend;
use chat_completion::{CompletionBackend, ConversationClient};
use clap::Parser;
use command_rules::CommandResolver;
use config::Config;
use speech_io::plugin::{new_recognizer, new_synthesizer, RecognizerKind, SynthesizerKind};
use speech_io::{RecognitionSink, SpeechOutput};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use wake_session::{
    AssistantRuntime, Dispatcher, SessionError, SessionState, WakeWordStateMachine,
};

#[cfg(feature = "http")]
const API_KEY_VAR: &str = "OPENAI_API_KEY";

#[derive(Parser)]
#[command(name = "tifa")]
#[command(about = "Tifa voice assistant")]
struct Args {
    /// JSON configuration file (created with defaults if missing)
    #[arg(long, default_value = "tifa.json")]
    config: PathBuf,

    /// Recognition backend: stdin, mock or unavailable
    #[arg(long, default_value = "stdin")]
    recognizer: String,

    /// Synthesis backend: console, mock or unavailable
    #[arg(long, default_value = "console")]
    synthesizer: String,

    /// Completion backend: openai or mock
    #[arg(long, default_value = "openai")]
    completion: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum CompletionKind {
    OpenAi,
    Mock,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();

    let args = Args::parse();
    info!("Tifa starting");

    let config = Config::load(&args.config)?;

    let recognizer_kind = match args.recognizer.as_str() {
        "stdin" => RecognizerKind::Stdin,
        "mock" => RecognizerKind::Mock,
        "unavailable" => RecognizerKind::Unavailable,
        other => anyhow::bail!("unknown recognizer backend: {other}"),
    };
    let synthesizer_kind = match args.synthesizer.as_str() {
        "console" => SynthesizerKind::Console,
        "mock" => SynthesizerKind::Mock,
        "unavailable" => SynthesizerKind::Unavailable,
        other => anyhow::bail!("unknown synthesizer backend: {other}"),
    };
    let completion_kind = match args.completion.as_str() {
        "openai" => CompletionKind::OpenAi,
        "mock" => CompletionKind::Mock,
        other => anyhow::bail!("unknown completion backend: {other}"),
    };
    info!(
        recognizer = ?recognizer_kind,
        synthesizer = ?synthesizer_kind,
        completion = ?completion_kind,
        language = %config.recognition.language,
        "backends selected"
    );

    let backend = new_completion_backend(completion_kind, &config)?;
    let conversation = ConversationClient::new(backend, config.completion.clone());
    let commands = CommandResolver::builder()
        .builtins()?
        .static_rules(config.rules.clone())
        .context("invalid command rule in config")?
        .build()?;
    let dispatcher = Arc::new(Dispatcher::new(commands, conversation));

    let (sink, events) = RecognitionSink::channel();
    let recognizer = new_recognizer(recognizer_kind, &config.recognition, sink)?;
    let synthesizer = new_synthesizer(synthesizer_kind)?;
    let speech = SpeechOutput::new(synthesizer, &config.synthesis);

    let machine = WakeWordStateMachine::new(&config.session)?;
    let runtime = AssistantRuntime::new(machine, recognizer, events, speech, dispatcher);

    let mut states = runtime.subscribe();
    tokio::spawn(async move {
        render(&states.borrow_and_update());
        while states.changed().await.is_ok() {
            render(&states.borrow_and_update());
        }
    });

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    match runtime.run(shutdown).await {
        Ok(()) => {}
        Err(SessionError::CapabilityUnsupported(e))
            if recognizer_kind == RecognizerKind::Stdin =>
        {
            info!(reason = %e, "input closed");
        }
        Err(e) => {
            error!(error = %e, "assistant stopped");
            return Err(e.into());
        }
    }

    info!("Tifa shutting down");
    Ok(())
}

fn new_completion_backend(
    kind: CompletionKind,
    config: &Config,
) -> Result<Arc<dyn CompletionBackend>> {
    match kind {
        CompletionKind::Mock => Ok(Arc::new(MockBackend::new())),
        CompletionKind::OpenAi => {
            #[cfg(feature = "http")]
            {
                let key = match std::env::var(API_KEY_VAR) {
                    Ok(key) if !key.trim().is_empty() => key,
                    _ => {
                        warn!("{API_KEY_VAR} not set; completion requests will be rejected");
                        String::new()
                    }
                };
                let backend = chat_completion::http::HttpBackend::new(
                    config.completion.endpoint.clone(),
                    chat_completion::SecretString::from(key),
                )?;
                Ok(Arc::new(backend))
            }
            #[cfg(not(feature = "http"))]
            {
                let _ = config;
                anyhow::bail!("http feature not enabled; use --completion mock")
            }
        }
    }
}

fn render(state: &SessionState) {
    println!("[{}] {}", state.phase, state.status);
    if let Some(transcript) = &state.transcript {
        println!("  > {transcript}");
    }
    if let Some(reply) = &state.reply {
        println!("  < {reply}");
    }
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
