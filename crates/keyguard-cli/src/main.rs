//! keyguard: password-gated message encryption for the command line
//!
//! Commands:
//!   encrypt [MESSAGE]  - seal a message into a portable token
//!   decrypt [TOKEN]    - recover the message from a token
//!
//! Tokens and recovered messages go to stdout; prompts, logs, and the
//! `--show-key` output go to stderr, so both commands pipe cleanly.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keyguard_crypto::{CryptoError, Envelope};
use secrecy::SecretString;
use std::io::Read;
use std::path::{Path, PathBuf};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "keyguard",
    version,
    about = "Password-gated message encryption",
    long_about = "keyguard: seal a text message into a single portable token and \
                  recover it later with the password"
)]
struct Cli {
    /// Log filter written to stderr (RUST_LOG overrides)
    #[arg(long, env = "KEYGUARD_LOG", default_value = "warn", global = true)]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Seal a message into a password-gated token
    Encrypt {
        /// Message text (read from --input or stdin when omitted)
        message: Option<String>,

        /// Read the message from a file instead
        #[arg(long, short = 'i', conflicts_with = "message")]
        input: Option<PathBuf>,

        /// Write the token to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Password (prompts twice when not given)
        #[arg(long, short = 'p', env = "KEYGUARD_PASSWORD")]
        password: Option<String>,

        /// Print the embedded key (base64) to stderr after sealing
        #[arg(long)]
        show_key: bool,
    },

    /// Recover the message from a token
    Decrypt {
        /// Token text (read from --input or stdin when omitted)
        token: Option<String>,

        /// Read the token from a file instead
        #[arg(long, short = 'i', conflicts_with = "token")]
        input: Option<PathBuf>,

        /// Write the message to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Password (prompts when not given)
        #[arg(long, short = 'p', env = "KEYGUARD_PASSWORD")]
        password: Option<String>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log);

    match cli.command {
        Commands::Encrypt {
            message,
            input,
            output,
            password,
            show_key,
        } => cmd_encrypt(
            message.as_deref(),
            input.as_deref(),
            output.as_deref(),
            password,
            show_key,
        ),
        Commands::Decrypt {
            token,
            input,
            output,
            password,
        } => cmd_decrypt(
            token.as_deref(),
            input.as_deref(),
            output.as_deref(),
            password,
        ),
    }
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries tokens and recovered messages; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

// ── `keyguard encrypt` ────────────────────────────────────────────────────────

fn cmd_encrypt(
    message: Option<&str>,
    input: Option<&Path>,
    output: Option<&Path>,
    password: Option<String>,
    show_key: bool,
) -> Result<()> {
    let message = read_source(message, input)?;
    if message.is_empty() {
        anyhow::bail!("nothing to encrypt: the message is empty");
    }

    let password = resolve_password(password, PromptMode::Confirm)?;

    let token =
        keyguard_crypto::seal(message.as_bytes(), &password).context("encrypting message")?;

    if show_key {
        // The key rides in the middle field of the token; surface it for
        // manual key management without letting it touch stdout.
        let envelope = Envelope::unpack(&token).context("parsing sealed token")?;
        eprintln!("key: {}", envelope.key);
    }

    tracing::debug!(token_len = token.len(), "message sealed");
    write_sink(output, &token)
}

// ── `keyguard decrypt` ────────────────────────────────────────────────────────

fn cmd_decrypt(
    token: Option<&str>,
    input: Option<&Path>,
    output: Option<&Path>,
    password: Option<String>,
) -> Result<()> {
    let raw = read_source(token, input)?;

    // Tokens arrive via pipes and pastes; surrounding whitespace is not part
    // of any field.
    let token = raw.trim();
    if token.is_empty() {
        anyhow::bail!("nothing to decrypt: the token is empty");
    }

    let password = resolve_password(password, PromptMode::Once)?;

    let plaintext = match keyguard_crypto::open(token, &password) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::debug!(kind = %err, "token rejected");
            anyhow::bail!("{}", user_message(&err));
        }
    };

    // keyguard is a text tool: a sealed message was UTF-8 going in.
    let message = String::from_utf8(plaintext)
        .map_err(|_| anyhow::anyhow!("{}", user_message(&CryptoError::DecryptionFailed)))?;

    tracing::debug!(message_len = message.len(), "message recovered");
    write_sink(output, &message)
}

/// Map library failures onto the messages shown to users. Wrong-key and
/// tampered-data cases share one message on purpose.
fn user_message(err: &CryptoError) -> &'static str {
    match err {
        CryptoError::IncorrectPassword => "the password is incorrect",
        CryptoError::MalformedEnvelope => "invalid encrypted text format",
        _ => "the data may be corrupted or invalid",
    }
}

// ── Input / output plumbing ───────────────────────────────────────────────────

/// Read the payload: positional argument, `--input` file, or stdin.
fn read_source(arg: Option<&str>, input: Option<&Path>) -> Result<String> {
    if let Some(text) = arg {
        return Ok(text.to_string());
    }
    if let Some(path) = input {
        return std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()));
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("reading stdin")?;
    Ok(buffer)
}

/// Write the result: `--output` file, or stdout with a trailing newline.
fn write_sink(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

// ── Password resolution ───────────────────────────────────────────────────────

enum PromptMode {
    Once,
    Confirm,
}

/// Resolve the password: flag or KEYGUARD_PASSWORD first, interactive prompt
/// otherwise. `Confirm` prompts twice and requires both entries to match.
fn resolve_password(flag: Option<String>, mode: PromptMode) -> Result<SecretString> {
    let password = match flag {
        Some(p) => p,
        None => {
            let first = rpassword::prompt_password("Password: ").context("reading password")?;
            if matches!(mode, PromptMode::Confirm) {
                let second = rpassword::prompt_password("Confirm password: ")
                    .context("reading password confirmation")?;
                if first != second {
                    anyhow::bail!("passwords do not match");
                }
            }
            first
        }
    };

    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }

    Ok(SecretString::from(password))
}
