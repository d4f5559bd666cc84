use crate::core_client::client::ShareClient;
use crate::core_error::ShareError;
use colored::Colorize;
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

const HELP: &str = "Commands: LIST, GET <filename>, PUT <localfile>, QUIT";

/// Prompts for credentials on `lines` and authenticates `client`.
///
/// Every failure here ends the session: a refusal comes back as
/// `ServerRefused`, a dropped connection as a fatal error.
pub async fn login<R, W>(
    client: &mut ShareClient,
    lines: &mut Lines<R>,
    out: &mut W,
) -> Result<(), ShareError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    prompt(out, "Username: ");
    let username = lines.next_line().await?.unwrap_or_default();
    prompt(out, "Password: ");
    let password = lines.next_line().await?.unwrap_or_default();

    client.auth(username.trim(), password.trim()).await?;
    let _ = writeln!(out, "Authenticated");
    Ok(())
}

/// Runs commands read from `lines` until QUIT or end of input.
///
/// Server refusals are printed and the loop continues; only a broken
/// connection is returned as an error.
pub async fn run_commands<R, W>(
    mut client: ShareClient,
    lines: &mut Lines<R>,
    out: &mut W,
    download_dir: &Path,
) -> Result<(), ShareError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        prompt(out, "cmd> ");
        let Some(cmdline) = lines.next_line().await? else {
            break;
        };
        let cmdline = cmdline.trim_end_matches('\r');
        if cmdline.is_empty() {
            continue;
        }
        if cmdline == "QUIT" {
            return client.quit().await;
        }

        let result = if cmdline == "LIST" {
            client.list().await.map(|entries| {
                for entry in entries {
                    let _ = writeln!(out, "{}", entry);
                }
            })
        } else if let Some(filename) = cmdline.strip_prefix("GET ") {
            client.get(filename, download_dir).await.map(|size| {
                let _ = writeln!(out, "Received {} bytes", size);
                let _ = writeln!(out, "Saved {}", filename);
            })
        } else if let Some(local) = cmdline.strip_prefix("PUT ") {
            client.put(local).await.map(|status| {
                let _ = writeln!(out, "{}", status);
            })
        } else {
            let _ = writeln!(out, "{}", HELP);
            Ok(())
        };

        if let Err(e) = result {
            if e.is_fatal() {
                let _ = writeln!(out, "{}", "Connection closed".red());
                return Err(e);
            }
            render_error(out, &e);
        }
    }

    Ok(())
}

fn prompt<W: Write>(out: &mut W, text: &str) {
    let _ = write!(out, "{}", text);
    let _ = out.flush();
}

fn render_error<W: Write>(out: &mut W, error: &ShareError) {
    let message = match error {
        ShareError::ServerRefused(response) => response.clone(),
        ShareError::LocalFileNotFound(_) => String::from("Local file not found"),
        ShareError::WriteFailed(_) => String::from("Failed to receive file"),
        other => other.to_string(),
    };
    let _ = writeln!(out, "{}", message.red());
}
