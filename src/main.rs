use anyhow::{bail, Context, Result};
use clap::Parser;
use spam_link_guard::{
    config::{self, SpamConfig},
    infrastructure::logging,
    LinkSpamChecker, SpamCheckRequest,
};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Checks whether text links, directly or through redirects and linked
/// pages, to a blocklisted domain. Prints the verdict as JSON.
#[derive(Parser, Debug)]
#[command(name = "spam-link-guard", version)]
struct Cli {
    /// Text to check; read from stdin when omitted
    text: Vec<String>,

    /// Redirect and link-following depth (overrides REDIRECT_DEPTH)
    #[arg(short, long)]
    depth: Option<u32>,

    /// Comma-separated spam domains (overrides SPAM_LINK_DOMAINS)
    #[arg(long, value_delimiter = ',')]
    domains: Option<Vec<String>>,
}

impl Cli {
    fn apply(&self, spam: &mut SpamConfig) {
        if let Some(depth) = self.depth {
            spam.redirect_depth = depth;
        }
        if let Some(domains) = &self.domains {
            spam.spam_link_domains = domains
                .iter()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .collect();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = config::load_config()?;
    cli.apply(&mut config.spam);
    // Held until exit so buffered file logs are flushed.
    let _log_guard = logging::init_tracing(&config.logging)?;

    let content = match cli.text.is_empty() {
        true => read_content(tokio::io::stdin()).await?,
        false => cli.text.join(" "),
    };
    if config.spam.spam_link_domains.is_empty() {
        tracing::warn!(target: "config", "no spam domains configured; nothing can match");
    }

    let checker =
        LinkSpamChecker::from_config(&config.fetch).context("failed to build http client")?;
    let request = SpamCheckRequest {
        content,
        spam_link_domains: config.spam.spam_link_domains,
        redirect_depth: config.spam.redirect_depth,
    };

    let verdict = tokio::select! {
        verdict = checker.check(&request) => verdict,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!(target: "resolver", "interrupted, aborting check");
            bail!("interrupted");
        }
    };

    println!("{}", serde_json::to_string(&verdict)?);
    Ok(())
}

async fn read_content(mut input: impl AsyncRead + Unpin) -> Result<String> {
    let mut content = String::new();
    input
        .read_to_string(&mut content)
        .await
        .context("failed to read content from stdin")?;
    Ok(content)
}
