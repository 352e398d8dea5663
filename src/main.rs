use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::mpsc;

use clashview::app::{App, AppEvent};
use clashview::config::Config;
use clashview::subscription::{aggregate, build_client, AggregationResult, Fetcher, ProxyNode};
use clashview::theme::ThemeVariant;
use clashview::ui;
use clashview::util::{display_width, strip_control_chars, truncate_to_width, validate_subscription_url};

/// Output format for `--print`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Yaml,
}

#[derive(Parser, Debug)]
#[command(name = "clashview", about = "Terminal viewer for Clash subscription proxy nodes")]
struct Args {
    /// Config file (default: ~/.config/clashview/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Extra subscription URL, appended to the configured list (repeatable)
    #[arg(long = "url", value_name = "URL")]
    urls: Vec<String>,

    /// Relay endpoint; overrides `relay_url` from the config file
    #[arg(long, value_name = "URL")]
    relay: Option<String>,

    /// Fetch once, print the nodes to stdout and exit
    #[arg(long)]
    print: bool,

    /// Output format for --print
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, requires = "print")]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never mix with the TUI or --print output
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => match Config::default_path() {
            Some(path) => Config::load(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => {
                tracing::debug!("HOME not set, using default configuration");
                Config::default()
            }
        },
    };

    let mut subscriptions = config.subscriptions.clone();
    for raw in &args.urls {
        let url = validate_subscription_url(raw)
            .with_context(|| format!("Invalid --url argument: {}", raw))?;
        if !subscriptions.contains(&url) {
            subscriptions.push(url);
        }
    }

    let relay = args.relay.clone().or_else(|| config.relay_url.clone());
    if let Some(relay) = &relay {
        validate_subscription_url(relay)
            .with_context(|| format!("Invalid relay URL: {}", relay))?;
    }

    let client = build_client().context("Failed to build HTTP client")?;
    let fetcher = Fetcher::new(client, relay, config.request_timeout());

    if args.print {
        return print_once(&fetcher, &subscriptions, args.format).await;
    }

    let mut app = App::new(fetcher, subscriptions);

    match ThemeVariant::from_str_name(&config.theme) {
        Some(variant) => app.set_theme(variant),
        None => {
            tracing::warn!(theme = %config.theme, "Unknown theme, falling back to dark");
        }
    }

    for warning in app.keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!("{}", warning);
        eprintln!("Warning: {}", warning);
    }

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, event_tx, event_rx).await?;

    Ok(())
}

/// Headless mode: one aggregation, nodes to stdout, errors to stderr.
///
/// Exits with status 1 when every subscription failed.
async fn print_once(fetcher: &Fetcher, subscriptions: &[String], format: OutputFormat) -> Result<()> {
    let urls: Vec<String> = subscriptions
        .iter()
        .filter(|u| !u.trim().is_empty())
        .cloned()
        .collect();

    let result = aggregate(fetcher, &urls, None).await;

    let rendered = match format {
        OutputFormat::Table => format_table(&result.nodes),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&result.nodes).context("Failed to serialize nodes")? + "\n"
        }
        OutputFormat::Yaml => format_yaml(&result)?,
    };

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .context("Failed to write output")?;
    stdout.flush().context("Failed to write output")?;

    for error in &result.errors {
        eprintln!("{}", error);
    }

    if !urls.is_empty() && result.errors.len() == urls.len() {
        std::process::exit(1);
    }
    Ok(())
}

/// Merged Clash document holding every node.
fn format_yaml(result: &AggregationResult) -> Result<String> {
    let proxies: Vec<serde_yaml::Value> = result
        .nodes
        .iter()
        .map(|node| serde_yaml::Value::Mapping(node.to_mapping()))
        .collect();

    let mut doc = serde_yaml::Mapping::new();
    doc.insert("proxies".into(), serde_yaml::Value::Sequence(proxies));
    serde_yaml::to_string(&doc).context("Failed to serialize nodes")
}

const TABLE_COLUMNS: [(&str, usize); 4] = [("TYPE", 8), ("NAME", 40), ("SERVER", 32), ("PORT", 6)];

/// Plain-text table, one node per line.
fn format_table(nodes: &[ProxyNode]) -> String {
    let mut out = String::new();
    push_row(&mut out, TABLE_COLUMNS.map(|(title, _)| title));

    for node in nodes {
        let port = node.port.as_ref().map(|p| p.to_string()).unwrap_or_default();
        let proxy_type = strip_control_chars(&node.proxy_type);
        let name = strip_control_chars(&node.name);
        let server = strip_control_chars(&node.server);
        let port = strip_control_chars(&port);
        push_row(
            &mut out,
            [proxy_type.as_ref(), name.as_ref(), server.as_ref(), port.as_ref()],
        );
    }

    out.push_str(&format!("{} nodes\n", nodes.len()));
    out
}

fn push_row(out: &mut String, cells: [&str; 4]) {
    let mut line = String::new();
    for (cell, (_, width)) in cells.iter().zip(TABLE_COLUMNS) {
        let text = truncate_to_width(cell, width);
        line.push_str(&text);
        let pad = width.saturating_sub(display_width(&text)) + 1;
        line.extend(std::iter::repeat(' ').take(pad));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use clashview::subscription::Port;
    use pretty_assertions::assert_eq;

    fn node(name: &str, proxy_type: &str, server: &str, port: u16) -> ProxyNode {
        ProxyNode {
            name: name.to_string(),
            proxy_type: proxy_type.to_string(),
            server: server.to_string(),
            port: Some(Port::Number(port.into())),
            ..ProxyNode::default()
        }
    }

    #[test]
    fn test_format_table_aligns_columns() {
        let out = format_table(&[node("HK-01", "ss", "hk.example.com", 8388)]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("TYPE     NAME"));
        assert!(lines[1].starts_with("ss       HK-01"));
        assert!(lines[1].ends_with("8388"));
        assert_eq!(lines[2], "1 nodes");
    }

    #[test]
    fn test_format_table_strips_escape_sequences() {
        let out = format_table(&[node("n\x1b]0;x\x07", "ss\x1b[2J", "h\r", 1)]);
        let row = out.lines().nth(1).unwrap();
        assert!(!row.contains('\x1b'));
        assert!(!row.contains('\r'));
        assert!(!row.contains('\x07'));
        assert!(row.starts_with("ss"));
    }

    #[test]
    fn test_format_yaml_is_a_clash_document() {
        let result = AggregationResult {
            nodes: vec![node("a", "vmess", "a.example", 443)],
            errors: vec![],
        };
        let yaml = format_yaml(&result).unwrap();
        let parsed = clashview::subscription::parse_document(&yaml).unwrap();
        assert_eq!(parsed.proxies, result.nodes);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "clashview",
            "--url",
            "https://a.example/sub",
            "--url",
            "https://b.example/sub",
            "--print",
            "--format",
            "json",
        ]);
        assert_eq!(args.urls.len(), 2);
        assert!(args.print);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_format_requires_print() {
        assert!(Args::try_parse_from(["clashview", "--format", "json"]).is_err());
    }
}
