use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use directive_assets::config::DEFAULT_CONFIG_FILE;
use directive_assets::{AssetBody, AssetOptions, Assets, TagOpts};
use tracing::{Level, debug};

/// Expand `//= require` directives and build asset tags from the command line.
#[derive(Debug, Parser)]
#[command(name = "directive-assets", version, about)]
struct Cli {
  /// JSON configuration file (defaults to ./assets.config.json when present).
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Override the asset base directory.
  #[arg(long, global = true)]
  base_dir: Option<PathBuf>,

  /// Log every resolved directive to stderr.
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Resolve an asset and write its expanded (or raw) body.
  Expand {
    /// Logical asset name, e.g. `/javascripts/app.js`.
    name: String,
    /// Write to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
  /// Print the markup referencing an asset.
  Tag {
    /// Kind of tag to emit.
    kind: TagKind,
    /// Asset name relative to its category directory.
    name: String,
    /// Extra attribute as `key=value`; may be repeated.
    #[arg(long = "attr", value_name = "KEY=VALUE")]
    attrs: Vec<String>,
  },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TagKind {
  Script,
  Stylesheet,
  Favicon,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  tracing_subscriber::fmt()
    .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
    .with_writer(io::stderr)
    .init();

  let assets = Assets::new(load_options(&cli)?);
  debug!(base_dir = %assets.options().base_dir.display(), "asset root");

  match cli.command {
    Command::Expand { name, output } => expand(&assets, &name, output),
    Command::Tag { kind, name, attrs } => {
      let opts = parse_attrs(&attrs)?;
      let markup = match kind {
        TagKind::Script => assets.javascript_include_tag(&name, opts),
        TagKind::Stylesheet => assets.stylesheet_link_tag(&name, opts),
        TagKind::Favicon => assets.favicon_link_tag(&name, opts),
      };
      println!("{markup}");
      Ok(())
    }
  }
}

fn load_options(cli: &Cli) -> Result<AssetOptions> {
  let mut options = match &cli.config {
    Some(path) => AssetOptions::load_from_path(path)
      .with_context(|| format!("failed to load configuration from {}", path.display()))?,
    None => {
      let cwd = std::env::current_dir().context("failed to determine the current directory")?;
      AssetOptions::discover(&cwd).with_context(|| {
        format!(
          "failed to load configuration from {}",
          cwd.join(DEFAULT_CONFIG_FILE).display()
        )
      })?
    }
  };

  if let Some(base_dir) = &cli.base_dir {
    options.base_dir = base_dir.clone();
  }

  Ok(options)
}

fn expand(assets: &Assets, name: &str, output: Option<PathBuf>) -> Result<()> {
  let resolved = assets
    .resolve(name)
    .with_context(|| format!("failed to resolve {name}"))?;

  let bytes = match resolved.body {
    AssetBody::Expanded(text) => text.into_bytes(),
    AssetBody::Raw(mut file) => {
      let mut buffer = Vec::new();
      io::Read::read_to_end(&mut file, &mut buffer)
        .with_context(|| format!("failed to read {}", resolved.path.display()))?;
      buffer
    }
  };

  match output {
    Some(path) => {
      fs::write(&path, &bytes).with_context(|| format!("failed to write {}", path.display()))
    }
    None => io::stdout()
      .write_all(&bytes)
      .context("failed to write to stdout"),
  }
}

fn parse_attrs(attrs: &[String]) -> Result<TagOpts> {
  let mut opts = TagOpts::new();
  for attr in attrs {
    let (key, value) = attr
      .split_once('=')
      .ok_or_else(|| anyhow!("attribute `{attr}` is not in key=value form"))?;
    opts.set(key, value);
  }
  Ok(opts)
}
