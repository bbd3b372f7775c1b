mod commands;
mod core;
mod release;

use clap::Parser;
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, print_error};
use crate::core::vcs::SystemGit;
use crate::release::BumpKind;
use std::path::PathBuf;

/// Tag the current version, bump it, commit and push
#[derive(Parser)]
#[command(name = "tagbump")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Which version component to increment after tagging
  #[arg(value_enum)]
  bump: BumpKind,

  /// Repository root (default: current directory)
  #[arg(long)]
  root: Option<PathBuf>,

  /// Remote that receives the tag and the bump commit (overrides release.toml)
  #[arg(long)]
  remote: Option<String>,

  /// Show the release plan without tagging, rewriting or pushing anything
  #[arg(long)]
  dry_run: bool,

  /// Output the dry-run plan in JSON format
  #[arg(long, requires = "dry_run")]
  json: bool,

  /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_logging(verbose: u8) {
  let level = match verbose {
    0 => log::LevelFilter::Warn,
    1 => log::LevelFilter::Info,
    _ => log::LevelFilter::Debug,
  };

  env_logger::Builder::new()
    .filter_level(level)
    .parse_default_env()
    .format_timestamp(None)
    .format_target(false)
    .init();
}

fn main() {
  // Invalid bump kinds are rejected here, before anything touches the repo
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let start = match cli.root {
    Some(root) => root,
    None => match std::env::current_dir() {
      Ok(dir) => dir,
      Err(e) => {
        eprintln!("Error: Failed to get current directory: {}", e);
        std::process::exit(1);
      }
    },
  };

  let git = SystemGit::open(&start).unwrap_or_else(|e| handle_error(e));
  let ctx = ReleaseContext::build(git.work_tree(), cli.remote).unwrap_or_else(|e| handle_error(e));
  log::debug!("release root: {}", ctx.root.display());

  if let Err(err) = commands::run_release(&ctx, &git, cli.bump, cli.dry_run, cli.json) {
    handle_error(err);
  }
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
