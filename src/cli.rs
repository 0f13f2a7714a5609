use clap::{Parser, Subcommand};

use crate::models::SiteFamily;

fn parse_site(tag: &str) -> Result<SiteFamily, String> {
    SiteFamily::from_tag(tag).ok_or_else(|| format!("unknown site '{}', expected one of gg, hb, n11", tag))
}

#[derive(Debug, Parser)]
#[command(name = "pricedrop-watcher")]
#[command(about = "Tracks product prices and e-mails subscribers when they drop")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Commands {
    /// Start the periodic crawl and run until Ctrl-C
    Run {
        /// Run one cycle immediately instead of waiting a full interval
        #[arg(long)]
        now: bool,
    },
    /// Subscribe an e-mail address to a product link
    Subscribe {
        link: String,
        email: String,
        /// Site the link belongs to (gg, hb, n11); checked against the link's host
        #[arg(long, value_parser = parse_site)]
        site: Option<SiteFamily>,
    },
    /// Remove an e-mail address from a product link
    Unsubscribe { link: String, email: String },
    /// Print every tracked item
    List {
        /// Print the raw store as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a single crawl cycle and print its report
    Crawl,
}
