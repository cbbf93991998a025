pub mod commits;
pub mod objects;

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};
use walken_odb::LooseStore;
use walken_revwalk::{
    DateRange, FilterChain, HeaderGrep, MessageGrep, SortOrder, WalkMode, WalkOptions,
};

use crate::Cli;

#[derive(Subcommand)]
pub enum Commands {
    /// List commits, one summary line each
    Commits(commits::CommitsArgs),
    /// List commits with their trees, blobs and tags, then print counts
    Objects(objects::ObjectsArgs),
}

/// Options shared by both walks.
#[derive(Args)]
pub struct WalkArgs {
    /// Show no parent before all of its children are shown (default)
    #[arg(long, conflicts_with_all = ["date_order", "author_date_order"])]
    topo_order: bool,

    /// Order by committer date, newest first
    #[arg(long, conflicts_with = "author_date_order")]
    date_order: bool,

    /// Order by author date, newest first
    #[arg(long)]
    author_date_order: bool,

    /// Output commits in reverse order
    #[arg(long)]
    reverse: bool,

    /// Limit to commits whose author line matches <regex>
    #[arg(long, value_name = "regex")]
    author: Option<String>,

    /// Limit to commits whose committer line matches <regex>
    #[arg(long, value_name = "regex")]
    committer: Option<String>,

    /// Limit to commits whose <field> header matches <regex>
    #[arg(long = "header", value_name = "field=regex")]
    headers: Vec<String>,

    /// Limit to commits whose message matches <regex>
    #[arg(long, value_name = "regex")]
    grep: Vec<String>,

    /// Show commits that do not match the commit filters
    #[arg(long)]
    invert_grep: bool,

    /// Show commits committed at or after <timestamp> (seconds since the epoch)
    #[arg(long, value_name = "timestamp")]
    since: Option<i64>,

    /// Show commits committed at or before <timestamp> (seconds since the epoch)
    #[arg(long, value_name = "timestamp")]
    until: Option<i64>,

    /// Limit the number of commits to output
    #[arg(short = 'n', long = "max-count")]
    max_count: Option<usize>,

    /// Revisions to start from (default: HEAD)
    revisions: Vec<String>,
}

impl WalkArgs {
    pub fn options(&self, mode: WalkMode) -> WalkOptions {
        let sort = if self.date_order {
            SortOrder::CommitDate
        } else if self.author_date_order {
            SortOrder::AuthorDate
        } else {
            SortOrder::Topological
        };
        WalkOptions {
            mode,
            sort,
            reverse: self.reverse,
            max_count: self.max_count,
        }
    }

    pub fn filters(&self) -> Result<FilterChain> {
        let mut chain = FilterChain::new();
        if let Some(pattern) = &self.author {
            chain.push(HeaderGrep::author(pattern)?);
        }
        if let Some(pattern) = &self.committer {
            chain.push(HeaderGrep::committer(pattern)?);
        }
        for spec in &self.headers {
            chain.push(HeaderGrep::parse(spec)?);
        }
        for pattern in &self.grep {
            chain.push(MessageGrep::new(pattern)?);
        }
        if self.since.is_some() || self.until.is_some() {
            chain.push(DateRange {
                since: self.since,
                until: self.until,
            });
        }
        chain.set_invert(self.invert_grep);
        Ok(chain)
    }

    pub fn revisions(&self) -> Vec<String> {
        if self.revisions.is_empty() {
            vec!["HEAD".to_string()]
        } else {
            self.revisions.clone()
        }
    }
}

/// Open the object store, respecting --git-dir.
pub fn open_store(cli: &Cli) -> Result<LooseStore> {
    let store = if let Some(ref git_dir) = cli.git_dir {
        LooseStore::open(git_dir)?
    } else {
        LooseStore::discover(Path::new("."))?
    };
    tracing::debug!(git_dir = %store.git_dir().display(), "using repository");
    Ok(store)
}

pub fn run(cli: Cli) -> Result<i32> {
    match &cli.command {
        Commands::Commits(args) => commits::run(args, &cli),
        Commands::Objects(args) => objects::run(args, &cli),
    }
}
