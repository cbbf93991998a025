use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use walken_hash::ObjectId;
use walken_object::Commit;
use walken_revwalk::{format_oneline, Visitor, WalkCounts, WalkError, WalkMode, WalkSession};

use super::{open_store, WalkArgs};
use crate::Cli;

#[derive(Args)]
pub struct CommitsArgs {
    #[command(flatten)]
    walk: WalkArgs,

    /// Shorten object names to <n> hex digits
    #[arg(long, value_name = "n")]
    abbrev: Option<usize>,
}

/// Writes one `<hex> <subject>` line per commit.
struct OnelineSink<W> {
    out: W,
    abbrev: Option<usize>,
}

impl<W: Write> Visitor for OnelineSink<W> {
    fn on_commit(&mut self, oid: &ObjectId, commit: &Commit, _: &WalkCounts) -> Result<(), WalkError> {
        writeln!(self.out, "{}", format_oneline(oid, commit, self.abbrev))?;
        Ok(())
    }
}

pub fn run(args: &CommitsArgs, cli: &Cli) -> Result<i32> {
    let store = open_store(cli)?;
    let mut session = WalkSession::new(&store, args.walk.options(WalkMode::Commits))
        .with_filters(args.walk.filters()?);
    session.seed_names(&store, args.walk.revisions().as_slice())?;

    let stdout = io::stdout();
    let mut sink = OnelineSink {
        out: stdout.lock(),
        abbrev: args.abbrev,
    };
    session.run(&mut sink)?;
    sink.out.flush()?;
    Ok(0)
}
