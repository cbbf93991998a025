use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use walken_hash::ObjectId;
use walken_object::{Blob, Commit, ObjectType, Tag, Tree};
use walken_revwalk::{
    format_object_line, format_summary, StructuralFilter, Visitor, WalkCounts, WalkError,
    WalkMode, WalkSession,
};

use super::{open_store, WalkArgs};
use crate::Cli;

#[derive(Args)]
pub struct ObjectsArgs {
    #[command(flatten)]
    walk: WalkArgs,

    /// Omit objects from the walk: tree:<depth> or blob:none
    #[arg(long, value_name = "filter-spec")]
    filter: Option<String>,
}

/// Writes `<type>: <hex>` for every object.
struct ObjectSink<W> {
    out: W,
}

impl<W: Write> ObjectSink<W> {
    fn line(&mut self, kind: ObjectType, oid: &ObjectId) -> Result<(), WalkError> {
        writeln!(self.out, "{}", format_object_line(kind, oid))?;
        Ok(())
    }
}

impl<W: Write> Visitor for ObjectSink<W> {
    fn on_commit(&mut self, oid: &ObjectId, _: &Commit, _: &WalkCounts) -> Result<(), WalkError> {
        self.line(ObjectType::Commit, oid)
    }

    fn on_tree(&mut self, oid: &ObjectId, _: &Tree, _: &WalkCounts) -> Result<(), WalkError> {
        self.line(ObjectType::Tree, oid)
    }

    fn on_blob(&mut self, oid: &ObjectId, _: &Blob, _: &WalkCounts) -> Result<(), WalkError> {
        self.line(ObjectType::Blob, oid)
    }

    fn on_tag(&mut self, oid: &ObjectId, _: &Tag, _: &WalkCounts) -> Result<(), WalkError> {
        self.line(ObjectType::Tag, oid)
    }
}

pub fn run(args: &ObjectsArgs, cli: &Cli) -> Result<i32> {
    let store = open_store(cli)?;
    let mut filters = args.walk.filters()?;
    if let Some(spec) = &args.filter {
        filters.set_structural(Some(StructuralFilter::parse(spec)?));
    }
    let mut session =
        WalkSession::new(&store, args.walk.options(WalkMode::Objects)).with_filters(filters);
    session.seed_names(&store, args.walk.revisions().as_slice())?;

    let stdout = io::stdout();
    let mut sink = ObjectSink { out: stdout.lock() };
    let report = session.run(&mut sink)?;
    write!(sink.out, "{}", format_summary(&report.counts))?;
    sink.out.flush()?;
    Ok(0)
}
