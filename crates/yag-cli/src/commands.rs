use std::io::Write;
use std::path::PathBuf;

use anyhow::Context as _;
use colored::Colorize;
use serde::Serialize;
use yag_repo::{resolve, Repository};
use yag_store::{Object, ObjectKind};
use yag_types::ObjectId;

use crate::cli::*;

/// Per-invocation settings handed to every command.
pub struct Context {
    pub format: OutputFormat,
    pub cwd: PathBuf,
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context {
        format: cli.format,
        cwd: std::env::current_dir().context("cannot determine current directory")?,
    };
    match cli.command {
        Command::Init(args) => cmd_init(&ctx, args),
        Command::HashObject(args) => cmd_hash_object(&ctx, args),
        Command::CatFile(args) => cmd_cat_file(&ctx, args),
    }
}

#[derive(Debug, Serialize)]
struct HashReport {
    id: String,
    kind: ObjectKind,
    written: bool,
}

#[derive(Debug, Serialize)]
struct CatReport {
    id: String,
    kind: ObjectKind,
    size: usize,
    content: String,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn init(ctx: &Context, args: &InitArgs) -> anyhow::Result<Repository> {
    let path = ctx.cwd.join(&args.path);
    Repository::create(&path)
        .with_context(|| format!("cannot initialize repository in {}", path.display()))
}

fn cmd_init(ctx: &Context, args: InitArgs) -> anyhow::Result<()> {
    let repo = init(ctx, &args)?;
    let meta = repo.meta_dir().display().to_string();
    match ctx.format {
        OutputFormat::Text => println!(
            "{} Initialized empty yag repository in {}",
            "✓".green().bold(),
            meta.bold()
        ),
        OutputFormat::Json => print_json(&serde_json::json!({ "path": meta }))?,
    }
    Ok(())
}

fn hash_object(ctx: &Context, args: &HashObjectArgs) -> anyhow::Result<ObjectId> {
    let file = ctx.cwd.join(&args.file);
    let data = std::fs::read(&file).with_context(|| format!("cannot read {}", file.display()))?;
    let object = Object::new(args.kind, data);
    if !args.write {
        return Ok(object.compute_id());
    }
    let repo = Repository::discover_required(&ctx.cwd)?;
    Ok(repo.write_object(&object, true)?)
}

fn cmd_hash_object(ctx: &Context, args: HashObjectArgs) -> anyhow::Result<()> {
    let id = hash_object(ctx, &args)?;
    match ctx.format {
        OutputFormat::Text => println!("{id}"),
        OutputFormat::Json => print_json(&HashReport {
            id: id.to_hex(),
            kind: args.kind,
            written: args.write,
        })?,
    }
    Ok(())
}

fn cat_file(ctx: &Context, args: &CatFileArgs) -> anyhow::Result<(ObjectId, Object)> {
    let repo = Repository::discover_required(&ctx.cwd)?;
    let id = resolve(&repo, &args.object, Some(args.kind))?;
    let object = repo.read_object(&id)?;
    Ok((id, object))
}

fn cmd_cat_file(ctx: &Context, args: CatFileArgs) -> anyhow::Result<()> {
    let (id, object) = cat_file(ctx, &args)?;
    match ctx.format {
        OutputFormat::Text => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(object.payload())?;
            stdout.flush()?;
        }
        OutputFormat::Json => print_json(&CatReport {
            id: id.to_hex(),
            kind: object.kind(),
            size: object.payload().len(),
            content: String::from_utf8_lossy(object.payload()).into_owned(),
        })?,
    }
    Ok(())
}
