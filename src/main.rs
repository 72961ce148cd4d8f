use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lit::areas::repository::Repository;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "LIT_LOG";

#[derive(Parser)]
#[command(
    name = "lit",
    version = "0.1.0",
    about = "A minimal content-addressed version control engine",
    long_about = "lit snapshots files into a content-addressed object store, \
    stages them in an index and records the staged tree as commits on the current branch.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(
        name = "add",
        about = "Stage files for the next commit",
        long_about = "This command stores the content of the given files and records them in the index. \
        Directories are staged recursively."
    )]
    Add {
        #[arg(index = 1, required = true, help = "The files or directories to stage")]
        paths: Vec<PathBuf>,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command records the staged snapshot as a new commit on the current branch."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "write-tree",
        about = "Write the index as a tree object",
        long_about = "This command stores the tree hierarchy described by the index and prints the root tree id."
    )]
    WriteTree,
    #[command(
        name = "hash-object",
        about = "Hash a file and optionally write it to the object database",
        long_about = "This command computes the blob id of a file and can write the blob to the object database."
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: PathBuf,
    },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command pretty-prints a stored blob, tree or commit given its id."
    )]
    CatFile {
        #[arg(short = 'p', long, help = "The object id to print")]
        sha: String,
    },
    #[command(
        name = "ls-files",
        about = "List the staged files",
        long_about = "This command prints the mode, blob id and path of every entry in the index."
    )]
    LsFiles,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn discover(pwd: &Path) -> Result<Repository> {
    Repository::discover(pwd, Box::new(std::io::stdout())).context("Failed to open repository")
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let pwd = std::env::current_dir().context("Failed to read the current directory")?;

    match &cli.command {
        Commands::Init { path } => {
            let path = path.as_ref().map_or_else(|| pwd.clone(), |path| pwd.join(path));
            let repository = Repository::new(&path, Box::new(std::io::stdout()))?;

            repository.init()?
        }
        Commands::Add { paths } => {
            let paths = paths.iter().map(|path| pwd.join(path)).collect::<Vec<_>>();

            discover(&pwd)?.add(&paths)?
        }
        Commands::Commit { message } => discover(&pwd)?.commit(message)?,
        Commands::WriteTree => discover(&pwd)?.write_index_tree()?,
        Commands::HashObject { write, file } => {
            discover(&pwd)?.hash_object(&pwd.join(file), *write)?
        }
        Commands::CatFile { sha } => discover(&pwd)?.cat_file(sha)?,
        Commands::LsFiles => discover(&pwd)?.ls_files()?,
    }

    Ok(())
}
