use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::Parser;
use threesg::{Generator, Site, Syntax};

/// Generate a static site.
///
/// Page paths are read from standard input, one per line, until the end of
/// input or an empty line. Each page must live under the web root.
#[derive(Debug, Parser)]
#[command(name = "threesg", version)]
struct Cli {
    /// The global configuration file.
    #[arg(short = 'c', long, default_value = "global.cfg")]
    config: PathBuf,

    /// The directory generated pages are written to.
    #[arg(short = 'o', long, default_value = "output")]
    output_dir: PathBuf,

    /// The directory templates and includes are resolved against.
    #[arg(short = 'p', long, default_value = ".")]
    project_dir: PathBuf,

    /// The directory containing the page sources.
    #[arg(short = 'w', long, default_value = "content")]
    web_root: PathBuf,

    /// The opening directive delimiter.
    #[arg(long, default_value = "[")]
    open: String,

    /// The closing directive delimiter.
    #[arg(long, default_value = "]")]
    close: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        match err.downcast_ref::<threesg::Error>() {
            Some(err) => eprintln!("{err:#}"),
            None => eprintln!("error: {err:#}"),
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.open.is_empty() || cli.close.is_empty() || cli.open == cli.close {
        bail!("delimiters must be non-empty and distinct");
    }
    if cli.open.starts_with('\\') || cli.close.starts_with('\\') {
        bail!("delimiters must not start with `\\`");
    }

    fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("failed to create {}", cli.output_dir.display()))?;
    let output_dir = canonicalize(&cli.output_dir)?;
    let project_dir = canonicalize(&cli.project_dir)?;
    let web_root = canonicalize(&cli.web_root)?;

    let pages = read_pages(io::stdin().lock(), &web_root)?;
    log::debug!("read {} pages", pages.len());

    let mut generator = Generator::new(project_dir);
    generator.set_syntax(Syntax::builder().directive(&cli.open, &cli.close).build());

    let mut site = Site::new(generator, web_root, output_dir);
    site.load_globals(&cli.config)?;
    let n = site.build(&pages)?;
    log::info!("generated {n} pages");
    Ok(())
}

/// Reads page paths until the end of input or an empty line and returns them
/// relative to the web root, each with a leading `/`.
fn read_pages<R: BufRead>(input: R, web_root: &Path) -> Result<Vec<String>> {
    let mut pages = Vec::new();
    for line in input.lines() {
        let line = line.context("failed to read pages")?;
        if line.is_empty() {
            break;
        }
        let path = canonicalize(Path::new(&line))?;
        let rel = match path.strip_prefix(web_root) {
            Ok(rel) => rel,
            Err(_) => bail!(
                "page {} not in web root {}",
                path.display(),
                web_root.display()
            ),
        };
        let mut page = String::new();
        for c in rel.components() {
            page.push('/');
            page.push_str(&c.as_os_str().to_string_lossy());
        }
        pages.push(page);
    }
    Ok(pages)
}

fn canonicalize(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("failed to resolve {}", path.display()))
}
