//! htmlchunk - split a single-file HTML book into linked pages

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use htmlchunk::{ArenaDom, ChunkConfig, DocumentIndex, chunk, input_path, load_document};

#[derive(Parser, Debug)]
#[command(name = "htmlchunk")]
#[command(version, about = "Split a single-file HTML book into linked pages", long_about = None)]
#[command(after_help = "EXAMPLES:
    htmlchunk build handbook                 Split build/handbook.html into build/<id>.html
    htmlchunk --prefix-base build handbook   Name pages build/handbook<id>.html
    htmlchunk -i --json build handbook       Print the book structure as JSON")]
struct Cli {
    /// Directory holding the input document; pages are written here
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Base name of the input document (reads <OUTPUT_DIR>/<BASE>.html)
    #[arg(value_name = "BASE")]
    base: String,

    /// Prefix every page file name with the base name
    #[arg(long)]
    prefix_base: bool,

    /// CSS selector for part headings
    #[arg(long, value_name = "SELECTOR")]
    part_selector: Option<String>,

    /// CSS selector for chapter sections
    #[arg(long, value_name = "SELECTOR")]
    chapter_selector: Option<String>,

    /// Id of the element whose content is split into pages
    #[arg(long, value_name = "ID")]
    content_id: Option<String>,

    /// Show the book structure without writing pages
    #[arg(short, long)]
    info: bool,

    /// Print --info output as JSON
    #[arg(long, requires = "info")]
    json: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log every indexed item
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> ChunkConfig {
        let mut config = ChunkConfig::default();
        if let Some(selector) = &self.part_selector {
            config = config.with_part_selector(selector);
        }
        if let Some(selector) = &self.chapter_selector {
            config = config.with_chapter_selector(selector);
        }
        if let Some(id) = &self.content_id {
            config = config.with_content_id(id);
        }
        if self.prefix_base {
            config = config.with_file_prefix(&self.base);
        }
        config
    }

    fn log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_level()) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    tracing::debug!(?cli, "parsed cli");

    let result = if cli.info {
        show_info(&cli)
    } else {
        htmlchunk::run(&cli.output_dir, &cli.base, &cli.config())
            .map(|_| ())
            .map_err(|e| e.to_string())
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[derive(Serialize)]
struct Outline {
    input: String,
    parts: Vec<PartInfo>,
    chapters: Vec<ChapterInfo>,
    unresolved: Vec<String>,
}

#[derive(Serialize)]
struct PartInfo {
    id: String,
    title: String,
    file: String,
    has_intro: bool,
}

#[derive(Serialize)]
struct ChapterInfo {
    id: String,
    title: String,
    file: String,
    prev: Option<String>,
    next: Option<String>,
    subsections: Vec<String>,
}

impl Outline {
    fn new(input: String, dom: &ArenaDom, index: &DocumentIndex, config: &ChunkConfig) -> Self {
        let parts = index
            .parts
            .iter()
            .map(|part| PartInfo {
                id: part.id.clone(),
                title: dom.text_of(part.heading).trim().to_string(),
                file: config.page_filename(&part.id),
                has_intro: part.intro.is_some(),
            })
            .collect();
        let chapters = index
            .chapters
            .iter()
            .map(|chapter| ChapterInfo {
                id: chapter.id.clone(),
                title: chapter.title.clone(),
                file: config.page_filename(&chapter.id),
                prev: chapter.prev.clone(),
                next: chapter.next.clone(),
                subsections: chapter.subsections.clone(),
            })
            .collect();
        Self {
            input,
            parts,
            chapters,
            unresolved: Vec::new(),
        }
    }
}

fn show_info(cli: &Cli) -> Result<(), String> {
    let config = cli.config();
    let path = input_path(&cli.output_dir, &cli.base);
    let mut dom = load_document(&path).map_err(|e| e.to_string())?;
    let chunked = chunk(&mut dom, &config).map_err(|e| e.to_string())?;

    let mut outline = Outline::new(path.display().to_string(), &dom, &chunked.index, &config);
    outline.unresolved = chunked.report.unresolved;

    if cli.json {
        let json = serde_json::to_string_pretty(&outline).map_err(|e| e.to_string())?;
        println!("{json}");
        return Ok(());
    }

    println!("File: {}", outline.input);
    println!("Parts: {}", outline.parts.len());
    for part in &outline.parts {
        let intro = if part.has_intro { " (intro)" } else { "" };
        println!("  {} -> {}{intro}", part.title, part.file);
    }
    println!("Chapters: {}", outline.chapters.len());
    for chapter in &outline.chapters {
        println!("  {} -> {}", chapter.title, chapter.file);
        for sub in &chapter.subsections {
            println!("    #{sub}");
        }
    }
    if !outline.unresolved.is_empty() {
        println!("Unresolved links: {}", outline.unresolved.join(", "));
    }

    Ok(())
}
