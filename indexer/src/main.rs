use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use retrieval::persist::{load_index, save_index, save_meta, IndexPaths, MetaFile};
use retrieval::tokenizer::parse_stopwords;
use retrieval::{build_index, EnglishStopwords, InvertedIndex, PorterNormalizer, QueryEngine, StopwordFilter};
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a boolean/wildcard index over a directory of text files and query it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from every file directly under a directory
    Build {
        /// Input directory
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Stopword file (one word per line); defaults to the built-in English list
        #[arg(long)]
        stopwords: Option<String>,
    },
    /// Evaluate one boolean query against a built index
    Query {
        /// Index directory
        #[arg(long, default_value = "./index")]
        index: String,
        /// Query, e.g. "(brutus and not (caesar or cleopatra))"
        #[arg(long)]
        q: String,
    },
    /// Read queries from stdin until EXIT, building the index first if it is missing
    Repl {
        /// Index directory; loaded if it holds an index
        #[arg(long, default_value = "./index")]
        index: String,
        /// Corpus directory used when the index has to be built
        #[arg(long)]
        input: Option<String>,
        /// Stopword file used when building
        #[arg(long)]
        stopwords: Option<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, stopwords } => {
            build(&input, &output, stopwords.as_deref()).map(|_| ())
        }
        Commands::Query { index, q } => query(&index, &q),
        Commands::Repl { index, input, stopwords } => {
            let index = load_or_build(&index, input.as_deref(), stopwords.as_deref())?;
            let stdin = io::stdin();
            repl(&index, stdin.lock(), io::stdout().lock())
        }
    }
}

fn build(input: &str, output: &str, stopwords_file: Option<&str>) -> Result<InvertedIndex> {
    let normalizer = PorterNormalizer::new();
    let stopwords: Box<dyn StopwordFilter> = match stopwords_file {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading stopwords {path}"))?;
            Box::new(parse_stopwords(&text, &normalizer))
        }
        None => Box::new(EnglishStopwords::new(&normalizer)),
    };

    let documents = read_corpus(Path::new(input))?;
    tracing::info!(num_docs = documents.len(), input, "read corpus");
    let index = build_index(documents, &normalizer, stopwords.as_ref());

    let out_paths = IndexPaths::new(output);
    save_index(&out_paths, &index)?;
    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into());
    save_meta(&out_paths, &MetaFile::for_index(&index, created_at))?;

    tracing::info!(output, "index build complete");
    Ok(index)
}

/// Load the index under `index_dir`, or build and save it from `input` when
/// there is none yet.
fn load_or_build(index_dir: &str, input: Option<&str>, stopwords_file: Option<&str>) -> Result<InvertedIndex> {
    let paths = IndexPaths::new(index_dir);
    if paths.index().is_file() {
        return load_index(&paths);
    }
    let Some(input) = input else {
        bail!("no index at {} and no --input to build one from", index_dir);
    };
    tracing::info!(input, index_dir, "building inverted index");
    build(input, index_dir, stopwords_file)
}

/// Evaluate one query per line until `EXIT` or end of input. Invalid queries
/// are reported and the loop continues.
fn repl<R: BufRead, W: Write>(index: &InvertedIndex, input: R, mut out: W) -> Result<()> {
    let normalizer = PorterNormalizer::new();
    let engine = QueryEngine::new(index, &normalizer);
    let mut lines = input.lines();
    loop {
        write!(out, "\nEnter query: ")?;
        out.flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let q = line.trim();
        if q == "EXIT" { break; }
        match engine.compute(q) {
            Ok(result) => {
                let files: Vec<&str> = result.iter().filter_map(|id| engine.lookup_filename(*id)).collect();
                writeln!(out, "{}/{} matches:", files.len(), index.num_docs())?;
                for f in files {
                    writeln!(out, "{f}")?;
                }
            }
            Err(e) => writeln!(out, "invalid query: {e}")?,
        }
    }
    Ok(())
}

fn query(index_dir: &str, q: &str) -> Result<()> {
    let index = load_index(&IndexPaths::new(index_dir))?;
    let normalizer = PorterNormalizer::new();
    let engine = QueryEngine::new(&index, &normalizer);
    let result = engine.compute(q)?;
    let files: Vec<&str> = result.iter().filter_map(|id| engine.lookup_filename(*id)).collect();
    println!("{}/{} matches:", files.len(), index.num_docs());
    for f in files {
        println!("{f}");
    }
    Ok(())
}

/// Regular files directly under `dir`, sorted by file name, as
/// `(filename, text)`. A file that is not valid UTF-8 aborts the build.
fn read_corpus(dir: &Path) -> Result<Vec<(String, String)>> {
    anyhow::ensure!(dir.is_dir(), "{} is not a directory", dir.display());
    let mut documents = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() { continue; }
        let name = entry.file_name().to_string_lossy().into_owned();
        let text = fs::read_to_string(entry.path())
            .with_context(|| format!("reading document {}", entry.path().display()))?;
        documents.push((name, text));
    }
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn corpus_is_sorted_and_skips_subdirectories() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "dog").unwrap();
        fs::write(dir.path().join("a.txt"), "cat").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.txt"), "bird").unwrap();

        let docs = read_corpus(dir.path()).unwrap();
        let names: Vec<&str> = docs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert_eq!(docs[0].1, "cat");
    }

    #[test]
    fn unreadable_document_aborts() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bad.bin"), [0xffu8, 0xfe, 0x00]).unwrap();
        let err = read_corpus(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("bad.bin"));
    }

    #[test]
    fn build_then_query() {
        let corpus = corpus_dir();
        let out = tempdir().unwrap();
        let out_dir = out.path().join("index");

        build(corpus.path().to_str().unwrap(), out_dir.to_str().unwrap(), None).unwrap();

        let index = load_index(&IndexPaths::new(&out_dir)).unwrap();
        let normalizer = PorterNormalizer::new();
        let engine = QueryEngine::new(&index, &normalizer);
        assert_eq!(engine.compute("(cat or dog)").unwrap().into_vec(), vec![0, 1]);
        assert_eq!(engine.lookup_filename(1), Some("1.txt"));
        query(out_dir.to_str().unwrap(), "(sat and not cat)").unwrap();
    }

    fn corpus_dir() -> tempfile::TempDir {
        let corpus = tempdir().unwrap();
        fs::write(corpus.path().join("0.txt"), "The cat sat.").unwrap();
        fs::write(corpus.path().join("1.txt"), "The dog sat.").unwrap();
        corpus
    }

    #[test]
    fn load_or_build_builds_once_then_loads() {
        let corpus = corpus_dir();
        let out = tempdir().unwrap();
        let index_dir = out.path().join("index");
        let index_dir = index_dir.to_str().unwrap();

        let built = load_or_build(index_dir, corpus.path().to_str(), None).unwrap();
        assert!(IndexPaths::new(index_dir).index().is_file());
        assert!(IndexPaths::new(index_dir).meta().is_file());

        // The corpus is no longer needed once the index exists.
        let loaded = load_or_build(index_dir, None, None).unwrap();
        assert_eq!(loaded, built);
    }

    #[test]
    fn load_or_build_without_index_or_input_fails() {
        let out = tempdir().unwrap();
        let err = load_or_build(out.path().join("index").to_str().unwrap(), None, None).unwrap_err();
        assert!(err.to_string().contains("no index"));
    }

    #[test]
    fn repl_answers_until_exit() {
        let corpus = corpus_dir();
        let out = tempdir().unwrap();
        let index = build(corpus.path().to_str().unwrap(), out.path().to_str().unwrap(), None).unwrap();

        let input = "(cat or dog)\n(cat and\n(dog)\nEXIT\n(cat)\n";
        let mut output = Vec::new();
        repl(&index, input.as_bytes(), &mut output).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.contains("2/2 matches:\n0.txt\n1.txt\n"));
        assert!(output.contains("invalid query: unbalanced parentheses"));
        assert!(output.contains("1/2 matches:\n1.txt\n"));
        // Nothing after EXIT is evaluated.
        assert!(!output.contains("1/2 matches:\n0.txt"));
        assert_eq!(output.matches("Enter query: ").count(), 4);
    }

    #[test]
    fn repl_stops_at_end_of_input() {
        let index = InvertedIndex::new();
        let mut output = Vec::new();
        repl(&index, "".as_bytes(), &mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "\nEnter query: ");
    }
}
