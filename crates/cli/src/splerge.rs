//! splerge - build split/merge training targets and score split predictions
//!
//! Tables are read as JSON:
//!
//! ```json
//! {"id": 1, "rect": [0, 0, 100, 50],
//!  "cells": [{"text_rect": [5, 5, 40, 20], "grid_rect": [0, 0, 1, 1]}]}
//! ```
//!
//! Rectangles are `[left, top, right, bottom]`; `grid_rect` is the half-open
//! span `[col_start, row_start, col_end, row_end]`. Split-point sequences are
//! passed as strings of `0` and `1`.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use splerge_core::dataset::{AnnotatedTable, TableFilter, TargetBuilder};
use splerge_core::metrics::{IntervalMatchSettings, IntervalwiseFMeasure};
use splerge_core::{Cell, Grid, Rect, Table};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "splerge")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue, global = true)]
    debug: bool,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-", global = true)]
    outfile: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the ground-truth split-point masks of a table
    SplitMasks {
        /// Table JSON file, or "-" for stdin
        table: PathBuf,
    },
    /// Rebuild the grid implied by binary split-point sequences
    Grid {
        /// Table JSON file, or "-" for stdin
        table: PathBuf,
        #[command(flatten)]
        split: SplitBits,
    },
    /// Print merge masks of the predicted grid against the annotation
    MergeMasks {
        /// Table JSON file, or "-" for stdin
        table: PathBuf,
        #[command(flatten)]
        split: SplitBits,
    },
    /// Build split targets for a JSON array of annotated tables (JSON lines out)
    Targets {
        /// File holding `[{"document": "...", "table": {...}}, ...]`
        tables: PathBuf,
        /// Document stems to skip; replaces the built-in denylist
        #[arg(long = "ignore", value_delimiter = ',')]
        ignore: Option<Vec<String>>,
    },
    /// Interval-wise F-measure over JSON lines of `{"markup": .., "predicted": ..}`
    Score {
        /// JSON lines file, or "-" for stdin
        pairs: PathBuf,
        /// Overlap with the shorter interval a pair must exceed to match
        #[arg(long = "min-overlap", default_value = "0.5")]
        min_overlap: f64,
    },
}

#[derive(ClapArgs, Debug)]
struct SplitBits {
    /// Horizontal split-point bits, one per pixel of table height
    #[arg(long)]
    horz: String,
    /// Vertical split-point bits, one per pixel of table width
    #[arg(long)]
    vert: String,
}

#[derive(Deserialize, Debug)]
struct CellJson {
    text_rect: [i32; 4],
    grid_rect: [i32; 4],
}

#[derive(Deserialize, Debug)]
struct TableJson {
    id: i64,
    rect: [i32; 4],
    cells: Vec<CellJson>,
}

#[derive(Deserialize, Debug)]
struct AnnotatedTableJson {
    document: String,
    table: TableJson,
}

#[derive(Deserialize, Debug)]
struct MaskPairJson {
    markup: String,
    predicted: String,
}

#[derive(Serialize)]
struct SplitMasksOut {
    horz_split_points_mask: String,
    vert_split_points_mask: String,
}

#[derive(Serialize)]
struct GridOut<'a> {
    rows: &'a [i32],
    cols: &'a [i32],
}

#[derive(Serialize)]
struct MergeMasksOut<'a> {
    rows: &'a [i32],
    cols: &'a [i32],
    merge_right: Vec<Vec<bool>>,
    merge_down: Vec<Vec<bool>>,
}

#[derive(Serialize)]
struct TargetsOut<'a> {
    key: &'a str,
    horz_split_points_mask: String,
    vert_split_points_mask: String,
}

#[derive(Serialize)]
struct ScoreOut {
    markup: u64,
    predicted: u64,
    matched: u64,
    precision: f64,
    recall: f64,
    f1: f64,
}

fn to_rect(r: [i32; 4]) -> Rect {
    Rect::new(r[0], r[1], r[2], r[3])
}

impl From<TableJson> for Table {
    fn from(t: TableJson) -> Self {
        let cells = t
            .cells
            .into_iter()
            .map(|c| Cell::new(to_rect(c.text_rect), to_rect(c.grid_rect)))
            .collect();
        Table::new(t.id, to_rect(t.rect), cells)
    }
}

fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(io::stdin()));
    }
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(Box::new(file))
}

fn read_table(path: &Path) -> Result<Table> {
    let json: TableJson = serde_json::from_reader(BufReader::new(open_input(path)?))
        .with_context(|| format!("parsing table {}", path.display()))?;
    Ok(json.into())
}

/// Parse a string of `0`/`1` characters; whitespace is ignored.
fn parse_bits(s: &str) -> Result<Vec<i32>> {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '0' => Ok(0),
            '1' => Ok(1),
            other => bail!("invalid split-point bit {other:?}"),
        })
        .collect()
}

fn render_bits(mask: &[bool]) -> String {
    mask.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

fn write_json<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn split_masks(table: &Table, out: &mut dyn Write) -> Result<()> {
    let masks = SplitMasksOut {
        horz_split_points_mask: render_bits(&table.horz_split_points_mask()?),
        vert_split_points_mask: render_bits(&table.vert_split_points_mask()?),
    };
    write_json(out, &masks)
}

fn predicted_grid(table: &Table, split: &SplitBits) -> Result<Grid> {
    let horz = parse_bits(&split.horz).context("--horz")?;
    let vert = parse_bits(&split.vert).context("--vert")?;
    Ok(Grid::from_rect_and_masks(&table.rect, &horz, &vert)?)
}

fn targets(path: &Path, ignore: Option<Vec<String>>, out: &mut dyn Write) -> Result<()> {
    let tables: Vec<AnnotatedTableJson> =
        serde_json::from_reader(BufReader::new(open_input(path)?))
            .with_context(|| format!("parsing tables {}", path.display()))?;
    let tables: Vec<AnnotatedTable> = tables
        .into_iter()
        .map(|t| AnnotatedTable {
            document: t.document,
            table: t.table.into(),
        })
        .collect();
    let filter = match ignore {
        Some(ignored_documents) => TableFilter { ignored_documents },
        None => TableFilter::default(),
    };
    let builder = TargetBuilder::new(filter);
    let built = builder.split_targets(&tables)?;
    debug!(tables = tables.len(), built = built.len(), "split targets");
    for (key, targets) in &built {
        write_json(
            out,
            &TargetsOut {
                key,
                horz_split_points_mask: render_bits(&targets.horz_split_points_mask),
                vert_split_points_mask: render_bits(&targets.vert_split_points_mask),
            },
        )?;
    }
    Ok(())
}

fn score(path: &Path, min_overlap: f64, out: &mut dyn Write) -> Result<()> {
    let mut markup = Vec::new();
    let mut predicted = Vec::new();
    for (lineno, line) in BufReader::new(open_input(path)?).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let pair: MaskPairJson = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", path.display(), lineno + 1))?;
        markup.push(parse_bits(&pair.markup)?);
        predicted.push(parse_bits(&pair.predicted)?);
    }

    let mut metric = IntervalwiseFMeasure::with_settings(IntervalMatchSettings { min_overlap });
    metric.update(&markup, &predicted)?;
    let counts = metric.counts();
    let scores = metric.scores()?;
    write_json(
        out,
        &ScoreOut {
            markup: counts.markup,
            predicted: counts.predicted,
            matched: counts.matched,
            precision: scores.precision,
            recall: scores.recall,
            f1: scores.f1,
        },
    )
}

fn run(args: Args, out: &mut dyn Write) -> Result<()> {
    match args.command {
        Command::SplitMasks { table } => split_masks(&read_table(&table)?, out),
        Command::Grid { table, split } => {
            let grid = predicted_grid(&read_table(&table)?, &split)?;
            write_json(
                out,
                &GridOut {
                    rows: grid.rows(),
                    cols: grid.cols(),
                },
            )
        }
        Command::MergeMasks { table, split } => {
            let table = read_table(&table)?;
            let grid = predicted_grid(&table, &split)?;
            let masks = table.create_merge_masks(&grid)?;
            write_json(
                out,
                &MergeMasksOut {
                    rows: grid.rows(),
                    cols: grid.cols(),
                    merge_right: masks.merge_right.to_rows(),
                    merge_down: masks.merge_down.to_rows(),
                },
            )
        }
        Command::Targets { tables, ignore } => targets(&tables, ignore, out),
        Command::Score { pairs, min_overlap } => score(&pairs, min_overlap, out),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .init();

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file =
            File::create(&args.outfile).with_context(|| format!("creating {}", args.outfile))?;
        Box::new(BufWriter::new(file))
    };
    run(args, &mut *output)?;
    output.flush()?;
    Ok(())
}
