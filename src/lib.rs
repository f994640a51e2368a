//! Taxolabel: move object detection labels between flat class tables and
//! hierarchical taxonomies.
//!
//! A detection dataset usually indexes its classes through a flat `names:`
//! table. Taxolabel derives a second, hierarchy-aware index from a taxonomy
//! YAML and rewrites label files from one scheme to the other.
//!
//! # Modules
//!
//! - [`taxonomy`]: taxonomy model, linearization, weights and ancestor chains
//! - [`ir`]: source records, index tables and file readers/writers
//! - [`remap`]: category tables and name-keyed index mappings
//! - [`rewrite`]: label file generation and re-indexing
//! - [`error`]: error types for taxolabel operations

pub mod error;
pub mod ir;
pub mod remap;
pub mod rewrite;
pub mod taxonomy;

use std::path::{Path, PathBuf};

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use serde::Serialize;

pub use error::TaxolabelError;

use ir::io_names_yaml::{read_names_yaml, write_names_yaml};
use ir::{ClassIndex, IndexTable};
use remap::{OrderPolicy, UnmappedPolicy};
use taxonomy::{AncestorMap, DEFAULT_ROOT_KEY};

/// The taxolabel CLI application.
#[derive(Parser)]
#[command(name = "taxolabel")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Write the index table of a taxonomy as a `names:` YAML file.
    NamesFromTaxonomy(NamesFromTaxonomyArgs),
    /// Write the index table of a COCO file's categories as `names:` YAML.
    NamesFromCoco(NamesFromCocoArgs),
    /// Build label files from a COCO JSON file.
    Convert(ConvertArgs),
    /// Rewrite label files from one index table to another.
    Remap(RemapArgs),
    /// Compute weighted, colored hierarchy rows for a taxonomy.
    Hierarchy(HierarchyArgs),
    /// Print the ancestor chain of taxonomy nodes.
    Ancestors(AncestorsArgs),
}

#[derive(clap::Args)]
struct NamesFromTaxonomyArgs {
    /// Taxonomy YAML file.
    taxonomy: PathBuf,

    /// Output `names:` YAML file.
    #[arg(short, long)]
    output: PathBuf,

    /// Top-level key holding the taxonomy.
    #[arg(long, env = "TAXOLABEL_ROOT_KEY", default_value = DEFAULT_ROOT_KEY)]
    root_key: String,
}

#[derive(clap::Args)]
struct NamesFromCocoArgs {
    /// COCO JSON file.
    coco: PathBuf,

    /// Output `names:` YAML file.
    #[arg(short, long)]
    output: PathBuf,

    /// Order in which categories receive indices.
    #[arg(long, value_enum)]
    order: OrderArg,
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// COCO JSON file.
    coco: PathBuf,

    /// Dataset root; label files are written under `<root>/labels`.
    #[arg(short, long)]
    output: PathBuf,

    /// Order in which categories receive indices.
    #[arg(long, value_enum)]
    order: OrderArg,

    /// Also write the category index table to this `names:` YAML file.
    #[arg(long)]
    names_out: Option<PathBuf>,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

#[derive(clap::Args)]
#[command(group(ArgGroup::new("target").required(true).args(["to", "to_taxonomy"])))]
struct RemapArgs {
    /// Directory of label files to rewrite.
    labels: PathBuf,

    /// Output directory; the input layout is mirrored.
    #[arg(short, long)]
    output: PathBuf,

    /// `names:` YAML the labels are currently indexed by.
    #[arg(long)]
    from: PathBuf,

    /// `names:` YAML of the new scheme.
    #[arg(long)]
    to: Option<PathBuf>,

    /// Taxonomy YAML whose linearization is the new scheme.
    #[arg(long)]
    to_taxonomy: Option<PathBuf>,

    /// Top-level key holding the taxonomy.
    #[arg(long, env = "TAXOLABEL_ROOT_KEY", default_value = DEFAULT_ROOT_KEY)]
    root_key: String,

    /// What to do with labels whose class has no counterpart.
    #[arg(long, value_enum)]
    unmapped: UnmappedArg,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

#[derive(clap::Args)]
struct HierarchyArgs {
    /// Taxonomy YAML file.
    taxonomy: PathBuf,

    /// Output file for the full tree.
    #[arg(short, long)]
    output: PathBuf,

    /// Seed for reproducible colors.
    #[arg(long)]
    seed: Option<u64>,

    /// Row file format.
    #[arg(long, value_enum, default_value_t = HierarchyFormat::Csv)]
    output_format: HierarchyFormat,

    /// Also write one re-rooted subtree per internal node under this directory.
    #[arg(long)]
    split_dir: Option<PathBuf>,

    /// Top-level key holding the taxonomy.
    #[arg(long, env = "TAXOLABEL_ROOT_KEY", default_value = DEFAULT_ROOT_KEY)]
    root_key: String,
}

#[derive(clap::Args)]
struct AncestorsArgs {
    /// Taxonomy YAML file.
    taxonomy: PathBuf,

    /// Node names, or class indices when `--names` is given.
    #[arg(required = true)]
    nodes: Vec<String>,

    /// Resolve class indices of this `names:` YAML instead of names.
    #[arg(long)]
    names: Option<PathBuf>,

    /// Top-level key holding the taxonomy.
    #[arg(long, env = "TAXOLABEL_ROOT_KEY", default_value = DEFAULT_ROOT_KEY)]
    root_key: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrderArg {
    /// The order the source lists categories in.
    Declared,
    /// Ascending source category id.
    SortedById,
}

impl From<OrderArg> for OrderPolicy {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Declared => OrderPolicy::Declared,
            OrderArg::SortedById => OrderPolicy::SortedBySourceId,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum UnmappedArg {
    /// Remove the label line.
    Drop,
    /// Keep the line with its old index.
    Keep,
}

impl From<UnmappedArg> for UnmappedPolicy {
    fn from(arg: UnmappedArg) -> Self {
        match arg {
            UnmappedArg::Drop => UnmappedPolicy::Drop,
            UnmappedArg::Keep => UnmappedPolicy::Keep,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum HierarchyFormat {
    Csv,
    Json,
}

impl HierarchyFormat {
    fn extension(self) -> &'static str {
        match self {
            HierarchyFormat::Csv => "csv",
            HierarchyFormat::Json => "json",
        }
    }
}

/// Run the taxolabel CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), TaxolabelError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::NamesFromTaxonomy(args)) => run_names_from_taxonomy(args),
        Some(Commands::NamesFromCoco(args)) => run_names_from_coco(args),
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Remap(args)) => run_remap(args),
        Some(Commands::Hierarchy(args)) => run_hierarchy(args),
        Some(Commands::Ancestors(args)) => run_ancestors(args),
        None => {
            println!("taxolabel {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Remap detection labels between flat class tables and taxonomies.");
            println!();
            println!("Run 'taxolabel --help' for usage information.");
            Ok(())
        }
    }
}

fn run_names_from_taxonomy(args: NamesFromTaxonomyArgs) -> Result<(), TaxolabelError> {
    let taxonomy = taxonomy::load_taxonomy(&args.taxonomy, &args.root_key)?;
    let table = taxonomy::linearize(&taxonomy);
    write_names_yaml(&args.output, &table)?;

    println!("Wrote {} name(s) to {}", table.len(), args.output.display());
    warn_duplicates(&table);
    Ok(())
}

fn run_names_from_coco(args: NamesFromCocoArgs) -> Result<(), TaxolabelError> {
    let dataset = ir::io_coco_json::read_coco_json(&args.coco)?;
    let built = remap::build_category_table(&dataset.categories, args.order.into());
    write_names_yaml(&args.output, built.table())?;

    println!(
        "Wrote {} name(s) to {}",
        built.table().len(),
        args.output.display()
    );
    Ok(())
}

fn run_convert(args: ConvertArgs) -> Result<(), TaxolabelError> {
    let dataset = ir::io_coco_json::read_coco_json(&args.coco)?;
    let built = remap::build_category_table(&dataset.categories, args.order.into());

    if let Some(names_out) = &args.names_out {
        write_names_yaml(names_out, built.table())?;
    }

    let labels_dir = args.output.join("labels");
    let report = rewrite::write_fresh_labels(&dataset, &built, &labels_dir)?;
    emit_report(&report, args.report)
}

fn run_remap(args: RemapArgs) -> Result<(), TaxolabelError> {
    let old = read_names_yaml(&args.from)?;
    let new = match (&args.to, &args.to_taxonomy) {
        (Some(to), _) => read_names_yaml(to)?,
        (None, Some(taxonomy_path)) => {
            let taxonomy = taxonomy::load_taxonomy(taxonomy_path, &args.root_key)?;
            taxonomy::linearize(&taxonomy)
        }
        // clap's `target` group requires one of the two.
        (None, None) => unreachable!("remap requires --to or --to-taxonomy"),
    };

    let mapping = remap::build_mapping(&old, &new);
    let report =
        rewrite::reindex_label_dir(&args.labels, &args.output, &mapping, args.unmapped.into())?;

    if args.report == ReportFormat::Text {
        print!("{mapping}");
    }
    emit_report(&report, args.report)
}

fn run_hierarchy(args: HierarchyArgs) -> Result<(), TaxolabelError> {
    let taxonomy = taxonomy::load_taxonomy(&args.taxonomy, &args.root_key)?;
    let tree = taxonomy::propagate_with_seed(&taxonomy, args.seed);

    write_tree(&tree, &args.output, args.output_format)?;
    println!("Wrote {} row(s) to {}", tree.len(), args.output.display());

    if let Some(split_dir) = &args.split_dir {
        let file_name = format!("hierarchy.{}", args.output_format.extension());
        let internal = tree.internal_nodes();
        for name in &internal {
            let dir = tree
                .path_to(name)?
                .iter()
                .fold(split_dir.clone(), |dir, part| dir.join(part));
            write_tree(&tree.subtree(name)?, &dir.join(&file_name), args.output_format)?;
        }
        println!(
            "Wrote {} subtree file(s) under {}",
            internal.len(),
            split_dir.display()
        );
    }
    Ok(())
}

fn run_ancestors(args: AncestorsArgs) -> Result<(), TaxolabelError> {
    let taxonomy = taxonomy::load_taxonomy(&args.taxonomy, &args.root_key)?;
    let map = AncestorMap::build(&taxonomy);

    match &args.names {
        Some(names_path) => {
            let table = read_names_yaml(names_path)?;
            for raw in &args.nodes {
                let index = raw
                    .parse::<usize>()
                    .map(ClassIndex::new)
                    .map_err(|_| TaxolabelError::InvalidClassIndex(raw.clone()))?;
                let chain = map.chain_for_index(&table, index)?;
                println!("{index}: {}", chain.join(" > "));
            }
        }
        None => {
            for name in &args.nodes {
                println!("{name}: {}", map.full_chain(name)?.join(" > "));
            }
        }
    }
    Ok(())
}

fn write_tree(
    tree: &taxonomy::WeightedTree,
    path: &Path,
    format: HierarchyFormat,
) -> Result<(), TaxolabelError> {
    match format {
        HierarchyFormat::Csv => tree.write_csv(path),
        HierarchyFormat::Json => tree.write_json(path),
    }
}

fn emit_report<T>(report: &T, format: ReportFormat) -> Result<(), TaxolabelError>
where
    T: Serialize + std::fmt::Display,
{
    match format {
        ReportFormat::Json => {
            let json =
                serde_json::to_string_pretty(report).map_err(TaxolabelError::ReportSerialize)?;
            println!("{json}");
        }
        ReportFormat::Text => print!("{report}"),
    }
    Ok(())
}

fn warn_duplicates(table: &IndexTable) {
    let duplicates = table.duplicate_names();
    if !duplicates.is_empty() {
        log::warn!(
            "taxonomy repeats {} name(s) ({}); lookups by name use the last index",
            duplicates.len(),
            duplicates.join(", ")
        );
    }
}
