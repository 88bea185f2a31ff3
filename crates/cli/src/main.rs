use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use photo_renamer_core::{
    app_paths, apply_plan, generate_plan, init_file_logging, load_config, read_all_tags,
    target_filename, trash_duplicates, undo_last, AcceptRaw, PlanOptions, TagResolver, TagStore,
    BUILTIN_NAMES,
};
use std::path::PathBuf;

mod prompt;
use prompt::{ask_yes_no, ConsolePrompter};

#[derive(Debug, Parser)]
#[command(name = "photo-renamer-cli")]
#[command(about = "Renames JPEG photos after their EXIF capture date, camera and lens")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Rename(RenameArgs),
    Undo,
    Exif(ExifArgs),
    Tags(TagsArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct RenameArgs {
    input: PathBuf,
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    #[arg(long, default_value_t = false)]
    yes: bool,
    #[arg(long, default_value_t = false)]
    delete_duplicates: bool,
    #[arg(long, default_value_t = false)]
    accept_raw_names: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Args)]
struct ExifArgs {
    file: PathBuf,
}

#[derive(Debug, Args)]
struct TagsArgs {
    #[command(subcommand)]
    action: TagsAction,
}

#[derive(Debug, Subcommand)]
enum TagsAction {
    Show,
    Set { raw: String, normal: String },
    Unset { raw: String },
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rename(args) => cmd_rename(args),
        Commands::Undo => cmd_undo(),
        Commands::Exif(args) => cmd_exif(args),
        Commands::Tags(tags) => match tags.action {
            TagsAction::Show => cmd_tags_show(),
            TagsAction::Set { raw, normal } => cmd_tags_set(raw, normal),
            TagsAction::Unset { raw } => cmd_tags_unset(raw),
        },
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

fn cmd_rename(args: RenameArgs) -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    init_file_logging(&paths.log_dir, config.keep_log_files)?;
    info!("program started");
    info!("scanning {}", args.input.display());

    let mut store = TagStore::load(&paths.tags_path)?;
    let accept_raw = args.yes || args.dry_run || args.accept_raw_names || config.accept_raw_names;

    let mut prompter = ConsolePrompter;
    let mut accept = AcceptRaw;
    let resolver: &mut dyn TagResolver = if accept_raw { &mut accept } else { &mut prompter };

    let options = PlanOptions {
        input: args.input,
        extensions: config.extensions.clone(),
    };
    let plan = generate_plan(&options, &mut store, resolver)?;
    if !accept_raw {
        store.save()?;
    }

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        OutputFormat::Table => print_table(&plan),
    }

    if args.dry_run {
        eprintln!("dry run: no files were changed.");
        return Ok(());
    }

    if plan.candidates.is_empty() {
        eprintln!("nothing to rename.");
    } else if args.yes || ask_yes_no("Do you want to rename these photos?")? {
        let result = apply_plan(&plan)?;
        eprintln!(
            "renamed {} files ({} skipped because the target name already existed).",
            result.renamed, result.skipped_existing
        );
        if !result.permission_denied.is_empty() {
            eprintln!(
                "{} files were skipped because the OS denied permission:",
                result.permission_denied.len()
            );
            for path in &result.permission_denied {
                eprintln!("  {}", path.display());
            }
        }
    } else {
        eprintln!("no files were renamed.");
    }

    if !plan.duplicates.is_empty() {
        let delete = if args.delete_duplicates {
            true
        } else if args.yes {
            eprintln!(
                "{} duplicates were left in place (pass --delete-duplicates to send them to the trash).",
                plan.duplicates.len()
            );
            false
        } else {
            ask_yes_no(&format!(
                "Do you want to move {} duplicates to the trash?",
                plan.duplicates.len()
            ))?
        };
        if delete {
            let result = trash_duplicates(&plan.duplicates)?;
            eprintln!("moved {} duplicates to the trash.", result.trashed);
        }
    }

    Ok(())
}

fn cmd_undo() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    init_file_logging(&paths.log_dir, config.keep_log_files)?;
    let result = undo_last()?;
    println!("restored {} files.", result.restored);
    Ok(())
}

fn cmd_exif(args: ExifArgs) -> Result<()> {
    let tags = read_all_tags(&args.file)?;
    if tags.is_empty() {
        println!("no EXIF fields found.");
        return Ok(());
    }
    for (name, value) in tags {
        println!("{name} --- {value}");
    }
    Ok(())
}

fn cmd_tags_show() -> Result<()> {
    let paths = app_paths()?;
    let store = TagStore::load(&paths.tags_path)?;
    println!("tag store: {}", store.path().display());
    let mut any = false;
    for (raw, normal) in store.overrides() {
        println!("{raw} -> {normal}");
        any = true;
    }
    if !any {
        println!("(no saved names yet)");
    }
    println!("\nbuiltin names:");
    for (raw, normal) in BUILTIN_NAMES {
        println!("{raw} -> {normal}");
    }
    Ok(())
}

fn cmd_tags_set(raw: String, normal: String) -> Result<()> {
    let paths = app_paths()?;
    let mut store = TagStore::load(&paths.tags_path)?;
    store.set(&raw, &normal);
    store.save()?;
    println!("saved: {raw} -> {normal}");
    Ok(())
}

fn cmd_tags_unset(raw: String) -> Result<()> {
    let paths = app_paths()?;
    let mut store = TagStore::load(&paths.tags_path)?;
    if !store.unset(&raw) {
        anyhow::bail!("no saved name for {raw:?}");
    }
    store.save()?;
    println!("removed: {raw}");
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("configuration file: {}", paths.config_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn print_table(plan: &photo_renamer_core::RenamePlan) {
    if !plan.candidates.is_empty() {
        println!("files to rename:");
        for candidate in &plan.candidates {
            println!(
                "  {} -> {}",
                candidate.original_path.display(),
                target_filename(&candidate.new_base)
            );
        }
    }

    if !plan.duplicates.is_empty() {
        println!("duplicates to delete:");
        for duplicate in &plan.duplicates {
            println!(
                "  {} (copy of {})",
                duplicate.path.display(),
                duplicate.kept.display()
            );
        }
    }

    if !plan.skipped.is_empty() {
        println!("skipped:");
        for skipped in &plan.skipped {
            println!("  {} ({})", skipped.path.display(), skipped.reason);
        }
    }

    println!(
        "\ntotals: scanned={} photos={} non_photo_skip={} no_metadata_skip={} planned={} already_named={} duplicates={}",
        plan.stats.scanned_files,
        plan.stats.photo_files,
        plan.stats.skipped_non_photo,
        plan.stats.skipped_no_metadata,
        plan.stats.planned,
        plan.stats.already_named,
        plan.stats.duplicates
    );
}
