//! `lumcat generate`: export in, migration script out.
//!
//! Reading the export and writing the script are the only fatal steps.
//! Unusable records are logged and counted, never fatal.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use lumcat_core::AppConfig;
use lumcat_migrate::{MigrateOptions, ScriptHeader};
use lumcat_normalize::Synonyms;

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Legacy export JSON file
    #[arg(long, short)]
    pub input: PathBuf,

    /// Where to write the script; stdout when omitted
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// YAML alias file extending the built-in synonym tables
    #[arg(long)]
    pub aliases: Option<PathBuf>,

    /// Abort when two different catalog names share a slug
    #[arg(long)]
    pub strict_slugs: bool,

    /// Print the run summary without writing a script
    #[arg(long)]
    pub dry_run: bool,
}

/// Builds the synonym tables, layering the alias file over the built-ins
/// when one is given.
pub(crate) fn load_synonyms(aliases: Option<&Path>) -> anyhow::Result<Synonyms> {
    let synonyms = Synonyms::builtin();
    let Some(path) = aliases else {
        return Ok(synonyms);
    };

    let file = lumcat_core::load_aliases(path)
        .with_context(|| format!("failed to load alias file {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        light_tones = file.light_tones.len(),
        finishes = file.finishes.len(),
        categories = file.categories.len(),
        "alias file loaded"
    );
    Ok(synonyms.with_aliases(&file))
}

/// File name shown in the script header.
pub(crate) fn input_label(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Writes `contents` next to `path` first and renames it into place, so a
/// failed write never leaves a truncated script behind.
pub(crate) fn write_script(path: &Path, contents: &str) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write script for {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("failed to write script to {}", path.display()))?;
    Ok(())
}

/// Run both migration stages over `args.input` and emit the script.
///
/// # Errors
///
/// Returns an error if the export or alias file cannot be read, if strict
/// slug checking finds a conflict, or if the script cannot be written.
pub(crate) fn run_generate(config: &AppConfig, args: &GenerateArgs) -> anyhow::Result<()> {
    let loaded = lumcat_core::load_export(&args.input)
        .with_context(|| format!("failed to load export {}", args.input.display()))?;
    for skipped in &loaded.skipped {
        tracing::warn!(
            index = skipped.index,
            reason = %skipped.reason,
            "export record skipped"
        );
    }

    let synonyms = load_synonyms(args.aliases.as_deref().or(config.aliases_path.as_deref()))?;
    let mut options = MigrateOptions::from_app_config(config);
    options.strict_slugs |= args.strict_slugs;

    let mut script = lumcat_migrate::migrate(&loaded.records, &synonyms, &options)?;
    script.stats.skipped_records += loaded.skipped.len();

    if args.dry_run {
        println!("dry-run: {} statements would be written", script.statement_count());
        print!("{}", script.stats);
        return Ok(());
    }

    let header = ScriptHeader::new(input_label(&args.input), loaded.source_sha256.as_str());
    let rendered = script.render(&header);

    if let Some(path) = &args.output {
        write_script(path, &rendered)?;
        tracing::info!(
            path = %path.display(),
            statements = script.statement_count(),
            skipped_records = script.stats.skipped_records,
            "script written"
        );
    } else {
        std::io::stdout()
            .lock()
            .write_all(rendered.as_bytes())
            .context("failed to write script to stdout")?;
    }

    Ok(())
}
