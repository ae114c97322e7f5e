use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use milo_scene::{
    catalog, Directory, DirectoryObject, Entry, EntryPayload, Record, Registry, SceneCodec,
    SceneConfig,
};
use serde::Serialize;
use walkdir::WalkDir;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let codec = build_codec(&cli)?;
    let format = cli.format;
    match cli.command {
        Command::Inspect(args) => cmd_inspect(&codec, args, format),
        Command::Roundtrip(args) => cmd_roundtrip(&codec, args, format),
        Command::Extract(args) => cmd_extract(&codec, args, format),
        Command::Types => cmd_types(codec.registry(), format),
    }
}

fn build_codec(cli: &Cli) -> anyhow::Result<SceneCodec> {
    let mut config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if let Some(endian) = cli.endian {
        config.initial_endian = endian;
    }
    Ok(SceneCodec::new(Registry::builtin(), config))
}

fn read_scene(codec: &SceneCodec, path: &Path) -> anyhow::Result<Directory> {
    codec
        .read_file(path)
        .with_context(|| format!("decoding {}", path.display()))
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

struct InspectOptions {
    fields: bool,
    dtb: bool,
}

fn cmd_inspect(codec: &SceneCodec, args: InspectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let dir = read_scene(codec, &args.file)?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&dir)?);
        return Ok(());
    }

    println!("{}", args.file.display().to_string().bold());
    let opts = InspectOptions {
        fields: args.fields,
        dtb: args.dtb,
    };
    print_directory(&dir, 1, &opts);

    let summary = dir.summary();
    println!();
    println!(
        "{} {} directories, {} typed, {} raw ({} bytes), max depth {}",
        "summary:".bold(),
        summary.directories,
        summary.typed_entries + summary.directory_entries,
        summary.raw_entries.to_string().yellow(),
        summary.raw_bytes,
        summary.max_depth,
    );
    Ok(())
}

fn print_directory(dir: &Directory, depth: usize, opts: &InspectOptions) {
    let pad = "  ".repeat(depth);
    println!(
        "{pad}{} {} v{} {:?}, string table {} labels / {} bytes",
        dir.type_name.as_str().cyan(),
        format!("\"{}\"", dir.name).bold(),
        dir.version,
        dir.endian,
        dir.string_table_count,
        dir.string_table_size,
    );
    if !dir.external_resources.is_empty() {
        println!("{pad}  external resources:");
        for resource in &dir.external_resources {
            println!("{pad}    {resource}");
        }
    }

    match &dir.object {
        DirectoryObject::Typed(record) => {
            let lineage: Vec<&str> = record.lineage().into_iter().map(|s| s.as_str()).collect();
            println!("{pad}  object {} ({})", record.revision, lineage.join(" > ").dimmed());
            print_record_details(record, &format!("{pad}    "), opts);
        }
        DirectoryObject::Opaque { raw, .. } => {
            println!("{pad}  object {}", format!("opaque, {} bytes", raw.len()).yellow());
        }
    }

    println!("{pad}  entries ({}):", dir.entries.len());
    for entry in &dir.entries {
        print_entry(entry, depth + 2, opts);
    }
}

fn print_entry(entry: &Entry, depth: usize, opts: &InspectOptions) {
    let pad = "  ".repeat(depth);
    let label = format!("{pad}{:<16} {}", entry.type_name().as_str(), entry.name());
    match entry.payload() {
        Some(EntryPayload::Typed(record)) => {
            println!("{label}  {}", record.revision.to_string().green());
            print_record_details(record, &format!("{pad}  "), opts);
        }
        Some(EntryPayload::Directory { record, dir }) => {
            println!("{label}  {} {}", record.revision.to_string().green(), "directory".cyan());
            print_record_details(record, &format!("{pad}  "), opts);
            print_directory(dir, depth + 1, opts);
        }
        Some(EntryPayload::Raw(bytes)) => {
            println!("{label}  {}", format!("raw, {} bytes", bytes.len()).yellow());
        }
        None => println!("{label}  {}", "unresolved".red()),
    }
}

fn print_record_details(record: &Record, pad: &str, opts: &InspectOptions) {
    if opts.dtb {
        if let Some(tree) = record.metadata().and_then(|m| m.tree.as_ref()) {
            println!("{pad}{} {tree}", "script:".dimmed());
        }
    }
    if opts.fields {
        let mut current = Some(record);
        while let Some(r) = current {
            for (name, value) in &r.fields {
                println!("{pad}{}.{name} = {value}", r.type_name.as_str().dimmed());
            }
            current = r.base_record();
        }
    }
}

// ---------------------------------------------------------------------------
// roundtrip
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct RoundtripReport {
    path: PathBuf,
    original_len: usize,
    encoded_len: usize,
    /// First differing offset, `None` when identical.
    mismatch_at: Option<usize>,
    error: Option<String>,
}

impl RoundtripReport {
    fn passed(&self) -> bool {
        self.error.is_none() && self.mismatch_at.is_none()
    }
}

fn collect_files(paths: &[PathBuf], extensions: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for item in WalkDir::new(path).sort_by_file_name().into_iter().flatten() {
                let matches = item
                    .path()
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| extensions.iter().any(|want| want.eq_ignore_ascii_case(e)));
                if item.file_type().is_file() && matches {
                    files.push(item.into_path());
                }
            }
        } else {
            files.push(path.clone());
        }
    }
    files
}

fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    a.iter()
        .zip(b)
        .position(|(x, y)| x != y)
        .or_else(|| (a.len() != b.len()).then(|| a.len().min(b.len())))
}

fn roundtrip_file(codec: &SceneCodec, path: &Path) -> RoundtripReport {
    let mut report = RoundtripReport {
        path: path.to_path_buf(),
        original_len: 0,
        encoded_len: 0,
        mismatch_at: None,
        error: None,
    };
    let original = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            report.error = Some(e.to_string());
            return report;
        }
    };
    report.original_len = original.len();

    let encoded = codec.decode(original.clone()).and_then(|dir| codec.encode(&dir));
    match encoded {
        Ok(encoded) => {
            report.encoded_len = encoded.len();
            report.mismatch_at = first_difference(&original, &encoded);
            if let Some(offset) = report.mismatch_at {
                tracing::debug!(
                    path = %path.display(),
                    offset,
                    original = %hex::encode(window(&original, offset)),
                    encoded = %hex::encode(window(&encoded, offset)),
                    "round-trip mismatch"
                );
            }
        }
        Err(e) => report.error = Some(e.to_string()),
    }
    report
}

fn window(bytes: &[u8], offset: usize) -> &[u8] {
    let start = offset.min(bytes.len());
    &bytes[start..(start + 8).min(bytes.len())]
}

fn cmd_roundtrip(codec: &SceneCodec, args: RoundtripArgs, format: OutputFormat) -> anyhow::Result<()> {
    let files = collect_files(&args.paths, &args.extensions);
    if files.is_empty() {
        bail!("no scene files found");
    }

    let reports: Vec<RoundtripReport> = files.iter().map(|f| roundtrip_file(codec, f)).collect();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for r in &reports {
            let path = r.path.display();
            match (&r.error, r.mismatch_at) {
                (Some(e), _) => println!("{} {path}: {}", "✗".red().bold(), e.red()),
                (None, Some(offset)) => println!(
                    "{} {path}: differs at {:#x} ({} → {} bytes)",
                    "✗".red().bold(),
                    offset,
                    r.original_len,
                    r.encoded_len
                ),
                (None, None) => println!("{} {path} ({} bytes)", "✓".green().bold(), r.original_len),
            }
        }
    }

    let failed = reports.iter().filter(|r| !r.passed()).count();
    if failed > 0 {
        bail!("{failed} of {} files did not round-trip", reports.len());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// extract
// ---------------------------------------------------------------------------

fn file_component(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '\0') { '_' } else { c })
        .collect();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        format!("_{cleaned}")
    } else {
        cleaned
    }
}

fn collect_raw<'a>(dir: &'a Directory, out: &mut Vec<(&'a str, &'a str, &'a [u8])>) {
    if let DirectoryObject::Opaque { raw, .. } = &dir.object {
        out.push((dir.type_name.as_str(), dir.name.as_str(), raw.as_slice()));
    }
    for entry in &dir.entries {
        if let Some(bytes) = entry.raw_bytes() {
            out.push((entry.type_name().as_str(), entry.name().as_str(), bytes));
        }
        if let Some(nested) = entry.directory() {
            collect_raw(nested, out);
        }
    }
}

fn cmd_extract(codec: &SceneCodec, args: ExtractArgs, format: OutputFormat) -> anyhow::Result<()> {
    let dir = read_scene(codec, &args.file)?;
    let mut payloads = Vec::new();
    collect_raw(&dir, &mut payloads);

    let mut written = Vec::with_capacity(payloads.len());
    for (type_name, name, bytes) in payloads {
        let folder = args.out.join(file_component(type_name));
        std::fs::create_dir_all(&folder)
            .with_context(|| format!("creating {}", folder.display()))?;
        let path = folder.join(format!("{}.bin", file_component(name)));
        std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&written)?);
    } else {
        for path in &written {
            println!("  {} {}", "wrote".green(), path.display());
        }
        println!("{} {} raw payloads extracted", "✓".green().bold(), written.len());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct TypeInfo<'a> {
    name: &'a str,
    owns_directory: bool,
    revisions: Option<(u16, u16)>,
    base: Option<&'static str>,
}

fn type_infos(registry: &Registry) -> Vec<TypeInfo<'_>> {
    registry
        .labels()
        .filter_map(|label| registry.get(label.as_str()).map(|h| (label, h)))
        .map(|(label, handler)| {
            let schema = catalog::find(label.as_str());
            TypeInfo {
                name: label.as_str(),
                owns_directory: handler.owns_directory(),
                revisions: schema.map(|s| (s.revisions.min, s.revisions.max)),
                base: schema.and_then(|s| match s.base {
                    milo_scene::SchemaBase::Record(parent) => Some(parent.name),
                    milo_scene::SchemaBase::Object => Some("object header"),
                    milo_scene::SchemaBase::None => None,
                }),
            }
        })
        .collect()
}

fn cmd_types(registry: &Registry, format: OutputFormat) -> anyhow::Result<()> {
    let infos = type_infos(registry);
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }
    for info in &infos {
        let kind = if info.owns_directory { "directory".cyan() } else { "record".normal() };
        let revisions = info
            .revisions
            .map(|(lo, hi)| format!("r{lo}..=r{hi}"))
            .unwrap_or_default();
        let base = info.base.map(|b| format!("base: {b}")).unwrap_or_default();
        println!("  {:<14} {:<10} {:<10} {}", info.name.bold(), kind, revisions, base.dimmed());
    }
    println!("{} types registered; anything else is kept raw", infos.len());
    Ok(())
}
