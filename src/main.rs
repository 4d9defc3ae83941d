use anyhow::{bail, Context};
use clap::Parser;
use log::LevelFilter;
use snapsize::auth::UserInfo;
use snapsize::storage::{recent_uploads, LocalObjectStore};
use snapsize::{
    collect_image_paths, format_file_size, ArchiveBuilder, BatchInput, BatchProcessor, Cli,
    CloudSaver, Commands, Loader, ResizeOptions,
};
use std::path::{Path, PathBuf};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    match cli.command {
        Commands::Resize {
            inputs,
            output,
            options,
        } => process_resize(&inputs, &output, &options),
        Commands::Upload {
            inputs,
            store,
            user,
            options,
        } => process_upload(&inputs, &store, &user, &options),
        Commands::Recent {
            store,
            user,
            path,
            limit,
        } => process_recent(&store, &user, &path, limit),
        Commands::Info { input } => process_info(&input),
    }
}

fn load_inputs(paths: &[PathBuf], recursive: bool) -> anyhow::Result<Vec<BatchInput>> {
    let files = collect_image_paths(paths, recursive)?;
    if files.is_empty() {
        bail!("No image files found in the given inputs");
    }

    files
        .iter()
        .map(|path| {
            BatchInput::from_path(path).with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect()
}

fn process_resize(inputs: &[PathBuf], output: &Path, options: &ResizeOptions) -> anyhow::Result<()> {
    let batch = load_inputs(inputs, options.recursive)?;
    let processor = BatchProcessor::new(options.to_config(true)?)?;

    let entries = processor.process(&batch).context("Resize failed, no archive written")?;
    let archive = ArchiveBuilder::from_batch(entries);
    archive.save(output)?;

    println!(
        "Resized {} images into: {}",
        archive.len(),
        output.display()
    );
    Ok(())
}

fn process_upload(
    inputs: &[PathBuf],
    store: &Path,
    user: &str,
    options: &ResizeOptions,
) -> anyhow::Result<()> {
    let user = UserInfo {
        username: user.to_string(),
        email: None,
        user_id: None,
    };
    let store = LocalObjectStore::new(store, &user.username)?;
    let batch = load_inputs(inputs, options.recursive)?;
    let processor = BatchProcessor::new(options.to_config(true)?)?;

    let saver = CloudSaver::new(&store, processor).with_user_prefix(user.storage_prefix());
    let uploaded = saver.save_all(&batch).context("Upload failed")?;

    println!("Uploaded {} file(s) for {}:", uploaded.len(), user.display_name());
    for object in uploaded {
        println!("  {} -> {}", object.key, object.url);
    }
    Ok(())
}

fn process_recent(store: &Path, user: &str, path: &str, limit: usize) -> anyhow::Result<()> {
    let store = LocalObjectStore::new(store, user)?;
    let recent = recent_uploads(&store, path, limit);

    if recent.is_empty() {
        println!("No uploads yet for {}", user);
        return Ok(());
    }

    for object in recent {
        println!("{}\n  {}", object.key, object.url);
    }
    Ok(())
}

fn process_info(input: &Path) -> anyhow::Result<()> {
    if !input.exists() {
        bail!("File does not exist: {}", input.display());
    }

    let file_size = std::fs::metadata(input)?.len();
    let (width, height, format) = Loader::new().probe(input)?;
    let aspect_ratio = width as f32 / height.max(1) as f32;

    println!("=== Image Information ===");
    println!("File: {}", input.display());
    println!("Size: {}", format_file_size(file_size));
    println!("Dimensions: {} x {} pixels", width, height);
    println!("Aspect Ratio: {:.2}:1", aspect_ratio);
    println!("Format: {}", format);

    Ok(())
}
