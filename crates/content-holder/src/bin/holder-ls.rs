//! Lists one container the way the browser shows it.
//!
//! Usage:
//!   holder-ls [--sort name|date|size|ext] [--reverse] [--no-folders-first]
//!             [--all] [--json] [--settings FILE] TARGET
//!
//! TARGET is `root`, `recent`, `bookmarks`, a media category (`audio`, `video`,
//! `image`, `document`, `archive`), or a path. Zip files open as archives. Use
//! `./recent` to list a folder that shadows a collection name.
//!
//! Environment variables:
//!   RUST_LOG - Log filter (default: info)

use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use content_holder::asynchronous::list_sorted_content_async;
use content_holder::settings::default_settings_path;
use content_holder::{
    Holder, HolderContext, HolderSettings, ListingPreferences, RootHolder, SortMethod, VirtualHolder, VirtualKind,
    load_settings, open_path,
};

const USAGE: &str = "usage: holder-ls [--sort name|date|size|ext] [--reverse] [--no-folders-first] [--all] [--json] [--settings FILE] TARGET";

#[derive(Debug, Default, PartialEq)]
struct Options {
    sort: Option<SortMethod>,
    reverse: bool,
    no_folders_first: bool,
    all: bool,
    json: bool,
    settings_path: Option<PathBuf>,
    target: String,
}

impl Options {
    /// Command line flags win over the stored listing preferences.
    fn apply(&self, mut prefs: ListingPreferences) -> ListingPreferences {
        if let Some(method) = self.sort {
            prefs.method = method;
        }
        if self.reverse {
            prefs.reverse = true;
        }
        if self.no_folders_first {
            prefs.folders_first = false;
        }
        if self.all {
            prefs.show_hidden = true;
        }
        prefs
    }
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options, String> {
    let mut options = Options::default();
    let mut target = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sort" => {
                let value = args.next().ok_or("--sort needs a value")?;
                options.sort = Some(SortMethod::parse(&value).ok_or_else(|| format!("unknown sort method: {}", value))?);
            }
            "--settings" => {
                let value = args.next().ok_or("--settings needs a file")?;
                options.settings_path = Some(PathBuf::from(value));
            }
            "--reverse" => options.reverse = true,
            "--no-folders-first" => options.no_folders_first = true,
            "--all" | "-a" => options.all = true,
            "--json" => options.json = true,
            flag if flag.starts_with("--") => return Err(format!("unknown flag: {}", flag)),
            other => {
                if target.replace(other.to_string()).is_some() {
                    return Err("only one target allowed".to_string());
                }
            }
        }
    }

    options.target = target.ok_or("missing target")?;
    Ok(options)
}

fn resolve_target(ctx: &Arc<HolderContext>, target: &str) -> Holder {
    if target == "root" {
        return RootHolder::shared(Arc::clone(ctx));
    }
    match VirtualKind::from_label(target) {
        Some(kind) => VirtualHolder::shared(kind, Arc::clone(ctx)),
        None => open_path(ctx, Path::new(target)),
    }
}

fn print_listing(children: &[Holder], json: bool) -> io::Result<()> {
    let mut out = io::stdout().lock();
    for child in children {
        let entry = child.describe();
        if json {
            let line = serde_json::to_string(&entry).map_err(io::Error::other)?;
            writeln!(out, "{}", line)?;
        } else {
            let marker = if entry.is_folder { 'd' } else { '-' };
            writeln!(out, "{} {:<40} {}", marker, entry.display_name, child.details())?;
        }
    }
    out.flush()
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let options = match parse_args(env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            log::error!("holder-ls: {}", message);
            let _ = writeln!(io::stderr(), "{}", USAGE);
            return ExitCode::from(2);
        }
    };

    let settings = match options.settings_path.clone().or_else(default_settings_path) {
        Some(path) => load_settings(&path),
        None => HolderSettings::default(),
    };
    let prefs = options.apply(settings.listing);
    let ctx = HolderContext::with_walkdir_index(settings);

    let holder = resolve_target(&ctx, &options.target);
    if !holder.is_valid() {
        log::error!("holder-ls: {} doesn't exist or can't be read", options.target);
        return ExitCode::FAILURE;
    }

    let children = list_sorted_content_async(Arc::clone(&holder), prefs).await;
    let result = print_listing(&children, options.json);
    ctx.archives.close(Path::new(&options.target));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        // Closed pipe (e.g. piped into `head`)
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("holder-ls: can't write listing: {}", e);
            ExitCode::FAILURE
        }
    }
}
