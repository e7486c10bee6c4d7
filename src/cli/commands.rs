//! Command handlers: the capture run and the maintenance subcommands.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::args::{Args, Command, ConfigAction, DriveAction, PresetAction, Selection};
use super::enums::apply_toggle;
use super::error::CliError;
use super::menu;
use crate::capture::{
    self, CaptureSession, SessionEvent, SessionReport, SessionState, SessionTarget, StopReason,
    StopSignal,
};
use crate::config::{self, Config};
use crate::device::{self, AdbBridge, DeviceBridge};
use crate::drive::uploader::DEFAULT_STOP_TIMEOUT;
use crate::drive::{
    Authenticator, EntryQuery, FolderResolver, TokenAuthenticator, UploadItem,
    UploadObserver, Uploader,
};
use crate::numbering::{self, FramePattern};
use crate::settings::{
    channel_short, CapturePreset, CaptureSettings, ChannelRegistry, JsonDocument, PresetStore,
    SettingsError, SettingsPaths, UploadSettings, UploadStats,
};

/// How often the CLI checks for Ctrl+C while waiting on uploads.
const DRAIN_POLL: Duration = Duration::from_millis(200);

/// Loaded configuration plus where everything lives.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub config_path: PathBuf,
    pub paths: SettingsPaths,
}

impl Context {
    pub fn load(config_path: Option<&Path>) -> Result<Self, CliError> {
        let config = Config::load(config_path)?;
        let config_path = config_path
            .map(PathBuf::from)
            .unwrap_or_else(config::default_path);
        let paths = SettingsPaths::new(config.data_dir());
        Ok(Self {
            config,
            config_path,
            paths,
        })
    }

    fn registry(&self) -> ChannelRegistry {
        ChannelRegistry::load_or_default(&self.paths.channels())
    }

    fn capture_settings(&self) -> CaptureSettings {
        CaptureSettings::load_or_default(&self.paths.capture())
    }

    fn upload_settings(&self) -> UploadSettings {
        UploadSettings::load_or_default(&self.paths.upload())
    }

    fn bridge(&self) -> AdbBridge {
        AdbBridge::new(self.config.device.adb.clone())
    }

    fn authenticator(&self) -> TokenAuthenticator {
        TokenAuthenticator::new(self.config.drive.token_env.clone()).with_base_urls(
            &self.config.drive.api_base_url,
            &self.config.drive.upload_base_url,
        )
    }

    /// `--out` when given, else the saved output directory.
    fn output_root(&self, out: Option<&Path>) -> PathBuf {
        out.map(PathBuf::from)
            .unwrap_or_else(|| self.capture_settings().output_dir)
    }
}

/// Dispatch parsed arguments.
pub fn run(args: Args) -> Result<(), CliError> {
    let ctx = Context::load(args.config.as_deref())?;
    let out = args.out.as_deref();

    match &args.command {
        None => run_capture(&args, &ctx),
        Some(Command::Devices) => list_devices(&ctx),
        Some(Command::Sort { selection }) => run_sort(selection, out, &ctx),
        Some(Command::Stats { channel, branch }) => {
            run_stats(channel.as_deref(), branch.as_deref(), out, &ctx)
        }
        Some(Command::Upload { selection }) => run_upload(selection, out, &ctx),
        Some(Command::Preset { action }) => handle_preset_action(action.clone(), &ctx),
        Some(Command::Drive { action }) => handle_drive_action(action.clone(), &ctx),
        Some(Command::Config { action }) => handle_config_action(action.clone(), &ctx),
    }
}

/// Overlay command-line options on the saved capture settings.
pub fn apply_overrides(settings: &mut CaptureSettings, args: &Args) {
    if let Some(shots) = args.shots {
        settings.shots = shots;
    }
    if let Some(delay) = args.delay {
        settings.delay = delay;
    }
    if let Some(swipe_ms) = args.swipe_ms {
        settings.swipe_ms = swipe_ms;
    }
    if let Some(top) = args.padding_top {
        settings.padding_top = top;
    }
    if let Some(bottom) = args.padding_bottom {
        settings.padding_bottom = bottom;
    }
    if let Some(overswipe) = args.overswipe {
        settings.overswipe = overswipe;
    }
    if args.tune {
        settings.tune = true;
    }
    if let Some(continue_numbering) = args.numbering_override() {
        settings.continue_numbering = continue_numbering;
    }
    if let Some(out) = &args.out {
        settings.output_dir = out.clone();
    }
    if args.no_auto_sort {
        settings.auto_sort = false;
    }
}

/// Resolve the (channel key, branch code) to work on, asking on stdin for
/// whatever was not given.
fn select_target(
    registry: &ChannelRegistry,
    channel: Option<&str>,
    branch: Option<&str>,
) -> Result<(String, String), CliError> {
    match (channel, branch) {
        (Some(channel), Some(branch)) => {
            registry.validate(channel, branch)?;
            Ok((channel.to_string(), branch.to_string()))
        }
        (None, Some(_)) => Err(CliError::Usage("--branch requires --channel".to_string())),
        (channel, None) => {
            if let Some(key) = channel {
                if registry.get(key).is_none() {
                    return Err(SettingsError::UnknownChannel(key.to_string()).into());
                }
            }
            let stdin = io::stdin();
            menu::select_channel_branch(&mut stdin.lock(), &mut io::stdout(), registry, channel)?
                .ok_or(CliError::NoSelection)
        }
    }
}

/// Prints upload progress as the worker reports it.
struct ConsoleObserver;

impl UploadObserver for ConsoleObserver {
    fn on_progress(&self, success: bool, item: &UploadItem) {
        if success {
            println!("  Uploaded {}", item.target_name());
        } else {
            eprintln!("  Upload failed: {}", item.target_name());
        }
    }

    fn on_complete(&self, stats: &UploadStats) {
        log::info!(
            "Upload worker idle: {} this session, {} total, {} failed",
            stats.current_session,
            stats.total_uploaded,
            stats.total_failed
        );
    }
}

fn build_uploader(ctx: &Context, settings: &UploadSettings) -> Uploader {
    let auth = ctx.authenticator();
    if !auth.has_token() {
        eprintln!(
            "Warning: {} is not set, uploads will fail",
            auth.token_env()
        );
    }
    Uploader::new(
        Arc::new(auth),
        settings.layout.clone(),
        settings.upload_stats.clone(),
        Arc::new(ConsoleObserver),
    )
}

/// Upload counters when a run started.
///
/// The worker restarts whenever the queue refills after going idle, and each
/// start resets `current_session`, so a run's totals come from these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RunBaseline {
    uploaded: u64,
    failed: u64,
}

impl RunBaseline {
    fn of(stats: &UploadStats) -> Self {
        Self {
            uploaded: stats.total_uploaded,
            failed: stats.total_failed,
        }
    }

    /// (uploaded, failed) since the baseline.
    fn since(&self, stats: &UploadStats) -> (u64, u64) {
        (
            stats.total_uploaded.saturating_sub(self.uploaded),
            stats.total_failed.saturating_sub(self.failed),
        )
    }
}

/// Block until the upload queue drains or `should_stop` returns true.
fn drain_uploads(uploader: &Uploader, baseline: RunBaseline, should_stop: impl Fn() -> bool) {
    if uploader.is_running() || uploader.queue_len() > 0 {
        println!(
            "Waiting for {} queued uploads (Ctrl+C to stop)...",
            uploader.queue_len()
        );
    }
    while !uploader.wait_idle(DRAIN_POLL) {
        if should_stop() {
            if !uploader.stop_worker(DEFAULT_STOP_TIMEOUT) {
                eprintln!("Upload worker did not stop in time");
            }
            let left = uploader.queue_len();
            if left > 0 {
                println!("{} uploads not sent", left);
            }
            break;
        }
    }

    let stats = uploader.stats();
    let (uploaded, failed) = baseline.since(&stats);
    println!(
        "Uploads: {} this run ({} failed), {} total",
        uploaded, failed, stats.total_uploaded
    );
}

fn save_upload_stats(ctx: &Context, mut settings: UploadSettings, uploader: &Uploader) -> Result<(), CliError> {
    settings.upload_stats = uploader.stats();
    settings.save(&ctx.paths.upload())?;
    Ok(())
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Log(message) => println!("{}", message),
        SessionEvent::Frame { frame, taken } => {
            let name = frame
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!("[{}] {}", taken, name);
        }
        SessionEvent::Duplicate {
            number,
            stuck,
            limit,
        } => println!("Frame {:02} unchanged ({}/{})", number, stuck, limit),
        SessionEvent::Finished(_) => {}
    }
}

fn print_summary(report: &SessionReport) {
    println!();
    println!("Session {}", report.state);
    println!(
        "  Kept {} of {} captures in {}",
        report.taken,
        report.attempted,
        report.output_dir.display()
    );
    if let Some(last) = report.last_number {
        println!("  Frames {:02}..{:02}", report.first_number, last);
    }
}

/// The default command: pick a target and run a capture session.
pub fn run_capture(args: &Args, ctx: &Context) -> Result<(), CliError> {
    let mut registry = ctx.registry();

    if args.list_channels {
        menu::print_channels(&mut io::stdout(), &registry)?;
        return Ok(());
    }

    if args.manage {
        let stdin = io::stdin();
        if menu::management_menu(&mut stdin.lock(), &mut io::stdout(), &mut registry)? {
            registry.save(&ctx.paths.channels())?;
            println!("Saved {}", ctx.paths.channels().display());
        }
        return Ok(());
    }

    let mut settings = ctx.capture_settings();
    if let Some(name) = &args.preset {
        PresetStore::new(ctx.paths.presets_dir())
            .load(name)?
            .apply_to(&mut settings);
        println!("Using preset '{}'", name);
    }
    apply_overrides(&mut settings, args);
    if args.remember {
        settings.save(&ctx.paths.capture())?;
        println!("Saved capture settings as defaults");
    }

    let (channel, branch) =
        select_target(&registry, args.channel.as_deref(), args.branch.as_deref())?;
    let target = SessionTarget::from_registry(&registry, &settings.output_dir, &channel, &branch)?;
    println!("Channel: {} / {}", target.channel_name, target.branch_name);

    let bridge = ctx.bridge();
    let requested = args.serial.as_deref().or(ctx.config.device.serial.as_deref());
    let serial = device::select_device(&bridge, requested)?;
    println!("Device: {}", serial);

    let upload_settings = ctx.upload_settings();
    let baseline = RunBaseline::of(&upload_settings.upload_stats);
    let uploader = if args.upload || upload_settings.auto_upload {
        Some(Arc::new(build_uploader(ctx, &upload_settings)))
    } else {
        None
    };

    let capture_stop = StopSignal::new();
    let upload_stop = StopSignal::new();
    capture::install_interrupt_handler(capture_stop.clone(), upload_stop.clone())?;

    let mut session = CaptureSession::prepare(Arc::new(bridge), &serial, target, &settings)?;
    if let Some(sorted) = session.sorted() {
        if sorted.renamed > 0 {
            println!("Renumbered {} of {} existing frames", sorted.renamed, sorted.total);
        }
    }
    if let Some(uploader) = &uploader {
        session = session.with_uploads(Arc::clone(uploader));
    }

    if !args.no_interactive_stop {
        println!(">> Press ENTER to stop early");
        capture::spawn_enter_listener(capture_stop.clone());
    }

    let (tx, rx) = mpsc::channel();
    let stop = capture_stop.clone();
    let worker = thread::Builder::new()
        .name("capture".to_string())
        .spawn(move || session.run(&stop, &tx))?;
    for event in rx {
        print_event(&event);
    }
    let report = worker
        .join()
        .map_err(|_| CliError::SessionFailed("capture thread panicked".to_string()))?;
    print_summary(&report);

    if let Some(uploader) = uploader {
        // After a stop request, the next Ctrl+C lands on `upload_stop`.
        let interrupted = capture_stop.is_triggered();
        drain_uploads(&uploader, baseline, || {
            upload_stop.is_triggered() || (!interrupted && capture_stop.is_triggered())
        });
        save_upload_stats(ctx, upload_settings, &uploader)?;
    }

    match report.state {
        SessionState::Stopped(StopReason::Errored(message)) => Err(CliError::SessionFailed(message)),
        _ => Ok(()),
    }
}

/// List devices attached to adb.
pub fn list_devices(ctx: &Context) -> Result<(), CliError> {
    let devices = ctx.bridge().list_devices()?;
    if devices.is_empty() {
        println!("No devices found.");
        println!();
        println!("Make sure USB debugging is enabled and the device is authorized.");
        println!("Run 'adb devices' to check.");
    } else {
        println!("Available devices:");
        for serial in devices {
            println!("  {}", serial);
        }
        println!();
        println!("Use --serial <serial> to select a device.");
    }
    Ok(())
}

/// Renumber a branch folder into 1..N.
pub fn run_sort(selection: &Selection, out: Option<&Path>, ctx: &Context) -> Result<(), CliError> {
    let registry = ctx.registry();
    let (channel, branch) =
        select_target(&registry, selection.channel.as_deref(), selection.branch.as_deref())?;
    let target = SessionTarget::from_registry(&registry, &ctx.output_root(out), &channel, &branch)?;

    let outcome =
        numbering::renumber_contiguous(&target.output_dir, &target.branch_code, &target.channel_short)?;
    if outcome.total == 0 {
        println!("No frames in {}", target.output_dir.display());
    } else if outcome.renamed == 0 {
        println!("{} frames already numbered 1..{}", outcome.total, outcome.total);
    } else {
        println!(
            "Renumbered {} of {} frames in {}",
            outcome.renamed,
            outcome.total,
            target.output_dir.display()
        );
    }
    Ok(())
}

/// Frame counts, sizes and numbering holes per branch folder.
pub fn run_stats(
    channel: Option<&str>,
    branch: Option<&str>,
    out: Option<&Path>,
    ctx: &Context,
) -> Result<(), CliError> {
    let registry = ctx.registry();
    if let Some(key) = channel {
        if registry.get(key).is_none() {
            return Err(SettingsError::UnknownChannel(key.to_string()).into());
        }
    }
    let out_root = ctx.output_root(out);

    println!("Frames under {}:", out_root.display());
    let mut grand_total = 0usize;
    for (key, entry) in registry.iter() {
        if channel.is_some_and(|c| c != key.as_str()) {
            continue;
        }
        for (code, name) in &entry.branches {
            if branch.is_some_and(|b| b != code.as_str()) {
                continue;
            }
            let dir = out_root.join(&entry.name).join(name);
            let stats = numbering::folder_stats(&dir, code, channel_short(&entry.name))?;
            grand_total += stats.file_count;
            println!(
                "  {:<12} {:<5} {:>5} files {:>9.2} MB {:>4} missing",
                entry.name,
                code,
                stats.file_count,
                stats.total_size_mb(),
                stats.missing_count
            );
        }
    }
    println!("Total: {} files", grand_total);
    Ok(())
}

/// Upload every frame of a branch folder and wait for the queue to drain.
pub fn run_upload(selection: &Selection, out: Option<&Path>, ctx: &Context) -> Result<(), CliError> {
    let registry = ctx.registry();
    let (channel, branch) =
        select_target(&registry, selection.channel.as_deref(), selection.branch.as_deref())?;
    let target = SessionTarget::from_registry(&registry, &ctx.output_root(out), &channel, &branch)?;

    let upload_settings = ctx.upload_settings();
    let uploader = build_uploader(ctx, &upload_settings);
    let baseline = RunBaseline::of(&upload_settings.upload_stats);
    let pattern = FramePattern::new(&target.branch_code, &target.channel_short);
    let queued = uploader.enqueue_folder(&target.output_dir, &pattern, &target.channel_name)?;
    if queued == 0 {
        println!("No frames to upload in {}", target.output_dir.display());
        return Ok(());
    }
    println!("Uploading {} files from {}", queued, target.output_dir.display());

    let stop = StopSignal::new();
    capture::install_interrupt_handler(stop.clone(), stop.clone())?;
    uploader.start_worker();
    drain_uploads(&uploader, baseline, || stop.is_triggered());
    save_upload_stats(ctx, upload_settings, &uploader)
}

/// Handle preset subcommand actions.
pub fn handle_preset_action(action: PresetAction, ctx: &Context) -> Result<(), CliError> {
    let store = PresetStore::new(ctx.paths.presets_dir());
    match action {
        PresetAction::Save { name } => {
            let preset = CapturePreset::from(&ctx.capture_settings());
            let path = store.save(&name, &preset)?;
            println!("Saved preset '{}' to {}", name, path.display());
        }
        PresetAction::List => {
            let names = store.list()?;
            if names.is_empty() {
                println!("No presets saved.");
                println!("Use 'scrollshot preset save <name>' to save the current settings.");
            } else {
                println!("Presets:");
                for name in names {
                    println!("  {}", name);
                }
            }
        }
        PresetAction::Show { name } => {
            let preset = store.load(&name)?;
            println!("Preset '{}':", name);
            println!("  Shots: {}", preset.shots);
            println!("  Delay: {}s", preset.delay);
            println!("  Swipe: {}ms", preset.swipe_ms);
            println!("  Padding: top {} / bottom {}", preset.padding_top, preset.padding_bottom);
            println!("  Overswipe: {}", preset.overswipe);
            println!("  Tune: {}", yes_no(preset.tune));
            println!("  Continue numbering: {}", yes_no(preset.continue_numbering));
        }
    }
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn print_drive_status(settings: &UploadSettings, auth: &TokenAuthenticator) {
    let layout = &settings.layout;
    println!("Google Drive:");
    println!(
        "  Token:           {} ({})",
        if auth.has_token() { "set" } else { "missing" },
        auth.token_env()
    );
    println!("  Auto upload:     {}", on_off(settings.auto_upload));
    println!(
        "  Root folder:     {} (by {})",
        layout.root_folder_name,
        if layout.use_root_folder_id { "id" } else { "name" }
    );
    println!("  Date folders:    {}", on_off(layout.create_date_folders));
    println!("  Channel folders: {}", on_off(layout.create_channel_folders));
    println!("  Branch folders:  {}", on_off(layout.create_branch_folders));
    println!(
        "  Custom mapping:  {} ({} branches mapped)",
        on_off(layout.use_custom_mapping),
        layout.custom_folder_mapping.len()
    );
    for (code, folder_id) in &layout.custom_folder_mapping {
        println!("    {:<5} -> {}", code, folder_id);
    }

    let stats = &settings.upload_stats;
    println!("Statistics:");
    println!("  Uploaded:    {}", stats.total_uploaded);
    println!("  Failed:      {}", stats.total_failed);
    match &stats.last_upload_time {
        Some(at) => println!("  Last upload: {}", at.format("%Y-%m-%d %H:%M:%S")),
        None => println!("  Last upload: never"),
    }
}

/// Unique branch code -> branch name over all channels. The first channel
/// (by key) to define a code wins.
fn branch_folder_names(registry: &ChannelRegistry) -> BTreeMap<String, String> {
    let mut names = BTreeMap::new();
    for (_, channel) in registry.iter() {
        for (code, name) in &channel.branches {
            names.entry(code.clone()).or_insert_with(|| name.clone());
        }
    }
    names
}

/// Handle drive subcommand actions.
pub fn handle_drive_action(action: DriveAction, ctx: &Context) -> Result<(), CliError> {
    let path = ctx.paths.upload();
    let mut settings = ctx.upload_settings();

    match action {
        DriveAction::Status => print_drive_status(&settings, &ctx.authenticator()),
        DriveAction::ResetStats => {
            settings.upload_stats.reset();
            settings.save(&path)?;
            println!("Upload statistics reset.");
        }
        DriveAction::Set {
            auto_upload,
            root,
            root_is_id,
            date_folders,
            channel_folders,
            branch_folders,
            custom_mapping,
        } => {
            let mut changed = apply_toggle(&mut settings.auto_upload, auto_upload);
            let layout = &mut settings.layout;
            if let Some(root) = root {
                if layout.root_folder_name != root {
                    layout.root_folder_name = root;
                    changed = true;
                }
            }
            changed |= apply_toggle(&mut layout.use_root_folder_id, root_is_id);
            changed |= apply_toggle(&mut layout.create_date_folders, date_folders);
            changed |= apply_toggle(&mut layout.create_channel_folders, channel_folders);
            changed |= apply_toggle(&mut layout.create_branch_folders, branch_folders);
            changed |= apply_toggle(&mut layout.use_custom_mapping, custom_mapping);

            if changed {
                settings.save(&path)?;
                println!("Upload settings updated.");
            } else {
                println!("Nothing changed.");
            }
            print_drive_status(&settings, &ctx.authenticator());
        }
        DriveAction::Map { branch, folder_id } => {
            println!("Mapped {} -> {}", branch, folder_id);
            settings.layout.custom_folder_mapping.insert(branch, folder_id);
            settings.save(&path)?;
            if !settings.layout.use_custom_mapping {
                println!("Custom mapping is off. Enable it with 'scrollshot drive set --custom-mapping on'.");
            }
        }
        DriveAction::Unmap { branch } => {
            if settings.layout.custom_folder_mapping.remove(&branch).is_none() {
                return Err(CliError::Usage(format!("Branch '{}' has no mapping", branch)));
            }
            settings.save(&path)?;
            println!("Removed mapping for {}", branch);
        }
        DriveAction::QuickSetup { parent } => {
            let names = branch_folder_names(&ctx.registry());
            let rt = tokio::runtime::Runtime::new()?;
            let backend = rt.block_on(ctx.authenticator().authenticate())?;

            let mut resolver = FolderResolver::new(settings.layout.clone());
            let mapping = rt.block_on(resolver.map_branch_folders(
                backend.as_ref(),
                &names,
                parent.as_deref(),
            ))?;
            settings.layout = resolver.layout().clone();
            settings.save(&path)?;

            println!("Mapped {} of {} branches:", mapping.len(), names.len());
            for (code, folder_id) in &mapping {
                println!("  {:<5} {} -> {}", code, names[code], folder_id);
            }
            if !settings.layout.use_custom_mapping {
                println!("Custom mapping is off. Enable it with 'scrollshot drive set --custom-mapping on'.");
            }
        }
        DriveAction::Check => {
            let mapping = &settings.layout.custom_folder_mapping;
            if mapping.is_empty() {
                println!("No folders mapped.");
                return Ok(());
            }
            let rt = tokio::runtime::Runtime::new()?;
            let backend = rt.block_on(ctx.authenticator().authenticate())?;
            let mut missing = 0;
            for (code, folder_id) in mapping {
                match rt.block_on(backend.folder_exists(folder_id)) {
                    Ok(true) => println!("  ok       {:<5} {}", code, folder_id),
                    Ok(false) => {
                        missing += 1;
                        println!("  missing  {:<5} {}", code, folder_id);
                    }
                    Err(e) => {
                        missing += 1;
                        println!("  error    {:<5} {}: {}", code, folder_id, e);
                    }
                }
            }
            if missing > 0 {
                return Err(CliError::Usage(format!("{} mapped folders are unusable", missing)));
            }
        }
        DriveAction::Folders { parent } => {
            let rt = tokio::runtime::Runtime::new()?;
            let backend = rt.block_on(ctx.authenticator().authenticate())?;
            let parent = match parent {
                Some(id) => id,
                None => {
                    let mut resolver = FolderResolver::new(settings.layout.clone());
                    rt.block_on(resolver.resolve_root(backend.as_ref()))?
                }
            };
            let folders = rt.block_on(backend.list_entries(&EntryQuery::folders_in(Some(&parent))))?;
            if folders.is_empty() {
                println!("No folders under {}", parent);
            } else {
                println!("Folders under {}:", parent);
                for folder in folders {
                    println!("  {}  {}", folder.id, folder.name);
                }
            }
        }
    }
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, ctx: &Context) -> Result<(), CliError> {
    match action {
        ConfigAction::Show => {
            let config = &ctx.config;
            println!("Current configuration:");
            println!("  Data dir: {}", config.data_dir().display());
            println!("  adb: {}", config.device.adb);
            println!(
                "  Device serial: {}",
                config.device.serial.as_deref().unwrap_or("(auto)")
            );
            println!("  Drive API: {}", config.drive.api_base_url);
            println!("  Drive upload: {}", config.drive.upload_base_url);
            println!("  Token variable: {}", config.drive.token_env);
            println!();

            if ctx.config_path.exists() {
                println!("Config file: {} (exists)", ctx.config_path.display());
            } else {
                println!("Config file: {} (not found)", ctx.config_path.display());
            }
        }
        ConfigAction::Init => {
            if ctx.config_path.exists() {
                return Err(CliError::Usage(format!(
                    "Config file already exists: {}\nUse 'scrollshot config show' to view current settings.",
                    ctx.config_path.display()
                )));
            }
            Config::default().write(&ctx.config_path)?;
            println!("Created config file: {}", ctx.config_path.display());
        }
    }
    Ok(())
}
