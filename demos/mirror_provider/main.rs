//! CLI demo that mirrors a real directory through a scripted `Provider`.
//!
//! Wires together a [`VirtualFileSystemService`] that always succeeds instantly
//! (there's no native mount/unmount machinery to wait on here) and a
//! [`FileSystemProviderHandler`] that serves every event straight off the host
//! filesystem rooted at `--root`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};

use clap::Parser;
use tracing::info;

use virtualfs_provider::dispatch::{
    AbortRequestedEvent, CloseFileRequestedEvent, GetMetadataRequestedEvent,
    OpenFileRequestedEvent, ReadDirectoryRequestedEvent, ReadFileRequestedEvent,
    UnmountRequestedEvent,
};
use virtualfs_provider::options::{MountOptions, OpenMode};
use virtualfs_provider::value::{MetadataValue, ReadDirectoryValue, ReadFileValue, RequestValue};
use virtualfs_provider::{
    Config, EntryMetadata, Error, ErrorKind, FileSystemProviderHandler, Provider, RequestId,
    RequestManager, VirtualFileSystemService,
};

#[derive(clap::Parser)]
#[command(about = "Mirrors a host directory through a scripted virtualfs Provider")]
struct Args {
    /// Directory to mirror as the scripted file system's contents.
    root: PathBuf,

    /// Identifier the mounted file system is registered under.
    #[clap(long, default_value = "mirror")]
    file_system_id: String,

    /// Log level filter (overrides `log_filter` from --config, if given).
    #[clap(long)]
    log_filter: Option<String>,

    /// Optional TOML config file; falls back to `Config::default()`.
    #[clap(long)]
    config: Option<PathBuf>,
}

/// Mounts/unmounts complete synchronously — there is no native I/O to wait on, only
/// the in-process `RequestManager` this demo already owns.
struct ImmediateService;

#[async_trait::async_trait]
impl VirtualFileSystemService for ImmediateService {
    async fn mount(
        &self,
        request_id: RequestId,
        _options: MountOptions,
        _manager: Arc<RequestManager>,
        provider: Weak<Provider>,
    ) {
        if let Some(provider) = provider.upgrade() {
            provider.on_success(request_id);
        }
    }

    async fn unmount(
        &self,
        request_id: RequestId,
        _options: virtualfs_provider::options::UnmountOptions,
        provider: Weak<Provider>,
    ) {
        if let Some(provider) = provider.upgrade() {
            provider.on_success(request_id);
        }
    }
}

/// Serves every event straight off `root`, tracking open file handles by the
/// `RequestId` the matching `OpenFile` was assigned.
struct MirrorHandler {
    root: PathBuf,
    open_files: Mutex<HashMap<RequestId, PathBuf>>,
}

impl MirrorHandler {
    fn new(root: PathBuf) -> Self {
        Self { root, open_files: Mutex::new(HashMap::new()) }
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative.trim_start_matches('/'))
    }
}

impl FileSystemProviderHandler for MirrorHandler {
    fn on_unmount_requested(&self, event: UnmountRequestedEvent) {
        event.responder.success(RequestValue::Unit, false);
    }

    fn on_get_metadata_requested(&self, event: GetMetadataRequestedEvent) {
        let path = self.resolve(&event.options.entry_path);
        let responder = event.responder;
        tokio::spawn(async move {
            match tokio::fs::metadata(&path).await {
                Ok(meta) => {
                    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                    let mtime = meta.modified().ok().and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok()).map(|d| d.as_millis() as u64).unwrap_or(0);
                    let entry = if meta.is_dir() {
                        EntryMetadata::directory(name, mtime)
                    } else {
                        EntryMetadata::file(name, meta.len(), mtime)
                    };
                    responder.success(RequestValue::Metadata(MetadataValue { metadata: entry }), false);
                }
                Err(_) => responder.error(1),
            }
        });
    }

    fn on_read_directory_requested(&self, event: ReadDirectoryRequestedEvent) {
        let path = self.resolve(&event.options.directory_path);
        let responder = event.responder;
        tokio::spawn(async move {
            let mut dir = match tokio::fs::read_dir(&path).await {
                Ok(dir) => dir,
                Err(_) => {
                    responder.error(1);
                    return;
                }
            };
            let mut entries = Vec::new();
            loop {
                match dir.next_entry().await {
                    Ok(Some(entry)) => {
                        let name = entry.file_name().to_string_lossy().into_owned();
                        let meta = match entry.metadata().await {
                            Ok(meta) => meta,
                            Err(_) => continue,
                        };
                        let mtime = meta.modified().ok().and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok()).map(|d| d.as_millis() as u64).unwrap_or(0);
                        entries.push(if meta.is_dir() {
                            EntryMetadata::directory(name, mtime)
                        } else {
                            EntryMetadata::file(name, meta.len(), mtime)
                        });
                    }
                    Ok(None) => break,
                    Err(_) => break,
                }
            }
            responder.success(RequestValue::ReadDirectory(ReadDirectoryValue::new(entries)), false);
        });
    }

    fn on_open_file_requested(&self, event: OpenFileRequestedEvent) {
        let path = self.resolve(&event.options.file_path);
        let request_id = event.responder.request_id();
        match event.options.mode {
            OpenMode::Write => {
                // This demo only serves reads; writes are refused cleanly.
                event.responder.error(2);
                return;
            }
            OpenMode::Read => {}
        }
        if !path.exists() {
            event.responder.error(1);
            return;
        }
        self.open_files.lock().unwrap().insert(request_id, path);
        event.responder.success(RequestValue::Unit, false);
    }

    fn on_close_file_requested(&self, event: CloseFileRequestedEvent) {
        self.open_files.lock().unwrap().remove(&event.options.open_request_id);
        event.responder.success(RequestValue::Unit, false);
    }

    fn on_read_file_requested(&self, event: ReadFileRequestedEvent) {
        let path = self.open_files.lock().unwrap().get(&event.options.open_request_id).cloned();
        let responder = event.responder;
        let (offset, length) = (event.options.offset, event.options.length);
        tokio::spawn(async move {
            let Some(path) = path else {
                responder.error(1);
                return;
            };
            match read_chunk(&path, offset, length).await {
                Ok(data) => responder.success(RequestValue::ReadFile(ReadFileValue::new(data)), false),
                Err(_) => responder.error(1),
            }
        });
    }

    fn on_abort_requested(&self, event: AbortRequestedEvent) {
        // Reads complete in a single shot in this demo, so there's nothing in-flight
        // to cancel; acknowledge and move on.
        event.responder.success(RequestValue::Unit, false);
    }
}

async fn read_chunk(path: &Path, offset: u64, length: u64) -> std::io::Result<Vec<u8>> {
    use tokio::io::{AsyncReadExt, AsyncSeekExt};
    let mut file = tokio::fs::File::open(path).await?;
    file.seek(std::io::SeekFrom::Start(offset)).await?;
    let mut buffer = vec![0u8; length as usize];
    let read = file.read(&mut buffer).await?;
    buffer.truncate(read);
    Ok(buffer)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| Error::with_context(ErrorKind::InvalidArgument, e.to_string()))?;
            Config::from_toml(&text).map_err(|e| Error::with_context(ErrorKind::InvalidArgument, e.to_string()))?
        }
        None => Config::default(),
    };
    let log_filter = args.log_filter.clone().unwrap_or_else(|| config.log_filter.clone());
    tracing_subscriber::fmt().with_env_filter(log_filter).init();

    let provider = Provider::with_task_loop(
        Arc::new(ImmediateService),
        Arc::new(virtualfs_provider::TokioTaskLoop),
        config,
    );
    provider.set_handler(Arc::new(MirrorHandler::new(args.root.clone())));

    provider
        .mount(MountOptions::new(args.file_system_id.clone(), args.file_system_id.clone(), RequestId::from_raw(0)))
        .await?;
    info!(file_system_id = %args.file_system_id, root = %args.root.display(), "mounted");

    let manager = provider.requests(&args.file_system_id)?;
    let (id, rx) = manager.create_request_owned(
        virtualfs_provider::RequestKind::ReadDirectory,
        virtualfs_provider::options::RequestedOptions::ReadDirectory(
            virtualfs_provider::options::ReadDirectoryOptions::new(
                args.file_system_id.clone(),
                RequestId::from_raw(0),
                "/",
            ),
        ),
    )?;
    info!(request_id = %id, "listing root directory");
    match rx.await.map_err(|_| Error::new(ErrorKind::Cancelled))? {
        virtualfs_provider::RequestOutcome::Success(RequestValue::ReadDirectory(value)) => {
            for entry in value.entries {
                println!("{}\t{}", if entry.is_directory { "d" } else { "f" }, entry.name);
            }
        }
        virtualfs_provider::RequestOutcome::Success(_) => unreachable!("ReadDirectory always returns ReadDirectory"),
        virtualfs_provider::RequestOutcome::Error(code) => {
            return Err(Error::with_context(ErrorKind::InvalidArgument, format!("listing failed: {code}")));
        }
    }

    provider.unmount(virtualfs_provider::options::UnmountOptions::new(args.file_system_id.clone(), RequestId::from_raw(0))).await?;
    Ok(())
}
