/// Export worker — renders the full selected structure and writes the
/// report file.
///
/// The report is the one persisted artifact: a UTF-8 text file named
/// `<rootBaseName>-estructura.txt` written into the root folder, with the
/// fixed Spanish header banner, the source path, a local timestamp, a
/// blank line, and the export-mode tree body.
///
/// The renderer runs under a single coarse write lock on the store — the
/// interactive layer does not mutate while an export is in flight, and the
/// lock makes that assumption safe rather than trusted.
use crate::error::MapperError;
use crate::events::MapperEvent;
use crate::render;
use crate::tasks::{SharedStore, TaskHandle};
use crossbeam_channel::Sender;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Spawn the export task for `root`.
///
/// Completion is reported through [`MapperEvent::ExportFinished`];
/// `in_flight` is released when the task exits.
pub fn start_export(
    root: PathBuf,
    store: SharedStore,
    events: Sender<MapperEvent>,
    in_flight: Arc<AtomicBool>,
) -> TaskHandle {
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_clone = Arc::clone(&cancel);

    let thread = std::thread::Builder::new()
        .name("folder-mapper-export".to_owned())
        .spawn(move || {
            info!("exporting structure of {:?}", root);
            let result = run_export(&root, &store, &events, &cancel_clone);
            match &result {
                Ok(path) => info!("report written: {:?}", path),
                Err(err) => warn!("export of {:?} failed: {err}", root),
            }
            // Release before the terminal event: a caller reacting to
            // `ExportFinished` may immediately start the next export.
            in_flight.store(false, Ordering::Release);
            let _ = events.send(MapperEvent::ExportFinished(
                result.map_err(|e| e.to_string()),
            ));
        })
        .expect("failed to spawn export thread");

    TaskHandle::new(cancel, thread)
}

fn run_export(
    root: &Path,
    store: &SharedStore,
    events: &Sender<MapperEvent>,
    cancel: &AtomicBool,
) -> Result<PathBuf, MapperError> {
    let body = {
        let mut tree = store.write();
        render::render_export(&mut tree, root, cancel, &mut |name| {
            let _ = events.try_send(MapperEvent::ExportProgress {
                current_item: name.to_owned(),
            });
        })?
    };

    let output_path = report_path(root);
    write_report(&output_path, root, &body)?;
    Ok(output_path)
}

/// `<rootBaseName>-estructura.txt`, inside the root folder.
pub fn report_path(root: &Path) -> PathBuf {
    let base = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.to_string_lossy().to_string());
    root.join(format!("{base}-estructura.txt"))
}

fn write_report(output_path: &Path, root: &Path, body: &str) -> Result<(), MapperError> {
    let write_err = |source| MapperError::ExportWrite {
        path: output_path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::create(output_path).map_err(write_err)?;
    let timestamp = chrono::Local::now().format("%d/%m/%Y %H:%M:%S");
    write!(
        file,
        "ESTRUCTURA DE CARPETAS\n{}\nRuta: {}\nFecha: {}\n\n{}",
        "=".repeat(25),
        root.display(),
        timestamp,
        body
    )
    .map_err(write_err)?;
    Ok(())
}
