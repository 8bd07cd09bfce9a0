use {
    super::{
        loader::{HandlerExport, HandlerLoader},
        registry::Registry,
        scan::{FileFilter, map_directory},
    },
    crate::Result,
    std::path::Path,
};

/// Mounts one child registry per handler module found below `basedir`.
///
/// Every file the loader recognizes is loaded in traversal order. Modules
/// that classify as a mount function get a child registry composed at the
/// file's derived path; everything else is skipped. A load error aborts the
/// assembly and is returned unchanged.
pub fn mount_directory<S, L, P>(
    registry: &mut Registry<S>,
    basedir: &Path,
    ignore: &[P],
    loader: &L,
) -> Result<()>
where
    S: Clone + Send + Sync + 'static,
    L: HandlerLoader<S> + ?Sized,
    P: AsRef<str>,
{
    let filter = FileFilter::new(loader.extensions().all()).with_ignore(ignore)?;
    let scanned = map_directory(basedir, &filter)?;

    tracing::debug!(
        basedir = %basedir.display(),
        files = scanned.len(),
        "Mounting route directory"
    );

    for (route, file) in scanned {
        let export = HandlerExport::classify(loader.load(&file)?);
        let Some(mount) = export.into_mount_fn() else {
            tracing::debug!(file = %file.display(), "Skipping file without a mount function");
            continue;
        };

        let mut child = registry.compose(&route);
        mount(&mut child)?;
        tracing::debug!(route = %route, file = %file.display(), "Mounted handler module");
        registry.attach(child)?;
    }

    Ok(())
}
