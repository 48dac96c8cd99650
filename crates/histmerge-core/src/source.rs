//! Opening sources through a container store

use std::path::Path;

use histmerge_container::{Container, ContainerStore};
use histmerge_fs::RobustnessConfig;
use histmerge_fs::io::{is_transient, with_retries};

/// Open a source, retrying transient I/O failures within the budget.
///
/// The returned container owns its data; dropping it closes the source.
pub(crate) fn open_source<S>(
    store: &S,
    path: &Path,
    robustness: RobustnessConfig,
) -> histmerge_container::Result<Container>
where
    S: ContainerStore + ?Sized,
{
    with_retries(
        robustness,
        || store.open(path),
        |e| e.io_kind().is_some_and(is_transient),
    )
}
