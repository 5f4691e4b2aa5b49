//! Guaranteed release of an external office application.

use crate::application::{ApplicationKind, OfficeApplication, OfficeLauncher};
use doctext_core::Result;

/// Run `body` with a live office application of the given kind.
///
/// The application is quit on every exit path: when `body` returns, when it
/// fails, and when it panics (through [`OfficeApplication`]'s `Drop`). Only
/// processes launched by this application are terminated.
pub fn with_external_application<T, F>(
    kind: ApplicationKind,
    launcher: &OfficeLauncher,
    body: F,
) -> Result<T>
where
    F: FnOnce(&mut OfficeApplication) -> Result<T>,
{
    let mut app = OfficeApplication::launch(kind, launcher.clone())?;
    let result = body(&mut app);

    if let Err(e) = &result {
        log::debug!("Releasing {:?} application after failure: {}", kind, e);
    }
    app.quit();

    result
}
