//! Channels and workers wiring the engine to its external tools.
//!
//! The control task is the only owner of the [`Session`](crate::session::Session);
//! every call that shells out runs in a blocking worker task and reports back
//! over an unbounded channel as plain data. The control task folds results in
//! between channel receives, so catalog mutations are serialized and a worker
//! never holds a live catalog reference.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::catalog::{self, Catalog, InstalledSets};
use crate::ops::{OperationKind, OperationOutcome};
use crate::sources::{
    AurSource, FlatpakSource, RepoSource, SourceError, SystemAur, SystemFlatpak, SystemRepo,
};

/// The three listing capabilities bundled for worker spawns.
#[derive(Clone)]
pub struct Backends {
    /// Official repository listings.
    pub repo: Arc<dyn RepoSource>,
    /// Flatpak listings.
    pub flatpak: Arc<dyn FlatpakSource>,
    /// AUR helper listings and search.
    pub aur: Arc<dyn AurSource>,
}

impl Backends {
    /// Backends talking to the live system tools.
    #[must_use]
    pub fn system() -> Self {
        Self {
            repo: Arc::new(SystemRepo),
            flatpak: Arc::new(SystemFlatpak),
            aur: Arc::new(SystemAur::discover()),
        }
    }
}

/// Channel endpoints owned by the control task.
///
/// Senders are cloned into workers; the receivers stay here and are drained
/// by the control loop.
pub struct Channels {
    /// Completed full catalog loads.
    pub load_tx: mpsc::UnboundedSender<Catalog>,
    /// Receiver half for catalog loads.
    pub load_rx: mpsc::UnboundedReceiver<Catalog>,
    /// AUR search results as `(term, hit names)`.
    pub aur_tx: mpsc::UnboundedSender<(String, Vec<String>)>,
    /// Receiver half for AUR search results.
    pub aur_rx: mpsc::UnboundedReceiver<(String, Vec<String>)>,
    /// Finished privileged operations.
    pub op_tx: mpsc::UnboundedSender<OperationOutcome>,
    /// Receiver half for operation outcomes.
    pub op_rx: mpsc::UnboundedReceiver<OperationOutcome>,
    /// Reconciliation results; an error means "fall back to a full reload".
    pub reconcile_tx: mpsc::UnboundedSender<Result<InstalledSets, SourceError>>,
    /// Receiver half for reconciliation results.
    pub reconcile_rx: mpsc::UnboundedReceiver<Result<InstalledSets, SourceError>>,
}

impl Channels {
    /// Create every channel pair used by the runtime.
    #[must_use]
    pub fn new() -> Self {
        let (load_tx, load_rx) = mpsc::unbounded_channel();
        let (aur_tx, aur_rx) = mpsc::unbounded_channel();
        let (op_tx, op_rx) = mpsc::unbounded_channel();
        let (reconcile_tx, reconcile_rx) = mpsc::unbounded_channel();
        Self {
            load_tx,
            load_rx,
            aur_tx,
            aur_rx,
            op_tx,
            op_rx,
            reconcile_tx,
            reconcile_rx,
        }
    }
}

impl Default for Channels {
    fn default() -> Self {
        Self::new()
    }
}

/// What: Rebuild the catalog off the control task.
///
/// Inputs:
/// - `backends`: Listing capabilities
/// - `aur_enabled`: User setting gating the AUR source
/// - `tx`: Where the finished catalog is delivered
///
/// Details:
/// - Send failures mean the control task is gone; ignored like every
///   worker-side send in this module.
pub fn spawn_full_load(
    backends: Backends,
    aur_enabled: bool,
    tx: mpsc::UnboundedSender<Catalog>,
) {
    tokio::spawn(async move {
        let loaded = tokio::task::spawn_blocking(move || {
            catalog::full_load(
                backends.repo.as_ref(),
                backends.flatpak.as_ref(),
                backends.aur.as_ref(),
                aur_enabled,
            )
        })
        .await;
        if let Ok(cat) = loaded {
            let _ = tx.send(cat);
        }
    });
}

/// What: Run an AUR search for `term` off the control task.
///
/// Details:
/// - Degraded searches deliver an empty hit list; the term is echoed so the
///   control task can discard stale results.
pub fn spawn_aur_search(
    backends: Backends,
    term: String,
    tx: mpsc::UnboundedSender<(String, Vec<String>)>,
) {
    tokio::spawn(async move {
        let term_for_search = term.clone();
        let hits = tokio::task::spawn_blocking(move || {
            crate::sources::aur::aur_search_names(backends.aur.as_ref(), &term_for_search)
        })
        .await
        .unwrap_or_default();
        let _ = tx.send((term, hits));
    });
}

/// What: Execute a privileged operation off the control task.
pub fn spawn_operation(
    argv: Vec<String>,
    kind: OperationKind,
    target: Option<String>,
    dry_run: bool,
    tx: mpsc::UnboundedSender<OperationOutcome>,
) {
    tokio::spawn(async move {
        let outcome = tokio::task::spawn_blocking(move || {
            crate::ops::run_operation(&argv, kind, target, dry_run)
        })
        .await;
        if let Ok(outcome) = outcome {
            let _ = tx.send(outcome);
        }
    });
}

/// What: Gather the installed sets off the control task.
///
/// Details:
/// - Delivers `Err` when any of the cheap queries fails, which the control
///   task answers with a full catalog reload.
pub fn spawn_reconcile(
    backends: Backends,
    tx: mpsc::UnboundedSender<Result<InstalledSets, SourceError>>,
) {
    tokio::spawn(async move {
        let gathered = tokio::task::spawn_blocking(move || {
            catalog::reconcile::gather(
                backends.repo.as_ref(),
                backends.flatpak.as_ref(),
                backends.aur.as_ref(),
            )
        })
        .await;
        if let Ok(result) = gathered {
            let _ = tx.send(result);
        }
    });
}
