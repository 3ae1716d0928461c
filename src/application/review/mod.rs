//! Review use-cases: annotations, markdown export, line selection, staleness.

pub mod annotations;
pub mod export;
pub mod selection;
pub mod staleness;

pub use annotations::{ReviewAnnotationStore, is_outdated};
pub use export::ReviewExporter;
pub use selection::{
    GlobalListener, LineSelectionEngine, PointerButton, SelectionPhase, comment_draft,
    select_range,
};
pub use staleness::{
    Reconciled, ReloadPlan, ReviewMode, ReviewModeInputs, StalenessReconciler, changed_files,
};
