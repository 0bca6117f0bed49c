pub mod action;
pub mod app;
pub mod config;
pub mod dispatch;
pub mod feedback;
pub mod gesture;
pub mod midi;
pub mod panel;
pub mod predicate;
pub mod probe;
pub mod runtime;
pub mod state;
pub mod status;

pub use action::{build_action, Action, RenderContext};
pub use app::{AppState, AppStateError};
pub use config::{
    load_from_path, load_from_str, Diagnostic, DiagnosticSeverity, LoadError, LoadedProfile,
};
pub use dispatch::{ActionId, Dispatcher, SwitchBindings};
pub use feedback::{FeedbackSurface, FeedbackTarget, LabelState, SwitchColor};
pub use gesture::{ClassifierConfig, Gesture, GestureClassifier};
pub use midi::{ControlChange, OutputSink, RecordingSink};
pub use panel::Panel;
pub use predicate::EnablePredicate;
pub use runtime::{InputLatch, RuntimeManager, RuntimeManagerError};
pub use state::StateStore;
