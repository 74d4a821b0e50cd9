pub mod cli;
pub mod document;
pub mod error;
pub mod experiment;
pub mod loader;
pub mod num;
pub mod registry;
pub mod selector;
pub mod settings;
pub mod validate;
pub mod video;

pub use document::Document;
pub use error::{Result, RlconfError, TemplateError};
pub use experiment::{
    ExperimentConfig, HyperValue, ModelView, OptimizerView, RecordCommandView, ReinforcerView,
    TrainCommandView,
};
pub use loader::{load_dir, load_path, load_str, Loaded};
pub use registry::{SelectorKind, SelectorRegistry, SelectorSpec};
pub use selector::Selector;
pub use settings::Settings;
pub use validate::{has_errors, EnvDims, Issue, Severity, Validator};
pub use video::VideoTemplate;
