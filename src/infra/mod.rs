// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Persistence shared by the training and prediction paths:
//
//   model_store.rs — The model artifact
//                    One JSON file holding the fitted
//                    preprocessor, the SVM weights, the
//                    TrainConfig and the evaluation report.
//                    Missing and unreadable files map to
//                    PipelineError::ModelNotFound / MalformedModel.
//
//   metrics.rs     — Training metrics
//                    Per-epoch loss/accuracy, the final
//                    evaluation report, and a CSV row per
//                    training run appended beside the model.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Model artifact saving and loading
pub mod model_store;

/// Evaluation report and training metrics CSV logger
pub mod metrics;
