// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All model math lives here, on Burn's NdArray backend.
//
//   model.rs      — Linear multiclass SVM
//                   • one weight column + bias per price range
//                   • Weston–Watkins hinge loss with L2 penalty
//                   • conversion to / from plain stored weights
//
//   trainer.rs    — The training loop
//                   Mini-batch Adam over Burn's DataLoader,
//                   then accuracy on the train and test sets
//
//   inferencer.rs — The inference engine
//                   Rebuilds the SVM from stored weights and
//                   maps preprocessed rows to price ranges
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Weston & Watkins (1999) multiclass SVM

/// Linear SVM architecture and stored weights
pub mod model;

/// Training loop with evaluation
pub mod trainer;

/// Inference engine — stored weights in, price ranges out
pub mod inferencer;
