// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish
// one goal each: training a model, or predicting with one.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No HTTP or printing here (that's Layer 1 and the api module)
//   - File access only through Layer 4 and Layer 6 types
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow
pub mod train_use_case;

// Loading a model and predicting price ranges
pub mod predict_use_case;

#[cfg(test)]
pub(crate) mod test_data;
