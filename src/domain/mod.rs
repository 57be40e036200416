// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that define the core
// concepts of the system: a phone record, its price range,
// the table the transformers work on, the transformer
// contract and the typed pipeline errors.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// The 20-feature phone record and the price-range label
pub mod record;

// Column-oriented numeric table the transformers work on
pub mod table;

// Typed failures shared by the data, ml and infra layers
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
