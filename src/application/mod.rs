// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: the setup use case decides the
// order in which the data pipeline runs, the pipeline itself
// lives in Layer 4.

// The dataset assembly workflow
pub mod setup_use_case;
