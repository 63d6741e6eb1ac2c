//! Answer generation: prompt assembly, safety guards, and the completion call.

mod generator;
mod instructions;
mod policy;

pub use generator::{AnswerGenerator, APOLOGY};
pub use instructions::DOCUMENT_QA_SYSTEM_PROMPT;
pub use policy::{SafetyPolicy, JAILBREAK_REFUSAL, LEAKAGE_REFUSAL};
