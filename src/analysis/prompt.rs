use crate::types::DiagnosisPayload;
use schemars::schema_for;
use std::sync::LazyLock;

static INSTRUCTION: LazyLock<String> = LazyLock::new(build_instruction);

/// Instruction sent alongside the image to every hosted provider
pub fn analysis_instruction() -> &'static str {
    &INSTRUCTION
}

fn build_instruction() -> String {
    let schema = serde_json::to_string_pretty(&schema_for!(DiagnosisPayload)).unwrap_or_default();

    format!(
        "You are an experienced visual designer. Diagnose the attached design.\n\n\
         Score it from 0 to 100 on each of these five dimensions and list concrete \
         issues and improvement suggestions for each:\n\
         1. color - palette, contrast, brand color consistency\n\
         2. layout - use of space, grid, visual balance\n\
         3. typography - type hierarchy, readability, weight pairing\n\
         4. hierarchy - information priority, guidance of the eye\n\
         5. branding - brand recognition, stylistic unity\n\n\
         Respond with a single JSON object and nothing else. It must match this JSON schema:\n\
         {schema}\n\n\
         Example shape:\n\
         {{\"overallScore\": 85, \"dimensions\": {{\"color\": {{\"score\": 80, \
         \"issues\": [\"...\"], \"suggestions\": [\"...\"]}}, \"layout\": {{...}}, \
         \"typography\": {{...}}, \"hierarchy\": {{...}}, \"branding\": {{...}}}}}}"
    )
}
