//! Agent instructions, prompts and canned documents for each stage.

use super::Stage;
use crate::types::CompanyName;

// =============================================================================
// Instructions
// =============================================================================

const RESEARCH_INSTRUCTIONS: &[&str] = &[
    "You are a research agent tasked with gathering information about a specified company.",
    "Use DuckDuckGo to search for the company's industry, key products/services, and strategic focus areas.",
    "Organize the findings in a clear, structured markdown format with the following sections: Overview, Industry, Products and Services, Strategic Focus Areas, and Sources.",
    "Use bullet points for each section (except Overview) to enhance readability.",
    "Provide at least 2-3 clickable source links in the Sources section.",
    "If no information is found, provide a brief explanation under Overview.",
    "Ensure the output is concise, professional, and well-formatted with proper spacing.",
];

const USE_CASE_INSTRUCTIONS: &[&str] = &[
    "You are an AI use case generation agent.",
    "Use the provided company research to understand the company's industry and strategic focus areas.",
    "Search for AI, Machine Learning, and Generative AI trends in the company's industry using DuckDuckGo.",
    "Generate 3-5 relevant AI use cases that align with the company's goals.",
    "Format the output as follows:",
    "- Use a section titled 'AI Use Cases' with each use case numbered (e.g., '1. AI Use Case Title').",
    "- For each use case, provide a description and a clickable source link in the format: 'Source: [Link Text](URL)'.",
    "- Add a 'Sources' section at the end listing all referenced links in bullet points.",
    "Use bullet points for clarity and ensure proper spacing between sections.",
];

const RESOURCE_INSTRUCTIONS: &[&str] = &[
    "You are a resource collection agent tasked with finding datasets and tools for AI use cases.",
    "Use the provided AI use cases to identify relevant resources.",
    "Search for datasets, models, or tools on Kaggle, HuggingFace, and GitHub using DuckDuckGo.",
    "For each use case, suggest at least one resource with the format: 'Resource: [Resource Name](URL) - Description'.",
    "Format the output with a section for each use case, using bullet points for clarity.",
    "Add a 'Sources' section at the end listing all referenced platforms in bullet points.",
    "If no suitable resource is found, suggest a manual search on the platform.",
    "Ensure proper spacing and consistent formatting.",
];

pub fn instructions(stage: Stage) -> Vec<String> {
    let list = match stage {
        Stage::Research => RESEARCH_INSTRUCTIONS,
        Stage::UseCases => USE_CASE_INSTRUCTIONS,
        Stage::Resources => RESOURCE_INSTRUCTIONS,
    };
    list.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Prompts
// =============================================================================

/// Prompt for `stage`. `previous` is the full text of the preceding stage
/// and is ignored for research.
pub fn build_prompt(stage: Stage, company: &CompanyName, previous: &str) -> String {
    match stage {
        Stage::Research => format!(
            "Research {}. Provide details about its industry, products/services, and strategic focus areas.",
            company
        ),
        Stage::UseCases => format!(
            "Based on the following company research, generate 3-5 AI use cases for {}:\n\n{}",
            company, previous
        ),
        Stage::Resources => format!(
            "For the following AI use cases for {}, suggest one dataset, model, or tool per use case from Kaggle, HuggingFace, or GitHub:\n\n{}",
            company, previous
        ),
    }
}

// =============================================================================
// Degraded Documents
// =============================================================================

const RESEARCH_TAIL: &str = "\n\n**Industry**\n- Not available\n\n**Products and Services**\n- Not available\n\n**Strategic Focus Areas**\n- Not available\n\n**Sources**\n- None";

const SOURCES_TAIL: &str = "\n\n**Sources**\n- None";

/// Placeholder used when a stage produced no usable text
pub fn empty_document(stage: Stage, company: &CompanyName) -> String {
    match stage {
        Stage::Research => format!(
            "**Overview**\nNo research data found for {}. Possible issues: limited search results or ambiguous company name. Try specifying the full name (e.g., HCL Technologies).{}",
            company, RESEARCH_TAIL
        ),
        Stage::UseCases => format!(
            "**AI Use Cases**\nNo use cases generated for {}. Possible issues: limited research data or API failure.{}",
            company, SOURCES_TAIL
        ),
        Stage::Resources => format!(
            "**Resources for AI Use Cases**\nNo resources found for {}. Possible issues: limited search results or API failure.{}",
            company, SOURCES_TAIL
        ),
    }
}

/// Placeholder used when the agent call failed
pub fn error_document(stage: Stage, company: &CompanyName, message: &str) -> String {
    let tail = match stage {
        Stage::Research => RESEARCH_TAIL,
        Stage::UseCases | Stage::Resources => SOURCES_TAIL,
    };
    format!(
        "{}\nError in {} for {}: {}{}",
        stage.section_header(),
        stage.label(),
        company,
        message,
        tail
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> CompanyName {
        CompanyName::parse("Acme Corp").unwrap()
    }

    #[test]
    fn test_prompts_embed_previous_output() {
        let research = build_prompt(Stage::Research, &acme(), "ignored");
        assert_eq!(
            research,
            "Research Acme Corp. Provide details about its industry, products/services, and strategic focus areas."
        );

        let use_cases = build_prompt(Stage::UseCases, &acme(), "**Overview**\nAnvils");
        assert!(use_cases.starts_with("Based on the following company research"));
        assert!(use_cases.ends_with("\n\n**Overview**\nAnvils"));

        let resources = build_prompt(Stage::Resources, &acme(), "1. Demand forecasting");
        assert!(resources.contains("Kaggle, HuggingFace, or GitHub"));
        assert!(resources.ends_with("1. Demand forecasting"));
    }

    #[test]
    fn test_error_documents_match_stage() {
        let doc = error_document(Stage::Research, &acme(), "rate limited");
        assert!(doc.starts_with("**Overview**\nError in Research Agent for Acme Corp: rate limited"));
        assert!(doc.contains("**Strategic Focus Areas**\n- Not available"));

        let doc = error_document(Stage::UseCases, &acme(), "boom");
        assert_eq!(
            doc,
            "**AI Use Cases**\nError in Use Case Agent for Acme Corp: boom\n\n**Sources**\n- None"
        );

        let doc = error_document(Stage::Resources, &acme(), "boom");
        assert_eq!(
            doc,
            "**Resources for AI Use Cases**\nError in Resource Agent for Acme Corp: boom\n\n**Sources**\n- None"
        );
    }

    #[test]
    fn test_empty_documents_have_no_error_marker() {
        for stage in Stage::ALL {
            let doc = empty_document(stage, &acme());
            assert!(doc.starts_with(stage.section_header()));
            assert!(doc.contains("Acme Corp"));
            assert!(!doc.contains("Error"));
        }
    }

    #[test]
    fn test_instruction_counts() {
        assert_eq!(instructions(Stage::Research).len(), 7);
        assert_eq!(instructions(Stage::UseCases).len(), 9);
        assert_eq!(instructions(Stage::Resources).len(), 8);
    }
}
