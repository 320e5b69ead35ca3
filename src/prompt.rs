//! Prompt assembly.
//!
//! Pure string composition, no failure modes. Grounding is enforced only by
//! the instruction text: nothing here can stop a model from stating facts
//! that are absent from the knowledge base.

const PERSONA: &str = r#"You are representing a senior full-stack engineer in a casual, friendly conversation about their work.
Speak as the engineer themselves, in the first person, chatting naturally with someone interested in their projects.

TONE & STYLE:
- Casual and conversational, like talking to a colleague over coffee
- Flowing paragraphs rather than bullet points or resume-style lists
- Contractions (I'm, I've, we're) and varied sentence length
- Enthusiastic, humble, and genuine

RESPONSE APPROACH:
- Greetings like "hi" get a short, warm reply and a question back. Don't dump information.
- Project questions: tell the story. Why it was built, how, and what the tricky part was.
- Technology questions: explain the tool in the context of the projects where it was actually used.
- Keep answers concise unless the visitor asks for detail.

GROUNDING RULES:
- Only state facts that appear in the portfolio context below: projects, roles, companies, dates, skills, and links.
- If the context does not cover something, say you'd rather not guess and suggest getting in touch instead.
- Never invent employers, metrics, clients, or technologies."#;

const CLOSING: &str =
    "Remember: you're a person, not a chatbot. Sound natural and keep it conversational.";

/// Builds the chat system prompt from the knowledge-base summary and an
/// optional focused project context. An empty `project_context` adds no
/// block.
pub fn system_prompt(summary: &str, project_context: &str) -> String {
    let mut prompt =
        String::with_capacity(PERSONA.len() + summary.len() + project_context.len() + 256);
    prompt.push_str(PERSONA);
    prompt.push_str("\n\nCONTEXT ABOUT THE PORTFOLIO:\n");
    prompt.push_str(summary);
    prompt.push('\n');

    if !project_context.trim().is_empty() {
        prompt.push_str("\n=== Currently Discussing ===\n");
        prompt.push_str(project_context.trim());
        prompt.push('\n');
    }

    prompt.push('\n');
    prompt.push_str(CLOSING);
    prompt
}

/// The user message for a chat turn: the caller-supplied context when it is
/// non-empty, otherwise the question itself.
pub fn user_message<'a>(context: Option<&'a str>, question: &'a str) -> &'a str {
    match context {
        Some(c) if !c.trim().is_empty() => c,
        _ => question,
    }
}

/// Builds the README extraction instruction. The model must answer with the
/// bare JSON object and nothing else.
pub fn readme_extraction_prompt(readme: &str, repo_name: &str) -> String {
    format!(
        r#"Act as a technical documentation expert. Analyze this README and extract structured data for a portfolio project case study.

Repo Name: {repo_name}

README CONTENT:
{readme}

JSON OUTPUT FORMAT (return ONLY the raw JSON object, no markdown formatting, no commentary):
{{
    "title": "Project Title",
    "summary": "One sentence elevator pitch (max 100 chars)",
    "fullDescription": "Detailed technical overview (2-3 paragraphs)",
    "techStack": ["Array", "of", "Technologies"],
    "architecture": "Architecture details if found, else null",
    "challenges": "Engineering challenges if found, else null",
    "category": "Inferred category (e.g. Backend, Frontend, Full Stack, DevOps)"
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_embeds_summary_and_rules() {
        let prompt = system_prompt("## Current Experience\nEngineer at Acme", "");
        assert!(prompt.contains("Engineer at Acme"));
        assert!(prompt.contains("Only state facts that appear in the portfolio context"));
        assert!(!prompt.contains("Currently Discussing"));
    }

    #[test]
    fn test_system_prompt_adds_project_block() {
        let prompt = system_prompt("summary", "Project: Chat Engine\nCategory: Backend");
        let block = prompt.find("=== Currently Discussing ===").unwrap();
        assert!(prompt[block..].contains("Project: Chat Engine"));
        assert!(prompt.find("summary").unwrap() < block);
    }

    #[test]
    fn test_user_message_prefers_context() {
        assert_eq!(user_message(Some("tell me more"), "hi"), "tell me more");
        assert_eq!(user_message(Some("   "), "hi"), "hi");
        assert_eq!(user_message(None, "hi"), "hi");
    }

    #[test]
    fn test_extraction_prompt_lists_schema_keys() {
        let prompt = readme_extraction_prompt("# Demo\nA demo.", "demo-repo");
        for key in [
            "\"title\"",
            "\"summary\"",
            "\"fullDescription\"",
            "\"techStack\"",
            "\"architecture\"",
            "\"challenges\"",
            "\"category\"",
        ] {
            assert!(prompt.contains(key), "missing {}", key);
        }
        assert!(prompt.contains("Repo Name: demo-repo"));
        assert!(prompt.contains("# Demo\nA demo."));
    }
}
