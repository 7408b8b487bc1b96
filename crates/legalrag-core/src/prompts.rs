//! Prompt templates for the legal research pipeline

use crate::llm::ChatMessage;

/// System prompt shared by answering and document analysis
pub const LEGAL_SYSTEM_PROMPT: &str = "You are a specialized legal assistant tasked with analyzing legal documents and answering legal queries with precision.
Follow these guidelines:
1. Only make assertions that can be backed by the provided documents or reliable legal knowledge.
2. Cite relevant laws, regulations, and case precedents when appropriate.
3. Clearly distinguish between factual legal information and legal opinions or interpretations.
4. Acknowledge areas of legal uncertainty or where multiple interpretations may exist.
5. Provide structured, organized responses that follow legal reasoning patterns.
6. Include references to the specific documents or sections that support your analysis.
7. Always maintain ethical standards and never advise on ways to circumvent the law.
8. Highlight potential legal risks when appropriate.

Remember: Your analysis should be accurate, balanced, and appropriately qualified based on the legal information available to you.
";

const SEARCH_DETERMINATION_SYSTEM: &str = "You determine whether a legal query requires external research through web search or can be answered using existing knowledge.
Evaluate if the query contains specific legal questions that would benefit from current legal references or case law.";

const RELEVANCE_SYSTEM: &str = "You evaluate the relevance of retrieved legal documents to the original query.
Your job is to determine how well each document addresses the specific legal question.";

const REFINEMENT_SYSTEM: &str = "You are a legal research assistant that helps formulate effective search queries for legal information.
Your job is to convert legal questions into specific search queries that will yield relevant results.";

/// Answer a question from retrieved passages, replaying prior turns
pub fn legal_research(query: &str, context: &str, chat_history: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(chat_history.len() + 3);
    messages.push(ChatMessage::system(LEGAL_SYSTEM_PROMPT));
    messages.push(ChatMessage::user(query));
    messages.extend(chat_history.iter().cloned());
    messages.push(ChatMessage::user(format!(
        "Please analyze the following legal question based on the provided documents:

Question: {query}

Documents:
{context}

Provide a comprehensive legal analysis with:
1. Summary of the legal issue
2. Analysis based on provided documents
3. Relevant legal principles
4. Conclusion and recommendations
"
    )));
    messages
}

/// Structured review of a single document
pub fn document_analysis(document_content: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(LEGAL_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Please analyze the following legal document:

Document: {document_content}

Provide:
1. Document type and purpose
2. Key legal provisions/clauses
3. Legal implications
4. Potential issues or ambiguities
5. Recommended actions
"
        )),
    ]
}

/// Rewrites a question into web search queries.
///
/// The search chain accepts a refinement flag but does not act on it yet.
pub fn search_query_refinement(original_query: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(REFINEMENT_SYSTEM),
        ChatMessage::user(format!("Original question: {original_query}")),
        ChatMessage::user(
            "Based on the original question, generate 3-5 specific search queries that would help find relevant legal information.
Focus on:
- Key legal terms and concepts
- Relevant laws, regulations, or case names
- Jurisdictional specifics
- Reformulating the question to target specific legal sources
",
        ),
    ]
}

/// Ask whether the query needs live web search
pub fn search_determination(query: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SEARCH_DETERMINATION_SYSTEM),
        ChatMessage::user(format!(
            "Query: {query}

Determine if this query requires web search to answer accurately.
Consider:
1. Is this asking about specific laws, regulations, or recent legal developments?
2. Does it require knowledge of specific legal precedents or case law?
3. Is the query about legal standards that may vary by jurisdiction?
4. Does it ask about recent legal changes or interpretations?

Respond with either:
- \"NEEDS_SEARCH\" if web search would significantly improve the answer quality
- \"NO_SEARCH\" if the query can be adequately answered with general legal knowledge
"
        )),
    ]
}

/// Score a document against a query on a 1-10 scale
pub fn document_relevance(query: &str, document_content: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(RELEVANCE_SYSTEM),
        ChatMessage::user(format!(
            "Original query: {query}

Document content: {document_content}

Evaluate the relevance of this document to the query on a scale of 1-10, where:
1 = Completely irrelevant
10 = Directly answers the query with authoritative legal information

Provide:
1. Numerical score (1-10)
2. Brief explanation for your score
3. Key information from the document relevant to the query
"
        )),
    ]
}

/// Workflow analysis stage prompt
pub fn workflow_analysis(search_results: &str, research_output: &str) -> String {
    format!(
        "Analyze the following legal information:
Search Results: {search_results}
Research: {research_output}

Provide a clear analysis focusing on:
1. Key legal principles
2. Relevant precedents
3. Practical implications
"
    )
}

/// Workflow synthesis stage prompt
pub fn workflow_final(research_output: &str, analysis_results: &str) -> String {
    format!(
        "Based on the research and analysis, provide a comprehensive answer:
Research: {research_output}
Analysis: {analysis_results}

Format the response with:
1. Clear explanation
2. Legal basis
3. Practical recommendations
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_research_places_history_between_query_and_request() {
        let history = vec![
            ChatMessage::user("What is consideration?"),
            ChatMessage::assistant("Consideration is a bargained-for exchange."),
        ];
        let messages = legal_research("Is a gift enforceable?", "Document 1:\n...", &history);

        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].content, "Is a gift enforceable?");
        assert_eq!(messages[2], history[0]);
        assert_eq!(messages[3], history[1]);
        assert!(messages[4].content.contains("Question: Is a gift enforceable?"));
        assert!(messages[4].content.contains("Documents:\nDocument 1:"));
    }

    #[test]
    fn test_search_determination_names_both_tokens() {
        let messages = search_determination("Explain promissory estoppel");
        let body = &messages[1].content;
        assert!(body.starts_with("Query: Explain promissory estoppel"));
        assert!(body.contains("\"NEEDS_SEARCH\""));
        assert!(body.contains("\"NO_SEARCH\""));
    }

    #[test]
    fn test_workflow_prompts_embed_state() {
        let analysis = workflow_analysis("Title: A\nContent: B", "research text");
        assert!(analysis.contains("Search Results: Title: A"));
        assert!(analysis.contains("Research: research text"));

        let fin = workflow_final("research text", "analysis text");
        assert!(fin.contains("Analysis: analysis text"));
    }
}
