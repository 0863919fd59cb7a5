//! Grounded context assembly for answer generation.

use super::store::ScoredChunk;

/// Marker passed to the generator when retrieval found nothing; the
/// engine still answers, flagged with zero confidence.
pub const NO_CONTEXT_MARKER: &str =
    "No relevant regulatory documents are available for this question.";

/// Concatenate retrieved chunks in similarity order, each labeled with
/// its source, stopping before the total exceeds `max_chars`.
///
/// The first chunk is always included even if it alone exceeds the
/// budget; an oversized corpus must not produce an empty context.
pub fn assemble(chunks: &[ScoredChunk], max_chars: usize) -> String {
    if chunks.is_empty() {
        return NO_CONTEXT_MARKER.to_string();
    }

    let mut context = String::new();
    for chunk in chunks {
        let section = format!(
            "[Source: {}]\n{}",
            chunk.record.document, chunk.record.content
        );
        let separator = if context.is_empty() { 0 } else { 2 };
        if !context.is_empty()
            && context.chars().count() + separator + section.chars().count() > max_chars
        {
            break;
        }
        if !context.is_empty() {
            context.push_str("\n\n");
        }
        context.push_str(&section);
    }

    context
}

/// Prompt framing for the compliance assistant.
pub fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "You are an expert assistant specializing in KYC (Know Your Customer) and \
AML (Anti-Money Laundering) compliance regulations. Your role is to provide \
accurate, detailed answers based on regulatory documents.\n\
\n\
Context from regulatory documents:\n\
{context}\n\
\n\
User Question: {query}\n\
\n\
Instructions:\n\
1. Answer the question based ONLY on the information provided in the context above.\n\
2. Be specific and cite relevant regulations, requirements, or guidelines.\n\
3. If the context doesn't contain enough information to fully answer the question, \
acknowledge this and provide what information is available.\n\
4. Use clear, professional language suitable for compliance professionals.\n\
5. If mentioning specific requirements, be precise about what is mandatory vs. recommended.\n\
\n\
Answer:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::store::ChunkRecord;

    fn scored(document: &str, content: &str) -> ScoredChunk {
        ScoredChunk {
            record: ChunkRecord {
                chunk_id: format!("{}_0", document),
                document: document.to_string(),
                content: content.to_string(),
                position: 0,
            },
            similarity: 0.8,
        }
    }

    #[test]
    fn empty_retrieval_yields_the_marker() {
        assert_eq!(assemble(&[], 4000), NO_CONTEXT_MARKER);
    }

    #[test]
    fn chunks_are_labeled_with_their_source() {
        let context = assemble(&[scored("aml.pdf", "Verify beneficial owners.")], 4000);
        assert!(context.contains("[Source: aml.pdf]"));
        assert!(context.contains("Verify beneficial owners."));
    }

    #[test]
    fn budget_truncates_trailing_chunks() {
        let chunks = vec![
            scored("a.txt", &"a".repeat(200)),
            scored("b.txt", &"b".repeat(200)),
            scored("c.txt", &"c".repeat(200)),
        ];
        let context = assemble(&chunks, 500);
        assert!(context.contains("a.txt"));
        assert!(context.contains("b.txt"));
        assert!(!context.contains("c.txt"));
        assert!(context.chars().count() <= 500);
    }

    #[test]
    fn first_chunk_survives_a_tiny_budget() {
        let context = assemble(&[scored("a.txt", &"a".repeat(300))], 50);
        assert!(context.contains("a.txt"));
    }

    #[test]
    fn prompt_embeds_query_and_context() {
        let prompt = build_prompt("What is CDD?", "[Source: x]\ncontent");
        assert!(prompt.contains("User Question: What is CDD?"));
        assert!(prompt.contains("[Source: x]\ncontent"));
    }
}
