use crate::domain::EventBrief;

const WORKFLOW: &str = "Workflow:
1. Retrieve brand voice and product context and keep the chunk ids
2. Draft content for each channel following the brand guidelines
3. Critique each draft and revise any channel scoring below 7
4. Verify every factual claim against the retrieved chunk ids
5. Save the final bundle with content, scorecard and claims_table";

const QUALITY_STANDARDS: &str = "Quality standards:
- Brand voice score >= 7
- CTA clarity score >= 7
- All claims must be verified against source documents
- Content within channel limits (LinkedIn 3000 chars, Facebook 500, \
Email 1500 with a 60 char subject, Web 300)";

fn bullets(items: &[String]) -> String {
    if items.is_empty() {
        return "(none provided)".to_string();
    }
    items
        .iter()
        .map(|i| format!("- {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a brief as the natural-language instruction handed to the agent.
pub fn render_prompt(brief: &EventBrief) -> String {
    let urls: Vec<String> = brief
        .relevant_urls
        .iter()
        .map(|u| format!("{}: {}", u.label, u.url))
        .collect();
    let channels = brief
        .channels
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = format!(
        "Generate marketing content for this event:\n\n\
         **Event:** {title}\n\
         **Description:** {description}\n\
         **Date:** {date}\n\
         **Target Audience:** {audience}\n\n\
         **Key Messages:**\n{messages}\n\n\
         **Channels to create:** {channels}\n\n\
         **URLs for CTAs:**\n{urls}\n\n\
         {WORKFLOW}\n\n\
         {QUALITY_STANDARDS}\n",
        title = brief.event_title,
        description = brief.event_description,
        date = brief.event_date.as_deref().unwrap_or("TBD"),
        audience = brief.target_audience,
        messages = bullets(&brief.key_messages),
        channels = channels,
        urls = bullets(&urls),
    );

    if !brief.prior_feedback.is_empty() {
        out.push_str("\nIMPORTANT FEEDBACK FROM PREVIOUS ITERATIONS:\n");
        for block in &brief.prior_feedback {
            out.push_str(block);
            out.push_str("\n\n");
        }
    }

    out.push_str("\nBegin by retrieving brand voice and product context.");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Channel;

    #[test]
    fn renders_defaults_for_missing_fields() {
        let brief = EventBrief::new("Zero Trust Webinar", "Learn Zero Trust.", vec![Channel::Linkedin]);
        let prompt = render_prompt(&brief);
        assert!(prompt.contains("**Event:** Zero Trust Webinar"));
        assert!(prompt.contains("**Date:** TBD"));
        assert!(prompt.contains("**Key Messages:**\n(none provided)"));
        assert!(prompt.contains("**Channels to create:** linkedin"));
        assert!(!prompt.contains("IMPORTANT FEEDBACK"));
    }

    #[test]
    fn renders_feedback_and_urls() {
        let mut brief = EventBrief::new("Summit", "desc", vec![Channel::Web, Channel::Email])
            .with_date("2026-02-15")
            .with_url("Register", "https://example.com/register");
        brief.add_feedback("- claim one");

        let prompt = render_prompt(&brief);
        assert!(prompt.contains("**Date:** 2026-02-15"));
        assert!(prompt.contains("- Register: https://example.com/register"));
        assert!(prompt.contains("**Channels to create:** web, email"));
        assert!(prompt.contains("IMPORTANT FEEDBACK FROM PREVIOUS ITERATIONS:\n- claim one"));
    }
}
