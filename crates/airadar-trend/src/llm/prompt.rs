use airadar_core::Item;

/// Longest description excerpt, in characters, sent per item.
const DESC_MAX_CHARS: usize = 200;

const INSTRUCTIONS: &str = "\
You are an AI trend analyst. Below is a batch of items gathered from sources such as \
Hacker News, GitHub, Reddit, ArXiv and RSS feeds. Decide which of them are genuinely \
important, trending AI products, tools, research or news.

Give every item:
1. \"score\" (integer 0-10): how important or trending it is for the AI community.
   - 9-10: breakthrough launch, major model release, industry-shaking news
   - 7-8: notable new tool, significant paper, important industry update
   - 5-6: interesting but unexceptional, niche tool, incremental update
   - 3-4: only loosely AI-related, little novelty
   - 0-2: not AI-related, spam or noise
2. \"reason\" (one sentence): why that score.
3. \"topic\" (short phrase): a clean, normalized label used to group items, \
for example \"Claude 4 Release\" or \"Stable Diffusion 4.0\".

Be strict. Most items should score 5 or lower; reserve 7+ for truly significant items.

Items:
";

const RESPONSE_FORMAT: &str = "

Reply with a JSON array whose elements each have \"id\" (the item ID), \"score\" \
(integer 0-10), \"reason\" (string) and \"topic\" (string).
Example: [{\"id\":\"hackernews:123\",\"score\":8,\"reason\":\"Major open-weights LLM release\",\"topic\":\"Llama 4 Release\"}]

Return only the JSON array and nothing else.";

/// Render the whole batch into a single evaluation prompt.
pub(crate) fn build_prompt(items: &[Item]) -> String {
    let lines: Vec<String> = items.iter().map(item_line).collect();
    format!("{INSTRUCTIONS}{}{RESPONSE_FORMAT}", lines.join("\n"))
}

fn item_line(item: &Item) -> String {
    let mut line = format!(
        "- ID: {} | Source: {} | Score: {} | Title: {}",
        item.id, item.source, item.score, item.title
    );
    if !item.description.is_empty() {
        line.push_str(" | Desc: ");
        line.push_str(&truncate_chars(&item.description, DESC_MAX_CHARS));
    }
    if !item.url.is_empty() {
        line.push_str(" | URL: ");
        line.push_str(&item.url);
    }
    line
}

/// First `max` characters of `s`, with `...` appended when anything was cut.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}
