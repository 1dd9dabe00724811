//! Prompt construction for every Reasoner call in the pipeline

use cld_domain::{extract_variables, Message};

const EXTRACTION_SYSTEM_PROMPT: &str = r#"You are a System Dynamics Professional Modeler.
Users will give text, and it is your job to extract causal relationships from that text.
You will conduct a multi-step process:

1. Identify variables (entities) that participate in cause-effect relationships. Name variables concisely (no more than 2 words), avoid sentiment (neutral names), and minimize the number of unique variables by preferring canonical/shorter names when synonyms appear.

2. Represent each causal relationship as an object with subject, predicate, and object. Use ONLY these predicate values:
   - positive: subject and object move in the same direction (up subject -> up object, down subject -> down object)
   - negative: subject and object move in opposite directions (up subject -> down object, down subject -> up object)
   - increase: subject causes object to increase (directional effect)
   - decrease: subject causes object to decrease (directional effect)

3. When three variables are related in a sentence, ensure the relation between the second and third variable is correct. For example, in "X inhibits Y, leading to less Z", Y and Z have a positive relationship.

4. If there are no causal relationships in the provided text, return an empty array for causalRelationships.

OUTPUT FORMAT (return ONLY JSON, nothing else):
{
  "causalRelationships": [
    {
      "subject": "<variable>",
      "predicate": "increase|decrease|positive|negative",
      "object": "<variable>"
    }
  ]
}

Example 1 input:
"when death rate goes up, population decreases"

Example 1 JSON response:
{
  "causalRelationships": [
    {
      "subject": "death rate",
      "predicate": "negative",
      "object": "population"
    }
  ]
}

Example 2 input:
"lower death rate increases population"

Example 2 JSON response:
{
  "causalRelationships": [
    {
      "subject": "death rate",
      "predicate": "negative",
      "object": "population"
    }
  ]
}

Example 3 input:
"The engineers compare the work remaining to be done against the time remaining before the deadline. The larger the gap, the more Schedule Pressure they feel. When schedule pressure builds up, engineers can work overtime. Overtime raises completion rate but also increases fatigue, which lowers productivity."

Example 3 JSON response (truncated):
{
  "causalRelationships": [
    {"subject": "work remaining", "predicate": "positive", "object": "schedule pressure"},
    {"subject": "time remaining", "predicate": "negative", "object": "schedule pressure"},
    {"subject": "schedule pressure", "predicate": "increase", "object": "overtime"},
    {"subject": "overtime", "predicate": "increase", "object": "completion rate"},
    {"subject": "overtime", "predicate": "increase", "object": "fatigue"},
    {"subject": "fatigue", "predicate": "decrease", "object": "productivity"}
  ]
}

Example 4 input (no causal relationships):
"[Text with no causal relationships]"

Example 4 JSON response:
{ "causalRelationships": [] }

Return ONLY the JSON in the exact schema shown above."#;

const MERGE_SYSTEM_PROMPT: &str = r#"You are a Professional System Dynamics Modeler.
You will be provided with 3 things:
1. Multiple causal relationships between variables in a numbered list.
2. The text on which the above causal relationships are based.
3. Multiple groups of variable names which are believed to denote the same concept.
Your objective is to merge each group of variable names into one variable, choosing the shorter of the names, and return the same set of relationships with names substituted.
Return JSON as a numbered object where each entry has a "causal relationship" string of the form "<subject> -->(+|-) <object>"."#;

const LOOP_CLOSURE_PROMPT: &str = r#"Review the causal relationships you extracted above. Are there any implied feedback loops in the text whose closing edges are missing from your answer?
If so, supply ONLY the missing relationships as additional numbered entries continuing the numbering, in this JSON form:
{ "<n>": { "causal relationship": "<subject> -->(+|-) <object>" } }
If no edges are missing, return {}."#;

/// Messages for the initial extraction call.
pub fn extraction_messages(text: &str) -> Vec<Message> {
    vec![
        Message::system(EXTRACTION_SYSTEM_PROMPT),
        Message::user(text),
    ]
}

/// Messages asking the Reasoner to reformat its own prior output into the
/// strict schema. Issued at most once per run.
pub fn reformat_messages(prior_output: &str) -> Vec<Message> {
    let request = format!(
        "You previously returned this output: {}\n\n\
         Please convert that output EXACTLY into this JSON schema: \
         {{ \"causalRelationships\": [{{\"subject\":\"<text>\",\"predicate\":\"increase|decrease|positive|negative\",\"object\":\"<text>\"}}] }} \
         and return ONLY the JSON.\n\
         Constraints:\n\
         - subject and object MUST be non-empty strings (<= 2 words, neutral).\n\
         - predicate MUST be exactly one of: increase, decrease, positive, negative.\n\
         - If no valid relationships exist, return {{\"causalRelationships\": []}}.",
        prior_output
    );
    vec![Message::system(EXTRACTION_SYSTEM_PROMPT), Message::user(request)]
}

/// Messages for the loop-closure follow-up, seeded with the conversation so
/// far (original text plus the assistant's first response).
pub fn loop_closure_messages(text: &str, prior_output: &str) -> Vec<Message> {
    vec![
        Message::system(EXTRACTION_SYSTEM_PROMPT),
        Message::user(text),
        Message::assistant(prior_output),
        Message::user(LOOP_CLOSURE_PROMPT),
    ]
}

/// Messages for the variable-merge round-trip.
pub fn merge_messages(text: &str, lines: &[String], groups: &[Vec<String>]) -> Vec<Message> {
    let lines_json = serde_json::to_string(lines).unwrap_or_default();
    let groups_json = serde_json::to_string(groups).unwrap_or_default();
    let request = format!(
        "Text:\n{}\nRelationships:\n{}\nSimilar Variables:\n{}",
        text, lines_json, groups_json
    );
    vec![Message::system(MERGE_SYSTEM_PROMPT), Message::user(request)]
}

/// Messages for the polarity verification query on one relationship.
///
/// A 4-option multiple choice: options 1-2 imply positive polarity, 3-4
/// imply negative.
pub fn verification_messages(line: &str) -> Vec<Message> {
    let (subject, object, _) = extract_variables(line);
    let system = format!(
        "Given the relationship below, select the options which are correct. There can be more than one option that is correct:\n\
         1. increasing {s} increases {o}\n\
         2. decreasing {s} decreases {o}\n\
         3. increasing {s} decreases {o}\n\
         4. decreasing {s} increases {o}\n\
         Respond in JSON with a key 'answers' that is a list of the correct option numbers.",
        s = subject,
        o = object
    );
    vec![Message::system(system), Message::user(format!("Relationship: {}", line))]
}
