//! XMILE rendering
//!
//! Produces a minimal XMILE 1.0 document. Each variable that appears as an
//! effect becomes an `<aux>` whose `NAN(...)` equation lists its causes;
//! each edge becomes a `<connector>` tagged with the bare polarity sign.

use cld_domain::extract_variables;

/// XMILE identifier for a display name: whitespace runs become underscores.
pub fn xmile_name(display_name: &str) -> String {
    display_name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Strip the parentheses from a polarity symbol, `"(+)"` → `"+"`.
fn clean_symbol(symbol: &str) -> String {
    symbol.chars().filter(|c| *c != '(' && *c != ')').collect()
}

/// Render relationship lines as an XMILE document.
pub fn render_xmile(lines: &[String]) -> String {
    // Effect variable -> its causes, in first-appearance order.
    let mut causes: Vec<(String, Vec<String>)> = Vec::new();
    let mut connectors = String::new();

    for line in lines {
        let (subject, object, symbol) = extract_variables(line);
        if subject.is_empty() || object.is_empty() || subject == object {
            continue;
        }
        match causes.iter_mut().find(|(effect, _)| *effect == object) {
            Some((_, causers)) => causers.push(subject.clone()),
            None => causes.push((object.clone(), vec![subject.clone()])),
        }
        connectors.push_str(&format!(
            "\t\t\t\t<connector polarity=\"{}\">\n\
             \t\t\t\t\t<from>{}</from>\n\
             \t\t\t\t\t<to>{}</to>\n\
             \t\t\t\t</connector>\n",
            clean_symbol(&symbol),
            xmile_name(&subject),
            xmile_name(&object)
        ));
    }

    let mut variables = String::new();
    for (effect, causers) in &causes {
        let eqn = causers
            .iter()
            .map(|c| xmile_name(c))
            .collect::<Vec<_>>()
            .join(",");
        variables.push_str(&format!(
            "\t\t\t<aux name=\"{}\">\n\
             \t\t\t\t<eqn>NAN({})</eqn>\n\
             \t\t\t\t<isee:delay_aux/>\n\
             \t\t\t</aux>\n",
            effect, eqn
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <xmile version=\"1.0\">\n\
         \t<model>\n\
         \t\t<variables>\n\
         {}\t\t</variables>\n\
         \t\t<views>\n\
         \t\t\t{}\t\t</views>\n\
         \t</model>\n\
         </xmile>",
        variables, connectors
    )
}
