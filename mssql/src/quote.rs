/// Wrap every standalone occurrence of the given table names in brackets.
///
/// A name is standalone when it starts the text or follows a space or `(`,
/// and ends the text or precedes a space, `)`, `.` or `,`. Names that are
/// already bracketed are left alone.
pub fn bracket_entities(text: String, entities: &[&str]) -> String {
    entities
        .iter()
        .filter(|name| !name.is_empty() && !name.starts_with('['))
        .fold(text, |text, name| bracket(&text, name))
}

fn bracket(text: &str, name: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut rest = text;
    let mut previous: Option<char> = None;

    while let Some(pos) = rest.find(name) {
        let (head, tail) = rest.split_at(pos);
        let tail = &tail[name.len()..];
        let before = head.chars().next_back().or(previous);
        let after = tail.chars().next();
        let starts = matches!(before, None | Some(' ' | '('));
        let ends = matches!(after, None | Some(' ' | ')' | '.' | ','));

        out.push_str(head);
        if starts && ends {
            out.push('[');
            out.push_str(name);
            out.push(']');
            previous = Some(']');
        } else {
            out.push_str(name);
            previous = name.chars().next_back();
        }
        rest = tail;
    }
    out.push_str(rest);
    out
}
