//! Template hole extraction.
//!
//! A template is a string with `{{ … }}` holes. The hole body is
//! non-greedy and must not contain braces; empty or whitespace-only
//! holes are not holes at all and pass through as literal text.

/// A single `{{ … }}` occurrence. `start..end` is the byte range of the
/// whole hole including braces; `expr` is the trimmed body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hole {
    pub expr: String,
    pub start: usize,
    pub end: usize,
}

/// The parsed shape of a template: its holes, in source order.
#[derive(Debug, Clone, Default)]
pub struct TemplateLayout {
    pub holes: Vec<Hole>,
}

impl TemplateLayout {
    pub fn is_template(&self) -> bool {
        !self.holes.is_empty()
    }
}

/// Quick check used to classify input as template vs direct expression.
pub fn has_holes(source: &str) -> bool {
    scan(source).is_template()
}

/// Extract every hole from `source`.
pub fn scan(source: &str) -> TemplateLayout {
    let bytes = source.as_bytes();
    let mut holes = Vec::new();
    let mut i = 0;

    while i + 3 < bytes.len() + 1 {
        if bytes[i] == b'{' && bytes.get(i + 1) == Some(&b'{') {
            if let Some(rel) = source[i + 2..].find("}}") {
                let body = &source[i + 2..i + 2 + rel];
                if body.contains('{') || body.contains('}') {
                    // not a hole; retry from the next character so an
                    // overlapping `{{` can still match
                    i += 1;
                    continue;
                }
                let end = i + 2 + rel + 2;
                let trimmed = body.trim();
                if !trimmed.is_empty() {
                    holes.push(Hole {
                        expr: trimmed.to_string(),
                        start: i,
                        end,
                    });
                }
                i = end;
                continue;
            }
        }
        i += 1;
    }

    TemplateLayout { holes }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_has_no_holes() {
        assert!(!has_holes("just text"));
        assert!(scan("a } b { c").holes.is_empty());
    }

    #[test]
    fn extracts_single_hole() {
        let layout = scan("Hello {{ item.name }}!");
        assert_eq!(layout.holes.len(), 1);
        assert_eq!(layout.holes[0].expr, "item.name");
        assert_eq!(layout.holes[0].start, 6);
        assert_eq!(layout.holes[0].end, 21);
        assert_eq!(&"Hello {{ item.name }}!"[6..21], "{{ item.name }}");
    }

    #[test]
    fn extracts_holes_in_source_order() {
        let layout = scan("{{a}} and {{b}}");
        let exprs: Vec<&str> = layout.holes.iter().map(|h| h.expr.as_str()).collect();
        assert_eq!(exprs, ["a", "b"]);
    }

    #[test]
    fn whitespace_only_hole_is_passthrough() {
        assert!(scan("{{   }}").holes.is_empty());
        assert!(scan("{{}}").holes.is_empty());
    }

    #[test]
    fn nested_braces_disqualify_a_hole() {
        assert!(scan("{{ {a: 1} }}").holes.is_empty());
        // but a later clean hole still matches
        let layout = scan("{{ {bad} }} {{ok}}");
        assert_eq!(layout.holes.len(), 1);
        assert_eq!(layout.holes[0].expr, "ok");
    }

    #[test]
    fn body_is_non_greedy() {
        let layout = scan("{{a}} x {{b}}");
        assert_eq!(layout.holes[0].expr, "a");
    }
}
