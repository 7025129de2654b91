use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const SOURCE: &str = "trash_cleaner = false\nfunc main() {\n    total = 1 + 2\n    print(total)\n}\n";

fn tracker() -> LocationTracker {
    LocationTracker::new(SourceUnit::inline(SOURCE))
}

#[test]
fn resolve_span_is_exact() {
    let start = u32::try_from(SOURCE.find("print").unwrap()).unwrap();
    let loc = tracker().resolve(Span::new(start, start + 5));
    assert_eq!(loc.line, 4);
    assert_eq!(loc.column, 5);
    assert_eq!(loc.confidence, Confidence::Exact);
}

#[test]
fn lowered_line_with_provenance_ignores_text() {
    let start = u32::try_from(SOURCE.find("total =").unwrap()).unwrap();
    let t = tracker().with_lowered(vec![
        LoweredLine {
            text: "def main():".into(),
            origin: Some(Span::new(22, 35)),
        },
        LoweredLine {
            text: "    something else entirely".into(),
            origin: Some(Span::new(start, start + 13)),
        },
    ]);
    let loc = t.resolve_lowered_line(2).unwrap();
    assert_eq!(loc.line, 3);
    assert_eq!(loc.confidence, Confidence::Exact);
    assert!(t.resolve_lowered_line(0).is_none());
    assert!(t.resolve_lowered_line(3).is_none());
}

#[test]
fn lowered_line_without_provenance_is_approximate() {
    let t = tracker().with_lowered(vec![LoweredLine {
        text: "print(total)".into(),
        origin: None,
    }]);
    let loc = t.resolve_lowered_line(1).unwrap();
    assert_eq!(loc.line, 4);
    assert_eq!(loc.column, 5);
    assert_eq!(loc.confidence, Confidence::Approximate);
    assert_eq!(t.unit().slice(loc.span), "print(total)");
}

#[test]
fn approximate_gives_up_below_threshold() {
    assert!(tracker().approximate_line_for("zzzzzzzzzzzz").is_none());
}

#[test]
fn context_window_clamps_at_edges() {
    let t = tracker();
    let ctx = t.context(1, 2);
    assert_eq!(ctx.iter().map(|c| c.number).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(ctx[0].is_focus);
    let ctx = t.context(4, 2);
    assert_eq!(ctx.first().unwrap().number, 2);
    assert_eq!(ctx.last().unwrap().number, 6);
    assert_eq!(ctx[2].text, "    print(total)");
}

#[test]
fn caret_width_uses_first_line() {
    let t = tracker();
    assert_eq!(t.caret_width(Span::new(22, 40)), 13);
    assert_eq!(t.caret_width(Span::point(3)), 1);
}

#[test]
fn out_of_range_span_clamps() {
    let t = tracker();
    let loc = t.resolve(Span::new(10_000, 10_010));
    let len = u32::try_from(SOURCE.len()).unwrap();
    assert_eq!(loc.span, Span::new(len, len));
}

proptest! {
    #[test]
    fn every_in_range_span_resolves_inside_text(start in 0u32..80, len in 0u32..10) {
        let t = tracker();
        let loc = t.resolve(Span::new(start, start + len));
        prop_assert!(loc.line as usize <= t.line_count());
        prop_assert!(loc.span.end as usize <= SOURCE.len());
    }
}
