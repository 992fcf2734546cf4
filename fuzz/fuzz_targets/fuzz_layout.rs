#![no_main]

//! Layout parser fuzzer.
//!
//! Arbitrary text must either be rejected with a `LayoutError` or parse into
//! a layout that renders back to an equivalent layout.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mazectf::game::{check_invariants, Layout, Universe};

/// Structured input for layout fuzzing.
#[derive(Arbitrary, Debug)]
struct LayoutInput {
    /// Raw layout text.
    text: String,
    /// Requested bot count.
    bots: u8,
}

fuzz_target!(|input: LayoutInput| {
    // Keep grids small to bound runtime
    if input.text.len() > 4096 {
        return;
    }
    let bots = usize::from(input.bots % 12);

    let Ok(layout) = Layout::parse(&input.text, bots) else {
        return;
    };

    // Rendering and re-parsing is stable
    let rendered = layout.to_string();
    let reparsed = Layout::parse(&rendered, bots).expect("rendered layout must parse");
    assert_eq!(reparsed, layout);
    assert_eq!(reparsed.to_string(), rendered);

    if bots >= 2 {
        let universe = Universe::from_layout(layout);
        let violations = check_invariants(&universe);
        assert!(
            violations.is_empty(),
            "Invariants violated on fresh universe: {:?}",
            violations
        );
    }
});
