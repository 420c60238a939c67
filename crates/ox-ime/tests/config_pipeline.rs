use core_config::{WideGlyphFallback, load_from};
use core_events::InputBuffer;
use core_ime::{CompositionMessage, ImeHost, ImeMessage, OverlayRegistry};
use core_render::{Coord, InvalidationLog, Rect, ScreenBuffer, TextAttribute};
use std::io::Write;

// Config file through to layout: a clamped chunk size and the drop fallback
// must both reach the streamer.
#[test]
fn config_file_drives_composition_layout() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    writeln!(tmp, "[ime]\nchunk_capacity = 1\nwide_glyph_fallback = \"drop\"").unwrap();
    let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
    let ime = cfg.apply_limits();
    assert_eq!(ime.chunk_capacity, 2);
    assert_eq!(ime.wide_glyph_fallback, WideGlyphFallback::Drop);

    let mut primary = ScreenBuffer::new(
        Coord::new(5, 1),
        Coord::new(8, 16),
        Coord::new(5, 1),
        TextAttribute::DEFAULT,
        TextAttribute::DEFAULT,
        25,
    )
    .unwrap();
    let mut log = InvalidationLog::new();
    let mut input = InputBuffer::new();
    let mut reg = OverlayRegistry::new(ime);
    let text: Vec<char> = "abcd中".chars().collect();
    let bytes = CompositionMessage::in_progress(text, vec![0; 5], [0x07; 8])
        .encode()
        .unwrap();
    {
        let mut host = ImeHost::new(&mut primary, &mut log, &mut input);
        reg.handle_message(&mut host, ImeMessage::Composition(bytes))
            .unwrap();
    }
    let id = reg.composition()[0];
    assert_eq!(reg.composition().len(), 1);
    assert_eq!(reg.overlay(id).unwrap().view_rect(), Rect::new(0, 0, 3, 0));
    assert_eq!(reg.composite_text(&primary, 0), "abcd");
}

#[test]
fn unreadable_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_from(Some(dir.path().join("missing.toml"))).unwrap();
    let ime = cfg.apply_limits();
    assert_eq!(ime.chunk_capacity, 100);
    assert_eq!(ime.suggestion_width_cells, 10);
}
