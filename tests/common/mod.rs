//! Shared fixture builders for the integration tests.
//!
//! Captures are what a language query would emit: scope captures carry the
//! full construct text so body extraction has something to scan; ends are
//! computed from the text so fixtures cannot drift out of sync.
#![allow(dead_code)] // not every test binary uses every helper

use clew::{Capture, CaptureKind, CaptureMeta, FileId, LineCol, Location};

pub fn loc(file: FileId, start: (u32, u32), end: (u32, u32)) -> Location {
    Location::new(
        file,
        LineCol::new(start.0, start.1),
        LineCol::new(end.0, end.1),
    )
}

/// End position of `text` when it starts at `start`.
pub fn end_of(text: &str, start: (u32, u32)) -> (u32, u32) {
    let (mut line, mut col) = start;
    for c in text.chars() {
        if c == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// A scope capture spanning exactly `text`, starting at `start`.
pub fn scope(
    file: FileId,
    kind: CaptureKind,
    name: &str,
    text: &str,
    start: (u32, u32),
) -> Capture {
    Capture::new(kind, name, loc(file, start, end_of(text, start))).with_text(text)
}

/// A definition capture spanning exactly `text`, starting at `start`.
pub fn def(
    file: FileId,
    kind: CaptureKind,
    name: &str,
    text: &str,
    start: (u32, u32),
) -> Capture {
    Capture::new(kind, name, loc(file, start, end_of(text, start)))
}

pub fn exported(cap: Capture) -> Capture {
    let mut meta = cap.meta.clone();
    meta.is_exported = true;
    cap.with_meta(meta)
}

pub fn import(file: FileId, name: &str, source: &str, span: ((u32, u32), (u32, u32))) -> Capture {
    Capture::new(CaptureKind::ImportDef, name, loc(file, span.0, span.1)).with_meta(CaptureMeta {
        source: Some(source.into()),
        ..Default::default()
    })
}

pub fn method_call(
    file: FileId,
    name: &str,
    receiver: &str,
    span: ((u32, u32), (u32, u32)),
) -> Capture {
    Capture::new(CaptureKind::MethodCall, name, loc(file, span.0, span.1)).with_meta(CaptureMeta {
        receiver: Some(receiver.into()),
        ..Default::default()
    })
}
