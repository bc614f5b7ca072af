/*!
 * Unit tests for the overlay registry
 */

use serde_json::Map;

use veditai::overlay::{OverlayKind, OverlayPayload, OverlayRegistry, OverlayWindows};

use crate::common::sample_transcript;

fn visual(keyword: &str) -> OverlayPayload {
    OverlayPayload::Visual {
        keyword: keyword.to_string(),
        img_style: None,
        asset_url: None,
        props: Map::new(),
    }
}

fn hud(title: &str) -> OverlayPayload {
    OverlayPayload::Hud {
        title: title.to_string(),
        content: "content".to_string(),
    }
}

fn camera() -> OverlayPayload {
    OverlayPayload::Camera {
        move_type: "zoom_in".to_string(),
        intensity: Some(1.5),
    }
}

fn text(content: &str) -> OverlayPayload {
    OverlayPayload::Text {
        text_content: content.to_string(),
        props: Map::new(),
    }
}

#[test]
fn test_windows_defaults_shouldMatchDocumentedLengths() {
    let windows = OverlayWindows::default();

    assert_eq!(windows.window_for(OverlayKind::Visual), 5.0);
    assert_eq!(windows.window_for(OverlayKind::Text), 5.0);
    assert_eq!(windows.window_for(OverlayKind::Hud), 4.0);
    assert_eq!(windows.window_for(OverlayKind::Camera), 3.0);
    assert_eq!(windows.hud_chain_gap_secs, 1.0);
}

#[test]
fn test_append_unresolvedFirstVisual_shouldGetLegacySentinelWindow() {
    let mut registry = OverlayRegistry::new();
    let windows = OverlayWindows::default();

    // No previous overlay to chain after: falls back to (0, default)
    let event = registry
        .append(visual("cat"), "no such phrase here", &sample_transcript(), &windows)
        .clone();

    assert_eq!(event.start, 0.0);
    assert_eq!(event.end, 5.0);
}

#[test]
fn test_append_resolvedCamera_shouldUseThreeSecondWindow() {
    let mut registry = OverlayRegistry::new();
    let windows = OverlayWindows::default();

    let event = registry
        .append(camera(), "rust", &sample_transcript(), &windows)
        .clone();

    assert!((event.end - event.start - 3.0).abs() < 1e-9);
}

#[test]
fn test_append_threeUnresolvedVisuals_shouldChainSequentially() {
    let mut registry = OverlayRegistry::new();
    let windows = OverlayWindows::default();
    let transcript = sample_transcript();

    let first = registry
        .append(visual("a"), "qqqq zzzz", &transcript, &windows)
        .clone();
    let second = registry
        .append(visual("b"), "qqqq zzzz", &transcript, &windows)
        .clone();
    let third = registry
        .append(visual("c"), "qqqq zzzz", &transcript, &windows)
        .clone();

    assert_eq!((first.start, first.end), (0.0, 5.0));
    assert_eq!((second.start, second.end), (5.0, 10.0));
    assert_eq!((third.start, third.end), (10.0, 15.0));
}

#[test]
fn test_append_unresolvedHuds_shouldChainWithOneSecondGap() {
    let mut registry = OverlayRegistry::new();
    let windows = OverlayWindows::default();
    let transcript = sample_transcript();

    let first = registry
        .append(hud("one"), "qqqq zzzz", &transcript, &windows)
        .clone();
    let second = registry
        .append(hud("two"), "qqqq zzzz", &transcript, &windows)
        .clone();

    assert_eq!((first.start, first.end), (0.0, 4.0));
    assert_eq!((second.start, second.end), (5.0, 9.0));
}

#[test]
fn test_append_kindsChainIndependently() {
    let mut registry = OverlayRegistry::new();
    let windows = OverlayWindows::default();
    let transcript = sample_transcript();

    registry.append(visual("a"), "qqqq zzzz", &transcript, &windows);
    let text_event = registry
        .append(text("hi"), "qqqq zzzz", &transcript, &windows)
        .clone();

    // The text list is empty, so the text overlay does not chain after the
    // visual one
    assert_eq!(text_event.start, 0.0);
}

#[test]
fn test_append_idsAreOneBasedStringsPerKind() {
    let mut registry = OverlayRegistry::new();
    let windows = OverlayWindows::default();
    let transcript = sample_transcript();

    registry.append(visual("a"), "hello", &transcript, &windows);
    registry.append(visual("b"), "hello", &transcript, &windows);
    registry.append(camera(), "hello", &transcript, &windows);
    registry.append(text("t"), "hello", &transcript, &windows);

    let ids: Vec<String> = registry
        .list(OverlayKind::Visual)
        .iter()
        .map(|e| e.id.clone())
        .collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(registry.list(OverlayKind::Camera)[0].id, "1");
    assert_eq!(registry.list(OverlayKind::Text)[0].id, "1");
}

#[test]
fn test_registry_serdeRoundTrip_shouldPreserveOrder() {
    let mut registry = OverlayRegistry::new();
    let windows = OverlayWindows::default();
    let transcript = sample_transcript();

    registry.append(visual("first"), "hello", &transcript, &windows);
    registry.append(visual("second"), "qqqq zzzz", &transcript, &windows);
    registry.append(hud("card"), "rust", &transcript, &windows);

    let json = serde_json::to_string(&registry).unwrap();
    let restored: OverlayRegistry = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, registry);
}
