//! Snapshot export: render a session, encode it and decode it back.

use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Point, Size};
use pretty_assertions::assert_eq;
use sketchink_core::{Color, ImageFormat, SessionConfig, SessionController, SnapshotSurface};
use sketchink_render::{RasterRenderer, RenderContext, Renderer};

fn session_with_dot() -> SessionController {
    let mut session = SessionController::new(
        SessionConfig::default()
            .with_stroke_width(8.0)
            .with_stroke_color(Color::new(255, 0, 0, 255)),
    );
    session.on_pointer_down(Point::new(16.0, 16.0), 0);
    session.on_pointer_move(Point::new(17.0, 16.0));
    session.on_pointer_up();
    session
}

fn rendered(session: &SessionController) -> RasterRenderer {
    let mut renderer = RasterRenderer::new();
    let ctx = RenderContext::for_session(session, Size::new(32.0, 32.0))
        .with_background(Some(peniko::Color::WHITE));
    renderer.build_scene(&ctx);
    renderer
}

#[test]
fn nothing_rendered_means_no_snapshot() {
    let session = session_with_dot();
    let renderer = RasterRenderer::new();
    assert_eq!(session.to_base64(&renderer, None, None), None);
    assert!(session.to_image(&renderer).is_none());
}

#[test]
fn png_snapshot_decodes_to_rendered_pixels() {
    let session = session_with_dot();
    let renderer = rendered(&session);

    let encoded = session.to_base64(&renderer, None, None).expect("png snapshot");
    let bytes = STANDARD.decode(encoded).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Png);

    let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (32, 32));
    assert_eq!(decoded.get_pixel(16, 16).0, [255, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(1, 1).0, [255, 255, 255, 255]);
    assert_eq!(Some(decoded), session.to_image(&renderer));
}

#[test]
fn jpeg_and_webp_snapshots() {
    let session = session_with_dot();
    let renderer = rendered(&session);

    let jpeg = session
        .to_base64(&renderer, Some(ImageFormat::Jpeg), Some(80))
        .expect("jpeg snapshot");
    let jpeg = STANDARD.decode(jpeg).unwrap();
    assert_eq!(image::guess_format(&jpeg).unwrap(), image::ImageFormat::Jpeg);

    let webp = session
        .to_base64(&renderer, Some(ImageFormat::Webp), None)
        .expect("webp snapshot");
    let webp = STANDARD.decode(webp).unwrap();
    assert_eq!(image::guess_format(&webp).unwrap(), image::ImageFormat::WebP);
}

#[test]
fn transparent_background_without_fill() {
    let session = session_with_dot();
    let mut renderer = RasterRenderer::new();
    renderer.build_scene(&RenderContext::for_session(&session, Size::new(32.0, 32.0)));

    let image = renderer.make_image_snapshot().unwrap();
    assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 0]);
    assert_eq!(image.get_pixel(16, 16).0, [255, 0, 0, 255]);
}
