//! End-to-end frames through `Renderer2D` and the recording device

use std::cell::RefCell;
use std::rc::Rc;

use render2d::io::PersistError;
use render2d::prelude::*;
use render2d::render::{BatchStats, PrimitiveTopology, Vertex};

fn renderer() -> (Rc<RefCell<RecordingDevice>>, Renderer2D) {
    let recorder = RecordingDevice::shared();
    let renderer = Renderer2D::new(recorder.clone(), RendererConfig::default()).unwrap();
    (recorder, renderer)
}

#[test]
fn test_mixed_frame_preserves_submission_order() {
    let (recorder, mut renderer) = renderer();

    let mut sprite = renderer.create_sprite("hero", Vec2::new(16.0, 16.0)).unwrap();
    let mut panel = renderer
        .create_rectangle("panel", RectF::new(0.0, 0.0, 40.0, 20.0), Color::BLUE, true)
        .unwrap();
    let mut hull = renderer.create_polygon("hull", PolygonType::TriangleList).unwrap();
    let triangle = [
        Vertex::new(point4(0.0, 0.0), Color::WHITE, Vec2::zeros()),
        Vertex::new(point4(10.0, 0.0), Color::WHITE, Vec2::zeros()),
        Vertex::new(point4(0.0, 10.0), Color::WHITE, Vec2::zeros()),
    ];
    hull.set_vertex_data(&triangle, 0, 0, 3).unwrap();
    let mut edge = renderer
        .create_line("edge", Vec2::zeros(), Vec2::new(5.0, 5.0), Color::RED)
        .unwrap();

    renderer.add(&mut sprite).unwrap();
    renderer.add(&mut panel).unwrap();
    renderer.add(&mut hull).unwrap();
    renderer.add(&mut edge).unwrap();
    renderer.render().unwrap();

    let device = recorder.borrow();
    let draws = device.draws();
    assert_eq!(draws.len(), 3);
    assert_eq!(draws[0].vertices.len(), 8);
    assert!(draws[1].is_resident());
    assert_eq!(draws[2].state.topology, PrimitiveTopology::LineList);
    assert_eq!(device.frames_presented(), 1);

    let stats: &BatchStats = renderer.stats();
    assert_eq!(stats.renderables, 4);
    assert_eq!(stats.flushes, 3);
    assert_eq!(stats.frames, 1);
}

#[test]
fn test_drawing_and_retained_primitives_batch_together() {
    let (recorder, mut renderer) = renderer();
    let mut sprite = renderer.create_sprite("hero", Vec2::new(8.0, 8.0)).unwrap();
    renderer.add(&mut sprite).unwrap();

    {
        let mut drawing = renderer.drawing();
        drawing.filled_rectangle(RectF::new(0.0, 0.0, 4.0, 4.0), Color::GREEN).unwrap();
        drawing.set_blending_mode(BlendingMode::Additive);
        drawing.filled_rectangle(RectF::new(4.0, 4.0, 4.0, 4.0), Color::GREEN).unwrap();
    }
    renderer.render().unwrap();

    let device = recorder.borrow();
    assert_eq!(device.draws().len(), 2);
    assert_eq!(device.draws()[0].vertices.len(), 8);
    assert_eq!(device.draws()[1].state.render.blend.blending_mode(), BlendingMode::Additive);
}

#[test]
fn test_saved_sprite_reloads_with_registered_texture() {
    let (recorder, mut renderer) = renderer();
    let texture = renderer.textures().register("atlas", 64, 32).unwrap();

    let mut original = renderer.create_sprite("ship", Vec2::new(16.0, 16.0)).unwrap();
    original.base_mut().set_deferred_texture_name(Some("atlas"));
    original.set_texture_region(RectF::new(0.5, 0.0, 0.25, 0.5));
    original.set_collider(Some(Collider::BoundingBox {
        offset: Vec2::zeros(),
        size: Vec2::new(16.0, 16.0),
    }));
    let bytes = original.save_to_bytes().unwrap();

    let mut loaded: Sprite = renderer.load_from_bytes("ship_copy", &bytes).unwrap();
    assert_eq!(loaded.base().texture(), Some(&texture));
    assert_eq!(loaded.collider(), original.collider());
    assert_eq!(loaded.base().context(), renderer.context());

    renderer.add(&mut loaded).unwrap();
    renderer.flush().unwrap();
    let device = recorder.borrow();
    assert_eq!(device.draws()[0].state.texture, Some(texture.id()));
    assert_eq!(device.draws()[0].vertices[0].uv, [0.5, 0.0]);
    assert_eq!(device.draws()[0].vertices[3].uv, [0.75, 0.5]);
}

#[test]
fn test_polygon_reloads_onto_renderer_device() {
    let (_recorder, renderer) = renderer();
    let mut fan = renderer.create_polygon("fan", PolygonType::TriangleStrip).unwrap();
    let strip: Vec<Vertex> = (0..4)
        .map(|i| Vertex::new(point4(i as f32, (i % 2) as f32), Color::WHITE, Vec2::zeros()))
        .collect();
    fan.set_vertex_data(&strip, 0, 0, strip.len()).unwrap();

    let mut stream = Vec::new();
    fan.save(&mut stream).unwrap();
    let loaded: Polygon = renderer.load("fan", stream.as_slice()).unwrap();
    assert_eq!(loaded.polygon_type(), PolygonType::TriangleStrip);
    assert_eq!(loaded.vertices(), fan.vertices());
}

#[test]
fn test_loading_wrong_kind_reports_header() {
    let (_recorder, renderer) = renderer();
    let sprite = renderer.create_sprite("ship", Vec2::new(4.0, 4.0)).unwrap();
    let bytes = sprite.save_to_bytes().unwrap();
    let result: Result<Polygon, PersistError> = renderer.load_from_bytes("ship", &bytes);
    assert!(matches!(result, Err(PersistError::InvalidHeader { .. })));
}

fn point4(x: f32, y: f32) -> render2d::foundation::math::Vec4 {
    render2d::foundation::math::Vec4::new(x, y, 0.0, 1.0)
}
