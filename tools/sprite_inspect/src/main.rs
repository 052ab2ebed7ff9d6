use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, Command};
use std::path::{Path, PathBuf};

use render2d::foundation::logging;
use render2d::io::chunk::peek_header;
use render2d::io::legacy::is_legacy_sprite;
use render2d::io::{ChunkFileReader, LoadContext, Persist, POLYGON_HEADER, SPRITE_HEADER};
use render2d::render::renderable::RenderState;
use render2d::render::{Anchored, ContextId, Drawable, Polygon, RecordingDevice, RectangleCorner, Sprite, TextureMapped};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Sprite,
    LegacySprite,
    Polygon,
}

fn detect_kind(data: &[u8]) -> Result<FileKind> {
    if is_legacy_sprite(data) {
        return Ok(FileKind::LegacySprite);
    }
    match peek_header(data).as_deref() {
        Some(SPRITE_HEADER) => Ok(FileKind::Sprite),
        Some(POLYGON_HEADER) => Ok(FileKind::Polygon),
        Some(other) => bail!("Unrecognised file header {other:?}"),
        None => bail!("File is too short to hold a header"),
    }
}

fn main() -> Result<()> {
    let matches = Command::new("sprite_inspect")
        .about("Prints the geometry and render state of persisted sprites and polygons")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("Sprite or polygon file to inspect")
                .required(true),
        )
        .arg(
            Arg::new("convert")
                .short('c')
                .long("convert")
                .value_name("OUTPUT")
                .help("Re-save a legacy sprite in the current format"),
        )
        .arg(
            Arg::new("chunks")
                .long("chunks")
                .help("List the chunk directory of current-format files")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log filter used when RUST_LOG is unset")
                .default_value("warn"),
        )
        .get_matches();

    if let Some(level) = matches.get_one::<String>("log-level") {
        logging::init_with_level(level);
    }

    let path = PathBuf::from(matches.get_one::<String>("file").context("Missing input file")?);
    let data = std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let kind = detect_kind(&data)?;
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.trim().is_empty())
        .unwrap_or("inspected");

    println!("File: {}", path.display());
    println!("Format: {kind:?} ({} bytes)", data.len());

    if matches.get_flag("chunks") {
        print_chunks(kind, &data)?;
    }

    let context = LoadContext::new(ContextId::next(), RecordingDevice::shared());
    match kind {
        FileKind::Sprite | FileKind::LegacySprite => {
            let sprite: Sprite = render2d::io::load_from_bytes(&context, name, &data)
                .with_context(|| format!("Failed to load sprite from {}", path.display()))?;
            print_sprite(&sprite);
            if let Some(output) = matches.get_one::<String>("convert") {
                convert(kind, &sprite, Path::new(output))?;
            }
        }
        FileKind::Polygon => {
            let polygon: Polygon = render2d::io::load_from_bytes(&context, name, &data)
                .with_context(|| format!("Failed to load polygon from {}", path.display()))?;
            print_polygon(&polygon);
            if matches.get_one::<String>("convert").is_some() {
                bail!("Only legacy sprites can be converted");
            }
        }
    }

    Ok(())
}

fn print_chunks(kind: FileKind, data: &[u8]) -> Result<()> {
    let header = match kind {
        FileKind::Sprite => SPRITE_HEADER,
        FileKind::Polygon => POLYGON_HEADER,
        FileKind::LegacySprite => {
            println!("Chunks: none (legacy single-stream format)");
            return Ok(());
        }
    };
    let file = ChunkFileReader::open(data, header)?;
    println!("Chunks:");
    for id in file.chunk_ids() {
        println!("  {id}  {:>6} bytes", file.chunk_len(id).unwrap_or(0));
    }
    Ok(())
}

fn convert(kind: FileKind, sprite: &Sprite, output: &Path) -> Result<()> {
    if kind != FileKind::LegacySprite {
        bail!("{} is already in the current format", sprite.base().name());
    }
    if let Some(pending) = sprite.pending_pixel_region() {
        log::warn!(
            "Texture for '{}' is not loaded; pixel region {pending:?} is saved as the full texture",
            sprite.base().name()
        );
    }
    sprite
        .save_to_path(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Converted to {}", output.display());
    Ok(())
}

fn print_render_state(state: &RenderState) {
    let blend = state.blend;
    let depth = state.depth_stencil;
    let sampler = state.sampler;
    println!("Render state:");
    println!(
        "  blend: {:?} ({:?} / {:?}, alpha {:?} / {:?}, mask {:?})",
        blend.blending_mode(),
        blend.source_blend(),
        blend.destination_blend(),
        blend.source_alpha_blend(),
        blend.destination_alpha_blend(),
        blend.write_mask()
    );
    println!(
        "  depth: write={} compare={:?} bias={}",
        depth.depth_write_enabled(),
        depth.depth_comparison(),
        depth.depth_bias()
    );
    println!(
        "  stencil: ref={} read={:#04x} write={:#04x}",
        depth.stencil_reference(),
        depth.stencil_read_mask(),
        depth.stencil_write_mask()
    );
    println!(
        "  sampler: {:?} wrap=({:?}, {:?}) border={:?}",
        sampler.smoothing_mode(),
        sampler.horizontal_address(),
        sampler.vertical_address(),
        sampler.border_color()
    );
    println!("  culling: {:?}", state.culling);
    println!("  alpha test: {:.3}..{:.3}", state.alpha_test.min, state.alpha_test.max);
}

fn print_texture(name: Option<&str>) {
    match name {
        Some(name) => println!("Texture: {name}"),
        None => println!("Texture: none"),
    }
}

fn print_sprite(sprite: &Sprite) {
    let size = sprite.size();
    let anchor = sprite.anchor();
    println!("Sprite '{}'", sprite.base().name());
    println!("  size: {} x {}", size.x, size.y);
    println!("  anchor: ({}, {})", anchor.x, anchor.y);
    println!("  flip: horizontal={} vertical={}", sprite.horizontal_flip(), sprite.vertical_flip());
    for corner in RectangleCorner::ALL {
        let offset = sprite.corner_offset(corner);
        println!(
            "  {corner:?}: offset ({}, {}) colour {:#010x}",
            offset.x,
            offset.y,
            sprite.corner_color(corner).to_argb()
        );
    }
    match sprite.collider() {
        Some(collider) => println!("  collider: {} {:?}", collider.type_name(), collider.bounds()),
        None => println!("  collider: none"),
    }

    print_texture(sprite.base().deferred_texture_name());
    match sprite.pending_pixel_region() {
        Some(pixels) => println!("  region (pixels): {pixels:?}"),
        None => println!("  region: {:?}", sprite.texture_region()),
    }
    print_render_state(sprite.base().render_state());
}

fn print_polygon(polygon: &Polygon) {
    let anchor = polygon.anchor();
    println!("Polygon '{}'", polygon.base().name());
    println!("  type: {:?}", polygon.polygon_type());
    println!("  vertices: {}  indices: {}", polygon.vertex_count(), polygon.index_count());
    println!("  anchor: ({}, {})", anchor.x, anchor.y);
    println!("  colour: {:#010x}", polygon.color().to_argb());
    if let Some(bounds) = polygon.bounds() {
        println!("  bounds: {bounds:?}");
    }
    for (i, vertex) in polygon.vertices().iter().enumerate().take(8) {
        let xy = vertex.xy();
        let uv = vertex.uv();
        println!("    [{i}] ({}, {}) uv ({}, {})", xy.x, xy.y, uv.x, uv.y);
    }
    if polygon.vertex_count() > 8 {
        println!("    ... {} more", polygon.vertex_count() - 8);
    }

    print_texture(polygon.base().deferred_texture_name());
    let offset = polygon.texture_offset();
    let scale = polygon.texture_scale();
    println!("  texture offset: ({}, {}) scale: ({}, {})", offset.x, offset.y, scale.x, scale.y);
    print_render_state(polygon.base().render_state());
}
