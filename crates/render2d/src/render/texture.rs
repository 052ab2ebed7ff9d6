//! # Textures
//!
//! Texture handles, the name registry used to resolve deferred texture
//! references, and the typed placeholder a primitive holds until its texture
//! is available.

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;

use super::{RenderError, RenderResult};
use crate::foundation::math::{RectF, Vec2};

/// Identifier for a registered texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

#[derive(Debug)]
struct TextureData {
    id: TextureId,
    name: String,
    width: u32,
    height: u32,
}

/// Shared handle to a texture owned by the device layer
///
/// Cloning is cheap; equality compares identity.
#[derive(Debug, Clone)]
pub struct Texture(Rc<TextureData>);

impl Texture {
    /// Identifier
    pub fn id(&self) -> TextureId {
        self.0.id
    }

    /// Name the texture was registered under
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.0.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.0.height
    }

    /// Size in pixels
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.0.width as f32, self.0.height as f32)
    }

    /// Convert a pixel-space rectangle into texture space
    pub fn to_texel_space(&self, pixels: RectF) -> RectF {
        let size = self.size();
        if size.x <= 0.0 || size.y <= 0.0 {
            return RectF::unit();
        }
        RectF::new(pixels.x / size.x, pixels.y / size.y, pixels.width / size.x, pixels.height / size.y)
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Texture {}

/// Texture lookup by name
pub trait TextureLookup {
    /// Find a texture by name, ignoring case; the first registered match wins
    fn find_texture(&self, name: &str) -> Option<Texture>;
}

/// Registry of named textures
///
/// Registration order is preserved so duplicate names resolve to the
/// earliest entry.
#[derive(Debug)]
pub struct TextureRegistry {
    textures: RefCell<Vec<Texture>>,
    next_id: Cell<u32>,
}

impl TextureRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            textures: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Register a texture with known dimensions
    pub fn register(&self, name: impl Into<String>, width: u32, height: u32) -> RenderResult<Texture> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RenderError::InvalidArgument("texture name must not be empty".to_string()));
        }

        let id = TextureId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let texture = Texture(Rc::new(TextureData { id, name, width, height }));
        log::debug!("Registered texture '{}' ({}x{}) as {:?}", texture.name(), width, height, id);
        self.textures.borrow_mut().push(texture.clone());
        Ok(texture)
    }

    /// Register a texture, reading its dimensions from an image file
    pub fn load_from_file(&self, name: impl Into<String>, path: impl AsRef<Path>) -> RenderResult<Texture> {
        let path = path.as_ref();
        let (width, height) = image::image_dimensions(path)
            .map_err(|e| RenderError::TextureLoad(format!("{}: {e}", path.display())))?;
        self.register(name, width, height)
    }

    /// Remove every texture registered under `name` (ignoring case)
    pub fn unregister(&self, name: &str) -> usize {
        let mut textures = self.textures.borrow_mut();
        let before = textures.len();
        textures.retain(|t| !t.name().eq_ignore_ascii_case(name));
        before - textures.len()
    }

    /// Number of registered textures
    pub fn len(&self) -> usize {
        self.textures.borrow().len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.textures.borrow().is_empty()
    }
}

impl Default for TextureRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureLookup for TextureRegistry {
    fn find_texture(&self, name: &str) -> Option<Texture> {
        self.textures
            .borrow()
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
            .cloned()
    }
}

/// Texture reference held by a primitive
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeferredTexture {
    /// No texture
    #[default]
    None,
    /// Named texture not yet available from the lookup
    Pending(String),
    /// Texture resolved and bound
    Bound(Texture),
}

impl DeferredTexture {
    /// Bound texture, if any
    pub fn texture(&self) -> Option<&Texture> {
        match self {
            Self::Bound(texture) => Some(texture),
            _ => None,
        }
    }

    /// Name of the referenced texture, pending or bound
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Pending(name) => Some(name),
            Self::Bound(texture) => Some(texture.name()),
        }
    }

    /// Whether a named reference is still waiting on the lookup
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Try to bind a pending reference; returns true when a texture was bound
    pub fn resolve(&mut self, lookup: &dyn TextureLookup) -> bool {
        let Self::Pending(name) = self else {
            return false;
        };
        match lookup.find_texture(name) {
            Some(texture) => {
                log::debug!("Resolved deferred texture '{name}'");
                *self = Self::Bound(texture);
                true
            }
            None => false,
        }
    }
}

impl From<Option<Texture>> for DeferredTexture {
    fn from(texture: Option<Texture>) -> Self {
        texture.map_or(Self::None, Self::Bound)
    }
}
