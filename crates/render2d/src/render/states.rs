//! # Render State Blocks
//!
//! Immutable value types describing the pipeline settings attached to each
//! primitive: blending, depth/stencil and texture sampling.
//!
//! ## Architecture
//!
//! - **BlendState**: colour/alpha factors, combine operations, write mask
//! - **DepthStencilState**: depth test/write and per-face stencil behaviour
//! - **SamplerState**: addressing, filtering and border colour
//! - **SmoothingMode / BlendingMode**: named presets inferred from, and
//!   applied to, the raw state
//!
//! Every block is `Copy` and updated through `with_*` methods that return a
//! new value. Values the pipeline cannot express (the `Unknown` sentinels,
//! colour factors on the alpha channel) leave the block unchanged and are
//! reported at `debug` level.

use bitflags::bitflags;

use super::color::Color;

macro_rules! raw_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        $vis enum $name {
            $($(#[$vmeta])* $variant = $value),+
        }

        impl $name {
            /// Integer value used by the persisted format
            pub const fn to_raw(self) -> i32 {
                self as i32
            }

            /// Decode an integer value from the persisted format
            pub const fn from_raw(value: i32) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

raw_enum! {
    /// Factor applied to a source or destination term when blending
    pub enum BlendFactor {
        /// Unsupported sentinel
        Unknown = 0,
        /// (0, 0, 0, 0)
        Zero = 1,
        /// (1, 1, 1, 1)
        One = 2,
        /// Source colour
        SourceColor = 3,
        /// 1 - source colour
        InverseSourceColor = 4,
        /// Source alpha
        SourceAlpha = 5,
        /// 1 - source alpha
        InverseSourceAlpha = 6,
        /// Destination alpha
        DestinationAlpha = 7,
        /// 1 - destination alpha
        InverseDestinationAlpha = 8,
        /// Destination colour
        DestinationColor = 9,
        /// 1 - destination colour
        InverseDestinationColor = 10,
        /// Source alpha clamped to 1 - destination alpha
        SourceAlphaSaturate = 11,
        /// Constant blend factor
        BlendFactor = 14,
        /// 1 - constant blend factor
        InverseBlendFactor = 15,
        /// Second source colour
        SecondarySourceColor = 16,
        /// 1 - second source colour
        InverseSecondarySourceColor = 17,
        /// Second source alpha
        SecondarySourceAlpha = 18,
        /// 1 - second source alpha
        InverseSecondarySourceAlpha = 19,
    }
}

impl BlendFactor {
    /// Factors that read colour channels and so cannot drive alpha blending
    pub const fn is_color_factor(self) -> bool {
        matches!(
            self,
            Self::SourceColor
                | Self::InverseSourceColor
                | Self::DestinationColor
                | Self::InverseDestinationColor
                | Self::SecondarySourceColor
                | Self::InverseSecondarySourceColor
        )
    }
}

raw_enum! {
    /// How source and destination terms are combined
    pub enum BlendOperation {
        /// Unsupported sentinel
        Unknown = 0,
        /// source + destination
        Add = 1,
        /// source - destination
        Subtract = 2,
        /// destination - source
        ReverseSubtract = 3,
        /// min(source, destination)
        Minimum = 4,
        /// max(source, destination)
        Maximum = 5,
    }
}

raw_enum! {
    /// Comparison used by depth and stencil tests
    pub enum ComparisonFunction {
        /// Unsupported sentinel
        Unknown = 0,
        /// Never pass
        Never = 1,
        /// Pass when less
        Less = 2,
        /// Pass when equal
        Equal = 3,
        /// Pass when less or equal
        LessEqual = 4,
        /// Pass when greater
        Greater = 5,
        /// Pass when not equal
        NotEqual = 6,
        /// Pass when greater or equal
        GreaterEqual = 7,
        /// Always pass
        Always = 8,
    }
}

raw_enum! {
    /// Stencil buffer update operation
    pub enum StencilOperation {
        /// Unsupported sentinel
        Unknown = 0,
        /// Keep existing value
        Keep = 1,
        /// Set to zero
        Zero = 2,
        /// Set to the reference value
        Replace = 3,
        /// Increment, clamping at the maximum
        IncrementClamp = 4,
        /// Decrement, clamping at zero
        DecrementClamp = 5,
        /// Bitwise invert
        Invert = 6,
        /// Increment with wrap
        Increment = 7,
        /// Decrement with wrap
        Decrement = 8,
    }
}

raw_enum! {
    /// Texture addressing outside the 0..1 range
    pub enum TextureAddress {
        /// Repeat
        Wrap = 1,
        /// Repeat mirrored
        Mirror = 2,
        /// Clamp to edge
        Clamp = 3,
        /// Use the border colour
        Border = 4,
        /// Mirror once then clamp
        MirrorOnce = 5,
    }
}

raw_enum! {
    /// Which triangle faces are discarded
    pub enum CullingMode {
        /// Unsupported sentinel
        Unknown = 0,
        /// Draw both faces
        None = 1,
        /// Discard front faces
        Front = 2,
        /// Discard back faces
        Back = 3,
    }
}

impl Default for CullingMode {
    fn default() -> Self {
        Self::Back
    }
}

bitflags! {
    /// Sampling filter flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureFilter: i32 {
        /// Point minification
        const MIN_POINT = 1;
        /// Point magnification
        const MAG_POINT = 2;
        /// Linear minification
        const MIN_LINEAR = 4;
        /// Linear magnification
        const MAG_LINEAR = 8;
        /// Point mip selection
        const MIP_POINT = 16;
        /// Linear mip blending
        const MIP_LINEAR = 32;
        /// Comparison filtering
        const COMPARISON = 64;
        /// Anisotropic filtering
        const ANISOTROPIC = 65536;
        /// Point sampling everywhere
        const POINT = Self::MIN_POINT.bits() | Self::MAG_POINT.bits() | Self::MIP_POINT.bits();
        /// Linear sampling everywhere
        const LINEAR = Self::MIN_LINEAR.bits() | Self::MAG_LINEAR.bits() | Self::MIP_LINEAR.bits();
    }
}

bitflags! {
    /// Channels written to the render target
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorWriteMask: u8 {
        /// Red
        const RED = 1;
        /// Green
        const GREEN = 2;
        /// Blue
        const BLUE = 4;
        /// Alpha
        const ALPHA = 8;
        /// All channels
        const ALL = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits() | Self::ALPHA.bits();
    }
}

/// Named texture smoothing presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SmoothingMode {
    /// Point sampling
    None,
    /// Linear sampling
    Smooth,
    /// Linear minification with linear mips
    SmoothMinify,
    /// Linear magnification with linear mips
    SmoothMagnify,
    /// Any other filter combination
    Custom,
}

impl SmoothingMode {
    /// Preset matching a raw filter
    pub fn from_filter(filter: TextureFilter) -> Self {
        if filter == TextureFilter::POINT {
            Self::None
        } else if filter == TextureFilter::LINEAR {
            Self::Smooth
        } else if filter == TextureFilter::MIN_LINEAR | TextureFilter::MIP_LINEAR {
            Self::SmoothMinify
        } else if filter == TextureFilter::MAG_LINEAR | TextureFilter::MIP_LINEAR {
            Self::SmoothMagnify
        } else {
            Self::Custom
        }
    }

    /// Raw filter for this preset, `None` for [`SmoothingMode::Custom`]
    pub fn filter(self) -> Option<TextureFilter> {
        match self {
            Self::None => Some(TextureFilter::POINT),
            Self::Smooth => Some(TextureFilter::LINEAR),
            Self::SmoothMinify => Some(TextureFilter::MIN_LINEAR | TextureFilter::MIP_LINEAR),
            Self::SmoothMagnify => Some(TextureFilter::MAG_LINEAR | TextureFilter::MIP_LINEAR),
            Self::Custom => None,
        }
    }
}

/// Named blending presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendingMode {
    /// Overwrite the destination
    None,
    /// Standard alpha blending
    Modulate,
    /// Additive blending
    Additive,
    /// Blending for premultiplied alpha
    PreMultiplied,
    /// Colour inversion
    Inverted,
    /// Any other factor combination
    Custom,
}

impl BlendingMode {
    /// Preset matching a source/destination factor pair
    pub fn from_factors(source: BlendFactor, destination: BlendFactor) -> Self {
        match (source, destination) {
            (BlendFactor::One, BlendFactor::Zero) => Self::None,
            (BlendFactor::SourceAlpha, BlendFactor::InverseSourceAlpha) => Self::Modulate,
            (BlendFactor::SourceAlpha, BlendFactor::One) => Self::Additive,
            (BlendFactor::One, BlendFactor::InverseSourceAlpha) => Self::PreMultiplied,
            (BlendFactor::InverseDestinationColor, BlendFactor::InverseSourceColor) => Self::Inverted,
            _ => Self::Custom,
        }
    }

    /// Source/destination factors for this preset, `None` for [`BlendingMode::Custom`]
    pub fn factors(self) -> Option<(BlendFactor, BlendFactor)> {
        match self {
            Self::None => Some((BlendFactor::One, BlendFactor::Zero)),
            Self::Modulate => Some((BlendFactor::SourceAlpha, BlendFactor::InverseSourceAlpha)),
            Self::Additive => Some((BlendFactor::SourceAlpha, BlendFactor::One)),
            Self::PreMultiplied => Some((BlendFactor::One, BlendFactor::InverseSourceAlpha)),
            Self::Inverted => Some((BlendFactor::InverseDestinationColor, BlendFactor::InverseSourceColor)),
            Self::Custom => None,
        }
    }
}

/// Blending configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendState {
    source_blend: BlendFactor,
    destination_blend: BlendFactor,
    source_alpha_blend: BlendFactor,
    destination_alpha_blend: BlendFactor,
    blend_operation: BlendOperation,
    alpha_operation: BlendOperation,
    write_mask: ColorWriteMask,
    blend_factor: Color,
}

impl Default for BlendState {
    fn default() -> Self {
        Self {
            source_blend: BlendFactor::SourceAlpha,
            destination_blend: BlendFactor::InverseSourceAlpha,
            source_alpha_blend: BlendFactor::One,
            destination_alpha_blend: BlendFactor::Zero,
            blend_operation: BlendOperation::Add,
            alpha_operation: BlendOperation::Add,
            write_mask: ColorWriteMask::ALL,
            blend_factor: Color::TRANSPARENT,
        }
    }
}

impl BlendState {
    /// Source colour factor
    pub const fn source_blend(&self) -> BlendFactor {
        self.source_blend
    }

    /// Destination colour factor
    pub const fn destination_blend(&self) -> BlendFactor {
        self.destination_blend
    }

    /// Source alpha factor
    pub const fn source_alpha_blend(&self) -> BlendFactor {
        self.source_alpha_blend
    }

    /// Destination alpha factor
    pub const fn destination_alpha_blend(&self) -> BlendFactor {
        self.destination_alpha_blend
    }

    /// Colour combine operation
    pub const fn blend_operation(&self) -> BlendOperation {
        self.blend_operation
    }

    /// Alpha combine operation
    pub const fn alpha_operation(&self) -> BlendOperation {
        self.alpha_operation
    }

    /// Channels written
    pub const fn write_mask(&self) -> ColorWriteMask {
        self.write_mask
    }

    /// Constant used by the blend-factor terms
    pub const fn blend_factor(&self) -> Color {
        self.blend_factor
    }

    /// Preset inferred from the colour factors
    pub fn blending_mode(&self) -> BlendingMode {
        BlendingMode::from_factors(self.source_blend, self.destination_blend)
    }

    /// Replace the source colour factor
    pub fn with_source_blend(mut self, factor: BlendFactor) -> Self {
        if reject_unknown_factor("source", factor) {
            return self;
        }
        self.source_blend = factor;
        self
    }

    /// Replace the destination colour factor
    pub fn with_destination_blend(mut self, factor: BlendFactor) -> Self {
        if reject_unknown_factor("destination", factor) {
            return self;
        }
        self.destination_blend = factor;
        self
    }

    /// Replace the source alpha factor
    pub fn with_source_alpha_blend(mut self, factor: BlendFactor) -> Self {
        if reject_alpha_factor("source alpha", factor) {
            return self;
        }
        self.source_alpha_blend = factor;
        self
    }

    /// Replace the destination alpha factor
    pub fn with_destination_alpha_blend(mut self, factor: BlendFactor) -> Self {
        if reject_alpha_factor("destination alpha", factor) {
            return self;
        }
        self.destination_alpha_blend = factor;
        self
    }

    /// Replace the colour combine operation
    pub fn with_blend_operation(mut self, operation: BlendOperation) -> Self {
        if operation == BlendOperation::Unknown {
            log::debug!("Ignoring unknown blend operation");
            return self;
        }
        self.blend_operation = operation;
        self
    }

    /// Replace the alpha combine operation
    pub fn with_alpha_operation(mut self, operation: BlendOperation) -> Self {
        if operation == BlendOperation::Unknown {
            log::debug!("Ignoring unknown alpha blend operation");
            return self;
        }
        self.alpha_operation = operation;
        self
    }

    /// Replace the write mask
    pub const fn with_write_mask(mut self, mask: ColorWriteMask) -> Self {
        self.write_mask = mask;
        self
    }

    /// Replace the blend constant
    pub const fn with_blend_factor(mut self, factor: Color) -> Self {
        self.blend_factor = factor;
        self
    }

    /// Apply a named preset; [`BlendingMode::Custom`] leaves the state unchanged
    pub fn with_blending_mode(mut self, mode: BlendingMode) -> Self {
        if let Some((source, destination)) = mode.factors() {
            self.source_blend = source;
            self.destination_blend = destination;
        }
        self
    }
}

fn reject_unknown_factor(slot: &str, factor: BlendFactor) -> bool {
    if factor == BlendFactor::Unknown {
        log::debug!("Ignoring unknown {slot} blend factor");
        return true;
    }
    false
}

fn reject_alpha_factor(slot: &str, factor: BlendFactor) -> bool {
    if factor == BlendFactor::Unknown || factor.is_color_factor() {
        log::debug!("Ignoring {factor:?} as {slot} blend factor");
        return true;
    }
    false
}

/// Stencil behaviour for one triangle face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilFaceState {
    comparison: ComparisonFunction,
    depth_fail_operation: StencilOperation,
    fail_operation: StencilOperation,
    pass_operation: StencilOperation,
}

impl Default for StencilFaceState {
    fn default() -> Self {
        Self {
            comparison: ComparisonFunction::Always,
            depth_fail_operation: StencilOperation::Keep,
            fail_operation: StencilOperation::Keep,
            pass_operation: StencilOperation::Keep,
        }
    }
}

impl StencilFaceState {
    /// Stencil comparison
    pub const fn comparison(&self) -> ComparisonFunction {
        self.comparison
    }

    /// Operation when the stencil test passes but depth fails
    pub const fn depth_fail_operation(&self) -> StencilOperation {
        self.depth_fail_operation
    }

    /// Operation when the stencil test fails
    pub const fn fail_operation(&self) -> StencilOperation {
        self.fail_operation
    }

    /// Operation when both tests pass
    pub const fn pass_operation(&self) -> StencilOperation {
        self.pass_operation
    }

    /// Replace the comparison
    pub fn with_comparison(mut self, comparison: ComparisonFunction) -> Self {
        if comparison != ComparisonFunction::Unknown {
            self.comparison = comparison;
        }
        self
    }

    /// Replace the depth-fail operation
    pub fn with_depth_fail_operation(mut self, operation: StencilOperation) -> Self {
        if operation != StencilOperation::Unknown {
            self.depth_fail_operation = operation;
        }
        self
    }

    /// Replace the fail operation
    pub fn with_fail_operation(mut self, operation: StencilOperation) -> Self {
        if operation != StencilOperation::Unknown {
            self.fail_operation = operation;
        }
        self
    }

    /// Replace the pass operation
    pub fn with_pass_operation(mut self, operation: StencilOperation) -> Self {
        if operation != StencilOperation::Unknown {
            self.pass_operation = operation;
        }
        self
    }
}

/// Depth and stencil configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilState {
    depth_write_enabled: bool,
    depth_comparison: ComparisonFunction,
    depth_bias: i32,
    stencil_reference: i32,
    stencil_read_mask: u8,
    stencil_write_mask: u8,
    front_face: StencilFaceState,
    back_face: StencilFaceState,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_write_enabled: true,
            depth_comparison: ComparisonFunction::Less,
            depth_bias: 0,
            stencil_reference: 0,
            stencil_read_mask: 0xFF,
            stencil_write_mask: 0xFF,
            front_face: StencilFaceState::default(),
            back_face: StencilFaceState::default(),
        }
    }
}

impl DepthStencilState {
    /// Whether depth writes are enabled
    pub const fn depth_write_enabled(&self) -> bool {
        self.depth_write_enabled
    }

    /// Depth comparison
    pub const fn depth_comparison(&self) -> ComparisonFunction {
        self.depth_comparison
    }

    /// Depth bias
    pub const fn depth_bias(&self) -> i32 {
        self.depth_bias
    }

    /// Stencil reference value
    pub const fn stencil_reference(&self) -> i32 {
        self.stencil_reference
    }

    /// Stencil read mask
    pub const fn stencil_read_mask(&self) -> u8 {
        self.stencil_read_mask
    }

    /// Stencil write mask
    pub const fn stencil_write_mask(&self) -> u8 {
        self.stencil_write_mask
    }

    /// Front face stencil behaviour
    pub const fn front_face(&self) -> StencilFaceState {
        self.front_face
    }

    /// Back face stencil behaviour
    pub const fn back_face(&self) -> StencilFaceState {
        self.back_face
    }

    /// Enable or disable depth writes
    pub const fn with_depth_write(mut self, enabled: bool) -> Self {
        self.depth_write_enabled = enabled;
        self
    }

    /// Replace the depth comparison
    pub fn with_depth_comparison(mut self, comparison: ComparisonFunction) -> Self {
        if comparison != ComparisonFunction::Unknown {
            self.depth_comparison = comparison;
        }
        self
    }

    /// Replace the depth bias
    pub const fn with_depth_bias(mut self, bias: i32) -> Self {
        self.depth_bias = bias;
        self
    }

    /// Replace the stencil reference
    pub const fn with_stencil_reference(mut self, reference: i32) -> Self {
        self.stencil_reference = reference;
        self
    }

    /// Replace the stencil read mask
    pub const fn with_stencil_read_mask(mut self, mask: u8) -> Self {
        self.stencil_read_mask = mask;
        self
    }

    /// Replace the stencil write mask
    pub const fn with_stencil_write_mask(mut self, mask: u8) -> Self {
        self.stencil_write_mask = mask;
        self
    }

    /// Replace the front face behaviour
    pub const fn with_front_face(mut self, face: StencilFaceState) -> Self {
        self.front_face = face;
        self
    }

    /// Replace the back face behaviour
    pub const fn with_back_face(mut self, face: StencilFaceState) -> Self {
        self.back_face = face;
        self
    }
}

/// Texture sampling configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerState {
    horizontal_address: TextureAddress,
    vertical_address: TextureAddress,
    filter: TextureFilter,
    border_color: Color,
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            horizontal_address: TextureAddress::Clamp,
            vertical_address: TextureAddress::Clamp,
            filter: TextureFilter::POINT,
            border_color: Color::TRANSPARENT,
        }
    }
}

impl SamplerState {
    /// Horizontal addressing
    pub const fn horizontal_address(&self) -> TextureAddress {
        self.horizontal_address
    }

    /// Vertical addressing
    pub const fn vertical_address(&self) -> TextureAddress {
        self.vertical_address
    }

    /// Sampling filter
    pub const fn filter(&self) -> TextureFilter {
        self.filter
    }

    /// Border colour
    pub const fn border_color(&self) -> Color {
        self.border_color
    }

    /// Preset inferred from the filter
    pub fn smoothing_mode(&self) -> SmoothingMode {
        SmoothingMode::from_filter(self.filter)
    }

    /// Replace the horizontal addressing
    pub const fn with_horizontal_address(mut self, address: TextureAddress) -> Self {
        self.horizontal_address = address;
        self
    }

    /// Replace the vertical addressing
    pub const fn with_vertical_address(mut self, address: TextureAddress) -> Self {
        self.vertical_address = address;
        self
    }

    /// Replace the filter
    pub const fn with_filter(mut self, filter: TextureFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Replace the border colour
    pub const fn with_border_color(mut self, color: Color) -> Self {
        self.border_color = color;
        self
    }

    /// Apply a named preset; [`SmoothingMode::Custom`] leaves the filter unchanged
    pub fn with_smoothing_mode(mut self, mode: SmoothingMode) -> Self {
        if let Some(filter) = mode.filter() {
            self.filter = filter;
        }
        self
    }
}

/// Alpha values inside this range are rejected when alpha testing is enabled
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AlphaTestRange {
    /// Lower bound
    pub min: f32,
    /// Upper bound
    pub max: f32,
}

impl AlphaTestRange {
    /// Create a range
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Whether the range rejects nothing
    pub fn is_empty(&self) -> bool {
        self.max <= self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_defaults() {
        let blend = BlendState::default();
        assert_eq!(blend.source_blend(), BlendFactor::SourceAlpha);
        assert_eq!(blend.destination_blend(), BlendFactor::InverseSourceAlpha);
        assert_eq!(blend.source_alpha_blend(), BlendFactor::One);
        assert_eq!(blend.destination_alpha_blend(), BlendFactor::Zero);
        assert_eq!(blend.write_mask(), ColorWriteMask::ALL);
        assert_eq!(blend.blending_mode(), BlendingMode::Modulate);
    }

    #[test]
    fn test_unknown_blend_values_are_ignored() {
        let blend = BlendState::default()
            .with_source_blend(BlendFactor::Unknown)
            .with_blend_operation(BlendOperation::Unknown);
        assert_eq!(blend, BlendState::default());
    }

    #[test]
    fn test_alpha_factors_reject_color_terms() {
        let blend = BlendState::default()
            .with_source_alpha_blend(BlendFactor::SourceColor)
            .with_destination_alpha_blend(BlendFactor::InverseDestinationColor);
        assert_eq!(blend.source_alpha_blend(), BlendFactor::One);
        assert_eq!(blend.destination_alpha_blend(), BlendFactor::Zero);

        let blend = blend.with_source_alpha_blend(BlendFactor::DestinationAlpha);
        assert_eq!(blend.source_alpha_blend(), BlendFactor::DestinationAlpha);
    }

    #[test]
    fn test_blending_mode_presets_round_trip() {
        for mode in [
            BlendingMode::None,
            BlendingMode::Modulate,
            BlendingMode::Additive,
            BlendingMode::PreMultiplied,
            BlendingMode::Inverted,
        ] {
            assert_eq!(BlendState::default().with_blending_mode(mode).blending_mode(), mode);
        }

        let custom = BlendState::default().with_destination_blend(BlendFactor::DestinationAlpha);
        assert_eq!(custom.blending_mode(), BlendingMode::Custom);
        assert_eq!(custom.with_blending_mode(BlendingMode::Custom), custom);
    }

    #[test]
    fn test_smoothing_mode_presets() {
        let sampler = SamplerState::default();
        assert_eq!(sampler.smoothing_mode(), SmoothingMode::None);
        assert_eq!(sampler.with_smoothing_mode(SmoothingMode::Smooth).smoothing_mode(), SmoothingMode::Smooth);
        assert_eq!(
            sampler.with_filter(TextureFilter::MIN_LINEAR | TextureFilter::MIP_LINEAR).smoothing_mode(),
            SmoothingMode::SmoothMinify
        );
        assert_eq!(sampler.with_filter(TextureFilter::ANISOTROPIC).smoothing_mode(), SmoothingMode::Custom);
    }

    #[test]
    fn test_depth_stencil_defaults() {
        let depth = DepthStencilState::default();
        assert!(depth.depth_write_enabled());
        assert_eq!(depth.depth_comparison(), ComparisonFunction::Less);
        assert_eq!(depth.stencil_read_mask(), 0xFF);
        assert_eq!(depth.front_face().comparison(), ComparisonFunction::Always);
        assert_eq!(depth.back_face().pass_operation(), StencilOperation::Keep);
    }

    #[test]
    fn test_raw_values() {
        assert_eq!(BlendFactor::from_raw(14), Some(BlendFactor::BlendFactor));
        assert_eq!(BlendFactor::from_raw(12), None);
        assert_eq!(CullingMode::Back.to_raw(), 3);
        assert_eq!(TextureAddress::from_raw(5), Some(TextureAddress::MirrorOnce));
        assert_eq!(TextureFilter::POINT.bits(), 19);
    }
}
