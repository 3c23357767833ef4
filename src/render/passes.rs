//! # Render Passes
//!
//! Abstract identifiers for the render buffers the host engine can compute
//! alongside the main image, their mapping to engine-side boolean toggles,
//! and the pass configuration engine.
//!
//! Pass availability varies across engine versions and builds: configuring a
//! pass the current build does not support logs a warning and skips it
//! instead of failing the render.

use std::collections::BTreeSet;

use crate::engine::PassToggles;

/// Render-layer channels holding raw integer indices. These get the
/// dedicated 16-bit output path in the compositor graph.
pub const INDEX_CHANNELS: [&str; 2] = ["IndexOB", "IndexMA"];

/// A render buffer the renderer can optionally compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderPass {
    // Core buffers
    /// Distance to the nearest visible surface.
    Z,
    /// Motion vectors.
    Vector,
    /// Depth mapped to the 0.0 - 1.0 range.
    Mist,
    /// World-space positions.
    Position,
    /// World-space surface normals.
    Normal,
    /// UV coordinates of each object's active UV map.
    Uv,
    /// Per-pixel object identity index. Basis for segmentation masks;
    /// forced on by the pass configuration engine.
    ObjectIndex,
    /// Per-pixel material index.
    MaterialIndex,
    Shadow,

    // Lighting / surface components
    AmbientOcclusion,
    Emission,
    Environment,
    ShadowCatcher,

    // Diffuse components
    DiffuseColor,
    DiffuseDirect,
    DiffuseIndirect,

    // Glossy components
    GlossyColor,
    GlossyDirect,
    GlossyIndirect,

    // Transmission components
    TransmissionColor,
    TransmissionDirect,
    TransmissionIndirect,

    // Cryptomatte passes
    CryptoObject,
    CryptoMaterial,
    CryptoAsset,
}

impl RenderPass {
    /// Every pass the framework knows about, in declaration order.
    pub const ALL: [RenderPass; 25] = [
        RenderPass::Z,
        RenderPass::Vector,
        RenderPass::Mist,
        RenderPass::Position,
        RenderPass::Normal,
        RenderPass::Uv,
        RenderPass::ObjectIndex,
        RenderPass::MaterialIndex,
        RenderPass::Shadow,
        RenderPass::AmbientOcclusion,
        RenderPass::Emission,
        RenderPass::Environment,
        RenderPass::ShadowCatcher,
        RenderPass::DiffuseColor,
        RenderPass::DiffuseDirect,
        RenderPass::DiffuseIndirect,
        RenderPass::GlossyColor,
        RenderPass::GlossyDirect,
        RenderPass::GlossyIndirect,
        RenderPass::TransmissionColor,
        RenderPass::TransmissionDirect,
        RenderPass::TransmissionIndirect,
        RenderPass::CryptoObject,
        RenderPass::CryptoMaterial,
        RenderPass::CryptoAsset,
    ];

    /// Stable pass name used in metadata documents.
    pub fn name(&self) -> &'static str {
        match self {
            RenderPass::Z => "Z",
            RenderPass::Vector => "Vector",
            RenderPass::Mist => "Mist",
            RenderPass::Position => "Position",
            RenderPass::Normal => "Normal",
            RenderPass::Uv => "UV",
            RenderPass::ObjectIndex => "ObjectIndex",
            RenderPass::MaterialIndex => "MaterialIndex",
            RenderPass::Shadow => "Shadow",
            RenderPass::AmbientOcclusion => "AO",
            RenderPass::Emission => "Emission",
            RenderPass::Environment => "Environment",
            RenderPass::ShadowCatcher => "ShadowCatcher",
            RenderPass::DiffuseColor => "DiffuseColor",
            RenderPass::DiffuseDirect => "DiffuseDirect",
            RenderPass::DiffuseIndirect => "DiffuseIndirect",
            RenderPass::GlossyColor => "GlossyColor",
            RenderPass::GlossyDirect => "GlossyDirect",
            RenderPass::GlossyIndirect => "GlossyIndirect",
            RenderPass::TransmissionColor => "TransmissionColor",
            RenderPass::TransmissionDirect => "TransmissionDirect",
            RenderPass::TransmissionIndirect => "TransmissionIndirect",
            RenderPass::CryptoObject => "CryptoObject",
            RenderPass::CryptoMaterial => "CryptoMaterial",
            RenderPass::CryptoAsset => "CryptoAsset",
        }
    }

    /// Name of the boolean view-layer toggle controlling this pass.
    pub fn toggle(&self) -> &'static str {
        match self {
            RenderPass::Z => "use_pass_z",
            RenderPass::Vector => "use_pass_vector",
            RenderPass::Mist => "use_pass_mist",
            RenderPass::Position => "use_pass_position",
            RenderPass::Normal => "use_pass_normal",
            RenderPass::Uv => "use_pass_uv",
            RenderPass::ObjectIndex => "use_pass_object_index",
            RenderPass::MaterialIndex => "use_pass_material_index",
            RenderPass::Shadow => "use_pass_shadow",
            RenderPass::AmbientOcclusion => "use_pass_ambient_occlusion",
            RenderPass::Emission => "use_pass_emit",
            RenderPass::Environment => "use_pass_environment",
            RenderPass::ShadowCatcher => "use_pass_shadow_catcher",
            RenderPass::DiffuseColor => "use_pass_diffuse_color",
            RenderPass::DiffuseDirect => "use_pass_diffuse_direct",
            RenderPass::DiffuseIndirect => "use_pass_diffuse_indirect",
            RenderPass::GlossyColor => "use_pass_glossy_color",
            RenderPass::GlossyDirect => "use_pass_glossy_direct",
            RenderPass::GlossyIndirect => "use_pass_glossy_indirect",
            RenderPass::TransmissionColor => "use_pass_transmission_color",
            RenderPass::TransmissionDirect => "use_pass_transmission_direct",
            RenderPass::TransmissionIndirect => "use_pass_transmission_indirect",
            RenderPass::CryptoObject => "use_pass_cryptomatte_object",
            RenderPass::CryptoMaterial => "use_pass_cryptomatte_material",
            RenderPass::CryptoAsset => "use_pass_cryptomatte_asset",
        }
    }

    /// Render-layer output channels this pass produces once enabled.
    pub fn channels(&self) -> &'static [&'static str] {
        match self {
            RenderPass::Z => &["Depth"],
            RenderPass::Vector => &["Vector"],
            RenderPass::Mist => &["Mist"],
            RenderPass::Position => &["Position"],
            RenderPass::Normal => &["Normal"],
            RenderPass::Uv => &["UV"],
            RenderPass::ObjectIndex => &["IndexOB"],
            RenderPass::MaterialIndex => &["IndexMA"],
            RenderPass::Shadow => &["Shadow"],
            RenderPass::AmbientOcclusion => &["AO"],
            RenderPass::Emission => &["Emit"],
            RenderPass::Environment => &["Env"],
            RenderPass::ShadowCatcher => &["Shadow Catcher"],
            RenderPass::DiffuseColor => &["DiffCol"],
            RenderPass::DiffuseDirect => &["DiffDir"],
            RenderPass::DiffuseIndirect => &["DiffInd"],
            RenderPass::GlossyColor => &["GlossCol"],
            RenderPass::GlossyDirect => &["GlossDir"],
            RenderPass::GlossyIndirect => &["GlossInd"],
            RenderPass::TransmissionColor => &["TransCol"],
            RenderPass::TransmissionDirect => &["TransDir"],
            RenderPass::TransmissionIndirect => &["TransInd"],
            // Cryptomatte renders at the default depth of 6, three layers each
            RenderPass::CryptoObject => &["CryptoObject00", "CryptoObject01", "CryptoObject02"],
            RenderPass::CryptoMaterial => {
                &["CryptoMaterial00", "CryptoMaterial01", "CryptoMaterial02"]
            }
            RenderPass::CryptoAsset => &["CryptoAsset00", "CryptoAsset01", "CryptoAsset02"],
        }
    }
}

/// Enable exactly the requested passes on the view layer.
///
/// Runs in three steps, in order:
/// 1. every known toggle is reset to off (clean slate, so a previously
///    enabled pass never leaks into the next configuration),
/// 2. each requested pass is enabled; passes without a toggle in the
///    current engine build are logged and skipped,
/// 3. the object-index toggle is forced on - segmentation masks depend on
///    it being present in every render.
///
/// Returns the passes that were skipped as unsupported.
pub fn configure_passes<L: PassToggles + ?Sized>(
    requested: &BTreeSet<RenderPass>,
    layer: &mut L,
) -> Vec<RenderPass> {
    for pass in RenderPass::ALL {
        if layer.has_pass_toggle(pass.toggle()) {
            layer.set_pass_toggle(pass.toggle(), false);
        }
    }

    let mut skipped = Vec::new();
    for pass in requested {
        if layer.has_pass_toggle(pass.toggle()) {
            layer.set_pass_toggle(pass.toggle(), true);
        } else {
            log::warn!("unknown or unsupported pass '{}' - skipped", pass.name());
            skipped.push(*pass);
        }
    }

    // Object-index is mandatory regardless of the requested set
    layer.set_pass_toggle(RenderPass::ObjectIndex.toggle(), true);

    skipped
}

/// Render-layer output channels available after [`configure_passes`]:
/// the combined image and alpha, then one entry per enabled pass channel.
/// `IndexOB` is always present because the object-index pass is forced.
pub fn enabled_channels(requested: &BTreeSet<RenderPass>) -> Vec<&'static str> {
    let mut channels = vec!["Image", "Alpha"];
    for pass in RenderPass::ALL {
        if requested.contains(&pass) || pass == RenderPass::ObjectIndex {
            channels.extend_from_slice(pass.channels());
        }
    }
    channels
}
