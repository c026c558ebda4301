use ash::vk;

/// Image aspects of a Vulkan format.
///
/// Depth and stencil bits are reported as present; every other recognized
/// single-plane format is color. Returns an empty set for `UNDEFINED`,
/// multi-planar and unrecognized formats.
pub fn format_aspects(format: vk::Format) -> vk::ImageAspectFlags {
    let mut aspects = vk::ImageAspectFlags::empty();
    if has_depth(format) {
        aspects |= vk::ImageAspectFlags::DEPTH;
    }
    if has_stencil(format) {
        aspects |= vk::ImageAspectFlags::STENCIL;
    }
    if aspects.is_empty() && is_color(format) {
        aspects |= vk::ImageAspectFlags::COLOR;
    }
    aspects
}

pub fn has_depth(format: vk::Format) -> bool {
    matches!(
        format,
        vk::Format::D16_UNORM
            | vk::Format::X8_D24_UNORM_PACK32
            | vk::Format::D32_SFLOAT
            | vk::Format::D16_UNORM_S8_UINT
            | vk::Format::D24_UNORM_S8_UINT
            | vk::Format::D32_SFLOAT_S8_UINT
    )
}

pub fn has_stencil(format: vk::Format) -> bool {
    matches!(
        format,
        vk::Format::S8_UINT
            | vk::Format::D16_UNORM_S8_UINT
            | vk::Format::D24_UNORM_S8_UINT
            | vk::Format::D32_SFLOAT_S8_UINT
    )
}

pub fn is_color(format: vk::Format) -> bool {
    if has_depth(format) || has_stencil(format) {
        return false;
    }
    let raw = format.as_raw();
    // Core 1.0 formats, R4G4_UNORM_PACK8 through ASTC_12X12_SRGB_BLOCK.
    (vk::Format::R4G4_UNORM_PACK8.as_raw()..=vk::Format::ASTC_12X12_SRGB_BLOCK.as_raw()).contains(&raw)
        || (vk::Format::PVRTC1_2BPP_UNORM_BLOCK_IMG.as_raw()
            ..=vk::Format::PVRTC2_4BPP_SRGB_BLOCK_IMG.as_raw())
            .contains(&raw)
        || (vk::Format::ASTC_4X4_SFLOAT_BLOCK.as_raw()..=vk::Format::ASTC_12X12_SFLOAT_BLOCK.as_raw())
            .contains(&raw)
        || matches!(
            format,
            vk::Format::A4R4G4B4_UNORM_PACK16 | vk::Format::A4B4G4R4_UNORM_PACK16
        )
}
