//! Swapchain, image view, and framebuffer management.

use ash::vk;

use crate::device::{DeviceContext, QueueFamilyRoles, SwapchainSupport};
use crate::error::{GpuError, Result};
use crate::surface::SurfaceContext;

/// Pick the surface format: 8-bit BGRA with nonlinear sRGB when offered,
/// otherwise whatever the surface lists first.
#[must_use]
pub fn choose_surface_format(available: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
    available
        .iter()
        .copied()
        .find(|format| {
            format.format == vk::Format::B8G8R8A8_SRGB
                && format.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .unwrap_or(available[0])
}

/// Pick the present mode: mailbox when offered, otherwise the first listed
/// mode. FIFO is always reported, so the fallback always exists.
#[must_use]
pub fn choose_present_mode(available: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    available
        .iter()
        .copied()
        .find(|&mode| mode == vk::PresentModeKHR::MAILBOX)
        .unwrap_or(available[0])
}

/// One more image than the minimum, clamped when the surface caps the count.
#[must_use]
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let mut count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 && count > capabilities.max_image_count {
        count = capabilities.max_image_count;
    }
    count
}

/// The swapchain with its parallel image, view, and framebuffer arrays.
///
/// Images belong to the swapchain; views and framebuffers belong to this
/// bundle and are destroyed individually on drop. Framebuffers are filled in
/// by [`create_framebuffers`](Self::create_framebuffers) once a render pass
/// exists.
pub struct SwapchainBundle {
    device: ash::Device,
    loader: ash::khr::swapchain::Device,
    swapchain: vk::SwapchainKHR,
    pub format: vk::Format,
    pub extent: vk::Extent2D,
    pub images: Vec<vk::Image>,
    pub image_views: Vec<vk::ImageView>,
    pub framebuffers: Vec<vk::Framebuffer>,
}

impl SwapchainBundle {
    /// Create the swapchain and its image views.
    ///
    /// The extent is the surface's current extent, taken verbatim. Sharing
    /// is concurrent across the distinct role families; when every role
    /// aliases one family the image is exclusive to it, as the API requires
    /// at least two families for concurrent mode.
    pub fn new(
        instance: &ash::Instance,
        device: &DeviceContext,
        surface: &SurfaceContext,
        support: &SwapchainSupport,
        roles: &QueueFamilyRoles,
    ) -> Result<Self> {
        let surface_format = choose_surface_format(&support.formats);
        let present_mode = choose_present_mode(&support.present_modes);
        let extent = support.capabilities.current_extent;
        let image_count = choose_image_count(&support.capabilities);

        let family_indices = roles.unique_indices();
        let sharing_mode = if family_indices.len() > 1 {
            vk::SharingMode::CONCURRENT
        } else {
            vk::SharingMode::EXCLUSIVE
        };

        let create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface.handle())
            .min_image_count(image_count)
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(sharing_mode)
            .queue_family_indices(&family_indices)
            .pre_transform(support.capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true);

        let loader = ash::khr::swapchain::Device::new(instance, device.device());

        // SAFETY: Surface and device are valid; create info references live
        // locals.
        let swapchain = unsafe { loader.create_swapchain(&create_info, None) }
            .map_err(GpuError::SwapchainCreation)?;

        // From here on the bundle owns the handles; an error below drops it
        // and releases whatever was created.
        let mut bundle = Self {
            device: device.device().clone(),
            loader,
            swapchain,
            format: surface_format.format,
            extent,
            images: Vec::new(),
            image_views: Vec::new(),
            framebuffers: Vec::new(),
        };

        // SAFETY: The swapchain was just created.
        bundle.images = unsafe { bundle.loader.get_swapchain_images(swapchain) }?;

        tracing::info!(
            "Swapchain created: {}x{}, {} images, {:?}/{:?}",
            extent.width,
            extent.height,
            bundle.images.len(),
            surface_format.format,
            present_mode
        );

        bundle.create_image_views()?;
        Ok(bundle)
    }

    fn create_image_views(&mut self) -> Result<()> {
        for &image in &self.images {
            let view_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(self.format)
                .components(vk::ComponentMapping::default())
                .subresource_range(
                    vk::ImageSubresourceRange::default()
                        .aspect_mask(vk::ImageAspectFlags::COLOR)
                        .base_mip_level(0)
                        .level_count(1)
                        .base_array_layer(0)
                        .layer_count(1),
                );

            // SAFETY: Image comes from this swapchain. Views already pushed
            // are released by Drop if this creation fails.
            let view = unsafe { self.device.create_image_view(&view_info, None) }
                .map_err(GpuError::ImageViewCreation)?;
            self.image_views.push(view);
        }
        Ok(())
    }

    /// Create one framebuffer per image view against `render_pass`.
    pub fn create_framebuffers(&mut self, render_pass: vk::RenderPass) -> Result<()> {
        for &view in &self.image_views {
            let attachments = [view];
            let framebuffer_info = vk::FramebufferCreateInfo::default()
                .render_pass(render_pass)
                .attachments(&attachments)
                .width(self.extent.width)
                .height(self.extent.height)
                .layers(1);

            // SAFETY: Render pass and view are valid. Framebuffers already
            // pushed are released by Drop if this creation fails.
            let framebuffer = unsafe { self.device.create_framebuffer(&framebuffer_info, None) }
                .map_err(GpuError::FramebufferCreation)?;
            self.framebuffers.push(framebuffer);
        }
        Ok(())
    }

    /// Acquire the next presentable image.
    ///
    /// Returns the image index and whether the swapchain is suboptimal.
    /// An out-of-date swapchain reports [`GpuError::SwapchainOutOfDate`];
    /// no image was acquired in that case.
    pub fn acquire_next_image(&self, signal: vk::Semaphore) -> Result<(u32, bool)> {
        // SAFETY: Swapchain and semaphore are valid.
        let result = unsafe {
            self.loader
                .acquire_next_image(self.swapchain, u64::MAX, signal, vk::Fence::null())
        };

        match result {
            Ok((index, suboptimal)) => Ok((index, suboptimal)),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Err(GpuError::SwapchainOutOfDate),
            Err(e) => Err(GpuError::from(e)),
        }
    }

    /// Present `image_index` on `queue` after `wait` signals.
    ///
    /// Returns `true` when the swapchain should be recreated (suboptimal or
    /// out of date); presenting continues to best effort either way.
    pub fn present(&self, queue: vk::Queue, image_index: u32, wait: vk::Semaphore) -> Result<bool> {
        let wait_semaphores = [wait];
        let swapchains = [self.swapchain];
        let image_indices = [image_index];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        // SAFETY: Queue and swapchain are valid; the info references live
        // locals.
        let result = unsafe { self.loader.queue_present(queue, &present_info) };

        match result {
            Ok(suboptimal) => Ok(suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(true),
            Err(e) => Err(GpuError::from(e)),
        }
    }

    /// The swapchain handle.
    pub fn handle(&self) -> vk::SwapchainKHR {
        self.swapchain
    }

    /// Number of images in the chain.
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

impl Drop for SwapchainBundle {
    fn drop(&mut self) {
        // SAFETY: The renderer waits for device idle before teardown.
        unsafe {
            for &framebuffer in &self.framebuffers {
                self.device.destroy_framebuffer(framebuffer, None);
            }
            for &view in &self.image_views {
                self.device.destroy_image_view(view, None);
            }
            self.loader.destroy_swapchain(self.swapchain, None);
        }
        tracing::trace!("Swapchain destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format,
            color_space,
        }
    }

    #[test]
    fn preferred_format_wins_when_offered() {
        let formats = [
            format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        let chosen = choose_surface_format(&formats);
        assert_eq!(chosen.format, vk::Format::B8G8R8A8_SRGB);
        assert_eq!(chosen.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);
    }

    #[test]
    fn format_falls_back_to_first() {
        let formats = [
            format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::R16G16B16A16_SFLOAT, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        assert_eq!(choose_surface_format(&formats), formats[0]);
    }

    #[test]
    fn srgb_format_in_wrong_color_space_is_not_preferred() {
        let formats = [
            format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT),
        ];
        assert_eq!(choose_surface_format(&formats), formats[0]);
    }

    #[test]
    fn mailbox_wins_at_any_position() {
        let modes = [
            vk::PresentModeKHR::FIFO,
            vk::PresentModeKHR::IMMEDIATE,
            vk::PresentModeKHR::MAILBOX,
        ];
        assert_eq!(choose_present_mode(&modes), vk::PresentModeKHR::MAILBOX);
    }

    #[test]
    fn present_mode_falls_back_to_first() {
        let modes = [vk::PresentModeKHR::FIFO_RELAXED, vk::PresentModeKHR::FIFO];
        assert_eq!(choose_present_mode(&modes), vk::PresentModeKHR::FIFO_RELAXED);
    }

    #[test]
    fn image_count_is_min_plus_one() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 8,
            ..Default::default()
        };
        assert_eq!(choose_image_count(&capabilities), 3);
    }

    #[test]
    fn image_count_respects_the_cap() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 3,
            max_image_count: 3,
            ..Default::default()
        };
        assert_eq!(choose_image_count(&capabilities), 3);
    }

    #[test]
    fn zero_max_means_uncapped() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 4,
            max_image_count: 0,
            ..Default::default()
        };
        assert_eq!(choose_image_count(&capabilities), 5);
    }
}
