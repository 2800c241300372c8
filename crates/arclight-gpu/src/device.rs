//! Physical device selection and logical device creation.

use std::collections::{BTreeSet, HashSet};
use std::ffi::CStr;

use ash::vk;

use crate::error::{GpuError, Result};
use crate::surface::SurfaceContext;

/// Queue-family index per role. A role is `None` until a family covers it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFamilyRoles {
    pub graphics: Option<u32>,
    pub transfer: Option<u32>,
    pub compute: Option<u32>,
    pub present: Option<u32>,
}

impl QueueFamilyRoles {
    /// Returns `true` when every role has a family.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.graphics.is_some()
            && self.transfer.is_some()
            && self.compute.is_some()
            && self.present.is_some()
    }

    /// The distinct family indices in use, in ascending order.
    ///
    /// Roles frequently collapse onto one family; a device must never
    /// request the same family twice.
    #[must_use]
    pub fn unique_indices(&self) -> Vec<u32> {
        let set: BTreeSet<u32> = [self.graphics, self.transfer, self.compute, self.present]
            .into_iter()
            .flatten()
            .collect();
        set.into_iter().collect()
    }
}

/// What one queue family offers, as far as role resolution cares.
#[derive(Debug, Clone, Copy)]
pub struct QueueFamilyReport {
    pub flags: vk::QueueFlags,
    pub supports_present: bool,
}

/// Resolve the four queue roles against a device's family list.
///
/// Graphics and compute take the first matching family and present takes the
/// first family the surface reports present support for. Transfer prefers
/// the family with the fewest capability bits beyond transfer itself, which
/// lands on dedicated transfer hardware when the device has it.
#[must_use]
pub fn resolve_queue_roles(families: &[QueueFamilyReport]) -> QueueFamilyRoles {
    let mut roles = QueueFamilyRoles::default();
    let mut transfer_score = u32::MAX;

    for (index, family) in families.iter().enumerate() {
        let index = index as u32;

        if roles.graphics.is_none() && family.flags.contains(vk::QueueFlags::GRAPHICS) {
            roles.graphics = Some(index);
        }

        if roles.compute.is_none() && family.flags.contains(vk::QueueFlags::COMPUTE) {
            roles.compute = Some(index);
        }

        if family.flags.contains(vk::QueueFlags::TRANSFER) {
            let extra_bits = (family.flags & !vk::QueueFlags::TRANSFER)
                .as_raw()
                .count_ones();
            if extra_bits < transfer_score {
                transfer_score = extra_bits;
                roles.transfer = Some(index);
            }
        }

        if roles.present.is_none() && family.supports_present {
            roles.present = Some(index);
        }
    }

    roles
}

/// Surface capabilities plus the supported formats and present modes.
pub struct SwapchainSupport {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SwapchainSupport {
    /// Query support for `device` against the surface.
    pub fn query(surface: &SurfaceContext, device: vk::PhysicalDevice) -> Result<Self> {
        // SAFETY: Device and surface are valid for the duration of the call.
        unsafe {
            let capabilities = surface
                .loader()
                .get_physical_device_surface_capabilities(device, surface.handle())?;
            let formats = surface
                .loader()
                .get_physical_device_surface_formats(device, surface.handle())?;
            let present_modes = surface
                .loader()
                .get_physical_device_surface_present_modes(device, surface.handle())?;

            Ok(Self {
                capabilities,
                formats,
                present_modes,
            })
        }
    }

    /// An empty format or present-mode list disqualifies the device; it is
    /// not an error.
    #[must_use]
    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

/// Device extensions the renderer cannot run without.
#[must_use]
pub fn required_device_extensions() -> Vec<&'static CStr> {
    vec![
        ash::khr::swapchain::NAME,
        #[cfg(target_os = "macos")]
        ash::khr::portability_subset::NAME,
    ]
}

/// The suitability gate, over already-queried facts.
#[must_use]
pub fn is_device_suitable(
    roles: &QueueFamilyRoles,
    support: &SwapchainSupport,
    available_extensions: &HashSet<String>,
    features: &vk::PhysicalDeviceFeatures,
) -> bool {
    if !roles.is_complete() {
        return false;
    }
    if !support.is_adequate() {
        return false;
    }

    let extensions_covered = required_device_extensions().iter().all(|name| {
        name.to_str()
            .is_ok_and(|name| available_extensions.contains(name))
    });
    if !extensions_covered {
        return false;
    }

    features.sampler_anisotropy == vk::TRUE
}

/// A physical device that passed the gate, with its cached reports.
pub struct SelectedDevice {
    pub physical_device: vk::PhysicalDevice,
    pub properties: vk::PhysicalDeviceProperties,
    pub features: vk::PhysicalDeviceFeatures,
    pub memory_properties: vk::PhysicalDeviceMemoryProperties,
    pub roles: QueueFamilyRoles,
}

impl SelectedDevice {
    /// Device name as reported by the driver.
    #[must_use]
    pub fn name(&self) -> String {
        // SAFETY: The driver fills device_name with a nul-terminated string.
        unsafe { CStr::from_ptr(self.properties.device_name.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }
}

/// Pick the first suitable physical device.
///
/// Enumeration order is the driver's; there is no scoring pass.
///
/// # Safety
/// The instance and surface must be valid.
pub unsafe fn select_physical_device(
    instance: &ash::Instance,
    surface: &SurfaceContext,
) -> Result<SelectedDevice> {
    // SAFETY: Caller guarantees a valid instance.
    let devices = unsafe { instance.enumerate_physical_devices() }?;
    if devices.is_empty() {
        return Err(GpuError::NoSuitableDevice);
    }

    for device in devices {
        // SAFETY: Handles come from the enumeration above.
        let candidate = unsafe { assess_device(instance, surface, device) }?;
        if let Some(selected) = candidate {
            tracing::info!("Selected GPU: {}", selected.name());
            return Ok(selected);
        }
    }

    Err(GpuError::NoSuitableDevice)
}

/// Run the suitability gate for one device.
///
/// # Safety
/// The instance, surface, and device must be valid.
unsafe fn assess_device(
    instance: &ash::Instance,
    surface: &SurfaceContext,
    device: vk::PhysicalDevice,
) -> Result<Option<SelectedDevice>> {
    // SAFETY: Caller guarantees valid handles.
    let reports = unsafe {
        let families = instance.get_physical_device_queue_family_properties(device);
        let mut reports = Vec::with_capacity(families.len());
        for (index, family) in families.iter().enumerate() {
            let supports_present = surface
                .loader()
                .get_physical_device_surface_support(device, index as u32, surface.handle())?;
            reports.push(QueueFamilyReport {
                flags: family.queue_flags,
                supports_present,
            });
        }
        reports
    };

    let roles = resolve_queue_roles(&reports);
    let support = SwapchainSupport::query(surface, device)?;

    // SAFETY: Device handle is valid.
    let (available_extensions, features) = unsafe {
        let extensions = instance
            .enumerate_device_extension_properties(device)?
            .iter()
            .filter_map(|ext| {
                CStr::from_ptr(ext.extension_name.as_ptr())
                    .to_str()
                    .ok()
                    .map(String::from)
            })
            .collect::<HashSet<String>>();
        (extensions, instance.get_physical_device_features(device))
    };

    if !is_device_suitable(&roles, &support, &available_extensions, &features) {
        return Ok(None);
    }

    // SAFETY: Device handle is valid.
    let (properties, memory_properties) = unsafe {
        (
            instance.get_physical_device_properties(device),
            instance.get_physical_device_memory_properties(device),
        )
    };

    Ok(Some(SelectedDevice {
        physical_device: device,
        properties,
        features,
        memory_properties,
        roles,
    }))
}

/// The logical device, one queue handle per role, and the cached physical
/// device reports.
pub struct DeviceContext {
    device: ash::Device,
    physical_device: vk::PhysicalDevice,
    properties: vk::PhysicalDeviceProperties,
    features: vk::PhysicalDeviceFeatures,
    memory_properties: vk::PhysicalDeviceMemoryProperties,
    graphics_family: u32,
    transfer_family: u32,
    compute_family: u32,
    present_family: u32,
    graphics_queue: vk::Queue,
    transfer_queue: vk::Queue,
    compute_queue: vk::Queue,
    present_queue: vk::Queue,
}

impl DeviceContext {
    /// Create the logical device for a selected physical device.
    ///
    /// One queue-create-info per distinct family; the anisotropy feature and
    /// the required extensions are enabled; one queue is fetched per role.
    ///
    /// # Safety
    /// The instance must be valid and `selected` must come from it.
    pub unsafe fn new(instance: &ash::Instance, selected: &SelectedDevice) -> Result<Self> {
        let roles = selected.roles;
        debug_assert!(roles.is_complete());

        let queue_priority = 1.0_f32;
        let queue_create_infos: Vec<vk::DeviceQueueCreateInfo> = roles
            .unique_indices()
            .into_iter()
            .map(|family| {
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(family)
                    .queue_priorities(std::slice::from_ref(&queue_priority))
            })
            .collect();

        let extension_names: Vec<*const std::ffi::c_char> = required_device_extensions()
            .iter()
            .map(|ext| ext.as_ptr())
            .collect();

        let features = vk::PhysicalDeviceFeatures::default().sampler_anisotropy(true);

        let create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&extension_names)
            .enabled_features(&features);

        // SAFETY: Caller guarantees instance validity.
        let device = unsafe {
            instance.create_device(selected.physical_device, &create_info, None)
        }
        .map_err(GpuError::DeviceCreation)?;
        tracing::trace!("Logical device created");

        let graphics_family = roles.graphics.unwrap_or_default();
        let transfer_family = roles.transfer.unwrap_or_default();
        let compute_family = roles.compute.unwrap_or_default();
        let present_family = roles.present.unwrap_or_default();

        // SAFETY: The families were requested above.
        let (graphics_queue, transfer_queue, compute_queue, present_queue) = unsafe {
            (
                device.get_device_queue(graphics_family, 0),
                device.get_device_queue(transfer_family, 0),
                device.get_device_queue(compute_family, 0),
                device.get_device_queue(present_family, 0),
            )
        };

        Ok(Self {
            device,
            physical_device: selected.physical_device,
            properties: selected.properties,
            features: selected.features,
            memory_properties: selected.memory_properties,
            graphics_family,
            transfer_family,
            compute_family,
            present_family,
            graphics_queue,
            transfer_queue,
            compute_queue,
            present_queue,
        })
    }

    /// The logical device handle.
    pub fn device(&self) -> &ash::Device {
        &self.device
    }

    /// The physical device this logical device was created from.
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// Cached physical device properties.
    pub fn properties(&self) -> &vk::PhysicalDeviceProperties {
        &self.properties
    }

    /// Cached physical device features.
    pub fn features(&self) -> &vk::PhysicalDeviceFeatures {
        &self.features
    }

    /// Cached physical device memory properties.
    pub fn memory_properties(&self) -> &vk::PhysicalDeviceMemoryProperties {
        &self.memory_properties
    }

    pub fn graphics_family(&self) -> u32 {
        self.graphics_family
    }

    pub fn transfer_family(&self) -> u32 {
        self.transfer_family
    }

    pub fn compute_family(&self) -> u32 {
        self.compute_family
    }

    pub fn present_family(&self) -> u32 {
        self.present_family
    }

    pub fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }

    pub fn transfer_queue(&self) -> vk::Queue {
        self.transfer_queue
    }

    pub fn compute_queue(&self) -> vk::Queue {
        self.compute_queue
    }

    pub fn present_queue(&self) -> vk::Queue {
        self.present_queue
    }

    /// Block until the device finishes all submitted work.
    pub fn wait_idle(&self) -> Result<()> {
        // SAFETY: The device is valid while self exists.
        unsafe {
            self.device.device_wait_idle()?;
        }
        Ok(())
    }
}

impl Drop for DeviceContext {
    fn drop(&mut self) {
        // SAFETY: The renderer drops every device-level object first and
        // waits for idle before teardown begins.
        unsafe {
            self.device.destroy_device(None);
        }
        tracing::trace!("Logical device destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(flags: vk::QueueFlags, supports_present: bool) -> QueueFamilyReport {
        QueueFamilyReport {
            flags,
            supports_present,
        }
    }

    #[test]
    fn all_roles_resolve_on_a_full_device() {
        let families = [
            family(
                vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER,
                true,
            ),
            family(vk::QueueFlags::TRANSFER, false),
        ];

        let roles = resolve_queue_roles(&families);
        assert!(roles.is_complete());
        assert_eq!(roles.graphics, Some(0));
        assert_eq!(roles.compute, Some(0));
        assert_eq!(roles.present, Some(0));
    }

    #[test]
    fn missing_role_stays_unassigned() {
        // Compute-only device with no present support anywhere.
        let families = [family(vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER, false)];

        let roles = resolve_queue_roles(&families);
        assert!(!roles.is_complete());
        assert_eq!(roles.graphics, None);
        assert_eq!(roles.present, None);
        assert_eq!(roles.compute, Some(0));
        assert_eq!(roles.transfer, Some(0));
    }

    #[test]
    fn transfer_prefers_the_leanest_family() {
        // Family 0 carries graphics+compute+transfer (two extra bits),
        // family 1 is transfer-only (zero extra bits).
        let families = [
            family(
                vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER,
                true,
            ),
            family(vk::QueueFlags::TRANSFER, false),
        ];

        let roles = resolve_queue_roles(&families);
        assert_eq!(roles.transfer, Some(1));
    }

    #[test]
    fn transfer_tie_keeps_the_first_candidate() {
        let families = [
            family(vk::QueueFlags::TRANSFER, false),
            family(vk::QueueFlags::TRANSFER, false),
        ];

        let roles = resolve_queue_roles(&families);
        assert_eq!(roles.transfer, Some(0));
    }

    #[test]
    fn unique_indices_deduplicate_aliased_roles() {
        let roles = QueueFamilyRoles {
            graphics: Some(0),
            transfer: Some(1),
            compute: Some(0),
            present: Some(0),
        };
        assert_eq!(roles.unique_indices(), vec![0, 1]);
    }

    #[test]
    fn zero_formats_disqualify_regardless_of_roles() {
        let roles = QueueFamilyRoles {
            graphics: Some(0),
            transfer: Some(0),
            compute: Some(0),
            present: Some(0),
        };
        let support = SwapchainSupport {
            capabilities: vk::SurfaceCapabilitiesKHR::default(),
            formats: Vec::new(),
            present_modes: vec![vk::PresentModeKHR::FIFO],
        };
        let extensions: HashSet<String> = required_device_extensions()
            .iter()
            .map(|name| name.to_str().unwrap().to_owned())
            .collect();
        let features = vk::PhysicalDeviceFeatures::default().sampler_anisotropy(true);

        assert!(!is_device_suitable(&roles, &support, &extensions, &features));
    }

    #[test]
    fn suitability_requires_every_gate() {
        let roles = QueueFamilyRoles {
            graphics: Some(0),
            transfer: Some(0),
            compute: Some(0),
            present: Some(0),
        };
        let support = SwapchainSupport {
            capabilities: vk::SurfaceCapabilitiesKHR::default(),
            formats: vec![vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            }],
            present_modes: vec![vk::PresentModeKHR::FIFO],
        };
        let extensions: HashSet<String> = required_device_extensions()
            .iter()
            .map(|name| name.to_str().unwrap().to_owned())
            .collect();
        let features = vk::PhysicalDeviceFeatures::default().sampler_anisotropy(true);

        assert!(is_device_suitable(&roles, &support, &extensions, &features));

        // No anisotropy
        let no_anisotropy = vk::PhysicalDeviceFeatures::default();
        assert!(!is_device_suitable(
            &roles,
            &support,
            &extensions,
            &no_anisotropy
        ));

        // Missing swapchain extension
        let no_extensions = HashSet::new();
        assert!(!is_device_suitable(
            &roles,
            &support,
            &no_extensions,
            &features
        ));

        // Incomplete roles
        let incomplete = QueueFamilyRoles {
            present: None,
            ..roles
        };
        assert!(!is_device_suitable(
            &incomplete,
            &support,
            &extensions,
            &features
        ));
    }
}
