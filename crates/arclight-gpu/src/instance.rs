//! Vulkan instance bootstrap and debug messenger.

use std::ffi::{c_char, c_void, CStr, CString};

use arclight_core::{MemoryTag, MemoryTracker, TrackedArray, ENGINE_NAME, ENGINE_VERSION};
use ash::vk;

use crate::error::{GpuError, Result};

/// The standard Khronos validation layer.
pub const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Routes validation messages to the corresponding log level.
unsafe extern "system" fn debug_callback(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut c_void,
) -> vk::Bool32 {
    // SAFETY: The driver hands us a valid callback-data pointer.
    let data = unsafe { &*callback_data };
    let message = if data.p_message.is_null() {
        "<no message>".into()
    } else {
        // SAFETY: p_message is a nul-terminated string owned by the driver.
        unsafe { CStr::from_ptr(data.p_message).to_string_lossy() }
    };

    match severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE => {
            tracing::trace!("Vulkan: {message}");
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::INFO => tracing::info!("Vulkan: {message}"),
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => tracing::warn!("Vulkan: {message}"),
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => tracing::error!("Vulkan: {message}"),
        _ => tracing::trace!("Vulkan: {message}"),
    }

    vk::FALSE
}

/// Check whether the validation layer can be enabled.
///
/// # Safety
/// The entry must be a valid Vulkan entry point.
unsafe fn is_validation_layer_supported(entry: &ash::Entry) -> bool {
    // SAFETY: Caller guarantees a valid entry.
    let layers = match unsafe { entry.enumerate_instance_layer_properties() } {
        Ok(layers) => layers,
        Err(e) => {
            tracing::warn!("Failed to enumerate instance layers: {e}");
            return false;
        }
    };

    layers.iter().any(|properties| {
        // SAFETY: Layer names are driver-provided nul-terminated strings.
        unsafe { CStr::from_ptr(properties.layer_name.as_ptr()) == VALIDATION_LAYER }
    })
}

struct DebugMessenger {
    loader: ash::ext::debug_utils::Instance,
    messenger: vk::DebugUtilsMessengerEXT,
}

/// The instance and, when debug layers are enabled, its messenger.
///
/// Dropping destroys the messenger and then the instance.
pub struct InstanceContext {
    // Entry must be kept alive for the lifetime of the instance
    entry: ash::Entry,
    instance: ash::Instance,
    debug: Option<DebugMessenger>,
}

impl InstanceContext {
    /// Load the Vulkan library and create the instance.
    ///
    /// `surface_extensions` comes from the platform layer. With
    /// `debug_layers` set, the validation layer and the debug-utils
    /// messenger are enabled when the layer is actually present; a missing
    /// layer is reported and skipped, not fatal.
    pub fn new(
        app_name: &str,
        app_version: u32,
        debug_layers: bool,
        surface_extensions: &[*const c_char],
        memory: &MemoryTracker,
    ) -> Result<Self> {
        let entry = unsafe { ash::Entry::load() }
            .map_err(|e| GpuError::Other(format!("Failed to load Vulkan: {e}")))?;

        let validation = debug_layers && unsafe { is_validation_layer_supported(&entry) };
        if debug_layers && !validation {
            tracing::warn!("Validation layer requested but not present; continuing without it");
        }

        let app_name_c = CString::new(app_name)
            .map_err(|e| GpuError::Other(format!("Invalid application name: {e}")))?;
        let engine_name_c = CString::new(ENGINE_NAME).expect("engine name is a literal");

        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name_c)
            .application_version(app_version)
            .engine_name(&engine_name_c)
            .engine_version(vk::make_api_version(
                0,
                ENGINE_VERSION.0,
                ENGINE_VERSION.1,
                ENGINE_VERSION.2,
            ))
            .api_version(vk::API_VERSION_1_3);

        let mut extensions =
            TrackedArray::with_capacity(memory, MemoryTag::Renderer, surface_extensions.len() + 2);
        for &extension in surface_extensions {
            extensions.push(extension);
        }
        #[cfg(target_os = "macos")]
        extensions.push(ash::khr::portability_enumeration::NAME.as_ptr());
        if validation {
            extensions.push(ash::ext::debug_utils::NAME.as_ptr());
        }

        let layers: Vec<*const c_char> = if validation {
            vec![VALIDATION_LAYER.as_ptr()]
        } else {
            Vec::new()
        };

        // Required for MoltenVK on macOS
        #[cfg(target_os = "macos")]
        let create_flags = vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR;
        #[cfg(not(target_os = "macos"))]
        let create_flags = vk::InstanceCreateFlags::empty();

        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layers)
            .flags(create_flags);

        // SAFETY: The create info references locals that outlive the call.
        let instance = unsafe { entry.create_instance(&create_info, None) }
            .map_err(GpuError::InstanceCreation)?;
        tracing::trace!("Vulkan instance created");

        let debug = if validation {
            create_debug_messenger(&entry, &instance)
        } else {
            None
        };

        Ok(Self {
            entry,
            instance,
            debug,
        })
    }

    /// The loaded Vulkan entry point.
    pub fn entry(&self) -> &ash::Entry {
        &self.entry
    }

    /// The instance handle.
    pub fn instance(&self) -> &ash::Instance {
        &self.instance
    }
}

fn create_debug_messenger(
    entry: &ash::Entry,
    instance: &ash::Instance,
) -> Option<DebugMessenger> {
    let loader = ash::ext::debug_utils::Instance::new(entry, instance);

    let create_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(debug_callback));

    // SAFETY: Instance is valid; the callback is a plain function pointer.
    match unsafe { loader.create_debug_utils_messenger(&create_info, None) } {
        Ok(messenger) => {
            tracing::trace!("Vulkan debug messenger created");
            Some(DebugMessenger { loader, messenger })
        }
        Err(e) => {
            // Missing debug-utils support downgrades to no messenger.
            tracing::warn!("Failed to create Vulkan debug messenger: {e}");
            None
        }
    }
}

impl Drop for InstanceContext {
    fn drop(&mut self) {
        // SAFETY: Nothing created from this instance outlives it; the
        // renderer drops device-level objects first.
        unsafe {
            if let Some(debug) = self.debug.take() {
                debug
                    .loader
                    .destroy_debug_utils_messenger(debug.messenger, None);
            }
            self.instance.destroy_instance(None);
        }
        tracing::trace!("Vulkan instance destroyed");
    }
}
