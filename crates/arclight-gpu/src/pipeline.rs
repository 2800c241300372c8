//! Render pass and graphics pipeline construction.

use std::fs::File;
use std::path::Path;

use ash::vk;

use crate::error::{GpuError, Result};
use crate::vertex::Vertex;

/// Read a compiled shader binary.
///
/// The file is an opaque SPIR-V blob; nothing in it is inspected beyond the
/// word alignment the driver requires.
pub fn load_shader_code(path: &Path) -> Result<Vec<u32>> {
    let mut file = File::open(path).map_err(|source| GpuError::ShaderLoad {
        path: path.to_path_buf(),
        source,
    })?;

    ash::util::read_spv(&mut file).map_err(|source| GpuError::ShaderLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// The render pass, pipeline layout, and graphics pipeline.
///
/// Created as a unit; a failure partway through drops the bundle, which
/// destroys whatever was already created (destroying a null handle is a
/// no-op).
pub struct PipelineBundle {
    device: ash::Device,
    pub render_pass: vk::RenderPass,
    pub layout: vk::PipelineLayout,
    pub pipeline: vk::Pipeline,
}

impl PipelineBundle {
    /// Build the render pass and pipeline for swapchain images of
    /// `color_format`.
    pub fn new(
        device: &ash::Device,
        color_format: vk::Format,
        vertex_shader: &Path,
        fragment_shader: &Path,
    ) -> Result<Self> {
        let mut bundle = Self {
            device: device.clone(),
            render_pass: vk::RenderPass::null(),
            layout: vk::PipelineLayout::null(),
            pipeline: vk::Pipeline::null(),
        };

        bundle.render_pass = bundle.create_render_pass(color_format)?;
        bundle.layout = bundle.create_pipeline_layout()?;
        bundle.pipeline = bundle.create_graphics_pipeline(vertex_shader, fragment_shader)?;

        tracing::trace!("Graphics pipeline created");
        Ok(bundle)
    }

    /// Single color attachment, cleared on load and kept for present, with
    /// one dependency holding the pass until the acquired image is actually
    /// available at color-attachment output.
    fn create_render_pass(&self, color_format: vk::Format) -> Result<vk::RenderPass> {
        let color_attachment = vk::AttachmentDescription::default()
            .format(color_format)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::PRESENT_SRC_KHR);

        let color_attachment_ref = vk::AttachmentReference::default()
            .attachment(0)
            .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);

        let subpass = vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(std::slice::from_ref(&color_attachment_ref));

        let dependency = vk::SubpassDependency::default()
            .src_subpass(vk::SUBPASS_EXTERNAL)
            .dst_subpass(0)
            .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .src_access_mask(vk::AccessFlags::empty())
            .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE);

        let attachments = [color_attachment];
        let subpasses = [subpass];
        let dependencies = [dependency];
        let create_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        // SAFETY: The device is valid; the info references live locals.
        unsafe { self.device.create_render_pass(&create_info, None) }
            .map_err(GpuError::RenderPassCreation)
    }

    /// Empty layout: no descriptor sets, no push constants.
    fn create_pipeline_layout(&self) -> Result<vk::PipelineLayout> {
        let create_info = vk::PipelineLayoutCreateInfo::default();

        // SAFETY: The device is valid.
        unsafe { self.device.create_pipeline_layout(&create_info, None) }
            .map_err(GpuError::PipelineLayoutCreation)
    }

    fn create_shader_module(&self, path: &Path) -> Result<vk::ShaderModule> {
        let code = load_shader_code(path)?;
        let create_info = vk::ShaderModuleCreateInfo::default().code(&code);

        // SAFETY: The device is valid; the code slice outlives the call.
        unsafe { self.device.create_shader_module(&create_info, None) }
            .map_err(GpuError::PipelineCreation)
    }

    fn create_graphics_pipeline(
        &self,
        vertex_shader: &Path,
        fragment_shader: &Path,
    ) -> Result<vk::Pipeline> {
        let vert_module = self.create_shader_module(vertex_shader)?;
        let frag_module = match self.create_shader_module(fragment_shader) {
            Ok(module) => module,
            Err(e) => {
                // SAFETY: The module was just created and never used.
                unsafe { self.device.destroy_shader_module(vert_module, None) };
                return Err(e);
            }
        };

        let shader_stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(vert_module)
                .name(c"main"),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(frag_module)
                .name(c"main"),
        ];

        let vertex_bindings = [Vertex::binding_description()];
        let vertex_attributes = Vertex::attribute_descriptions();
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&vertex_bindings)
            .vertex_attribute_descriptions(&vertex_attributes);

        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false);

        // Viewport and scissor are dynamic, set per frame.
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);

        let rasterization = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .cull_mode(vk::CullModeFlags::BACK)
            .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
            .depth_bias_enable(false)
            .line_width(1.0);

        let multisampling = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::TYPE_1)
            .sample_shading_enable(false);

        let color_blend_attachments = [vk::PipelineColorBlendAttachmentState::default()
            .blend_enable(false)
            .color_write_mask(vk::ColorComponentFlags::RGBA)];

        let color_blending = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(&color_blend_attachments);

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state =
            vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

        let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization)
            .multisample_state(&multisampling)
            .color_blend_state(&color_blending)
            .dynamic_state(&dynamic_state)
            .layout(self.layout)
            .render_pass(self.render_pass)
            .subpass(0);

        // SAFETY: Every referenced object is valid; the info references live
        // locals.
        let result = unsafe {
            self.device
                .create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info], None)
        };

        // The modules fold into the pipeline; destroy them whether or not
        // creation succeeded.
        // SAFETY: Modules are valid and unused outside this call.
        unsafe {
            self.device.destroy_shader_module(vert_module, None);
            self.device.destroy_shader_module(frag_module, None);
        }

        match result {
            Ok(pipelines) => Ok(pipelines[0]),
            Err((_, e)) => Err(GpuError::PipelineCreation(e)),
        }
    }
}

impl Drop for PipelineBundle {
    fn drop(&mut self) {
        // SAFETY: The renderer waits for device idle before teardown;
        // destroying null handles is a no-op.
        unsafe {
            self.device.destroy_pipeline(self.pipeline, None);
            self.device.destroy_pipeline_layout(self.layout, None);
            self.device.destroy_render_pass(self.render_pass, None);
        }
        tracing::trace!("Graphics pipeline destroyed");
    }
}
